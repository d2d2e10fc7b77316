//! `variant-sync PRODUCT_ID CATEGORY_ID`
//!
//! Loads a product's stored variants through the backend and prints the
//! editor snapshot (selection, rows, readiness) as JSON.

use anyhow::Context;

use sellerdesk_client::{ClientConfig, HttpGateway};
use sellerdesk_core::{CategoryId, ProductId};
use sellerdesk_variants::VariantEditor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sellerdesk_observability::init();

    let mut args = std::env::args().skip(1);
    let product_id: ProductId = args
        .next()
        .context("usage: variant-sync PRODUCT_ID CATEGORY_ID")?
        .parse()?;
    let category_id: CategoryId = args
        .next()
        .context("usage: variant-sync PRODUCT_ID CATEGORY_ID")?
        .parse()?;

    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "loading variants");
    let gateway = HttpGateway::new(config)?;

    let editor = VariantEditor::open_for_edit(product_id.clone(), &category_id, &gateway, &gateway)
        .await
        .with_context(|| format!("failed to load variants of product {product_id}"))?;

    let snapshot = editor.snapshot();
    if !snapshot.ready {
        tracing::warn!(issues = snapshot.readiness.issues.len(), "variants are not ready");
    }
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
