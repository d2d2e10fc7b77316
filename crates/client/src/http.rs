//! reqwest-backed implementation of the variant collaborators.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use sellerdesk_core::{CategoryId, ProductId, ServerVariantId};
use sellerdesk_variants::{
    AttributeCatalog, AttributeType, ExistingVariantsLoader, GatewayError, PersistedVariantRecord,
    PersistenceGateway, VariantPayload,
};

use crate::config::ClientConfig;
use crate::dto::{AttributeTypeDto, CreatedDto, VariantDto, VariantWriteDto};

/// Client for the dashboard backend's catalog and variant routes.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpGateway {
    pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let req = self.client.request(method, url);
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, GatewayError> {
        let resp = req
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        if !status.is_success() {
            return Err(GatewayError::Api(
                status.as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }
        Ok(resp)
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, GatewayError> {
        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

fn decode_err(e: sellerdesk_core::DomainError) -> GatewayError {
    GatewayError::Decode(e.to_string())
}

#[async_trait]
impl AttributeCatalog for HttpGateway {
    async fn attributes_for_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<AttributeType>, GatewayError> {
        let path = format!("/categories/{category_id}/attributes");
        let dtos: Vec<AttributeTypeDto> = self.json(self.request(Method::GET, &path)).await?;
        dtos.into_iter()
            .map(|dto| AttributeType::try_from(dto).map_err(decode_err))
            .collect()
    }
}

#[async_trait]
impl ExistingVariantsLoader for HttpGateway {
    async fn variants(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<PersistedVariantRecord>, GatewayError> {
        let path = format!("/products/{product_id}/variants");
        let dtos: Vec<VariantDto> = self.json(self.request(Method::GET, &path)).await?;
        debug!(product_id = %product_id, count = dtos.len(), "variants fetched");
        dtos.into_iter()
            .map(|dto| PersistedVariantRecord::try_from(dto).map_err(decode_err))
            .collect()
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn create(
        &self,
        product_id: &ProductId,
        payload: &VariantPayload,
    ) -> Result<ServerVariantId, GatewayError> {
        let path = format!("/products/{product_id}/variants");
        let body = VariantWriteDto::from(payload);
        let created: CreatedDto = self
            .json(self.request(Method::POST, &path).json(&body))
            .await?;
        ServerVariantId::parse(created.id.into_string()).map_err(decode_err)
    }

    async fn update(
        &self,
        product_id: &ProductId,
        variant_id: &ServerVariantId,
        payload: &VariantPayload,
    ) -> Result<(), GatewayError> {
        let path = format!("/products/{product_id}/variants/{variant_id}");
        let body = VariantWriteDto::from(payload);
        self.send(self.request(Method::PUT, &path).json(&body)).await?;
        Ok(())
    }

    async fn delete(
        &self,
        product_id: &ProductId,
        variant_id: &ServerVariantId,
    ) -> Result<(), GatewayError> {
        let path = format!("/products/{product_id}/variants/{variant_id}");
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}
