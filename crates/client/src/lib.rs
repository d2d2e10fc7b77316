//! HTTP collaborators for the variant editor.
//!
//! [`HttpGateway`] implements the catalog, loader and persistence traits of
//! `sellerdesk-variants` against the dashboard backend.

pub mod config;
pub mod dto;
pub mod http;

pub use config::ClientConfig;
pub use http::HttpGateway;
