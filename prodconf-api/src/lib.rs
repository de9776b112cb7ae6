//! # prodconf-api
//!
//! HTTP client for product catalogs and stored configuration selections.
//!
//! The client is a thin layer over `reqwest`: it authenticates every request
//! with a bearer key, decodes catalogs and wire selections into the
//! [`prodconf`] types and turns `{"error": "..."}` response bodies into
//! [`ApiError::Server`].
//!
//! Configuration is checked when the client is created, so missing
//! credentials fail at startup rather than on the first request.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prodconf_api::{ApiClient, ApiConfig};
//!
//! # async fn example() -> Result<(), prodconf_api::ApiError> {
//! let client = ApiClient::new(ApiConfig::from_env()?)?;
//! let catalog = client.fetch_catalog("shirt").await?;
//! let config = prodconf::ProductConfiguration::new(&catalog, &[]).unwrap();
//! let id = client.save_selection("shirt", &config.get_api_selection()).await?;
//! println!("stored as {id}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - Request methods and response decoding
//! - [`config`] - Endpoint and credential configuration
//! - [`error`] - Error type

#[macro_use]
extern crate log;

/// Request methods and response decoding.
pub mod client;

/// Endpoint and credential configuration.
pub mod config;

/// Error type for configuration and requests.
pub mod error;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
