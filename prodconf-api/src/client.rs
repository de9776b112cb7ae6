use std::time::Duration;

use prodconf::{Catalog, SelectedOption};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    config::ApiConfig,
    error::{ApiError, Result},
};

const USER_AGENT: &str = concat!("prodconf-api/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct SaveRequest<'a> {
    selection: &'a [SelectedOption],
}

#[derive(Deserialize)]
struct SaveResponse {
    id: String,
}

/// Authenticated client for the configurator API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Creates a client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingConfig`] or [`ApiError::InvalidConfig`] for
    /// unusable settings, [`ApiError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Creates a client from `PRODCONF_API_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.config.api_key)
    }

    /// Downloads the catalog of `product`.
    pub async fn fetch_catalog(&self, product: &str) -> Result<Catalog> {
        let url = self.url(&format!("products/{product}/catalog"));
        debug!("GET {url}");
        let response = self.authorized(self.http.get(&url)).send().await?;
        parse_body(response).await
    }

    /// Downloads a stored selection by id.
    pub async fn fetch_selection(&self, id: &str) -> Result<Vec<SelectedOption>> {
        let url = self.url(&format!("configurations/{id}"));
        debug!("GET {url}");
        let response = self.authorized(self.http.get(&url)).send().await?;
        parse_body(response).await
    }

    /// Stores `selection` for `product` and returns the id the server assigned.
    pub async fn save_selection(
        &self,
        product: &str,
        selection: &[SelectedOption],
    ) -> Result<String> {
        let url = self.url(&format!("products/{product}/configurations"));
        debug!("POST {url} ({} entries)", selection.len());
        let response = self
            .authorized(self.http.post(&url))
            .json(&SaveRequest { selection })
            .send()
            .await?;
        let saved: SaveResponse = parse_body(response).await?;
        info!("Stored selection for {product} as {}", saved.id);
        Ok(saved.id)
    }
}

async fn parse_body<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    decode_body(status.as_u16(), status.is_success(), &body)
}

fn decode_body<T: DeserializeOwned>(status: u16, success: bool, body: &str) -> Result<T> {
    if let Some(message) = error_message(body) {
        warn!("Server reported error ({status}): {message}");
        return Err(ApiError::Server { status, message });
    }
    if !success {
        return Err(ApiError::Status {
            status,
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

/// Extracts the `error` string of a JSON object body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}
