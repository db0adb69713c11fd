//! Shared HTTP client for the finboard API.
//!
//! Every fetch function goes through one [`ApiClient`]: paths are resolved
//! against the configured base URL, bodies are JSON, and any non-2xx status
//! is an error. The client holds no per-request state and is cheap to clone.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use finboard_core::AppConfig;
use finboard_core::config::{DEFAULT_API_BASE_URL, DEFAULT_CEP_BASE_URL};

use crate::error::ApiError;

/// Empty query string for endpoints without parameters.
pub const NO_QUERY: &[(&str, &str)] = &[];

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "finboard/0.1";

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for `/api/...` paths.
    pub base_url: Url,
    /// Base URL for the postal-code lookup service.
    pub cep_base_url: Url,
    /// User agent string (default: "finboard/0.1")
    pub user_agent: String,
    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid"),
            cep_base_url: Url::parse(DEFAULT_CEP_BASE_URL).expect("default CEP base URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Build from a loaded [`AppConfig`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: parse_base(&config.api_base_url)?,
            cep_base_url: parse_base(&config.cep_base_url)?,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

/// HTTP client shared by all fetch functions.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(ApiError::from)?;

        Ok(Self { http, config })
    }

    /// Create a client from a loaded [`AppConfig`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(ApiConfig::from_app_config(config)?)
    }

    /// Resolve an `/api/...` path against the base URL.
    ///
    /// Any path prefix on the base URL is kept.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        join(&self.config.base_url, path)
    }

    /// Resolve a path against the postal-code lookup base URL.
    pub fn cep_endpoint(&self, path: &str) -> Result<Url, ApiError> {
        join(&self.config.cep_base_url, path)
    }

    /// GET `path` with `query` and decode the JSON body.
    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.send(self.http.get(url).query(query)).await
    }

    /// GET an absolute URL and decode the JSON body.
    pub async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.send(self.http.get(url)).await
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.send(self.http.post(url).json(body)).await
    }

    /// PUT a JSON body to `path` and decode the JSON response.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        self.send(self.http.put(url).json(body)).await
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        self.execute(self.http.delete(url)).await.map(|_| ())
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let bytes = self.execute(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<bytes::Bytes, ApiError> {
        let start = Instant::now();
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let url = response.url().clone();

        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;

        tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), bytes.len());

        Ok(bytes)
    }
}

fn join(base: &Url, path: &str) -> Result<Url, ApiError> {
    let raw = format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base: &str) -> ApiClient {
        ApiClient::new(ApiConfig { base_url: Url::parse(base).unwrap(), ..Default::default() }).unwrap()
    }

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url.as_str(), "https://api.finboard.com.br/");
        assert_eq!(config.cep_base_url.as_str(), "https://viacep.com.br/ws");
        assert_eq!(config.user_agent, "finboard/0.1");
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_from_app_config() {
        let app = AppConfig { api_base_url: "http://localhost:8000".into(), timeout_ms: 1500, ..Default::default() };
        let config = ApiConfig::from_app_config(&app).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_endpoint_join() {
        let client = client_with_base("https://api.finboard.com.br");
        assert_eq!(
            client.endpoint("/api/dashboard").unwrap().as_str(),
            "https://api.finboard.com.br/api/dashboard"
        );
    }

    #[tokio::test]
    async fn test_endpoint_keeps_base_prefix() {
        let client = client_with_base("https://gateway.finboard.com.br/backoffice/");
        assert_eq!(
            client.endpoint("/api/supplier").unwrap().as_str(),
            "https://gateway.finboard.com.br/backoffice/api/supplier"
        );
    }

    #[tokio::test]
    async fn test_cep_endpoint() {
        let client = ApiClient::new(ApiConfig::default()).unwrap();
        assert_eq!(
            client.cep_endpoint("01001000/json/").unwrap().as_str(),
            "https://viacep.com.br/ws/01001000/json/"
        );
    }
}
