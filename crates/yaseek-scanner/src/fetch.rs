//! HTTP fetch layer.

use crate::error::{FetchError, Result, ScanError};
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::multipart::Form;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;
use yaseek_core::{CookieJar, HttpConfig};
use yaseek_sites::{HttpMethod, PreparedRequest};

/// Sends a prepared request and returns the response body.
///
/// The status code is not inspected: error pages still go through
/// extraction, which reports them as "not found".
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one request with the crawl's credentials.
    async fn fetch(
        &self,
        request: &PreparedRequest,
        cookies: &CookieJar,
    ) -> std::result::Result<String, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured timeout and user agent.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ScanError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        request: &PreparedRequest,
        cookies: &CookieJar,
    ) -> std::result::Result<String, FetchError> {
        let url = parse_url(&request.url)?;

        let mut builder = match &request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::PostMultipart { field, body } => {
                let form = Form::new().text(field.clone(), body.clone());
                self.client.post(url).multipart(form)
            }
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(cookie) = cookies.header_value() {
            builder = builder.header(COOKIE, cookie);
        }

        let response = builder.send().await?;
        debug!(url = %request.url, status = %response.status(), "fetched");

        Ok(response.text().await?)
    }
}

/// Only absolute http(s) URLs are sent.
fn parse_url(raw: &str) -> std::result::Result<Url, FetchError> {
    let failed = |reason: String| FetchError::Failed {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| failed(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(failed(format!("unsupported scheme `{other}`"))),
    }
}
