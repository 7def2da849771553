use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, UPGRADE_INSECURE_REQUESTS};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::strategies::{SharePage, STRATEGIES};
use super::validate::canonicalize;
use super::{ShareMetadata, TeraboxClient};
use crate::constants::NAVIGATION_ACCEPT;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to fetch share page: {0}")]
    Http(#[from] reqwest::Error),
    #[error("share page returned HTTP {0}")]
    Status(u16),
    #[error("no known page layout matched")]
    NotFound,
}

impl TeraboxClient {
    /// Fetch a share page and extract its [`ShareMetadata`].
    ///
    /// Mirror hosts are rewritten to the canonical origin first. Layout
    /// mismatches and malformed embedded JSON surface as
    /// [`ExtractError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched, does not return
    /// HTTP 200, or matches no extraction strategy.
    pub async fn extract_metadata(&self, share_url: &Url) -> Result<ShareMetadata, ExtractError> {
        let url = canonicalize(share_url, &self.base_url);
        debug!(url = %url, "Fetching share page");

        let response = self
            .http
            .get(url.clone())
            .headers(navigation_headers())
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(ExtractError::Status(response.status().as_u16()));
        }

        let html = response.text().await?;
        debug!(url = %url, length = html.len(), "Fetched share page");

        let page = SharePage::parse(url, &html);
        let metadata = STRATEGIES.extract(&page).ok_or(ExtractError::NotFound)?;

        info!(
            share_id = %metadata.share_id,
            filename = %metadata.filename,
            "Extracted share metadata"
        );
        Ok(metadata)
    }
}

/// Headers a browser sends for a top-level navigation.
fn navigation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(NAVIGATION_ACCEPT));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers
}
