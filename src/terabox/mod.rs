//! TeraBox share-page scraping and download-link resolution.
//!
//! A share link is turned into a direct download URL in two requests: the
//! share page is scraped for a [`ShareMetadata`] record, and that record is
//! exchanged at `/share/link` for a signed `dlink`.

mod extract;
mod metadata;
mod resolve;
pub mod scan;
pub mod strategies;
pub mod validate;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::config::Config;
use crate::constants::{ACCEPT_LANGUAGE as ACCEPT_LANGUAGE_VALUE, BROWSER_USER_AGENT};

pub use extract::ExtractError;
pub use metadata::ShareMetadata;
pub use resolve::ResolveError;
pub use validate::{is_supported_url, parse_share_url};

/// Client for the TeraBox web endpoints.
#[derive(Clone)]
pub struct TeraboxClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl TeraboxClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_http(
            build_http_client(config)?,
            config.terabox_base_url.clone(),
            config.http_timeout,
        ))
    }

    /// Create a client around an existing HTTP client.
    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The underlying HTTP client, shared with the download step.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Build the HTTP client used for all TeraBox traffic.
///
/// Every request carries a desktop browser identity. Redirects are followed
/// because TeraBox bounces between regional hosts.
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .connect_timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")
}
