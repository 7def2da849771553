use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::{ShareMetadata, TeraboxClient};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to call link endpoint: {0}")]
    Http(#[from] reqwest::Error),
    #[error("link endpoint returned HTTP {0}")]
    Status(u16),
    #[error("link endpoint returned malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("link endpoint reported errno {errno}")]
    Api { errno: i64 },
    #[error("link endpoint response has no dlink")]
    MissingLink,
}

/// Body of `/share/link`.
#[derive(Debug, Deserialize)]
struct LinkResponse {
    errno: i64,
    #[serde(default)]
    dlink: Option<String>,
}

impl TeraboxClient {
    /// Exchange share metadata for a direct download URL.
    ///
    /// An HTTP 200 is not enough: the body must carry `errno == 0` and a
    /// non-empty `dlink`. The link arrives percent-encoded and is returned
    /// decoded.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, non-200 responses, and any
    /// response that does not carry a usable link.
    pub async fn resolve_download_link(
        &self,
        metadata: &ShareMetadata,
    ) -> Result<String, ResolveError> {
        let mut url = self.base_url.clone();
        url.set_path("/share/link");
        url.set_query(None);

        debug!(share_id = %metadata.share_id, "Resolving download link");

        let response = self
            .http
            .get(url)
            .query(&[
                ("surl", metadata.share_id.as_str()),
                ("sign", metadata.sign.as_str()),
                ("timestamp", metadata.timestamp.as_str()),
                ("fs_id", metadata.file_id.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(ResolveError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let link = parse_link_response(&body)?;

        info!(share_id = %metadata.share_id, "Resolved download link");
        Ok(link)
    }
}

fn parse_link_response(body: &[u8]) -> Result<String, ResolveError> {
    let parsed: LinkResponse = serde_json::from_slice(body).map_err(ResolveError::Malformed)?;

    if parsed.errno != 0 {
        return Err(ResolveError::Api {
            errno: parsed.errno,
        });
    }

    let dlink = parsed
        .dlink
        .filter(|link| !link.is_empty())
        .ok_or(ResolveError::MissingLink)?;

    // A link that is not valid percent-encoding is used as-is.
    Ok(urlencoding::decode(&dlink).map_or(dlink.clone(), std::borrow::Cow::into_owned))
}
