use url::Url;

/// Hosts that serve TeraBox share pages.
const SUPPORTED_HOSTS: &[&str] = &[
    "terabox.com",
    "www.terabox.com",
    "1024terabox.com",
    "www.1024terabox.com",
    "teraboxapp.com",
    "www.teraboxapp.com",
];

/// Parse `input` as a TeraBox share URL.
///
/// Returns `None` for anything that is not an http(s) URL on a supported host.
#[must_use]
pub fn parse_share_url(input: &str) -> Option<Url> {
    let parsed = Url::parse(input.trim()).ok()?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    let host = parsed.host_str()?.to_ascii_lowercase();
    SUPPORTED_HOSTS.contains(&host.as_str()).then_some(parsed)
}

/// Check whether `input` is a link to TeraBox or one of its mirrors.
#[must_use]
pub fn is_supported_url(input: &str) -> bool {
    parse_share_url(input).is_some()
}

/// Point a supported share URL at the canonical origin, keeping path and query.
///
/// URLs on other hosts are returned unchanged.
#[must_use]
pub fn canonicalize(url: &Url, base: &Url) -> Url {
    if !url
        .host_str()
        .is_some_and(|h| SUPPORTED_HOSTS.contains(&h.to_ascii_lowercase().as_str()))
    {
        return url.clone();
    }

    let mut canonical = base.clone();
    canonical.set_path(url.path());
    canonical.set_query(url.query());
    canonical.set_fragment(None);
    canonical
}

/// Extract the share id from a share URL.
///
/// Share pages live at `/s/<id>`; the older `/sharing/link?surl=<id>` form is
/// also accepted.
#[must_use]
pub fn share_id_from_url(url: &Url) -> Option<String> {
    if let Some(mut segments) = url.path_segments() {
        while let Some(segment) = segments.next() {
            if segment == "s" {
                return segments
                    .next()
                    .filter(|id| !id.is_empty())
                    .map(str::to_string);
            }
        }
    }

    url.query_pairs()
        .find(|(key, _)| key == "surl")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}
