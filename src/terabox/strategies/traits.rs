use scraper::{Html, Selector};
use url::Url;

use crate::terabox::ShareMetadata;

/// A fetched share page, reduced to what the strategies look at.
#[derive(Debug, Clone)]
pub struct SharePage {
    /// URL the page was requested from (after canonicalization).
    pub url: Url,
    /// Text of every non-empty inline `<script>` block, in document order.
    pub scripts: Vec<String>,
}

impl SharePage {
    /// Parse HTML and collect its inline scripts.
    #[must_use]
    pub fn parse(url: Url, html: &str) -> Self {
        let document = Html::parse_document(html);
        let scripts: Vec<String> = Selector::parse("script")
            .map(|selector| {
                document
                    .select(&selector)
                    .map(|element| element.text().collect::<String>())
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self { url, scripts }
    }
}

/// One known layout of the TeraBox share page.
pub trait ExtractionStrategy: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &'static str;

    /// Priority for strategy ordering (higher = tried first).
    fn priority(&self) -> i32 {
        0
    }

    /// Build a complete record from the page, or `None` if this layout does
    /// not apply or any field is missing.
    fn extract(&self, page: &SharePage) -> Option<ShareMetadata>;
}
