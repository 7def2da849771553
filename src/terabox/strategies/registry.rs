use std::cmp::Reverse;

use tracing::debug;

use super::traits::{ExtractionStrategy, SharePage};
use crate::terabox::ShareMetadata;

/// Ordered set of page-layout strategies.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl StrategyRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Register a strategy.
    pub fn register(&mut self, strategy: Box<dyn ExtractionStrategy>) {
        self.strategies.push(strategy);
        // Sort by priority (highest first)
        self.strategies.sort_by_key(|s| Reverse(s.priority()));
    }

    /// Run strategies in priority order and return the first complete record.
    #[must_use]
    pub fn extract(&self, page: &SharePage) -> Option<ShareMetadata> {
        self.strategies.iter().find_map(|strategy| {
            let found = strategy.extract(page);
            debug!(
                strategy = strategy.name(),
                matched = found.is_some(),
                "Tried extraction strategy"
            );
            found
        })
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
