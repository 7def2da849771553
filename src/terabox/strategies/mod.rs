mod registry;
mod traits;

// Page layouts
mod file_list;
mod initial_state;

pub use file_list::FileListStrategy;
pub use initial_state::InitialStateStrategy;
pub use registry::StrategyRegistry;
pub use traits::{ExtractionStrategy, SharePage};

/// Global strategy registry.
pub static STRATEGIES: std::sync::LazyLock<StrategyRegistry> = std::sync::LazyLock::new(|| {
    let mut registry = StrategyRegistry::new();
    registry.register(Box::new(InitialStateStrategy::new()));
    registry.register(Box::new(FileListStrategy::new()));
    registry
});
