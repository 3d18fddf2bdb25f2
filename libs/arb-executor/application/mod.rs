//! Application Layer
//!
//! Contains use cases and application services.
//! This layer depends on domain and infrastructure layers.

pub mod facade;
pub mod filter;
pub mod market_maker;
pub mod order_monitor;
pub mod sniper;
pub mod strategy;
pub mod sync;
pub mod task_executor;

// Re-export application facade for binaries
pub use facade::{EventSyncApp, SniperApp, init_logging, init_logging_with_level, to_sniper_market};

// Re-export the Task Executor FSM driver and its config/deps/error types
pub use task_executor::{ExecutorConfig, ExecutorDeps, ExecutorError, TaskRunner};

// Re-export the Market-Maker Engine
pub use market_maker::{MarketMaker, MarketMakerConfig};

// Re-export sniper use cases
pub use sniper::{MarketTrackerService, ConfigService};

// Re-export sync services
pub use sync::{EventSyncService, MarketSyncService};

// Re-export filter service
pub use filter::LLMFilter;

// Re-export strategy services
pub use strategy::{OrderExecutor, ResolutionMonitor, RiskManager};
