//! Arbitrage Executor Bot - Main Library
//!
//! This crate provides the top-level library for the cross-venue
//! arbitrage executor, following Clean Architecture principles.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **arb_executor**: Core business logic (re-exported from workspace)
//! - **hypersockets**: WebSocket library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use arb_executor_bot::bin_common::{load_config_from_env, ConfigType};
//! use arb_executor_bot::arb_executor::application::task_executor;
//! ```

// Re-export workspace libraries for convenience
pub use arb_executor;
pub use hypersockets;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables
    //!
    //! Provides shared functionality for the presentation layer (binaries)
    //! following Clean Architecture principles.

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use runner::{BinaryRunner, RunConfig};
}
