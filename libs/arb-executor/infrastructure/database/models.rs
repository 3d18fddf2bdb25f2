//! Database models - Re-exported from domain layer
//!
//! This maintains backward compatibility while following Clean Architecture.
//! The actual models are defined in the domain layer.

// Re-export all domain models for backward compatibility
pub use crate::domain::models::*;
