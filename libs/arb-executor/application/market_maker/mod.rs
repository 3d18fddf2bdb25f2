//! Market-Maker Engine: single-market book-following with strict
//! inventory invariants, one worker per market.
//!
//! Generalized from `application::strategies::inventory_mm`'s
//! quoter/solver split; see module-level docs on `engine::MarketMaker`.

pub mod engine;
pub mod types;

pub use engine::MarketMaker;
pub use types::{MarketMakerConfig, MarketMakerState, MarketMakerStatus, QuoteAction};
