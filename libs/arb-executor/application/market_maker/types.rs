//! Market-Maker Engine types: config, per-market state, and tick actions.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::infrastructure::venue_p::PSide;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakerConfig {
    pub tick_interval_ms: u64,
    pub max_shares: f64,
    /// Minimum price move (in ticks) before a quote is replaced.
    pub tick_size: f64,
    /// Dollar-value threshold before a quantity-only change is replaced.
    pub min_requote_value: f64,
    pub min_adjust_interval_ms: u64,
    pub scalp_mode: bool,
    pub max_scalp_sell_orders: usize,
    pub order_visible_delay_ms: u64,
    pub max_unknown_count: u32,
    pub min_sell_price: Option<f64>,
    pub max_buy_price: Option<f64>,
    pub max_spread_cents: Option<f64>,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            max_shares: 100.0,
            tick_size: 0.01,
            min_requote_value: 1.0,
            min_adjust_interval_ms: 500,
            scalp_mode: false,
            max_scalp_sell_orders: 5,
            order_visible_delay_ms: 3_000,
            max_unknown_count: 3,
            min_sell_price: None,
            max_buy_price: None,
            max_spread_cents: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketMakerStatus {
    Running,
    /// A price-range guard tripped; quotes are pulled but position/book
    /// monitoring continues so the engine can resume on its own.
    RangePaused,
}

/// A resting order this side of the book, tagged with its buy cost when
/// it is a scalp sell.
#[derive(Debug, Clone)]
pub struct ResidentOrder {
    pub order_id: String,
    pub price: f64,
    pub size: f64,
    pub submitted_at: Instant,
    pub buy_cost: Option<f64>,
}

#[derive(Debug, Default)]
pub struct MarketMakerState {
    pub status_is_paused: bool,
    pub active_buy: Option<ResidentOrder>,
    pub active_sell: Option<ResidentOrder>,
    pub scalp_sells: Vec<ResidentOrder>,
    pub pending_sell_orders: Vec<f64>,
    pub unknown_count: u32,
}

impl MarketMakerState {
    pub fn status(&self) -> MarketMakerStatus {
        if self.status_is_paused {
            MarketMakerStatus::RangePaused
        } else {
            MarketMakerStatus::Running
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuoteAction {
    None,
    Place { side: PSide, price: f64, size: f64 },
    Replace { order_id: String, side: PSide, price: f64, size: f64 },
    Cancel { order_id: String, side: PSide },
}

/// Outcome of resolving an order missing from a book snapshot, per the
/// order-disappearance protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisappearanceResolution {
    StillOpen,
    Filled,
    Cleared,
    Unknown,
}
