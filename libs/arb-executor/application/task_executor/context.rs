//! Per-task in-memory runtime state (`TaskContext`).
//!
//! Not persisted; reconstructible from a `Task` on restart recovery
//! (`recovery::resume_task`).

use std::collections::{HashMap, HashSet};

use tokio_util::sync::CancellationToken;

/// A single on-chain fill event for the primary leg.
#[derive(Debug, Clone, Copy)]
pub struct ChainFillEvent {
    pub tx_hash_idx: (u64, u64),
    pub shares_delta: f64,
}

/// Tracks the last-applied fill for one venue-M order so a late-arriving
/// confirmation only ever contributes its positive delta once
/// (`applyPolyFillDelta`).
#[derive(Debug, Clone, Default)]
pub struct PolyOrderFill {
    pub filled: f64,
    pub avg_price: f64,
    pub last_checked_at: i64,
}

/// Per-task runtime state owned exclusively by the Executor's FSM driver.
pub struct TaskContext {
    pub root_token: CancellationToken,
    pub price_guard_abort: CancellationToken,
    pub primary_watch_abort: CancellationToken,

    /// Chain-event fill counter since the current primary hash was attached.
    wss_filled_qty: f64,
    /// REST-poll fill counter (cumulative, monotone) since the same hash.
    rest_filled_qty: f64,
    /// Dedup set for `(txHash, logIndex)`-identified chain events. `txHash`
    /// is hashed to a u64 key at the call site to keep this set cheap; see
    /// `record_chain_event`.
    seen_chain_events: HashSet<(u64, u64)>,
    /// `predictFilledQty` snapshot at the moment the current order hash was
    /// attached.
    base_filled_before_order: f64,

    pub poly_order_fills: HashMap<String, PolyOrderFill>,
}

impl TaskContext {
    pub fn new(root_token: CancellationToken) -> Self {
        Self {
            price_guard_abort: root_token.child_token(),
            primary_watch_abort: root_token.child_token(),
            root_token,
            wss_filled_qty: 0.0,
            rest_filled_qty: 0.0,
            seen_chain_events: HashSet::new(),
            base_filled_before_order: 0.0,
            poly_order_fills: HashMap::new(),
        }
    }

    /// Seed a context resumed from a persisted `Task` (restart recovery):
    /// set the baseline to the persisted cumulative fill and start with
    /// clean per-order counters.
    pub fn resumed_from(root_token: CancellationToken, predict_filled_qty: f64) -> Self {
        let mut ctx = Self::new(root_token);
        ctx.base_filled_before_order = predict_filled_qty;
        ctx
    }

    /// Record a deduplicated chain fill event. Returns `true` if this event
    /// had not been seen before and contributed to `wssFilledQty`.
    pub fn record_chain_event(&mut self, tx_hash_key: u64, log_index: u64, shares_delta: f64) -> bool {
        if self.seen_chain_events.insert((tx_hash_key, log_index)) {
            self.wss_filled_qty += shares_delta;
            true
        } else {
            false
        }
    }

    /// Apply a REST poll's cumulative `filledQty`, monotonically.
    pub fn record_rest_poll(&mut self, cumulative_filled_qty: f64) {
        self.rest_filled_qty = self.rest_filled_qty.max(cumulative_filled_qty);
    }

    /// Merged, monotone counter: `baseFilledBeforeOrder + max(wssFilledQty,
    /// restFilledQty)`, clamped to `[0, target_quantity]`.
    pub fn merged_filled_qty(&self, target_quantity: f64) -> f64 {
        let merged = self.base_filled_before_order + self.wss_filled_qty.max(self.rest_filled_qty);
        merged.clamp(0.0, target_quantity)
    }

    /// Reset per-order counters when the active primary hash changes
    /// (re-submit or cancel path). The caller must have already folded
    /// `merged_filled_qty` into the persisted `Task.predict_filled_qty`
    /// before calling this, so no straggling increment is lost
    /// (merge-before-reset).
    pub fn reset_for_new_order(&mut self, new_base_filled: f64) {
        self.base_filled_before_order = new_base_filled;
        self.wss_filled_qty = 0.0;
        self.rest_filled_qty = 0.0;
        self.seen_chain_events.clear();
        // A new primary hash means a new chain subscription; the caller is
        // responsible for cancelling the old one and installing a fresh
        // child token if it wants independent cancellation scoping.
    }

    /// Apply a confirmed venue-M fill delta exactly once ("at-most-once
    /// hedge on late confirmation"). Returns the positive increment
    /// applied, if any.
    pub fn apply_poly_fill_delta(&mut self, order_id: &str, filled: f64, avg_price: f64, now: i64) -> f64 {
        let entry = self
            .poly_order_fills
            .entry(order_id.to_string())
            .or_insert_with(PolyOrderFill::default);
        let delta = (filled - entry.filled).max(0.0);
        entry.filled = filled;
        if delta > 0.0 {
            entry.avg_price = avg_price;
        }
        entry.last_checked_at = now;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_event_dedup() {
        let mut ctx = TaskContext::new(CancellationToken::new());
        assert!(ctx.record_chain_event(1, 5, 10.0));
        assert!(!ctx.record_chain_event(1, 5, 10.0));
        assert_eq!(ctx.merged_filled_qty(100.0), 10.0);
    }

    #[test]
    fn rest_poll_is_monotone() {
        let mut ctx = TaskContext::new(CancellationToken::new());
        ctx.record_rest_poll(20.0);
        ctx.record_rest_poll(15.0); // stale/out-of-order report, ignored
        assert_eq!(ctx.merged_filled_qty(100.0), 20.0);
    }

    #[test]
    fn merged_counter_takes_max_of_wss_and_rest() {
        let mut ctx = TaskContext::new(CancellationToken::new());
        ctx.record_chain_event(1, 0, 30.0);
        ctx.record_rest_poll(25.0);
        assert_eq!(ctx.merged_filled_qty(100.0), 30.0);

        ctx.record_rest_poll(40.0);
        assert_eq!(ctx.merged_filled_qty(100.0), 40.0);
    }

    #[test]
    fn reset_preserves_baseline_then_restarts_counters() {
        let mut ctx = TaskContext::new(CancellationToken::new());
        ctx.record_chain_event(1, 0, 60.0);
        let merged = ctx.merged_filled_qty(100.0);
        ctx.reset_for_new_order(merged);
        assert_eq!(ctx.merged_filled_qty(100.0), 60.0);
        ctx.record_chain_event(2, 0, 10.0);
        assert_eq!(ctx.merged_filled_qty(100.0), 70.0);
    }

    #[test]
    fn apply_poly_fill_delta_is_exactly_once() {
        let mut ctx = TaskContext::new(CancellationToken::new());
        let d1 = ctx.apply_poly_fill_delta("order-1", 15.0, 0.55, 100);
        assert_eq!(d1, 15.0);
        // Same filled value reported again: no duplicate delta.
        let d2 = ctx.apply_poly_fill_delta("order-1", 15.0, 0.55, 101);
        assert_eq!(d2, 0.0);
        // Late-arriving upgrade from 15 -> 20: delta is exactly 5.
        let d3 = ctx.apply_poly_fill_delta("order-1", 20.0, 0.56, 102);
        assert_eq!(d3, 5.0);
    }
}
