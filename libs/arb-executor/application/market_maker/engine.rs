//! Per-market tick loop: resync, guard checks, buy/sell delta, and the
//! order-disappearance / self-healing protocols.
//!
//! Generalizes the `inventory_mm` engine's quoter/solver/in-flight-tracker
//! split (`application::strategies::inventory_mm::quoter::Quoter::tick`,
//! `components::solver::core::solve`) from "inventory imbalance vs. a
//! merge partner" to a single-market buy-delta/sell-delta/SCALP
//! formulation, driving one `VenueClientP` market instead of a WS-fed
//! pair.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::infrastructure::venue_p::{
    POrderStatus, PPlaceOrderRequest, PSide, VenueClientP, VenuePError,
};

use super::types::{
    DisappearanceResolution, MarketMakerConfig, MarketMakerState, QuoteAction, ResidentOrder,
};

pub struct MarketMaker<P: VenueClientP> {
    venue: std::sync::Arc<P>,
    market_id: String,
    outcome: String,
    config: MarketMakerConfig,
    state: MarketMakerState,
    last_buy_adjust: Option<Instant>,
    last_sell_adjust: Option<Instant>,
}

impl<P: VenueClientP + 'static> MarketMaker<P> {
    pub fn new(
        venue: std::sync::Arc<P>,
        market_id: impl Into<String>,
        outcome: impl Into<String>,
        config: MarketMakerConfig,
    ) -> Self {
        Self {
            venue,
            market_id: market_id.into(),
            outcome: outcome.into(),
            config,
            state: MarketMakerState::default(),
            last_buy_adjust: None,
            last_sell_adjust: None,
        }
    }

    /// Enqueues a cover-sell quantity (SCALP mode) for the tick loop to
    /// drain into a placed sell once capacity allows.
    pub fn enqueue_cover_sell(&mut self, qty: f64) {
        self.state.pending_sell_orders.push(qty);
    }

    /// Runs until `token` is cancelled.
    pub async fn run(mut self, token: CancellationToken) {
        let tick_duration = Duration::from_millis(self.config.tick_interval_ms);
        info!(market = %self.market_id, "market maker starting");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(tick_duration) => {}
            }

            if let Err(e) = self.tick().await {
                warn!(market = %self.market_id, error = %e, "tick failed");
            }
        }

        self.cancel_side(PSide::Buy).await;
        self.cancel_side(PSide::Sell).await;
        info!(market = %self.market_id, "market maker stopped, quotes pulled");
    }

    async fn tick(&mut self) -> Result<(), VenuePError> {
        let position = self.venue.get_position(&self.market_id, &self.outcome).await?;
        let book = self.venue.get_orderbook(&self.market_id).await?;

        self.resolve_disappearances().await?;

        if let Some(side) = self.check_price_range_guard(&book) {
            if !self.state.status_is_paused {
                warn!(market = %self.market_id, ?side, "price range guard tripped, pausing quotes");
                self.state.status_is_paused = true;
                self.cancel_side(PSide::Buy).await;
                self.cancel_side(PSide::Sell).await;
            }
            return Ok(());
        } else if self.state.status_is_paused {
            info!(market = %self.market_id, "price range guard cleared, resuming");
            self.state.status_is_paused = false;
        }

        if self.check_imbalance_protection() {
            return Ok(());
        }

        let best_bid = book.best_bid().map(|l| l.price);
        let best_ask = book.best_ask().map(|l| l.price);

        if let (Some(bid), Some(ask)) = (best_bid, best_ask) {
            let buy_action = self.buy_delta(bid, position);
            if self.should_adjust(PSide::Buy) {
                self.apply(buy_action).await;
            }

            let sell_action = if self.config.scalp_mode {
                self.scalp_sell_delta(bid)
            } else {
                self.sell_delta(ask, position)
            };
            if self.config.scalp_mode && matches!(sell_action, QuoteAction::Place { .. }) {
                // Drain the front of the queue now that the tick has
                // committed to placing it.
                self.state.pending_sell_orders.remove(0);
            }
            if self.should_adjust(PSide::Sell) {
                self.apply(sell_action).await;
            }
        }

        Ok(())
    }

    /// `FOLLOW` buy delta: target price is the book's best bid, target
    /// size is remaining room under `maxShares` net of what is already
    /// resting.
    fn buy_delta(&self, best_bid: f64, position: f64) -> QuoteAction {
        let open_buy_remaining = self.state.active_buy.as_ref().map(|o| o.size).unwrap_or(0.0);
        let target_qty = (self.config.max_shares - position - open_buy_remaining).max(0.0);
        self.diff_side(PSide::Buy, best_bid, target_qty, self.state.active_buy.clone())
    }

    /// `FOLLOW` sell delta: target price is the book's best ask, target
    /// size is the position not already offered.
    fn sell_delta(&self, best_ask: f64, position: f64) -> QuoteAction {
        let open_sell_remaining = self.state.active_sell.as_ref().map(|o| o.size).unwrap_or(0.0);
        let target_qty = (position - open_sell_remaining).max(0.0);
        self.diff_side(PSide::Sell, best_ask, target_qty, self.state.active_sell.clone())
    }

    /// `SCALP` sell delta: price is pinned at `bestBid + tickSize`,
    /// clamped away from the edges; size comes off the front of the
    /// pending-sell queue, bounded by `maxScalpSellOrders`.
    fn scalp_sell_delta(&self, best_bid: f64) -> QuoteAction {
        if self.state.scalp_sells.len() >= self.config.max_scalp_sell_orders {
            return QuoteAction::None;
        }
        let Some(&qty) = self.state.pending_sell_orders.first() else {
            return QuoteAction::None;
        };
        let price = (best_bid + self.config.tick_size).clamp(self.config.tick_size, 1.0 - self.config.tick_size);
        QuoteAction::Place { side: PSide::Sell, price, size: qty }
    }

    fn diff_side(&self, side: PSide, target_price: f64, target_qty: f64, current: Option<ResidentOrder>) -> QuoteAction {
        match current {
            None if target_qty > 0.0 => QuoteAction::Place { side, price: target_price, size: target_qty },
            None => QuoteAction::None,
            Some(order) if target_qty <= 0.0 => QuoteAction::Cancel { order_id: order.order_id, side },
            Some(order) => {
                let price_diverged = (order.price - target_price).abs() > self.config.tick_size / 2.0;
                let value_diverged = ((order.size - target_qty) * target_price).abs() > self.config.min_requote_value;
                if price_diverged || value_diverged {
                    QuoteAction::Replace { order_id: order.order_id, side, price: target_price, size: target_qty }
                } else {
                    QuoteAction::None
                }
            }
        }
    }

    fn should_adjust(&self, side: PSide) -> bool {
        let min_interval = Duration::from_millis(self.config.min_adjust_interval_ms);
        let last = match side {
            PSide::Buy => self.last_buy_adjust,
            PSide::Sell => self.last_sell_adjust,
        };
        last.map(|t| t.elapsed() >= min_interval).unwrap_or(true)
    }

    async fn apply(&mut self, action: QuoteAction) {
        let side = match &action {
            QuoteAction::None => return,
            QuoteAction::Place { side, .. }
            | QuoteAction::Replace { side, .. }
            | QuoteAction::Cancel { side, .. } => *side,
        };

        let result = self.execute(action).await;
        match result {
            Ok(()) => self.mark_adjusted(side),
            Err(e) => self.handle_rejection(side, e).await,
        }
    }

    async fn execute(&mut self, action: QuoteAction) -> Result<(), VenuePError> {
        match action {
            QuoteAction::None => Ok(()),
            QuoteAction::Cancel { order_id, side } => {
                self.venue.cancel_order(&order_id).await?;
                self.clear_side(side);
                Ok(())
            }
            QuoteAction::Replace { order_id, side, price, size } => {
                self.venue.cancel_order(&order_id).await?;
                self.clear_side(side);
                self.place(side, price, size, None).await
            }
            QuoteAction::Place { side, price, size } => self.place(side, price, size, None).await,
        }
    }

    async fn place(&mut self, side: PSide, price: f64, size: f64, buy_cost: Option<f64>) -> Result<(), VenuePError> {
        let req = PPlaceOrderRequest {
            market_id: self.market_id.clone(),
            side,
            price,
            quantity: size,
            outcome: self.outcome.clone(),
        };
        let resp = self.venue.place_order(req).await?;
        let order = ResidentOrder { order_id: resp.id, price, size, submitted_at: Instant::now(), buy_cost };
        match side {
            PSide::Buy => self.state.active_buy = Some(order),
            PSide::Sell if self.config.scalp_mode => self.state.scalp_sells.push(order),
            PSide::Sell => self.state.active_sell = Some(order),
        }
        Ok(())
    }

    fn clear_side(&mut self, side: PSide) {
        match side {
            PSide::Buy => self.state.active_buy = None,
            PSide::Sell => self.state.active_sell = None,
        }
    }

    fn mark_adjusted(&mut self, side: PSide) {
        match side {
            PSide::Buy => self.last_buy_adjust = Some(Instant::now()),
            PSide::Sell => self.last_sell_adjust = Some(Instant::now()),
        }
    }

    async fn cancel_side(&mut self, side: PSide) {
        let order_id = match side {
            PSide::Buy => self.state.active_buy.take().map(|o| o.order_id),
            PSide::Sell => self.state.active_sell.take().map(|o| o.order_id),
        };
        if let Some(id) = order_id {
            if let Err(e) = self.venue.cancel_order(&id).await {
                warn!(market = %self.market_id, ?side, error = %e, "cancel-side failed");
            }
        }
        if side == PSide::Sell {
            for order in self.state.scalp_sells.drain(..) {
                let _ = self.venue.cancel_order(&order.order_id).await;
            }
        }
    }

    /// Imbalance protection: a stale API view (more resting size than the
    /// engine's own target) is not diffed against; the offending side is
    /// cancelled outright and this tick is skipped so the next resync
    /// rebuilds clean state.
    fn check_imbalance_protection(&mut self) -> bool {
        const EPSILON: f64 = 1e-6;
        let buy_stale = self
            .state
            .active_buy
            .as_ref()
            .map(|o| o.size > self.config.max_shares + EPSILON)
            .unwrap_or(false);
        let sell_stale = self
            .state
            .active_sell
            .as_ref()
            .map(|o| o.size > self.config.max_shares + EPSILON)
            .unwrap_or(false);

        if buy_stale || sell_stale {
            warn!(market = %self.market_id, buy_stale, sell_stale, "imbalance protection tripped, skipping tick");
            if buy_stale {
                self.state.active_buy = None;
            }
            if sell_stale {
                self.state.active_sell = None;
            }
            return true;
        }
        false
    }

    /// Price range guard: returns the side whose bound is violated, if
    /// any.
    fn check_price_range_guard(&self, book: &crate::infrastructure::venue_p::POrderbook) -> Option<PSide> {
        if let (Some(min_sell), Some(best_bid)) = (self.config.min_sell_price, book.best_bid()) {
            if best_bid.price < min_sell {
                return Some(PSide::Sell);
            }
        }
        if let (Some(max_buy), Some(best_ask)) = (self.config.max_buy_price, book.best_ask()) {
            if best_ask.price > max_buy {
                return Some(PSide::Buy);
            }
        }
        if let (Some(max_spread), Some(bid), Some(ask)) = (self.config.max_spread_cents, book.best_bid(), book.best_ask()) {
            if (ask.price - bid.price) * 100.0 > max_spread {
                return Some(PSide::Buy);
            }
        }
        None
    }

    /// Order-disappearance protocol: an order missing from the freshest
    /// book snapshot is retained for `orderVisibleDelayMs` (API latency),
    /// then resolved via `get_order_status`.
    async fn resolve_disappearances(&mut self) -> Result<(), VenuePError> {
        let visible_delay = Duration::from_millis(self.config.order_visible_delay_ms);

        for side in [PSide::Buy, PSide::Sell] {
            let Some(order) = (match side {
                PSide::Buy => self.state.active_buy.clone(),
                PSide::Sell => self.state.active_sell.clone(),
            }) else {
                continue;
            };

            if order.submitted_at.elapsed() < visible_delay {
                continue;
            }

            let resolution = self.fetch_disappearance_resolution(&order.order_id).await;
            match resolution {
                DisappearanceResolution::StillOpen => {}
                DisappearanceResolution::Filled => {
                    debug!(market = %self.market_id, order_id = %order.order_id, "order filled, clearing");
                    self.clear_side(side);
                    self.state.unknown_count = 0;
                }
                DisappearanceResolution::Cleared => {
                    self.clear_side(side);
                    self.state.unknown_count = 0;
                }
                DisappearanceResolution::Unknown => {
                    self.state.unknown_count += 1;
                    if self.state.unknown_count >= self.config.max_unknown_count {
                        warn!(market = %self.market_id, "max unknown count reached, forcing clear");
                        self.clear_side(side);
                        self.state.unknown_count = 0;
                    }
                }
            }
        }
        Ok(())
    }

    async fn fetch_disappearance_resolution(&self, order_id: &str) -> DisappearanceResolution {
        match self.venue.get_order_status(order_id).await {
            Ok(status) => match status.status {
                POrderStatus::Open | POrderStatus::PartiallyFilled => DisappearanceResolution::StillOpen,
                POrderStatus::Filled => DisappearanceResolution::Filled,
                POrderStatus::Cancelled | POrderStatus::Expired | POrderStatus::Invalidated => {
                    DisappearanceResolution::Cleared
                }
            },
            Err(_) => DisappearanceResolution::Unknown,
        }
    }

    /// Self-healing: on an `insufficient shares`/`insufficient collateral`
    /// rejection, cancel the offending side, pause briefly, force a
    /// resync, then retry once with a clamped size.
    async fn handle_rejection(&mut self, side: PSide, err: VenuePError) {
        if !matches!(err, VenuePError::InsufficientShares | VenuePError::InsufficientCollateral) {
            error!(market = %self.market_id, ?side, error = %err, "quote action failed");
            return;
        }

        warn!(market = %self.market_id, ?side, error = %err, "venue rejection, self-healing");
        self.cancel_side(side).await;
        tokio::time::sleep(Duration::from_millis(500)).await;

        let resynced_position = self.venue.get_position(&self.market_id, &self.outcome).await.unwrap_or(0.0);
        let clamped = match side {
            PSide::Buy => (self.config.max_shares - resynced_position).max(0.0),
            PSide::Sell => resynced_position.max(0.0),
        };
        if clamped <= 0.0 {
            return;
        }

        let book = match self.venue.get_orderbook(&self.market_id).await {
            Ok(book) => book,
            Err(e) => {
                warn!(market = %self.market_id, error = %e, "self-heal resync failed, skipping retry");
                return;
            }
        };
        let price = match side {
            PSide::Buy => book.best_bid().map(|l| l.price),
            PSide::Sell => book.best_ask().map(|l| l.price),
        };
        if let Some(price) = price {
            if let Err(e) = self.place(side, price, clamped, None).await {
                warn!(market = %self.market_id, ?side, error = %e, "self-heal retry also failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use proptest::prelude::*;

    use crate::infrastructure::venue_p::{
        PPlaceOrderResponse, POrderStatusResponse, POrderbook, Result as PResult,
    };

    use super::*;

    /// Never invoked by the delta-computation unit tests below; exists
    /// only so `MarketMaker<P>` has a concrete, unimplemented `P`.
    struct NullVenueP;

    #[async_trait]
    impl VenueClientP for NullVenueP {
        async fn place_order(&self, _req: PPlaceOrderRequest) -> PResult<PPlaceOrderResponse> {
            unimplemented!("not exercised by delta-computation tests")
        }
        async fn cancel_order(&self, _order_id: &str) -> PResult<bool> {
            unimplemented!("not exercised by delta-computation tests")
        }
        async fn get_order_status(&self, _hash: &str) -> PResult<POrderStatusResponse> {
            unimplemented!("not exercised by delta-computation tests")
        }
        async fn get_orderbook(&self, _market_id: &str) -> PResult<POrderbook> {
            unimplemented!("not exercised by delta-computation tests")
        }
        async fn get_position(&self, _market_id: &str, _outcome: &str) -> PResult<f64> {
            unimplemented!("not exercised by delta-computation tests")
        }
    }

    fn config() -> MarketMakerConfig {
        MarketMakerConfig { max_shares: 100.0, tick_size: 0.01, min_requote_value: 1.0, ..Default::default() }
    }

    fn mm() -> MarketMaker<NullVenueP> {
        MarketMaker::new(std::sync::Arc::new(NullVenueP), "m", "YES", config())
    }

    #[test]
    fn buy_delta_targets_remaining_room_under_max_shares() {
        let engine = mm();
        let action = engine.buy_delta(0.49, 50.0);
        assert_eq!(action, QuoteAction::Place { side: PSide::Buy, price: 0.49, size: 50.0 });
    }

    #[test]
    fn sell_delta_targets_full_position_when_nothing_resting() {
        let engine = mm();
        let action = engine.sell_delta(0.50, 50.0);
        assert_eq!(action, QuoteAction::Place { side: PSide::Sell, price: 0.50, size: 50.0 });
    }

    #[test]
    fn self_cross_avoidance_places_both_sides_without_crossing() {
        let engine = mm();
        let buy = engine.buy_delta(0.49, 50.0);
        let sell = engine.sell_delta(0.50, 50.0);
        match (buy, sell) {
            (
                QuoteAction::Place { price: buy_price, .. },
                QuoteAction::Place { price: sell_price, .. },
            ) => assert!(buy_price < sell_price),
            other => panic!("expected both sides to place, got {other:?}"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        /// `position + openBuyRemaining <= maxShares` and `openSellRemaining
        /// <= position` for any fresh (no resting orders) tick, and the two
        /// sides never cross.
        #[test]
        fn buy_and_sell_deltas_never_cross_or_overrun_max_shares(
            best_bid in 0.01..0.98f64,
            spread in 0.01..0.02f64,
            max_shares in 1.0..1000.0f64,
            position in 0.0..1000.0f64,
        ) {
            let best_ask = (best_bid + spread).min(0.99);
            let config = MarketMakerConfig { max_shares, tick_size: 0.01, min_requote_value: 1.0, ..Default::default() };
            let engine = MarketMaker::new(std::sync::Arc::new(NullVenueP), "m", "YES", config);

            let buy = engine.buy_delta(best_bid, position);
            let sell = engine.sell_delta(best_ask, position);

            if let QuoteAction::Place { size, .. } = buy {
                prop_assert!(position + size <= max_shares + 1e-9);
            }
            if let QuoteAction::Place { size, .. } = sell {
                prop_assert!(size <= position + 1e-9);
            }
            if let (QuoteAction::Place { price: bp, .. }, QuoteAction::Place { price: sp, .. }) = (buy, sell) {
                prop_assert!(bp < sp);
            }
        }
    }
}
