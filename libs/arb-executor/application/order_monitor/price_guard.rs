//! Price guard: watches venue M's top-of-book against a threshold and
//! fires an edge-triggered invalid/valid signal.
//!
//! Callbacks in the original design become a channel here (see the
//! event-emitters-to-channels note in the executor's design notes):
//! the Executor owns the receiver and folds `PriceGuardEvent`s into its
//! select loop instead of registering `onInvalid`/`onValid` closures.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::infrastructure::venue_m::VenueClientM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceGuardSide {
    /// BUY guard: ceiling on venue M's best ask.
    Buy,
    /// SELL guard: floor on venue M's best bid.
    Sell,
}

#[derive(Debug, Clone)]
pub struct PriceGuardParams {
    pub token_id: String,
    pub side: PriceGuardSide,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceGuardEvent {
    Invalid(f64),
    Valid(f64),
}

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pure edge-trigger step shared by the poll loop and its property tests:
/// the first observation seeds `last_valid` silently, and only a change
/// in validity emits an event.
fn guard_edge(last_valid: Option<bool>, is_valid: bool, price: f64) -> (Option<bool>, Option<PriceGuardEvent>) {
    match last_valid {
        Some(prev) if prev != is_valid => {
            let event = if is_valid { PriceGuardEvent::Valid(price) } else { PriceGuardEvent::Invalid(price) };
            (Some(is_valid), Some(event))
        }
        Some(_) => (last_valid, None),
        None => (Some(is_valid), None),
    }
}

/// Poll venue M's top-of-book and emit an edge-triggered `PriceGuardEvent`
/// each time the threshold is crossed. Re-entering the same state does
/// not re-fire (idempotent); this is the only per-token-id guard
/// instance so callbacks are implicitly serialized by the single task
/// driving it.
pub fn start_price_guard<M: VenueClientM + 'static>(
    venue: Arc<M>,
    params: PriceGuardParams,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> mpsc::UnboundedReceiver<PriceGuardEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut last_valid: Option<bool> = None;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match venue.get_orderbook(&params.token_id).await {
                Ok(book) => {
                    let top = match params.side {
                        PriceGuardSide::Buy => book.best_ask().map(|(p, _)| p),
                        PriceGuardSide::Sell => book.best_bid().map(|(p, _)| p),
                    };

                    // No liquidity at all is treated as invalid.
                    let (is_valid, price) = match top {
                        Some(price) => {
                            let is_valid = match params.side {
                                PriceGuardSide::Buy => price <= params.threshold,
                                PriceGuardSide::Sell => price >= params.threshold,
                            };
                            (is_valid, price)
                        }
                        None => (false, 0.0),
                    };

                    let (new_state, event) = guard_edge(last_valid, is_valid, price);
                    if let Some(event) = event {
                        debug!(token_id = %params.token_id, ?event, "price guard edge");
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                    last_valid = new_state;
                }
                Err(e) => {
                    warn!(token_id = %params.token_id, error = %e, "price guard poll failed");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = cancel.cancelled() => break,
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::venue_m::{MMarketInfo, MOrderStatusResponse, MOrderbook, MPlaceOrderRequest, MPlaceOrderResponse, VenueMError};
    use proptest::prelude::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct MockVenueM {
        books: Mutex<Vec<MOrderbook>>,
    }

    #[async_trait]
    impl VenueClientM for MockVenueM {
        async fn place_order(&self, _req: MPlaceOrderRequest) -> crate::infrastructure::venue_m::Result<MPlaceOrderResponse> {
            unimplemented!()
        }
        async fn get_order_status(&self, _order_id: &str) -> crate::infrastructure::venue_m::Result<MOrderStatusResponse> {
            unimplemented!()
        }
        async fn cancel_order(&self, _order_id: &str, _timeout: Duration) -> crate::infrastructure::venue_m::Result<bool> {
            unimplemented!()
        }
        async fn get_orderbook(&self, _token_id: &str) -> crate::infrastructure::venue_m::Result<MOrderbook> {
            let mut books = self.books.lock().await;
            if books.is_empty() {
                return Err(VenueMError::Transport("exhausted".into()));
            }
            Ok(books.remove(0))
        }
        async fn get_market_info(&self, _condition_id: &str) -> crate::infrastructure::venue_m::Result<MMarketInfo> {
            unimplemented!()
        }
        async fn get_balance(&self) -> crate::infrastructure::venue_m::Result<f64> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn fires_invalid_then_valid_on_threshold_crossing() {
        let venue = Arc::new(MockVenueM {
            books: Mutex::new(vec![
                MOrderbook { bids: vec![], asks: vec![(0.55, 10.0)] }, // valid
                MOrderbook { bids: vec![], asks: vec![(0.65, 10.0)] }, // invalid
                MOrderbook { bids: vec![], asks: vec![(0.55, 10.0)] }, // valid again
            ]),
        });
        let cancel = CancellationToken::new();
        let mut rx = start_price_guard(
            venue,
            PriceGuardParams { token_id: "tok".into(), side: PriceGuardSide::Buy, threshold: 0.60 },
            Duration::from_millis(5),
            cancel.clone(),
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first, PriceGuardEvent::Invalid(0.65));
        let second = rx.recv().await.unwrap();
        assert_eq!(second, PriceGuardEvent::Valid(0.55));
        cancel.cancel();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        /// `onInvalid`/`onValid` strictly alternate per guard instance: two
        /// consecutive emitted events are never the same variant, for any
        /// sequence of observed validity states.
        #[test]
        fn guard_events_strictly_alternate(observations in prop::collection::vec(any::<bool>(), 0..100)) {
            let mut last_valid: Option<bool> = None;
            let mut last_emitted: Option<bool> = None;
            for is_valid in observations {
                let (new_state, event) = guard_edge(last_valid, is_valid, 0.0);
                last_valid = new_state;
                if let Some(event) = event {
                    let emitted_valid = matches!(event, PriceGuardEvent::Valid(_));
                    prop_assert_ne!(Some(emitted_valid), last_emitted);
                    last_emitted = Some(emitted_valid);
                }
            }
        }

        /// Re-observing the same validity state never emits a second event.
        #[test]
        fn guard_repeated_observation_is_silent(is_valid in any::<bool>(), repeats in 1usize..20) {
            let mut last_valid = Some(is_valid);
            for _ in 0..repeats {
                let (new_state, event) = guard_edge(last_valid, is_valid, 0.0);
                prop_assert_eq!(event, None);
                last_valid = new_state;
            }
        }
    }
}
