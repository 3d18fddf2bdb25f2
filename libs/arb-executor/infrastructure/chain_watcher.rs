//! Chain Watcher: subscribes to fill events for an on-chain order hash.
//!
//! Grounded on the polling/backoff discipline in
//! `infrastructure::client::user::reconciliation`'s order reconciliation
//! task: no push-based event source exists for venue P in this codebase,
//! so the concrete adapter polls a `VenueClientP` for order status and
//! synthesizes fill-delta events from the change in `filled_qty` between
//! polls, with the same exponential backoff on consecutive failures.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::venue_p::{POrderStatus, VenueClientP};

/// A single on-chain fill event delivered by the watcher.
#[derive(Debug, Clone, Copy)]
pub struct ChainEvent {
    pub tx_hash_key: u64,
    pub log_index: u64,
    pub shares_delta: f64,
    pub timestamp: i64,
}

#[derive(Debug, Error)]
pub enum ChainWatcherError {
    #[error("venue P error: {0}")]
    VenueP(String),
}

/// Required operations for watching an order hash's fills.
#[async_trait]
pub trait ChainWatcher: Send + Sync {
    /// Subscribe to fill events for `hash`, delivering each one on
    /// `events` until the order reaches a terminal state, `timeout`
    /// elapses, or the returned token is cancelled.
    fn watch_order(
        self: Arc<Self>,
        hash: String,
        events: mpsc::UnboundedSender<ChainEvent>,
        timeout: Duration,
    ) -> CancellationToken;

    fn is_connected(&self) -> bool;

    /// Outcome-side share delta carried by a fill event.
    fn shares_from_fill_event(&self, event: &ChainEvent) -> f64 {
        event.shares_delta
    }
}

const POLL_INTERVAL_SECS: u64 = 2;
const MAX_CONSECUTIVE_FAILURES: u32 = 5;
const MAX_BACKOFF_SECS: u64 = 30;

/// Polling-based `ChainWatcher` over a `VenueClientP`.
pub struct PollingChainWatcher<V: VenueClientP + 'static> {
    venue: Arc<V>,
}

impl<V: VenueClientP + 'static> PollingChainWatcher<V> {
    pub fn new(venue: Arc<V>) -> Self {
        Self { venue }
    }
}

#[async_trait]
impl<V: VenueClientP + 'static> ChainWatcher for PollingChainWatcher<V> {
    fn watch_order(
        self: Arc<Self>,
        hash: String,
        events: mpsc::UnboundedSender<ChainEvent>,
        timeout: Duration,
    ) -> CancellationToken {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let watcher = self;

        tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + timeout;
            let mut last_filled: f64 = 0.0;
            let mut consecutive_failures: u32 = 0;
            let mut log_index: u64 = 0;
            let tx_hash_key = hash_to_u64(&hash);

            loop {
                if task_cancel.is_cancelled() {
                    debug!("chain watcher for {} cancelled", hash);
                    return;
                }
                if tokio::time::Instant::now() >= deadline {
                    debug!("chain watcher for {} timed out", hash);
                    return;
                }

                match watcher.venue.get_order_status(&hash).await {
                    Ok(status) => {
                        consecutive_failures = 0;
                        let delta = (status.filled_qty - last_filled).max(0.0);
                        if delta > 0.0 {
                            last_filled = status.filled_qty;
                            let event = ChainEvent {
                                tx_hash_key,
                                log_index,
                                shares_delta: delta,
                                timestamp: chrono::Utc::now().timestamp(),
                            };
                            log_index += 1;
                            if events.send(event).is_err() {
                                debug!("chain watcher for {} receiver dropped", hash);
                                return;
                            }
                        }
                        if status.status.is_terminal() {
                            debug!(
                                "chain watcher for {} reached terminal status {:?}",
                                hash, status.status
                            );
                            return;
                        }
                    }
                    Err(e) => {
                        consecutive_failures += 1;
                        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                            error!(
                                "chain watcher for {} failed {} consecutive polls: {}",
                                hash, consecutive_failures, e
                            );
                        } else {
                            warn!(
                                "chain watcher for {} poll failed ({}/{}): {}",
                                hash, consecutive_failures, MAX_CONSECUTIVE_FAILURES, e
                            );
                        }
                    }
                }

                let wait = if consecutive_failures > 0 {
                    let backoff = POLL_INTERVAL_SECS
                        .saturating_mul(1 << consecutive_failures.min(5))
                        .min(MAX_BACKOFF_SECS);
                    Duration::from_secs(backoff)
                } else {
                    Duration::from_secs(POLL_INTERVAL_SECS)
                };

                tokio::select! {
                    _ = sleep(wait) => {}
                    _ = task_cancel.cancelled() => {
                        debug!("chain watcher for {} cancelled during backoff", hash);
                        return;
                    }
                }
            }
        });

        cancel
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Fold a hex transaction hash down to a cheap dedup key. Collisions are
/// acceptable: the `(tx_hash_key, log_index)` pair is the real identity,
/// and log_index differs across fills within the same poll session.
pub fn hash_to_u64(hash: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    hash.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::super::venue_p::*;
    use super::*;
    use std::sync::Mutex;

    struct MockVenueP {
        responses: Mutex<Vec<POrderStatusResponse>>,
    }

    #[async_trait]
    impl VenueClientP for MockVenueP {
        async fn place_order(&self, _req: PPlaceOrderRequest) -> Result<PPlaceOrderResponse> {
            unimplemented!()
        }
        async fn cancel_order(&self, _order_id: &str) -> Result<bool> {
            Ok(true)
        }
        async fn get_order_status(&self, _hash: &str) -> Result<POrderStatusResponse> {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                Ok(responses.remove(0))
            } else {
                Ok(responses[0].clone())
            }
        }
        async fn get_orderbook(&self, _market_id: &str) -> Result<POrderbook> {
            unimplemented!()
        }
        async fn get_position(&self, _market_id: &str, _outcome: &str) -> Result<f64> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn watch_order_emits_delta_and_stops_on_terminal() {
        let venue = Arc::new(MockVenueP {
            responses: Mutex::new(vec![
                POrderStatusResponse {
                    status: POrderStatus::PartiallyFilled,
                    filled_qty: 10.0,
                    remaining_qty: 90.0,
                    cancel_reason: None,
                },
                POrderStatusResponse {
                    status: POrderStatus::Filled,
                    filled_qty: 100.0,
                    remaining_qty: 0.0,
                    cancel_reason: None,
                },
            ]),
        });

        let watcher = Arc::new(PollingChainWatcher::new(venue));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _cancel = watcher.watch_order("0xabc".to_string(), tx, Duration::from_secs(30));

        let first = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("first event")
            .expect("channel open");
        assert_eq!(first.shares_delta, 10.0);

        let second = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("second event")
            .expect("channel open");
        assert_eq!(second.shares_delta, 90.0);

        // terminal status reached; channel should close shortly after.
        let closed = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(matches!(closed, Ok(None)));
    }

    #[test]
    fn hash_to_u64_is_stable() {
        assert_eq!(hash_to_u64("0xabc"), hash_to_u64("0xabc"));
    }
}
