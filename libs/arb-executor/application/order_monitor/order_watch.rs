//! Order watch: polls a venue-M order until terminal status or a retry
//! budget is exhausted.

use std::time::Duration;

use tracing::debug;

use crate::infrastructure::venue_m::{MOrderStatus, VenueClientM, VenueMError};

#[derive(Debug, Clone, Copy)]
pub struct OrderWatchParams {
    pub interval: Duration,
    pub max_retries: u32,
}

impl Default for OrderWatchParams {
    fn default() -> Self {
        Self { interval: Duration::from_millis(500), max_retries: 10 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrderWatchResult {
    pub status: MOrderStatus,
    pub filled_qty: f64,
    pub avg_price: f64,
    /// `true` if the retry budget was exhausted before a terminal status
    /// was observed.
    pub timed_out: bool,
}

/// Poll until `MATCHED`/`CANCELLED` or `params.max_retries` polls elapse,
/// whichever comes first. Always returns the last observed status, even
/// on timeout, so the caller can decide how to treat a still-`LIVE` IOC
/// remainder.
pub async fn watch_polymarket_order<M: VenueClientM>(
    venue: &M,
    order_id: &str,
    params: OrderWatchParams,
) -> Result<OrderWatchResult, VenueMError> {
    let mut last = venue.get_order_status(order_id).await?;

    for attempt in 0..params.max_retries {
        if matches!(last.status, MOrderStatus::Matched | MOrderStatus::Cancelled) {
            return Ok(OrderWatchResult {
                status: last.status,
                filled_qty: last.filled_qty,
                avg_price: last.avg_price,
                timed_out: false,
            });
        }
        debug!(order_id, attempt, status = ?last.status, "order watch poll");
        tokio::time::sleep(params.interval).await;
        last = venue.get_order_status(order_id).await?;
    }

    Ok(OrderWatchResult {
        status: last.status,
        filled_qty: last.filled_qty,
        avg_price: last.avg_price,
        timed_out: !matches!(last.status, MOrderStatus::Matched | MOrderStatus::Cancelled),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::venue_m::{MMarketInfo, MOrderStatusResponse, MOrderbook, MPlaceOrderRequest, MPlaceOrderResponse};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct MockVenueM {
        statuses: Mutex<Vec<MOrderStatusResponse>>,
    }

    #[async_trait]
    impl VenueClientM for MockVenueM {
        async fn place_order(&self, _req: MPlaceOrderRequest) -> crate::infrastructure::venue_m::Result<MPlaceOrderResponse> {
            unimplemented!()
        }
        async fn get_order_status(&self, _order_id: &str) -> crate::infrastructure::venue_m::Result<MOrderStatusResponse> {
            let mut statuses = self.statuses.lock().await;
            Ok(statuses.remove(0))
        }
        async fn cancel_order(&self, _order_id: &str, _timeout: Duration) -> crate::infrastructure::venue_m::Result<bool> {
            unimplemented!()
        }
        async fn get_orderbook(&self, _token_id: &str) -> crate::infrastructure::venue_m::Result<MOrderbook> {
            unimplemented!()
        }
        async fn get_market_info(&self, _condition_id: &str) -> crate::infrastructure::venue_m::Result<MMarketInfo> {
            unimplemented!()
        }
        async fn get_balance(&self) -> crate::infrastructure::venue_m::Result<f64> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn stops_on_terminal_status() {
        let venue = MockVenueM {
            statuses: Mutex::new(vec![
                MOrderStatusResponse { status: MOrderStatus::Live, filled_qty: 5.0, remaining_qty: 5.0, avg_price: 0.5 },
                MOrderStatusResponse { status: MOrderStatus::Matched, filled_qty: 10.0, remaining_qty: 0.0, avg_price: 0.5 },
            ]),
        };
        let result = watch_polymarket_order(
            &venue,
            "o1",
            OrderWatchParams { interval: Duration::from_millis(1), max_retries: 5 },
        )
        .await
        .unwrap();
        assert_eq!(result.status, MOrderStatus::Matched);
        assert_eq!(result.filled_qty, 10.0);
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn times_out_if_still_live() {
        let venue = MockVenueM {
            statuses: Mutex::new(vec![
                MOrderStatusResponse { status: MOrderStatus::Live, filled_qty: 3.0, remaining_qty: 7.0, avg_price: 0.5 },
                MOrderStatusResponse { status: MOrderStatus::Live, filled_qty: 3.0, remaining_qty: 7.0, avg_price: 0.5 },
            ]),
        };
        let result = watch_polymarket_order(
            &venue,
            "o1",
            OrderWatchParams { interval: Duration::from_millis(1), max_retries: 1 },
        )
        .await
        .unwrap();
        assert!(result.timed_out);
    }
}
