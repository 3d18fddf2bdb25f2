//! Directional unwind: reversing the primary leg on venue P when hedging
//! exhausts its retry budget with a positive unhedged balance.

use tracing::{info, warn};

use crate::domain::task::{ArbSide, Task, TaskDirection, TaskStatus};
use crate::infrastructure::venue_p::{PPlaceOrderRequest, PSide, VenueClientP};

use super::ExecutorConfig;

const MAX_UNWIND_RETRIES: u32 = 3;
const UNWIND_POLL_ATTEMPTS: u32 = 10;

fn outcome_for(task: &Task) -> String {
    match task.arb_side {
        ArbSide::Yes => "YES".to_string(),
        ArbSide::No => "NO".to_string(),
    }
}

/// The primary leg's entry side is reversed to unwind it: a BUY task
/// entered long via a buy on P, so unwind sells; a SELL task entered via
/// a sell, so unwind buys back.
fn unwind_side(task: &Task) -> PSide {
    match task.direction {
        TaskDirection::Buy => PSide::Sell,
        TaskDirection::Sell => PSide::Buy,
    }
}

/// Places the reverse side on P in a limited retry loop, bounding the
/// unwind quantity by the on-chain balance so stale counters never
/// produce an over-unwind. Records `unwindPrice`/`unwindQty`/`unwindLoss`
/// onto `task.status` via `UnwindCompleted`.
pub async fn unwind<P: VenueClientP>(venue_p: &P, task: &mut Task, _config: &ExecutorConfig) {
    let outcome = outcome_for(task);
    let on_chain_balance = match venue_p.get_position(&task.market_id_p, &outcome).await {
        Ok(qty) => qty,
        Err(e) => {
            warn!(task_id = %task.task_id, error = %e, "unwind position refresh failed, using local counter");
            task.unhedged()
        }
    };

    let target_before_unwind = task.unhedged().min(on_chain_balance).max(0.0);
    let mut remaining = target_before_unwind;
    let side = unwind_side(task);

    let mut filled_total = 0.0;
    let mut proceeds = 0.0;
    let mut retries = 0;

    while remaining >= crate::domain::task::MIN_HEDGE_QTY && retries < MAX_UNWIND_RETRIES {
        let book = match venue_p.get_orderbook(&task.market_id_p).await {
            Ok(b) => b,
            Err(e) => {
                warn!(task_id = %task.task_id, error = %e, "unwind orderbook fetch failed");
                retries += 1;
                continue;
            }
        };
        let top = match side {
            PSide::Sell => book.best_bid(),
            PSide::Buy => book.best_ask(),
        };
        let Some(level) = top else {
            retries += 1;
            continue;
        };
        let price = level.price;

        let placed = venue_p
            .place_order(PPlaceOrderRequest {
                market_id: task.market_id_p.clone(),
                side,
                price,
                quantity: remaining,
                outcome: outcome.clone(),
            })
            .await;

        let Ok(order) = placed else {
            retries += 1;
            continue;
        };

        let mut filled_this_order = 0.0;
        for _ in 0..UNWIND_POLL_ATTEMPTS {
            match venue_p.get_order_status(&order.hash).await {
                Ok(status) => {
                    filled_this_order = status.filled_qty;
                    if status.status.is_terminal() {
                        break;
                    }
                }
                Err(_) => break,
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }

        if filled_this_order > 0.0 {
            filled_total += filled_this_order;
            proceeds += filled_this_order * price;
            remaining = (remaining - filled_this_order).max(0.0);
        }
        retries += 1;
    }

    // Observed-fills loss: entry cost basis for the unwound quantity
    // minus realized exit proceeds. Falls back to a 0.9x slippage proxy
    // only when no unwind fill price was observable at all.
    let unwind_loss = if filled_total > 0.0 {
        let entry_cost_basis = task.avg_predict_price * filled_total;
        (entry_cost_basis - proceeds).max(0.0)
    } else if target_before_unwind > 0.0 {
        0.1 * task.avg_predict_price * target_before_unwind
    } else {
        0.0
    };

    if remaining < crate::domain::task::MIN_HEDGE_QTY {
        info!(
            task_id = %task.task_id,
            unwind_qty = filled_total,
            unwind_loss,
            "unwind complete"
        );
        task.status = TaskStatus::UnwindCompleted { unwind_qty: filled_total, unwind_loss };
    } else {
        let reason = format!(
            "partial unwind: {remaining:.4} of {target_before_unwind:.4} still outstanding after {retries} retries"
        );
        warn!(task_id = %task.task_id, unwind_qty = filled_total, remaining, "unwind exhausted retries");
        task.status = TaskStatus::HedgeFailed { reason };
    }
    task.completed_at = Some(chrono::Utc::now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::ArbSide;
    use crate::infrastructure::venue_p::{POrderStatus, POrderStatusResponse, POrderbook, PPriceLevel, VenuePError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[test]
    fn unwind_side_is_reverse_of_entry() {
        let t = Task::new("t1", TaskDirection::Buy, ArbSide::Yes, 10.0, 0.4, 0.6, 0.0, None, chrono::Utc::now());
        assert_eq!(unwind_side(&t), PSide::Sell);
        let t2 = Task::new("t2", TaskDirection::Sell, ArbSide::No, 10.0, 0.4, 0.6, 0.0, None, chrono::Utc::now());
        assert_eq!(unwind_side(&t2), PSide::Buy);
    }

    /// Always fills the full requested quantity at a fixed price.
    struct FullFillVenueP {
        position: f64,
        price: f64,
    }

    #[async_trait]
    impl VenueClientP for FullFillVenueP {
        async fn place_order(&self, req: PPlaceOrderRequest) -> Result<PPlaceOrderResponse, VenuePError> {
            Ok(PPlaceOrderResponse { hash: format!("hash-{}", req.quantity), id: "1".into() })
        }
        async fn cancel_order(&self, _order_id: &str) -> Result<bool, VenuePError> {
            Ok(true)
        }
        async fn get_order_status(&self, hash: &str) -> Result<POrderStatusResponse, VenuePError> {
            let qty: f64 = hash.trim_start_matches("hash-").parse().unwrap();
            Ok(POrderStatusResponse { status: POrderStatus::Filled, filled_qty: qty, remaining_qty: 0.0, cancel_reason: None })
        }
        async fn get_orderbook(&self, _market_id: &str) -> Result<POrderbook, VenuePError> {
            Ok(POrderbook { bids: vec![PPriceLevel { price: self.price, size: 1000.0 }], asks: vec![PPriceLevel { price: self.price, size: 1000.0 }] })
        }
        async fn get_position(&self, _market_id: &str, _outcome: &str) -> Result<f64, VenuePError> {
            Ok(self.position)
        }
    }

    /// Never fills; exhausts all retries with the full quantity outstanding.
    struct NeverFillVenueP {
        position: f64,
        attempts: AtomicU32,
        orderbook_errors: Mutex<u32>,
    }

    #[async_trait]
    impl VenueClientP for NeverFillVenueP {
        async fn place_order(&self, _req: PPlaceOrderRequest) -> Result<PPlaceOrderResponse, VenuePError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(PPlaceOrderResponse { hash: "hash-0".into(), id: "1".into() })
        }
        async fn cancel_order(&self, _order_id: &str) -> Result<bool, VenuePError> {
            Ok(true)
        }
        async fn get_order_status(&self, _hash: &str) -> Result<POrderStatusResponse, VenuePError> {
            Ok(POrderStatusResponse { status: POrderStatus::Cancelled, filled_qty: 0.0, remaining_qty: 10.0, cancel_reason: None })
        }
        async fn get_orderbook(&self, _market_id: &str) -> Result<POrderbook, VenuePError> {
            *self.orderbook_errors.lock().unwrap() += 1;
            Ok(POrderbook { bids: vec![PPriceLevel { price: 0.5, size: 1000.0 }], asks: vec![PPriceLevel { price: 0.5, size: 1000.0 }] })
        }
        async fn get_position(&self, _market_id: &str, _outcome: &str) -> Result<f64, VenuePError> {
            Ok(self.position)
        }
    }

    fn sample_unwinding_task() -> Task {
        let mut t = Task::new("t1", TaskDirection::Buy, ArbSide::Yes, 10.0, 0.5, 0.6, 0.4, None, chrono::Utc::now());
        t.market_id_p = "m1".into();
        t.predict_filled_qty = 10.0;
        t.avg_predict_price = 0.5;
        t
    }

    #[tokio::test]
    async fn unwind_draining_below_min_hedge_qty_marks_completed() {
        let venue = FullFillVenueP { position: 10.0, price: 0.45 };
        let mut task = sample_unwinding_task();
        let config = ExecutorConfig::default();

        unwind(&venue, &mut task, &config).await;

        assert!(matches!(task.status, TaskStatus::UnwindCompleted { unwind_qty, .. } if (unwind_qty - 10.0).abs() < 1e-6));
        assert!(task.completed_at.is_some());
    }

    #[tokio::test]
    async fn unwind_exhausting_retries_with_balance_outstanding_marks_hedge_failed() {
        let venue = NeverFillVenueP { position: 10.0, attempts: AtomicU32::new(0), orderbook_errors: Mutex::new(0) };
        let mut task = sample_unwinding_task();
        let config = ExecutorConfig::default();

        unwind(&venue, &mut task, &config).await;

        match &task.status {
            TaskStatus::HedgeFailed { reason } => assert!(reason.contains("partial unwind")),
            other => panic!("expected HedgeFailed, got {other:?}"),
        }
        assert!(task.completed_at.is_some());
    }
}
