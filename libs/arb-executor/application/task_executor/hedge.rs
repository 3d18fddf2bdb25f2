//! The hedging loop: steps 1-6 of fill reconciliation once an unhedged
//! balance has accumulated on the primary leg.

use chrono::Utc;
use tracing::{info, warn};

use crate::application::order_monitor::{watch_polymarket_order, OrderWatchParams};
use crate::domain::task::{fixed, Task, TaskDirection};
use crate::infrastructure::venue_m::{MOrderType, MPlaceOrderRequest, MSide, VenueClientM};

use super::context::TaskContext;
use super::ExecutorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeOutcome {
    /// `unhedged < MIN_HEDGE_QTY`: nothing more to do.
    Completed,
    /// Retries exhausted with a positive unhedged balance remaining.
    Exhausted,
    /// The opposite book no longer satisfies the guard; hedging cannot
    /// proceed until the price guard re-validates.
    PriceNoLongerAdmits,
}

/// `isInverted` swaps which M token hedges which P side.
pub(crate) fn hedge_token_id(task: &Task) -> &str {
    let use_yes = matches!(task.arb_side, crate::domain::task::ArbSide::Yes) ^ task.is_inverted;
    if use_yes {
        &task.yes_token_id_m
    } else {
        &task.no_token_id_m
    }
}

fn hedge_side(task: &Task) -> MSide {
    match task.direction {
        TaskDirection::Buy => MSide::Buy,
        TaskDirection::Sell => MSide::Sell,
    }
}

fn apply_hedge_fill(task: &mut Task, delta: f64, avg_price: f64) {
    if delta <= 0.0 {
        return;
    }
    // Quantize to the venue's wire precision before accumulating so repeated
    // merges from two fill sources can't drift the running total off-grid.
    let delta = fixed::from_micros(fixed::to_micros(delta));
    let cost_before = task.avg_polymarket_price * task.hedged_qty;
    task.hedged_qty = fixed::from_micros(fixed::to_micros(task.hedged_qty + delta));
    task.avg_polymarket_price = (cost_before + delta * avg_price) / task.hedged_qty;
}

/// Step 1: re-poll every still-tracked M order once to absorb late
/// confirmations before a critical decision (new hedge, unwind, terminal
/// transition). `applyPolyFillDelta` guarantees each order contributes
/// its positive delta at most once.
pub async fn refresh_tracked_poly_fills<M: VenueClientM>(venue_m: &M, ctx: &mut TaskContext, task: &mut Task) {
    let order_ids: Vec<String> = ctx.poly_order_fills.keys().cloned().collect();
    let now = Utc::now().timestamp();
    for order_id in order_ids {
        match venue_m.get_order_status(&order_id).await {
            Ok(status) => {
                let delta = ctx.apply_poly_fill_delta(&order_id, status.filled_qty, status.avg_price, now);
                apply_hedge_fill(task, delta, status.avg_price);
            }
            Err(e) => warn!(order_id, error = %e, "refresh_tracked_poly_fills poll failed"),
        }
    }
}

/// Drives the hedge subroutine to completion, exhaustion, or a guard
/// rejection. Mutates `task` and `ctx` in place; the caller persists
/// `task` after each iteration that changes `hedged_qty`.
pub async fn hedge_loop<M: VenueClientM>(
    venue_m: &M,
    task: &mut Task,
    ctx: &mut TaskContext,
    config: &ExecutorConfig,
) -> HedgeOutcome {
    loop {
        if task.unhedged() < config.min_hedge_qty {
            return HedgeOutcome::Completed;
        }

        refresh_tracked_poly_fills(venue_m, ctx, task).await;
        if task.unhedged() < config.min_hedge_qty {
            return HedgeOutcome::Completed;
        }

        let token_id = hedge_token_id(task).to_string();
        let side = hedge_side(task);

        let book = match venue_m.get_orderbook(&token_id).await {
            Ok(b) => b,
            Err(e) => {
                warn!(task_id = %task.task_id, error = %e, "hedge orderbook fetch failed");
                return HedgeOutcome::PriceNoLongerAdmits;
            }
        };

        let best = match side {
            MSide::Buy => book.best_ask(),
            MSide::Sell => book.best_bid(),
        };
        let Some((price, _size)) = best else {
            return HedgeOutcome::PriceNoLongerAdmits;
        };

        let guard_ok = match task.direction {
            TaskDirection::Buy => price <= task.max_ask_m,
            TaskDirection::Sell => price >= task.min_bid_m,
        };
        if !guard_ok {
            return HedgeOutcome::PriceNoLongerAdmits;
        }

        let unhedged = task.unhedged();
        let place_result = venue_m
            .place_order(MPlaceOrderRequest {
                token_id: token_id.clone(),
                side,
                price,
                quantity: unhedged,
                order_type: MOrderType::Ioc,
                neg_risk: task.neg_risk,
            })
            .await;

        let response = match place_result {
            Ok(r) if r.success && r.order_id.is_some() => r,
            Ok(r) => {
                warn!(task_id = %task.task_id, error = ?r.error, "hedge order rejected");
                task.hedge_retry_count += 1;
                if task.hedge_retry_count >= config.max_hedge_retries {
                    return HedgeOutcome::Exhausted;
                }
                tokio::time::sleep(config.hedge_backoff_base * task.hedge_retry_count).await;
                continue;
            }
            Err(e) => {
                warn!(task_id = %task.task_id, error = %e, "hedge order transport error");
                task.hedge_retry_count += 1;
                if task.hedge_retry_count >= config.max_hedge_retries {
                    return HedgeOutcome::Exhausted;
                }
                tokio::time::sleep(config.hedge_backoff_base * task.hedge_retry_count).await;
                continue;
            }
        };

        let order_id = response.order_id.unwrap();
        task.current_order_id_m = Some(order_id.clone());

        let watch = watch_polymarket_order(
            venue_m,
            &order_id,
            OrderWatchParams { interval: config.order_watch_interval, max_retries: config.order_watch_max_retries },
        )
        .await;

        let watch = match watch {
            Ok(w) => w,
            Err(e) => {
                warn!(task_id = %task.task_id, order_id, error = %e, "hedge order watch failed");
                task.hedge_retry_count += 1;
                if task.hedge_retry_count >= config.max_hedge_retries {
                    return HedgeOutcome::Exhausted;
                }
                tokio::time::sleep(config.hedge_backoff_base * task.hedge_retry_count).await;
                continue;
            }
        };

        let now = Utc::now().timestamp();
        let delta = ctx.apply_poly_fill_delta(&order_id, watch.filled_qty, watch.avg_price, now);
        apply_hedge_fill(task, delta, watch.avg_price);

        info!(task_id = %task.task_id, order_id, delta, hedged_qty = task.hedged_qty, "hedge fill applied");

        let remaining = task.unhedged();
        if remaining < config.min_hedge_qty {
            // Step 6: residual below tolerance, venue rejects micro-orders.
            return HedgeOutcome::Completed;
        }

        // Step 5: cancel any IOC residual before retrying.
        let _ = venue_m.cancel_order(&order_id, config.cancel_m_timeout).await;
        task.hedge_retry_count += 1;
        if task.hedge_retry_count >= config.max_hedge_retries {
            return HedgeOutcome::Exhausted;
        }
        tokio::time::sleep(config.hedge_backoff_base * task.hedge_retry_count).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::ArbSide;
    use chrono::Utc as ChronoUtc;

    fn sample_task() -> Task {
        let mut t = Task::new("t1", TaskDirection::Buy, ArbSide::Yes, 100.0, 0.40, 0.60, 0.0, None, ChronoUtc::now());
        t.yes_token_id_m = "yes-tok".into();
        t.no_token_id_m = "no-tok".into();
        t.predict_filled_qty = 10.0;
        t
    }

    #[test]
    fn hedge_token_id_respects_inversion() {
        let mut t = sample_task();
        assert_eq!(hedge_token_id(&t), "yes-tok");
        t.is_inverted = true;
        assert_eq!(hedge_token_id(&t), "no-tok");
    }

    #[test]
    fn apply_hedge_fill_updates_weighted_average() {
        let mut t = sample_task();
        apply_hedge_fill(&mut t, 10.0, 0.50);
        assert_eq!(t.hedged_qty, 10.0);
        assert_eq!(t.avg_polymarket_price, 0.50);
        apply_hedge_fill(&mut t, 10.0, 0.60);
        assert_eq!(t.hedged_qty, 20.0);
        assert!((t.avg_polymarket_price - 0.55).abs() < 1e-9);
    }

    #[test]
    fn apply_hedge_fill_ignores_non_positive_delta() {
        let mut t = sample_task();
        apply_hedge_fill(&mut t, 0.0, 0.99);
        assert_eq!(t.hedged_qty, 0.0);
    }
}
