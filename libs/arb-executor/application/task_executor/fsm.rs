//! The Task Executor FSM driver: a `tokio::select!` loop over chain
//! events, price-guard edges, the primary REST poll timer, and the
//! cancellation token, advancing one `Task` through its transition
//! table until a terminal status.

use std::future::pending;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::application::order_monitor::{start_price_guard, PriceGuardEvent, PriceGuardSide};
use crate::domain::task::{fixed, Task, TaskDirection, TaskStatus};
use crate::infrastructure::chain_watcher::{ChainEvent, ChainWatcher};
use crate::infrastructure::task_store::TaskStore;
use crate::infrastructure::venue_m::VenueClientM;
use crate::infrastructure::venue_p::{PPlaceOrderRequest, PSide, VenueClientP};

use super::context::TaskContext;
use super::hedge::{hedge_loop, hedge_token_id, HedgeOutcome};
use super::unwind::unwind;
use super::{ExecutorConfig, ExecutorDeps};

/// Await `rx.recv()` if a receiver is installed, otherwise never resolve
/// — lets an optional stream participate as a `select!` branch.
async fn recv_or_pending<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(r) => r.recv().await,
        None => pending().await,
    }
}

fn primary_side(task: &Task) -> PSide {
    match task.direction {
        TaskDirection::Buy => PSide::Buy,
        TaskDirection::Sell => PSide::Sell,
    }
}

fn outcome_for(task: &Task) -> String {
    match task.arb_side {
        crate::domain::task::ArbSide::Yes => "YES".to_string(),
        crate::domain::task::ArbSide::No => "NO".to_string(),
    }
}

/// Amount of the primary leg still needed on P, distinct from
/// `Task::remaining_qty` (the hedge residual) — the primary-submission
/// procedure and the PAUSED-recovery transition both size the resting
/// order by `targetQuantity - predictFilledQty`.
fn primary_remaining(task: &Task) -> f64 {
    (task.target_quantity - task.predict_filled_qty).max(0.0)
}

/// Round a merged fill quantity to the venue's wire precision before it
/// lands on `task.predict_filled_qty`, so repeated chain/REST merges can't
/// accumulate float drift off the micro-unit grid.
fn quantize(qty: f64) -> f64 {
    fixed::from_micros(fixed::to_micros(qty))
}

pub struct TaskRunner<P, M, C, S>
where
    P: VenueClientP + 'static,
    M: VenueClientM + 'static,
    C: ChainWatcher + 'static,
    S: TaskStore + 'static,
{
    deps: ExecutorDeps<P, M, C, S>,
    config: ExecutorConfig,
}

impl<P, M, C, S> TaskRunner<P, M, C, S>
where
    P: VenueClientP + 'static,
    M: VenueClientM + 'static,
    C: ChainWatcher + 'static,
    S: TaskStore + 'static,
{
    pub fn new(deps: ExecutorDeps<P, M, C, S>, config: ExecutorConfig) -> Self {
        Self { deps, config }
    }

    async fn persist(&self, task: &Task) {
        if let Err(e) = self.deps.store.put_task(task.clone()).await {
            error!(task_id = %task.task_id, error = %e, "failed to persist task");
        }
    }

    /// Drives `task` from its current status to a terminal one, persisting
    /// after every observable transition. Returns the terminal-transition
    /// summary.
    pub async fn run(&self, mut task: Task, mut ctx: TaskContext) -> Task {
        if matches!(task.status, TaskStatus::Pending) {
            if let Err(e) = self.submit_primary(&mut task, &mut ctx).await {
                task.status = TaskStatus::Failed { reason: e.to_string() };
                task.completed_at = Some(Utc::now());
                self.persist(&task).await;
                return task;
            }
        } else if matches!(
            task.status,
            TaskStatus::Hedging | TaskStatus::HedgePending | TaskStatus::HedgeRetry { .. }
        ) {
            // Resumed mid-hedge: pick the hedge loop back up on the unhedged
            // balance carried over from the persisted task before the
            // select loop's chain/guard wiring takes over.
            self.run_hedge_cycle(&mut task, &mut ctx).await;
            self.persist(&task).await;
        } else if matches!(task.status, TaskStatus::Unwinding | TaskStatus::UnwindPending) {
            unwind(&*self.deps.venue_p, &mut task, &self.config).await;
            self.persist(&task).await;
        }

        let mut chain_rx: Option<mpsc::UnboundedReceiver<ChainEvent>> = None;
        let mut guard_rx: Option<mpsc::UnboundedReceiver<PriceGuardEvent>> = None;
        let mut depth_interval = tokio::time::interval(self.config.depth_check_interval);

        loop {
            if task.status.is_terminal() {
                break;
            }

            if ctx.root_token.is_cancelled() {
                self.cancel_task(&mut task, &mut ctx, "cancelled").await;
                break;
            }

            if let Some(expires_at) = task.expires_at {
                if Utc::now() >= expires_at {
                    self.cancel_task(&mut task, &mut ctx, "expired").await;
                    break;
                }
            }

            if chain_rx.is_none()
                && matches!(task.status, TaskStatus::PredictSubmitted | TaskStatus::PartiallyFilled)
            {
                if let Some(hash) = task.current_order_hash_p.clone() {
                    let (tx, rx) = mpsc::unbounded_channel();
                    let cancel_token = self.deps.chain_watcher.clone().watch_order(
                        hash,
                        tx,
                        std::time::Duration::from_secs(3600),
                    );
                    ctx.primary_watch_abort = cancel_token;
                    chain_rx = Some(rx);
                }
            }

            if guard_rx.is_none() && !matches!(task.status, TaskStatus::Paused { .. }) {
                let token_id = hedge_token_id(&task).to_string();
                let (side, threshold) = match task.direction {
                    TaskDirection::Buy => (PriceGuardSide::Buy, task.max_ask_m),
                    TaskDirection::Sell => (PriceGuardSide::Sell, task.min_bid_m),
                };
                ctx.price_guard_abort = ctx.root_token.child_token();
                guard_rx = Some(start_price_guard(
                    self.deps.venue_m.clone(),
                    crate::application::order_monitor::PriceGuardParams { token_id, side, threshold },
                    self.config.predict_poll_interval,
                    ctx.price_guard_abort.clone(),
                ));
            }

            let predict_poll_active =
                matches!(task.status, TaskStatus::PredictSubmitted | TaskStatus::PartiallyFilled);

            tokio::select! {
                Some(event) = recv_or_pending(&mut chain_rx) => {
                    if ctx.record_chain_event(event.tx_hash_key, event.log_index, event.shares_delta) {
                        self.reconcile_and_advance(&mut task, &mut ctx).await;
                    }
                }
                Some(event) = recv_or_pending(&mut guard_rx) => {
                    self.on_guard_event(&mut task, &mut ctx, event, &mut chain_rx).await;
                }
                _ = tokio::time::sleep(self.config.predict_poll_interval), if predict_poll_active => {
                    self.poll_primary(&mut task, &mut ctx).await;
                }
                _ = depth_interval.tick(), if predict_poll_active => {
                    self.check_depth_guard(&mut task, &mut ctx).await;
                }
                _ = ctx.root_token.cancelled() => {
                    self.cancel_task(&mut task, &mut ctx, "cancelled").await;
                }
            }

            self.persist(&task).await;
        }

        ctx.primary_watch_abort.cancel();
        ctx.price_guard_abort.cancel();
        task
    }

    async fn submit_primary(&self, task: &mut Task, ctx: &mut TaskContext) -> Result<(), super::ExecutorError> {
        let remaining = primary_remaining(task);
        let resp = self
            .deps
            .venue_p
            .place_order(PPlaceOrderRequest {
                market_id: task.market_id_p.clone(),
                side: primary_side(task),
                price: task.predict_price,
                quantity: remaining,
                outcome: outcome_for(task),
            })
            .await?;

        task.current_order_hash_p = Some(resp.hash.clone());
        // Merge-before-reset: capture any straggling increment under the
        // old hash before rebaselining for the new one.
        let merged = quantize(ctx.merged_filled_qty(task.target_quantity));
        task.predict_filled_qty = task.predict_filled_qty.max(merged);
        ctx.reset_for_new_order(task.predict_filled_qty);
        task.status = TaskStatus::PredictSubmitted;

        info!(task_id = %task.task_id, hash = %resp.hash, remaining, "primary leg submitted");
        Ok(())
    }

    async fn poll_primary(&self, task: &mut Task, ctx: &mut TaskContext) {
        let Some(hash) = task.current_order_hash_p.clone() else { return };
        match self.deps.venue_p.get_order_status(&hash).await {
            Ok(status) => {
                ctx.record_rest_poll(status.filled_qty);
                self.reconcile_and_advance(task, ctx).await;
            }
            Err(e) => warn!(task_id = %task.task_id, error = %e, "primary poll failed"),
        }
    }

    async fn reconcile_and_advance(&self, task: &mut Task, ctx: &mut TaskContext) {
        let merged = quantize(ctx.merged_filled_qty(task.target_quantity));
        if merged > task.predict_filled_qty {
            task.predict_filled_qty = merged;
            // The primary leg only ever rests at one price per submission
            // (no in-flight repricing), so every fill lands at predict_price.
            task.avg_predict_price = task.predict_price;
        }

        if matches!(task.status, TaskStatus::PredictSubmitted) && task.predict_filled_qty > 0.0 {
            task.status = TaskStatus::PartiallyFilled;
        }

        let complete = task.is_buy_complete();
        if task.unhedged() >= self.config.min_hedge_qty || complete {
            task.status = TaskStatus::Hedging;
            self.persist(task).await;
            self.run_hedge_cycle(task, ctx).await;
        }
    }

    async fn run_hedge_cycle(&self, task: &mut Task, ctx: &mut TaskContext) {
        let outcome = hedge_loop(&*self.deps.venue_m, task, ctx, &self.config).await;
        match outcome {
            HedgeOutcome::Completed => {
                if task.is_buy_complete() {
                    task.status = TaskStatus::Completed;
                    task.completed_at = Some(Utc::now());
                    info!(task_id = %task.task_id, "task completed");
                } else {
                    task.status = TaskStatus::PartiallyFilled;
                }
            }
            HedgeOutcome::Exhausted => {
                task.status = TaskStatus::Unwinding;
                self.persist(task).await;
                unwind(&*self.deps.venue_p, task, &self.config).await;
            }
            HedgeOutcome::PriceNoLongerAdmits => {
                task.pause_count += 1;
                task.status = TaskStatus::Paused { pause_count: task.pause_count };
                info!(task_id = %task.task_id, pause_count = task.pause_count, "paused: hedge price no longer admits");
            }
        }
    }

    async fn on_guard_event(
        &self,
        task: &mut Task,
        ctx: &mut TaskContext,
        event: PriceGuardEvent,
        chain_rx: &mut Option<mpsc::UnboundedReceiver<ChainEvent>>,
    ) {
        match event {
            PriceGuardEvent::Invalid(price) => {
                if task.status.is_terminal() || matches!(task.status, TaskStatus::Paused { .. }) {
                    return;
                }
                warn!(task_id = %task.task_id, price, "price guard invalid, pausing");
                if let Some(hash) = task.current_order_hash_p.clone() {
                    let _ = tokio::time::timeout(self.config.cancel_p_timeout, self.deps.venue_p.cancel_order(&hash)).await;
                }
                let merged = quantize(ctx.merged_filled_qty(task.target_quantity));
                task.predict_filled_qty = task.predict_filled_qty.max(merged);
                task.pause_count += 1;
                task.status = TaskStatus::Paused { pause_count: task.pause_count };
                ctx.primary_watch_abort.cancel();
                *chain_rx = None;
            }
            PriceGuardEvent::Valid(price) => {
                let pause_count = match &task.status {
                    TaskStatus::Paused { pause_count } => *pause_count,
                    _ => return,
                };
                if pause_count >= self.config.max_pause {
                    task.status = TaskStatus::Failed { reason: "max pause".to_string() };
                    task.completed_at = Some(Utc::now());
                    return;
                }
                info!(task_id = %task.task_id, price, "price guard valid, recovering");
                if primary_remaining(task) > 0.0 {
                    if let Err(e) = self.submit_primary(task, ctx).await {
                        task.status = TaskStatus::Failed { reason: e.to_string() };
                        task.completed_at = Some(Utc::now());
                    }
                } else {
                    self.reconcile_and_advance(task, ctx).await;
                }
            }
        }
    }

    async fn check_depth_guard(&self, task: &mut Task, ctx: &mut TaskContext) {
        let token_id = hedge_token_id(task).to_string();
        let book = match self.deps.venue_m.get_orderbook(&token_id).await {
            Ok(b) => b,
            Err(e) => {
                warn!(task_id = %task.task_id, error = %e, "depth guard orderbook fetch failed");
                return;
            }
        };

        let depth: f64 = match task.direction {
            TaskDirection::Buy => book.asks.iter().filter(|(p, _)| *p <= task.max_ask_m).map(|(_, s)| s).sum(),
            TaskDirection::Sell => book.bids.iter().filter(|(p, _)| *p >= task.min_bid_m).map(|(_, s)| s).sum(),
        };

        let needed = primary_remaining(task);
        if depth >= needed {
            return;
        }

        if depth <= 0.0 {
            task.pause_count += 1;
            task.status = TaskStatus::Paused { pause_count: task.pause_count };
            info!(task_id = %task.task_id, "depth guard: zero depth, pausing");
            return;
        }

        let reduced_target = (task.predict_filled_qty + depth.floor()).min(task.target_quantity);
        if reduced_target < task.target_quantity {
            info!(task_id = %task.task_id, reduced_target, "depth guard: reducing target and resubmitting");
            task.target_quantity = reduced_target;
            if let Err(e) = self.submit_primary(task, ctx).await {
                warn!(task_id = %task.task_id, error = %e, "depth guard resubmit failed");
            }
        }
    }

    async fn cancel_task(&self, task: &mut Task, ctx: &mut TaskContext, reason: &str) {
        ctx.primary_watch_abort.cancel();
        ctx.price_guard_abort.cancel();

        if let Some(hash) = task.current_order_hash_p.clone() {
            let _ = tokio::time::timeout(self.config.cancel_p_timeout, self.deps.venue_p.cancel_order(&hash)).await;
        }
        if let Some(order_id) = task.current_order_id_m.clone() {
            let _ = tokio::time::timeout(
                self.config.cancel_m_timeout,
                self.deps.venue_m.cancel_order(&order_id, self.config.cancel_m_timeout),
            )
            .await;
        }

        task.status = TaskStatus::Cancelled { reason: reason.to_string() };
        task.cancel_reason = Some(reason.to_string());
        task.completed_at = Some(Utc::now());
        info!(task_id = %task.task_id, reason, "task cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_remaining_is_target_minus_filled() {
        let mut t = Task::new(
            "t1",
            TaskDirection::Buy,
            crate::domain::task::ArbSide::Yes,
            100.0,
            0.40,
            0.60,
            0.0,
            None,
            Utc::now(),
        );
        t.predict_filled_qty = 30.0;
        assert_eq!(primary_remaining(&t), 70.0);
    }

    #[test]
    fn quantize_rounds_to_micro_unit_grid() {
        assert_eq!(quantize(12.3456789), 12.345679);
    }
}
