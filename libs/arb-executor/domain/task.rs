//! Arbitrage task domain model.
//!
//! A `Task` is a single cross-venue arbitrage position: one leg resting on
//! venue P, hedged incrementally on venue M. The FSM in
//! `application::task_executor` is the only writer of a running task;
//! this module only holds the data and the invariants it must satisfy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum residual treated as "effectively complete" for hedge/primary
/// comparisons. Expressed in whole shares; fixed-point share amounts are
/// micro-units (`* 1_000_000`) at the venue boundary, see `fixed`.
pub const MIN_HEDGE_QTY: f64 = 1.0;

pub mod fixed {
    /// Multiplier used to convert share/price quantities to fixed-point
    /// integers at venue wire boundaries (matches the CLOB's USDC/token
    /// decimal convention).
    pub const DECIMAL_MULTIPLIER: i64 = 1_000_000;

    pub fn to_micros(qty: f64) -> i64 {
        (qty * DECIMAL_MULTIPLIER as f64).round() as i64
    }

    pub fn from_micros(micros: i64) -> f64 {
        micros as f64 / DECIMAL_MULTIPLIER as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskDirection {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArbSide {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    Maker,
    /// Delegates to an external executor; out of scope for this engine.
    Taker,
}

/// Task lifecycle status. Terminal variants are absorbing: once a task
/// reaches one, the Executor releases its `TaskContext` and never mutates
/// it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum TaskStatus {
    Pending,
    PredictSubmitted,
    PartiallyFilled,
    Paused { pause_count: u32 },
    Hedging,
    HedgePending,
    HedgeRetry { retry_count: u32 },
    HedgeFailed { reason: String },
    Unwinding,
    UnwindPending,
    UnwindCompleted { unwind_qty: f64, unwind_loss: f64 },
    Completed,
    Failed { reason: String },
    Cancelled { reason: String },
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed
                | TaskStatus::Failed { .. }
                | TaskStatus::Cancelled { .. }
                | TaskStatus::HedgeFailed { .. }
                | TaskStatus::UnwindCompleted { .. }
        )
    }

    /// Statuses resumable on restart recovery.
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            TaskStatus::PredictSubmitted
                | TaskStatus::PartiallyFilled
                | TaskStatus::Hedging
                | TaskStatus::HedgePending
                | TaskStatus::HedgeRetry { .. }
                | TaskStatus::Unwinding
                | TaskStatus::UnwindPending
                | TaskStatus::Paused { .. }
        )
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::PredictSubmitted => "PREDICT_SUBMITTED",
            TaskStatus::PartiallyFilled => "PARTIALLY_FILLED",
            TaskStatus::Paused { .. } => "PAUSED",
            TaskStatus::Hedging => "HEDGING",
            TaskStatus::HedgePending => "HEDGE_PENDING",
            TaskStatus::HedgeRetry { .. } => "HEDGE_RETRY",
            TaskStatus::HedgeFailed { .. } => "HEDGE_FAILED",
            TaskStatus::Unwinding => "UNWINDING",
            TaskStatus::UnwindPending => "UNWIND_PENDING",
            TaskStatus::UnwindCompleted { .. } => "UNWIND_COMPLETED",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed { .. } => "FAILED",
            TaskStatus::Cancelled { .. } => "CANCELLED",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TaskInvariantError {
    #[error("hedgedQty {hedged} exceeds predictFilledQty {predict}")]
    HedgeExceedsFill { hedged: f64, predict: f64 },
    #[error("predictFilledQty {predict} exceeds targetQuantity {target}")]
    FillExceedsTarget { predict: f64, target: f64 },
    #[error("negative quantity: {0}")]
    Negative(&'static str),
}

/// The unit of work the Task Executor drives to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub direction: TaskDirection,
    pub arb_side: ArbSide,
    pub strategy: Strategy,

    pub market_id_p: String,
    pub condition_id_m: String,
    pub yes_token_id_m: String,
    pub no_token_id_m: String,
    pub is_inverted: bool,
    pub neg_risk: bool,
    pub tick_size: f64,

    pub predict_price: f64,
    pub max_ask_m: f64,
    pub min_bid_m: f64,
    pub fee_rate_bps: u64,
    pub min_profit_buffer: f64,

    pub target_quantity: f64,
    pub predict_filled_qty: f64,
    pub hedged_qty: f64,
    pub avg_predict_price: f64,
    pub avg_polymarket_price: f64,

    /// Cost basis for a SELL task's entered position; required to compute
    /// realized profit on a SELL completion. A SELL task must not terminate
    /// successfully while this is `None`.
    pub entry_cost: Option<f64>,

    pub status: TaskStatus,
    pub pause_count: u32,
    pub hedge_retry_count: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub current_order_hash_p: Option<String>,
    pub current_order_id_m: Option<String>,
}

impl Task {
    /// `entry_cost` is the cost basis of the position a SELL task is
    /// unwinding; it is external information the task submitter must
    /// supply (this engine never acquires positions on its own, so it
    /// has no other way to learn it). Always `None` for a BUY task.
    pub fn new(
        task_id: impl Into<String>,
        direction: TaskDirection,
        arb_side: ArbSide,
        target_quantity: f64,
        predict_price: f64,
        max_ask_m: f64,
        min_bid_m: f64,
        entry_cost: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            direction,
            arb_side,
            strategy: Strategy::Maker,
            market_id_p: String::new(),
            condition_id_m: String::new(),
            yes_token_id_m: String::new(),
            no_token_id_m: String::new(),
            is_inverted: false,
            neg_risk: false,
            tick_size: 0.01,
            predict_price,
            max_ask_m,
            min_bid_m,
            fee_rate_bps: 0,
            min_profit_buffer: 0.0,
            target_quantity,
            predict_filled_qty: 0.0,
            hedged_qty: 0.0,
            avg_predict_price: 0.0,
            avg_polymarket_price: 0.0,
            entry_cost,
            status: TaskStatus::Pending,
            pause_count: 0,
            hedge_retry_count: 0,
            expires_at: None,
            cancel_reason: None,
            error: None,
            created_at: now,
            completed_at: None,
            current_order_hash_p: None,
            current_order_id_m: None,
        }
    }

    /// `remainingQty = max(0, predictFilledQty - hedgedQty)`.
    pub fn remaining_qty(&self) -> f64 {
        (self.predict_filled_qty - self.hedged_qty).max(0.0)
    }

    pub fn unhedged(&self) -> f64 {
        self.predict_filled_qty - self.hedged_qty
    }

    /// Validates `0 ≤ hedgedQty ≤ predictFilledQty ≤ targetQuantity`.
    pub fn check_invariants(&self) -> Result<(), TaskInvariantError> {
        if self.hedged_qty < 0.0 || self.predict_filled_qty < 0.0 {
            return Err(TaskInvariantError::Negative("hedged_qty/predict_filled_qty"));
        }
        if self.hedged_qty > self.predict_filled_qty + 1e-9 {
            return Err(TaskInvariantError::HedgeExceedsFill {
                hedged: self.hedged_qty,
                predict: self.predict_filled_qty,
            });
        }
        if self.predict_filled_qty > self.target_quantity + 1e-9 {
            return Err(TaskInvariantError::FillExceedsTarget {
                predict: self.predict_filled_qty,
                target: self.target_quantity,
            });
        }
        Ok(())
    }

    pub fn is_buy_complete(&self) -> bool {
        self.predict_filled_qty >= self.target_quantity - 1e-9
    }

    pub fn hedge_complete(&self) -> bool {
        self.unhedged() < MIN_HEDGE_QTY
    }
}

/// Terminal-transition record written once per task, for operator-visible
/// reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub status: String,
    pub predict_filled_qty: f64,
    pub hedged_qty: f64,
    pub avg_predict_price: f64,
    pub avg_polymarket_price: f64,
    pub actual_profit: Option<f64>,
    pub unwind_loss: Option<f64>,
    pub pause_count: u32,
    pub hedge_retry_count: u32,
    pub duration_secs: i64,
}

impl TaskSummary {
    pub fn from_task(task: &Task) -> Self {
        let duration_secs = task
            .completed_at
            .map(|c| (c - task.created_at).num_seconds())
            .unwrap_or(0);

        let actual_profit = match task.direction {
            TaskDirection::Buy => {
                if task.hedged_qty > 0.0 {
                    Some(
                        (1.0 - task.avg_predict_price - task.avg_polymarket_price)
                            * task.hedged_qty,
                    )
                } else {
                    None
                }
            }
            // SELL profit requires entry_cost; refuse to fabricate one.
            TaskDirection::Sell => task.entry_cost.map(|entry| {
                (task.avg_predict_price + task.avg_polymarket_price - entry) * task.hedged_qty
            }),
        };

        let unwind_loss = match &task.status {
            TaskStatus::UnwindCompleted { unwind_loss, .. } => Some(*unwind_loss),
            _ => None,
        };

        Self {
            task_id: task.task_id.clone(),
            status: task.status.short_name().to_string(),
            predict_filled_qty: task.predict_filled_qty,
            hedged_qty: task.hedged_qty,
            avg_predict_price: task.avg_predict_price,
            avg_polymarket_price: task.avg_polymarket_price,
            actual_profit,
            unwind_loss,
            pause_count: task.pause_count,
            hedge_retry_count: task.hedge_retry_count,
            duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task::new(
            "t1",
            TaskDirection::Buy,
            ArbSide::Yes,
            100.0,
            0.40,
            0.60,
            0.0,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn remaining_qty_clamps_to_zero() {
        let mut t = sample_task();
        t.predict_filled_qty = 10.0;
        t.hedged_qty = 15.0; // shouldn't happen, but remaining must not go negative
        assert_eq!(t.remaining_qty(), 0.0);
    }

    #[test]
    fn invariant_rejects_hedge_exceeding_fill() {
        let mut t = sample_task();
        t.predict_filled_qty = 10.0;
        t.hedged_qty = 20.0;
        assert!(t.check_invariants().is_err());
    }

    #[test]
    fn invariant_rejects_fill_exceeding_target() {
        let mut t = sample_task();
        t.predict_filled_qty = 150.0;
        assert!(t.check_invariants().is_err());
    }

    #[test]
    fn invariant_holds_for_valid_progression() {
        let mut t = sample_task();
        t.predict_filled_qty = 60.0;
        t.hedged_qty = 40.0;
        assert!(t.check_invariants().is_ok());
    }

    #[test]
    fn sell_summary_without_entry_cost_has_no_profit() {
        let mut t = Task::new(
            "t2",
            TaskDirection::Sell,
            ArbSide::No,
            50.0,
            0.60,
            1.0,
            0.40,
            None,
            Utc::now(),
        );
        t.hedged_qty = 50.0;
        t.predict_filled_qty = 50.0;
        let summary = TaskSummary::from_task(&t);
        assert_eq!(summary.actual_profit, None);
    }

    #[test]
    fn buy_summary_computes_profit() {
        let mut t = sample_task();
        t.predict_filled_qty = 100.0;
        t.hedged_qty = 100.0;
        t.avg_predict_price = 0.40;
        t.avg_polymarket_price = 0.55;
        t.completed_at = Some(t.created_at);
        let summary = TaskSummary::from_task(&t);
        assert!((summary.actual_profit.unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn sell_summary_computes_profit_when_entry_cost_supplied() {
        let mut t = Task::new(
            "t3",
            TaskDirection::Sell,
            ArbSide::No,
            50.0,
            0.60,
            1.0,
            0.40,
            Some(0.55),
            Utc::now(),
        );
        t.hedged_qty = 50.0;
        t.predict_filled_qty = 50.0;
        t.avg_predict_price = 0.60;
        t.avg_polymarket_price = 0.05;
        t.completed_at = Some(t.created_at);
        let summary = TaskSummary::from_task(&t);
        assert!((summary.actual_profit.unwrap() - 5.0).abs() < 1e-6);
    }
}
