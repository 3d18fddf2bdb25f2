//! Restart recovery: reload resumable tasks on startup, re-validate the
//! price band for each, and seed a fresh `TaskContext`.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::task::{Task, TaskStatus};
use crate::infrastructure::task_store::{TaskStore, TaskStoreError};
use crate::infrastructure::venue_m::VenueClientM;

use super::hedge::hedge_token_id;
use super::context::TaskContext;

/// The short-name statuses eligible for resumption on restart.
pub const RESUMABLE_STATUSES: &[&str] = &[
    "PREDICT_SUBMITTED",
    "PARTIALLY_FILLED",
    "HEDGING",
    "HEDGE_PENDING",
    "HEDGE_RETRY",
    "UNWINDING",
    "UNWIND_PENDING",
    "PAUSED",
];

pub async fn load_resumable_tasks<S: TaskStore>(store: &S) -> Result<Vec<Task>, TaskStoreError> {
    store.get_tasks_by_status(RESUMABLE_STATUSES).await
}

/// Re-validates the price band for one resumed task. If the band is no
/// longer satisfied the task is moved to `PAUSED`; otherwise its status
/// is left as persisted. Either way a fresh `TaskContext` is seeded with
/// `baseFilledBeforeOrder := predictFilledQty` and zeroed per-order
/// counters, so subsequent fills compose onto the correct baseline.
pub async fn resume_task<M: VenueClientM>(
    venue_m: &M,
    mut task: Task,
    root_token: CancellationToken,
) -> (Task, TaskContext) {
    if !task.status.is_terminal() {
        let token_id = hedge_token_id(&task).to_string();
        let band_ok = match venue_m.get_orderbook(&token_id).await {
            Ok(book) => {
                let top = match task.direction {
                    crate::domain::task::TaskDirection::Buy => book.best_ask().map(|(p, _)| p),
                    crate::domain::task::TaskDirection::Sell => book.best_bid().map(|(p, _)| p),
                };
                match top {
                    Some(price) => match task.direction {
                        crate::domain::task::TaskDirection::Buy => price <= task.max_ask_m,
                        crate::domain::task::TaskDirection::Sell => price >= task.min_bid_m,
                    },
                    None => false,
                }
            }
            Err(e) => {
                warn!(task_id = %task.task_id, error = %e, "resume: price band check failed, pausing");
                false
            }
        };

        if !band_ok && !matches!(task.status, TaskStatus::Paused { .. }) {
            info!(task_id = %task.task_id, "resume: price band invalid, pausing");
            task.pause_count += 1;
            task.status = TaskStatus::Paused { pause_count: task.pause_count };
        } else {
            info!(task_id = %task.task_id, status = task.status.short_name(), "resume: resuming in place");
        }
    }

    let ctx = TaskContext::resumed_from(root_token, task.predict_filled_qty);
    (task, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resumable_statuses_exclude_terminal_ones() {
        assert!(!RESUMABLE_STATUSES.contains(&"COMPLETED"));
        assert!(!RESUMABLE_STATUSES.contains(&"FAILED"));
        assert!(RESUMABLE_STATUSES.contains(&"PAUSED"));
    }
}
