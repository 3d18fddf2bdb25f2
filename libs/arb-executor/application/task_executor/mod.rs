//! Task Executor: owns a `TaskContext` per running task, drives the
//! per-task FSM, and composes the Venue Clients, Chain Watcher, Order
//! Monitor, and Task Store.
//!
//! Each Executor instance takes an explicit dependency record rather
//! than reaching for a shared singleton, per the "shared singletons to
//! explicit dependency records" design note: `ExecutorDeps` bundles the
//! two venue clients, the chain watcher, and the task store behind
//! `Arc`s so a single clone is cheap to pass to each spawned task
//! worker.

pub mod context;
pub mod fsm;
pub mod hedge;
pub mod recovery;
pub mod unwind;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::chain_watcher::{ChainWatcher, ChainWatcherError};
use crate::infrastructure::task_store::{TaskStore, TaskStoreError};
use crate::infrastructure::venue_m::{VenueClientM, VenueMError};
use crate::infrastructure::venue_p::{VenuePError, VenueClientP};

pub use context::{ChainFillEvent, PolyOrderFill, TaskContext};
pub use fsm::TaskRunner;

/// Structured errors an Executor run can surface to the operator, in
/// place of ad-hoc strings (see the error taxonomy table).
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("venue rejection ({kind}): {detail}")]
    VenueRejection { kind: String, detail: String },
    #[error("price band violation: book moved outside [{floor}, {ceil}]")]
    PriceBandViolation { floor: f64, ceil: f64 },
    #[error("signature/domain error: {0}")]
    SignatureDomain(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl From<VenuePError> for ExecutorError {
    fn from(e: VenuePError) -> Self {
        match e {
            VenuePError::Transport(msg) => ExecutorError::Transport(msg),
            VenuePError::SignatureMismatch => ExecutorError::SignatureDomain(e.to_string()),
            other => ExecutorError::VenueRejection { kind: "venue_p".into(), detail: other.to_string() },
        }
    }
}

impl From<VenueMError> for ExecutorError {
    fn from(e: VenueMError) -> Self {
        match e {
            VenueMError::Transport(msg) => ExecutorError::Transport(msg),
            VenueMError::SignatureDomain(msg) => ExecutorError::SignatureDomain(msg),
            VenueMError::VenueRejection(msg) => ExecutorError::VenueRejection { kind: "venue_m".into(), detail: msg },
        }
    }
}

impl From<ChainWatcherError> for ExecutorError {
    fn from(e: ChainWatcherError) -> Self {
        match e {
            ChainWatcherError::VenueP(msg) => ExecutorError::Transport(msg),
        }
    }
}

impl From<TaskStoreError> for ExecutorError {
    fn from(e: TaskStoreError) -> Self {
        ExecutorError::Transport(e.to_string())
    }
}

/// Poll intervals, retry budgets, and concurrency knobs. Mirrors the
/// `ScannerConfig`/`RiskConfig` layering convention: loaded from YAML,
/// with defaults for anything operator-tunable.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub predict_poll_interval: Duration,
    pub depth_check_interval: Duration,
    pub expiry_sweep_interval: Duration,
    pub max_hedge_retries: u32,
    pub hedge_backoff_base: Duration,
    pub min_hedge_qty: f64,
    pub max_pause: u32,
    pub concurrency: usize,
    pub shutdown_timeout: Duration,
    pub order_watch_interval: Duration,
    pub order_watch_max_retries: u32,
    pub cancel_p_timeout: Duration,
    pub cancel_m_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            predict_poll_interval: Duration::from_millis(500),
            depth_check_interval: Duration::from_secs(5),
            expiry_sweep_interval: Duration::from_secs(30),
            max_hedge_retries: 3,
            hedge_backoff_base: Duration::from_secs(1),
            min_hedge_qty: crate::domain::task::MIN_HEDGE_QTY,
            max_pause: 5,
            concurrency: 4,
            shutdown_timeout: Duration::from_secs(60),
            order_watch_interval: Duration::from_millis(500),
            order_watch_max_retries: 10,
            cancel_p_timeout: Duration::from_secs(8),
            cancel_m_timeout: Duration::from_secs(5),
        }
    }
}

/// Explicit dependency record handed to every spawned task worker.
pub struct ExecutorDeps<P, M, C, S>
where
    P: VenueClientP + 'static,
    M: VenueClientM + 'static,
    C: ChainWatcher + 'static,
    S: TaskStore + 'static,
{
    pub venue_p: Arc<P>,
    pub venue_m: Arc<M>,
    pub chain_watcher: Arc<C>,
    pub store: Arc<S>,
}

impl<P, M, C, S> Clone for ExecutorDeps<P, M, C, S>
where
    P: VenueClientP + 'static,
    M: VenueClientM + 'static,
    C: ChainWatcher + 'static,
    S: TaskStore + 'static,
{
    fn clone(&self) -> Self {
        Self {
            venue_p: self.venue_p.clone(),
            venue_m: self.venue_m.clone(),
            chain_watcher: self.chain_watcher.clone(),
            store: self.store.clone(),
        }
    }
}
