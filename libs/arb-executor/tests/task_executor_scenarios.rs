//! End-to-end scenario tests driving the real `TaskRunner` FSM (and, for
//! the hedge-subsystem scenario, `hedge_loop` directly) against scripted
//! venue/chain-watcher doubles. Market-maker self-cross avoidance is
//! covered by unit tests alongside `MarketMaker` itself, since its
//! delta-computation methods are private to that module.

mod common;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use arb_executor::application::task_executor::hedge::{hedge_loop, refresh_tracked_poly_fills, HedgeOutcome};
use arb_executor::application::task_executor::{recovery, ExecutorConfig, ExecutorDeps, TaskContext, TaskRunner};
use arb_executor::domain::task::{ArbSide, Task, TaskDirection, TaskStatus};
use arb_executor::infrastructure::chain_watcher::{ChainEvent, ChainWatcher};
use arb_executor::infrastructure::task_store::InMemoryTaskStore;
use arb_executor::infrastructure::venue_m::{
    MMarketInfo, MOrderStatus, MOrderStatusResponse, MOrderbook, MPlaceOrderRequest, MPlaceOrderResponse,
    Result as MResult, VenueClientM, VenueMError,
};
use arb_executor::infrastructure::venue_p::{
    POrderStatus, POrderStatusResponse, POrderbook, PPlaceOrderRequest, PPlaceOrderResponse, PPriceLevel,
    Result as PResult, VenueClientP, VenuePError,
};

/// Fires a scripted sequence of chain fill events for each watched hash,
/// with a short delay between events to let the FSM observe them one at
/// a time rather than coalesced.
struct ScriptedChainWatcher {
    scripts: Mutex<HashMap<String, Vec<ChainEvent>>>,
    delay: Duration,
}

impl ScriptedChainWatcher {
    fn new(delay: Duration) -> Self {
        Self { scripts: Mutex::new(HashMap::new()), delay }
    }

    fn script(&self, hash: impl Into<String>, events: Vec<ChainEvent>) {
        self.scripts.lock().unwrap().insert(hash.into(), events);
    }
}

#[async_trait]
impl ChainWatcher for ScriptedChainWatcher {
    fn watch_order(
        self: Arc<Self>,
        hash: String,
        events: mpsc::UnboundedSender<ChainEvent>,
        _timeout: Duration,
    ) -> CancellationToken {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let watcher = self;
        tokio::spawn(async move {
            let script = watcher.scripts.lock().unwrap().get(&hash).cloned().unwrap_or_default();
            for event in script {
                tokio::select! {
                    _ = tokio::time::sleep(watcher.delay) => {}
                    _ = task_cancel.cancelled() => return,
                }
                if events.send(event).is_err() {
                    return;
                }
            }
        });
        cancel
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Pops the front of a per-key queue while more than one entry remains,
/// otherwise keeps returning the last one — the same "stick on the final
/// scripted response" convention `PollingChainWatcher`'s own mock uses.
fn pop_or_repeat<T: Clone>(queue: &mut VecDeque<T>) -> T {
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().unwrap().clone()
    }
}

/// Venue M double: a live mutable order book shared by the price guard,
/// the depth guard, and the hedge loop (all three observe the same
/// market, exactly as they would against a real venue), plus per-order
/// scripted place/status responses.
struct ScriptedVenueM {
    orderbook: Mutex<MOrderbook>,
    place_queue: Mutex<VecDeque<(String, bool)>>,
    statuses: Mutex<HashMap<String, VecDeque<MOrderStatusResponse>>>,
}

impl ScriptedVenueM {
    fn new(orderbook: MOrderbook) -> Self {
        Self { orderbook: Mutex::new(orderbook), place_queue: Mutex::new(VecDeque::new()), statuses: Mutex::new(HashMap::new()) }
    }

    fn set_orderbook(&self, book: MOrderbook) {
        *self.orderbook.lock().unwrap() = book;
    }

    fn script_place(&self, order_id: impl Into<String>) {
        self.place_queue.lock().unwrap().push_back((order_id.into(), true));
    }

    fn script_status(&self, order_id: impl Into<String>, responses: Vec<MOrderStatusResponse>) {
        self.statuses.lock().unwrap().insert(order_id.into(), responses.into());
    }
}

#[async_trait]
impl VenueClientM for ScriptedVenueM {
    async fn place_order(&self, _req: MPlaceOrderRequest) -> MResult<MPlaceOrderResponse> {
        let (order_id, success) = self.place_queue.lock().unwrap().pop_front().expect("no scripted hedge order left");
        Ok(MPlaceOrderResponse { order_id: Some(order_id), success, error: None })
    }

    async fn get_order_status(&self, order_id: &str) -> MResult<MOrderStatusResponse> {
        let mut statuses = self.statuses.lock().unwrap();
        let queue = statuses.get_mut(order_id).unwrap_or_else(|| panic!("no scripted status for {order_id}"));
        Ok(pop_or_repeat(queue))
    }

    async fn cancel_order(&self, _order_id: &str, _timeout: Duration) -> MResult<bool> {
        Ok(true)
    }

    async fn get_orderbook(&self, _token_id: &str) -> MResult<MOrderbook> {
        Ok(self.orderbook.lock().unwrap().clone())
    }

    async fn get_market_info(&self, _condition_id: &str) -> MResult<MMarketInfo> {
        Err(VenueMError::Transport("not exercised by scenario tests".into()))
    }

    async fn get_balance(&self) -> MResult<f64> {
        Err(VenueMError::Transport("not exercised by scenario tests".into()))
    }
}

/// Venue P double: tracks how many primary orders were placed (so a
/// scenario can assert "no re-submission"), plus scripted per-hash
/// status and a fixed on-chain position for unwind's balance refresh.
struct ScriptedVenueP {
    orderbook: Mutex<POrderbook>,
    place_queue: Mutex<VecDeque<String>>,
    statuses: Mutex<HashMap<String, VecDeque<POrderStatusResponse>>>,
    position: Mutex<f64>,
    place_calls: AtomicU32,
}

impl ScriptedVenueP {
    fn new() -> Self {
        Self {
            orderbook: Mutex::new(POrderbook::default()),
            place_queue: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(HashMap::new()),
            position: Mutex::new(0.0),
            place_calls: AtomicU32::new(0),
        }
    }

    fn script_place(&self, hash: impl Into<String>) {
        self.place_queue.lock().unwrap().push_back(hash.into());
    }

    fn script_status(&self, hash: impl Into<String>, responses: Vec<POrderStatusResponse>) {
        self.statuses.lock().unwrap().insert(hash.into(), responses.into());
    }

    fn set_orderbook(&self, book: POrderbook) {
        *self.orderbook.lock().unwrap() = book;
    }

    fn set_position(&self, qty: f64) {
        *self.position.lock().unwrap() = qty;
    }

    fn place_calls(&self) -> u32 {
        self.place_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VenueClientP for ScriptedVenueP {
    async fn place_order(&self, _req: PPlaceOrderRequest) -> PResult<PPlaceOrderResponse> {
        self.place_calls.fetch_add(1, Ordering::SeqCst);
        let hash = self.place_queue.lock().unwrap().pop_front().expect("no scripted primary/unwind order left");
        Ok(PPlaceOrderResponse { hash: hash.clone(), id: hash })
    }

    async fn cancel_order(&self, _order_id: &str) -> PResult<bool> {
        Ok(true)
    }

    async fn get_order_status(&self, hash: &str) -> PResult<POrderStatusResponse> {
        let mut statuses = self.statuses.lock().unwrap();
        let queue = statuses.get_mut(hash).unwrap_or_else(|| panic!("no scripted status for {hash}"));
        Ok(pop_or_repeat(queue))
    }

    async fn get_orderbook(&self, _market_id: &str) -> PResult<POrderbook> {
        Ok(self.orderbook.lock().unwrap().clone())
    }

    async fn get_position(&self, _market_id: &str, _outcome: &str) -> PResult<f64> {
        Ok(*self.position.lock().unwrap())
    }
}

fn buy_task(target: f64, predict_price: f64, max_ask_m: f64) -> Task {
    let mut t = Task::new("scenario", TaskDirection::Buy, ArbSide::Yes, target, predict_price, max_ask_m, 0.0, None, Utc::now());
    t.market_id_p = "m1".into();
    t.yes_token_id_m = "tok".into();
    t.no_token_id_m = "tok-no".into();
    t
}

fn fast_config() -> ExecutorConfig {
    let mut c = ExecutorConfig::default();
    c.predict_poll_interval = Duration::from_millis(15);
    c.depth_check_interval = Duration::from_secs(60);
    c.hedge_backoff_base = Duration::from_millis(5);
    c
}

/// Scenario 1: happy BUY, primary fills in two chain-event chunks, both
/// hedged fully via IOC at a constant M ask.
#[tokio::test]
async fn scenario_happy_buy_completes_with_expected_profit() {
    let task = buy_task(100.0, 0.40, 0.60);

    let venue_p = Arc::new(ScriptedVenueP::new());
    venue_p.script_place("hash-1");
    venue_p.script_status("hash-1", vec![POrderStatusResponse { status: POrderStatus::Open, filled_qty: 0.0, remaining_qty: 100.0, cancel_reason: None }]);

    let venue_m = Arc::new(ScriptedVenueM::new(MOrderbook { bids: vec![], asks: vec![(0.55, 1000.0)] }));
    venue_m.script_place("o1");
    venue_m.script_place("o2");
    venue_m.script_status("o1", vec![MOrderStatusResponse { status: MOrderStatus::Matched, filled_qty: 60.0, remaining_qty: 0.0, avg_price: 0.55 }]);
    venue_m.script_status("o2", vec![MOrderStatusResponse { status: MOrderStatus::Matched, filled_qty: 40.0, remaining_qty: 0.0, avg_price: 0.55 }]);

    let chain_watcher = Arc::new(ScriptedChainWatcher::new(Duration::from_millis(5)));
    chain_watcher.script(
        "hash-1",
        vec![
            ChainEvent { tx_hash_key: 1, log_index: 0, shares_delta: 60.0, timestamp: 0 },
            ChainEvent { tx_hash_key: 1, log_index: 1, shares_delta: 40.0, timestamp: 0 },
        ],
    );

    let deps = ExecutorDeps { venue_p, venue_m, chain_watcher, store: InMemoryTaskStore::shared() };
    let runner = TaskRunner::new(deps, fast_config());
    let ctx = TaskContext::new(CancellationToken::new());

    let result = tokio::time::timeout(Duration::from_secs(5), runner.run(task, ctx))
        .await
        .expect("scenario did not reach a terminal state in time");

    assert!(matches!(result.status, TaskStatus::Completed), "expected Completed, got {:?}", result.status);
    assert_eq!(result.predict_filled_qty, 100.0);
    assert_eq!(result.hedged_qty, 100.0);
    let profit = (1.0 - result.avg_predict_price - result.avg_polymarket_price) * result.hedged_qty;
    assert!((profit - 5.0).abs() < 1e-6, "expected profit ~5.00, got {profit}");
}

/// Scenario 2: the price guard pauses the task mid-flight when M's ask
/// moves outside the band, then resumes the remainder once it returns.
#[tokio::test]
async fn scenario_price_guard_pause_then_resume_completes() {
    let task = buy_task(100.0, 0.40, 0.60);

    let venue_p = Arc::new(ScriptedVenueP::new());
    venue_p.script_place("hash-1");
    venue_p.script_place("hash-2");
    venue_p.script_status("hash-1", vec![POrderStatusResponse { status: POrderStatus::Open, filled_qty: 0.0, remaining_qty: 100.0, cancel_reason: None }]);
    venue_p.script_status("hash-2", vec![POrderStatusResponse { status: POrderStatus::Open, filled_qty: 0.0, remaining_qty: 70.0, cancel_reason: None }]);

    let venue_m = Arc::new(ScriptedVenueM::new(MOrderbook { bids: vec![], asks: vec![(0.55, 1000.0)] }));
    venue_m.script_place("o1");
    venue_m.script_place("o2");
    venue_m.script_status("o1", vec![MOrderStatusResponse { status: MOrderStatus::Matched, filled_qty: 30.0, remaining_qty: 0.0, avg_price: 0.55 }]);
    venue_m.script_status("o2", vec![MOrderStatusResponse { status: MOrderStatus::Matched, filled_qty: 70.0, remaining_qty: 0.0, avg_price: 0.55 }]);

    let chain_watcher = Arc::new(ScriptedChainWatcher::new(Duration::from_millis(5)));
    chain_watcher.script("hash-1", vec![ChainEvent { tx_hash_key: 1, log_index: 0, shares_delta: 30.0, timestamp: 0 }]);
    chain_watcher.script("hash-2", vec![ChainEvent { tx_hash_key: 2, log_index: 0, shares_delta: 70.0, timestamp: 0 }]);

    // Narrative compressed from the scenario's 5-second window onto a
    // millisecond scale: ask crosses the 0.60 ceiling, then returns.
    {
        let venue_m = venue_m.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            venue_m.set_orderbook(MOrderbook { bids: vec![], asks: vec![(0.62, 1000.0)] });
            tokio::time::sleep(Duration::from_millis(50)).await;
            venue_m.set_orderbook(MOrderbook { bids: vec![], asks: vec![(0.55, 1000.0)] });
        });
    }

    let deps = ExecutorDeps { venue_p, venue_m, chain_watcher, store: InMemoryTaskStore::shared() };
    let runner = TaskRunner::new(deps, fast_config());
    let ctx = TaskContext::new(CancellationToken::new());

    let result = tokio::time::timeout(Duration::from_secs(5), runner.run(task, ctx))
        .await
        .expect("scenario did not reach a terminal state in time");

    assert!(matches!(result.status, TaskStatus::Completed), "expected Completed, got {:?}", result.status);
    assert_eq!(result.pause_count, 1);
    assert_eq!(result.predict_filled_qty, 100.0);
    assert_eq!(result.hedged_qty, 100.0);
}

/// Scenario 3: hedging exhausts its retry budget with a partial fill;
/// the residual is unwound on P.
#[tokio::test]
async fn scenario_partial_hedge_unwinds_residual() {
    let task = buy_task(50.0, 0.45, 0.60);

    let venue_p = Arc::new(ScriptedVenueP::new());
    venue_p.script_place("hash-1");
    venue_p.script_status("hash-1", vec![POrderStatusResponse { status: POrderStatus::Open, filled_qty: 0.0, remaining_qty: 50.0, cancel_reason: None }]);
    venue_p.script_place("unwind-1");
    venue_p.script_status("unwind-1", vec![POrderStatusResponse { status: POrderStatus::Filled, filled_qty: 20.0, remaining_qty: 0.0, cancel_reason: None }]);
    venue_p.set_position(20.0);
    venue_p.set_orderbook(POrderbook { bids: vec![PPriceLevel { price: 0.38, size: 100.0 }], asks: vec![PPriceLevel { price: 0.60, size: 100.0 }] });

    let venue_m = Arc::new(ScriptedVenueM::new(MOrderbook { bids: vec![], asks: vec![(0.55, 1000.0)] }));
    venue_m.script_place("o1");
    venue_m.script_place("o2");
    venue_m.script_place("o3");
    // Depth within the band only covers 30: two partial IOC fills (20, 10)
    // exhaust the available liquidity, then a third attempt fills nothing.
    venue_m.script_status("o1", vec![MOrderStatusResponse { status: MOrderStatus::Cancelled, filled_qty: 20.0, remaining_qty: 30.0, avg_price: 0.55 }]);
    venue_m.script_status("o2", vec![MOrderStatusResponse { status: MOrderStatus::Cancelled, filled_qty: 10.0, remaining_qty: 20.0, avg_price: 0.55 }]);
    venue_m.script_status("o3", vec![MOrderStatusResponse { status: MOrderStatus::Cancelled, filled_qty: 0.0, remaining_qty: 20.0, avg_price: 0.0 }]);

    let chain_watcher = Arc::new(ScriptedChainWatcher::new(Duration::from_millis(5)));
    chain_watcher.script("hash-1", vec![ChainEvent { tx_hash_key: 1, log_index: 0, shares_delta: 50.0, timestamp: 0 }]);

    let deps = ExecutorDeps { venue_p, venue_m, chain_watcher, store: InMemoryTaskStore::shared() };
    let runner = TaskRunner::new(deps, fast_config());
    let ctx = TaskContext::new(CancellationToken::new());

    let result = tokio::time::timeout(Duration::from_secs(5), runner.run(task, ctx))
        .await
        .expect("scenario did not reach a terminal state in time");

    match result.status {
        TaskStatus::UnwindCompleted { unwind_qty, unwind_loss } => {
            assert!((unwind_qty - 20.0).abs() < 1e-6, "expected unwindQty 20, got {unwind_qty}");
            assert!(unwind_loss > 0.0, "expected a recorded unwind loss, got {unwind_loss}");
            assert!((unwind_loss - 1.4).abs() < 1e-6, "expected unwindLoss ~1.40, got {unwind_loss}");
        }
        other => panic!("expected UnwindCompleted, got {other:?}"),
    }
    assert_eq!(result.hedged_qty, 30.0);
}

/// Scenario 4: a late-arriving M confirmation upgrades an already-placed
/// order's filled quantity after a second hedge order has been placed.
/// The upgrade's delta is applied exactly once and no duplicate hedge
/// results from it.
#[tokio::test]
async fn scenario_late_confirmation_applies_delta_exactly_once() {
    let mut task = buy_task(100.0, 0.40, 0.60);
    task.predict_filled_qty = 50.0;

    let venue_m = Arc::new(ScriptedVenueM::new(MOrderbook { bids: vec![], asks: vec![(0.55, 1000.0)] }));
    venue_m.script_place("o1");
    venue_m.script_place("o2");
    venue_m.script_place("o3");
    // o1: watched at 15, re-polled unchanged, then upgraded to 20 only
    // once o2 already exists.
    venue_m.script_status(
        "o1",
        vec![
            MOrderStatusResponse { status: MOrderStatus::Cancelled, filled_qty: 15.0, remaining_qty: 35.0, avg_price: 0.55 },
            MOrderStatusResponse { status: MOrderStatus::Cancelled, filled_qty: 15.0, remaining_qty: 35.0, avg_price: 0.55 },
            MOrderStatusResponse { status: MOrderStatus::Cancelled, filled_qty: 20.0, remaining_qty: 30.0, avg_price: 0.55 },
        ],
    );
    venue_m.script_status("o2", vec![MOrderStatusResponse { status: MOrderStatus::Cancelled, filled_qty: 20.0, remaining_qty: 15.0, avg_price: 0.55 }]);
    venue_m.script_status("o3", vec![MOrderStatusResponse { status: MOrderStatus::Matched, filled_qty: 10.0, remaining_qty: 0.0, avg_price: 0.55 }]);

    let config = fast_config();
    let mut ctx = TaskContext::new(CancellationToken::new());

    let outcome = hedge_loop(&*venue_m, &mut task, &mut ctx, &config).await;

    assert_eq!(outcome, HedgeOutcome::Completed);
    // 20 (o1, after the upgrade) + 20 (o2) + 10 (o3) = 50, matching the
    // full unhedged balance; the 5-unit late delta contributed once.
    assert!((task.hedged_qty - 50.0).abs() < 1e-6, "expected hedgedQty 50, got {}", task.hedged_qty);

    let before = task.hedged_qty;
    refresh_tracked_poly_fills(&*venue_m, &mut ctx, &mut task).await;
    assert_eq!(task.hedged_qty, before, "re-polling settled orders must not re-apply their delta");
}

/// Scenario 5: a process restart mid-HEDGING resumes hedging the
/// unhedged residual without re-submitting the already-filled primary.
#[tokio::test]
async fn scenario_restart_mid_flight_resumes_hedging_only() {
    let mut task = buy_task(100.0, 0.40, 0.60);
    task.predict_filled_qty = 70.0;
    task.hedged_qty = 40.0;
    task.status = TaskStatus::Hedging;
    task.current_order_hash_p = Some("hash-orig".to_string());

    let venue_p = Arc::new(ScriptedVenueP::new());
    venue_p.script_status("hash-orig", vec![POrderStatusResponse { status: POrderStatus::Open, filled_qty: 70.0, remaining_qty: 30.0, cancel_reason: None }]);

    let venue_m = Arc::new(ScriptedVenueM::new(MOrderbook { bids: vec![], asks: vec![(0.55, 1000.0)] }));
    venue_m.script_place("o1");
    venue_m.script_status("o1", vec![MOrderStatusResponse { status: MOrderStatus::Matched, filled_qty: 30.0, remaining_qty: 0.0, avg_price: 0.55 }]);

    let chain_watcher = Arc::new(ScriptedChainWatcher::new(Duration::from_millis(5)));
    // No further on-chain fills arrive; the existing hash is only watched,
    // never resubmitted.

    let (task, ctx) = recovery::resume_task(&*venue_m, task, CancellationToken::new()).await;
    assert!(!matches!(task.status, TaskStatus::Paused { .. }), "price band was still valid, task should not pause on resume");

    let root = ctx.root_token.clone();
    let venue_p_for_deps = venue_p.clone();
    let deps = ExecutorDeps { venue_p: venue_p_for_deps, venue_m, chain_watcher, store: InMemoryTaskStore::shared() };
    let runner = TaskRunner::new(deps, fast_config());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        root.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), runner.run(task, ctx))
        .await
        .expect("scenario did not stop in time");

    assert_eq!(result.hedged_qty, 70.0, "hedge should resume and cover the full unhedged residual");
    assert_eq!(venue_p.place_calls(), 0, "resumed task must not re-submit the already-filled primary order");
}
