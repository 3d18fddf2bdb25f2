//! Task Executor binary: runs the cross-venue arbitrage FSM for every
//! task in the store, recovering in-flight tasks on startup and picking
//! up newly-submitted ones until a shutdown signal arrives.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arb_executor::application::init_logging_with_level;
use arb_executor::application::market_maker::MarketMaker;
use arb_executor::application::task_executor::{recovery, ExecutorDeps, TaskRunner};
use arb_executor::infrastructure::client::clob::TradingClient;
use arb_executor::infrastructure::config::ExecutorConfig as ExecutorBinConfig;
use arb_executor::infrastructure::chain_watcher::PollingChainWatcher;
use arb_executor::infrastructure::shutdown::ShutdownManager;
use arb_executor::infrastructure::task_store::{PgTaskStore, TaskStore};
use arb_executor::infrastructure::venue_m::PolymarketVenueM;
use arb_executor::infrastructure::venue_p::RestVenueP;
use arb_executor_bot::bin_common::{load_config_from_env, ConfigType};
use ethers::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = load_config_from_env(ConfigType::Executor);
    let config = ExecutorBinConfig::load(&config_path)?;

    init_logging_with_level(&config.log_level);
    config.log();

    info!("");
    info!("========================================");
    info!("Starting arb-executor");
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.spawn_signal_handler();

    info!("Initializing venue M trading client...");
    let trading = TradingClient::from_env().await?;
    info!(
        signer = ?trading.signer_address(),
        maker = ?trading.maker_address(),
        "venue M trading client ready"
    );
    let venue_m = Arc::new(PolymarketVenueM::new(trading));

    info!("Initializing venue P REST client...");
    let rpc_provider = Arc::new(Provider::<Http>::try_from(config.venue_p_rpc_url.as_str())?);
    let wallet_address: Address = std::env::var("WALLET_ADDRESS")
        .map_err(|_| anyhow::anyhow!("WALLET_ADDRESS environment variable is required"))?
        .parse()?;
    let venue_p = Arc::new(RestVenueP::new(config.venue_p_base_url.clone(), rpc_provider, wallet_address));

    let chain_watcher = Arc::new(PollingChainWatcher::new(venue_p.clone()));

    info!("Connecting task store...");
    let store = Arc::new(PgTaskStore::new(&config.database.url).await?);

    let root_token = CancellationToken::new();
    let mut in_flight: HashSet<String> = HashSet::new();
    let mut handles = Vec::new();

    // Market-Maker workers: one per configured market, run independently
    // of the Task Store driven arbitrage loop and cancelled on shutdown
    // alongside it.
    for spec in &config.market_maker_markets {
        info!(market_id = %spec.market_id, outcome = %spec.outcome, "starting market maker worker");
        let mm = MarketMaker::new(venue_p.clone(), spec.market_id.clone(), spec.outcome.clone(), config.market_maker.clone());
        let mm_token = root_token.child_token();
        handles.push(tokio::spawn(mm.run(mm_token)));
    }

    let deps = ExecutorDeps {
        venue_p,
        venue_m: venue_m.clone(),
        chain_watcher,
        store: store.clone(),
    };
    let runtime_config = config.to_executor_runtime_config();
    let runner = Arc::new(TaskRunner::new(deps, runtime_config));

    // Restart recovery: re-validate the price band for every task left
    // in a non-terminal status and resume its FSM.
    info!("Loading resumable tasks...");
    let resumable = recovery::load_resumable_tasks(store.as_ref()).await?;
    info!(count = resumable.len(), "resumable tasks loaded");

    for task in resumable {
        let task_id = task.task_id.clone();
        in_flight.insert(task_id.clone());
        let (task, ctx) = recovery::resume_task(venue_m.as_ref(), task, root_token.child_token()).await;

        let runner = runner.clone();
        handles.push(tokio::spawn(async move {
            let final_task = runner.run(task, ctx).await;
            info!(task_id, status = final_task.status.short_name(), "task run finished");
        }));
    }

    // Pick up newly-submitted PENDING tasks from the store until shutdown.
    let poll_interval = Duration::from_secs(config.resumable_poll_interval_secs);
    while shutdown.is_running() {
        match store.get_tasks_by_status(&["PENDING"]).await {
            Ok(pending) => {
                for task in pending {
                    if !in_flight.insert(task.task_id.clone()) {
                        continue;
                    }
                    let task_id = task.task_id.clone();
                    let ctx = arb_executor::application::task_executor::TaskContext::new(root_token.child_token());
                    let runner = runner.clone();
                    handles.push(tokio::spawn(async move {
                        let final_task = runner.run(task, ctx).await;
                        info!(task_id, status = final_task.status.short_name(), "task run finished");
                    }));
                }
            }
            Err(e) => warn!(error = %e, "failed to poll for pending tasks"),
        }

        shutdown.interruptible_sleep(poll_interval).await;
    }

    info!("Shutdown signal received, cancelling running tasks...");
    root_token.cancel();

    let join_all = futures::future::join_all(handles);
    match tokio::time::timeout(runtime_config.shutdown_timeout, join_all).await {
        Ok(_) => info!("All task workers finished"),
        Err(_) => error!("Timed out waiting for task workers to finish"),
    }

    info!("");
    info!("========================================");
    info!("arb-executor stopped gracefully");
    info!("========================================");

    Ok(())
}
