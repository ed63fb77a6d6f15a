//! Swap Bridge - Service Entry Point
//!
//! Run modes:
//!   swapbridge api       - Start REST API server
//!   swapbridge settle    - Start the settlement worker loop
//!   swapbridge all       - Run both in one process
//!   swapbridge help      - Show usage

use std::env;
use std::sync::Arc;
use std::time::Duration;

use swapbridge::api::{self, AppState};
use swapbridge::chains::{ChainRegistry, ForeignChainClient, HomeLedgerClient};
use swapbridge::config::BridgeConfig;
use swapbridge::logging;
use swapbridge::settlement::{DispatchConfig, SettlementDispatcher, SettlementOrchestrator};
use swapbridge::storage::{LedgerStore, SqliteLedgerStore};
use swapbridge::BridgeError;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let mode = args.get(1).map(String::as_str).unwrap_or("help");

    if matches!(mode, "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_from_config(&config) {
        eprintln!("Logging error: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let result = match mode {
        "api" => run_api(&config).await,
        "settle" => run_settle(&config).await,
        "all" => run_all(&config).await,
        _ => {
            print_usage();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Swap Bridge - Two-Network Token Swap Backend");
    println!();
    println!("Usage:");
    println!("  swapbridge api       Start REST API server");
    println!("  swapbridge settle    Start the settlement worker loop");
    println!("  swapbridge all       Run both in one process");
    println!();
    println!("Environment Variables:");
    println!("  SWAPBRIDGE_HOME_URL            Home ledger RPC endpoint");
    println!("  SWAPBRIDGE_FOREIGN_URL         Foreign chain REST endpoint");
    println!("  SWAPBRIDGE_DB_PATH             SQLite database path");
    println!("  SWAPBRIDGE_HOME_ASSET          Denomination tag for home payouts");
    println!("  SWAPBRIDGE_WITHDRAWAL_FEE      Withdrawal fee in whole coins");
    println!("  SWAPBRIDGE_POLL_INTERVAL_SECS  Settlement loop interval");
    println!("  SWAPBRIDGE_API_PORT            REST API port (default: 3030)");
    println!("  SWAPBRIDGE_LOG_LEVEL           Logging level (default: info)");
}

/// Build the chain registry from the configured endpoints
fn build_registry(config: &BridgeConfig) -> Result<Arc<ChainRegistry>, BridgeError> {
    let timeout = Duration::from_secs(config.http_timeout_secs);
    let mut registry = ChainRegistry::new();

    if let Some(url) = &config.home_url {
        registry = registry.with_home(Arc::new(HomeLedgerClient::new(url, timeout)?));
    }
    if let Some(url) = &config.foreign_url {
        registry = registry.with_foreign(Arc::new(ForeignChainClient::new(url, timeout)?));
    }

    Ok(Arc::new(registry))
}

fn open_store(config: &BridgeConfig) -> Result<Arc<dyn LedgerStore>, BridgeError> {
    Ok(Arc::new(SqliteLedgerStore::new(&config.db_path)?))
}

fn build_orchestrator(
    config: &BridgeConfig,
    store: Arc<dyn LedgerStore>,
    chains: Arc<ChainRegistry>,
) -> SettlementOrchestrator {
    let dispatcher = SettlementDispatcher::new(
        chains,
        DispatchConfig {
            home_asset: config.home_asset.clone(),
            withdrawal_fee_coins: config.withdrawal_fee_coins,
        },
    );
    SettlementOrchestrator::new(store, dispatcher, Duration::from_secs(config.poll_interval_secs))
}

async fn run_api(config: &BridgeConfig) -> Result<(), BridgeError> {
    let store = open_store(config)?;
    let chains = build_registry(config)?;

    api::start_server(AppState::new(store, chains), config.api_port).await
}

async fn run_settle(config: &BridgeConfig) -> Result<(), BridgeError> {
    let store = open_store(config)?;
    let chains = build_registry(config)?;

    build_orchestrator(config, store, chains).run().await;
    Ok(())
}

async fn run_all(config: &BridgeConfig) -> Result<(), BridgeError> {
    let store = open_store(config)?;
    let chains = build_registry(config)?;

    let orchestrator = build_orchestrator(config, store.clone(), chains.clone());
    let server = api::start_server(AppState::new(store, chains), config.api_port);

    tokio::select! {
        result = server => result,
        _ = orchestrator.run() => Ok(()),
    }
}
