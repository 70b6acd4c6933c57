use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sigtrade_bot_orchestrator::{EngineHandle, TradingEngine};
use sigtrade_core::{ConfigLoader, ExchangeGateway, Notifier};
use sigtrade_exchange_bybit::{BybitClient, BybitGateway, PaperGateway};
use sigtrade_telegram::{NullNotifier, TelegramNotifier, TelegramSignalSource};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "sigtrade")]
#[command(about = "Signal-driven trading bot for Bybit USDT perpetuals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading bot
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config } => run_bot(&config).await?,
    }

    Ok(())
}

async fn run_bot(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;

    let client = BybitClient::new(
        config.bybit.api_url.clone(),
        config.bybit.api_key.clone(),
        config.bybit.api_secret.clone(),
        config.bybit.recv_window_ms,
    );
    let live = BybitGateway::new(client);

    let gateway: Arc<dyn ExchangeGateway> = if config.trading.dry_run {
        tracing::info!(
            start_balance = %config.trading.paper_start_balance,
            "dry run enabled, orders are simulated"
        );
        Arc::new(PaperGateway::new(live, config.trading.paper_start_balance))
    } else {
        Arc::new(live)
    };

    // Refusing to trade blind: if the account cannot be read now, it will
    // not be readable mid-trade either.
    let start_balance = gateway
        .wallet_balance()
        .await
        .context("startup balance query failed, not starting")?;
    tracing::info!(%start_balance, "account balance confirmed");

    let notifier: Arc<dyn Notifier> = if config.trading.dry_run {
        Arc::new(NullNotifier)
    } else {
        Arc::new(TelegramNotifier::new(
            &config.telegram.bot_token,
            config.telegram.notify_chat_id,
        ))
    };
    if let Err(e) = notifier
        .send_message(&format!(
            "sigtrade started: balance {:.2} USDT, {} allowed symbols, leverage {}x",
            start_balance,
            config.trading.allowed_symbols.len(),
            config.trading.leverage
        ))
        .await
    {
        tracing::warn!(error = %e, "startup notification failed");
    }

    let (command_tx, command_rx) = mpsc::channel(32);
    let engine = TradingEngine::new(
        config.trading.clone(),
        config.engine.clone(),
        gateway,
        Arc::clone(&notifier),
        start_balance,
        command_rx,
    );
    let handle = EngineHandle::new(command_tx);
    let engine_task = tokio::spawn(engine.run());
    handle.start_monitoring().await?;

    let (signal_tx, mut signal_rx) = mpsc::channel::<String>(32);
    let source =
        TelegramSignalSource::new(&config.telegram.bot_token, config.telegram.signal_chat_id);
    tokio::spawn(source.run(signal_tx));

    let forward = handle.clone();
    tokio::spawn(async move {
        while let Some(text) = signal_rx.recv().await {
            if forward.message(text).await.is_err() {
                break;
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown requested");
    if let Err(e) = notifier.send_message("sigtrade shutting down").await {
        tracing::warn!(error = %e, "shutdown notification failed");
    }
    handle.shutdown().await?;
    engine_task.await.context("engine task panicked")??;

    Ok(())
}
