use crate::commands::{EngineCommand, EngineStatus};
use crate::report;
use crate::tracker::PositionTracker;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sigtrade_core::{
    compute_sizing, EngineConfig, ExchangeGateway, Notifier, PositionIdx, Signal, SignalDetails,
    SizingParams, TrackedPosition, TradingConfig,
};
use sigtrade_signals::{SignalParser, SignalValidator, ValidationContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// The engine actor.
///
/// Owns the tracker and processes every command, reconciliation pass and
/// report timer on its own task. Because nothing else touches the tracker,
/// an open and a close for the same symbol can never interleave.
pub struct TradingEngine {
    trading: TradingConfig,
    engine: EngineConfig,
    gateway: Arc<dyn ExchangeGateway>,
    notifier: Arc<dyn Notifier>,
    parser: SignalParser,
    validator: SignalValidator,
    tracker: PositionTracker,
    rx: mpsc::Receiver<EngineCommand>,
    monitoring: bool,
}

impl TradingEngine {
    #[must_use]
    pub fn new(
        trading: TradingConfig,
        engine: EngineConfig,
        gateway: Arc<dyn ExchangeGateway>,
        notifier: Arc<dyn Notifier>,
        start_balance: Decimal,
        rx: mpsc::Receiver<EngineCommand>,
    ) -> Self {
        let validator = SignalValidator::new(&trading);
        Self {
            parser: SignalParser::new(),
            validator,
            tracker: PositionTracker::new(start_balance, Utc::now().date_naive()),
            trading,
            engine,
            gateway,
            notifier,
            rx,
            monitoring: false,
        }
    }

    /// Runs the engine loop until shutdown or until every handle is dropped.
    ///
    /// # Errors
    /// Currently infallible; the signature leaves room for startup checks.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(dry_run = self.trading.dry_run, "trading engine started");

        let mut reconcile_timer = tokio::time::interval(Duration::from_secs(
            self.engine.reconcile_interval_secs.max(1),
        ));
        reconcile_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // Intervals yield once immediately; burn that tick so the first
        // reconciliation pass waits a full period.
        reconcile_timer.tick().await;

        let mut report_at = report::next_report_time(Utc::now(), self.engine.report_hour_utc);

        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(EngineCommand::Message(text)) => self.handle_message(text).await,
                    Some(EngineCommand::StartMonitoring) => {
                        tracing::info!("position monitoring enabled");
                        self.monitoring = true;
                    }
                    Some(EngineCommand::StopMonitoring) => {
                        tracing::info!("position monitoring disabled");
                        self.monitoring = false;
                    }
                    Some(EngineCommand::GetStatus(reply)) => {
                        let _ = reply.send(self.status());
                    }
                    Some(EngineCommand::Shutdown) | None => {
                        tracing::info!("trading engine shutting down");
                        break;
                    }
                },
                _ = reconcile_timer.tick(), if self.monitoring => self.reconcile_pass().await,
                () = sleep_until(report_at) => {
                    self.send_daily_report().await;
                    report_at = report::next_report_time(Utc::now(), self.engine.report_hour_utc);
                }
            }
        }
        Ok(())
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            monitoring: self.monitoring,
            open_positions: self.tracker.open_positions(),
            statistics: self.tracker.statistics().clone(),
        }
    }

    async fn handle_message(&mut self, text: String) {
        let Some(signal) = self.parser.parse_signal(&text) else {
            return;
        };
        self.tracker.statistics_mut().total_signals += 1;
        tracing::info!(
            kind = signal.kind_str(),
            symbol = signal.symbol(),
            direction = %signal.direction(),
            "signal received"
        );

        let outcome = match &signal {
            Signal::Open(details) => self.handle_open(details, Utc::now()).await,
            Signal::Close(details) => self.handle_close(details).await,
        };
        if let Err(e) = outcome {
            tracing::error!(
                kind = signal.kind_str(),
                symbol = signal.symbol(),
                error = ?e,
                "signal processing failed"
            );
            self.notify(&format!(
                "{} {} failed: {e:#}",
                signal.kind_str(),
                signal.symbol()
            ))
            .await;
        }
    }

    /// Full open lifecycle: gates, sizing, leverage, entry order, tracking.
    ///
    /// Gate rejections are expected outcomes and return `Ok`; only exchange
    /// failures after validation propagate as errors.
    async fn handle_open(&mut self, details: &SignalDetails, now: DateTime<Utc>) -> Result<()> {
        let ctx = ValidationContext {
            symbol_already_tracked: self.tracker.has_open_position(&details.symbol),
            open_positions: self.tracker.open_positions_count(),
            daily_trades: self.tracker.statistics().daily_trades,
        };
        let validated = match self
            .validator
            .validate_open(details, ctx, now, self.gateway.as_ref())
            .await
        {
            Ok(validated) => validated,
            Err(reason) => {
                if reason.is_trading_hours() {
                    self.tracker.statistics_mut().signals_ignored += 1;
                }
                tracing::info!(symbol = %details.symbol, %reason, "open signal rejected");
                self.notify(&format!(
                    "Signal ignored: {} {} ({reason})",
                    details.symbol, details.direction
                ))
                .await;
                return Ok(());
            }
        };

        let entry_price = self
            .gateway
            .current_price(&details.symbol)
            .await
            .context("price lookup failed")?;

        let params = SizingParams {
            position_size_pct: self.trading.position_size_pct,
            leverage: self.trading.leverage,
        };
        let sizing = match compute_sizing(
            validated.balance,
            entry_price,
            details.direction,
            &validated.instrument,
            &params,
        ) {
            Ok(sizing) => sizing,
            Err(reason) => {
                tracing::info!(symbol = %details.symbol, %reason, "open signal not sized");
                self.notify(&format!(
                    "Signal ignored: {} {} ({reason})",
                    details.symbol, details.direction
                ))
                .await;
                return Ok(());
            }
        };

        let position_idx = PositionIdx::for_direction(self.trading.position_mode, details.direction);
        self.gateway
            .set_leverage(&details.symbol, self.trading.leverage)
            .await
            .context("leverage setup failed")?;
        let order = self
            .gateway
            .open_market_order(
                &details.symbol,
                details.direction.entry_side(),
                sizing.quantity,
                position_idx,
            )
            .await
            .context("entry order failed")?;

        let entry_price = order.price.unwrap_or(entry_price);
        self.tracker.add_open_position(TrackedPosition {
            symbol: details.symbol.clone(),
            direction: details.direction,
            entry_price,
            quantity: order.quantity,
            order_id: order.order_id.clone(),
            opened_at: now,
            position_idx,
            position_size_notional: sizing.position_size_notional,
        })?;
        {
            let statistics = self.tracker.statistics_mut();
            statistics.total_trades += 1;
            statistics.daily_trades += 1;
            statistics.current_balance = validated.balance;
        }

        tracing::info!(
            symbol = %details.symbol,
            direction = %details.direction,
            quantity = %order.quantity,
            entry_price = %entry_price,
            order_id = %order.order_id,
            "position opened"
        );
        self.notify(&format!(
            "Opened {} {} qty {} @ {} ({}x)",
            details.symbol,
            details.direction,
            order.quantity.normalize(),
            entry_price.normalize(),
            self.trading.leverage
        ))
        .await;
        Ok(())
    }

    /// Close lifecycle. A close for an untracked symbol is a quiet no-op:
    /// the channel broadcasts closes for symbols this account never opened.
    async fn handle_close(&mut self, details: &SignalDetails) -> Result<()> {
        let Some(position) = self.tracker.open_position(&details.symbol).cloned() else {
            tracing::warn!(
                symbol = %details.symbol,
                "close signal for untracked symbol, nothing to do"
            );
            return Ok(());
        };

        if position.direction != details.direction {
            tracing::warn!(
                symbol = %details.symbol,
                tracked = %position.direction,
                signal = %details.direction,
                "close signal direction mismatch, not closing"
            );
            self.notify(&format!(
                "Direction mismatch on close for {}: tracked {}, signal {}. Position left open.",
                details.symbol, position.direction, details.direction
            ))
            .await;
            return Ok(());
        }

        self.gateway
            .close_market_order(
                &position.symbol,
                position.direction.exit_side(),
                position.quantity,
                position.position_idx,
            )
            .await
            .context("exit order failed")?;

        if self.trading.dry_run {
            // The simulated book drops the position at order time, so the
            // reconciler would never observe this closure. Settle it now.
            let exit_price = self
                .gateway
                .current_price(&position.symbol)
                .await
                .unwrap_or(position.entry_price);
            let pnl = position.pnl_at(exit_price);
            self.tracker.remove_open_position(&position.symbol);
            self.tracker.record_trade_result(pnl);
            if let Ok(balance) = self.gateway.wallet_balance().await {
                self.tracker.statistics_mut().current_balance = balance;
            }
            tracing::info!(
                symbol = %position.symbol,
                exit_price = %exit_price,
                pnl = %pnl,
                "position closed"
            );
            self.notify(&format!(
                "Closed {} {} @ {} P&L {:.2} USDT",
                position.symbol,
                position.direction,
                exit_price.normalize(),
                pnl
            ))
            .await;
        } else {
            // Live positions stay tracked until the reconciler sees the
            // exchange report them gone.
            tracing::info!(
                symbol = %position.symbol,
                "exit order submitted, awaiting exchange confirmation"
            );
            self.notify(&format!(
                "Close submitted for {} {}",
                position.symbol, position.direction
            ))
            .await;
        }
        Ok(())
    }

    async fn reconcile_pass(&mut self) {
        match self.tracker.reconcile(self.gateway.as_ref()).await {
            Ok(closes) => {
                for close in &closes {
                    let held = close.closed_at - close.position.opened_at;
                    self.notify(&format!(
                        "{} {} closed on exchange after {}m: entry {}, exit {}, P&L {:.2} USDT",
                        close.position.symbol,
                        close.position.direction,
                        held.num_minutes(),
                        close.position.entry_price.normalize(),
                        close.exit_price.normalize(),
                        close.pnl
                    ))
                    .await;
                }
                if !closes.is_empty() {
                    if let Ok(balance) = self.gateway.wallet_balance().await {
                        self.tracker.statistics_mut().current_balance = balance;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "reconciliation pass skipped");
            }
        }
    }

    /// Sends the daily summary, then rolls the per-day counters once the
    /// UTC date has advanced. The report always covers the day it closes.
    async fn send_daily_report(&mut self) {
        if let Ok(balance) = self.gateway.wallet_balance().await {
            self.tracker.statistics_mut().current_balance = balance;
        }
        let now = Utc::now();
        let rendered = report::format_daily_report(
            self.tracker.statistics(),
            &self.tracker.open_positions(),
            now,
        );
        self.notify(&rendered).await;

        let today = now.date_naive();
        if self.tracker.statistics().rollover_due(today) {
            self.tracker.reset_daily_statistics(today);
        }
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send_message(text).await {
            tracing::warn!(error = %e, "notification failed");
        }
    }
}

async fn sleep_until(target: DateTime<Utc>) {
    let wait = (target - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    tokio::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::EngineHandle;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use sigtrade_core::{
        Direction, ExchangePosition, InstrumentInfo, OrderResult, OrderSide, PositionMode,
        TradingHours,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockGateway {
        orders: Mutex<Vec<String>>,
        exchange_positions: Mutex<Vec<ExchangePosition>>,
    }

    #[async_trait]
    impl ExchangeGateway for MockGateway {
        async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()> {
            self.orders
                .lock()
                .unwrap()
                .push(format!("leverage {symbol} {leverage}"));
            Ok(())
        }

        async fn open_market_order(
            &self,
            symbol: &str,
            side: OrderSide,
            quantity: Decimal,
            _position_idx: PositionIdx,
        ) -> Result<OrderResult> {
            self.orders.lock().unwrap().push(format!(
                "open {symbol} {} {}",
                side.as_str(),
                quantity.normalize()
            ));
            Ok(OrderResult {
                order_id: "order-1".to_string(),
                symbol: symbol.to_string(),
                quantity,
                price: Some(dec!(50000)),
            })
        }

        async fn close_market_order(
            &self,
            symbol: &str,
            side: OrderSide,
            quantity: Decimal,
            _position_idx: PositionIdx,
        ) -> Result<OrderResult> {
            self.orders.lock().unwrap().push(format!(
                "close {symbol} {} {}",
                side.as_str(),
                quantity.normalize()
            ));
            Ok(OrderResult {
                order_id: "order-2".to_string(),
                symbol: symbol.to_string(),
                quantity,
                price: Some(dec!(50000)),
            })
        }

        async fn current_price(&self, _symbol: &str) -> Result<Decimal> {
            Ok(dec!(50000))
        }

        async fn instrument(&self, symbol: &str) -> Result<InstrumentInfo> {
            Ok(InstrumentInfo {
                symbol: symbol.to_string(),
                status: "Trading".to_string(),
                tick_size: dec!(0.1),
                qty_step: dec!(0.001),
                min_order_qty: dec!(0.001),
                max_order_qty: dec!(100),
            })
        }

        async fn wallet_balance(&self) -> Result<Decimal> {
            Ok(dec!(1000))
        }

        async fn open_positions(&self) -> Result<Vec<ExchangePosition>> {
            Ok(self.exchange_positions.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_message(&self, text: &str) -> Result<()> {
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn trading_config() -> TradingConfig {
        TradingConfig {
            allowed_symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            position_size_pct: dec!(10),
            leverage: 5,
            max_open_positions: 3,
            max_daily_trades: 10,
            // start == end keeps the window always open for tests
            trading_hours: TradingHours {
                start_hour: 0,
                end_hour: 0,
            },
            dry_run: true,
            position_mode: PositionMode::OneWay,
            paper_start_balance: dec!(1000),
        }
    }

    fn engine(
        gateway: Arc<MockGateway>,
        notifier: Arc<RecordingNotifier>,
    ) -> (TradingEngine, mpsc::Sender<EngineCommand>) {
        let (tx, rx) = mpsc::channel(8);
        let engine = TradingEngine::new(
            trading_config(),
            EngineConfig {
                reconcile_interval_secs: 60,
                report_hour_utc: 0,
            },
            gateway,
            notifier,
            dec!(1000),
            rx,
        );
        (engine, tx)
    }

    const OPEN_TEXT: &str =
        "NEW SIGNAL\nSymbol: #BTCUSDT\nDirection: LONG\nLast Price: $50000";
    const CLOSE_TEXT: &str = "SIGNAL CLOSED\nSymbol: #BTCUSDT\nDirection: LONG";

    #[tokio::test]
    async fn open_signal_places_sized_order_and_tracks_position() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        engine.handle_message(OPEN_TEXT.to_string()).await;

        // 1000 USDT at 10% is 100 notional, 0.002 BTC at 50000.
        let orders = gateway.orders.lock().unwrap().clone();
        assert_eq!(orders, vec!["leverage BTCUSDT 5", "open BTCUSDT Buy 0.002"]);

        assert!(engine.tracker.has_open_position("BTCUSDT"));
        let position = engine.tracker.open_position("BTCUSDT").unwrap();
        assert_eq!(position.quantity, dec!(0.002));
        assert_eq!(position.entry_price, dec!(50000));
        assert_eq!(position.direction, Direction::Long);

        let statistics = engine.tracker.statistics();
        assert_eq!(statistics.total_signals, 1);
        assert_eq!(statistics.total_trades, 1);
        assert_eq!(statistics.daily_trades, 1);

        let messages = notifier.messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.starts_with("Opened BTCUSDT")));
    }

    #[tokio::test]
    async fn duplicate_open_for_tracked_symbol_is_rejected() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        engine.handle_message(OPEN_TEXT.to_string()).await;
        engine.handle_message(OPEN_TEXT.to_string()).await;

        // Only one pair of gateway calls; the second signal hit the
        // already-open gate before touching the exchange.
        assert_eq!(gateway.orders.lock().unwrap().len(), 2);
        assert_eq!(engine.tracker.open_positions_count(), 1);
        assert_eq!(engine.tracker.statistics().total_trades, 1);
        let messages = notifier.messages.lock().unwrap();
        assert!(messages
            .iter()
            .any(|m| m.contains("position already open for BTCUSDT")));
    }

    #[tokio::test]
    async fn close_for_untracked_symbol_is_a_silent_no_op() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        // Twice: the repeat is just as benign as the first.
        engine.handle_message(CLOSE_TEXT.to_string()).await;
        engine.handle_message(CLOSE_TEXT.to_string()).await;

        assert!(gateway.orders.lock().unwrap().is_empty());
        assert!(notifier.messages.lock().unwrap().is_empty());
        let statistics = engine.tracker.statistics();
        assert_eq!(statistics.total_signals, 2);
        assert_eq!(statistics.total_trades, 0);
        assert_eq!(statistics.win_trades + statistics.lose_trades, 0);
    }

    #[tokio::test]
    async fn close_settles_simulated_position_immediately() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        engine.handle_message(OPEN_TEXT.to_string()).await;
        engine.handle_message(CLOSE_TEXT.to_string()).await;

        assert!(!engine.tracker.has_open_position("BTCUSDT"));
        let orders = gateway.orders.lock().unwrap().clone();
        assert_eq!(orders.last().unwrap(), "close BTCUSDT Sell 0.002");
        // Flat exit counts as a win, not a loss.
        let statistics = engine.tracker.statistics();
        assert_eq!(statistics.win_trades, 1);
        assert_eq!(statistics.lose_trades, 0);
        let messages = notifier.messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.starts_with("Closed BTCUSDT")));
    }

    #[tokio::test]
    async fn reconcile_settles_exchange_side_closure_once() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        engine.handle_message(OPEN_TEXT.to_string()).await;
        assert!(engine.tracker.has_open_position("BTCUSDT"));

        // Exchange still reports the position: the pass must not touch it.
        *gateway.exchange_positions.lock().unwrap() = vec![ExchangePosition {
            symbol: "BTCUSDT".to_string(),
            direction: Direction::Long,
            size: dec!(0.002),
            entry_price: dec!(50000),
            position_idx: PositionIdx::OneWay,
        }];
        engine.reconcile_pass().await;
        assert!(engine.tracker.has_open_position("BTCUSDT"));

        // The position vanishes exchange-side (stop fill, liquidation,
        // manual close); the pass removes it and reports outward.
        gateway.exchange_positions.lock().unwrap().clear();
        engine.reconcile_pass().await;

        assert!(!engine.tracker.has_open_position("BTCUSDT"));
        let statistics = engine.tracker.statistics().clone();
        assert_eq!(statistics.win_trades + statistics.lose_trades, 1);
        {
            let messages = notifier.messages.lock().unwrap();
            assert_eq!(
                messages
                    .iter()
                    .filter(|m| m.contains("closed on exchange"))
                    .count(),
                1
            );
        }

        // A second pass over the same exchange state changes nothing.
        engine.reconcile_pass().await;
        let statistics = engine.tracker.statistics();
        assert_eq!(statistics.win_trades + statistics.lose_trades, 1);
        let messages = notifier.messages.lock().unwrap();
        assert_eq!(
            messages
                .iter()
                .filter(|m| m.contains("closed on exchange"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn close_direction_mismatch_leaves_position_open() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        engine.handle_message(OPEN_TEXT.to_string()).await;
        engine
            .handle_message("SIGNAL CLOSED\nSymbol: #BTCUSDT\nDirection: SHORT".to_string())
            .await;

        assert!(engine.tracker.has_open_position("BTCUSDT"));
        let orders = gateway.orders.lock().unwrap().clone();
        assert!(!orders.iter().any(|o| o.starts_with("close")));
        let messages = notifier.messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.contains("Direction mismatch")));
    }

    #[tokio::test]
    async fn disallowed_symbol_is_rejected_without_counting_as_ignored() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        engine
            .handle_message("NEW SIGNAL\nSymbol: #DOGEUSDT\nDirection: LONG".to_string())
            .await;

        assert!(gateway.orders.lock().unwrap().is_empty());
        let statistics = engine.tracker.statistics();
        assert_eq!(statistics.total_signals, 1);
        // Only trading-hours rejections feed the ignored counter.
        assert_eq!(statistics.signals_ignored, 0);
        let messages = notifier.messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.starts_with("Signal ignored")));
    }

    #[tokio::test]
    async fn trading_hours_rejection_feeds_ignored_counter() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (tx, rx) = mpsc::channel(8);
        drop(tx);
        let mut config = trading_config();
        config.trading_hours = TradingHours {
            start_hour: 8,
            end_hour: 9,
        };
        let mut engine = TradingEngine::new(
            config,
            EngineConfig {
                reconcile_interval_secs: 60,
                report_hour_utc: 0,
            },
            gateway,
            notifier,
            dec!(1000),
            rx,
        );

        let details = SignalDetails {
            symbol: "BTCUSDT".to_string(),
            direction: Direction::Long,
            last_price: None,
            index_price: None,
            spread_percent: None,
            observed_at: Utc::now(),
        };
        let night = Utc.with_ymd_and_hms(2025, 3, 10, 22, 0, 0).unwrap();
        engine.handle_open(&details, night).await.unwrap();

        assert_eq!(engine.tracker.statistics().signals_ignored, 1);
    }

    #[tokio::test]
    async fn non_signal_chatter_is_dropped_without_counting() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut engine, _tx) = engine(gateway.clone(), notifier.clone());

        engine.handle_message("gm everyone".to_string()).await;

        assert_eq!(engine.tracker.statistics().total_signals, 0);
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn actor_loop_answers_status_and_shuts_down() {
        let gateway = Arc::new(MockGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let (tx, rx) = mpsc::channel(8);
        let engine = TradingEngine::new(
            trading_config(),
            EngineConfig {
                reconcile_interval_secs: 3600,
                report_hour_utc: 0,
            },
            gateway,
            notifier,
            dec!(1000),
            rx,
        );
        let handle = EngineHandle::new(tx);
        let task = tokio::spawn(engine.run());

        handle.message(OPEN_TEXT.to_string()).await.unwrap();
        handle.start_monitoring().await.unwrap();

        let status = handle.get_status().await.unwrap();
        assert!(status.monitoring);
        assert_eq!(status.open_positions.len(), 1);
        assert_eq!(status.open_positions[0].symbol, "BTCUSDT");
        assert_eq!(status.statistics.total_trades, 1);

        handle.shutdown().await.unwrap();
        task.await.unwrap().unwrap();
    }
}
