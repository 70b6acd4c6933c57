use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sigtrade_core::{
    ExchangeGateway, InstrumentInfo, SignalDetails, TradingConfig, TradingHours,
};
use thiserror::Error;

/// Why an open signal was rejected. Expected, non-exceptional outcomes:
/// each produces an ignored-signal notice and no retry.
#[derive(Debug, Error)]
pub enum RejectReason {
    #[error("symbol {symbol} is not in the allowed list")]
    SymbolNotAllowed { symbol: String },

    #[error(
        "outside trading hours: now {now}, window {:02}:00-{:02}:00 UTC, next window in {}m",
        .window.start_hour,
        .window.end_hour,
        .until_open.num_minutes()
    )]
    OutsideTradingHours {
        now: DateTime<Utc>,
        window: TradingHours,
        until_open: Duration,
    },

    #[error("position already open for {symbol}")]
    PositionAlreadyOpen { symbol: String },

    #[error("max open positions reached ({limit})")]
    MaxOpenPositionsReached { limit: u32 },

    #[error("max daily trades reached ({limit})")]
    MaxDailyTradesReached { limit: u32 },

    #[error("balance query failed: {0}")]
    BalanceUnavailable(String),

    #[error("balance is not positive ({0})")]
    NonPositiveBalance(Decimal),

    #[error("instrument lookup failed for {symbol}: {reason}")]
    InstrumentUnavailable { symbol: String, reason: String },

    #[error("instrument {symbol} is not tradable (status {status})")]
    InstrumentNotTradable { symbol: String, status: String },
}

impl RejectReason {
    /// Only trading-hours rejections count toward `signals_ignored`.
    #[must_use]
    pub const fn is_trading_hours(&self) -> bool {
        matches!(self, Self::OutsideTradingHours { .. })
    }
}

/// Tracker-side facts the engine supplies for the stateful gates.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub symbol_already_tracked: bool,
    pub open_positions: u32,
    pub daily_trades: u32,
}

/// Data fetched by the live gates, handed onward so the sizing path does
/// not query the exchange twice.
#[derive(Debug, Clone)]
pub struct ValidatedOpen {
    pub balance: Decimal,
    pub instrument: InstrumentInfo,
}

/// Applies the open-signal gate chain in fixed order; the first failing
/// gate wins. Close signals are deliberately not run through this chain so
/// they can never be silently dropped by it.
pub struct SignalValidator {
    allowed_symbols: Vec<String>,
    max_open_positions: u32,
    max_daily_trades: u32,
    trading_hours: TradingHours,
}

impl SignalValidator {
    #[must_use]
    pub fn new(config: &TradingConfig) -> Self {
        Self {
            allowed_symbols: config
                .allowed_symbols
                .iter()
                .map(|s| s.to_uppercase())
                .collect(),
            max_open_positions: config.max_open_positions,
            max_daily_trades: config.max_daily_trades,
            trading_hours: config.trading_hours,
        }
    }

    /// Runs the gates against an open signal.
    ///
    /// Direction validity is guaranteed upstream: the parser only emits the
    /// two closed `Direction` variants.
    ///
    /// # Errors
    /// Returns the first gate that rejects the signal.
    pub async fn validate_open(
        &self,
        details: &SignalDetails,
        ctx: ValidationContext,
        now: DateTime<Utc>,
        gateway: &dyn ExchangeGateway,
    ) -> Result<ValidatedOpen, RejectReason> {
        if !self.allowed_symbols.contains(&details.symbol) {
            return Err(RejectReason::SymbolNotAllowed {
                symbol: details.symbol.clone(),
            });
        }

        if !self.trading_hours.contains(now) {
            return Err(RejectReason::OutsideTradingHours {
                now,
                window: self.trading_hours,
                until_open: self.trading_hours.time_until_open(now),
            });
        }

        if ctx.symbol_already_tracked {
            return Err(RejectReason::PositionAlreadyOpen {
                symbol: details.symbol.clone(),
            });
        }

        if ctx.open_positions >= self.max_open_positions {
            return Err(RejectReason::MaxOpenPositionsReached {
                limit: self.max_open_positions,
            });
        }

        if ctx.daily_trades >= self.max_daily_trades {
            return Err(RejectReason::MaxDailyTradesReached {
                limit: self.max_daily_trades,
            });
        }

        let balance = gateway
            .wallet_balance()
            .await
            .map_err(|e| RejectReason::BalanceUnavailable(e.to_string()))?;
        if balance <= Decimal::ZERO {
            return Err(RejectReason::NonPositiveBalance(balance));
        }

        let instrument = gateway.instrument(&details.symbol).await.map_err(|e| {
            RejectReason::InstrumentUnavailable {
                symbol: details.symbol.clone(),
                reason: e.to_string(),
            }
        })?;
        if !instrument.is_trading() {
            return Err(RejectReason::InstrumentNotTradable {
                symbol: details.symbol.clone(),
                status: instrument.status.clone(),
            });
        }

        Ok(ValidatedOpen {
            balance,
            instrument,
        })
    }
}
