use crate::signal::{Direction, PositionIdx};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The engine's local belief about one currently open position.
///
/// Keyed uniquely by symbol: the tracker never holds two of these for the
/// same instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPosition {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub order_id: String,
    pub opened_at: DateTime<Utc>,
    pub position_idx: PositionIdx,
    pub position_size_notional: Decimal,
}

impl TrackedPosition {
    /// Realized P&L if the position were closed at `exit_price`.
    #[must_use]
    pub fn pnl_at(&self, exit_price: Decimal) -> Decimal {
        match self.direction {
            Direction::Long => (exit_price - self.entry_price) * self.quantity,
            Direction::Short => (self.entry_price - exit_price) * self.quantity,
        }
    }
}

/// An open position as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangePosition {
    pub symbol: String,
    pub direction: Direction,
    pub size: Decimal,
    pub entry_price: Decimal,
    pub position_idx: PositionIdx,
}

/// Normalized result of an order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: String,
    pub symbol: String,
    pub quantity: Decimal,
    /// Fill or reference price, when the venue reports one.
    pub price: Option<Decimal>,
}

/// Instrument metadata needed for sizing and tradability checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub symbol: String,
    pub status: String,
    pub tick_size: Decimal,
    pub qty_step: Decimal,
    pub min_order_qty: Decimal,
    pub max_order_qty: Decimal,
}

impl InstrumentInfo {
    /// Whether the venue currently accepts orders for this instrument.
    #[must_use]
    pub fn is_trading(&self) -> bool {
        self.status == "Trading"
    }
}
