use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Process-wide trading counters with a UTC daily-rollover lifecycle.
///
/// Owned by the position tracker; every mutation goes through the tracker
/// or the engine so there is no ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningStatistics {
    pub total_signals: u64,
    pub signals_ignored: u64,
    pub daily_trades: u32,
    pub total_trades: u64,
    pub win_trades: u64,
    pub lose_trades: u64,
    pub start_balance: Decimal,
    pub current_balance: Decimal,
    pub last_reset_date: NaiveDate,
}

impl RunningStatistics {
    #[must_use]
    pub fn new(start_balance: Decimal, today: NaiveDate) -> Self {
        Self {
            total_signals: 0,
            signals_ignored: 0,
            daily_trades: 0,
            total_trades: 0,
            win_trades: 0,
            lose_trades: 0,
            start_balance,
            current_balance: start_balance,
            last_reset_date: today,
        }
    }

    /// True once the UTC calendar date has advanced past the last reset.
    #[must_use]
    pub fn rollover_due(&self, today: NaiveDate) -> bool {
        today > self.last_reset_date
    }

    /// Clears the per-day counters. Cumulative totals and win/lose counts
    /// survive the rollover.
    pub fn reset_daily(&mut self, today: NaiveDate) {
        self.daily_trades = 0;
        self.signals_ignored = 0;
        self.last_reset_date = today;
    }

    #[must_use]
    pub fn total_pnl(&self) -> Decimal {
        self.current_balance - self.start_balance
    }

    /// Return on the starting balance, in percent. Zero when no starting
    /// balance was recorded.
    #[must_use]
    pub fn roi_pct(&self) -> Decimal {
        if self.start_balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.total_pnl() / self.start_balance * Decimal::from(100)
    }

    #[must_use]
    pub fn win_rate_pct(&self) -> Decimal {
        let resolved = self.win_trades + self.lose_trades;
        if resolved == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.win_trades) / Decimal::from(resolved) * Decimal::from(100)
    }
}
