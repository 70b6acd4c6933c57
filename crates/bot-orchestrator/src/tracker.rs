use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sigtrade_core::{ExchangeGateway, RunningStatistics, TrackedPosition};
use std::collections::{HashMap, HashSet};

/// A position the reconciler found closed on the exchange side.
#[derive(Debug, Clone)]
pub struct ReconciledClose {
    pub position: TrackedPosition,
    pub exit_price: Decimal,
    pub pnl: Decimal,
    pub closed_at: DateTime<Utc>,
}

/// Local book of open positions plus the running statistics.
///
/// Owned exclusively by the engine task, so all mutation is serialized and
/// the one-position-per-symbol invariant cannot race.
pub struct PositionTracker {
    positions: HashMap<String, TrackedPosition>,
    statistics: RunningStatistics,
}

impl PositionTracker {
    #[must_use]
    pub fn new(start_balance: Decimal, today: NaiveDate) -> Self {
        Self {
            positions: HashMap::new(),
            statistics: RunningStatistics::new(start_balance, today),
        }
    }

    #[must_use]
    pub fn has_open_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    #[must_use]
    pub fn open_position(&self, symbol: &str) -> Option<&TrackedPosition> {
        self.positions.get(symbol)
    }

    #[must_use]
    pub fn open_positions(&self) -> Vec<TrackedPosition> {
        let mut positions: Vec<TrackedPosition> = self.positions.values().cloned().collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        positions
    }

    #[must_use]
    pub fn open_positions_count(&self) -> u32 {
        u32::try_from(self.positions.len()).unwrap_or(u32::MAX)
    }

    /// Records a newly opened position.
    ///
    /// # Errors
    /// Fails if a position for the symbol is already tracked. The caller
    /// validates before submitting orders, so hitting this is a bug.
    pub fn add_open_position(&mut self, position: TrackedPosition) -> Result<()> {
        if self.positions.contains_key(&position.symbol) {
            anyhow::bail!(
                "position already tracked for {}, refusing to overwrite",
                position.symbol
            );
        }
        self.positions.insert(position.symbol.clone(), position);
        Ok(())
    }

    pub fn remove_open_position(&mut self, symbol: &str) -> Option<TrackedPosition> {
        self.positions.remove(symbol)
    }

    #[must_use]
    pub fn statistics(&self) -> &RunningStatistics {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut RunningStatistics {
        &mut self.statistics
    }

    pub fn reset_daily_statistics(&mut self, today: NaiveDate) {
        tracing::info!(
            %today,
            daily_trades = self.statistics.daily_trades,
            signals_ignored = self.statistics.signals_ignored,
            "daily statistics reset"
        );
        self.statistics.reset_daily(today);
    }

    /// Records the outcome of a resolved trade.
    pub fn record_trade_result(&mut self, pnl: Decimal) {
        if pnl >= Decimal::ZERO {
            self.statistics.win_trades += 1;
        } else {
            self.statistics.lose_trades += 1;
        }
    }

    /// Compares the local book against the exchange and removes positions
    /// the exchange no longer reports (stop-loss fills, liquidations, manual
    /// closes). Removal happens at most once per position.
    ///
    /// A position whose exit price cannot be fetched stays tracked and is
    /// retried on the next pass.
    ///
    /// # Errors
    /// Fails only when the exchange position list itself is unavailable; the
    /// caller skips the pass and tries again later.
    pub async fn reconcile(
        &mut self,
        gateway: &dyn ExchangeGateway,
    ) -> Result<Vec<ReconciledClose>> {
        let remote = gateway.open_positions().await?;
        let remote_symbols: HashSet<&str> = remote.iter().map(|p| p.symbol.as_str()).collect();

        let vanished: Vec<String> = self
            .positions
            .keys()
            .filter(|symbol| !remote_symbols.contains(symbol.as_str()))
            .cloned()
            .collect();

        let mut closes = Vec::new();
        for symbol in vanished {
            let exit_price = match gateway.current_price(&symbol).await {
                Ok(price) => price,
                Err(e) => {
                    tracing::warn!(
                        symbol = %symbol,
                        error = %e,
                        "exit price unavailable, retrying next pass"
                    );
                    continue;
                }
            };
            let Some(position) = self.positions.remove(&symbol) else {
                continue;
            };
            let pnl = position.pnl_at(exit_price);
            self.record_trade_result(pnl);
            self.statistics.current_balance += pnl;
            tracing::info!(
                symbol = %symbol,
                direction = %position.direction,
                entry_price = %position.entry_price,
                exit_price = %exit_price,
                pnl = %pnl,
                "position closed on exchange side"
            );
            closes.push(ReconciledClose {
                position,
                exit_price,
                pnl,
                closed_at: Utc::now(),
            });
        }
        Ok(closes)
    }
}
