use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sigtrade_core::{
    Direction, ExchangeGateway, ExchangePosition, InstrumentInfo, OrderResult, OrderSide,
    PositionIdx,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Dry-run gateway.
///
/// Market-data reads (price, instrument) pass through to the wrapped live
/// gateway so sizing sees real numbers; account state (balance, open
/// positions, orders) is simulated entirely in memory. This gateway makes
/// zero calls to order or account endpoints, so it cannot move real money.
pub struct PaperGateway<G> {
    inner: G,
    balance: Mutex<Decimal>,
    positions: Mutex<HashMap<String, ExchangePosition>>,
    next_order_id: AtomicU64,
}

impl<G> PaperGateway<G> {
    #[must_use]
    pub fn new(inner: G, start_balance: Decimal) -> Self {
        Self {
            inner,
            balance: Mutex::new(start_balance),
            positions: Mutex::new(HashMap::new()),
            next_order_id: AtomicU64::new(1),
        }
    }

    fn make_order_id(&self) -> String {
        format!("paper-{}", self.next_order_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl<G: ExchangeGateway> ExchangeGateway for PaperGateway<G> {
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()> {
        tracing::debug!(symbol, leverage, "paper: leverage change simulated");
        Ok(())
    }

    async fn open_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        position_idx: PositionIdx,
    ) -> Result<OrderResult> {
        let price = self.inner.current_price(symbol).await?;
        let direction = match side {
            OrderSide::Buy => Direction::Long,
            OrderSide::Sell => Direction::Short,
        };

        self.positions.lock().await.insert(
            symbol.to_string(),
            ExchangePosition {
                symbol: symbol.to_string(),
                direction,
                size: quantity,
                entry_price: price,
                position_idx,
            },
        );

        let order_id = self.make_order_id();
        tracing::info!(symbol, %quantity, %price, order_id, "paper: open order simulated");
        Ok(OrderResult {
            order_id,
            symbol: symbol.to_string(),
            quantity,
            price: Some(price),
        })
    }

    async fn close_market_order(
        &self,
        symbol: &str,
        _side: OrderSide,
        quantity: Decimal,
        _position_idx: PositionIdx,
    ) -> Result<OrderResult> {
        let price = self.inner.current_price(symbol).await?;

        // Reduce-only semantics: closing a symbol we are not holding is a
        // no-op on the simulated book.
        if let Some(position) = self.positions.lock().await.remove(symbol) {
            let pnl = match position.direction {
                Direction::Long => (price - position.entry_price) * position.size,
                Direction::Short => (position.entry_price - price) * position.size,
            };
            let mut balance = self.balance.lock().await;
            *balance += pnl;
            tracing::info!(symbol, %pnl, balance = %*balance, "paper: close order simulated");
        }

        Ok(OrderResult {
            order_id: self.make_order_id(),
            symbol: symbol.to_string(),
            quantity,
            price: Some(price),
        })
    }

    async fn current_price(&self, symbol: &str) -> Result<Decimal> {
        self.inner.current_price(symbol).await
    }

    async fn instrument(&self, symbol: &str) -> Result<InstrumentInfo> {
        self.inner.instrument(symbol).await
    }

    async fn wallet_balance(&self) -> Result<Decimal> {
        Ok(*self.balance.lock().await)
    }

    async fn open_positions(&self) -> Result<Vec<ExchangePosition>> {
        Ok(self.positions.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Fixed-price stand-in for the live gateway.
    struct FixedPrice(Decimal);

    #[async_trait]
    impl ExchangeGateway for FixedPrice {
        async fn set_leverage(&self, _symbol: &str, _leverage: u32) -> Result<()> {
            Ok(())
        }

        async fn open_market_order(
            &self,
            _symbol: &str,
            _side: OrderSide,
            _quantity: Decimal,
            _position_idx: PositionIdx,
        ) -> Result<OrderResult> {
            anyhow::bail!("live order endpoint must never be reached from paper mode")
        }

        async fn close_market_order(
            &self,
            _symbol: &str,
            _side: OrderSide,
            _quantity: Decimal,
            _position_idx: PositionIdx,
        ) -> Result<OrderResult> {
            anyhow::bail!("live order endpoint must never be reached from paper mode")
        }

        async fn current_price(&self, _symbol: &str) -> Result<Decimal> {
            Ok(self.0)
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
            anyhow::bail!("live account endpoint must never be reached from paper mode")
        }

        async fn open_positions(&self) -> Result<Vec<ExchangePosition>> {
            anyhow::bail!("live account endpoint must never be reached from paper mode")
        }
    }

    #[tokio::test]
    async fn simulated_open_appears_in_position_listing() {
        let paper = PaperGateway::new(FixedPrice(dec!(50000)), dec!(1000));
        let order = paper
            .open_market_order("BTCUSDT", OrderSide::Buy, dec!(0.002), PositionIdx::OneWay)
            .await
            .unwrap();
        assert!(order.order_id.starts_with("paper-"));

        let positions = paper.open_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "BTCUSDT");
        assert_eq!(positions[0].direction, Direction::Long);
        assert_eq!(positions[0].entry_price, dec!(50000));
    }

    #[tokio::test]
    async fn simulated_close_realizes_pnl_into_balance() {
        let paper = PaperGateway::new(FixedPrice(dec!(50000)), dec!(1000));
        paper
            .open_market_order("BTCUSDT", OrderSide::Buy, dec!(0.01), PositionIdx::OneWay)
            .await
            .unwrap();

        // Same fixed price, so pnl is zero; balance unchanged, book empty.
        paper
            .close_market_order("BTCUSDT", OrderSide::Sell, dec!(0.01), PositionIdx::OneWay)
            .await
            .unwrap();
        assert_eq!(paper.wallet_balance().await.unwrap(), dec!(1000));
        assert!(paper.open_positions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn close_of_unknown_symbol_is_a_noop() {
        let paper = PaperGateway::new(FixedPrice(dec!(50000)), dec!(1000));
        paper
            .close_market_order("ETHUSDT", OrderSide::Sell, dec!(1), PositionIdx::OneWay)
            .await
            .unwrap();
        assert_eq!(paper.wallet_balance().await.unwrap(), dec!(1000));
    }

    #[tokio::test]
    async fn balance_reads_come_from_simulation_not_live() {
        let paper = PaperGateway::new(FixedPrice(dec!(50000)), dec!(777));
        assert_eq!(paper.wallet_balance().await.unwrap(), dec!(777));
    }
}
