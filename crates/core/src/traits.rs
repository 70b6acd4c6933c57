use crate::position::{ExchangePosition, InstrumentInfo, OrderResult};
use crate::signal::{OrderSide, PositionIdx};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Normalizing boundary over the exchange.
///
/// No retries happen at this layer; transient failures surface to the
/// caller as errors.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Sets leverage for a symbol. Idempotent: a "leverage not modified"
    /// response from the venue is success, not an error.
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()>;

    async fn open_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        position_idx: PositionIdx,
    ) -> Result<OrderResult>;

    /// Submits a reduce-only market order. The reduce-only flag is not
    /// optional here: this call can never increase or flip exposure.
    async fn close_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        position_idx: PositionIdx,
    ) -> Result<OrderResult>;

    async fn current_price(&self, symbol: &str) -> Result<Decimal>;

    async fn instrument(&self, symbol: &str) -> Result<InstrumentInfo>;

    /// Available account balance in the settlement currency.
    async fn wallet_balance(&self) -> Result<Decimal>;

    async fn open_positions(&self) -> Result<Vec<ExchangePosition>>;
}

/// Outbound notification transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;
}
