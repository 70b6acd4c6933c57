use crate::client::{BybitApiError, BybitClient};
use crate::types::{
    InstrumentListResult, OrderCreated, PositionListResult, TickerListResult, WalletBalanceResult,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use sigtrade_core::{
    ExchangeGateway, ExchangePosition, InstrumentInfo, OrderResult, OrderSide, PositionIdx,
};

/// Venue code for "leverage not modified". Setting leverage to its current
/// value is success for our purposes.
const RET_LEVERAGE_NOT_MODIFIED: i64 = 110_043;

/// Live gateway over the Bybit v5 linear-perpetual API.
pub struct BybitGateway {
    client: BybitClient,
    settle_coin: String,
}

impl BybitGateway {
    #[must_use]
    pub fn new(client: BybitClient) -> Self {
        Self {
            client,
            settle_coin: "USDT".to_string(),
        }
    }

    /// Maps the set-leverage response, folding the venue's "leverage not
    /// modified" rejection into success.
    fn map_leverage_result(symbol: &str, leverage: u32, result: Result<serde_json::Value>) -> Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.downcast_ref::<BybitApiError>() {
                Some(api) if api.ret_code == RET_LEVERAGE_NOT_MODIFIED => {
                    tracing::debug!(symbol, leverage, "leverage already set");
                    Ok(())
                }
                _ => Err(e).with_context(|| format!("set leverage failed for {symbol}")),
            },
        }
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        position_idx: PositionIdx,
        reduce_only: bool,
    ) -> Result<OrderResult> {
        let body = json!({
            "category": "linear",
            "symbol": symbol,
            "side": side.as_str(),
            "orderType": "Market",
            "qty": quantity.normalize().to_string(),
            "positionIdx": position_idx.index(),
            "reduceOnly": reduce_only,
        });

        let result = self
            .client
            .post_signed("/v5/order/create", body)
            .await
            .with_context(|| format!("market order submit failed for {symbol}"))?;
        let created: OrderCreated =
            serde_json::from_value(result).context("malformed order-create result")?;

        Ok(OrderResult {
            order_id: created.order_id,
            symbol: symbol.to_string(),
            quantity,
            price: None,
        })
    }
}

#[async_trait]
impl ExchangeGateway for BybitGateway {
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()> {
        let body = json!({
            "category": "linear",
            "symbol": symbol,
            "buyLeverage": leverage.to_string(),
            "sellLeverage": leverage.to_string(),
        });

        let result = self.client.post_signed("/v5/position/set-leverage", body).await;
        Self::map_leverage_result(symbol, leverage, result)
    }

    async fn open_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        position_idx: PositionIdx,
    ) -> Result<OrderResult> {
        self.submit_market_order(symbol, side, quantity, position_idx, false)
            .await
    }

    async fn close_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        position_idx: PositionIdx,
    ) -> Result<OrderResult> {
        self.submit_market_order(symbol, side, quantity, position_idx, true)
            .await
    }

    async fn current_price(&self, symbol: &str) -> Result<Decimal> {
        let result = self
            .client
            .get(
                "/v5/market/tickers",
                &format!("category=linear&symbol={symbol}"),
            )
            .await?;
        let tickers: TickerListResult =
            serde_json::from_value(result).context("malformed tickers result")?;
        let ticker = tickers
            .list
            .into_iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| anyhow::anyhow!("no ticker returned for {symbol}"))?;
        Ok(ticker.last_price)
    }

    async fn instrument(&self, symbol: &str) -> Result<InstrumentInfo> {
        let result = self
            .client
            .get(
                "/v5/market/instruments-info",
                &format!("category=linear&symbol={symbol}"),
            )
            .await?;
        let instruments: InstrumentListResult =
            serde_json::from_value(result).context("malformed instruments-info result")?;
        let entry = instruments
            .list
            .into_iter()
            .find(|i| i.symbol == symbol)
            .ok_or_else(|| anyhow::anyhow!("unknown instrument {symbol}"))?;
        Ok(entry.into_info())
    }

    async fn wallet_balance(&self) -> Result<Decimal> {
        let result = self
            .client
            .get_signed("/v5/account/wallet-balance", "accountType=UNIFIED")
            .await?;
        let balances: WalletBalanceResult =
            serde_json::from_value(result).context("malformed wallet-balance result")?;
        let account = balances
            .list
            .first()
            .ok_or_else(|| anyhow::anyhow!("wallet-balance returned no accounts"))?;
        Ok(account.total_available_balance)
    }

    async fn open_positions(&self) -> Result<Vec<ExchangePosition>> {
        let result = self
            .client
            .get_signed(
                "/v5/position/list",
                &format!("category=linear&settleCoin={}", self.settle_coin),
            )
            .await?;
        let positions: PositionListResult =
            serde_json::from_value(result).context("malformed position-list result")?;
        Ok(positions
            .list
            .into_iter()
            .filter_map(crate::types::PositionEntry::into_position)
            .collect())
    }
}
