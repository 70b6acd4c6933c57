use rust_decimal::Decimal;
use serde::Deserialize;
use sigtrade_core::{Direction, ExchangePosition, InstrumentInfo, PositionIdx};

/// `result` payload of `/v5/market/instruments-info`.
#[derive(Debug, Deserialize)]
pub struct InstrumentListResult {
    #[serde(default)]
    pub list: Vec<InstrumentEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentEntry {
    pub symbol: String,
    pub status: String,
    pub price_filter: PriceFilter,
    pub lot_size_filter: LotSizeFilter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    pub tick_size: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    pub qty_step: Decimal,
    pub min_order_qty: Decimal,
    pub max_order_qty: Decimal,
}

impl InstrumentEntry {
    #[must_use]
    pub fn into_info(self) -> InstrumentInfo {
        InstrumentInfo {
            symbol: self.symbol,
            status: self.status,
            tick_size: self.price_filter.tick_size,
            qty_step: self.lot_size_filter.qty_step,
            min_order_qty: self.lot_size_filter.min_order_qty,
            max_order_qty: self.lot_size_filter.max_order_qty,
        }
    }
}

/// `result` payload of `/v5/market/tickers`.
#[derive(Debug, Deserialize)]
pub struct TickerListResult {
    #[serde(default)]
    pub list: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerEntry {
    pub symbol: String,
    pub last_price: Decimal,
}

/// `result` payload of `/v5/position/list`.
#[derive(Debug, Deserialize)]
pub struct PositionListResult {
    #[serde(default)]
    pub list: Vec<PositionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEntry {
    pub symbol: String,
    pub side: String,
    pub size: Decimal,
    #[serde(default)]
    pub avg_price: Decimal,
    #[serde(default)]
    pub position_idx: u8,
}

impl PositionEntry {
    /// Converts a venue position row into the core model. Rows with zero
    /// size or an unrecognized side are not open positions and map to
    /// `None`.
    #[must_use]
    pub fn into_position(self) -> Option<ExchangePosition> {
        if self.size <= Decimal::ZERO {
            return None;
        }
        let direction = match self.side.as_str() {
            "Buy" => Direction::Long,
            "Sell" => Direction::Short,
            _ => return None,
        };
        Some(ExchangePosition {
            symbol: self.symbol,
            direction,
            size: self.size,
            entry_price: self.avg_price,
            position_idx: PositionIdx::from_index(self.position_idx),
        })
    }
}

/// `result` payload of `/v5/account/wallet-balance`.
#[derive(Debug, Deserialize)]
pub struct WalletBalanceResult {
    #[serde(default)]
    pub list: Vec<WalletAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub total_available_balance: Decimal,
}

/// `result` payload of `/v5/order/create`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: String,
}
