use crate::position::InstrumentInfo;
use crate::signal::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of the position sizing computation. Transient: consumed by the
/// order flow and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizing {
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub position_size_notional: Decimal,
    pub leverage: u32,
    pub required_margin: Decimal,
    pub direction: Direction,
}

/// Risk parameters feeding the sizing computation.
#[derive(Debug, Clone, Copy)]
pub struct SizingParams {
    /// Percent of balance to commit as notional (e.g. 10 = 10%).
    pub position_size_pct: Decimal,
    pub leverage: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizingError {
    #[error("balance must be positive, got {0}")]
    NonPositiveBalance(Decimal),
    #[error("entry price must be positive, got {0}")]
    NonPositiveEntryPrice(Decimal),
    #[error("leverage must be at least 1")]
    InvalidLeverage,
    #[error("quantity rounds to zero at step {step} (raw {raw})")]
    QuantityTooSmall { raw: Decimal, step: Decimal },
    #[error("insufficient balance: required margin {required} exceeds balance {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },
}

/// Computes order quantity and margin for a percent-of-balance entry.
///
/// The nominal margin from the configured percentage is advisory; the final
/// margin recomputed from the rounded, clamped quantity is the authoritative
/// check against the available balance.
///
/// # Errors
/// Rejects non-positive balance or price, zero leverage, a quantity that
/// rounds away to nothing, and a final margin above the balance.
pub fn compute_sizing(
    balance: Decimal,
    entry_price: Decimal,
    direction: Direction,
    instrument: &InstrumentInfo,
    params: &SizingParams,
) -> Result<PositionSizing, SizingError> {
    if balance <= Decimal::ZERO {
        return Err(SizingError::NonPositiveBalance(balance));
    }
    if entry_price <= Decimal::ZERO {
        return Err(SizingError::NonPositiveEntryPrice(entry_price));
    }
    if params.leverage == 0 {
        return Err(SizingError::InvalidLeverage);
    }

    let leverage = Decimal::from(params.leverage);
    let position_size_notional = balance * params.position_size_pct / Decimal::from(100);
    let nominal_margin = position_size_notional / leverage;

    let raw_quantity = position_size_notional / entry_price;

    // Round to the nearest step, not down: systematic truncation would
    // undersize every entry.
    let quantity = round_to_step(raw_quantity, instrument.qty_step);
    if quantity <= Decimal::ZERO && instrument.min_order_qty <= Decimal::ZERO {
        return Err(SizingError::QuantityTooSmall {
            raw: raw_quantity,
            step: instrument.qty_step,
        });
    }

    let clamped = quantity
        .max(instrument.min_order_qty)
        .min(instrument.max_order_qty);
    if clamped != quantity {
        tracing::info!(
            symbol = %instrument.symbol,
            rounded = %quantity,
            clamped = %clamped,
            min = %instrument.min_order_qty,
            max = %instrument.max_order_qty,
            "order quantity clamped to instrument bounds"
        );
    }

    // Authoritative margin check: recomputed from the actual order
    // quantity, not the nominal percentage.
    let final_required_margin = clamped * entry_price / leverage;
    if final_required_margin > balance {
        return Err(SizingError::InsufficientBalance {
            required: final_required_margin,
            available: balance,
        });
    }
    tracing::debug!(
        symbol = %instrument.symbol,
        nominal_margin = %nominal_margin,
        final_margin = %final_required_margin,
        quantity = %clamped,
        "position sizing computed"
    );

    Ok(PositionSizing {
        entry_price,
        quantity: clamped,
        position_size_notional,
        leverage: params.leverage,
        required_margin: final_required_margin,
        direction,
    })
}

fn round_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    (value / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_instrument() -> InstrumentInfo {
        InstrumentInfo {
            symbol: "BTCUSDT".to_string(),
            status: "Trading".to_string(),
            tick_size: dec!(0.1),
            qty_step: dec!(0.001),
            min_order_qty: dec!(0.001),
            max_order_qty: dec!(100),
        }
    }

    #[test]
    fn sizes_ten_percent_of_balance() {
        // balance 1000, 10% at 5x on a 50k entry: notional 100, margin 20,
        // quantity 0.002.
        let sizing = compute_sizing(
            dec!(1000),
            dec!(50000),
            Direction::Long,
            &btc_instrument(),
            &SizingParams {
                position_size_pct: dec!(10),
                leverage: 5,
            },
        )
        .unwrap();

        assert_eq!(sizing.position_size_notional, dec!(100));
        assert_eq!(sizing.quantity, dec!(0.002));
        assert_eq!(sizing.required_margin, dec!(20));
        assert!(sizing.required_margin <= dec!(1000));
    }

    #[test]
    fn rounds_to_nearest_step_not_down() {
        // raw quantity 0.0026 must round up to 0.003, not truncate to 0.002
        let sizing = compute_sizing(
            dec!(1300),
            dec!(50000),
            Direction::Long,
            &btc_instrument(),
            &SizingParams {
                position_size_pct: dec!(10),
                leverage: 5,
            },
        )
        .unwrap();
        assert_eq!(sizing.quantity, dec!(0.003));
    }

    #[test]
    fn quantity_is_step_multiple_and_margin_bounded() {
        let instrument = btc_instrument();
        let params = SizingParams {
            position_size_pct: dec!(25),
            leverage: 3,
        };
        for balance in [dec!(100), dec!(777.77), dec!(12345.6789)] {
            let sizing =
                compute_sizing(balance, dec!(43210.5), Direction::Short, &instrument, &params)
                    .unwrap();
            let steps = sizing.quantity / instrument.qty_step;
            assert_eq!(steps, steps.trunc(), "quantity not a step multiple");
            assert!(
                sizing.quantity * sizing.entry_price
                    <= balance * Decimal::from(params.leverage),
                "margin bound violated"
            );
        }
    }

    #[test]
    fn clamps_to_min_order_qty() {
        // Tiny balance: raw quantity rounds to zero, clamped up to min.
        let sizing = compute_sizing(
            dec!(100),
            dec!(50000),
            Direction::Long,
            &btc_instrument(),
            &SizingParams {
                position_size_pct: dec!(10),
                leverage: 5,
            },
        )
        .unwrap();
        assert_eq!(sizing.quantity, dec!(0.001));
    }

    #[test]
    fn rejects_when_final_margin_exceeds_balance() {
        // min_order_qty forces a margin above the available balance
        let mut instrument = btc_instrument();
        instrument.min_order_qty = dec!(1);
        let err = compute_sizing(
            dec!(100),
            dec!(50000),
            Direction::Long,
            &instrument,
            &SizingParams {
                position_size_pct: dec!(10),
                leverage: 5,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SizingError::InsufficientBalance { .. }));
    }

    #[test]
    fn rejects_invalid_inputs() {
        let instrument = btc_instrument();
        let params = SizingParams {
            position_size_pct: dec!(10),
            leverage: 5,
        };
        assert_eq!(
            compute_sizing(dec!(0), dec!(50000), Direction::Long, &instrument, &params),
            Err(SizingError::NonPositiveBalance(dec!(0)))
        );
        assert_eq!(
            compute_sizing(dec!(1000), dec!(-1), Direction::Long, &instrument, &params),
            Err(SizingError::NonPositiveEntryPrice(dec!(-1)))
        );
        assert_eq!(
            compute_sizing(
                dec!(1000),
                dec!(50000),
                Direction::Long,
                &instrument,
                &SizingParams {
                    position_size_pct: dec!(10),
                    leverage: 0,
                }
            ),
            Err(SizingError::InvalidLeverage)
        );
    }
}
