use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use sigtrade_core::{Direction, Signal, SignalDetails};
use thiserror::Error;

/// Marker substring identifying an open intent.
pub const OPEN_MARKER: &str = "NEW SIGNAL";
/// Marker substring identifying a close intent. Disjoint from the open
/// marker so recognition stays mutually exclusive.
pub const CLOSE_MARKER: &str = "SIGNAL CLOSED";

/// Why a piece of text was not accepted as a signal.
///
/// Not an error in the operational sense: most channel traffic simply is
/// not a signal. The variants exist so diagnostics can tell the cases
/// apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseRejection {
    #[error("no signal marker present")]
    NoMarker,
    #[error("signal text has no symbol field")]
    MissingSymbol,
    #[error("signal text has no valid direction field")]
    MissingDirection,
}

/// Tolerant pattern-based parser for channel messages.
///
/// Only symbol and direction are mandatory; numeric and time fields fall
/// back to `None` / arrival time when absent or unparseable.
pub struct SignalParser {
    symbol_re: Regex,
    direction_re: Regex,
    last_price_re: Regex,
    index_price_re: Regex,
    spread_re: Regex,
    time_re: Regex,
}

impl Default for SignalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalParser {
    /// Compiles the extraction patterns.
    ///
    /// # Panics
    /// Never: the patterns are static and known-good.
    #[must_use]
    pub fn new() -> Self {
        Self {
            symbol_re: Regex::new(r"(?im)^\s*symbol\s*[:\s]\s*#?([A-Za-z0-9]{2,20})").unwrap(),
            direction_re: Regex::new(r"(?im)^\s*(?:direction|side)\s*:\s*(\w+)").unwrap(),
            last_price_re: Regex::new(r"(?im)^\s*last\s*price\s*:\s*\$?([0-9]+(?:\.[0-9]+)?)")
                .unwrap(),
            index_price_re: Regex::new(r"(?im)^\s*index\s*price\s*:\s*\$?([0-9]+(?:\.[0-9]+)?)")
                .unwrap(),
            spread_re: Regex::new(r"(?im)^\s*spread\s*:\s*([0-9]+(?:\.[0-9]+)?)\s*%?").unwrap(),
            time_re: Regex::new(r"(?im)^\s*time\s*:\s*(.+?)\s*$").unwrap(),
        }
    }

    /// Parses raw channel text into a typed signal, or `None` when the text
    /// is not a recognized signal. Rejection reasons are logged at debug
    /// level.
    #[must_use]
    pub fn parse_signal(&self, text: &str) -> Option<Signal> {
        match self.try_parse(text, Utc::now()) {
            Ok(signal) => Some(signal),
            Err(ParseRejection::NoMarker) => None,
            Err(reason) => {
                tracing::debug!(%reason, "discarding marked message that failed extraction");
                None
            }
        }
    }

    /// Parse with an explicit arrival time, surfacing the rejection reason.
    ///
    /// # Errors
    /// Returns the reason the text was not accepted as a signal.
    pub fn try_parse(
        &self,
        text: &str,
        arrived_at: DateTime<Utc>,
    ) -> Result<Signal, ParseRejection> {
        let upper = text.to_uppercase();
        let is_open = if upper.contains(OPEN_MARKER) {
            true
        } else if upper.contains(CLOSE_MARKER) {
            false
        } else {
            return Err(ParseRejection::NoMarker);
        };

        let symbol = self
            .symbol_re
            .captures(text)
            .map(|c| c[1].to_uppercase())
            .ok_or(ParseRejection::MissingSymbol)?;

        let direction = self
            .direction_re
            .captures(text)
            .and_then(|c| Direction::parse(&c[1]))
            .ok_or(ParseRejection::MissingDirection)?;

        let details = SignalDetails {
            symbol,
            direction,
            last_price: self.decimal_field(&self.last_price_re, text),
            index_price: self.decimal_field(&self.index_price_re, text),
            spread_percent: self
                .spread_re
                .captures(text)
                .and_then(|c| c[1].parse::<f64>().ok()),
            observed_at: self.observed_at(text, arrived_at),
        };

        Ok(if is_open {
            Signal::Open(details)
        } else {
            Signal::Close(details)
        })
    }

    fn decimal_field(&self, re: &Regex, text: &str) -> Option<Decimal> {
        re.captures(text).and_then(|c| c[1].parse::<Decimal>().ok())
    }

    fn observed_at(&self, text: &str, arrived_at: DateTime<Utc>) -> DateTime<Utc> {
        self.time_re
            .captures(text)
            .and_then(|c| {
                NaiveDateTime::parse_from_str(&c[1], "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
            .unwrap_or(arrived_at)
    }
}
