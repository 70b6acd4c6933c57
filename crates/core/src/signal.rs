use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a position or signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Parses a direction token case-insensitively ("long"/"short").
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            _ => None,
        }
    }

    /// Order side that opens a position in this direction.
    #[must_use]
    pub const fn entry_side(self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Buy,
            Self::Short => OrderSide::Sell,
        }
    }

    /// Order side that closes a position in this direction.
    #[must_use]
    pub const fn exit_side(self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Sell,
            Self::Short => OrderSide::Buy,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Exchange order side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire representation expected by the Bybit v5 API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

/// Exchange position-mode slot selector.
///
/// One-way accounts use index 0; hedge-mode accounts keep long and short
/// exposure in separate slots (1 and 2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PositionIdx {
    OneWay,
    HedgeLong,
    HedgeShort,
}

impl PositionIdx {
    /// Numeric index as sent on the wire.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::OneWay => 0,
            Self::HedgeLong => 1,
            Self::HedgeShort => 2,
        }
    }

    /// Decodes a wire index, defaulting unknown values to one-way.
    #[must_use]
    pub const fn from_index(idx: u8) -> Self {
        match idx {
            1 => Self::HedgeLong,
            2 => Self::HedgeShort,
            _ => Self::OneWay,
        }
    }

    /// Selects the slot for an order given the account position mode.
    #[must_use]
    pub const fn for_direction(mode: PositionMode, direction: Direction) -> Self {
        match mode {
            PositionMode::OneWay => Self::OneWay,
            PositionMode::Hedge => match direction {
                Direction::Long => Self::HedgeLong,
                Direction::Short => Self::HedgeShort,
            },
        }
    }
}

/// Account position mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    #[default]
    OneWay,
    Hedge,
}

/// Fields shared by open and close signals.
///
/// `symbol` and `direction` are mandatory at parse time; everything else is
/// best-effort extraction from the message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDetails {
    pub symbol: String,
    pub direction: Direction,
    pub last_price: Option<Decimal>,
    pub index_price: Option<Decimal>,
    pub spread_percent: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// A typed trading instruction derived from an external message.
///
/// Closed union: there is no unknown-kind variant, so the engine matches
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    Open(SignalDetails),
    Close(SignalDetails),
}

impl Signal {
    #[must_use]
    pub const fn details(&self) -> &SignalDetails {
        match self {
            Self::Open(d) | Self::Close(d) => d,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.details().symbol
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.details().direction
    }

    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Open(_) => "OPEN",
            Self::Close(_) => "CLOSE",
        }
    }
}
