use crate::signal::PositionMode;
use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bybit: BybitConfig,
    pub telegram: TelegramConfig,
    pub trading: TradingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BybitConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Chat whose messages are parsed for signals.
    pub signal_chat_id: i64,
    /// Chat that receives outward notifications and reports.
    pub notify_chat_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    pub allowed_symbols: Vec<String>,
    #[serde(default = "default_position_size_pct")]
    pub position_size_pct: Decimal,
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: u32,
    #[serde(default = "default_max_daily_trades")]
    pub max_daily_trades: u32,
    #[serde(default)]
    pub trading_hours: TradingHours,
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default)]
    pub position_mode: PositionMode,
    /// Simulated starting balance when running in dry-run mode.
    #[serde(default = "default_paper_start_balance")]
    pub paper_start_balance: Decimal,
}

/// Daily trading window in whole UTC hours, end exclusive.
///
/// A window that wraps midnight (start > end) is supported; start == end
/// means trading is allowed around the clock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 0,
        }
    }
}

impl TradingHours {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if self.start_hour == self.end_hour {
            return true;
        }
        let hour = at.hour();
        if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// Time remaining until the window next opens. Zero while inside it.
    #[must_use]
    pub fn time_until_open(&self, at: DateTime<Utc>) -> Duration {
        if self.contains(at) {
            return Duration::zero();
        }
        let today_start = Utc
            .with_ymd_and_hms(at.year(), at.month(), at.day(), self.start_hour, 0, 0)
            .single()
            .unwrap_or(at);
        let next_start = if today_start > at {
            today_start
        } else {
            today_start + Duration::days(1)
        };
        next_start - at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
    #[serde(default = "default_report_hour")]
    pub report_hour_utc: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval(),
            report_hour_utc: default_report_hour(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.bybit.com".to_string()
}

const fn default_recv_window() -> u64 {
    5000
}

fn default_position_size_pct() -> Decimal {
    Decimal::from(10)
}

const fn default_leverage() -> u32 {
    5
}

const fn default_max_open_positions() -> u32 {
    3
}

const fn default_max_daily_trades() -> u32 {
    10
}

const fn default_dry_run() -> bool {
    true // Safe default: never touch order endpoints unless asked to
}

fn default_paper_start_balance() -> Decimal {
    Decimal::from(1000)
}

const fn default_reconcile_interval() -> u64 {
    60
}

const fn default_report_hour() -> u32 {
    0
}
