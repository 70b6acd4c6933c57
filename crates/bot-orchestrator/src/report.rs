#![allow(clippy::format_push_string)]

use chrono::{DateTime, Datelike, TimeZone, Utc};
use sigtrade_core::{RunningStatistics, TrackedPosition};

/// Renders the daily summary sent to the notification channel.
#[must_use]
pub fn format_daily_report(
    statistics: &RunningStatistics,
    open_positions: &[TrackedPosition],
    now: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    output.push_str("DAILY REPORT\n");
    output.push_str(&format!("{}\n", now.format("%Y-%m-%d %H:%M UTC")));
    output.push_str("────────────────────────────\n");

    output.push_str(&format!("Signals received:  {}\n", statistics.total_signals));
    output.push_str(&format!("Signals ignored:   {}\n", statistics.signals_ignored));
    output.push_str(&format!("Trades today:      {}\n", statistics.daily_trades));
    output.push_str(&format!("Trades total:      {}\n", statistics.total_trades));
    output.push_str(&format!(
        "Wins / losses:     {} / {}\n",
        statistics.win_trades, statistics.lose_trades
    ));
    output.push_str(&format!("Win rate:          {:.1}%\n", statistics.win_rate_pct()));
    output.push_str("────────────────────────────\n");

    output.push_str(&format!("Start balance:     {:.2} USDT\n", statistics.start_balance));
    output.push_str(&format!("Current balance:   {:.2} USDT\n", statistics.current_balance));
    output.push_str(&format!("Total P&L:         {:.2} USDT\n", statistics.total_pnl()));
    output.push_str(&format!("ROI:               {:.2}%\n", statistics.roi_pct()));
    output.push_str("────────────────────────────\n");

    if open_positions.is_empty() {
        output.push_str("Open positions:    none\n");
    } else {
        output.push_str(&format!("Open positions:    {}\n", open_positions.len()));
        for position in open_positions {
            output.push_str(&format!(
                "  {} {} qty {} @ {}\n",
                position.symbol,
                position.direction,
                position.quantity.normalize(),
                position.entry_price.normalize()
            ));
        }
    }

    output
}

/// Next occurrence of `report_hour` (UTC, on the hour) strictly after `now`.
/// Firing exactly at the report hour schedules the following day.
#[must_use]
pub fn next_report_time(now: DateTime<Utc>, report_hour: u32) -> DateTime<Utc> {
    let hour = report_hour.min(23);
    let today_fire = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), hour, 0, 0)
        .single()
        .unwrap_or(now);
    if today_fire > now {
        today_fire
    } else {
        today_fire + chrono::Duration::days(1)
    }
}
