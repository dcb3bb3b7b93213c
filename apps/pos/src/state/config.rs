//! # Configuration State
//!
//! Display configuration for the terminal. Sync settings live in
//! `pakwan_sync::SyncConfig`; this only covers how things are shown.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`PAKWAN_*`)
//! 2. Defaults (this file)
//!
//! Read-only after initialization, so no mutex.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use pakwan_core::Money;

/// Pakistan Standard Time, UTC+05:00.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 5 * 60;

/// Application display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Offset of the terminal's wall clock from UTC, in minutes.
    /// Report periods ("today", "this month") are computed in this zone.
    pub utc_offset_minutes: i32,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            currency_symbol: "Rs.".to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `PAKWAN_CURRENCY_SYMBOL`: Override the currency symbol
    /// - `PAKWAN_UTC_OFFSET_MINUTES`: Override the wall-clock offset (e.g. "300")
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(symbol) = std::env::var("PAKWAN_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Ok(offset) = std::env::var("PAKWAN_UTC_OFFSET_MINUTES") {
            match offset.parse::<i32>() {
                Ok(minutes) if FixedOffset::east_opt(minutes * 60).is_some() => {
                    config.utc_offset_minutes = minutes;
                }
                _ => tracing::warn!(value = %offset, "Ignoring invalid PAKWAN_UTC_OFFSET_MINUTES"),
            }
        }

        config
    }

    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }

    /// `now` on the terminal's wall clock.
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.timezone())
    }

    /// Formats an amount with the currency symbol and thousands separators.
    ///
    /// ## Example
    /// ```rust
    /// use pakwan_core::Money;
    /// use pakwan_pos::state::ConfigState;
    ///
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_money(Money::from_units(1250)), "Rs. 1,250");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        let units = amount.units();
        let digits = units.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        format!(
            "{}{} {}",
            if units < 0 { "-" } else { "" },
            self.currency_symbol,
            grouped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_money() {
        let config = ConfigState::default();
        assert_eq!(config.format_money(Money::from_units(0)), "Rs. 0");
        assert_eq!(config.format_money(Money::from_units(320)), "Rs. 320");
        assert_eq!(config.format_money(Money::from_units(1190)), "Rs. 1,190");
        assert_eq!(config.format_money(Money::from_units(1234567)), "Rs. 1,234,567");
        assert_eq!(config.format_money(Money::from_units(-1500)), "-Rs. 1,500");
    }

    #[test]
    fn test_local_time_uses_offset() {
        let config = ConfigState::default();
        let utc = Utc.with_ymd_and_hms(2025, 3, 31, 20, 30, 0).unwrap();
        let local = config.local_time(utc);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2025-04-01 01:30");
    }
}
