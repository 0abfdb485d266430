//! Time units used by commands and retention configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unit for an `(amount, unit)` pair, named the way configuration files spell them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    HalfDays,
    Days,
}

impl TimeUnit {
    /// Convert `amount` of this unit into a std `Duration`
    #[must_use]
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            Self::Nanos => Duration::from_nanos(amount),
            Self::Micros => Duration::from_micros(amount),
            Self::Millis => Duration::from_millis(amount),
            Self::Seconds => Duration::from_secs(amount),
            Self::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            Self::Hours => Duration::from_secs(amount.saturating_mul(3_600)),
            Self::HalfDays => Duration::from_secs(amount.saturating_mul(43_200)),
            Self::Days => Duration::from_secs(amount.saturating_mul(86_400)),
        }
    }

    /// Convert `amount` of this unit into a `chrono::Duration`, saturating on overflow
    #[must_use]
    pub fn chrono_duration(self, amount: u64) -> chrono::Duration {
        chrono::Duration::from_std(self.duration(amount)).unwrap_or(chrono::Duration::MAX)
    }
}
