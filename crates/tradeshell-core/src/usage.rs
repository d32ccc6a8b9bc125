// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar-based rollover rule for API usage counters.
//!
//! Each broker account carries a daily and a monthly request counter plus the
//! timestamp of the last reset. The daily counter resets when the calendar
//! day of "now" differs from the last reset; the monthly counter resets when
//! the (month, year) pair differs. The two checks are independent booleans,
//! not mutually exclusive branches.

use chrono::{DateTime, Datelike, Utc};

/// Result of applying one usage event to the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRollover {
    /// New daily counter value.
    pub daily: i64,
    /// New monthly counter value.
    pub monthly: i64,
    /// True when either reset fired; the caller must then persist
    /// `last_reset_date = now`.
    pub reset_fired: bool,
}

/// Apply `n` requests to the counters, resetting across calendar boundaries.
///
/// On a reset the counter becomes `n` (not incremented from zero); otherwise
/// it accumulates.
pub fn rollover(
    last_reset: DateTime<Utc>,
    now: DateTime<Utc>,
    daily: i64,
    monthly: i64,
    n: i64,
) -> UsageRollover {
    let day_changed = now.date_naive() != last_reset.date_naive();
    let month_changed = now.month() != last_reset.month() || now.year() != last_reset.year();

    UsageRollover {
        daily: if day_changed { n } else { daily + n },
        monthly: if month_changed { n } else { monthly + n },
        reset_fired: day_changed || month_changed,
    }
}
