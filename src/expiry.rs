//! Expiry classification.
//!
//! An expiry date is taken to mean midnight UTC at the start of that day, the
//! same instant a date-only ISO string denotes. Both predicates come in a
//! `_at` form taking an explicit "now" so callers and tests can pin the clock.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::ingredient_model::Ingredient;

/// Inclusive window, in whole days, for "expiring soon".
pub const EXPIRING_SOON_DAYS: i64 = 3;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpiryStatus {
    /// No expiry date tracked
    Untracked,
    Fresh,
    ExpiringSoon,
    Expired,
}

/// The instant an expiry date takes effect.
pub fn expiry_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Whole days until `date`, rounded up. Any time left today counts as 0.
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let millis = (expiry_instant(date) - now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

pub fn is_expired(date: Option<NaiveDate>) -> bool {
    is_expired_at(date, Utc::now())
}

/// True iff the date is present and strictly before `now`.
pub fn is_expired_at(date: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    match date {
        Some(date) => expiry_instant(date) < now,
        None => false,
    }
}

pub fn is_expiring_soon(date: Option<NaiveDate>) -> bool {
    is_expiring_soon_at(date, Utc::now())
}

/// True iff the date is present, not yet past, and at most
/// [`EXPIRING_SOON_DAYS`] whole days away.
///
/// Never true together with [`is_expired_at`] for the same `now`.
pub fn is_expiring_soon_at(date: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    let Some(date) = date else {
        return false;
    };
    if expiry_instant(date) < now {
        return false;
    }
    let days = days_until(date, now);
    (0..=EXPIRING_SOON_DAYS).contains(&days)
}

pub fn status_at(date: Option<NaiveDate>, now: DateTime<Utc>) -> ExpiryStatus {
    if date.is_none() {
        ExpiryStatus::Untracked
    } else if is_expired_at(date, now) {
        ExpiryStatus::Expired
    } else if is_expiring_soon_at(date, now) {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Fresh
    }
}

/// Counts shown in the pantry header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirySummary {
    pub total: usize,
    pub expiring_soon: usize,
    pub expired: usize,
}

impl ExpirySummary {
    pub fn compute_at(ingredients: &[Ingredient], now: DateTime<Utc>) -> Self {
        ingredients
            .iter()
            .fold(ExpirySummary::default(), |mut summary, ingredient| {
                summary.total += 1;
                match status_at(ingredient.expiry_date, now) {
                    ExpiryStatus::Expired => summary.expired += 1,
                    ExpiryStatus::ExpiringSoon => summary.expiring_soon += 1,
                    ExpiryStatus::Fresh | ExpiryStatus::Untracked => {}
                }
                summary
            })
    }
}
