use chrono::{Duration, NaiveDateTime};

/// Time window a subscription grants access for.
///
/// The end is fixed when the subscription is created and never recomputed, even if the
/// plan's duration changes later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPeriod {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
}

impl SubscriptionPeriod {
    /// `None` when the end date falls outside the representable calendar range.
    pub fn starting_at(start_date: NaiveDateTime, duration_days: i32) -> Option<Self> {
        let end_date = start_date.checked_add_signed(Duration::days(i64::from(duration_days)))?;
        Some(Self {
            start_date,
            end_date,
        })
    }

    /// Expired once `now` is strictly past the end date.
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        now > self.end_date
    }

    /// What clients see as "active": the stored flag, masked by expiry.
    pub fn is_effectively_active(&self, active_flag: bool, now: NaiveDateTime) -> bool {
        active_flag && !self.is_expired_at(now)
    }
}

/// Result of cancelling a subscription: active ones are soft-canceled, inactive ones removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Canceled,
    Deleted,
}

impl CancelOutcome {
    /// Transition for a subscription whose stored flag is `active_flag`.
    pub fn for_active_flag(active_flag: bool) -> Self {
        if active_flag {
            CancelOutcome::Canceled
        } else {
            CancelOutcome::Deleted
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CancelOutcome::Canceled => "Subscription canceled successfully",
            CancelOutcome::Deleted => "Subscription deleted successfully",
        }
    }
}
