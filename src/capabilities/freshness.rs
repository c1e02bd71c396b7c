//! Staleness policy for cached capability records.
//!
//! Two timers apply to each record:
//! - the expiry timeout bounds how long a response may be trusted;
//! - the refresh timeout bounds how often the same contact may be queried.

use chrono::{DateTime, Duration, Utc};

use super::capability::CapabilityRecord;

/// Largest second count `chrono::Duration::seconds` accepts.
const MAX_SECS: u64 = (i64::MAX / 1000) as u64;

/// Decides whether a capability record can be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    refresh_timeout: Duration,
    expiry_timeout: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::days(1),
            expiry_timeout: Duration::days(1),
        }
    }
}

impl FreshnessPolicy {
    pub fn new(refresh_timeout: Duration, expiry_timeout: Duration) -> Self {
        Self {
            refresh_timeout,
            expiry_timeout,
        }
    }

    /// Build a policy from second counts, saturating at chrono's range.
    pub fn from_secs(refresh_secs: u64, expiry_secs: u64) -> Self {
        Self::new(
            Duration::seconds(refresh_secs.min(MAX_SECS) as i64),
            Duration::seconds(expiry_secs.min(MAX_SECS) as i64),
        )
    }

    pub fn refresh_timeout(&self) -> Duration {
        self.refresh_timeout
    }

    pub fn expiry_timeout(&self) -> Duration {
        self.expiry_timeout
    }

    /// True when the record carries no response or the response is too old.
    pub fn is_expired(&self, record: &CapabilityRecord, now: DateTime<Utc>) -> bool {
        match record.last_response_time() {
            None => true,
            Some(answered) => elapsed(answered, self.expiry_timeout, now),
        }
    }

    pub fn is_fresh(&self, record: &CapabilityRecord, now: DateTime<Utc>) -> bool {
        !self.is_expired(record, now)
    }

    /// True when a new request for this record's contact may be sent.
    pub fn may_refresh(&self, record: &CapabilityRecord, now: DateTime<Utc>) -> bool {
        match record.last_request_time() {
            None => true,
            Some(requested) => elapsed(requested, self.refresh_timeout, now),
        }
    }
}

/// `now >= since + timeout`. A deadline past chrono's range is never reached.
fn elapsed(since: DateTime<Utc>, timeout: Duration, now: DateTime<Utc>) -> bool {
    match since.checked_add_signed(timeout) {
        Some(deadline) => now >= deadline,
        None => false,
    }
}
