//! Per-contact capability cache.
//!
//! Holds the latest [`CapabilityRecord`] for each contact. Records are shared
//! out as `Arc`s; replacing an entry never affects readers holding the old one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::capability::{CapabilityRecord, DEFAULT_CAPABILITIES};
use super::freshness::FreshnessPolicy;

/// Result of storing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityUpdate {
    /// The contact had no entry.
    Added,
    /// Same features as before; only timestamps moved.
    Refreshed,
    /// Features differ from the previous entry.
    Changed { previous: Arc<CapabilityRecord> },
}

impl CapabilityUpdate {
    /// Whether listeners should be told about new capabilities.
    pub fn is_change(&self) -> bool {
        !matches!(self, CapabilityUpdate::Refreshed)
    }
}

/// What a capability request for a contact decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A query should be sent now; the request time has been recorded.
    Requested,
    /// The contact was queried too recently; here is what is known.
    UpToDate(Arc<CapabilityRecord>),
}

/// Thread-safe map of contact identity to capability record.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    entries: RwLock<HashMap<String, Arc<CapabilityRecord>>>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest record for `contact`, if any.
    pub fn get(&self, contact: &str) -> Option<Arc<CapabilityRecord>> {
        self.entries.read().get(contact).cloned()
    }

    /// Store `record` for `contact`, replacing any previous entry.
    pub fn update(&self, contact: &str, record: CapabilityRecord) -> CapabilityUpdate {
        let record = Arc::new(record);
        let previous = self
            .entries
            .write()
            .insert(contact.to_string(), Arc::clone(&record));

        match previous {
            None => {
                log::debug!("New capabilities for {}: {}", contact, record);
                CapabilityUpdate::Added
            }
            Some(previous) if *previous == *record => {
                log::trace!("Capabilities refreshed for {}", contact);
                CapabilityUpdate::Refreshed
            }
            Some(previous) => {
                log::debug!(
                    "Capabilities changed for {}: {} -> {}",
                    contact,
                    previous,
                    record
                );
                CapabilityUpdate::Changed { previous }
            }
        }
    }

    /// Record an outgoing request for `contact` unless `policy` says the last
    /// one is too recent.
    ///
    /// The check and the write happen under one write guard, so a response
    /// stored concurrently is never overwritten with older flags.
    pub fn stamp_request(
        &self,
        contact: &str,
        now: DateTime<Utc>,
        policy: &FreshnessPolicy,
    ) -> RequestOutcome {
        let mut entries = self.entries.write();
        let current = entries.get(contact);
        if let Some(record) = current {
            if !policy.may_refresh(record, now) {
                return RequestOutcome::UpToDate(Arc::clone(record));
            }
        }
        let stamped = current
            .map(|record| record.as_ref())
            .unwrap_or(&DEFAULT_CAPABILITIES)
            .with_last_request_time(now);
        entries.insert(contact.to_string(), Arc::new(stamped));
        RequestOutcome::Requested
    }

    /// Remove the entry for `contact`.
    pub fn remove(&self, contact: &str) -> Option<Arc<CapabilityRecord>> {
        self.entries.write().remove(contact)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All contacts with an entry, sorted.
    pub fn contacts(&self) -> Vec<String> {
        let mut contacts: Vec<String> = self.entries.read().keys().cloned().collect();
        contacts.sort();
        contacts
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::capability::CapabilityRecordBuilder;
    use chrono::{Duration, TimeZone};

    fn chat_at(minutes: i64) -> CapabilityRecord {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        CapabilityRecordBuilder::new()
            .set_im_session(true)
            .set_last_response_time(Some(t))
            .build()
    }

    #[test]
    fn test_update_outcomes() {
        let cache = CapabilityCache::new();
        assert_eq!(cache.update("+33600000001", chat_at(0)), CapabilityUpdate::Added);
        assert_eq!(
            cache.update("+33600000001", chat_at(5)),
            CapabilityUpdate::Refreshed
        );

        let with_ft = chat_at(10).to_builder().set_file_transfer_http(true).build();
        match cache.update("+33600000001", with_ft) {
            CapabilityUpdate::Changed { previous } => {
                assert!(!previous.supports_file_transfer_http());
                assert_eq!(previous.last_response_time(), chat_at(5).last_response_time());
            }
            other => panic!("expected change, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_replaces_timestamps() {
        let cache = CapabilityCache::new();
        cache.update("alice", chat_at(0));
        cache.update("alice", chat_at(30));
        let stored = cache.get("alice").unwrap();
        assert_eq!(stored.last_response_time(), chat_at(30).last_response_time());
    }

    #[test]
    fn test_readers_keep_old_value() {
        let cache = CapabilityCache::new();
        cache.update("bob", chat_at(0));
        let held = cache.get("bob").unwrap();
        cache.update("bob", CapabilityRecordBuilder::new().build());
        assert!(held.supports_im_session());
        assert!(!cache.get("bob").unwrap().supports_im_session());
    }

    #[test]
    fn test_remove_and_listing() {
        let cache = CapabilityCache::new();
        assert!(cache.is_empty());
        cache.update("carol", chat_at(0));
        cache.update("alice", chat_at(0));
        assert_eq!(cache.contacts(), vec!["alice".to_string(), "carol".to_string()]);
        assert!(cache.remove("alice").is_some());
        assert!(cache.remove("alice").is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.get("carol").is_none());
    }

    #[test]
    fn test_stamp_request() {
        let cache = CapabilityCache::new();
        let policy = FreshnessPolicy::from_secs(60, 3600);
        let t0 = chat_at(0).last_response_time().unwrap();

        assert_eq!(cache.stamp_request("dave", t0, &policy), RequestOutcome::Requested);
        let pending = cache.get("dave").unwrap();
        assert!(pending.is_empty());
        assert_eq!(pending.last_request_time(), Some(t0));

        cache.update("dave", chat_at(0).with_last_request_time(t0));
        match cache.stamp_request("dave", t0 + Duration::seconds(10), &policy) {
            RequestOutcome::UpToDate(record) => assert!(record.supports_im_session()),
            other => panic!("expected up to date, got {:?}", other),
        }

        let later = t0 + Duration::seconds(60);
        assert_eq!(cache.stamp_request("dave", later, &policy), RequestOutcome::Requested);
        let stamped = cache.get("dave").unwrap();
        assert!(stamped.supports_im_session());
        assert_eq!(stamped.last_request_time(), Some(later));
        assert_eq!(stamped.last_response_time(), Some(t0));
    }

    #[test]
    fn test_concurrent_updates() {
        let cache = Arc::new(CapabilityCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        cache.update(&format!("contact-{}", i), chat_at(n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
