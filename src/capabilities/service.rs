//! Capability exchange workflow.
//!
//! Ties the codec, the registration gate, the freshness policy and the
//! per-contact cache together:
//!
//! 1. `request_capabilities` decides whether a query to a contact is needed
//!    and allowed, and marks the request time.
//! 2. The caller sends the query with `advertised_tags` and hands the feature
//!    tags of the answer (or of any unsolicited message) to
//!    `handle_capabilities`.
//! 3. Feature gating reads `capabilities_of` / `lookup`.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::cache::{CapabilityCache, CapabilityUpdate, RequestOutcome};
use super::capability::{CapabilityRecord, DEFAULT_CAPABILITIES};
use super::codec;
use super::freshness::FreshnessPolicy;
use crate::registration::RegistrationGate;
use crate::settings::FeatureSettings;
use crate::utilities::errors::GateError;

/// Cached knowledge about a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Fresh(Arc<CapabilityRecord>),
    Expired(Arc<CapabilityRecord>),
    Unknown,
}

/// Capability exchange for one local client.
pub struct CapabilityService<S: FeatureSettings> {
    gate: Arc<RegistrationGate>,
    settings: S,
    policy: FreshnessPolicy,
    cache: CapabilityCache,
    default_record: Arc<CapabilityRecord>,
}

impl<S: FeatureSettings> CapabilityService<S> {
    pub fn new(gate: Arc<RegistrationGate>, settings: S, policy: FreshnessPolicy) -> Self {
        Self {
            gate,
            settings,
            policy,
            cache: CapabilityCache::new(),
            default_record: Arc::new(DEFAULT_CAPABILITIES.clone()),
        }
    }

    pub fn gate(&self) -> &RegistrationGate {
        &self.gate
    }

    pub fn cache(&self) -> &CapabilityCache {
        &self.cache
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    /// Feature tags to put in outgoing capability queries and answers.
    pub fn advertised_tags(&self) -> Result<Vec<String>, GateError> {
        self.gate.require_registered()?;
        Ok(codec::encode(&self.settings))
    }

    /// Decide whether to query `contact` now.
    pub fn request_capabilities(
        &self,
        contact: &str,
        now: DateTime<Utc>,
    ) -> Result<RequestOutcome, GateError> {
        self.gate.require_registered()?;

        let outcome = self.cache.stamp_request(contact, now, &self.policy);
        match &outcome {
            RequestOutcome::Requested => log::debug!("Requesting capabilities of {}", contact),
            RequestOutcome::UpToDate(_) => {
                log::trace!("Capabilities of {} requested recently, skipping", contact)
            }
        }
        Ok(outcome)
    }

    /// Store the capabilities carried by an inbound message from `contact`.
    ///
    /// Not gated on registration: unsolicited capability payloads are accepted
    /// whatever the local registration state.
    pub fn handle_capabilities<I>(&self, contact: &str, tags: I) -> CapabilityUpdate
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.store(contact, codec::decode(tags))
    }

    /// Same as [`Self::handle_capabilities`] with an explicit timestamp.
    pub fn handle_capabilities_at<I>(
        &self,
        contact: &str,
        tags: I,
        now: DateTime<Utc>,
    ) -> CapabilityUpdate
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.store(contact, codec::decode_at(tags, now))
    }

    fn store(&self, contact: &str, record: CapabilityRecord) -> CapabilityUpdate {
        let update = self.cache.update(contact, record);
        if update.is_change() {
            log::info!("Capabilities of {} updated", contact);
        }
        update
    }

    /// Cached record for `contact`, classified by the freshness policy.
    pub fn lookup(&self, contact: &str, now: DateTime<Utc>) -> Lookup {
        match self.cache.get(contact) {
            Some(record) if self.policy.is_fresh(&record, now) => Lookup::Fresh(record),
            Some(record) => Lookup::Expired(record),
            None => Lookup::Unknown,
        }
    }

    /// Fresh capabilities of `contact`, or the default (non-RCS) record.
    pub fn capabilities_of(&self, contact: &str, now: DateTime<Utc>) -> Arc<CapabilityRecord> {
        match self.lookup(contact, now) {
            Lookup::Fresh(record) => record,
            Lookup::Expired(_) | Lookup::Unknown => Arc::clone(&self.default_record),
        }
    }
}
