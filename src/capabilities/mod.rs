//! # Capability Negotiation
//!
//! Models what a remote party supports in terms of rich communication
//! features, how that knowledge is learnt from feature tags, and when it must
//! be learnt again.
//!
//! ## Flow
//!
//! 1. An inbound message yields a set of feature tags.
//! 2. [`codec::decode`] turns them into a [`CapabilityRecord`].
//! 3. The record is stored per contact in a [`CapabilityCache`].
//! 4. Feature gating reads the cached record; the [`FreshnessPolicy`] says
//!    whether it is still valid or the contact must be queried again.
//! 5. Outbound, [`codec::encode`] turns local settings into the tags we
//!    advertise, once the [`crate::registration::RegistrationGate`] reports
//!    the client as registered.

pub mod cache;
pub mod capability;
pub mod codec;
pub mod feature_tags;
pub mod freshness;
pub mod service;

pub use cache::{CapabilityCache, CapabilityUpdate, RequestOutcome};
pub use capability::{CapabilityRecord, CapabilityRecordBuilder, Feature, DEFAULT_CAPABILITIES};
pub use codec::{decode, decode_at, encode, extract_service_id};
pub use freshness::FreshnessPolicy;
pub use service::{CapabilityService, Lookup};
