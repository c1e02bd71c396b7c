//! # rcs-capability
//!
//! Capability negotiation for an RCS (Rich Communication Services) client.
//!
//! A peer's support for chat, file transfer, presence and related features is
//! learnt from the feature tags of its SIP messages, kept per contact as an
//! immutable [`CapabilityRecord`], and re-queried once the record goes stale.
//! Local support is advertised with the same tag vocabulary.
//!
//! ```
//! use rcs_capability::capabilities::{codec, feature_tags};
//!
//! let tag = feature_tags::composite_tag(
//!     feature_tags::FEATURE_IARI_REF,
//!     &[feature_tags::FEATURE_RCSE_CHAT],
//! );
//! let caps = codec::decode([tag]);
//! assert!(caps.supports_im_session());
//! assert!(!caps.supports_file_transfer_http());
//! ```

pub mod capabilities;
pub mod registration;
pub mod settings;
pub mod utilities;

pub use capabilities::{
    CapabilityCache, CapabilityRecord, CapabilityRecordBuilder, CapabilityService,
    CapabilityUpdate, Feature, FreshnessPolicy, DEFAULT_CAPABILITIES,
};
pub use registration::{ImsEngine, NetworkInterface, ReasonCode, RegistrationGate};
pub use settings::{CapabilitySettings, FeatureSettings, LocalFeatureConfig};
pub use utilities::errors::{GateError, SettingsError, TagError};
