//! Capability record — the frozen summary of what a party supports.
//!
//! A [`CapabilityRecord`] is never edited in place. Updates go through a
//! [`CapabilityRecordBuilder`] seeded from the old record and produce a new
//! value that replaces the old one wherever it is held.
//!
//! Equality and hashing look at the feature flags only. Two records learned
//! at different instants but describing the same features compare equal, which
//! is what change detection in the cache relies on.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The optional features a party may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// One-to-one and group chat sessions.
    ImSession,
    /// File transfer over an MSRP session.
    FileTransferMsrp,
    /// Circuit-switched video call.
    CsVideo,
    /// Presence discovery.
    PresenceDiscovery,
    /// Social presence information.
    SocialPresence,
    /// File transfer over HTTP.
    FileTransferHttp,
    /// Thumbnails attached to file transfer invitations.
    FileTransferThumbnail,
    /// Store-and-forward for file transfer.
    FileTransferStoreForward,
    /// Store-and-forward for group chat.
    GroupChatStoreForward,
    /// The party is an automaton (RFC 3840 `sip.automata`).
    SipAutomata,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 10] = [
        Feature::ImSession,
        Feature::FileTransferMsrp,
        Feature::CsVideo,
        Feature::PresenceDiscovery,
        Feature::SocialPresence,
        Feature::FileTransferHttp,
        Feature::FileTransferThumbnail,
        Feature::FileTransferStoreForward,
        Feature::GroupChatStoreForward,
        Feature::SipAutomata,
    ];

    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ImSession => "im_session",
            Feature::FileTransferMsrp => "file_transfer_msrp",
            Feature::CsVideo => "cs_video",
            Feature::PresenceDiscovery => "presence_discovery",
            Feature::SocialPresence => "social_presence",
            Feature::FileTransferHttp => "file_transfer_http",
            Feature::FileTransferThumbnail => "file_transfer_thumbnail",
            Feature::FileTransferStoreForward => "file_transfer_store_forward",
            Feature::GroupChatStoreForward => "group_chat_store_forward",
            Feature::SipAutomata => "sip_automata",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature flags shared by the record and its builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
struct FeatureFlags {
    im_session: bool,
    file_transfer_msrp: bool,
    cs_video: bool,
    presence_discovery: bool,
    social_presence: bool,
    file_transfer_http: bool,
    file_transfer_thumbnail: bool,
    file_transfer_store_forward: bool,
    group_chat_store_forward: bool,
    sip_automata: bool,
}

impl FeatureFlags {
    const NONE: FeatureFlags = FeatureFlags {
        im_session: false,
        file_transfer_msrp: false,
        cs_video: false,
        presence_discovery: false,
        social_presence: false,
        file_transfer_http: false,
        file_transfer_thumbnail: false,
        file_transfer_store_forward: false,
        group_chat_store_forward: false,
        sip_automata: false,
    };

    fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::ImSession => self.im_session,
            Feature::FileTransferMsrp => self.file_transfer_msrp,
            Feature::CsVideo => self.cs_video,
            Feature::PresenceDiscovery => self.presence_discovery,
            Feature::SocialPresence => self.social_presence,
            Feature::FileTransferHttp => self.file_transfer_http,
            Feature::FileTransferThumbnail => self.file_transfer_thumbnail,
            Feature::FileTransferStoreForward => self.file_transfer_store_forward,
            Feature::GroupChatStoreForward => self.group_chat_store_forward,
            Feature::SipAutomata => self.sip_automata,
        }
    }

    fn slot(&mut self, feature: Feature) -> &mut bool {
        match feature {
            Feature::ImSession => &mut self.im_session,
            Feature::FileTransferMsrp => &mut self.file_transfer_msrp,
            Feature::CsVideo => &mut self.cs_video,
            Feature::PresenceDiscovery => &mut self.presence_discovery,
            Feature::SocialPresence => &mut self.social_presence,
            Feature::FileTransferHttp => &mut self.file_transfer_http,
            Feature::FileTransferThumbnail => &mut self.file_transfer_thumbnail,
            Feature::FileTransferStoreForward => &mut self.file_transfer_store_forward,
            Feature::GroupChatStoreForward => &mut self.group_chat_store_forward,
            Feature::SipAutomata => &mut self.sip_automata,
        }
    }
}

/// Capabilities applicable to non-RCS contacts: nothing supported, never
/// requested, never answered.
pub static DEFAULT_CAPABILITIES: CapabilityRecord = CapabilityRecord {
    features: FeatureFlags::NONE,
    last_request_time: None,
    last_response_time: None,
};

/// Immutable description of the features a party supports.
///
/// Build one with [`CapabilityRecordBuilder`] or decode one from feature tags
/// with [`crate::capabilities::codec::decode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRecord {
    #[serde(flatten)]
    features: FeatureFlags,
    /// When capabilities were last requested from the party.
    #[serde(default)]
    last_request_time: Option<DateTime<Utc>>,
    /// When the party last answered.
    #[serde(default)]
    last_response_time: Option<DateTime<Utc>>,
}

impl CapabilityRecord {
    /// Start a fresh builder with every flag false and no timestamps.
    pub fn builder() -> CapabilityRecordBuilder {
        CapabilityRecordBuilder::new()
    }

    /// Start a builder pre-seeded with every field of this record.
    pub fn to_builder(&self) -> CapabilityRecordBuilder {
        CapabilityRecordBuilder::from(self)
    }

    /// Copy of this record with only the request timestamp replaced.
    pub fn with_last_request_time(&self, time: DateTime<Utc>) -> CapabilityRecord {
        self.to_builder().set_last_request_time(Some(time)).build()
    }

    /// Whether the given feature is supported.
    pub fn supports(&self, feature: Feature) -> bool {
        self.features.get(feature)
    }

    /// Supported features, in [`Feature::ALL`] order.
    pub fn supported_features(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.supports(*f))
            .collect()
    }

    /// True when no optional feature is supported.
    pub fn is_empty(&self) -> bool {
        self.features == FeatureFlags::NONE
    }

    pub fn supports_im_session(&self) -> bool {
        self.features.im_session
    }

    pub fn supports_file_transfer_msrp(&self) -> bool {
        self.features.file_transfer_msrp
    }

    pub fn supports_cs_video(&self) -> bool {
        self.features.cs_video
    }

    pub fn supports_presence_discovery(&self) -> bool {
        self.features.presence_discovery
    }

    pub fn supports_social_presence(&self) -> bool {
        self.features.social_presence
    }

    pub fn supports_file_transfer_http(&self) -> bool {
        self.features.file_transfer_http
    }

    pub fn supports_file_transfer_thumbnail(&self) -> bool {
        self.features.file_transfer_thumbnail
    }

    pub fn supports_file_transfer_store_forward(&self) -> bool {
        self.features.file_transfer_store_forward
    }

    pub fn supports_group_chat_store_forward(&self) -> bool {
        self.features.group_chat_store_forward
    }

    /// Whether the party is an automaton (RFC 3840).
    pub fn supports_sip_automata(&self) -> bool {
        self.features.sip_automata
    }

    /// When capabilities were last requested, `None` if never.
    pub fn last_request_time(&self) -> Option<DateTime<Utc>> {
        self.last_request_time
    }

    /// When the party last answered, `None` if never.
    pub fn last_response_time(&self) -> Option<DateTime<Utc>> {
        self.last_response_time
    }
}

impl Default for CapabilityRecord {
    fn default() -> Self {
        DEFAULT_CAPABILITIES.clone()
    }
}

// Timestamps take no part in equality or hashing.
impl PartialEq for CapabilityRecord {
    fn eq(&self, other: &Self) -> bool {
        self.features == other.features
    }
}

impl Eq for CapabilityRecord {}

impl Hash for CapabilityRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.features.hash(state);
    }
}

impl fmt::Display for CapabilityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = |t: Option<DateTime<Utc>>| match t {
            Some(t) => t.timestamp_millis().to_string(),
            None => "-".to_string(),
        };
        write!(
            f,
            "Caps{{IM={}, FtMsrp={}, FtHttp={}, FtThumbnail={}, FtSF={}, GcSF={}, SipAutomata={}, TimeOfLastRequest={}, TimeOfLastResponse={}}}",
            self.features.im_session,
            self.features.file_transfer_msrp,
            self.features.file_transfer_http,
            self.features.file_transfer_thumbnail,
            self.features.file_transfer_store_forward,
            self.features.group_chat_store_forward,
            self.features.sip_automata,
            ts(self.last_request_time),
            ts(self.last_response_time),
        )
    }
}

/// Mutable staging area for a [`CapabilityRecord`].
///
/// Setters chain:
///
/// ```
/// use rcs_capability::capabilities::CapabilityRecordBuilder;
///
/// let caps = CapabilityRecordBuilder::new()
///     .set_im_session(true)
///     .set_file_transfer_http(true)
///     .build();
/// assert!(caps.supports_im_session());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapabilityRecordBuilder {
    features: FeatureFlags,
    last_request_time: Option<DateTime<Utc>>,
    last_response_time: Option<DateTime<Utc>>,
}

impl CapabilityRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set any feature by name. Used by the tag codec tables.
    pub fn set(&mut self, feature: Feature, support: bool) -> &mut Self {
        *self.features.slot(feature) = support;
        self
    }

    pub fn get(&self, feature: Feature) -> bool {
        self.features.get(feature)
    }

    pub fn set_im_session(&mut self, support: bool) -> &mut Self {
        self.features.im_session = support;
        self
    }

    pub fn im_session(&self) -> bool {
        self.features.im_session
    }

    pub fn set_file_transfer_msrp(&mut self, support: bool) -> &mut Self {
        self.features.file_transfer_msrp = support;
        self
    }

    pub fn file_transfer_msrp(&self) -> bool {
        self.features.file_transfer_msrp
    }

    pub fn set_cs_video(&mut self, support: bool) -> &mut Self {
        self.features.cs_video = support;
        self
    }

    pub fn cs_video(&self) -> bool {
        self.features.cs_video
    }

    pub fn set_presence_discovery(&mut self, support: bool) -> &mut Self {
        self.features.presence_discovery = support;
        self
    }

    pub fn presence_discovery(&self) -> bool {
        self.features.presence_discovery
    }

    pub fn set_social_presence(&mut self, support: bool) -> &mut Self {
        self.features.social_presence = support;
        self
    }

    pub fn social_presence(&self) -> bool {
        self.features.social_presence
    }

    pub fn set_file_transfer_http(&mut self, support: bool) -> &mut Self {
        self.features.file_transfer_http = support;
        self
    }

    pub fn file_transfer_http(&self) -> bool {
        self.features.file_transfer_http
    }

    pub fn set_file_transfer_thumbnail(&mut self, support: bool) -> &mut Self {
        self.features.file_transfer_thumbnail = support;
        self
    }

    pub fn file_transfer_thumbnail(&self) -> bool {
        self.features.file_transfer_thumbnail
    }

    pub fn set_file_transfer_store_forward(&mut self, support: bool) -> &mut Self {
        self.features.file_transfer_store_forward = support;
        self
    }

    pub fn file_transfer_store_forward(&self) -> bool {
        self.features.file_transfer_store_forward
    }

    pub fn set_group_chat_store_forward(&mut self, support: bool) -> &mut Self {
        self.features.group_chat_store_forward = support;
        self
    }

    pub fn group_chat_store_forward(&self) -> bool {
        self.features.group_chat_store_forward
    }

    pub fn set_sip_automata(&mut self, support: bool) -> &mut Self {
        self.features.sip_automata = support;
        self
    }

    pub fn sip_automata(&self) -> bool {
        self.features.sip_automata
    }

    pub fn set_last_request_time(&mut self, time: Option<DateTime<Utc>>) -> &mut Self {
        self.last_request_time = time;
        self
    }

    pub fn last_request_time(&self) -> Option<DateTime<Utc>> {
        self.last_request_time
    }

    pub fn set_last_response_time(&mut self, time: Option<DateTime<Utc>>) -> &mut Self {
        self.last_response_time = time;
        self
    }

    pub fn last_response_time(&self) -> Option<DateTime<Utc>> {
        self.last_response_time
    }

    /// Freeze the current state. The builder stays usable afterwards.
    pub fn build(&self) -> CapabilityRecord {
        CapabilityRecord {
            features: self.features,
            last_request_time: self.last_request_time,
            last_response_time: self.last_response_time,
        }
    }
}

impl From<&CapabilityRecord> for CapabilityRecordBuilder {
    fn from(record: &CapabilityRecord) -> Self {
        Self {
            features: record.features,
            last_request_time: record.last_request_time,
            last_response_time: record.last_response_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of(record: &CapabilityRecord) -> u64 {
        let mut hasher = DefaultHasher::new();
        record.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_default_record_is_empty() {
        let caps = &DEFAULT_CAPABILITIES;
        for feature in Feature::ALL {
            assert!(!caps.supports(feature), "{} should be off", feature);
        }
        assert!(caps.is_empty());
        assert_eq!(caps.last_request_time(), None);
        assert_eq!(caps.last_response_time(), None);
        assert_eq!(CapabilityRecord::default(), *caps);
    }

    #[test]
    fn test_equality_ignores_timestamps() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let a = CapabilityRecordBuilder::new()
            .set_im_session(true)
            .set_last_request_time(Some(t0))
            .set_last_response_time(Some(t0))
            .build();
        let b = CapabilityRecordBuilder::new()
            .set_im_session(true)
            .set_last_request_time(Some(t0 + Duration::hours(5)))
            .build();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
    }

    #[test]
    fn test_single_flag_difference_is_unequal() {
        let base = CapabilityRecordBuilder::new().set_im_session(true).build();
        for feature in Feature::ALL {
            let flipped = base.to_builder().set(feature, !base.supports(feature)).build();
            assert_ne!(base, flipped, "flipping {} must change equality", feature);
        }
    }

    #[test]
    fn test_builder_copy_then_modify() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let original = CapabilityRecordBuilder::new()
            .set_im_session(true)
            .set_social_presence(true)
            .set_last_response_time(Some(t0))
            .build();

        let updated = original.to_builder().set_file_transfer_http(true).build();

        assert!(updated.supports_im_session());
        assert!(updated.supports_social_presence());
        assert!(updated.supports_file_transfer_http());
        assert_eq!(updated.last_response_time(), Some(t0));
        // The source record is untouched.
        assert!(!original.supports_file_transfer_http());
    }

    #[test]
    fn test_build_twice_yields_independent_records() {
        let mut builder = CapabilityRecordBuilder::new();
        builder.set_cs_video(true);
        let first = builder.build();
        builder.set_cs_video(false);
        let second = builder.build();

        assert!(first.supports_cs_video());
        assert!(!second.supports_cs_video());
        assert_eq!(builder.build(), second);
    }

    #[test]
    fn test_named_and_generic_accessors_agree() {
        let mut builder = CapabilityRecordBuilder::new();
        builder
            .set_file_transfer_msrp(true)
            .set_presence_discovery(true)
            .set_file_transfer_thumbnail(true)
            .set_file_transfer_store_forward(true)
            .set_group_chat_store_forward(true)
            .set_sip_automata(true);
        assert!(builder.file_transfer_msrp() && builder.get(Feature::FileTransferMsrp));
        assert!(!builder.im_session() && !builder.get(Feature::ImSession));

        let caps = builder.build();
        assert!(caps.supports_file_transfer_msrp());
        assert!(caps.supports_presence_discovery());
        assert!(caps.supports_file_transfer_thumbnail());
        assert!(caps.supports_file_transfer_store_forward());
        assert!(caps.supports_group_chat_store_forward());
        assert!(caps.supports_sip_automata());
        assert!(!caps.supports_social_presence());
        assert_eq!(caps.supported_features().len(), 6);
    }

    #[test]
    fn test_with_last_request_time_keeps_flags() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let caps = CapabilityRecordBuilder::new()
            .set_file_transfer_http(true)
            .set_last_response_time(Some(t0))
            .build();
        let stamped = caps.with_last_request_time(t0 + Duration::minutes(1));
        assert_eq!(stamped, caps);
        assert_eq!(stamped.last_request_time(), Some(t0 + Duration::minutes(1)));
        assert_eq!(stamped.last_response_time(), Some(t0));
    }

    #[test]
    fn test_json_shape() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let caps = CapabilityRecordBuilder::new()
            .set_im_session(true)
            .set_last_response_time(Some(t0))
            .build();
        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(json["im_session"], true);
        assert_eq!(json["cs_video"], false);
        assert!(json["last_request_time"].is_null());

        let back: CapabilityRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.last_response_time(), Some(t0));
    }

    #[test]
    fn test_partial_json_defaults_missing_flags() {
        let caps: CapabilityRecord =
            serde_json::from_value(serde_json::json!({ "im_session": true })).unwrap();
        assert!(caps.supports_im_session());
        assert!(!caps.supports_file_transfer_http());
        assert!(!caps.supports_sip_automata());
        assert_eq!(caps.last_request_time(), None);
        assert_eq!(caps.last_response_time(), None);
    }

    #[test]
    fn test_display_summary() {
        let caps = CapabilityRecordBuilder::new().set_im_session(true).build();
        let text = caps.to_string();
        assert!(text.starts_with("Caps{IM=true, FtMsrp=false"));
        assert!(text.ends_with("TimeOfLastRequest=-, TimeOfLastResponse=-}"));
    }
}
