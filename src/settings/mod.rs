//! Local capability settings.
//!
//! What the local client advertises is configured separately from what peers
//! are known to support, even though both use the same feature vocabulary.
//!
//! # Example YAML
//!
//! ```yaml
//! capability:
//!   features:
//!     im_session: true
//!     file_transfer_http: true
//!   refresh_timeout_secs: 86400
//!   expiry_timeout_secs: 86400
//! ```

use serde::{Deserialize, Serialize};

use crate::capabilities::freshness::FreshnessPolicy;
use crate::capabilities::Feature;
use crate::utilities::errors::SettingsError;

/// Read-only accessor for the local feature switches.
pub trait FeatureSettings: Send + Sync {
    fn is_im_session_supported(&self) -> bool;
    fn is_file_transfer_msrp_supported(&self) -> bool;
    fn is_cs_video_supported(&self) -> bool;
    fn is_presence_discovery_supported(&self) -> bool;
    fn is_social_presence_supported(&self) -> bool;
    fn is_file_transfer_http_supported(&self) -> bool;
    fn is_file_transfer_thumbnail_supported(&self) -> bool;
    fn is_file_transfer_store_forward_supported(&self) -> bool;
    fn is_group_chat_store_forward_supported(&self) -> bool;
    fn is_sip_automata(&self) -> bool;

    /// Look a switch up by feature.
    fn is_supported(&self, feature: Feature) -> bool {
        match feature {
            Feature::ImSession => self.is_im_session_supported(),
            Feature::FileTransferMsrp => self.is_file_transfer_msrp_supported(),
            Feature::CsVideo => self.is_cs_video_supported(),
            Feature::PresenceDiscovery => self.is_presence_discovery_supported(),
            Feature::SocialPresence => self.is_social_presence_supported(),
            Feature::FileTransferHttp => self.is_file_transfer_http_supported(),
            Feature::FileTransferThumbnail => self.is_file_transfer_thumbnail_supported(),
            Feature::FileTransferStoreForward => self.is_file_transfer_store_forward_supported(),
            Feature::GroupChatStoreForward => self.is_group_chat_store_forward_supported(),
            Feature::SipAutomata => self.is_sip_automata(),
        }
    }
}

/// Feature switches for the local client. Everything is off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalFeatureConfig {
    pub im_session: bool,
    pub file_transfer_msrp: bool,
    pub cs_video: bool,
    pub presence_discovery: bool,
    pub social_presence: bool,
    pub file_transfer_http: bool,
    pub file_transfer_thumbnail: bool,
    pub file_transfer_store_forward: bool,
    pub group_chat_store_forward: bool,
    pub sip_automata: bool,
}

impl FeatureSettings for LocalFeatureConfig {
    fn is_im_session_supported(&self) -> bool {
        self.im_session
    }

    fn is_file_transfer_msrp_supported(&self) -> bool {
        self.file_transfer_msrp
    }

    fn is_cs_video_supported(&self) -> bool {
        self.cs_video
    }

    fn is_presence_discovery_supported(&self) -> bool {
        self.presence_discovery
    }

    fn is_social_presence_supported(&self) -> bool {
        self.social_presence
    }

    fn is_file_transfer_http_supported(&self) -> bool {
        self.file_transfer_http
    }

    fn is_file_transfer_thumbnail_supported(&self) -> bool {
        self.file_transfer_thumbnail
    }

    fn is_file_transfer_store_forward_supported(&self) -> bool {
        self.file_transfer_store_forward
    }

    fn is_group_chat_store_forward_supported(&self) -> bool {
        self.group_chat_store_forward
    }

    fn is_sip_automata(&self) -> bool {
        self.sip_automata
    }
}

fn default_timeout_secs() -> u64 {
    24 * 60 * 60
}

/// Capability settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySettings {
    /// Features advertised to peers.
    #[serde(default)]
    pub features: LocalFeatureConfig,

    /// Minimum spacing between two capability requests to the same contact.
    #[serde(default = "default_timeout_secs")]
    pub refresh_timeout_secs: u64,

    /// How long a capability response stays valid.
    #[serde(default = "default_timeout_secs")]
    pub expiry_timeout_secs: u64,
}

impl Default for CapabilitySettings {
    fn default() -> Self {
        Self {
            features: LocalFeatureConfig::default(),
            refresh_timeout_secs: default_timeout_secs(),
            expiry_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Wrapper so settings files are self-describing (`capability:` top-level key).
#[derive(Debug, Deserialize)]
struct SettingsWrapper {
    capability: CapabilitySettings,
}

impl CapabilitySettings {
    /// Parse settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        let wrapper: SettingsWrapper = serde_yaml::from_str(yaml)?;
        wrapper.capability.validate()?;
        Ok(wrapper.capability)
    }

    /// Parse settings from a YAML file on disk.
    pub fn from_yaml_file(path: &str) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml(&content)?;
        log::debug!("Loaded capability settings from {}", path);
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.expiry_timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                key: "expiry_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        // i64 milliseconds is what chrono::Duration holds.
        for (key, value) in [
            ("refresh_timeout_secs", self.refresh_timeout_secs),
            ("expiry_timeout_secs", self.expiry_timeout_secs),
        ] {
            if value > (i64::MAX as u64) / 1000 {
                return Err(SettingsError::Invalid {
                    key,
                    message: format!("{} seconds is out of range", value),
                });
            }
        }
        Ok(())
    }

    /// Freshness policy described by these settings.
    pub fn freshness_policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::from_secs(self.refresh_timeout_secs, self.expiry_timeout_secs)
    }
}
