//! Feature tag markers used in capability exchange.
//!
//! RCS features are advertised as IARI values grouped under the
//! `+g.3gpp.iari-ref` media feature tag, e.g.
//!
//! ```text
//! +g.3gpp.iari-ref="urn%3Aurn-7%3A3gpp-application.ims.iari.rcse.im,urn%3Aurn-7%3A3gpp-application.ims.iari.rcs.fthttp"
//! ```
//!
//! Matching is done by substring containment, so no marker below may be a
//! substring of another one. The test module checks this.

use super::capability::Feature;

/// Media feature tag grouping IARI values.
pub const FEATURE_IARI_REF: &str = "+g.3gpp.iari-ref";
/// Media feature tag grouping ICSI values.
pub const FEATURE_ICSI_REF: &str = "+g.3gpp.icsi-ref";

/// Namespace prefix of IARI extension service identifiers.
pub const IARI_EXTENSION_PREFIX: &str = FEATURE_IARI_REF;
/// Namespace prefix of ICSI extension service identifiers.
pub const ICSI_EXTENSION_PREFIX: &str = FEATURE_ICSI_REF;

pub const FEATURE_RCSE_CHAT: &str = "urn%3Aurn-7%3A3gpp-application.ims.iari.rcse.im";
pub const FEATURE_RCSE_FT: &str = "urn%3Aurn-7%3A3gpp-application.ims.iari.rcse.ft";
pub const FEATURE_RCSE_FT_HTTP: &str = "urn%3Aurn-7%3A3gpp-application.ims.iari.rcs.fthttp";
pub const FEATURE_RCSE_PRESENCE_DISCOVERY: &str = "urn%3Aurn-7%3A3gpp-application.ims.iari.rcse.dp";
pub const FEATURE_RCSE_SOCIAL_PRESENCE: &str = "urn%3Aurn-7%3A3gpp-application.ims.iari.rcse.sp";
pub const FEATURE_RCSE_FT_THUMBNAIL: &str = "urn%3Aurn-7%3A3gpp-application.ims.iari.rcs.ftthumb";
pub const FEATURE_RCSE_FT_SF: &str = "urn%3Aurn-7%3A3gpp-application.ims.iari.rcs.ftstandfw";
pub const FEATURE_RCSE_GC_SF: &str =
    "urn%3Aurn-7%3A3gpp-application.ims.iari.rcs.fullsfgroupchat";

/// OMA SIMPLE IM. Asserts chat and MSRP file transfer together.
pub const FEATURE_OMA_IM: &str = "+g.oma.sip-im";

/// RFC 3840 automaton indicator.
pub const FEATURE_SIP_AUTOMATA: &str = "automata";

pub const FEATURE_IARI_EXTENSION_EXT: &str = "+g.3gpp.iari-ref.ext";
pub const FEATURE_IARI_EXTENSION_MNC: &str = "+g.3gpp.iari-ref.mnc";
pub const FEATURE_ICSI_EXTENSION_GSMA: &str = "+g.3gpp.icsi-ref.gsma";

/// One row of the inbound marker table.
#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    /// Substring looked for in each inbound tag.
    pub marker: &'static str,
    /// Features asserted when the marker is present. Empty for markers that
    /// are recognised but carry no feature flag.
    pub features: &'static [Feature],
}

/// Inbound marker table. Rows are independent; order carries no priority.
pub const INBOUND_RULES: &[MarkerRule] = &[
    MarkerRule {
        marker: FEATURE_RCSE_CHAT,
        features: &[Feature::ImSession],
    },
    MarkerRule {
        marker: FEATURE_RCSE_FT,
        features: &[Feature::FileTransferMsrp],
    },
    MarkerRule {
        marker: FEATURE_RCSE_FT_HTTP,
        features: &[Feature::FileTransferHttp],
    },
    MarkerRule {
        marker: FEATURE_OMA_IM,
        features: &[Feature::ImSession, Feature::FileTransferMsrp],
    },
    MarkerRule {
        marker: FEATURE_RCSE_PRESENCE_DISCOVERY,
        features: &[Feature::PresenceDiscovery],
    },
    MarkerRule {
        marker: FEATURE_RCSE_SOCIAL_PRESENCE,
        features: &[Feature::SocialPresence],
    },
    MarkerRule {
        marker: FEATURE_RCSE_FT_THUMBNAIL,
        features: &[Feature::FileTransferThumbnail],
    },
    MarkerRule {
        marker: FEATURE_RCSE_FT_SF,
        features: &[Feature::FileTransferStoreForward],
    },
    MarkerRule {
        marker: FEATURE_RCSE_GC_SF,
        features: &[Feature::GroupChatStoreForward],
    },
    // Extension namespaces are handled by the extension manager.
    MarkerRule {
        marker: FEATURE_IARI_EXTENSION_EXT,
        features: &[],
    },
    MarkerRule {
        marker: FEATURE_IARI_EXTENSION_MNC,
        features: &[],
    },
    MarkerRule {
        marker: FEATURE_ICSI_EXTENSION_GSMA,
        features: &[],
    },
    MarkerRule {
        marker: FEATURE_SIP_AUTOMATA,
        features: &[Feature::SipAutomata],
    },
];

/// Outbound IARI markers, in advertisement order.
pub const OUTBOUND_IARI: &[(Feature, &str)] = &[
    (Feature::ImSession, FEATURE_RCSE_CHAT),
    (Feature::FileTransferMsrp, FEATURE_RCSE_FT),
    (Feature::FileTransferHttp, FEATURE_RCSE_FT_HTTP),
    (Feature::PresenceDiscovery, FEATURE_RCSE_PRESENCE_DISCOVERY),
    (Feature::SocialPresence, FEATURE_RCSE_SOCIAL_PRESENCE),
    (Feature::FileTransferThumbnail, FEATURE_RCSE_FT_THUMBNAIL),
    (Feature::FileTransferStoreForward, FEATURE_RCSE_FT_SF),
    (Feature::GroupChatStoreForward, FEATURE_RCSE_GC_SF),
];

/// Outbound ICSI markers. None of the current features is an ICSI service.
pub const OUTBOUND_ICSI: &[(Feature, &str)] = &[];

/// Wrap markers into a single composite tag: `prefix="m1,m2"`.
pub fn composite_tag(prefix: &str, markers: &[&str]) -> String {
    format!("{}=\"{}\"", prefix, markers.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_do_not_overlap() {
        for a in INBOUND_RULES {
            for b in INBOUND_RULES {
                if a.marker != b.marker {
                    assert!(
                        !b.marker.contains(a.marker),
                        "{} is a substring of {}",
                        a.marker,
                        b.marker
                    );
                }
            }
        }
    }

    #[test]
    fn test_outbound_markers_are_decodable() {
        for (feature, marker) in OUTBOUND_IARI {
            let rule = INBOUND_RULES
                .iter()
                .find(|r| r.marker == *marker)
                .expect("outbound marker missing from inbound table");
            assert_eq!(rule.features, &[*feature]);
        }
    }

    #[test]
    fn test_composite_tag() {
        assert_eq!(
            composite_tag(FEATURE_IARI_REF, &["a", "b"]),
            "+g.3gpp.iari-ref=\"a,b\""
        );
    }
}
