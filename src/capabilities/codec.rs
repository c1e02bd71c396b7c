//! Feature tag codec.
//!
//! - [`decode`] turns the feature tags of an inbound message into a
//!   [`CapabilityRecord`].
//! - [`encode`] turns local settings into the tags advertised to peers.
//! - [`extract_service_id`] pulls the service identifier out of an extension
//!   tag.
//!
//! Decoding is lenient: tags are matched by substring, unknown tags are
//! skipped and nothing in a tag can make decoding fail.

use chrono::{DateTime, Utc};

use super::capability::{CapabilityRecord, CapabilityRecordBuilder};
use super::feature_tags::{
    composite_tag, FEATURE_IARI_REF, FEATURE_ICSI_REF, FEATURE_SIP_AUTOMATA,
    IARI_EXTENSION_PREFIX, ICSI_EXTENSION_PREFIX, INBOUND_RULES, OUTBOUND_IARI, OUTBOUND_ICSI,
};
use crate::settings::FeatureSettings;
use crate::utilities::errors::TagError;

/// Decode inbound feature tags, stamping both timestamps with the current time.
pub fn decode<I>(tags: I) -> CapabilityRecord
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    decode_at(tags, Utc::now())
}

/// Decode inbound feature tags, stamping both timestamps with `now`.
///
/// A response is also proof that the request went through, so the request
/// timestamp is set as well.
pub fn decode_at<I>(tags: I, now: DateTime<Utc>) -> CapabilityRecord
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut builder = CapabilityRecordBuilder::new();
    for tag in tags {
        apply_tag(&mut builder, tag.as_ref());
    }
    builder
        .set_last_request_time(Some(now))
        .set_last_response_time(Some(now));
    let caps = builder.build();
    log::debug!("Decoded capabilities {}", caps);
    caps
}

fn apply_tag(builder: &mut CapabilityRecordBuilder, tag: &str) {
    let mut matched = false;
    for rule in INBOUND_RULES.iter().filter(|r| tag.contains(r.marker)) {
        matched = true;
        log::trace!("Tag {:?} matches {}", tag, rule.marker);
        for feature in rule.features {
            builder.set(*feature, true);
        }
    }
    if !matched {
        log::trace!("Ignoring unknown feature tag {:?}", tag);
    }
}

/// Build the feature tags advertising local support.
///
/// Order is stable: the automata tag first, then the IARI composite, then the
/// ICSI composite. Composites are omitted when empty.
pub fn encode<S>(settings: &S) -> Vec<String>
where
    S: FeatureSettings + ?Sized,
{
    let mut tags = Vec::new();

    if settings.is_sip_automata() {
        tags.push(FEATURE_SIP_AUTOMATA.to_string());
    }

    let iari: Vec<&str> = OUTBOUND_IARI
        .iter()
        .filter(|(feature, _)| settings.is_supported(*feature))
        .map(|(_, marker)| *marker)
        .collect();
    if !iari.is_empty() {
        tags.push(composite_tag(FEATURE_IARI_REF, &iari));
    }

    let icsi: Vec<&str> = OUTBOUND_ICSI
        .iter()
        .filter(|(feature, _)| settings.is_supported(*feature))
        .map(|(_, marker)| *marker)
        .collect();
    if !icsi.is_empty() {
        tags.push(composite_tag(FEATURE_ICSI_REF, &icsi));
    }

    log::debug!("Supported feature tags {:?}", tags);
    tags
}

/// Extract the service identifier from an extension feature tag.
///
/// `+g.3gpp.iari-ref="+g.3gpp.iari-ref.myext"` yields `myext`.
pub fn extract_service_id(tag: &str) -> Result<String, TagError> {
    let malformed = |reason| TagError::Malformed {
        tag: tag.to_string(),
        reason,
    };

    let (_, raw_value) = tag.split_once('=').ok_or_else(|| malformed("missing '='"))?;
    let value = raw_value.trim().trim_matches('"');

    let prefix = if tag.contains(IARI_EXTENSION_PREFIX) {
        IARI_EXTENSION_PREFIX
    } else if tag.contains(ICSI_EXTENSION_PREFIX) {
        ICSI_EXTENSION_PREFIX
    } else {
        return Err(malformed("no extension namespace"));
    };

    let start = value
        .find(prefix)
        .ok_or_else(|| malformed("extension namespace not in value"))?;
    // Skip the namespace and its delimiter character.
    let rest = &value[start + prefix.len()..];
    let mut chars = rest.chars();
    chars
        .next()
        .ok_or_else(|| malformed("empty service identifier"))?;
    let service_id = chars.as_str();
    if service_id.is_empty() {
        return Err(malformed("empty service identifier"));
    }
    Ok(service_id.to_string())
}
