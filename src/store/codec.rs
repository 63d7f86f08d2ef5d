use crate::error::CodecError;
use crate::model::{ReleaseRecord, ReleaseStatus};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Datelike, FixedOffset};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// The subset of Helm's release document that listing needs.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HelmRelease {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub info: HelmReleaseInfo,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HelmReleaseInfo {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_deployed: Option<String>,
}

impl HelmRelease {
    pub fn into_record(self, fallback_namespace: &str) -> ReleaseRecord {
        let namespace = if self.namespace.trim().is_empty() {
            fallback_namespace.to_string()
        } else {
            self.namespace
        };

        ReleaseRecord {
            last_deployed: self
                .info
                .last_deployed
                .as_deref()
                .and_then(parse_timestamp),
            status: ReleaseStatus::from_token(&self.info.status),
            name: self.name,
            namespace,
            revision: self.version,
            labels: self.labels,
        }
    }
}

/// Decodes the `release` value Helm keeps in its storage objects: base64 text
/// wrapping either gzip-compressed or plain JSON.
pub fn decode_payload(encoded: &[u8], fallback_namespace: &str) -> Result<ReleaseRecord, CodecError> {
    let text = String::from_utf8_lossy(encoded);
    let raw = STANDARD.decode(text.trim())?;

    let json = if raw.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::with_capacity(raw.len() * 4);
        GzDecoder::new(raw.as_slice()).read_to_end(&mut inflated)?;
        inflated
    } else {
        raw
    };

    let release: HelmRelease = serde_json::from_slice(&json)?;
    Ok(release.into_record(fallback_namespace))
}

/// RFC 3339 timestamp as written by Helm. The Go zero time means the release was
/// never deployed.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) if parsed.year() <= 1 => None,
        Ok(parsed) => Some(parsed),
        Err(error) => {
            debug!(%error, value = raw, "ignoring unparseable last_deployed timestamp");
            None
        }
    }
}
