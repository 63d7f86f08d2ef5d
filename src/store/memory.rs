use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::codec::HelmRelease;
use super::{ReleaseStore, narrow_to_mask};
use crate::error::StoreError;
use crate::model::{NamespaceScope, ReleaseRecord, StatusMask};
use crate::selector::LabelSelector;

pub const FIXTURE_ENV: &str = "HELM_MEMORY_DRIVER_DATA";
const FIXTURE_NAMESPACE: &str = "default";

/// Release store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReleaseStore {
    records: Vec<ReleaseRecord>,
}

impl MemoryReleaseStore {
    pub fn new(records: Vec<ReleaseRecord>) -> Self {
        Self { records }
    }

    /// Seeds the store from the comma-separated fixture list in
    /// `HELM_MEMORY_DRIVER_DATA`; unset means an empty store.
    pub fn from_env() -> Result<Self> {
        let Ok(paths) = std::env::var(FIXTURE_ENV) else {
            return Ok(Self::default());
        };

        let mut records = Vec::new();
        for path in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            records.extend(load_fixture(Path::new(path))?);
        }
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl ReleaseStore for MemoryReleaseStore {
    async fn list(
        &self,
        scope: &NamespaceScope,
        mask: StatusMask,
        selector: Option<&str>,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        let selector = LabelSelector::parse(selector.unwrap_or_default())?;

        let candidates = self
            .records
            .iter()
            .filter(|record| match scope {
                NamespaceScope::All => true,
                NamespaceScope::Named(namespace) => &record.namespace == namespace,
            })
            .filter(|record| selector.matches(&record.labels))
            .cloned()
            .collect::<Vec<_>>();

        Ok(narrow_to_mask(candidates, mask))
    }
}

fn load_fixture(path: &Path) -> Result<Vec<ReleaseRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read release fixture {}", path.display()))?;
    parse_fixture(&raw).with_context(|| format!("failed to parse release fixture {}", path.display()))
}

/// Each YAML document is either one release or a sequence of releases. JSON
/// input parses the same way.
fn parse_fixture(raw: &str) -> Result<Vec<ReleaseRecord>> {
    let mut records = Vec::new();
    for document in serde_yaml::Deserializer::from_str(raw) {
        let value = serde_yaml::Value::deserialize(document)?;
        let releases: Vec<HelmRelease> = match value {
            serde_yaml::Value::Null => continue,
            serde_yaml::Value::Sequence(_) => serde_yaml::from_value(value)?,
            other => vec![serde_yaml::from_value(other)?],
        };
        records.extend(
            releases
                .into_iter()
                .map(|release| release.into_record(FIXTURE_NAMESPACE)),
        );
    }
    Ok(records)
}
