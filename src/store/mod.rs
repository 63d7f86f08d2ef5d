mod codec;
mod kubernetes;
mod memory;

pub use kubernetes::{KubeContext, KubeReleaseStore, StorageKind};
pub use memory::MemoryReleaseStore;

use crate::error::StoreError;
use crate::model::{NamespaceScope, ReleaseRecord, ReleaseStatus, StatusMask};
use clap::ValueEnum;
use serde::Deserialize;
use std::collections::HashMap;

/// Backend that can enumerate releases. Implementations honor the status mask
/// and the label selector; ordering of the result is unspecified.
pub trait ReleaseStore {
    async fn list(
        &self,
        scope: &NamespaceScope,
        mask: StatusMask,
        selector: Option<&str>,
    ) -> Result<Vec<ReleaseRecord>, StoreError>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Secret,
    #[value(alias = "configmaps")]
    #[serde(alias = "configmaps")]
    Configmap,
    Memory,
}

impl Driver {
    /// Parses the `HELM_DRIVER` convention; empty means the default.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "" | "secret" | "secrets" => Some(Self::Secret),
            "configmap" | "configmaps" => Some(Self::Configmap),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Driver picked at startup.
pub enum AnyStore {
    Kube(KubeReleaseStore),
    Memory(MemoryReleaseStore),
}

impl ReleaseStore for AnyStore {
    async fn list(
        &self,
        scope: &NamespaceScope,
        mask: StatusMask,
        selector: Option<&str>,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        match self {
            Self::Kube(store) => store.list(scope, mask, selector).await,
            Self::Memory(store) => store.list(scope, mask, selector).await,
        }
    }
}

/// Collapses history to the newest revision per release, then applies the
/// mask. A superseded-only mask keeps the history since superseded records are
/// never the newest.
pub(crate) fn narrow_to_mask(records: Vec<ReleaseRecord>, mask: StatusMask) -> Vec<ReleaseRecord> {
    let records = if mask == StatusMask::of(ReleaseStatus::Superseded) {
        records
    } else {
        latest_revisions(records)
    };

    records
        .into_iter()
        .filter(|record| mask.contains(record.status))
        .collect()
}

fn latest_revisions(records: Vec<ReleaseRecord>) -> Vec<ReleaseRecord> {
    let mut slots: HashMap<(String, String), usize> = HashMap::new();
    let mut latest: Vec<ReleaseRecord> = Vec::with_capacity(records.len());

    for record in records {
        let key = (record.namespace.clone(), record.name.clone());
        match slots.get(&key) {
            Some(&index) => {
                if record.revision > latest[index].revision {
                    latest[index] = record;
                }
            }
            None => {
                slots.insert(key, latest.len());
                latest.push(record);
            }
        }
    }

    latest
}

#[cfg(test)]
mod tests {
    use super::{Driver, narrow_to_mask};
    use crate::model::{ReleaseRecord, ReleaseStatus, StatusMask};
    use std::collections::BTreeMap;

    fn record(name: &str, namespace: &str, revision: u32, status: ReleaseStatus) -> ReleaseRecord {
        ReleaseRecord {
            name: name.to_string(),
            namespace: namespace.to_string(),
            revision,
            status,
            last_deployed: None,
            labels: BTreeMap::new(),
        }
    }

    fn history() -> Vec<ReleaseRecord> {
        vec![
            record("web", "shop", 1, ReleaseStatus::Superseded),
            record("web", "shop", 3, ReleaseStatus::Deployed),
            record("web", "shop", 2, ReleaseStatus::Superseded),
            record("web", "staging", 1, ReleaseStatus::Failed),
        ]
    }

    #[test]
    fn keeps_only_the_newest_revision_per_namespace_and_name() {
        let kept = narrow_to_mask(history(), StatusMask::ALL);
        let summary = kept
            .iter()
            .map(|r| (r.namespace.as_str(), r.revision))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![("shop", 3), ("staging", 1)]);
    }

    #[test]
    fn mask_applies_after_collapsing_history() {
        let kept = narrow_to_mask(history(), StatusMask::of(ReleaseStatus::Failed));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].namespace, "staging");
    }

    #[test]
    fn superseded_only_mask_keeps_history() {
        let kept = narrow_to_mask(history(), StatusMask::of(ReleaseStatus::Superseded));
        let revisions = kept.iter().map(|r| r.revision).collect::<Vec<_>>();
        assert_eq!(revisions, vec![1, 2]);
    }

    #[test]
    fn driver_tokens_follow_helm_naming() {
        assert_eq!(Driver::from_token(""), Some(Driver::Secret));
        assert_eq!(Driver::from_token("Secrets"), Some(Driver::Secret));
        assert_eq!(Driver::from_token("configmap"), Some(Driver::Configmap));
        assert_eq!(Driver::from_token("memory"), Some(Driver::Memory));
        assert_eq!(Driver::from_token("sql"), None);
    }
}
