use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::ops::{BitOr, BitOrAssign};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum ReleaseStatus {
    #[default]
    Unknown,
    Deployed,
    Uninstalled,
    Superseded,
    Failed,
    Uninstalling,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
}

impl ReleaseStatus {
    pub const ALL: [Self; 9] = [
        Self::Unknown,
        Self::Deployed,
        Self::Uninstalled,
        Self::Superseded,
        Self::Failed,
        Self::Uninstalling,
        Self::PendingInstall,
        Self::PendingUpgrade,
        Self::PendingRollback,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Deployed => "deployed",
            Self::Uninstalled => "uninstalled",
            Self::Superseded => "superseded",
            Self::Failed => "failed",
            Self::Uninstalling => "uninstalling",
            Self::PendingInstall => "pending-install",
            Self::PendingUpgrade => "pending-upgrade",
            Self::PendingRollback => "pending-rollback",
        }
    }

    /// Parses the status label stored in a release payload. Anything outside the
    /// closed set maps to `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "deployed" => Self::Deployed,
            "uninstalled" => Self::Uninstalled,
            "superseded" => Self::Superseded,
            "failed" => Self::Failed,
            "uninstalling" => Self::Uninstalling,
            "pending-install" => Self::PendingInstall,
            "pending-upgrade" => Self::PendingUpgrade,
            "pending-rollback" => Self::PendingRollback,
            _ => Self::Unknown,
        }
    }

    fn bit(self) -> u16 {
        match self {
            Self::Unknown => 1,
            Self::Deployed => 1 << 1,
            Self::Uninstalled => 1 << 2,
            Self::Superseded => 1 << 3,
            Self::Failed => 1 << 4,
            Self::Uninstalling => 1 << 5,
            Self::PendingInstall => 1 << 6,
            Self::PendingUpgrade => 1 << 7,
            Self::PendingRollback => 1 << 8,
        }
    }
}

impl Display for ReleaseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of lifecycle states eligible for a listing, one bit per state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct StatusMask(u16);

impl StatusMask {
    pub const EMPTY: Self = Self(0);
    pub const DEFAULT: Self = Self((1 << 1) | (1 << 4));
    pub const ALL: Self = Self(0b1_1111_1111);
    pub const PENDING: Self = Self((1 << 6) | (1 << 7) | (1 << 8));

    pub fn of(status: ReleaseStatus) -> Self {
        Self(status.bit())
    }

    pub fn contains(self, status: ReleaseStatus) -> bool {
        self.0 & status.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn states(self) -> impl Iterator<Item = ReleaseStatus> {
        ReleaseStatus::ALL
            .into_iter()
            .filter(move |status| self.contains(*status))
    }
}

impl BitOr for StatusMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<ReleaseStatus> for StatusMask {
    type Output = Self;

    fn bitor(self, rhs: ReleaseStatus) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOrAssign<ReleaseStatus> for StatusMask {
    fn bitor_assign(&mut self, rhs: ReleaseStatus) {
        self.0 |= rhs.bit();
    }
}

impl Display for StatusMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let labels = self.states().map(ReleaseStatus::label).collect::<Vec<_>>();
        write!(f, "{}", labels.join("|"))
    }
}

/// Independent status switches as they arrive from the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct StatusToggles {
    pub all: bool,
    pub deployed: bool,
    pub failed: bool,
    pub pending: bool,
    pub uninstalled: bool,
    pub uninstalling: bool,
    pub superseded: bool,
}

impl StatusToggles {
    pub fn mask(&self) -> StatusMask {
        if self.all {
            return StatusMask::ALL;
        }

        let mut mask = StatusMask::EMPTY;
        if self.deployed {
            mask |= ReleaseStatus::Deployed;
        }
        if self.failed {
            mask |= ReleaseStatus::Failed;
        }
        if self.pending {
            mask = mask | StatusMask::PENDING;
        }
        if self.uninstalled {
            mask |= ReleaseStatus::Uninstalled;
        }
        if self.uninstalling {
            mask |= ReleaseStatus::Uninstalling;
        }
        if self.superseded {
            mask |= ReleaseStatus::Superseded;
        }

        if mask.is_empty() {
            StatusMask::DEFAULT
        } else {
            mask
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NamespaceScope {
    All,
    Named(String),
}

impl NamespaceScope {
    pub fn label(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Named(namespace) => namespace.clone(),
        }
    }
}

impl Display for NamespaceScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Named(namespace) => write!(f, "{namespace}"),
        }
    }
}

/// A release as handed back by a store.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReleaseRecord {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub status: ReleaseStatus,
    pub last_deployed: Option<DateTime<FixedOffset>>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Everything one listing needs, fixed before the store is contacted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct QuerySpec {
    pub scope: NamespaceScope,
    pub mask: StatusMask,
    pub selector: Option<String>,
    pub filter: Option<String>,
    pub sort_key: SortKey,
    pub direction: SortDirection,
    pub offset: usize,
    pub limit: usize,
    pub time_format: Option<String>,
}

impl QuerySpec {
    pub const DEFAULT_LIMIT: usize = 256;

    pub fn new(scope: NamespaceScope) -> Self {
        Self {
            scope,
            mask: StatusMask::DEFAULT,
            selector: None,
            filter: None,
            sort_key: SortKey::Name,
            direction: SortDirection::Ascending,
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
            time_format: None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ViewRecord {
    pub name: String,
    pub namespace: String,
    pub updated: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::{ReleaseStatus, StatusMask, StatusToggles};

    fn toggles_from_bits(bits: u8) -> StatusToggles {
        StatusToggles {
            all: bits & 1 != 0,
            deployed: bits & (1 << 1) != 0,
            failed: bits & (1 << 2) != 0,
            pending: bits & (1 << 3) != 0,
            uninstalled: bits & (1 << 4) != 0,
            uninstalling: bits & (1 << 5) != 0,
            superseded: bits & (1 << 6) != 0,
        }
    }

    #[test]
    fn mask_is_never_empty_and_defaults_only_without_toggles() {
        for bits in 0u8..128 {
            let mask = toggles_from_bits(bits).mask();
            assert!(!mask.is_empty(), "empty mask for toggles {bits:#09b}");
            if bits == 0 {
                assert_eq!(mask, StatusMask::DEFAULT);
            } else if bits & 1 == 0 && bits != 0b000_0110 {
                // deployed+failed spelled out explicitly is the one other way to get it
                assert_ne!(
                    mask,
                    StatusMask::DEFAULT,
                    "toggles {bits:#09b} collapsed to the default"
                );
            }
        }
    }

    #[test]
    fn deployed_and_failed_together_equal_the_default_set() {
        let toggles = StatusToggles {
            deployed: true,
            failed: true,
            ..StatusToggles::default()
        };
        assert_eq!(toggles.mask(), StatusMask::DEFAULT);
    }

    #[test]
    fn all_overrides_every_other_toggle() {
        let toggles = StatusToggles {
            all: true,
            superseded: true,
            ..StatusToggles::default()
        };
        let mask = toggles.mask();
        assert_eq!(mask, StatusMask::ALL);
        for status in ReleaseStatus::ALL {
            assert!(mask.contains(status), "{status} missing from full mask");
        }
    }

    #[test]
    fn pending_covers_every_pending_state() {
        let mask = StatusToggles {
            pending: true,
            ..StatusToggles::default()
        }
        .mask();
        assert!(mask.contains(ReleaseStatus::PendingInstall));
        assert!(mask.contains(ReleaseStatus::PendingUpgrade));
        assert!(mask.contains(ReleaseStatus::PendingRollback));
        assert!(!mask.contains(ReleaseStatus::Deployed));
    }

    #[test]
    fn status_tokens_round_through_labels() {
        for status in ReleaseStatus::ALL {
            assert_eq!(ReleaseStatus::from_token(status.label()), status);
        }
        assert_eq!(ReleaseStatus::from_token("bogus"), ReleaseStatus::Unknown);
        assert_eq!(
            StatusMask::DEFAULT.to_string(),
            "deployed|failed".to_string()
        );
    }
}
