use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::Write;
use tracing::debug;

use crate::error::ListError;
use crate::model::{QuerySpec, ReleaseRecord, SortDirection, SortKey, ViewRecord};
use crate::store::ReleaseStore;

/// RFC 822 with a numeric zone, e.g. `23 Aug 23 16:18 +0200`.
pub const DEFAULT_TIME_FORMAT: &str = "%d %b %y %H:%M %z";
pub const MISSING_TIMESTAMP: &str = "-";

/// Runs one listing end to end: query, name filter, sort, page, project.
///
/// The filter pattern is compiled before the store is contacted so a bad
/// pattern never costs a round trip.
pub async fn list_releases<S>(store: &S, spec: QuerySpec) -> Result<Vec<ViewRecord>, ListError>
where
    S: ReleaseStore,
{
    let filter = compile_filter(spec.filter.as_deref())?;

    debug!(scope = %spec.scope, mask = %spec.mask, selector = ?spec.selector, "querying release store");
    let candidates = store
        .list(&spec.scope, spec.mask, spec.selector.as_deref())
        .await?;
    debug!(candidates = candidates.len(), "release store answered");

    let mut releases = filter_names(candidates, filter.as_ref());
    sort_releases(&mut releases, spec.sort_key, spec.direction);
    let page = paginate(releases, spec.offset, spec.limit);
    debug!(rows = page.len(), offset = spec.offset, limit = spec.limit, "page selected");

    Ok(project(page, spec.time_format.as_deref()))
}

/// Empty or blank patterns disable filtering.
pub fn compile_filter(pattern: Option<&str>) -> Result<Option<Regex>, regex::Error> {
    match pattern {
        Some(pattern) if !pattern.is_empty() => Regex::new(pattern).map(Some),
        _ => Ok(None),
    }
}

pub fn filter_names(releases: Vec<ReleaseRecord>, filter: Option<&Regex>) -> Vec<ReleaseRecord> {
    let Some(filter) = filter else {
        return releases;
    };

    releases
        .into_iter()
        .filter(|release| filter.is_match(&release.name))
        .collect()
}

/// Stable sort; records with equal keys keep the order the store returned.
pub fn sort_releases(releases: &mut [ReleaseRecord], key: SortKey, direction: SortDirection) {
    let compare = |left: &ReleaseRecord, right: &ReleaseRecord| -> Ordering {
        match key {
            SortKey::Name => left.name.as_bytes().cmp(right.name.as_bytes()),
            // None < Some, so never-deployed releases come first
            SortKey::Date => left.last_deployed.cmp(&right.last_deployed),
        }
    };

    match direction {
        SortDirection::Ascending => releases.sort_by(compare),
        SortDirection::Descending => releases.sort_by(|left, right| compare(right, left)),
    }
}

/// A zero limit leaves the tail untouched.
pub fn paginate(releases: Vec<ReleaseRecord>, offset: usize, limit: usize) -> Vec<ReleaseRecord> {
    let window = releases.into_iter().skip(offset);
    if limit == 0 {
        window.collect()
    } else {
        window.take(limit).collect()
    }
}

pub fn project(releases: Vec<ReleaseRecord>, time_format: Option<&str>) -> Vec<ViewRecord> {
    let pattern = time_format.filter(|pattern| {
        let usable = is_usable_time_format(pattern);
        if !usable {
            debug!(pattern, "time format not understood, using default");
        }
        usable
    });

    releases
        .into_iter()
        .map(|release| ViewRecord {
            updated: release
                .last_deployed
                .map(|deployed| format_timestamp(&deployed, pattern))
                .unwrap_or_else(|| MISSING_TIMESTAMP.to_string()),
            status: release.status.label().to_string(),
            name: release.name,
            namespace: release.namespace,
        })
        .collect()
}

fn is_usable_time_format(pattern: &str) -> bool {
    !pattern.trim().is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

fn format_timestamp(deployed: &DateTime<FixedOffset>, pattern: Option<&str>) -> String {
    if let Some(pattern) = pattern {
        let mut out = String::new();
        if write!(out, "{}", deployed.format(pattern)).is_ok() {
            return out;
        }
    }
    deployed.format(DEFAULT_TIME_FORMAT).to_string()
}
