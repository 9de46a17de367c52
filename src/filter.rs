//! Listing filters.
//!
//! A listing request may carry a substring `search` and a JSON [`FilterSpec`]
//! with type, date and size constraints. When either is present the listing
//! becomes recursive and every reported entry must satisfy all of them.
//! Hidden entries (names starting with `.`) are never reported.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::drive::{Exclude, FileEntry, ListConfig};
use crate::{FileBayError, Result};

/// Half-open date interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Returns true if `epoch_secs` lies in the interval.
    pub fn contains(&self, epoch_secs: i64) -> bool {
        match DateTime::<Utc>::from_timestamp(epoch_secs, 0) {
            Some(date) => self.start <= date && date < self.end,
            None => false,
        }
    }
}

/// Inclusive byte range; `end == 0` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SizeRange {
    /// Inclusive lower bound.
    #[serde(default)]
    pub start: u64,
    /// Inclusive upper bound, or 0.
    #[serde(default)]
    pub end: u64,
}

impl SizeRange {
    /// Returns true if `size` lies in the range.
    pub fn contains(&self, size: u64) -> bool {
        self.start <= size && (self.end == 0 || size <= self.end)
    }
}

/// Structured listing constraints. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Accepted category tags.
    pub types: Option<Vec<String>>,
    /// Accepted modification dates.
    pub date: Option<DateRange>,
    /// Accepted sizes; an entry matches if any range contains it.
    pub size: Option<Vec<SizeRange>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilter {
    #[serde(rename = "type")]
    types: Option<Vec<String>>,
    date: Option<RawDateRange>,
    size: Option<Vec<SizeRange>>,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: String,
    end: String,
}

/// Parse a date bound: RFC 3339, an ISO date-time without offset (taken as
/// UTC), or `YYYY-MM-DD` meaning midnight UTC.
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(date.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .ok_or_else(|| FileBayError::Validation(format!("invalid filter date: {value:?}")))
}

impl FilterSpec {
    /// Parse the JSON form sent by the client.
    ///
    /// Malformed JSON, unknown fields and unparseable dates are validation
    /// errors; the filter is never silently dropped.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawFilter = serde_json::from_str(json)
            .map_err(|e| FileBayError::Validation(format!("invalid filter: {e}")))?;

        let date = match raw.date {
            Some(range) => Some(DateRange {
                start: parse_date(&range.start)?,
                end: parse_date(&range.end)?,
            }),
            None => None,
        };

        Ok(Self {
            types: raw.types,
            date,
            size: raw.size,
        })
    }

    /// Returns true if `entry` satisfies every present constraint.
    pub fn accepts(&self, entry: &FileEntry) -> bool {
        let type_ok = self
            .types
            .as_ref()
            .map_or(true, |types| types.iter().any(|t| *t == entry.kind));
        let date_ok = self
            .date
            .as_ref()
            .map_or(true, |range| range.contains(entry.date));
        let size_ok = self
            .size
            .as_ref()
            .map_or(true, |ranges| ranges.iter().any(|r| r.contains(entry.size)));

        type_ok && date_ok && size_ok
    }
}

/// Search text plus structured filter, evaluated as one output predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Substring the display name must contain (case-sensitive).
    pub search: Option<String>,
    /// Structured constraints.
    pub filter: Option<FilterSpec>,
}

impl Criteria {
    /// Build criteria, treating an empty search as absent.
    ///
    /// Returns `None` when there is nothing to filter on.
    pub fn new(search: Option<String>, filter: Option<FilterSpec>) -> Option<Self> {
        let search = search.filter(|s| !s.is_empty());
        if search.is_none() && filter.is_none() {
            None
        } else {
            Some(Self { search, filter })
        }
    }

    /// Returns true if `entry` satisfies the search and the filter.
    pub fn includes(&self, entry: &FileEntry) -> bool {
        matches(entry, self.search.as_deref(), self.filter.as_ref())
    }
}

/// Full listing predicate for a single entry.
pub fn matches(entry: &FileEntry, search: Option<&str>, filter: Option<&FilterSpec>) -> bool {
    if entry.value.starts_with('.') {
        return false;
    }
    let name_ok = search.map_or(true, |needle| entry.value.contains(needle));
    name_ok && filter.map_or(true, |f| f.accepts(entry))
}

/// Listing configuration for a `/files` request.
///
/// Without criteria only the direct children are listed; with criteria the
/// listing descends into every non-hidden sub folder.
pub fn list_config(criteria: Option<Criteria>) -> ListConfig {
    ListConfig {
        exclude: Exclude::Hidden,
        sub_folders: criteria.is_some(),
        include: criteria,
        skip_files: false,
    }
}

/// Listing configuration for the folder tree.
pub fn folder_tree_config() -> ListConfig {
    ListConfig {
        exclude: Exclude::Hidden,
        include: None,
        sub_folders: true,
        skip_files: true,
    }
}
