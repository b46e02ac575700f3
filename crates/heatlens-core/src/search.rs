//! Session search specification and its selection-time normalization.

use serde::{Deserialize, Serialize};

pub const PLATFORM_DESKTOP: &str = "desktop";
pub const PLATFORM_MOBILE: &str = "mobile";
pub const PLATFORM_TABLET: &str = "tablet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Platform,
    EventsCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Is,
    IsAny,
    Greater,
}

/// One session-level filter: `kind operator values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    #[serde(rename = "type")]
    pub kind: FilterType,
    pub values: Vec<String>,
    pub operator: FilterOperator,
}

impl SessionFilter {
    pub fn platform(values: &[&str]) -> Self {
        Self {
            kind: FilterType::Platform,
            values: values.iter().map(|v| v.to_string()).collect(),
            operator: FilterOperator::Is,
        }
    }

    pub fn events_count_greater(threshold: i64) -> Self {
        Self {
            kind: FilterType::EventsCount,
            values: vec![threshold.to_string()],
            operator: FilterOperator::Greater,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionType {
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionOperator {
    Is,
    IsAny,
    Contains,
    StartsWith,
    EndsWith,
}

/// One event-level criterion the matching sessions must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCriterion {
    #[serde(rename = "type")]
    pub kind: CriterionType,
    pub values: Vec<String>,
    pub operator: CriterionOperator,
}

impl EventCriterion {
    pub fn location_any() -> Self {
        Self {
            kind: CriterionType::Location,
            values: vec![],
            operator: CriterionOperator::IsAny,
        }
    }

    pub fn location_is(values: &[&str]) -> Self {
        Self {
            kind: CriterionType::Location,
            values: values.iter().map(|v| v.to_string()).collect(),
            operator: CriterionOperator::Is,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    StartTs,
    Duration,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::StartTs => "start_ts",
            SortField::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Caller-supplied filter/event criteria for a session search.
///
/// A value object: selection-time additions are made on a copy (see
/// [`SearchSpec::normalized_for_selection`]), never on the caller's spec,
/// so concurrent selection runs share nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Epoch milliseconds, inclusive.
    pub start_ts: i64,
    /// Epoch milliseconds, inclusive.
    pub end_ts: i64,
    #[serde(default)]
    pub filters: Vec<SessionFilter>,
    #[serde(default)]
    pub events: Vec<EventCriterion>,
    /// Restrict to sessions the requesting user bookmarked.
    #[serde(default)]
    pub bookmarked: bool,
    pub sort: SortField,
    pub order: SortOrder,
}

impl SearchSpec {
    pub fn new(start_ts: i64, end_ts: i64) -> Self {
        Self {
            start_ts,
            end_ts,
            filters: vec![],
            events: vec![],
            bookmarked: false,
            sort: SortField::StartTs,
            order: SortOrder::Desc,
        }
    }

    pub fn has_platform_filter(&self) -> bool {
        self.filters.iter().any(|f| f.kind == FilterType::Platform)
    }

    /// Copy-on-extend normalization applied once per selection call:
    ///
    /// 1. inject `platform = desktop` when no platform filter is present;
    /// 2. inject a match-any location criterion when none is present; when
    ///    the first one present has an empty value set, force its operator
    ///    to match-any instead of removing it;
    /// 3. always append `events_count > 0` (zero-event sessions cannot
    ///    have replay value);
    /// 4. force sort to duration descending, biasing toward longer
    ///    sessions.
    ///
    /// Calling this twice duplicates the injected `events_count` filter;
    /// the selector normalizes exactly once and reuses the result across
    /// retries.
    pub fn normalized_for_selection(&self) -> SearchSpec {
        let mut spec = self.clone();

        if !spec.has_platform_filter() {
            spec.filters.push(SessionFilter::platform(&[PLATFORM_DESKTOP]));
        }

        match spec
            .events
            .iter_mut()
            .find(|e| e.kind == CriterionType::Location)
        {
            Some(location) => {
                if location.values.is_empty() {
                    location.operator = CriterionOperator::IsAny;
                }
            }
            None => spec.events.push(EventCriterion::location_any()),
        }

        spec.filters.push(SessionFilter::events_count_greater(0));

        spec.sort = SortField::Duration;
        spec.order = SortOrder::Desc;
        spec
    }
}
