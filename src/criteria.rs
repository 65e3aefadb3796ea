//src/criteria.rs
use chrono::{Duration, NaiveDate};
use std::fmt;

use crate::record::ExerciseRecord;

/// Selector value meaning "do not filter on this dimension".
pub const ALL: &str = "all";

/// A category selector: either everything, or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selector {
    #[default]
    All,
    Exact(String),
}

impl Selector {
    /// `"all"` (any case) and empty input select everything.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Exact(trimmed.to_string())
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Exact(_))
    }

    /// Exact, case-sensitive comparison. A missing value never matches an active selector.
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Exact(wanted) => value == Some(wanted.as_str()),
        }
    }
}

impl From<Option<String>> for Selector {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::All, |v| Self::parse(&v))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{ALL}"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Inclusive calendar-day range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// `[today - days, today]`. The lower bound is left open when it would
    /// fall before the earliest representable date.
    #[must_use]
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        Self {
            from: today.checked_sub_signed(Duration::days(i64::from(days))),
            to: Some(today),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Records without a usable date are never excluded by the range.
    #[must_use]
    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return true;
        };
        if self.from.map_or(false, |from| date < from) {
            return false;
        }
        if self.to.map_or(false, |to| date > to) {
            return false;
        }
        true
    }
}

/// The user's current filter selection over the history list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub search: String,
    pub workout_type: Selector,
    pub muscle_group: Selector,
    pub date_range: DateRange,
}

impl FilterCriteria {
    /// Criteria that let every record through.
    #[must_use]
    pub fn inactive() -> Self {
        Self::default()
    }

    /// The reset state: no search, all types, all muscles, the last `range_days` days.
    /// `today` is passed in so callers control the clock.
    #[must_use]
    pub fn defaults(today: NaiveDate, range_days: u32) -> Self {
        Self {
            date_range: DateRange::last_days(today, range_days),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_inactive(&self) -> bool {
        self.search.is_empty()
            && !self.workout_type.is_active()
            && !self.muscle_group.is_active()
            && !self.date_range.is_active()
    }

    /// True when anything differs from `defaults(today, range_days)`.
    #[must_use]
    pub fn has_filters(&self, today: NaiveDate, range_days: u32) -> bool {
        *self != Self::defaults(today, range_days)
    }

    /// AND across every active dimension.
    #[must_use]
    pub fn matches(&self, record: &ExerciseRecord) -> bool {
        if !self.date_range.admits(record.date()) {
            return false;
        }
        if !self.workout_type.matches(record.workout_type.as_deref()) {
            return false;
        }
        if !self.muscle_group.matches(record.muscle_group.as_deref()) {
            return false;
        }
        self.matches_search(record)
    }

    fn matches_search(&self, record: &ExerciseRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&needle);

        hit(&record.exercise_name)
            || record.notes.as_deref().map_or(false, hit)
            || record.additional_exercises.iter().any(|name| hit(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(name: &str, exercise_date: Option<&str>) -> ExerciseRecord {
        ExerciseRecord {
            id: name.to_string(),
            exercise_name: name.to_string(),
            exercise_date: exercise_date.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn selector_parse() {
        assert_eq!(Selector::parse("all"), Selector::All);
        assert_eq!(Selector::parse("ALL"), Selector::All);
        assert_eq!(Selector::parse(""), Selector::All);
        assert_eq!(Selector::parse("Push"), Selector::Exact("Push".into()));
        assert!(!Selector::Exact("Push".into()).matches(None));
        assert!(!Selector::Exact("Push".into()).matches(Some("push")));
        assert!(Selector::All.matches(None));
    }

    #[test]
    fn default_range_is_last_thirty_days() {
        let today = date(2024, 3, 31);
        let criteria = FilterCriteria::defaults(today, 30);
        assert_eq!(criteria.date_range.from, Some(date(2024, 3, 1)));
        assert_eq!(criteria.date_range.to, Some(today));
        assert!(!criteria.has_filters(today, 30));
        assert!(!criteria.is_inactive());

        let searched = FilterCriteria {
            search: "row".into(),
            ..criteria
        };
        assert!(searched.has_filters(today, 30));
    }

    #[test]
    fn oversized_window_leaves_lower_bound_open() {
        let today = date(2024, 1, 1);
        let criteria = FilterCriteria::defaults(today, 100_000_000);
        assert_eq!(criteria.date_range.from, None);
        assert_eq!(criteria.date_range.to, Some(today));
        assert!(criteria.matches(&record("Ancient", Some("0001-01-01"))));
        assert!(!criteria.matches(&record("Future", Some("2024-01-02"))));

        let widest = DateRange::last_days(today, u32::MAX);
        assert_eq!(widest.from, None);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = DateRange {
            from: Some(date(2024, 1, 5)),
            to: Some(date(2024, 1, 6)),
        };
        assert!(range.admits(Some(date(2024, 1, 5))));
        assert!(range.admits(Some(date(2024, 1, 6))));
        assert!(!range.admits(Some(date(2024, 1, 4))));
        assert!(!range.admits(Some(date(2024, 1, 7))));
        assert!(range.admits(None));
    }

    #[test]
    fn unparseable_date_bypasses_range() {
        let criteria = FilterCriteria {
            date_range: DateRange {
                from: Some(date(2030, 1, 1)),
                to: None,
            },
            ..Default::default()
        };
        assert!(criteria.matches(&record("Row", Some("yesterday-ish"))));
        assert!(criteria.matches(&record("Row", None)));
        assert!(!criteria.matches(&record("Row", Some("2024-01-01"))));
    }

    #[test]
    fn search_covers_notes_and_additional_exercises() {
        let mut r = record("Curl", None);
        r.notes = Some("Felt STRONG".into());
        r.additional_exercises = vec!["Skull Crusher".into()];

        let search = |s: &str| FilterCriteria {
            search: s.into(),
            ..Default::default()
        };
        assert!(search("curl").matches(&r));
        assert!(search("strong").matches(&r));
        assert!(search("skull").matches(&r));
        assert!(!search("squat").matches(&r));
    }
}
