//src/history.rs
//! Pure filter / group / reduce pipeline over a list of exercise records.
//!
//! Nothing here performs I/O or fails: missing numbers count as zero,
//! missing categories fall back to `Other` / `General`, and records whose
//! date cannot be read are still kept and grouped under `-`.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::criteria::{FilterCriteria, ALL};
use crate::record::ExerciseRecord;

pub const DEFAULT_WORKOUT_TYPE: &str = "Other";
pub const DEFAULT_MUSCLE_GROUP: &str = "General";
pub const UNKNOWN_DATE: &str = "-";

/// Bucket key for the history list: (day, workout type, muscle group).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub date: Option<NaiveDate>,
    pub workout_type: String,
    pub muscle_group: String,
}

impl GroupKey {
    #[must_use]
    pub fn for_record(record: &ExerciseRecord) -> Self {
        Self {
            date: record.date(),
            workout_type: category_or(record.workout_type.as_deref(), DEFAULT_WORKOUT_TYPE),
            muscle_group: category_or(record.muscle_group.as_deref(), DEFAULT_MUSCLE_GROUP),
        }
    }

    /// Long-form date, e.g. `January 5, 2024`, or `-` when unknown.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.date.map_or_else(
            || UNKNOWN_DATE.to_string(),
            |d| d.format("%B %-d, %Y").to_string(),
        )
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.date_label(),
            self.workout_type,
            self.muscle_group
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup<'a> {
    pub key: GroupKey,
    pub records: Vec<&'a ExerciseRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub total_workouts: usize,
    pub total_sets: i64,
    pub total_reps: i64,
    pub total_volume: f64,
}

/// Selector options, each list starting with `"all"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facets {
    pub workout_types: Vec<String>,
    pub muscle_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary<'a> {
    pub filtered: Vec<&'a ExerciseRecord>,
    pub groups: Vec<RecordGroup<'a>>,
    pub totals: Totals,
}

/// Records satisfying every active criterion, in input order.
#[must_use]
pub fn filter<'a>(records: &'a [ExerciseRecord], criteria: &FilterCriteria) -> Vec<&'a ExerciseRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

/// Partitions records into buckets, ordered by first appearance of each key.
#[must_use]
pub fn group<'a>(filtered: &[&'a ExerciseRecord]) -> Vec<RecordGroup<'a>> {
    let mut groups: Vec<RecordGroup<'a>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for &record in filtered {
        let key = GroupKey::for_record(record);
        match index.get(&key) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(RecordGroup {
                    key,
                    records: vec![record],
                });
            }
        }
    }
    groups
}

#[must_use]
pub fn aggregate(filtered: &[&ExerciseRecord]) -> Totals {
    filtered.iter().fold(Totals::default(), |mut acc, r| {
        acc.total_workouts += 1;
        acc.total_sets = acc.total_sets.saturating_add(r.sets_or_zero());
        acc.total_reps = acc.total_reps.saturating_add(r.total_reps());
        acc.total_volume += r.volume();
        acc
    })
}

/// Distinct non-empty workout types and muscle groups across `records`.
#[must_use]
pub fn derive_facets(records: &[ExerciseRecord]) -> Facets {
    Facets {
        workout_types: distinct_with_sentinel(records.iter().map(|r| r.workout_type.as_deref())),
        muscle_groups: distinct_with_sentinel(records.iter().map(|r| r.muscle_group.as_deref())),
    }
}

/// Runs filter, group and aggregate in one go.
#[must_use]
pub fn summarize<'a>(records: &'a [ExerciseRecord], criteria: &FilterCriteria) -> HistorySummary<'a> {
    let filtered = filter(records, criteria);
    let groups = group(&filtered);
    let totals = aggregate(&filtered);
    HistorySummary {
        filtered,
        groups,
        totals,
    }
}

// --- Analytics breakdowns ---

/// Volume per calendar day, ascending. Undated records are left out.
#[must_use]
pub fn daily_volume(filtered: &[&ExerciseRecord]) -> Vec<(NaiveDate, f64)> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in filtered {
        if let Some(date) = r.date() {
            *per_day.entry(date).or_insert(0.0) += r.volume();
        }
    }
    per_day.into_iter().collect()
}

/// Entry counts per muscle group, most frequent first.
#[must_use]
pub fn muscle_distribution(filtered: &[&ExerciseRecord]) -> Vec<(String, usize)> {
    count_by(filtered, |r| {
        category_or(r.muscle_group.as_deref(), DEFAULT_MUSCLE_GROUP)
    })
}

/// Entry counts per workout type, most frequent first.
#[must_use]
pub fn type_breakdown(filtered: &[&ExerciseRecord]) -> Vec<(String, usize)> {
    count_by(filtered, |r| {
        category_or(r.workout_type.as_deref(), DEFAULT_WORKOUT_TYPE)
    })
}

fn count_by<F>(filtered: &[&ExerciseRecord], key_fn: F) -> Vec<(String, usize)>
where
    F: Fn(&ExerciseRecord) -> String,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for r in filtered {
        let key = key_fn(*r);
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    // stable: ties keep first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn category_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn distinct_with_sentinel<'a, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = vec![ALL.to_string()];
    for v in values.flatten() {
        if !v.is_empty() && seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}
