//src/record.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Set types whose additional exercise names are meaningful.
const COMPOUND_SET_TYPES: [&str; 2] = ["superset", "alternate"];

#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("Exercise name cannot be empty.")]
    EmptyName,
    #[error("Sets must be at least 1 (got {0}).")]
    InvalidSets(i64),
    #[error("Reps must be at least 1 (got {0}).")]
    InvalidReps(i64),
    #[error("Weight cannot be negative (got {0}).")]
    InvalidWeight(f64),
}

/// One logged exercise entry, shaped like the backend's `/api/exercises` payload.
///
/// Any field may be missing or malformed in data that came from elsewhere;
/// consumers substitute defaults instead of failing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ExerciseRecord {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sets: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reps: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub workout_type: Option<String>,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub exercise_date: Option<String>,
    #[serde(default)]
    pub set_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_names")]
    pub additional_exercises: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExerciseRecord {
    /// Calendar date of the entry, `None` when missing or unparseable.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.exercise_date.as_deref().and_then(parse_record_date)
    }

    /// Sets with a missing value counted as 0.
    #[must_use]
    pub fn sets_or_zero(&self) -> i64 {
        self.sets.unwrap_or(0)
    }

    #[must_use]
    pub fn reps_or_zero(&self) -> i64 {
        self.reps.unwrap_or(0)
    }

    #[must_use]
    pub fn weight_or_zero(&self) -> f64 {
        self.weight.unwrap_or(0.0)
    }

    /// Total repetitions performed: sets × reps, saturating at `i64::MAX`.
    #[must_use]
    pub fn total_reps(&self) -> i64 {
        self.sets_or_zero().saturating_mul(self.reps_or_zero())
    }

    /// Training volume: sets × reps × weight.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.total_reps() as f64 * self.weight_or_zero()
    }

    #[must_use]
    pub fn is_compound_set(&self) -> bool {
        self.set_type.as_deref().map_or(false, |t| {
            COMPOUND_SET_TYPES
                .iter()
                .any(|c| c.eq_ignore_ascii_case(t.trim()))
        })
    }

    /// Additional exercise names, only for superset/alternate entries.
    #[must_use]
    pub fn extras(&self) -> &[String] {
        if self.is_compound_set() {
            &self.additional_exercises
        } else {
            &[]
        }
    }
}

/// Parses the date formats the backend has been seen to emit.
/// Accepts `YYYY-MM-DD`, RFC 3339, and naive `YYYY-MM-DDTHH:MM:SS[.fff]`.
#[must_use]
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Input for logging a new entry. Unlike `ExerciseRecord`, this is validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub exercise_name: String,
    pub sets: i64,
    pub reps: i64,
    pub weight: Option<f64>,
    pub workout_type: Option<String>,
    pub muscle_group: Option<String>,
    pub date: NaiveDate,
    pub set_type: Option<String>,
    pub additional_exercises: Vec<String>,
    pub notes: Option<String>,
}

impl NewRecord {
    /// Checks the logging invariants: non-empty name, sets/reps >= 1, weight >= 0.
    /// # Errors
    /// Returns the first violated `RecordError`.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.exercise_name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if self.sets < 1 {
            return Err(RecordError::InvalidSets(self.sets));
        }
        if self.reps < 1 {
            return Err(RecordError::InvalidReps(self.reps));
        }
        if let Some(w) = self.weight {
            if w.is_nan() || w < 0.0 {
                return Err(RecordError::InvalidWeight(w));
            }
        }
        Ok(())
    }

    /// Validates and converts into a stored record with the given identifier.
    /// # Errors
    /// Returns `RecordError` if validation fails.
    pub fn into_record(self, id: String) -> Result<ExerciseRecord, RecordError> {
        self.validate()?;
        Ok(ExerciseRecord {
            id,
            exercise_name: self.exercise_name.trim().to_string(),
            sets: Some(self.sets),
            reps: Some(self.reps),
            weight: self.weight,
            workout_type: non_empty(self.workout_type),
            muscle_group: non_empty(self.muscle_group),
            exercise_date: Some(self.date.format("%Y-%m-%d").to_string()),
            set_type: non_empty(self.set_type),
            additional_exercises: self
                .additional_exercises
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            notes: non_empty(self.notes),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// --- Lenient field decoding ---
// Backend exports are loosely typed: numbers sometimes arrive as strings or
// floats, and arrays sometimes as null. Anything unusable decodes to absent.

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseValue::Int(n)) => Some(n),
        Some(LooseValue::Float(f)) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        Some(LooseValue::Text(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[allow(clippy::cast_precision_loss)]
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseValue::Int(n)) => Some(n as f64),
        Some(LooseValue::Float(f)) if f.is_finite() => Some(f),
        Some(LooseValue::Text(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

fn lenient_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseList {
        List(Vec<LooseValue>),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<LooseList>::deserialize(deserializer)? {
        Some(LooseList::List(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                LooseValue::Text(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_and_timestamp_dates() {
        assert_eq!(parse_record_date("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(
            parse_record_date("2024-01-05T10:30:00.000Z"),
            Some(date(2024, 1, 5))
        );
        assert_eq!(
            parse_record_date("2024-01-05T10:30:00"),
            Some(date(2024, 1, 5))
        );
        assert_eq!(parse_record_date("not a date"), None);
        assert_eq!(parse_record_date("2024-02-30"), None);
        assert_eq!(parse_record_date("   "), None);
    }

    #[test]
    fn deserializes_backend_shape_with_missing_fields() {
        let json = r#"{"_id":"abc","exercise_name":"Squat","sets":"5","reps":5.0,"weight":null,"additional_exercises":null}"#;
        let record: ExerciseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.sets, Some(5));
        assert_eq!(record.reps, Some(5));
        assert_eq!(record.weight, None);
        assert!(record.additional_exercises.is_empty());
        assert_eq!(record.date(), None);
    }

    #[test]
    fn malformed_numbers_become_absent() {
        let json = r#"{"_id":"x","sets":"four","reps":[1],"weight":"heavy"}"#;
        let record: ExerciseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sets, None);
        assert_eq!(record.reps, None);
        assert_eq!(record.weight, None);
        assert_eq!(record.total_reps(), 0);
        assert_eq!(record.volume(), 0.0);
    }

    #[test]
    fn extras_only_for_compound_sets() {
        let mut record = ExerciseRecord {
            id: "1".into(),
            exercise_name: "Curl".into(),
            set_type: Some("Superset".into()),
            additional_exercises: vec!["Pushdown".into()],
            ..Default::default()
        };
        assert!(record.is_compound_set());
        assert_eq!(record.extras(), ["Pushdown".to_string()]);

        record.set_type = Some("drop".into());
        assert!(record.extras().is_empty());
    }

    #[test]
    fn new_record_validation() {
        let base = NewRecord {
            exercise_name: "Bench Press".into(),
            sets: 3,
            reps: 8,
            weight: Some(60.0),
            workout_type: Some("Push".into()),
            muscle_group: Some(" ".into()),
            date: date(2024, 1, 5),
            set_type: None,
            additional_exercises: vec![],
            notes: None,
        };
        let record = base.clone().into_record("id-1".into()).unwrap();
        assert_eq!(record.exercise_date.as_deref(), Some("2024-01-05"));
        assert_eq!(record.muscle_group, None);

        let bad = NewRecord {
            sets: 0,
            ..base.clone()
        };
        assert_eq!(bad.validate(), Err(RecordError::InvalidSets(0)));
        let bad = NewRecord {
            exercise_name: "  ".into(),
            ..base.clone()
        };
        assert_eq!(bad.validate(), Err(RecordError::EmptyName));
        let bad = NewRecord {
            weight: Some(-1.0),
            ..base
        };
        assert_eq!(bad.validate(), Err(RecordError::InvalidWeight(-1.0)));
    }
}
