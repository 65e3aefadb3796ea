// src/lib.rs
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// --- Declare modules ---
pub mod catalog;
mod config;
pub mod criteria;
pub mod db;
pub mod history;
pub mod record;

// --- Expose public types ---
pub use catalog::{CatalogError, CatalogExercise, CatalogFacets, CatalogFilter};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, StandardColor, Theme, Units,
    DEFAULT_RANGE_DAYS, MAX_RANGE_DAYS,
};
pub use criteria::{DateRange, FilterCriteria, Selector};
pub use db::{get_db_path as get_db_path_util, Error as DbError};
pub use history::{Facets, GroupKey, HistorySummary, RecordGroup, Totals};
pub use record::{ExerciseRecord, NewRecord, RecordError};

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped_duplicates: usize,
}

/// Analytics-tab breakdowns over a filtered history.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Breakdowns {
    pub daily_volume: Vec<(NaiveDate, f64)>,
    pub muscle_distribution: Vec<(String, usize)>,
    pub type_breakdown: Vec<(String, usize)>,
}

/// Backend exports come either as a bare array or wrapped in `{ "exercises": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordExport {
    Bare(Vec<ExerciseRecord>),
    Wrapped { exercises: Vec<ExerciseRecord> },
}

impl RecordExport {
    fn into_records(self) -> Vec<ExerciseRecord> {
        match self {
            Self::Bare(records) | Self::Wrapped { exercises: records } => records,
        }
    }
}

pub struct HistoryService {
    pub config: Config,
    pub conn: Connection,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl HistoryService {
    /// Initializes the service from the on-disk config and record store.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let conn = db::open_db(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        db::init_db(&conn).context("Failed to initialize database schema")?;
        debug!(?config_path, ?db_path, "history service initialized");

        Ok(Self {
            config,
            conn,
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets the length of the default date window.
    /// # Errors
    /// - `ConfigError::InvalidRangeDays` if `days` is 0.
    /// - `ConfigError::RangeDaysTooLong` if `days` exceeds `MAX_RANGE_DAYS`.
    /// - `ConfigError` variants if saving fails.
    pub fn set_default_range_days(&mut self, days: u32) -> Result<(), ConfigError> {
        if days == 0 {
            return Err(ConfigError::InvalidRangeDays(days));
        }
        if days > MAX_RANGE_DAYS {
            return Err(ConfigError::RangeDaysTooLong(days));
        }
        self.config.default_range_days = days;
        self.save_config()
    }

    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_units(&mut self, units: Units) -> Result<(), ConfigError> {
        self.config.units = units;
        self.save_config()
    }

    /// Validates and stores a new entry, returning its generated identifier.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `RecordError` or `DbError`.
    pub fn add_record(&self, new_record: NewRecord) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let record = new_record
            .into_record(id.clone())
            .context("Invalid workout entry")?;
        db::insert_record(&self.conn, &record)
            .with_context(|| format!("Failed to add record '{}'", record.exercise_name))?;
        info!(id = %id, exercise = %record.exercise_name, "record added");
        Ok(id)
    }

    /// Removes an entry by identifier.
    /// # Errors
    /// Returns `anyhow::Error` if the identifier is empty or unknown.
    pub fn delete_record(&self, id: &str) -> Result<()> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            bail!("Record identifier cannot be empty.");
        }
        db::delete_record(&self.conn, trimmed).map_err(|db_err| match db_err {
            DbError::RecordNotFound(_) => anyhow::anyhow!(db_err),
            _ => anyhow::Error::new(db_err).context(format!("Failed to delete record {trimmed}")),
        })?;
        info!(id = %trimmed, "record deleted");
        Ok(())
    }

    /// Looks up a single entry by identifier.
    /// # Errors
    /// Returns `anyhow::Error` wrapping DB errors.
    pub fn get_record(&self, id: &str) -> Result<Option<ExerciseRecord>> {
        db::get_record(&self.conn, id.trim())
            .with_context(|| format!("Failed to look up record {}", id.trim()))
    }

    /// The complete history in stored order.
    /// # Errors
    /// Returns `anyhow::Error` wrapping DB errors.
    pub fn list_records(&self) -> Result<Vec<ExerciseRecord>> {
        db::list_records(&self.conn).context("Failed to list records")
    }

    /// Imports a backend JSON export, skipping identifiers already stored.
    /// # Errors
    /// Returns `anyhow::Error` if the file cannot be read or parsed, or an insert fails.
    pub fn import_json(&self, path: &Path) -> Result<ImportReport> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read import file {path:?}"))?;
        self.import_json_str(&content)
            .with_context(|| format!("Failed to import records from {path:?}"))
    }

    /// Same as `import_json`, from an in-memory document.
    /// # Errors
    /// Returns `anyhow::Error` on malformed JSON or insert failure.
    pub fn import_json_str(&self, content: &str) -> Result<ImportReport> {
        let export: RecordExport =
            serde_json::from_str(content).context("Import is not a list of exercise records")?;
        let mut report = ImportReport::default();

        for mut record in export.into_records() {
            record.id = record.id.trim().to_string();
            if record.id.is_empty() {
                warn!(exercise = %record.exercise_name, "skipping record without an identifier");
                continue;
            }
            match db::insert_record(&self.conn, &record) {
                Ok(()) => report.imported += 1,
                Err(DbError::DuplicateRecord(id)) => {
                    debug!(id = %id, "skipping duplicate record");
                    report.skipped_duplicates += 1;
                }
                Err(e) => return Err(e).context("Failed to store imported record"),
            }
        }
        info!(
            imported = report.imported,
            skipped = report.skipped_duplicates,
            "import finished"
        );
        Ok(report)
    }

    /// Reset-state criteria for the configured window ending at `today`.
    pub fn default_criteria(&self, today: NaiveDate) -> FilterCriteria {
        FilterCriteria::defaults(today, self.config.default_range_days)
    }

    /// Selector options over the whole history.
    /// # Errors
    /// Returns `anyhow::Error` wrapping DB errors.
    pub fn facets(&self) -> Result<Facets> {
        Ok(history::derive_facets(&self.list_records()?))
    }

    /// Filters, groups and totals a loaded history. `records` must outlive the summary.
    pub fn summarize<'a>(
        &self,
        records: &'a [ExerciseRecord],
        criteria: &FilterCriteria,
    ) -> HistorySummary<'a> {
        let summary = history::summarize(records, criteria);
        debug!(
            total = records.len(),
            matched = summary.filtered.len(),
            groups = summary.groups.len(),
            "history summarized"
        );
        summary
    }

    pub fn breakdowns(&self, records: &[ExerciseRecord], criteria: &FilterCriteria) -> Breakdowns {
        let filtered = history::filter(records, criteria);
        Breakdowns {
            daily_volume: history::daily_volume(&filtered),
            muscle_distribution: history::muscle_distribution(&filtered),
            type_breakdown: history::type_breakdown(&filtered),
        }
    }

    /// Loads the exercise catalog named in the config.
    /// # Errors
    /// Returns `CatalogError::NotConfigured` if no path is set, or a read/parse error.
    pub fn load_catalog(&self) -> Result<Vec<CatalogExercise>, CatalogError> {
        let path = self
            .config
            .catalog_path
            .as_deref()
            .ok_or_else(|| CatalogError::NotConfigured(self.config_path.clone()))?;
        catalog::load_catalog(path)
    }
}
