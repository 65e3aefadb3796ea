//src/db.rs
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::APP_DIR;
use crate::record::ExerciseRecord;

const DB_FILE_NAME: &str = "records.sqlite";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed: {0}")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Record not found: ID {0}")]
    RecordNotFound(String),
    #[error("Record already exists: ID {0}")]
    DuplicateRecord(String),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
    #[error("Failed to encode additional exercises: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Gets the path to the SQLite database file within the app's data directory.
/// # Errors
/// Returns `Error::DataDir` or `Error::Io` if the directory is unavailable.
pub fn get_db_path() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
/// # Errors
/// Returns `Error::Connection` if SQLite cannot open the file.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// Creates the records table if it doesn't exist.
/// `seq` keeps insertion order, which is the order the history is presented in.
/// # Errors
/// Returns `Error::Connection` if the schema statements fail.
pub fn init_db(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS records (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            exercise_name TEXT NOT NULL,
            sets INTEGER,
            reps INTEGER,
            weight REAL,
            workout_type TEXT,
            muscle_group TEXT,
            exercise_date TEXT, -- raw string, may not parse
            set_type TEXT,
            additional_exercises TEXT NOT NULL DEFAULT '[]', -- JSON array
            notes TEXT
        )",
        [],
    )?;
    Ok(())
}

/// Inserts a record. Identifiers are unique.
/// # Errors
/// Returns `Error::DuplicateRecord` if the ID is taken, `Error::InsertFailed` otherwise.
pub fn insert_record(conn: &Connection, record: &ExerciseRecord) -> Result<(), Error> {
    let extras = serde_json::to_string(&record.additional_exercises)?;
    let result = conn.execute(
        "INSERT INTO records (id, exercise_name, sets, reps, weight, workout_type, muscle_group,
                              exercise_date, set_type, additional_exercises, notes)
         VALUES (:id, :name, :sets, :reps, :weight, :type, :muscle, :date, :set_type, :extras, :notes)",
        named_params! {
            ":id": record.id,
            ":name": record.exercise_name,
            ":sets": record.sets,
            ":reps": record.reps,
            ":weight": record.weight,
            ":type": record.workout_type,
            ":muscle": record.muscle_group,
            ":date": record.exercise_date,
            ":set_type": record.set_type,
            ":extras": extras,
            ":notes": record.notes,
        },
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(Error::DuplicateRecord(record.id.clone()))
        }
        Err(e) => Err(Error::InsertFailed(e)),
    }
}

fn map_row_to_record(row: &Row) -> Result<ExerciseRecord, rusqlite::Error> {
    let extras_json: String = row.get(9)?;
    // A corrupt extras column degrades to "no extras" rather than failing the whole list.
    let additional_exercises = serde_json::from_str(&extras_json).unwrap_or_default();

    Ok(ExerciseRecord {
        id: row.get(0)?,
        exercise_name: row.get(1)?,
        sets: row.get(2)?,
        reps: row.get(3)?,
        weight: row.get(4)?,
        workout_type: row.get(5)?,
        muscle_group: row.get(6)?,
        exercise_date: row.get(7)?,
        set_type: row.get(8)?,
        additional_exercises,
        notes: row.get(10)?,
    })
}

const SELECT_COLUMNS: &str = "SELECT id, exercise_name, sets, reps, weight, workout_type, muscle_group,
                                     exercise_date, set_type, additional_exercises, notes
                              FROM records";

/// All records in insertion order.
/// # Errors
/// Returns `Error::QueryFailed` on SQL failure.
pub fn list_records(conn: &Connection) -> Result<Vec<ExerciseRecord>, Error> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY seq ASC");
    let mut stmt = conn.prepare(&sql).map_err(Error::QueryFailed)?;
    let record_iter = stmt
        .query_map([], map_row_to_record)
        .map_err(Error::QueryFailed)?;

    record_iter
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::QueryFailed)
}

/// # Errors
/// Returns `Error::QueryFailed` on SQL failure.
pub fn get_record(conn: &Connection, id: &str) -> Result<Option<ExerciseRecord>, Error> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, params![id], map_row_to_record)
        .optional()
        .map_err(Error::QueryFailed)
}

/// Deletes a record by identifier.
/// # Errors
/// Returns `Error::RecordNotFound` if nothing was deleted.
pub fn delete_record(conn: &Connection, id: &str) -> Result<(), Error> {
    let rows_affected = conn
        .execute("DELETE FROM records WHERE id = ?1", params![id])
        .map_err(Error::DeleteFailed)?;
    if rows_affected == 0 {
        Err(Error::RecordNotFound(id.to_string()))
    } else {
        Ok(())
    }
}
