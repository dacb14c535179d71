//! Embedded SQLite row store.
//!
//! # Invariants
//! - The schema exists before the first session is handed out.
//! - Every session is its own connection to the same database file.

use super::{Connector, Dialect, Record, Session, StoreResult};
use log::{error, info};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS smu_meals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    `date` TEXT NOT NULL,
    category TEXT NOT NULL,
    meal TEXT,
    url TEXT
);
CREATE TABLE IF NOT EXISTS smu_notices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    url TEXT,
    posted_at TEXT
);
CREATE TABLE IF NOT EXISTS smu_exam (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_name TEXT,
    professor TEXT,
    exam_date TEXT,
    room TEXT
);
CREATE TABLE IF NOT EXISTS smu_schedule (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    /// Opens (creating if needed) the database at `path` and ensures the
    /// four tables exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let started_at = Instant::now();
        let path = path.as_ref().to_path_buf();
        info!(
            "event=db_open module=store status=start backend=sqlite path={}",
            path.display()
        );

        let result = open_connection(&path).and_then(|conn| {
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                info!(
                    "event=db_open module=store status=ok backend=sqlite duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { path })
            }
            Err(err) => {
                error!(
                    "event=db_open module=store status=error backend=sqlite duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

impl Connector for SqliteConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn connect(&self) -> StoreResult<Box<dyn Session>> {
        let conn = open_connection(&self.path)?;
        Ok(Box::new(SqliteSession { conn }))
    }
}

fn open_connection(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

struct SqliteSession {
    conn: Connection,
}

impl Session for SqliteSession {
    fn select(&mut self, sql: &str, params: &[&str]) -> StoreResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            let mut record = Record::new();
            for (index, name) in names.iter().enumerate() {
                record.insert(name.clone(), to_json(row.get_ref(index)?));
            }
            Ok(record)
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn execute(&mut self, sql: &str, params: &[&str]) -> StoreResult<u64> {
        let changed = self.conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(changed as u64)
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn begin(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => json!(number),
        ValueRef::Real(number) => json!(number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
