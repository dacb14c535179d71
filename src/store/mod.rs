//! Row store boundary.
//!
//! Handlers see the database as parameterized text queries returning
//! column-name to value records. A [`Connector`] hands out one [`Session`]
//! per handler call; dropping the session releases the connection.

use log::error;
use serde_json::Value;
use thiserror::Error;

pub mod mysql;
pub mod sqlite;

pub use self::mysql::MySqlConnector;
pub use self::sqlite::SqliteConnector;

/// One result row, keyed by column name in select-list order.
pub type Record = serde_json::Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    MySql(#[from] ::mysql::Error),
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// SQL differences between the supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    /// Predicate matching `column` against a `YYYY-MM-DD` value whether the
    /// column holds a real date or text in `Y-m-d`, `Y.m.d` or `Y/m/d` form.
    /// Binds the date twice.
    pub fn date_equals(self, column: &str) -> String {
        match self {
            Dialect::MySql => format!(
                "(DATE({column}) = ? OR COALESCE(\
                 STR_TO_DATE({column}, '%Y-%m-%d'), \
                 STR_TO_DATE({column}, '%Y.%m.%d'), \
                 STR_TO_DATE({column}, '%Y/%m/%d')) = ?)"
            ),
            Dialect::Sqlite => format!(
                "(date({column}) = ? OR replace(replace({column}, '.', '-'), '/', '-') = ?)"
            ),
        }
    }

    /// Suffix that write-locks the rows a select returns until commit.
    pub fn row_lock(self) -> &'static str {
        match self {
            Dialect::MySql => " FOR UPDATE",
            Dialect::Sqlite => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

pub trait Connector {
    fn dialect(&self) -> Dialect;
    fn connect(&self) -> StoreResult<Box<dyn Session>>;
}

pub trait Session {
    fn select(&mut self, sql: &str, params: &[&str]) -> StoreResult<Vec<Record>>;
    /// Runs a write statement and returns the affected row count.
    fn execute(&mut self, sql: &str, params: &[&str]) -> StoreResult<u64>;
    fn last_insert_id(&self) -> i64;
    fn begin(&mut self) -> StoreResult<()>;
    fn commit(&mut self) -> StoreResult<()>;
    fn rollback(&mut self) -> StoreResult<()>;
}

/// Runs `body` between BEGIN and COMMIT, rolling back when it fails.
pub fn in_transaction<T, F>(session: &mut dyn Session, body: F) -> StoreResult<T>
where
    F: FnOnce(&mut dyn Session) -> StoreResult<T>,
{
    session.begin()?;
    match body(&mut *session) {
        Ok(value) => {
            if let Err(err) = session.commit() {
                rollback_quietly(session);
                return Err(err);
            }
            Ok(value)
        }
        Err(err) => {
            rollback_quietly(session);
            Err(err)
        }
    }
}

fn rollback_quietly(session: &mut dyn Session) {
    if let Err(err) = session.rollback() {
        error!("event=rollback module=store status=error error={err}");
    }
}

/// `LIKE` pattern for an unanchored substring match.
pub fn contains_pattern(keyword: &str) -> String {
    format!("%{keyword}%")
}
