use super::{Connector, Dialect, Record, Session, StoreResult};
use crate::config::DbConfig;
use log::{debug, error};
use mysql::consts::ColumnType;
use mysql::prelude::Queryable;
use mysql::{Conn, Opts, OptsBuilder, Params, Row};
use serde_json::{Value, json};
use std::time::Instant;

/// Opens a fresh MySQL connection for every session.
pub struct MySqlConnector {
    opts: Opts,
    target: String,
}

impl MySqlConnector {
    pub fn new(config: &DbConfig) -> Self {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()));

        Self {
            opts: Opts::from(opts),
            target: format!("{}:{}/{}", config.host, config.port, config.database),
        }
    }
}

impl Connector for MySqlConnector {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn connect(&self) -> StoreResult<Box<dyn Session>> {
        let started_at = Instant::now();
        match Conn::new(self.opts.clone()) {
            Ok(conn) => {
                debug!(
                    "event=db_connect module=store status=ok backend=mysql target={} duration_ms={}",
                    self.target,
                    started_at.elapsed().as_millis()
                );
                Ok(Box::new(MySqlSession { conn }))
            }
            Err(err) => {
                error!(
                    "event=db_connect module=store status=error backend=mysql target={} duration_ms={} error={}",
                    self.target,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

struct MySqlSession {
    conn: Conn,
}

impl Session for MySqlSession {
    fn select(&mut self, sql: &str, params: &[&str]) -> StoreResult<Vec<Record>> {
        let rows: Vec<Row> = self.conn.exec(sql, positional(params))?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    fn execute(&mut self, sql: &str, params: &[&str]) -> StoreResult<u64> {
        self.conn.exec_drop(sql, positional(params))?;
        Ok(self.conn.affected_rows())
    }

    fn last_insert_id(&self) -> i64 {
        i64::try_from(self.conn.last_insert_id()).unwrap_or(i64::MAX)
    }

    fn begin(&mut self) -> StoreResult<()> {
        self.conn.query_drop("START TRANSACTION")?;
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.conn.query_drop("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.conn.query_drop("ROLLBACK")?;
        Ok(())
    }
}

fn positional(params: &[&str]) -> Params {
    if params.is_empty() {
        return Params::Empty;
    }
    Params::Positional(params.iter().map(|param| mysql::Value::from(*param)).collect())
}

fn row_to_record(row: &Row) -> Record {
    let mut record = Record::new();
    for (index, column) in row.columns_ref().iter().enumerate() {
        let value = row
            .as_ref(index)
            .map(|value| to_json(value, column.column_type()))
            .unwrap_or(Value::Null);
        record.insert(column.name_str().into_owned(), value);
    }
    record
}

fn to_json(value: &mysql::Value, column_type: ColumnType) -> Value {
    match value {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Int(number) => json!(number),
        mysql::Value::UInt(number) => json!(number),
        mysql::Value::Float(number) => json!(number),
        mysql::Value::Double(number) => json!(number),
        mysql::Value::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        mysql::Value::Date(year, month, day, hour, minute, second, _micros) => {
            if column_type == ColumnType::MYSQL_TYPE_DATE {
                Value::String(format!("{year:04}-{month:02}-{day:02}"))
            } else {
                Value::String(format!(
                    "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
                ))
            }
        }
        mysql::Value::Time(negative, days, hours, minutes, seconds, _micros) => {
            let sign = if *negative { "-" } else { "" };
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            Value::String(format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}"))
        }
    }
}
