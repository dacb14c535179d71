//! Schedule write path plus keyword search.
//!
//! # Invariants
//! - `end >= start` is checked before a connection is opened.
//! - Every write runs inside BEGIN/COMMIT and is rolled back on failure.
//! - Delete-by-keyword selects and deletes inside the same transaction, so
//!   the report lists exactly the rows that were removed.

use crate::store::{Record, contains_pattern, in_transaction};
use crate::timepoint::TimePoint;
use crate::tools::{
    ToolContext, ToolError, finish, optional_str, required_str, rows_result, select_rows,
    structured_result,
};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

const INSERT_SQL: &str = "INSERT INTO smu_schedule (start_date, end_date, content, created_at) \
     VALUES (?, ?, ?, ?)";
const SEARCH_SQL: &str = "SELECT * FROM smu_schedule WHERE content LIKE ?";
const MATCHING_SQL: &str = "SELECT id, start_date, end_date, content FROM smu_schedule \
     WHERE content LIKE ?";
const DELETE_SQL: &str = "DELETE FROM smu_schedule WHERE content LIKE ?";

#[derive(Debug, Clone, Copy)]
pub struct NewSchedule<'a> {
    pub start_datetime: &'a str,
    pub content: &'a str,
    pub end_datetime: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct InsertAck {
    pub ok: bool,
    pub id: i64,
    pub content: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteReport {
    pub ok: bool,
    pub deleted_count: usize,
    pub deleted_ids: Vec<i64>,
    pub deleted: Vec<Record>,
    pub message: String,
}

pub fn call_insert(ctx: &ToolContext, args: &Value) -> Value {
    let result = parse_new_schedule(args).and_then(|request| insert(ctx, &request));
    finish(result, |ack| structured_result(&ack))
}

pub fn call_delete(ctx: &ToolContext, args: &Value) -> Value {
    let result = required_str(args, "keyword").and_then(|keyword| delete_by_keyword(ctx, keyword));
    finish(result, |report| structured_result(&report))
}

pub fn call_search(ctx: &ToolContext, args: &Value) -> Value {
    let result = required_str(args, "keyword").and_then(|keyword| search(ctx, keyword));
    finish(result, rows_result)
}

fn parse_new_schedule(args: &Value) -> Result<NewSchedule<'_>, ToolError> {
    Ok(NewSchedule {
        start_datetime: required_str(args, "start_datetime")?,
        content: required_str(args, "content")?,
        end_datetime: optional_str(args, "end_datetime")?,
    })
}

pub fn insert(ctx: &ToolContext, request: &NewSchedule<'_>) -> Result<InsertAck, ToolError> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(ToolError::InvalidInput("content must not be empty".to_string()));
    }

    let start = TimePoint::parse(request.start_datetime)?;
    let end = match request.end_datetime {
        Some(end) => TimePoint::parse(end)?,
        None => start,
    };
    if end < start {
        return Err(ToolError::Validation(format!(
            "end_datetime ({}) must not be earlier than start_datetime ({})",
            end.to_iso(),
            start.to_iso()
        )));
    }

    let created_at = TimePoint::now();
    let start_db = start.to_db_string();
    let end_db = end.to_db_string();
    let created_db = created_at.to_db_string();

    let mut session = ctx.store().connect()?;
    let id = in_transaction(session.as_mut(), |tx| {
        tx.execute(
            INSERT_SQL,
            &[start_db.as_str(), end_db.as_str(), content, created_db.as_str()],
        )?;
        Ok(tx.last_insert_id())
    })?;

    info!("event=schedule_insert module=tools status=ok id={id}");
    Ok(InsertAck {
        ok: true,
        id,
        content: content.to_string(),
        start_date: start.to_iso(),
        end_date: end.to_iso(),
        created_at: created_at.to_iso(),
    })
}

/// Removes every schedule whose content contains `keyword`.
///
/// No match is a normal outcome (`ok: false`, nothing deleted), not an error.
pub fn delete_by_keyword(ctx: &ToolContext, keyword: &str) -> Result<DeleteReport, ToolError> {
    if keyword.trim().is_empty() {
        return Err(ToolError::InvalidInput(
            "keyword must not be empty".to_string(),
        ));
    }

    let pattern = contains_pattern(keyword);
    let matching_sql = format!("{MATCHING_SQL}{}", ctx.store().dialect().row_lock());

    let mut session = ctx.store().connect()?;
    let (matched, removed) = in_transaction(session.as_mut(), |tx| {
        let matched = tx.select(&matching_sql, &[pattern.as_str()])?;
        if matched.is_empty() {
            return Ok((matched, 0));
        }
        let removed = tx.execute(DELETE_SQL, &[pattern.as_str()])?;
        Ok((matched, removed))
    })?;

    if matched.is_empty() {
        return Ok(DeleteReport {
            ok: false,
            deleted_count: 0,
            deleted_ids: Vec::new(),
            deleted: Vec::new(),
            message: format!("no schedule found containing '{keyword}'"),
        });
    }

    if removed != matched.len() as u64 {
        warn!(
            "event=schedule_delete module=tools status=mismatch matched={} removed={removed}",
            matched.len()
        );
    }

    let deleted_ids: Vec<i64> = matched
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_i64))
        .collect();
    info!(
        "event=schedule_delete module=tools status=ok deleted_count={}",
        matched.len()
    );

    Ok(DeleteReport {
        ok: true,
        deleted_count: matched.len(),
        message: format!("deleted {} schedule(s) containing '{keyword}'", matched.len()),
        deleted_ids,
        deleted: matched,
    })
}

pub fn search(ctx: &ToolContext, keyword: &str) -> Result<Vec<Record>, ToolError> {
    let pattern = contains_pattern(keyword);
    select_rows(ctx, SEARCH_SQL, &[pattern.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{run_sql, sqlite_context};

    fn count_rows(ctx: &ToolContext) -> usize {
        let mut session = ctx.store().connect().expect("session");
        session
            .select("SELECT id FROM smu_schedule", &[])
            .expect("count")
            .len()
    }

    #[test]
    fn insert_then_delete_by_keyword() {
        let (_dir, ctx) = sqlite_context();
        let ack = insert(
            &ctx,
            &NewSchedule {
                start_datetime: "2025-10-21",
                content: "TeamSync Q4",
                end_datetime: None,
            },
        )
        .expect("insert");
        assert!(ack.ok);
        assert_eq!(ack.start_date, "2025-10-21T00:00:00+09:00");
        assert_eq!(ack.end_date, ack.start_date);

        let report = delete_by_keyword(&ctx, "TeamSync").expect("delete");
        assert!(report.ok);
        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.deleted_ids, vec![ack.id]);
        assert_eq!(count_rows(&ctx), 0);
    }

    #[test]
    fn delete_without_match_is_not_an_error() {
        let (_dir, ctx) = sqlite_context();
        insert(
            &ctx,
            &NewSchedule {
                start_datetime: "2025-10-21 09:00",
                content: "동아리 회의",
                end_datetime: None,
            },
        )
        .expect("insert");

        let report = delete_by_keyword(&ctx, "TeamSync").expect("report");
        assert!(!report.ok);
        assert_eq!(report.deleted_count, 0);
        assert!(report.deleted_ids.is_empty());
        assert_eq!(count_rows(&ctx), 1);
    }

    #[test]
    fn end_before_start_is_rejected_without_writing() {
        let (_dir, ctx) = sqlite_context();
        let err = insert(
            &ctx,
            &NewSchedule {
                start_datetime: "2025-10-21 13:30",
                content: "회의",
                end_datetime: Some("2025-10-21 10:00"),
            },
        )
        .expect_err("validation");
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(count_rows(&ctx), 0);
    }

    #[test]
    fn explicit_end_is_normalized() {
        let (_dir, ctx) = sqlite_context();
        let ack = insert(
            &ctx,
            &NewSchedule {
                start_datetime: "2025-10-21 13:30",
                content: "세미나",
                end_datetime: Some("2025-10-21T06:00:00Z"),
            },
        )
        .expect("insert");
        assert_eq!(ack.end_date, "2025-10-21T15:00:00+09:00");

        let rows = search(&ctx, "세미나").expect("search");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["start_date"], "2025-10-21 13:30:00");
        assert_eq!(rows[0]["end_date"], "2025-10-21 15:00:00");
    }

    #[test]
    fn malformed_start_is_format_error() {
        let (_dir, ctx) = sqlite_context();
        let result = call_insert(
            &ctx,
            &serde_json::json!({"start_datetime": "21/10/2025", "content": "x"}),
        );
        assert_eq!(result["structuredContent"]["error"]["kind"], "format_error");
        assert_eq!(count_rows(&ctx), 0);
    }

    #[test]
    fn delete_only_touches_matching_rows() {
        let (_dir, ctx) = sqlite_context();
        for content in ["TeamSync Q4", "TeamSync retro", "Lunch"] {
            insert(
                &ctx,
                &NewSchedule {
                    start_datetime: "2025-10-22",
                    content,
                    end_datetime: None,
                },
            )
            .expect("insert");
        }

        let report = delete_by_keyword(&ctx, "TeamSync").expect("delete");
        assert_eq!(report.deleted_count, 2);
        assert_eq!(report.deleted.len(), 2);
        let remaining = search(&ctx, "").expect("remaining");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["content"], "Lunch");
    }

    #[test]
    fn blank_keyword_cannot_delete_everything() {
        let (_dir, ctx) = sqlite_context();
        let err = delete_by_keyword(&ctx, "  ").expect_err("blank");
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn failed_insert_reports_database_error_and_writes_nothing() {
        let (_dir, ctx) = sqlite_context();
        run_sql(
            &ctx,
            "CREATE TRIGGER reject_insert BEFORE INSERT ON smu_schedule \
             BEGIN SELECT RAISE(ABORT, 'schedule writes disabled'); END",
        );

        let result = call_insert(
            &ctx,
            &serde_json::json!({"start_datetime": "2025-10-21 09:00", "content": "회의"}),
        );
        let error = &result["structuredContent"]["error"];
        assert_eq!(error["kind"], "operation_error");
        let message = error["message"].as_str().expect("message");
        assert!(message.contains("schedule writes disabled"), "{message}");
        assert_eq!(count_rows(&ctx), 0);
    }

    #[test]
    fn failed_delete_rolls_back_and_keeps_rows() {
        let (_dir, ctx) = sqlite_context();
        insert(
            &ctx,
            &NewSchedule {
                start_datetime: "2025-10-21",
                content: "TeamSync Q4",
                end_datetime: None,
            },
        )
        .expect("insert");
        run_sql(
            &ctx,
            "CREATE TRIGGER reject_delete BEFORE DELETE ON smu_schedule \
             BEGIN SELECT RAISE(ABORT, 'schedule deletes disabled'); END",
        );

        let err = delete_by_keyword(&ctx, "TeamSync").expect_err("delete fails");
        assert_eq!(err.kind(), "operation_error");
        assert!(err.to_string().contains("schedule deletes disabled"));
        assert_eq!(count_rows(&ctx), 1);

        // The failed transaction must not leave the database locked.
        let rows = search(&ctx, "TeamSync").expect("search after failure");
        assert_eq!(rows.len(), 1);
    }
}
