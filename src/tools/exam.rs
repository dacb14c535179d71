use crate::store::{Record, contains_pattern};
use crate::tools::{
    ToolContext, ToolError, finish, optional_str, required_str, rows_result, select_rows,
};
use serde_json::Value;

const BY_SUBJECT_SQL: &str = "SELECT * FROM smu_exam \
     WHERE subject_name IS NOT NULL AND subject_name LIKE ? \
     ORDER BY subject_name ASC";

const BY_SUBJECT_AND_PROFESSOR_SQL: &str = "SELECT * FROM smu_exam \
     WHERE subject_name IS NOT NULL AND subject_name LIKE ? \
     AND professor LIKE ? \
     ORDER BY subject_name ASC";

pub fn call(ctx: &ToolContext, args: &Value) -> Value {
    let result = required_str(args, "keyword").and_then(|keyword| {
        let professor = optional_str(args, "professor")?;
        by_subject(ctx, keyword, professor)
    });
    finish(result, rows_result)
}

/// Exam rows whose subject contains `keyword`, sorted by subject name.
/// A professor keyword adds a second, ANDed filter.
pub fn by_subject(
    ctx: &ToolContext,
    keyword: &str,
    professor: Option<&str>,
) -> Result<Vec<Record>, ToolError> {
    let subject = contains_pattern(keyword);
    match professor {
        None => select_rows(ctx, BY_SUBJECT_SQL, &[subject.as_str()]),
        Some(professor) => {
            let professor = contains_pattern(professor);
            select_rows(
                ctx,
                BY_SUBJECT_AND_PROFESSOR_SQL,
                &[subject.as_str(), professor.as_str()],
            )
        }
    }
}
