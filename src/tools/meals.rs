use crate::store::{Record, contains_pattern};
use crate::timepoint::TimePoint;
use crate::tools::{
    ToolContext, ToolError, finish, optional_str, required_str, rows_result, select_rows,
    structured_result,
};
use serde_json::{Value, json};

pub const CATEGORIES: [&str; 3] = ["breakfast", "lunch", "dinner"];
pub const DEFAULT_CATEGORY: &str = "lunch";

const BY_KEYWORD_SQL: &str = "SELECT * FROM smu_meals WHERE meal LIKE ?";

pub fn call_by_date_category(ctx: &ToolContext, args: &Value) -> Value {
    let result = required_str(args, "date_iso").and_then(|date_iso| {
        let category = optional_str(args, "category")?.unwrap_or(DEFAULT_CATEGORY);
        by_date_category(ctx, date_iso, category)
    });
    finish(result, rows_result)
}

pub fn call_today_lunch(ctx: &ToolContext, _args: &Value) -> Value {
    let today = TimePoint::now().date_string();
    let result = by_date_category(ctx, &today, DEFAULT_CATEGORY);
    finish(result, |rows| {
        let count = rows.len() as u64;
        structured_result(&json!({
            "date": today,
            "rows": rows,
            "count": count
        }))
    })
}

pub fn call_by_keyword(ctx: &ToolContext, args: &Value) -> Value {
    let result = required_str(args, "keyword").and_then(|keyword| by_keyword(ctx, keyword));
    finish(result, rows_result)
}

/// Meals for one day and category, oldest first.
///
/// `date_iso` goes through the normalizer, so anything it accepts works and
/// only the calendar date is used. The category is matched ignoring case.
pub fn by_date_category(
    ctx: &ToolContext,
    date_iso: &str,
    category: &str,
) -> Result<Vec<Record>, ToolError> {
    let date = TimePoint::parse(date_iso)?.date_string();
    let category = normalize_category(category)?;

    let sql = format!(
        "SELECT * FROM smu_meals WHERE LOWER(category) = LOWER(?) AND {} ORDER BY `date` ASC",
        ctx.store().dialect().date_equals("`date`")
    );
    select_rows(ctx, &sql, &[category, date.as_str(), date.as_str()])
}

pub fn by_keyword(ctx: &ToolContext, keyword: &str) -> Result<Vec<Record>, ToolError> {
    let pattern = contains_pattern(keyword);
    select_rows(ctx, BY_KEYWORD_SQL, &[pattern.as_str()])
}

fn normalize_category(category: &str) -> Result<&'static str, ToolError> {
    let lowered = category.trim().to_ascii_lowercase();
    CATEGORIES
        .iter()
        .copied()
        .find(|known| *known == lowered)
        .ok_or_else(|| {
            ToolError::InvalidInput(format!(
                "category must be one of breakfast, lunch, dinner (got '{category}')"
            ))
        })
}
