use crate::store::{Record, contains_pattern};
use crate::tools::{ToolContext, ToolError, finish, required_str, rows_result, select_rows};
use serde_json::Value;

const BY_KEYWORD_SQL: &str = "SELECT * FROM smu_notices WHERE title LIKE ?";

pub fn call(ctx: &ToolContext, args: &Value) -> Value {
    let result = required_str(args, "keyword").and_then(|keyword| by_keyword(ctx, keyword));
    finish(result, rows_result)
}

pub fn by_keyword(ctx: &ToolContext, keyword: &str) -> Result<Vec<Record>, ToolError> {
    let pattern = contains_pattern(keyword);
    select_rows(ctx, BY_KEYWORD_SQL, &[pattern.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{seed, sqlite_context};
    use serde_json::json;

    #[test]
    fn title_substring_match() {
        let (_dir, ctx) = sqlite_context();
        seed(
            &ctx,
            "INSERT INTO smu_notices (title, url) VALUES (?, ?)",
            &[
                &["2학기 수강신청 안내", "https://example.test/1"],
                &["장학금 신청 기간", "https://example.test/2"],
                &["수강정정 일정", "https://example.test/3"],
            ],
        );

        let rows = by_keyword(&ctx, "수강").expect("rows");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row["title"].as_str().is_some_and(|t| t.contains("수강"))));
        assert_eq!(rows[0]["url"], json!("https://example.test/1"));
    }

    #[test]
    fn missing_keyword_is_invalid_input() {
        let (_dir, ctx) = sqlite_context();
        let result = call(&ctx, &json!({}));
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["structuredContent"]["error"]["kind"], "invalid_input");
    }
}
