use crate::tools::campus_info::CampusInfo;
use serde_json::json;

pub mod contracts;
pub mod errors;
pub mod prompts;

pub fn tool_definitions() -> Vec<serde_json::Value> {
    let campus_keys: Vec<&str> = CampusInfo::builtin().keys().collect();

    vec![
        json!({
            "name": contracts::TOOL_NOW_KR,
            "description": "Return current date/time info in Asia/Seoul (KST, UTC+9).",
            "inputSchema": contracts::empty_schema()
        }),
        json!({
            "name": contracts::TOOL_MEALS_BY_DATE_CATEGORY,
            "description": "Look up SMU meals for a YYYY-MM-DD date and a category (breakfast, lunch or dinner).",
            "inputSchema": contracts::meals_by_date_category_schema()
        }),
        json!({
            "name": contracts::TOOL_TODAY_LUNCH,
            "description": "Look up today's SMU lunch using the Asia/Seoul date.",
            "inputSchema": contracts::empty_schema()
        }),
        json!({
            "name": contracts::TOOL_MEALS_BY_KEYWORD,
            "description": "Find SMU meals whose menu text contains a keyword.",
            "inputSchema": contracts::keyword_schema()
        }),
        json!({
            "name": contracts::TOOL_NOTICES_BY_KEYWORD,
            "description": "Find SMU notices whose title contains a keyword.",
            "inputSchema": contracts::keyword_schema()
        }),
        json!({
            "name": contracts::TOOL_EXAM_BY_SUBJECT,
            "description": "Find exam information by subject name, optionally narrowed by professor.",
            "inputSchema": contracts::exam_by_subject_schema()
        }),
        json!({
            "name": contracts::TOOL_SCHEDULE_BY_KEYWORD,
            "description": "Find saved schedules whose content contains a keyword.",
            "inputSchema": contracts::keyword_schema()
        }),
        json!({
            "name": contracts::TOOL_CAMPUS_INFO,
            "description": "Return a fixed piece of campus information by key.",
            "inputSchema": contracts::campus_info_schema(&campus_keys)
        }),
        json!({
            "name": contracts::TOOL_INSERT_SCHEDULE,
            "description": "Save a schedule. Times are Asia/Seoul; end defaults to start and must not be earlier.",
            "inputSchema": contracts::insert_schedule_schema()
        }),
        json!({
            "name": contracts::TOOL_DELETE_SCHEDULE,
            "description": "Delete every schedule whose content contains a keyword and report what was removed.",
            "inputSchema": contracts::delete_schedule_schema()
        }),
    ]
}
