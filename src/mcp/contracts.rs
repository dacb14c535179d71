use serde_json::json;

pub const TOOL_NOW_KR: &str = "now_kr";
pub const TOOL_MEALS_BY_DATE_CATEGORY: &str = "query_smu_meals_by_date_category";
pub const TOOL_TODAY_LUNCH: &str = "today_lunch";
pub const TOOL_MEALS_BY_KEYWORD: &str = "query_smu_meals_by_keyword";
pub const TOOL_NOTICES_BY_KEYWORD: &str = "query_smu_notices_by_keyword";
pub const TOOL_EXAM_BY_SUBJECT: &str = "query_smu_exam_by_subject";
pub const TOOL_SCHEDULE_BY_KEYWORD: &str = "query_smu_schedule_by_keyword";
pub const TOOL_CAMPUS_INFO: &str = "lookup_campus_info";
pub const TOOL_INSERT_SCHEDULE: &str = "insert_schedule";
pub const TOOL_DELETE_SCHEDULE: &str = "delete_schedule_by_keyword";

pub const PROMPT_DEFAULT: &str = "default_prompt";

pub const PROTOCOL_VERSION: &str = "2025-11-25";

pub fn empty_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

pub fn meals_by_date_category_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "date_iso": {
                "type": "string",
                "description": "ISO date such as 2025-08-27"
            },
            "category": {
                "type": "string",
                "description": "breakfast, lunch or dinner in any letter case",
                "default": "lunch"
            }
        },
        "required": ["date_iso"],
        "additionalProperties": false
    })
}

pub fn keyword_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "keyword": { "type": "string" }
        },
        "required": ["keyword"],
        "additionalProperties": false
    })
}

pub fn exam_by_subject_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "keyword": {
                "type": "string",
                "description": "Part of the subject name"
            },
            "professor": {
                "type": "string",
                "description": "Optional part of the professor name"
            }
        },
        "required": ["keyword"],
        "additionalProperties": false
    })
}

pub fn campus_info_schema(keys: &[&str]) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "key": { "type": "string", "enum": keys }
        },
        "required": ["key"],
        "additionalProperties": false
    })
}

pub fn insert_schedule_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "start_datetime": {
                "type": "string",
                "description": "YYYY-MM-DD HH:MM or YYYY-MM-DD, Asia/Seoul unless an offset is given"
            },
            "content": { "type": "string" },
            "end_datetime": {
                "type": "string",
                "description": "Defaults to start_datetime"
            }
        },
        "required": ["start_datetime", "content"],
        "additionalProperties": false
    })
}

pub fn delete_schedule_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "keyword": {
                "type": "string",
                "description": "Every schedule whose content contains this text is deleted"
            }
        },
        "required": ["keyword"],
        "additionalProperties": false
    })
}
