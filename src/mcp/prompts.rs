use crate::mcp::contracts::{PROMPT_DEFAULT, TOOL_MEALS_BY_DATE_CATEGORY, TOOL_NOW_KR};
use crate::timepoint::TimePoint;
use serde_json::{Value, json};

pub fn prompt_definitions() -> Vec<Value> {
    vec![json!({
        "name": PROMPT_DEFAULT,
        "description": "Agent instructions anchored to the current Asia/Seoul clock.",
        "arguments": [
            {
                "name": "message",
                "description": "User message passed through unchanged",
                "required": true
            }
        ]
    })]
}

/// Builds the date-anchoring instructions for `now`.
pub fn system_text(now: &TimePoint) -> String {
    let today = now.date_string();
    let time = now.as_datetime().format("%H:%M");
    let weekday = now.weekday_name();
    let yesterday = now.add_days(-1).date_string();
    let tomorrow = now.add_days(1).date_string();

    format!(
        "You are a smart agent with an ability to use tools.\n\
         If you don't have any tools to use for what the user asked, please think and judge for yourself and answer.\n\
         Before answering any question that depends on dates or times, call the `{TOOL_NOW_KR}` tool to confirm the current date/time in Asia/Seoul.\n\
         When reasoning about any dates or times, you MUST anchor to the following clock:\n\
         - Today: {today} ({weekday}), Current time: {time}, Timezone: Asia/Seoul (KST, UTC+9).\n\
         Interpret relative terms strictly as:\n\
         - 'today/오늘' = {today}\n\
         - 'yesterday/어제' = {yesterday}\n\
         - 'tomorrow/내일' = {tomorrow}\n\
         If the user asks for SMU meals for today or a specific date, prefer:\n\
         1) Call `{TOOL_NOW_KR}` (get date)\n\
         2) Then call `{TOOL_MEALS_BY_DATE_CATEGORY}(date_iso, category)`\n\
         When data includes URLs, always include them in the answer."
    )
}

/// `prompts/get` result: the generated instructions followed by `message`
/// exactly as received.
pub fn default_prompt(now: &TimePoint, message: &str) -> Value {
    json!({
        "description": "Agent instructions anchored to the current Asia/Seoul clock.",
        "messages": [
            {
                "role": "assistant",
                "content": { "type": "text", "text": system_text(now) }
            },
            {
                "role": "user",
                "content": { "type": "text", "text": message }
            }
        ]
    })
}
