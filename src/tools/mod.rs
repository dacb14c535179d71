use crate::mcp::errors;
use crate::store::{Connector, Record, StoreError};
use crate::timepoint::FormatError;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

pub mod campus_info;
pub mod exam;
pub mod meals;
pub mod notices;
pub mod now_kr;
pub mod schedule;

/// Everything a handler needs besides its arguments.
pub struct ToolContext {
    store: Box<dyn Connector>,
}

impl ToolContext {
    pub fn new(store: Box<dyn Connector>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn Connector {
        self.store.as_ref()
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database operation failed: {0}")]
    Operation(#[from] StoreError),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidInput(_) => errors::INVALID_INPUT,
            ToolError::Format(_) => errors::FORMAT_ERROR,
            ToolError::Validation(_) => errors::VALIDATION_ERROR,
            ToolError::NotFound(_) => errors::NOT_FOUND,
            ToolError::Operation(_) => errors::OPERATION_ERROR,
        }
    }

    pub fn into_result(self) -> Value {
        error_result(self.kind(), self.to_string(), None)
    }
}

pub fn error_result(
    kind: &'static str,
    message: impl Into<String>,
    source: Option<&str>,
) -> serde_json::Value {
    let message = message.into();
    let mut error = json!({
        "kind": kind,
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}

/// Wraps a serializable payload; the text content is the same payload as JSON.
pub fn structured_result<T: Serialize>(payload: &T) -> Value {
    let structured = match serde_json::to_value(payload) {
        Ok(value) => value,
        Err(err) => {
            return error_result(
                errors::OPERATION_ERROR,
                format!("failed to serialize result: {err}"),
                None,
            );
        }
    };
    let text = structured.to_string();
    json!({
        "content": [{"type": "text", "text": text}],
        "structuredContent": structured,
        "isError": false
    })
}

pub fn rows_result(rows: Vec<Record>) -> Value {
    let count = rows.len() as u64;
    structured_result(&json!({
        "rows": rows,
        "count": count
    }))
}

pub fn finish<T>(result: Result<T, ToolError>, render: impl FnOnce(T) -> Value) -> Value {
    match result {
        Ok(value) => render(value),
        Err(err) => err.into_result(),
    }
}

pub(crate) fn arguments(args: &Value) -> Result<&serde_json::Map<String, Value>, ToolError> {
    args.as_object()
        .ok_or_else(|| ToolError::InvalidInput("arguments must be an object".to_string()))
}

pub(crate) fn required_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    let obj = arguments(args)?;
    let Some(value) = obj.get(name) else {
        return Err(ToolError::InvalidInput(format!("{name} is required")));
    };
    value
        .as_str()
        .ok_or_else(|| ToolError::InvalidInput(format!("{name} must be a string")))
}

/// Absent, `null` and blank strings all mean "not given".
pub(crate) fn optional_str<'a>(args: &'a Value, name: &str) -> Result<Option<&'a str>, ToolError> {
    let obj = arguments(args)?;
    match obj.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(ToolError::InvalidInput(format!("{name} must be a string"))),
    }
}

pub(crate) fn select_rows(
    ctx: &ToolContext,
    sql: &str,
    params: &[&str],
) -> Result<Vec<Record>, ToolError> {
    let mut session = ctx.store().connect()?;
    Ok(session.select(sql, params)?)
}
