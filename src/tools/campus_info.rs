//! Fixed campus facts served from memory instead of the database.

use crate::timepoint::SEOUL_TZ_LABEL;
use crate::tools::{ToolError, finish, required_str, structured_result};
use serde::Serialize;
use serde_json::Value;

const ENTRIES: &[(&str, &str)] = &[
    ("homepage", "https://www.smu.ac.kr"),
    ("meal_categories", "breakfast, lunch, dinner"),
    ("timezone", SEOUL_TZ_LABEL),
    (
        "schedule_format",
        "YYYY-MM-DD HH:MM or YYYY-MM-DD (Asia/Seoul); end defaults to start",
    ),
];

/// Closed key/value table with checked lookup.
#[derive(Debug, Clone, Copy)]
pub struct CampusInfo {
    entries: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Serialize)]
pub struct CampusEntry {
    pub key: &'static str,
    pub value: &'static str,
}

impl CampusInfo {
    pub const fn builtin() -> Self {
        Self { entries: ENTRIES }
    }

    /// Exact, case-sensitive key match.
    pub fn get(&self, key: &str) -> Option<CampusEntry> {
        self.entries
            .iter()
            .find(|(known, _)| *known == key)
            .map(|&(key, value)| CampusEntry { key, value })
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn lookup(&self, key: &str) -> Result<CampusEntry, ToolError> {
        self.get(key).ok_or_else(|| {
            let known: Vec<&str> = self.keys().collect();
            ToolError::NotFound(format!(
                "no campus info for key '{key}' (known keys: {})",
                known.join(", ")
            ))
        })
    }
}

pub fn call(args: &Value) -> Value {
    let result = required_str(args, "key").and_then(|key| CampusInfo::builtin().lookup(key));
    finish(result, |entry| structured_result(&entry))
}
