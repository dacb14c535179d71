use crate::timepoint::{SEOUL_TZ_LABEL, TimePoint};
use crate::tools::structured_result;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ClockInfo {
    pub iso: String,
    pub date: String,
    pub time: String,
    pub weekday: String,
    pub tz: &'static str,
}

impl ClockInfo {
    pub fn at(now: &TimePoint) -> Self {
        Self {
            iso: now.to_iso(),
            date: now.date_string(),
            time: now.as_datetime().format("%H:%M:%S").to_string(),
            weekday: now.weekday_name(),
            tz: SEOUL_TZ_LABEL,
        }
    }
}

pub fn call(_args: &Value) -> Value {
    structured_result(&ClockInfo::at(&TimePoint::now()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_fields_follow_the_time_point() {
        let now = TimePoint::parse("2025-08-27 12:05").expect("time");
        let info = ClockInfo::at(&now);
        assert_eq!(info.iso, "2025-08-27T12:05:00+09:00");
        assert_eq!(info.date, "2025-08-27");
        assert_eq!(info.time, "12:05:00");
        assert_eq!(info.weekday, "Wednesday");
        assert_eq!(info.tz, "Asia/Seoul (KST, UTC+9)");
    }

    #[test]
    fn call_returns_structured_clock() {
        let result = call(&serde_json::json!({}));
        assert_eq!(result["isError"], serde_json::json!(false));
        let iso = result["structuredContent"]["iso"].as_str().expect("iso");
        assert!(iso.ends_with("+09:00"));
    }
}
