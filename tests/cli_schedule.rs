use std::process::Command;
use tempfile::tempdir;

#[test]
fn cli_schedule_add_and_delete() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let db_path = dir.path().join("smu.db");
    let db_arg = db_path.to_str().expect("utf-8 temp path");

    let added = Command::new(env!("CARGO_BIN_EXE_smuchat-mcp"))
        .args([
            "schedule-add",
            "--sqlite",
            db_arg,
            "--json",
            "--start",
            "2025-10-21 13:30",
            "--end",
            "2025-10-21 15:00",
            "--content",
            "캡스톤 발표",
        ])
        .output()?;
    assert!(added.status.success());
    let ack: serde_json::Value = serde_json::from_slice(&added.stdout)?;
    assert_eq!(
        ack.get("end_date").and_then(|v| v.as_str()),
        Some("2025-10-21T15:00:00+09:00")
    );

    let deleted = Command::new(env!("CARGO_BIN_EXE_smuchat-mcp"))
        .args([
            "schedule-delete",
            "--sqlite",
            db_arg,
            "--json",
            "--keyword",
            "캡스톤",
        ])
        .output()?;
    assert!(deleted.status.success());
    let report: serde_json::Value = serde_json::from_slice(&deleted.stdout)?;
    assert_eq!(report.get("deleted_count").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(report.get("deleted_ids"), Some(&serde_json::json!([ack["id"]])));
    Ok(())
}

#[test]
fn cli_rejects_reversed_range() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let db_path = dir.path().join("smu.db");

    let output = Command::new(env!("CARGO_BIN_EXE_smuchat-mcp"))
        .args(["schedule-add", "--sqlite"])
        .arg(&db_path)
        .args([
            "--start",
            "2025-10-21 13:30",
            "--end",
            "2025-10-21 10:00",
            "--content",
            "회의",
        ])
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("validation_error: "));
    assert!(stderr.contains("must not be earlier"));
    Ok(())
}
