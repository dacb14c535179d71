use std::process::Command;

#[test]
fn cli_now_reports_seoul_clock() -> Result<(), Box<dyn std::error::Error>> {
    let output = Command::new(env!("CARGO_BIN_EXE_smuchat-mcp"))
        .args(["now", "--json"])
        .output()?;

    assert!(output.status.success());
    let clock: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let iso = clock.get("iso").and_then(|v| v.as_str()).expect("iso");
    assert!(iso.ends_with("+09:00"));
    assert_eq!(
        clock.get("tz").and_then(|v| v.as_str()),
        Some("Asia/Seoul (KST, UTC+9)")
    );
    Ok(())
}
