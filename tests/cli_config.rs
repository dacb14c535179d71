use std::process::Command;
use tempfile::tempdir;

#[test]
fn serve_without_database_settings_fails_fast() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    let output = Command::new(env!("CARGO_BIN_EXE_smuchat-mcp"))
        .args(["serve", "--stdio"])
        .current_dir(dir.path())
        .env_clear()
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("database configuration is incomplete"));
    assert!(stderr.contains("DB_HOST"));
    Ok(())
}
