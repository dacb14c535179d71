use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn send_request(
    stdin: &mut std::process::ChildStdin,
    stdout: &mut BufReader<std::process::ChildStdout>,
    request: serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let serialized = serde_json::to_string(&request)?;
    writeln!(stdin, "{serialized}")?;
    stdin.flush()?;

    let mut line = String::new();
    stdout.read_line(&mut line)?;
    let response: serde_json::Value = serde_json::from_str(line.trim())?;
    Ok(response)
}

#[test]
fn default_prompt_echoes_message() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let db_path = dir.path().join("smu.db");

    let mut child = Command::new(env!("CARGO_BIN_EXE_smuchat-mcp"))
        .args(["serve", "--stdio", "--sqlite"])
        .arg(&db_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;

    let mut stdin = child.stdin.take().expect("stdin available");
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout available"));

    let list = send_request(
        &mut stdin,
        &mut stdout,
        serde_json::json!({"jsonrpc": "2.0", "id": 40, "method": "prompts/list"}),
    )?;
    let prompts = list
        .get("result")
        .and_then(|v| v.get("prompts"))
        .and_then(|v| v.as_array())
        .expect("prompts present");
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0].get("name").and_then(|v| v.as_str()),
        Some("default_prompt")
    );

    let message = "내일 저녁 메뉴 알려줘";
    let get = send_request(
        &mut stdin,
        &mut stdout,
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": 41,
            "method": "prompts/get",
            "params": {
                "name": "default_prompt",
                "arguments": {"message": message}
            }
        }),
    )?;
    let messages = get
        .get("result")
        .and_then(|v| v.get("messages"))
        .and_then(|v| v.as_array())
        .expect("messages present");
    assert_eq!(messages.len(), 2);

    let system = messages[0]
        .get("content")
        .and_then(|v| v.get("text"))
        .and_then(|v| v.as_str())
        .expect("system text");
    assert!(system.contains("Asia/Seoul (KST, UTC+9)"));
    assert!(system.contains("'tomorrow/내일' = "));
    assert_eq!(
        messages[1]
            .get("content")
            .and_then(|v| v.get("text"))
            .and_then(|v| v.as_str()),
        Some(message)
    );

    let missing = send_request(
        &mut stdin,
        &mut stdout,
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": 42,
            "method": "prompts/get",
            "params": {"name": "default_prompt", "arguments": {}}
        }),
    )?;
    assert_eq!(
        missing
            .get("error")
            .and_then(|v| v.get("code"))
            .and_then(|v| v.as_i64()),
        Some(-32602)
    );

    let _ = child.kill();
    Ok(())
}
