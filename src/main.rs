use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use serde_json::{Map, Value, json};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

mod config;
mod logging;
mod mcp;
mod store;
mod timepoint;
mod tools;

use config::DbConfig;
use store::{Connector, MySqlConnector, SqliteConnector};
use timepoint::TimePoint;
use tools::ToolContext;

#[derive(Parser)]
#[command(name = "smuchat-mcp")]
#[command(
    version,
    about = "MCP tools for SMU meals, notices, exams and schedules"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error, off); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct StoreArgs {
    /// Use an embedded SQLite database file instead of MySQL (DB_* variables)
    #[arg(long)]
    sqlite: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct MealsArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Date as YYYY-MM-DD
    #[arg(long)]
    date: String,
    /// breakfast, lunch or dinner
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Clone)]
struct ExamArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Part of the subject name
    #[arg(long)]
    subject: String,
    /// Part of the professor name
    #[arg(long)]
    professor: Option<String>,
}

#[derive(Args, Clone)]
struct ScheduleAddArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Start as "YYYY-MM-DD HH:MM" or "YYYY-MM-DD"
    #[arg(long)]
    start: String,
    /// Schedule text
    #[arg(long)]
    content: String,
    /// End, defaults to start
    #[arg(long)]
    end: Option<String>,
}

#[derive(Args, Clone)]
struct ScheduleDeleteArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    /// Delete every schedule whose content contains this text
    #[arg(long)]
    keyword: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print the current Asia/Seoul date and time
    Now {
        /// Output JSON structuredContent
        #[arg(long)]
        json: bool,
    },
    /// Look up meals by date and category
    Meals(MealsArgs),
    /// Look up exam information by subject
    Exam(ExamArgs),
    /// Save a schedule
    ScheduleAdd(ScheduleAddArgs),
    /// Delete schedules by content keyword
    ScheduleDelete(ScheduleDeleteArgs),
    /// Print the default prompt text for a message
    Prompt {
        /// Message appended after the generated instructions
        #[arg(long)]
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(logging::default_log_level());
    logging::init_logging(level).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Serve { stdio, store } => {
            if stdio {
                let ctx = ToolContext::new(open_store(&store)?);
                run_stdio_server(&ctx)
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::Now { json } => print_tool_result(tools::now_kr::call(&json!({})), json),
        Commands::Meals(args) => run_meals(args),
        Commands::Exam(args) => run_exam(args),
        Commands::ScheduleAdd(args) => run_schedule_add(args),
        Commands::ScheduleDelete(args) => run_schedule_delete(args),
        Commands::Prompt { message } => {
            println!("{}", mcp::prompts::system_text(&TimePoint::now()));
            println!();
            println!("{message}");
            Ok(())
        }
    }
}

/// Builds the row store once at startup; missing MySQL settings are fatal.
fn open_store(args: &StoreArgs) -> Result<Box<dyn Connector>> {
    if let Some(path) = &args.sqlite {
        let store = SqliteConnector::open(path)
            .with_context(|| format!("failed to open sqlite store at {}", path.display()))?;
        return Ok(Box::new(store));
    }

    let config = DbConfig::from_env().context("database configuration is incomplete")?;
    info!(
        "event=store_config module=core status=ok backend=mysql host={} port={} database={}",
        config.host, config.port, config.database
    );
    Ok(Box::new(MySqlConnector::new(&config)))
}

fn run_meals(args: MealsArgs) -> Result<()> {
    let ctx = ToolContext::new(open_store(&args.store)?);
    let mut map = Map::new();
    map.insert("date_iso".to_string(), json!(args.date));
    if let Some(category) = args.category {
        map.insert("category".to_string(), json!(category));
    }
    let result = tools::meals::call_by_date_category(&ctx, &Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_exam(args: ExamArgs) -> Result<()> {
    let ctx = ToolContext::new(open_store(&args.store)?);
    let mut map = Map::new();
    map.insert("keyword".to_string(), json!(args.subject));
    if let Some(professor) = args.professor {
        map.insert("professor".to_string(), json!(professor));
    }
    let result = tools::exam::call(&ctx, &Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_schedule_add(args: ScheduleAddArgs) -> Result<()> {
    let ctx = ToolContext::new(open_store(&args.store)?);
    let mut map = Map::new();
    map.insert("start_datetime".to_string(), json!(args.start));
    map.insert("content".to_string(), json!(args.content));
    if let Some(end) = args.end {
        map.insert("end_datetime".to_string(), json!(end));
    }
    let result = tools::schedule::call_insert(&ctx, &Value::Object(map));
    print_tool_result(result, args.json)
}

fn run_schedule_delete(args: ScheduleDeleteArgs) -> Result<()> {
    let ctx = ToolContext::new(open_store(&args.store)?);
    let args_value = json!({ "keyword": args.keyword });
    let result = tools::schedule::call_delete(&ctx, &args_value);
    print_tool_result(result, args.json)
}

/// Renders a tool result for the terminal. Error results fail the command
/// with the error kind and message; row results print one JSON row per line
/// unless `--json` asks for the whole structured payload.
fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let structured = &result["structuredContent"];
    if result["isError"].as_bool().unwrap_or(false) {
        let error = &structured["error"];
        anyhow::bail!(
            "{}: {}",
            error["kind"].as_str().unwrap_or(mcp::errors::OPERATION_ERROR),
            error["message"].as_str().unwrap_or("tool error")
        );
    }

    let mut out = io::stdout().lock();
    if json_output {
        writeln!(out, "{}", serde_json::to_string_pretty(structured)?)?;
    } else if let Some(rows) = structured["rows"].as_array() {
        for row in rows {
            writeln!(out, "{row}")?;
        }
        writeln!(out, "({} row(s))", rows.len())?;
    } else {
        writeln!(out, "{}", result["content"][0]["text"].as_str().unwrap_or_default())?;
    }
    Ok(())
}

fn run_stdio_server(ctx: &ToolContext) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = stdin.lock().lines();
    let mut writer = io::BufWriter::new(stdout.lock());

    info!(
        "event=server_start module=dispatch status=ok transport=stdio backend={}",
        ctx.store().dialect().as_str()
    );

    for line in reader {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let request: serde_json::Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                warn!("event=request_parse module=dispatch status=error error={err}");
                continue;
            }
        };

        let method = request.get("method").and_then(|value| value.as_str());
        let id = request.get("id").cloned();
        let response = match (method, id) {
            (Some("initialize"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": mcp::contracts::PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": {},
                        "prompts": {}
                    },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }
            })),
            (Some("ping"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {}
            })),
            (Some("tools/list"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "tools": mcp::tool_definitions()
                }
            })),
            (Some("tools/call"), Some(id)) => {
                let result = handle_tool_call(ctx, &request);
                Some(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result
                }))
            }
            (Some("prompts/list"), Some(id)) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "prompts": mcp::prompts::prompt_definitions()
                }
            })),
            (Some("prompts/get"), Some(id)) => Some(match handle_prompt_get(&request) {
                Ok(result) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result
                }),
                Err(message) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {
                        "code": -32602,
                        "message": message
                    }
                }),
            }),
            (method, _) => {
                debug!(
                    "event=request_skip module=dispatch status=ok method={}",
                    method.unwrap_or("<none>")
                );
                None
            }
        };

        if let Some(response) = response {
            let serialized =
                serde_json::to_string(&response).context("failed to serialize response")?;
            writeln!(writer, "{serialized}").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
    }

    info!("event=server_stop module=dispatch status=ok transport=stdio");
    Ok(())
}

fn handle_tool_call(ctx: &ToolContext, request: &serde_json::Value) -> serde_json::Value {
    let params = request.get("params");
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return tools::error_result(mcp::errors::INVALID_INPUT, "params must be an object", None);
    };

    let name = params.get("name").and_then(|value| value.as_str());
    let Some(name) = name else {
        return tools::error_result(
            mcp::errors::INVALID_INPUT,
            "params.name must be a string",
            None,
        );
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    let started_at = Instant::now();
    let result = dispatch_tool(ctx, name, &args);
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    let kind = result
        .get("structuredContent")
        .and_then(|value| value.get("error"))
        .and_then(|value| value.get("kind"))
        .and_then(|value| value.as_str());

    if is_error {
        warn!(
            "event=tool_call module=dispatch status=error tool={name} error_kind={} duration_ms={}",
            kind.unwrap_or("unknown"),
            started_at.elapsed().as_millis()
        );
    } else {
        info!(
            "event=tool_call module=dispatch status=ok tool={name} duration_ms={}",
            started_at.elapsed().as_millis()
        );
    }

    result
}

fn dispatch_tool(ctx: &ToolContext, name: &str, args: &Value) -> Value {
    use mcp::contracts as c;

    match name {
        c::TOOL_NOW_KR => tools::now_kr::call(args),
        c::TOOL_MEALS_BY_DATE_CATEGORY => tools::meals::call_by_date_category(ctx, args),
        c::TOOL_TODAY_LUNCH => tools::meals::call_today_lunch(ctx, args),
        c::TOOL_MEALS_BY_KEYWORD => tools::meals::call_by_keyword(ctx, args),
        c::TOOL_NOTICES_BY_KEYWORD => tools::notices::call(ctx, args),
        c::TOOL_EXAM_BY_SUBJECT => tools::exam::call(ctx, args),
        c::TOOL_SCHEDULE_BY_KEYWORD => tools::schedule::call_search(ctx, args),
        c::TOOL_CAMPUS_INFO => tools::campus_info::call(args),
        c::TOOL_INSERT_SCHEDULE => tools::schedule::call_insert(ctx, args),
        c::TOOL_DELETE_SCHEDULE => tools::schedule::call_delete(ctx, args),
        _ => tools::error_result(
            mcp::errors::INVALID_INPUT,
            format!("unknown tool: {name}"),
            Some(name),
        ),
    }
}

fn handle_prompt_get(request: &serde_json::Value) -> Result<serde_json::Value, String> {
    let params = request
        .get("params")
        .and_then(|value| value.as_object())
        .ok_or_else(|| "params must be an object".to_string())?;

    let name = params
        .get("name")
        .and_then(|value| value.as_str())
        .ok_or_else(|| "params.name must be a string".to_string())?;
    if name != mcp::contracts::PROMPT_DEFAULT {
        return Err(format!("unknown prompt: {name}"));
    }

    let message = params
        .get("arguments")
        .and_then(|value| value.get("message"))
        .and_then(|value| value.as_str())
        .ok_or_else(|| "arguments.message must be a string".to_string())?;

    Ok(mcp::prompts::default_prompt(&TimePoint::now(), message))
}
