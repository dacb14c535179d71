//! Process logging bootstrap.
//!
//! stdout carries protocol frames, so every log line goes to stderr.
//! Initialization happens at most once per process; `RUST_LOG` wins over the
//! level passed on the command line.

use flexi_logger::{Logger, LoggerHandle};
use log::info;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

pub fn init_logging(level: &str) -> Result<(), String> {
    let level = normalize_level(level)?;

    LOGGER
        .get_or_try_init(|| -> Result<LoggerHandle, String> {
            let handle = Logger::try_with_env_or_str(level)
                .map_err(|err| format!("invalid log level `{level}`: {err}"))?
                .log_to_stderr()
                .format(flexi_logger::detailed_format)
                .start()
                .map_err(|err| format!("failed to start logger: {err}"))?;

            info!(
                "event=app_start module=core status=ok platform={} version={} level={}",
                std::env::consts::OS,
                env!("CARGO_PKG_VERSION"),
                level
            );
            Ok(handle)
        })
        .map(|_| ())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_normalized() {
        assert_eq!(normalize_level(" WARNING "), Ok("warn"));
        assert_eq!(normalize_level("Info"), Ok("info"));
        assert!(normalize_level("loud").is_err());
    }
}
