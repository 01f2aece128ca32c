//! Observability: tracing init and the JSONL launch log.
//!
//! Uses config::ObservabilityConfig for DEVBOOT_QUIET, DEVBOOT_LOG_LEVEL,
//! DEVBOOT_LOG_JSON and DEVBOOT_LAUNCH_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize tracing. Call at process startup.
/// When DEVBOOT_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level: String = if cfg.quiet {
        "devboot=warn,devboot_runtime=warn,devboot_core=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // Logs go to stderr; stdout carries the report.
    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn launch_log_path() -> Option<&'static str> {
    let path = crate::config::ObservabilityConfig::from_env()
        .launch_log
        .as_deref()?;
    if let Some(parent) = Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    Some(path)
}

fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Launch log record for one bootstrap step, written to `path`.
pub fn write_step(path: &Path, step: &str, ok: bool, detail: serde_json::Value) {
    let record = json!({
        "ts": now(),
        "event": "step",
        "step": step,
        "ok": ok,
        "detail": detail,
    });
    append_jsonl(path, &record);
}

/// Launch log: a bootstrap step finished (venv, deps, activate).
pub fn log_step(step: &str, ok: bool, detail: serde_json::Value) {
    if let Some(path) = launch_log_path() {
        write_step(Path::new(path), step, ok, detail);
    }
}

/// Launch log: a child process was spawned (or failed to spawn).
pub fn log_launch(name: &str, command_line: &str, pid: Option<u32>, error: Option<&str>) {
    if let Some(path) = launch_log_path() {
        let record = json!({
            "ts": now(),
            "event": "launch",
            "name": name,
            "command": command_line,
            "pid": pid,
            "error": error,
            "ok": error.is_none(),
        });
        append_jsonl(Path::new(path), &record);
    }
}
