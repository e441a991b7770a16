//! Observability: tracing init and JSONL audit log.
//!
//! Uses `config::ObservabilityConfig` for TAOBOOT_QUIET, TAOBOOT_LOG_LEVEL,
//! TAOBOOT_LOG_JSON and TAOBOOT_AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call once at process startup.
/// When TAOBOOT_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level: String = if cfg.quiet {
        "taoboot=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = crate::config::ObservabilityConfig::from_env().audit_log?;
    if path.is_empty() {
        return None;
    }
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

/// Audit: one image-assembly step completed (or was skipped via cache).
pub fn audit_build_step(step: &str, detail: &str, skipped: bool) {
    let Some(path) = get_audit_path() else {
        return;
    };
    append_jsonl(
        &path,
        &json!({
            "ts": Utc::now().to_rfc3339(),
            "event": "build_step",
            "step": step,
            "detail": detail,
            "skipped": skipped,
        }),
    );
}

/// Audit: the launch command was assembled. `argv` must already be redacted
/// by the caller; the credential never reaches this function.
pub fn audit_command_assembled(role: &str, argv: &[String]) {
    let Some(path) = get_audit_path() else {
        return;
    };
    append_jsonl(
        &path,
        &json!({
            "ts": Utc::now().to_rfc3339(),
            "event": "command_assembled",
            "role": role,
            "argv": argv,
        }),
    );
}
