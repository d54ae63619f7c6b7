//! One-time process-wide logging setup.
//!
//! Logs go to stderr (stdout carries the MCP stdio transport) and to a log
//! file. Chatty dependencies are held at `warn`.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{ArchitectError, ArchitectResult};

pub const DEFAULT_LOG_FILE: &str = "logs/server_debug.log";

/// Dependencies whose logs are suppressed below `warn`.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "reqwest", "rmcp"];

/// Build the filter from `RUST_LOG`, or `info` with dependency suppression
/// when it is unset or invalid.
pub fn build_filter() -> ArchitectResult<EnvFilter> {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())
}

fn filter_from(spec: Option<&str>) -> ArchitectResult<EnvFilter> {
    if let Some(filter) = spec
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
    {
        return Ok(filter);
    }

    let mut filter = EnvFilter::new("info");
    for target in QUIET_TARGETS {
        let directive = format!("{target}=warn")
            .parse::<Directive>()
            .map_err(|e| ArchitectError::InvalidConfig(format!("bad log directive: {e}")))?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

/// Open the log file for appending, creating parent directories.
pub fn open_log_file(path: &Path) -> ArchitectResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber. Must run once, before any pipeline runs.
pub fn init_logging(log_file: &Path) -> ArchitectResult<()> {
    let file = open_log_file(log_file)?;

    tracing_subscriber::registry()
        .with(build_filter()?)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|e| ArchitectError::InvalidConfig(format!("logging already initialized: {e}")))
}
