//! Logging setup: `env_logger` on the console plus an optional log file,
//! joined with a `fern` dispatch.
//!
//! The console honours `RUST_LOG` when set and otherwise uses the configured
//! level. The log file gets its own level so a quiet console can still leave a
//! full debug trace behind.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use log::{LevelFilter, Log};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::config::LoggingConfig;

/// Install the global logger. Returns the log file path when file logging is active.
///
/// # Errors
/// Fails on an unknown level name, if the log directory or file cannot be
/// created, or if a logger is already installed.
pub fn init_logging(config: &LoggingConfig, tool: &str) -> Result<Option<PathBuf>> {
    let console_level = config.console_level()?;
    let file_level = config.file_level()?;

    let console = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(console_level.as_str()))
        .build();
    let mut dispatch = fern::Dispatch::new().chain(
        fern::Dispatch::new()
            .level(console.filter())
            .chain(Box::new(console) as Box<dyn Log>),
    );

    let mut path = None;
    if file_level != LevelFilter::Off {
        let (file, file_path) = open_log_file(config, tool, &host_name(), now())?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(file_level)
                .format(|out, message, record| {
                    let stamp = now()
                        .format(format_description!(
                            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
                        ))
                        .unwrap_or_default();
                    out.finish(format_args!("{stamp} {} [{}]: {message}", record.level(), record.target()));
                })
                .chain(file),
        );
        path = Some(file_path);
    }

    dispatch.apply().context("installing logger")?;
    Ok(path)
}

/// Name of this machine, as recorded in log file names and the startup line.
pub fn host_name() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

/// Prune old logs, then open (append) this run's log file.
fn open_log_file(config: &LoggingConfig, tool: &str, host: &str, at: OffsetDateTime) -> Result<(File, PathBuf)> {
    let path = log_file_path(config, tool, host, at)?;
    if config.use_logs_folder
        && let (Some(keep), Some(dir)) = (config.number_of_logs_to_keep, path.parent())
    {
        prune_logs(dir, keep).with_context(|| format!("pruning old logs in '{}'", dir.display()))?;
    }
    let file = fern::log_file(&path).with_context(|| format!("opening log file '{}'", path.display()))?;
    Ok((file, path))
}

/// `<logs>/<tool>/<timestamp>_<tool>_<host>.log` with a logs folder, `<tool>_<host>.log` without.
fn log_file_path(config: &LoggingConfig, tool: &str, host: &str, at: OffsetDateTime) -> Result<PathBuf> {
    if !config.use_logs_folder {
        return Ok(PathBuf::from(format!("{tool}_{host}.log")));
    }
    let dir = config.logs_file_path.join(tool);
    fs::create_dir_all(&dir).with_context(|| format!("creating log directory '{}'", dir.display()))?;
    let stamp = at
        .format(format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]"))
        .context("formatting log file timestamp")?;
    Ok(dir.join(format!("{stamp}_{tool}_{host}.log")))
}

/// Delete the oldest `*.log` files in `dir` until at most `keep` remain.
fn prune_logs(dir: &Path, keep: usize) -> std::io::Result<usize> {
    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "log") {
            let modified = entry.metadata()?.modified()?;
            logs.push((modified, path));
        }
    }
    if logs.len() <= keep {
        return Ok(0);
    }
    logs.sort();
    let excess = logs.len() - keep;
    for (_, path) in logs.iter().take(excess) {
        fs::remove_file(path)?;
    }
    Ok(excess)
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Render a run duration using its two largest non-zero units, e.g. `1m5s` or `12ms`.
///
/// Sub-millisecond units are dropped once the duration reaches a second, and
/// milliseconds are dropped once it reaches a minute.
pub fn format_duration(duration: Duration) -> String {
    const UNITS: [(&str, u128); 9] = [
        ("y", 365 * 24 * 60 * 60 * 1_000_000_000),
        ("mo", 30 * 24 * 60 * 60 * 1_000_000_000),
        ("d", 24 * 60 * 60 * 1_000_000_000),
        ("h", 60 * 60 * 1_000_000_000),
        ("m", 60 * 1_000_000_000),
        ("s", 1_000_000_000),
        ("ms", 1_000_000),
        ("us", 1_000),
        ("ns", 1),
    ];

    let total = duration.as_nanos();
    let mut rest = total;
    let mut parts = Vec::new();
    for (name, factor) in UNITS {
        if parts.len() == 2 {
            break;
        }
        if (total >= 1_000_000_000 && factor < 1_000_000) || (total >= 60_000_000_000 && factor < 1_000_000_000) {
            break;
        }
        let value = rest / factor;
        rest %= factor;
        if value > 0 {
            parts.push(format!("{value}{name}"));
        }
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.concat()
    }
}
