//! Tool configuration (`config.toml`).
//!
//! Every table and key is optional; anything left out falls back to the
//! defaults below, and a missing file means "all defaults".

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{CommandTarget, CompileOptions, EmptySectionPolicy};

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub commands: CommandsConfig,
    pub logging: LoggingConfig,
}

/// Where the two command files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub scoreboard_commands_path: PathBuf,
    pub trade_commands_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            scoreboard_commands_path: PathBuf::from("scoreboard_commands.txt"),
            trade_commands_path: PathBuf::from("trade_commands.txt"),
        }
    }
}

/// Literals used in the generated commands and the empty-section policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    #[serde(flatten)]
    pub target: CommandTarget,
    pub empty_sections: EmptySectionPolicy,
}

/// Console and log-file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console_logging_level: String,
    pub file_logging_level: String,
    pub logs_file_path: PathBuf,
    pub use_logs_folder: bool,
    pub number_of_logs_to_keep: Option<usize>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_logging_level: "info".to_string(),
            file_logging_level: "debug".to_string(),
            logs_file_path: PathBuf::from("logs"),
            use_logs_folder: true,
            number_of_logs_to_keep: Some(10),
        }
    }
}

impl LoggingConfig {
    pub fn console_level(&self) -> Result<LevelFilter> {
        parse_level(&self.console_logging_level)
    }

    pub fn file_level(&self) -> Result<LevelFilter> {
        parse_level(&self.file_logging_level)
    }
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim()).map_err(|_| anyhow!("unknown log level '{level}'"))
}

impl AppConfig {
    pub fn parse(src: &str) -> Result<Self> {
        toml::from_str(src).context("parsing configuration")
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            target: self.commands.target.clone(),
            empty_sections: self.commands.empty_sections,
        }
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

/// Load `config.toml` from `path`, falling back to defaults if the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<(AppConfig, ConfigSource)> {
    if !path.exists() {
        return Ok((AppConfig::default(), ConfigSource::Defaults));
    }
    let src = fs::read_to_string(path).with_context(|| format!("reading config from '{}'", path.display()))?;
    let config = AppConfig::parse(&src).with_context(|| format!("loading config from '{}'", path.display()))?;
    Ok((config, ConfigSource::File))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::parse("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.commands.target.objective, "RandomsWanderingTraders");
        assert_eq!(config.logging.console_level().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = AppConfig::parse(
            r#"
[output]
trade_commands_path = "data/traders/function/add_trade.mcfunction"

[commands]
objective = "TraderPick"
empty_sections = "legacy"

[logging]
console_logging_level = "WARN"
use_logs_folder = false
"#,
        )
        .expect("parse");

        assert_eq!(
            config.output.trade_commands_path,
            PathBuf::from("data/traders/function/add_trade.mcfunction")
        );
        assert_eq!(config.output.scoreboard_commands_path, PathBuf::from("scoreboard_commands.txt"));
        assert_eq!(config.commands.target.objective, "TraderPick");
        assert_eq!(config.commands.target.selector, "@s");
        assert_eq!(config.commands.empty_sections, EmptySectionPolicy::Legacy);
        assert_eq!(config.logging.console_level().unwrap(), LevelFilter::Warn);
        assert!(!config.logging.use_logs_folder);

        let options = config.compile_options();
        assert_eq!(options.target.objective, "TraderPick");
        assert_eq!(options.empty_sections, EmptySectionPolicy::Legacy);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(AppConfig::parse("[commands]\nempty_sections = \"sometimes\"\n").is_err());
    }

    #[test]
    fn bad_level_is_reported() {
        let logging = LoggingConfig {
            file_logging_level: "loud".into(),
            ..LoggingConfig::default()
        };
        let err = logging.file_level().expect_err("bad level");
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (config, source) = load_config(&dir.path().join("config.toml")).expect("load");
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn existing_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[commands]\nselector = \"@e[type=wandering_trader]\"\n").expect("write");
        let (config, source) = load_config(&path).expect("load");
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.commands.target.selector, "@e[type=wandering_trader]");
    }
}
