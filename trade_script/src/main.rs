//! CLI entry point for trade_script.
//! Usage: cargo run -p trade_script -- compile trade_script/data/wandering_trader.toml

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};

use trade_data::validate_catalogue;
use trade_script::config::{AppConfig, ConfigSource, load_config};
use trade_script::logging::{format_duration, host_name, init_logging};
use trade_script::{
    EmptySectionPolicy, FileSink, allocate_ranges, compile_catalogue, degenerate_sections, export_commands,
    load_catalogue,
};

const TOOL: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(author, version, about = "Compile a wandering trader catalogue into datapack commands.")]
struct Cli {
    /// Tool configuration (output paths, command literals, logging).
    #[arg(long, global = true, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the catalogue and write both command files.
    Compile(CompileArgs),
    /// Validate the catalogue and report structural errors and degenerate sections.
    Check(CheckArgs),
    /// Print the global trade index range owned by each section.
    Ranges(RangesArgs),
}

#[derive(Args)]
struct CompileArgs {
    /// Catalogue file (TOML).
    catalogue: PathBuf,
    /// Override `output.scoreboard_commands_path`.
    #[arg(long, value_name = "FILE")]
    scoreboard_out: Option<PathBuf>,
    /// Override `output.trade_commands_path`.
    #[arg(long, value_name = "FILE")]
    trades_out: Option<PathBuf>,
    /// Override `commands.empty_sections`.
    #[arg(long, value_enum)]
    empty_sections: Option<EmptySectionPolicy>,
    /// Print both command sets to stdout instead of writing files.
    #[arg(long)]
    print: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// Catalogue file (TOML).
    catalogue: PathBuf,
    /// Exit with an error when any section is degenerate.
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Args)]
struct RangesArgs {
    /// Catalogue file (TOML).
    catalogue: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, source) = match load_config(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        },
    };
    match init_logging(&config.logging, TOOL) {
        Ok(Some(path)) => info!("Logging to {}", path.display()),
        Ok(None) => {},
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        },
    }

    info!(
        "Tool: {TOOL} | Version: {} | Host: {}",
        env!("CARGO_PKG_VERSION"),
        host_name()
    );
    if source == ConfigSource::Defaults {
        warn!("No config at '{}'; using defaults.", cli.config.display());
    }

    let start = Instant::now();
    let code = match run(cli.command, &config) {
        Ok(code) => {
            info!("Execution completed in {}.", format_duration(start.elapsed()));
            code
        },
        Err(e) => {
            error!("A fatal error has occurred: {e:#}");
            ExitCode::FAILURE
        },
    };
    log::logger().flush();
    code
}

fn run(command: Commands, config: &AppConfig) -> Result<ExitCode> {
    match command {
        Commands::Compile(args) => run_compile(&args, config),
        Commands::Check(args) => run_check(&args.catalogue, args.deny_warnings),
        Commands::Ranges(args) => run_ranges(&args.catalogue),
    }
}

fn run_compile(args: &CompileArgs, config: &AppConfig) -> Result<ExitCode> {
    let catalogue = load_catalogue(&args.catalogue)?;

    let mut options = config.compile_options();
    if let Some(policy) = args.empty_sections {
        options.empty_sections = policy;
    }
    let compiled = compile_catalogue(&catalogue, &options)
        .with_context(|| format!("compiling '{}'", args.catalogue.display()))?;

    if args.print {
        println!("# scoreboard commands");
        for line in &compiled.selector {
            println!("{line}");
        }
        println!("# trade commands");
        for line in &compiled.trades {
            println!("{line}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let scoreboard_path = args
        .scoreboard_out
        .clone()
        .unwrap_or_else(|| config.output.scoreboard_commands_path.clone());
    let trades_path = args
        .trades_out
        .clone()
        .unwrap_or_else(|| config.output.trade_commands_path.clone());
    export_commands(
        &compiled,
        &mut FileSink::new(&scoreboard_path),
        &mut FileSink::new(&trades_path),
    )
    .with_context(|| {
        format!(
            "writing '{}' and '{}'",
            scoreboard_path.display(),
            trades_path.display()
        )
    })?;

    Ok(ExitCode::SUCCESS)
}

fn run_check(path: &Path, deny_warnings: bool) -> Result<ExitCode> {
    let catalogue = load_catalogue(path)?;

    let errors = validate_catalogue(&catalogue);
    for err in &errors {
        eprintln!("{}: {err}", path.display());
    }
    let warnings = degenerate_sections(&catalogue);
    for warning in &warnings {
        eprintln!("{}: warning: {warning}", path.display());
    }

    if errors.is_empty() && warnings.is_empty() {
        eprintln!(
            "check: OK ({} section(s), {} trade(s), {} slot(s))",
            catalogue.sections.len(),
            catalogue.trade_count(),
            catalogue.slot_count()
        );
    }
    if !errors.is_empty() || (deny_warnings && !warnings.is_empty()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_ranges(path: &Path) -> Result<ExitCode> {
    let catalogue = load_catalogue(path)?;
    println!("{:>11}  {:>5}  section", "indices", "slots");
    for (section, range) in catalogue.sections.iter().zip(allocate_ranges(&catalogue)) {
        let span = if range.is_empty() {
            "-".to_string()
        } else {
            format!("{}..{}", range.start, range.end())
        };
        println!("{span:>11}  {:>5}  {}", section.maximum_quantity, section.name);
    }
    Ok(ExitCode::SUCCESS)
}
