//! trade_script: compiler from a wandering trader catalogue to datapack commands.
//!
//! A catalogue is an ordered list of sections, each holding trades and a number
//! of offer slots. Compilation produces two command files that must agree on a
//! single global trade numbering:
//!
//! - the scoreboard file draws `maximum_quantity` random indices per section,
//!   each from that section's contiguous index range, and runs a dispatch
//!   function after every draw;
//! - the trade file holds one guarded insertion per trade, which adds the offer
//!   only when the drawn index matches and the same buy/sell pair is not already
//!   present.
//!
//! Both are pure functions of the catalogue; nothing is written until both have
//! compiled successfully.

pub mod allocator;
pub mod config;
pub mod logging;
pub mod offers;
pub mod selector;
pub mod sink;

pub use allocator::{SectionRange, allocate_ranges};
pub use offers::{OfferKey, OfferValue, offer_key_json, offer_value_json, trade_commands};
pub use selector::selector_commands;
pub use sink::{CommandSink, FileSink, MemorySink};

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trade_data::{CatalogueDef, ValidationError, validate_catalogue};

/// Names baked into the generated commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTarget {
    /// Entity selector the commands run against.
    pub selector: String,
    /// Scoreboard objective holding the drawn trade index.
    pub objective: String,
    /// Function run after each draw; it applies the trade file.
    pub dispatch_function: String,
    /// NBT path of the entity's recipe list.
    pub offers_path: String,
}

impl Default for CommandTarget {
    fn default() -> Self {
        Self {
            selector: "@s".to_string(),
            objective: "RandomsWanderingTraders".to_string(),
            dispatch_function: "randoms_wandering_traders:add_scoreboard_based_trade".to_string(),
            offers_path: "Offers.Recipes".to_string(),
        }
    }
}

/// What to do with a section that has offer slots but no trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmptySectionPolicy {
    /// Emit nothing for the section and report a warning.
    #[default]
    Skip,
    /// Emit draws over the inverted range `start..start-1`, as older output did.
    Legacy,
    /// Fail the whole compilation.
    Reject,
}

/// Options for a single compilation pass.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub target: CommandTarget,
    pub empty_sections: EmptySectionPolicy,
}

/// Errors that abort compilation. Nothing is emitted when one occurs.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The catalogue failed structural validation.
    #[error("catalogue has {} structural error(s):\n{}", .0.len(), list_errors(.0))]
    Structural(Vec<ValidationError>),
    /// A section has offer slots but no trades and the policy is `reject`.
    #[error("section '{section}' has offer slots but no trades")]
    EmptySection { section: String },
    /// Canonical offer JSON could not be produced.
    #[error("failed to serialize offer: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn list_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n")
}

/// Non-fatal findings reported alongside the compiled commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// Slots but no trades: the draws have nothing to pick from.
    EmptyRange { section: String, slots: u32 },
    /// Trades but no slots: the trades are compiled but never drawn.
    NoSlots { section: String, trades: usize },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::EmptyRange { section, slots } => {
                write!(f, "section '{section}' has {slots} slot(s) but no trades")
            },
            CompileWarning::NoSlots { section, trades } => {
                write!(f, "section '{section}' has {trades} trade(s) but maximum_quantity is 0")
            },
        }
    }
}

/// Both command files plus any warnings raised while producing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCommands {
    /// Random draw / dispatch pairs.
    pub selector: Vec<String>,
    /// Guarded offer insertions.
    pub trades: Vec<String>,
    pub warnings: Vec<CompileWarning>,
}

/// Read and parse a TOML catalogue file.
///
/// # Errors
/// Fails if the file cannot be read or a section/trade is missing a required field.
pub fn load_catalogue(path: &Path) -> anyhow::Result<CatalogueDef> {
    let src = fs::read_to_string(path).with_context(|| format!("reading catalogue '{}'", path.display()))?;
    let catalogue =
        CatalogueDef::from_toml_str(&src).with_context(|| format!("parsing catalogue '{}'", path.display()))?;
    info!(
        "{} section(s) with {} trade(s) loaded from '{}'",
        catalogue.sections.len(),
        catalogue.trade_count(),
        path.display()
    );
    Ok(catalogue)
}

/// Report sections whose slot count and trade count disagree about being empty.
pub fn degenerate_sections(catalogue: &CatalogueDef) -> Vec<CompileWarning> {
    catalogue
        .sections
        .iter()
        .filter_map(|section| match (section.maximum_quantity, section.trades.len()) {
            (0, 0) => None,
            (slots, 0) => Some(CompileWarning::EmptyRange {
                section: section.name.clone(),
                slots,
            }),
            (0, trades) => Some(CompileWarning::NoSlots {
                section: section.name.clone(),
                trades,
            }),
            _ => None,
        })
        .collect()
}

/// Validate the catalogue and compile both command files.
///
/// ```
/// use trade_data::{CatalogueDef, SectionDef, TradeDef};
/// use trade_script::{CompileOptions, compile_catalogue};
///
/// let catalogue = CatalogueDef {
///     sections: vec![SectionDef::new("Buys", 1).with_trade(TradeDef::new(
///         "minecraft:feather",
///         12,
///         "minecraft:emerald",
///         1,
///         0.05,
///         4,
///     ))],
/// };
/// let compiled = compile_catalogue(&catalogue, &CompileOptions::default()).unwrap();
/// assert_eq!(compiled.selector.len(), 2);
/// assert_eq!(compiled.trades.len(), 1);
/// ```
pub fn compile_catalogue(catalogue: &CatalogueDef, options: &CompileOptions) -> Result<CompiledCommands, CompileError> {
    let errors = validate_catalogue(catalogue);
    if !errors.is_empty() {
        return Err(CompileError::Structural(errors));
    }

    let warnings = degenerate_sections(catalogue);
    for warning in &warnings {
        warn!("{warning}");
    }

    let selector = selector_commands(catalogue, &options.target, options.empty_sections)?;
    let trades = trade_commands(catalogue, &options.target)?;

    info!(
        "compiled {} section(s): {} selector command(s), {} trade command(s)",
        catalogue.sections.len(),
        selector.len(),
        trades.len()
    );
    for line in &selector {
        debug!("selector: {line}");
    }
    for line in &trades {
        debug!("trade: {line}");
    }

    Ok(CompiledCommands {
        selector,
        trades,
        warnings,
    })
}

/// Hand each compiled command set to its sink.
///
/// Both sets are staged before either is committed. If staging either one
/// fails, the other stage is discarded and both sinks keep their previous
/// output, so the two files never disagree on trade numbering.
pub fn export_commands(
    compiled: &CompiledCommands,
    selector_sink: &mut impl CommandSink,
    trade_sink: &mut impl CommandSink,
) -> std::io::Result<()> {
    selector_sink.stage(&compiled.selector)?;
    if let Err(err) = trade_sink.stage(&compiled.trades) {
        selector_sink.discard();
        return Err(err);
    }
    if let Err(err) = selector_sink.commit() {
        trade_sink.discard();
        return Err(err);
    }
    trade_sink.commit()
}
