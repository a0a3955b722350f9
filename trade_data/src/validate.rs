use std::collections::HashMap;
use std::fmt;

use crate::*;

/// Structural problem found in a `CatalogueDef`.
///
/// Positions are 1-based and follow catalogue order, so they can be matched
/// against the authored file directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateSection { name: String, position: usize, first: usize },
    MissingValue { context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateSection { name, position, first } => {
                write!(f, "duplicate section '{name}' at #{position} (first defined at #{first})")
            },
            ValidationError::MissingValue { context } => {
                write!(f, "missing value ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check every section and trade for structurally invalid data.
///
/// Item identifiers are not checked against any registry; only blank ids are
/// reported.
///
/// ```
/// use trade_data::{CatalogueDef, SectionDef, TradeDef, validate_catalogue};
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
/// assert!(validate_catalogue(&catalogue).is_empty());
/// ```
pub fn validate_catalogue(catalogue: &CatalogueDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (s_idx, section) in catalogue.sections.iter().enumerate() {
        let position = s_idx + 1;
        if section.name.trim().is_empty() {
            errors.push(ValidationError::MissingValue {
                context: format!("section #{position}: name is empty"),
            });
        } else if let Some(first) = seen.get(section.name.as_str()) {
            errors.push(ValidationError::DuplicateSection {
                name: section.name.clone(),
                position,
                first: *first,
            });
        } else {
            seen.insert(section.name.as_str(), position);
        }

        for (t_idx, trade) in section.trades.iter().enumerate() {
            let context = format!("section '{}' (#{position}) trade #{}", section.name, t_idx + 1);
            validate_trade(trade, &context, &mut errors);
        }
    }

    errors
}

fn validate_trade(trade: &TradeDef, context: &str, errors: &mut Vec<ValidationError>) {
    check_item("buy_item", &trade.buy_item, context, errors);
    check_item("sell_item", &trade.sell_item, context, errors);
    check_positive("buy_quantity", trade.buy_quantity, context, errors);
    check_positive("sell_quantity", trade.sell_quantity, context, errors);
    check_positive("max_uses", trade.max_uses, context, errors);
    check_positive("weight", trade.weight, context, errors);

    if !trade.price_multiplier.is_finite() || trade.price_multiplier < 0.0 {
        errors.push(ValidationError::InvalidValue {
            context: format!("{context}: price_multiplier must be >= 0 ({})", trade.price_multiplier),
        });
    }
}

fn check_item(field: &str, id: &str, context: &str, errors: &mut Vec<ValidationError>) {
    if id.trim().is_empty() {
        errors.push(ValidationError::MissingValue {
            context: format!("{context}: {field} is empty"),
        });
    }
}

fn check_positive(field: &str, value: u32, context: &str, errors: &mut Vec<ValidationError>) {
    if value == 0 {
        errors.push(ValidationError::InvalidValue {
            context: format!("{context}: {field} must be positive"),
        });
    }
}
