//! Scoreboard selector commands: one random draw plus dispatch per offer slot.

use log::debug;
use trade_data::CatalogueDef;

use crate::allocator::{SectionRange, allocate_ranges};
use crate::{CommandTarget, CompileError, EmptySectionPolicy};

/// Emit `maximum_quantity` sample/dispatch pairs for each section, in catalogue order.
///
/// Each pair draws a uniform index from the section's range into the selection
/// objective and then runs the dispatch function that applies the drawn trade.
/// Sections with slots but no trades are handled according to `policy`.
pub fn selector_commands(
    catalogue: &CatalogueDef,
    target: &CommandTarget,
    policy: EmptySectionPolicy,
) -> Result<Vec<String>, CompileError> {
    let mut commands = Vec::new();

    for (section, range) in catalogue.sections.iter().zip(allocate_ranges(catalogue)) {
        if section.maximum_quantity == 0 {
            continue;
        }
        if range.is_empty() {
            match policy {
                EmptySectionPolicy::Skip => {
                    debug!("skipping {} slot(s) of empty section '{}'", section.maximum_quantity, section.name);
                    continue;
                },
                EmptySectionPolicy::Reject => {
                    return Err(CompileError::EmptySection {
                        section: section.name.clone(),
                    });
                },
                EmptySectionPolicy::Legacy => {},
            }
        }
        for _ in 0..section.maximum_quantity {
            commands.push(sample_command(target, &range));
            commands.push(dispatch_command(target));
        }
    }

    Ok(commands)
}

fn sample_command(target: &CommandTarget, range: &SectionRange<'_>) -> String {
    format!(
        "execute store result score {} {} run random value {}..{}",
        target.selector,
        target.objective,
        range.start,
        range.end()
    )
}

fn dispatch_command(target: &CommandTarget) -> String {
    format!("execute as {} run function {}", target.selector, target.dispatch_function)
}
