//! Global trade index allocation.
//!
//! Every trade gets a 1-based index counted in section-then-trade order, and
//! every section owns the contiguous block of indices covering its trades.

use trade_data::CatalogueDef;

/// Inclusive block of global trade indices owned by one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRange<'a> {
    pub section: &'a str,
    pub start: usize,
    pub count: usize,
}

impl SectionRange<'_> {
    /// Last index in the block. For an empty section this is `start - 1`.
    pub fn end(&self) -> usize {
        self.start + self.count - 1
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end()
    }
}

/// Partition `[1, trade_count]` across sections in catalogue order.
///
/// Sections without trades still get a range (empty, starting at the current
/// cursor) so the result lines up one-to-one with `catalogue.sections`.
pub fn allocate_ranges(catalogue: &CatalogueDef) -> Vec<SectionRange<'_>> {
    let mut cursor = 1;
    catalogue
        .sections
        .iter()
        .map(|section| {
            let range = SectionRange {
                section: section.name.as_str(),
                start: cursor,
                count: section.trades.len(),
            };
            cursor += range.count;
            range
        })
        .collect()
}
