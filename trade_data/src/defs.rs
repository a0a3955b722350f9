use serde::{Deserialize, Serialize};

/// Namespaced item identifier (e.g. `minecraft:emerald`), treated as opaque text.
pub type ItemId = String;

/// Complete trade catalogue, in authoring order.
///
/// Sections are stored as a list rather than a map: their order fixes the
/// global trade index shared by both generated command files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CatalogueDef {
    #[serde(default)]
    pub sections: Vec<SectionDef>,
}

/// A named group of trades that fills up to `maximum_quantity` offer slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDef {
    pub name: String,
    /// Reserved; the compiler does not read it.
    #[serde(default)]
    pub minimum_quantity: u32,
    pub maximum_quantity: u32,
    #[serde(default)]
    pub trades: Vec<TradeDef>,
}

/// One offer: pay `buy_quantity` of `buy_item`, receive `sell_quantity` of `sell_item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDef {
    pub buy_item: ItemId,
    pub buy_quantity: u32,
    pub sell_item: ItemId,
    pub sell_quantity: u32,
    pub price_multiplier: f64,
    pub max_uses: u32,
    /// Selection weight. Carried for forward compatibility; sampling is uniform.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl CatalogueDef {
    /// Parse a catalogue from its TOML form (`[[sections]]` tables with inline trades).
    ///
    /// ```
    /// use trade_data::CatalogueDef;
    ///
    /// let src = r#"
    /// [[sections]]
    /// name = "Buys"
    /// maximum_quantity = 1
    /// trades = [
    ///     { buy_item = "minecraft:feather", buy_quantity = 12, sell_item = "minecraft:emerald", sell_quantity = 1, price_multiplier = 0.05, max_uses = 4 },
    /// ]
    /// "#;
    /// let catalogue = CatalogueDef::from_toml_str(src).unwrap();
    /// assert_eq!(catalogue.trade_count(), 1);
    /// assert_eq!(catalogue.sections[0].trades[0].weight, 1);
    /// ```
    pub fn from_toml_str(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }

    /// Total number of trades across all sections.
    pub fn trade_count(&self) -> usize {
        self.sections.iter().map(|s| s.trades.len()).sum()
    }

    /// Total number of offer slots (sum of every section's `maximum_quantity`).
    pub fn slot_count(&self) -> u64 {
        self.sections.iter().map(|s| u64::from(s.maximum_quantity)).sum()
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Every trade paired with its owning section, in traversal order.
    pub fn iter_trades(&self) -> impl Iterator<Item = (&SectionDef, &TradeDef)> {
        self.sections
            .iter()
            .flat_map(|section| section.trades.iter().map(move |trade| (section, trade)))
    }
}

impl SectionDef {
    pub fn new(name: impl Into<String>, maximum_quantity: u32) -> Self {
        Self {
            name: name.into(),
            minimum_quantity: 0,
            maximum_quantity,
            trades: Vec::new(),
        }
    }

    /// Builder-style helper used by tests and programmatic catalogues.
    #[must_use]
    pub fn with_trade(mut self, trade: TradeDef) -> Self {
        self.trades.push(trade);
        self
    }
}

impl TradeDef {
    /// Trade with the default weight of 1.
    pub fn new(
        buy_item: impl Into<ItemId>,
        buy_quantity: u32,
        sell_item: impl Into<ItemId>,
        sell_quantity: u32,
        price_multiplier: f64,
        max_uses: u32,
    ) -> Self {
        Self {
            buy_item: buy_item.into(),
            buy_quantity,
            sell_item: sell_item.into(),
            sell_quantity,
            price_multiplier,
            max_uses,
            weight: default_weight(),
        }
    }
}
