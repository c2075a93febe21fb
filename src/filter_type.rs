//! Static catalog of the fields a card query can filter on.
//!
//! The table is built once and never changes at runtime. The decoder uses it
//! to classify terms, and autocomplete reads it for field names and value
//! suggestions.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::term::Comparison;

#[derive(Debug, PartialEq, Eq)]
pub struct FilterType {
    /// Canonical field name.
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// The fixed set of accepted values, for fields that have one.
    pub values: Option<&'static [&'static str]>,
    /// Whether `<`, `<=`, `>` and `>=` apply.
    pub numeric: bool,
}

impl FilterType {
    /// Canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    pub fn supports(&self, comparison: Comparison) -> bool {
        self.numeric || !comparison.is_ordering()
    }

    /// True when the field has no fixed value set, or `value` is in it
    /// (ignoring ASCII case).
    pub fn accepts_value(&self, value: &str) -> bool {
        match self.values {
            None => true,
            Some(values) => values.iter().any(|v| v.eq_ignore_ascii_case(value)),
        }
    }

    /// Enumerated values starting with `prefix` (ignoring ASCII case).
    pub fn values_with_prefix<'p>(&self, prefix: &'p str) -> impl Iterator<Item = &'static str> + 'p {
        self.values
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(move |v| starts_with_ignore_case(v, prefix))
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

const RARITIES: &[&str] = &["common", "uncommon", "rare", "mythic", "special", "bonus"];

const FORMATS: &[&str] = &[
    "standard", "future", "historic", "timeless", "gladiator", "pioneer", "explorer",
    "modern", "legacy", "pauper", "vintage", "penny", "commander", "oathbreaker",
    "standardbrawl", "brawl", "alchemy", "paupercommander", "duel", "oldschool",
    "premodern", "predh",
];

const IS_VALUES: &[&str] = &[
    "foil", "nonfoil", "etched", "glossy", "full", "fullart", "promo", "reprint", "new",
    "digital", "reserved", "spell", "permanent", "historic", "vanilla", "frenchvanilla",
    "funny", "commander", "companion", "split", "flip", "transform", "mdfc", "dfc", "meld",
    "leveler", "token", "hires", "booster", "textless", "unique", "firstprint",
];

const BORDERS: &[&str] = &["black", "white", "borderless", "silver", "gold"];

const FRAMES: &[&str] = &[
    "1993", "1997", "2003", "2015", "future", "legendary", "colorshifted", "tombstone",
    "enchantment", "showcase", "extendedart", "etched",
];

const GAMES: &[&str] = &["paper", "arena", "mtgo"];

const LAYOUTS: &[&str] = &[
    "normal", "split", "flip", "transform", "modal_dfc", "meld", "leveler", "class", "case",
    "saga", "adventure", "mutate", "prototype", "battle", "planar", "scheme", "vanguard",
    "token", "double_faced_token", "emblem", "augment", "host", "art_series",
    "reversible_card",
];

static FILTER_TYPES: &[FilterType] = &[
    FilterType { name: "name", aliases: &["n"], values: None, numeric: false },
    FilterType { name: "color", aliases: &["c", "colors"], values: None, numeric: false },
    FilterType { name: "identity", aliases: &["id", "ci"], values: None, numeric: false },
    FilterType { name: "type", aliases: &["t"], values: None, numeric: false },
    FilterType { name: "oracle", aliases: &["o"], values: None, numeric: false },
    FilterType { name: "fulloracle", aliases: &["fo"], values: None, numeric: false },
    FilterType { name: "keyword", aliases: &["kw"], values: None, numeric: false },
    FilterType { name: "mana", aliases: &["m"], values: None, numeric: false },
    FilterType { name: "manavalue", aliases: &["mv", "cmc"], values: None, numeric: true },
    FilterType { name: "power", aliases: &["pow"], values: None, numeric: true },
    FilterType { name: "toughness", aliases: &["tou"], values: None, numeric: true },
    FilterType { name: "loyalty", aliases: &["loy"], values: None, numeric: true },
    FilterType { name: "rarity", aliases: &["r"], values: Some(RARITIES), numeric: true },
    FilterType { name: "set", aliases: &["s", "e", "edition"], values: None, numeric: false },
    FilterType { name: "number", aliases: &["cn"], values: None, numeric: true },
    FilterType { name: "format", aliases: &["f", "legal"], values: Some(FORMATS), numeric: false },
    FilterType { name: "banned", aliases: &[], values: Some(FORMATS), numeric: false },
    FilterType { name: "restricted", aliases: &[], values: Some(FORMATS), numeric: false },
    FilterType { name: "is", aliases: &["has"], values: Some(IS_VALUES), numeric: false },
    FilterType { name: "not", aliases: &[], values: Some(IS_VALUES), numeric: false },
    FilterType { name: "artist", aliases: &["a"], values: None, numeric: false },
    FilterType { name: "flavor", aliases: &["ft"], values: None, numeric: false },
    FilterType { name: "watermark", aliases: &["wm"], values: None, numeric: false },
    FilterType { name: "border", aliases: &[], values: Some(BORDERS), numeric: false },
    FilterType { name: "frame", aliases: &[], values: Some(FRAMES), numeric: false },
    FilterType { name: "game", aliases: &[], values: Some(GAMES), numeric: false },
    FilterType { name: "layout", aliases: &[], values: Some(LAYOUTS), numeric: false },
    FilterType { name: "year", aliases: &[], values: None, numeric: true },
    FilterType { name: "date", aliases: &[], values: None, numeric: true },
    FilterType { name: "usd", aliases: &[], values: None, numeric: true },
    FilterType { name: "eur", aliases: &[], values: None, numeric: true },
    FilterType { name: "tix", aliases: &[], values: None, numeric: true },
    FilterType { name: "language", aliases: &["lang"], values: None, numeric: false },
];

static BY_NAME: Lazy<HashMap<&'static str, &'static FilterType>> = Lazy::new(|| {
    FILTER_TYPES
        .iter()
        .flat_map(|filter_type| filter_type.names().map(move |name| (name, filter_type)))
        .collect()
});

/// Every known field, in display order.
pub fn filter_types() -> &'static [FilterType] {
    FILTER_TYPES
}

/// Finds a field by canonical name or alias, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<&'static FilterType> {
    if let Some(filter_type) = BY_NAME.get(name) {
        return Some(*filter_type);
    }
    BY_NAME.get(name.to_ascii_lowercase().as_str()).copied()
}
