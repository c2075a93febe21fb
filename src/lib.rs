//! # card_query
//!
//! A boolean query language for filtering a card catalog, built for a live
//! search box:
//!
//! ```text
//! color=red type:creature -is:foil (rarity:rare or rarity:mythic)
//! ```
//!
//! Adjacent clauses are ANDed, `or` separates alternatives, parentheses nest
//! and `-` negates a clause or a group. Each clause is a free-text name
//! (`bolt`, `!"Lightning Bolt"`), a `field<op>value` comparison
//! (`cmc>=3`, `name:"sol ring"`), or a `field<op>/regex/`.
//!
//! The pipeline is [`lexer`] → [`parser`] → [`term`] decoding → [`query`]
//! algebra and printing. Because input is edited one keystroke at a time,
//! every stage tolerates unfinished text: [`plausible_filter_ranges`] never
//! fails, and [`PartialTerm`] keeps open quotes and half-typed operators
//! around until the clause can be promoted to a complete [`FilterTerm`].
//!
//! ```
//! use card_query::{parse_complete_query, plausible_filter_ranges};
//!
//! let query = parse_complete_query("-(red or blue) creature").unwrap();
//! assert_eq!(query.to_string(), "-(red or blue) creature");
//!
//! let input = "(red or blue";
//! assert!(parse_complete_query(input).is_none());
//! let ranges: Vec<_> = plausible_filter_ranges(input)
//!     .iter()
//!     .map(|span| span.slice(input))
//!     .collect();
//! assert_eq!(ranges, ["red", "blue"]);
//! ```

pub mod ast;
pub mod config;
pub mod filter_type;
pub mod history;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod term;
pub mod token;

pub use filter_type::{filter_types, lookup as lookup_filter_type, FilterType};
pub use parser::{
    parse, parse_complete_query, parse_query, plausible_filter_ranges, ParseError,
};
pub use query::{FilterLeaf, FilterQuery, Polarity};
pub use term::{
    Comparison, FilterTerm, FilterTermKind, PartialComparison, PartialTerm, PartialTermKind,
    PartialValue, Validity,
};
pub use token::Span;
