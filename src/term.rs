//! Clause decoding: from one clause's raw text to a structured term.
//!
//! A clause is decoded in this order:
//!
//! 1. a leading `-` makes the term negative
//! 2. a leading `!` marks an exact name match; the rest is the name
//! 3. `<field><operator>` prefix, longest operator first
//!    (`<=`, `<`, `>=`, `>`, `!=`, `=`, `!`, `:`); the rest is the value
//! 4. otherwise the whole rest is a name
//!
//! Decoding never fails. Text that is still being typed (an open quote, a
//! lone `!` operator, an empty value) produces a [`PartialTerm`] that simply
//! does not [`complete`](PartialTerm::complete). Printing a partial term
//! gives back exactly the text it was decoded from, so callers can map cursor
//! offsets between the two.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter_type::{self, FilterType};
use crate::lexer::tokenize;
use crate::query::{FilterLeaf, Polarity};
use crate::token::{Span, TokenKind};

/// Field that a bare `/pattern/` clause matches against.
pub const NAME_FIELD: &str = "name";

/// Relational operator between a field and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = ":")]
    Contains,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Contains => ":",
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
        }
    }

    /// `<`, `<=`, `>` and `>=`, which only make sense on numeric fields.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Comparison::Less
                | Comparison::LessOrEqual
                | Comparison::Greater
                | Comparison::GreaterOrEqual
        )
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operator as typed so far. A lone `!` is on its way to `!=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartialComparison {
    Complete(Comparison),
    Incomplete,
}

impl PartialComparison {
    pub fn symbol(self) -> &'static str {
        match self {
            PartialComparison::Complete(comparison) => comparison.symbol(),
            PartialComparison::Incomplete => "!",
        }
    }
}

/// Operators in match order: longer spellings before their prefixes.
const OPERATORS: [(&str, PartialComparison); 8] = [
    ("<=", PartialComparison::Complete(Comparison::LessOrEqual)),
    ("<", PartialComparison::Complete(Comparison::Less)),
    (">=", PartialComparison::Complete(Comparison::GreaterOrEqual)),
    (">", PartialComparison::Complete(Comparison::Greater)),
    ("!=", PartialComparison::Complete(Comparison::NotEqual)),
    ("=", PartialComparison::Complete(Comparison::Equal)),
    ("!", PartialComparison::Incomplete),
    (":", PartialComparison::Complete(Comparison::Contains)),
];

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits `text` into `(field, operator, rest)` when it starts with a field
/// name directly followed by an operator.
fn split_filter_prefix(text: &str) -> Option<(&str, PartialComparison, &str)> {
    let field_len = text.find(|c: char| !is_field_char(c)).unwrap_or(text.len());
    if field_len == 0 {
        return None;
    }
    let (field, rest) = text.split_at(field_len);
    OPERATORS.iter().find_map(|(symbol, comparison)| {
        rest.strip_prefix(symbol)
            .map(|value| (field, *comparison, value))
    })
}

/// Opening/closing character of a quoted or regex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Single,
    Double,
    Slash,
}

impl Delimiter {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Delimiter::Single),
            '"' => Some(Delimiter::Double),
            '/' => Some(Delimiter::Slash),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Delimiter::Single => '\'',
            Delimiter::Double => '"',
            Delimiter::Slash => '/',
        }
    }
}

/// A value in one of its quoting states.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartialValue {
    Bare(String),
    /// Opening delimiter seen, closing one not typed yet.
    Unterminated(Delimiter, String),
    Balanced(Delimiter, String),
}

impl PartialValue {
    pub fn parse(text: &str) -> Self {
        let Some(delimiter) = text.chars().next().and_then(Delimiter::from_char) else {
            return PartialValue::Bare(text.to_string());
        };
        let body = &text[1..];
        match body.find(delimiter.as_char()) {
            None => PartialValue::Unterminated(delimiter, body.to_string()),
            Some(close) if close + 1 == body.len() => {
                PartialValue::Balanced(delimiter, body[..close].to_string())
            }
            // `"foo"bar`: the quotes do not enclose the whole value
            Some(_) => PartialValue::Bare(text.to_string()),
        }
    }

    /// The value without delimiters.
    pub fn content(&self) -> &str {
        match self {
            PartialValue::Bare(content)
            | PartialValue::Unterminated(_, content)
            | PartialValue::Balanced(_, content) => content,
        }
    }

    pub fn is_terminated(&self) -> bool {
        !matches!(self, PartialValue::Unterminated(..))
    }
}

impl fmt::Display for PartialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialValue::Bare(content) => f.write_str(content),
            PartialValue::Unterminated(delimiter, content) => {
                write!(f, "{}{}", delimiter.as_char(), content)
            }
            PartialValue::Balanced(delimiter, content) => {
                let d = delimiter.as_char();
                write!(f, "{d}{content}{d}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartialTermKind {
    Name {
        exact: bool,
        value: PartialValue,
    },
    Filter {
        field: String,
        comparison: PartialComparison,
        value: PartialValue,
    },
}

/// A clause as typed, possibly unfinished.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialTerm {
    pub polarity: Polarity,
    pub kind: PartialTermKind,
}

impl PartialTerm {
    /// Decodes one clause. Never fails.
    pub fn parse(text: &str) -> Self {
        let (polarity, rest) = match text.strip_prefix('-') {
            Some(rest) => (Polarity::Negative, rest),
            None => (Polarity::Positive, text),
        };

        let kind = if let Some(name) = rest.strip_prefix('!') {
            PartialTermKind::Name {
                exact: true,
                value: PartialValue::parse(name),
            }
        } else if let Some((field, comparison, value)) = split_filter_prefix(rest) {
            PartialTermKind::Filter {
                field: field.to_string(),
                comparison,
                value: PartialValue::parse(value),
            }
        } else {
            PartialTermKind::Name {
                exact: false,
                value: PartialValue::parse(rest),
            }
        };

        PartialTerm { polarity, kind }
    }

    pub fn value(&self) -> &PartialValue {
        match &self.kind {
            PartialTermKind::Name { value, .. } | PartialTermKind::Filter { value, .. } => value,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            PartialTermKind::Name { .. } => None,
            PartialTermKind::Filter { field, .. } => Some(field),
        }
    }

    /// Catalog entry for the field being typed, if it names a known field.
    pub fn filter_type(&self) -> Option<&'static FilterType> {
        self.field().and_then(filter_type::lookup)
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }

    /// Promotes to a complete term. Fails while a delimiter is open (also one
    /// inside a bare value that could not be quoted back, like `a"b'`), while
    /// the operator is a lone `!`, or when an unquoted value is empty.
    pub fn complete(&self) -> Option<FilterTerm> {
        let kind = match &self.kind {
            PartialTermKind::Name { exact, value } => match value {
                PartialValue::Unterminated(..) => return None,
                PartialValue::Bare(text) if text.is_empty() => return None,
                PartialValue::Bare(text) if has_both_quotes(text) && !reads_back_bare(text) => {
                    return None
                }
                PartialValue::Balanced(Delimiter::Slash, pattern) => {
                    if *exact {
                        return None;
                    }
                    FilterTermKind::Regex {
                        field: NAME_FIELD.to_string(),
                        comparison: Comparison::Contains,
                        pattern: pattern.clone(),
                    }
                }
                PartialValue::Bare(text) | PartialValue::Balanced(_, text) => {
                    FilterTermKind::Name {
                        exact: *exact,
                        text: text.clone(),
                    }
                }
            },
            PartialTermKind::Filter {
                field,
                comparison,
                value,
            } => {
                let PartialComparison::Complete(comparison) = *comparison else {
                    return None;
                };
                match value {
                    PartialValue::Unterminated(..) => return None,
                    PartialValue::Bare(text) if text.is_empty() => return None,
                    PartialValue::Bare(text) if has_both_quotes(text) && !reads_back_bare(text) => {
                        return None
                    }
                    PartialValue::Balanced(Delimiter::Slash, pattern) => FilterTermKind::Regex {
                        field: field.clone(),
                        comparison,
                        pattern: pattern.clone(),
                    },
                    PartialValue::Bare(text) | PartialValue::Balanced(_, text) => {
                        FilterTermKind::Basic {
                            field: field.clone(),
                            comparison,
                            value: text.clone(),
                        }
                    }
                }
            }
        };

        Some(FilterTerm {
            polarity: self.polarity,
            kind,
        })
    }
}

impl fmt::Display for PartialTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.polarity.prefix())?;
        match &self.kind {
            PartialTermKind::Name { exact, value } => {
                if *exact {
                    f.write_str("!")?;
                }
                write!(f, "{value}")
            }
            PartialTermKind::Filter {
                field,
                comparison,
                value,
            } => write!(f, "{field}{}{value}", comparison.symbol()),
        }
    }
}

impl FilterLeaf for PartialTerm {
    fn polarity(&self) -> Polarity {
        self.polarity
    }

    fn negated(&self) -> Self {
        PartialTerm {
            polarity: self.polarity.negated(),
            kind: self.kind.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterTermKind {
    /// Free text matched against the card name.
    Name { exact: bool, text: String },
    Basic {
        field: String,
        comparison: Comparison,
        value: String,
    },
    Regex {
        field: String,
        comparison: Comparison,
        pattern: String,
    },
}

/// A complete, executable leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterTerm {
    pub polarity: Polarity,
    #[serde(flatten)]
    pub kind: FilterTermKind,
}

/// How a term relates to the static filter catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validity {
    Valid,
    UnknownField,
    /// An ordering operator on a non-numeric field, or a regex on a numeric
    /// one.
    UnsupportedComparison,
    /// The field has a fixed set of values and this is not one of them.
    UnknownValue,
}

impl FilterTerm {
    pub fn name(text: impl Into<String>) -> Self {
        Self::positive(FilterTermKind::Name {
            exact: false,
            text: text.into(),
        })
    }

    pub fn exact_name(text: impl Into<String>) -> Self {
        Self::positive(FilterTermKind::Name {
            exact: true,
            text: text.into(),
        })
    }

    pub fn basic(field: impl Into<String>, comparison: Comparison, value: impl Into<String>) -> Self {
        Self::positive(FilterTermKind::Basic {
            field: field.into(),
            comparison,
            value: value.into(),
        })
    }

    pub fn regex(
        field: impl Into<String>,
        comparison: Comparison,
        pattern: impl Into<String>,
    ) -> Self {
        Self::positive(FilterTermKind::Regex {
            field: field.into(),
            comparison,
            pattern: pattern.into(),
        })
    }

    fn positive(kind: FilterTermKind) -> Self {
        FilterTerm {
            polarity: Polarity::Positive,
            kind,
        }
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            FilterTermKind::Name { .. } => None,
            FilterTermKind::Basic { field, .. } | FilterTermKind::Regex { field, .. } => {
                Some(field)
            }
        }
    }

    pub fn filter_type(&self) -> Option<&'static FilterType> {
        self.field().and_then(filter_type::lookup)
    }

    /// Checks the term against the static catalog. Name terms are always
    /// valid.
    pub fn validity(&self) -> Validity {
        let (comparison, value, is_regex) = match &self.kind {
            FilterTermKind::Name { .. } => return Validity::Valid,
            FilterTermKind::Basic {
                comparison, value, ..
            } => (*comparison, value.as_str(), false),
            FilterTermKind::Regex {
                comparison,
                pattern,
                ..
            } => (*comparison, pattern.as_str(), true),
        };
        let Some(filter_type) = self.filter_type() else {
            return Validity::UnknownField;
        };

        if is_regex {
            if filter_type.numeric || comparison.is_ordering() {
                return Validity::UnsupportedComparison;
            }
            return Validity::Valid;
        }
        if !filter_type.supports(comparison) {
            return Validity::UnsupportedComparison;
        }
        if !filter_type.accepts_value(value) {
            return Validity::UnknownValue;
        }
        Validity::Valid
    }

    /// Rewrites a known field alias (`c`, `t`, `mv`...) to its canonical
    /// name. Unknown fields are left alone.
    pub fn canonicalized(&self) -> Self {
        let mut term = self.clone();
        let canonical = self.filter_type().map(|filter_type| filter_type.name);
        if let (
            Some(canonical),
            FilterTermKind::Basic { field, .. } | FilterTermKind::Regex { field, .. },
        ) = (canonical, &mut term.kind)
        {
            *field = canonical.to_string();
        }
        term
    }
}

/// Text that survives lexing as part of a single clause without quotes.
fn is_bare_safe(text: &str) -> bool {
    !text.is_empty()
        && !text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '/' | '(' | ')'))
}

/// Text holding both quote characters cannot be quoted at all.
fn has_both_quotes(text: &str) -> bool {
    text.contains('"') && text.contains('\'')
}

/// True when `text` decodes as a bare value and lexes as one clause whose
/// quoted runs are all closed (`a"b'"`).
fn reads_back_bare(text: &str) -> bool {
    if PartialValue::parse(text) != PartialValue::Bare(text.to_string()) {
        return false;
    }
    // an open quote would swallow the trailing `)`
    let closed = format!("{text})");
    matches!(
        tokenize(&closed).as_slice(),
        [clause, close]
            if clause.kind == TokenKind::Verbatim
                && clause.span == Span::new(0, text.len())
                && close.kind == TokenKind::CloseParen
    )
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let quote = if text.contains('"') { '\'' } else { '"' };
    write!(f, "{quote}{text}{quote}")
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    // `<` followed by `=x` would read back as `<=` followed by `x`
    let bare = is_bare_safe(value) || (has_both_quotes(value) && reads_back_bare(value));
    if bare && !value.starts_with('=') {
        f.write_str(value)
    } else {
        write_quoted(f, value)
    }
}

fn write_name(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let bare = (is_bare_safe(text) || (has_both_quotes(text) && reads_back_bare(text)))
        && !text.starts_with(['-', '!'])
        && !text.eq_ignore_ascii_case("or")
        && split_filter_prefix(text).is_none();
    if bare {
        f.write_str(text)
    } else {
        write_quoted(f, text)
    }
}

impl fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.polarity.prefix())?;
        match &self.kind {
            FilterTermKind::Name { exact, text } => {
                if *exact {
                    f.write_str("!")?;
                }
                write_name(f, text)
            }
            FilterTermKind::Basic {
                field,
                comparison,
                value,
            } => {
                write!(f, "{field}{comparison}")?;
                write_value(f, value)
            }
            FilterTermKind::Regex {
                field,
                comparison,
                pattern,
            } => write!(f, "{field}{comparison}/{pattern}/"),
        }
    }
}

impl FilterLeaf for FilterTerm {
    fn polarity(&self) -> Polarity {
        self.polarity
    }

    fn negated(&self) -> Self {
        self.clone().with_polarity(self.polarity.negated())
    }
}
