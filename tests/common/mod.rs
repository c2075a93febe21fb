#![allow(dead_code)]
//! Shared helpers for `card_query` integration tests.

use card_query::*;

/// Queries that parse and promote completely.
pub const COMPLETE_QUERIES: &[&str] = &[
    "color:red",
    "color=red type:creature -is:foil (rarity:rare or rarity:mythic)",
    "-(red or blue) creature",
    r#"name:"lightning bolt""#,
    "name:'say \"hi\"'",
    "-type:creature",
    "a or b or c",
    "a (b or (c or d)) e",
    "-(-(a b) or -c)",
    "((((x))))",
    "-(x)",
    "cmc>=3 pow<2 tou<=4 loy>1 usd!=0 year=2020",
    "o:/draw (a|two) cards?/ -o:/discard/",
    "/^goblin/",
    r#"!"Sol Ring" or !Opt"#,
    r#"flavor:"" n:''"#,
    r#""or" "-foo" "t:elf""#,
    "(a)(b or c)",
    "x:=y cmc<\"=3\"",
    "ñame:café \"über alles\"",
    "  (  spaced  or  out  )  ",
    r#"x:a"b'""#,
    r#"a"b'""#,
];

/// Inputs that are mid-edit or malformed.
pub const BROKEN_QUERIES: &[&str] = &[
    "",
    "(",
    ")",
    "-(",
    "or",
    "red or",
    "(red or blue",
    "red) blue",
    "()",
    "(()",
    "a or or b",
    ")(",
    "-",
    "'",
    "\"",
    "/",
    "foo:\"bar",
    "foo:/ba",
    "foo!",
    "cmc>=",
    "x -( y",
    "((((((((((",
    "))))))))))",
    r#"x:a"b' y"#,
];

pub fn complete(input: &str) -> FilterQuery<FilterTerm> {
    parse_complete_query(input).unwrap_or_else(|| panic!("expected complete query: {input:?}"))
}

pub fn range_texts(input: &str) -> Vec<&str> {
    plausible_filter_ranges(input)
        .iter()
        .map(|span| span.slice(input))
        .collect()
}

/// Every subtree of `query`, root first.
pub fn subtrees<T: Clone>(query: &FilterQuery<T>) -> Vec<FilterQuery<T>> {
    let mut out = vec![query.clone()];
    for child in query.children() {
        out.extend(subtrees(child));
    }
    out
}
