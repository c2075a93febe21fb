//! Generic boolean filter tree and its canonical printer.
//!
//! The same [`FilterQuery`] shape carries raw [`PartialTerm`](crate::term::PartialTerm)
//! leaves straight out of the parser and complete
//! [`FilterTerm`](crate::term::FilterTerm) leaves after promotion, so
//! negation, flattening and printing exist exactly once.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Negation flag carried by every leaf and every branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
}

impl Polarity {
    pub fn negated(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }

    pub fn is_negative(self) -> bool {
        self == Polarity::Negative
    }

    /// `-` for negative, empty otherwise.
    pub fn prefix(self) -> &'static str {
        match self {
            Polarity::Positive => "",
            Polarity::Negative => "-",
        }
    }
}

/// What a leaf payload must provide to live in a [`FilterQuery`].
///
/// The leaf owns its polarity: `FilterQuery::Term` has no flag of its own.
pub trait FilterLeaf: Clone + Eq + Hash + fmt::Display {
    fn polarity(&self) -> Polarity;

    /// The same leaf with its polarity flipped.
    fn negated(&self) -> Self;
}

/// Boolean tree over leaves of type `T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterQuery<T> {
    Term(T),
    And(Polarity, Vec<FilterQuery<T>>),
    Or(Polarity, Vec<FilterQuery<T>>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Combinator {
    And,
    Or,
}

impl Combinator {
    fn build<T>(self, polarity: Polarity, children: Vec<FilterQuery<T>>) -> FilterQuery<T> {
        match self {
            Combinator::And => FilterQuery::And(polarity, children),
            Combinator::Or => FilterQuery::Or(polarity, children),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Combinator::And => " ",
            Combinator::Or => " or ",
        }
    }
}

impl<T> FilterQuery<T> {
    pub fn term(leaf: T) -> Self {
        FilterQuery::Term(leaf)
    }

    /// Positive conjunction of `children`.
    pub fn and(children: Vec<FilterQuery<T>>) -> Self {
        FilterQuery::And(Polarity::Positive, children)
    }

    /// Positive disjunction of `children`.
    pub fn or(children: Vec<FilterQuery<T>>) -> Self {
        FilterQuery::Or(Polarity::Positive, children)
    }

    pub fn children(&self) -> &[FilterQuery<T>] {
        match self {
            FilterQuery::Term(_) => &[],
            FilterQuery::And(_, children) | FilterQuery::Or(_, children) => children,
        }
    }

    /// All leaves, left to right.
    pub fn leaves(&self) -> Vec<&T> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a T>) {
        match self {
            FilterQuery::Term(leaf) => leaves.push(leaf),
            FilterQuery::And(_, children) | FilterQuery::Or(_, children) => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Transforms every leaf, keeping the shape.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> FilterQuery<U> {
        self.map_inner(&mut f)
    }

    fn map_inner<U>(&self, f: &mut impl FnMut(&T) -> U) -> FilterQuery<U> {
        match self {
            FilterQuery::Term(leaf) => FilterQuery::Term(f(leaf)),
            FilterQuery::And(polarity, children) => FilterQuery::And(
                *polarity,
                children.iter().map(|child| child.map_inner(f)).collect(),
            ),
            FilterQuery::Or(polarity, children) => FilterQuery::Or(
                *polarity,
                children.iter().map(|child| child.map_inner(f)).collect(),
            ),
        }
    }

    /// Transforms every leaf, or returns `None` as soon as one leaf fails.
    /// There is no partially transformed result.
    pub fn try_map<U>(&self, mut f: impl FnMut(&T) -> Option<U>) -> Option<FilterQuery<U>> {
        self.try_map_inner(&mut f)
    }

    fn try_map_inner<U>(&self, f: &mut impl FnMut(&T) -> Option<U>) -> Option<FilterQuery<U>> {
        Some(match self {
            FilterQuery::Term(leaf) => FilterQuery::Term(f(leaf)?),
            FilterQuery::And(polarity, children) => FilterQuery::And(
                *polarity,
                children
                    .iter()
                    .map(|child| child.try_map_inner(f))
                    .collect::<Option<_>>()?,
            ),
            FilterQuery::Or(polarity, children) => FilterQuery::Or(
                *polarity,
                children
                    .iter()
                    .map(|child| child.try_map_inner(f))
                    .collect::<Option<_>>()?,
            ),
        })
    }
}

impl<T: FilterLeaf> FilterQuery<T> {
    pub fn polarity(&self) -> Polarity {
        match self {
            FilterQuery::Term(leaf) => leaf.polarity(),
            FilterQuery::And(polarity, _) | FilterQuery::Or(polarity, _) => *polarity,
        }
    }

    /// Flips the root polarity only. Children are untouched, so this is not
    /// a De Morgan rewrite.
    pub fn negated(self) -> Self {
        match self {
            FilterQuery::Term(leaf) => FilterQuery::Term(leaf.negated()),
            FilterQuery::And(polarity, children) => FilterQuery::And(polarity.negated(), children),
            FilterQuery::Or(polarity, children) => FilterQuery::Or(polarity.negated(), children),
        }
    }

    /// Normalized copy of this tree; see [`FilterQuery::into_flattened`].
    pub fn flattened(&self) -> Self {
        self.clone().into_flattened()
    }

    /// Removes single-child wrappers and splices positive children of the
    /// same combinator into their parent.
    ///
    /// Afterwards no branch has exactly one child and no branch has a
    /// positive child of its own kind. The denotation is unchanged.
    pub fn into_flattened(self) -> Self {
        match self {
            FilterQuery::Term(_) => self,
            FilterQuery::And(polarity, children) => {
                Self::flatten_branch(Combinator::And, polarity, children)
            }
            FilterQuery::Or(polarity, children) => {
                Self::flatten_branch(Combinator::Or, polarity, children)
            }
        }
    }

    fn flatten_branch(combinator: Combinator, polarity: Polarity, children: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children.into_iter().map(Self::into_flattened) {
            match child {
                FilterQuery::And(Polarity::Positive, nested) if combinator == Combinator::And => {
                    flat.extend(nested)
                }
                FilterQuery::Or(Polarity::Positive, nested) if combinator == Combinator::Or => {
                    flat.extend(nested)
                }
                other => flat.push(other),
            }
        }

        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return match polarity {
                    Polarity::Positive => only,
                    Polarity::Negative => only.negated(),
                };
            }
        }
        combinator.build(polarity, flat)
    }
}

impl<T: fmt::Display> FilterQuery<T> {
    /// Canonical query text, shared by the search box and the backend query.
    pub fn to_query_string(&self) -> String {
        self.to_string()
    }

    fn fmt_branch(
        f: &mut fmt::Formatter<'_>,
        combinator: Combinator,
        polarity: Polarity,
        children: &[Self],
    ) -> fmt::Result {
        if polarity.is_negative() {
            f.write_str("-(")?;
        }
        for (index, child) in children.iter().enumerate() {
            if index > 0 {
                f.write_str(combinator.separator())?;
            }
            match child {
                // `a b or c` reads as `(a b) or c`, so an Or inside an And
                // needs its own parentheses. Negative branches bring them.
                FilterQuery::Or(Polarity::Positive, _) if combinator == Combinator::And => {
                    write!(f, "({child})")?
                }
                _ => write!(f, "{child}")?,
            }
        }
        if polarity.is_negative() {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for FilterQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterQuery::Term(leaf) => write!(f, "{leaf}"),
            FilterQuery::And(polarity, children) => {
                Self::fmt_branch(f, Combinator::And, *polarity, children)
            }
            FilterQuery::Or(polarity, children) => {
                Self::fmt_branch(f, Combinator::Or, *polarity, children)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal leaf for exercising the tree on its own.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Leaf(Polarity, &'static str);

    impl fmt::Display for Leaf {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}{}", self.0.prefix(), self.1)
        }
    }

    impl FilterLeaf for Leaf {
        fn polarity(&self) -> Polarity {
            self.0
        }

        fn negated(&self) -> Self {
            Leaf(self.0.negated(), self.1)
        }
    }

    fn leaf(name: &'static str) -> FilterQuery<Leaf> {
        FilterQuery::Term(Leaf(Polarity::Positive, name))
    }

    fn not_leaf(name: &'static str) -> FilterQuery<Leaf> {
        FilterQuery::Term(Leaf(Polarity::Negative, name))
    }

    #[test]
    fn test_negated_flips_root_only() {
        let tree = FilterQuery::and(vec![leaf("a"), not_leaf("b")]);
        let negated = tree.clone().negated();
        assert_eq!(
            negated,
            FilterQuery::And(Polarity::Negative, vec![leaf("a"), not_leaf("b")])
        );
        assert_eq!(negated.negated(), tree);
        assert_eq!(leaf("a").negated(), not_leaf("a"));
    }

    #[test]
    fn test_flatten_splices_positive_same_kind() {
        let tree = FilterQuery::and(vec![
            leaf("a"),
            FilterQuery::and(vec![leaf("b"), FilterQuery::and(vec![leaf("c"), leaf("d")])]),
            FilterQuery::And(Polarity::Negative, vec![leaf("e"), leaf("f")]),
        ]);
        assert_eq!(
            tree.flattened(),
            FilterQuery::and(vec![
                leaf("a"),
                leaf("b"),
                leaf("c"),
                leaf("d"),
                FilterQuery::And(Polarity::Negative, vec![leaf("e"), leaf("f")]),
            ])
        );
    }

    #[test]
    fn test_flatten_collapses_single_children() {
        let tree = FilterQuery::or(vec![FilterQuery::and(vec![leaf("a")])]);
        assert_eq!(tree.flattened(), leaf("a"));

        let tree = FilterQuery::Or(Polarity::Negative, vec![FilterQuery::and(vec![leaf("a")])]);
        assert_eq!(tree.flattened(), not_leaf("a"));

        let tree = FilterQuery::Or(
            Polarity::Negative,
            vec![FilterQuery::and(vec![leaf("a"), leaf("b")])],
        );
        assert_eq!(
            tree.flattened(),
            FilterQuery::And(Polarity::Negative, vec![leaf("a"), leaf("b")])
        );
    }

    #[test]
    fn test_flatten_splices_after_collapse() {
        // the inner Or collapses into an And, which then joins its parent
        let tree = FilterQuery::and(vec![
            leaf("a"),
            FilterQuery::or(vec![FilterQuery::and(vec![leaf("b"), leaf("c")])]),
        ]);
        assert_eq!(
            tree.flattened(),
            FilterQuery::and(vec![leaf("a"), leaf("b"), leaf("c")])
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let trees = vec![
            FilterQuery::or(vec![
                FilterQuery::and(vec![leaf("a")]),
                FilterQuery::Or(Polarity::Negative, vec![leaf("b")]),
                FilterQuery::or(vec![leaf("c"), FilterQuery::and(vec![leaf("d"), leaf("e")])]),
            ]),
            FilterQuery::And(
                Polarity::Negative,
                vec![FilterQuery::And(Polarity::Negative, vec![leaf("x")])],
            ),
        ];
        for tree in trees {
            let once = tree.flattened();
            assert_eq!(once.flattened(), once);
        }
    }

    #[test]
    fn test_print_parenthesizes_or_inside_and() {
        let tree = FilterQuery::and(vec![
            leaf("a"),
            FilterQuery::or(vec![leaf("b"), leaf("c")]),
        ]);
        assert_eq!(tree.to_string(), "a (b or c)");

        let tree = FilterQuery::or(vec![
            FilterQuery::and(vec![leaf("a"), leaf("b")]),
            leaf("c"),
        ]);
        assert_eq!(tree.to_string(), "a b or c");
    }

    #[test]
    fn test_print_negative_branches() {
        let tree = FilterQuery::and(vec![
            FilterQuery::Or(Polarity::Negative, vec![leaf("red"), leaf("blue")]),
            leaf("creature"),
        ]);
        assert_eq!(tree.to_query_string(), "-(red or blue) creature");

        let tree = FilterQuery::And(Polarity::Negative, vec![leaf("a"), not_leaf("b")]);
        assert_eq!(tree.to_string(), "-(a -b)");
    }

    #[test]
    fn test_try_map_is_all_or_nothing() {
        let tree = FilterQuery::and(vec![leaf("a"), FilterQuery::or(vec![leaf("b"), leaf("c")])]);
        let upper = tree.try_map(|l| Some(l.1.to_uppercase())).unwrap();
        assert_eq!(upper.leaves(), vec!["A", "B", "C"]);

        let failed = tree.try_map(|l| (l.1 != "c").then(|| l.1.len()));
        assert_eq!(failed, None);
    }

    #[test]
    fn test_leaves_and_map() {
        let tree = FilterQuery::or(vec![leaf("a"), FilterQuery::and(vec![leaf("b"), not_leaf("c")])]);
        let names: Vec<_> = tree.leaves().iter().map(|l| l.1).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let lengths = tree.map(|l| l.1.len());
        assert_eq!(lengths.children().len(), 2);
    }

    #[test]
    fn test_polarity_serializes_lowercase() {
        let json = serde_json::to_string(&Polarity::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }
}
