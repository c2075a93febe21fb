//! 语法分析器产生的原始语法树
//!
//! 叶子节点是源文本中的 span，由解码器转换为 term（见 [`Disjunction::to_query`]）

use crate::query::{FilterQuery, Polarity};
use crate::term::PartialTerm;
use crate::token::Span;

/// 查询的根节点：由 `or` 分隔的若干 Conjunction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disjunction(pub Vec<Conjunction>);

/// 相邻的子句，隐式以 AND 连接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunction(pub Vec<Clause>);

/// 可加括号的最小单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// 单个过滤条件，仍是原文。span 内开头的 `-` 留给解码器处理
    Filter(Span),
    /// 括号分组，写作 `-( ... )` 时为否定
    Disjunction(Polarity, Disjunction),
}

impl Disjunction {
    /// 把每个叶子解码为 [`PartialTerm`]，保留书写时的树形。
    /// 调用 [`FilterQuery::flattened`] 进行规范化
    pub fn to_query(&self, source: &str) -> FilterQuery<PartialTerm> {
        self.to_query_with(Polarity::Positive, source)
    }

    fn to_query_with(&self, polarity: Polarity, source: &str) -> FilterQuery<PartialTerm> {
        let children = self
            .0
            .iter()
            .map(|conjunction| conjunction.to_query(source))
            .collect();
        FilterQuery::Or(polarity, children)
    }
}

impl Conjunction {
    fn to_query(&self, source: &str) -> FilterQuery<PartialTerm> {
        let children = self
            .0
            .iter()
            .map(|clause| match clause {
                Clause::Filter(span) => FilterQuery::Term(PartialTerm::parse(span.slice(source))),
                Clause::Disjunction(polarity, nested) => nested.to_query_with(*polarity, source),
            })
            .collect();
        FilterQuery::And(Polarity::Positive, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_query_decodes_nested_groups() {
        let source = "a (b or -(c d)) e";
        let tree = Disjunction(vec![Conjunction(vec![
            Clause::Filter(Span::new(0, 1)),
            Clause::Disjunction(
                Polarity::Positive,
                Disjunction(vec![
                    Conjunction(vec![Clause::Filter(Span::new(3, 4))]),
                    Conjunction(vec![Clause::Disjunction(
                        Polarity::Negative,
                        Disjunction(vec![Conjunction(vec![
                            Clause::Filter(Span::new(10, 11)),
                            Clause::Filter(Span::new(12, 13)),
                        ])]),
                    )]),
                ]),
            ),
            Clause::Filter(Span::new(16, 17)),
        ])]);

        let query = tree.to_query(source);
        let leaves: Vec<_> = query.leaves().iter().map(|term| term.to_string()).collect();
        assert_eq!(leaves, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(query.flattened().to_string(), source);
    }

    #[test]
    fn test_to_query_keeps_shape() {
        let source = "red";
        let tree = Disjunction(vec![Conjunction(vec![Clause::Filter(Span::new(0, 3))])]);
        let query = tree.to_query(source);
        assert_eq!(
            query,
            FilterQuery::Or(
                Polarity::Positive,
                vec![FilterQuery::And(
                    Polarity::Positive,
                    vec![FilterQuery::Term(PartialTerm::parse("red"))]
                )]
            )
        );
        assert_eq!(query.flattened(), FilterQuery::Term(PartialTerm::parse("red")));
    }
}
