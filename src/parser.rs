//! 卡牌查询语言的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   └─ parse_disjunction()
//!        ├─ parse_conjunction()
//!        │    └─ parse_clause()            (一个或多个，跳过中间的空白)
//!        │         ├─ Verbatim  → Clause::Filter(span)
//!        │         └─ "(" / "-(" → parse_disjunction() 然后期望 ")"
//!        │
//!        └─ 遇到 "or" 时，继续解析下一个 conjunction
//! ```
//!
//! ## 语法
//!
//! ```text
//! Query       := Disjunction
//! Disjunction := Conjunction ("or" Conjunction)*
//! Conjunction := Clause+
//! Clause      := Verbatim | "(" Disjunction ")" | "-(" Disjunction ")"
//! ```
//!
//! 隐式 AND（空白）会被消费，但不会出现在树中。子句前的 `-` 保留在
//! span 内，由 term 解码器处理。括号最多嵌套 [`MAX_NESTING`] 层。
//!
//! ## 降级模式
//!
//! 搜索框里的输入通常还没写完：`(red or blue`、`color:red or`、
//! `red) blue`。语法失败时，已归约的 span 对自动补全仍然有用，所以
//! [`plausible_filter_ranges`] 从不失败，而是返回这些 span。
//!
//! ```text
//! (red or blue      → Err, plausible ranges ["red", "blue"]
//! red or            → Err, plausible ranges ["red"]
//! -(red or blue) x  → Ok
//! ```

use thiserror::Error;

use crate::ast::{Clause, Conjunction, Disjunction};
use crate::lexer::tokenize;
use crate::query::{FilterQuery, Polarity};
use crate::term::{FilterTerm, PartialTerm};
use crate::token::{Span, Token, TokenKind};

/// 括号嵌套的最大深度，超过后报错而不是继续递归
pub const MAX_NESTING: usize = 128;

pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    /// 当前所在的括号层数
    depth: usize,
    /// 已归约为子句的 Verbatim span，按源码顺序
    reduced: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self {
            message,
            span: Some(span),
        }
    }
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            reduced: Vec::new(),
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// 期望当前 token 为指定类型并推进，否则报错
    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind == expected => {
                let token = *token;
                self.position += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected {:?}, found {:?}", expected, token.kind),
                token.span,
            )),
            None => Err(ParseError::new(
                format!("Expected {:?}, but reached end of input", expected),
                None,
            )),
        }
    }

    fn match_token(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    fn starts_clause(&self) -> bool {
        matches!(
            self.peek().map(|token| token.kind),
            Some(TokenKind::Verbatim | TokenKind::OpenParen { .. })
        )
    }

    fn skip_and(&mut self) {
        while self.match_token(TokenKind::And) {
            self.position += 1;
        }
    }

    /// 解析停止前已归约的子句 span（解析成功时即全部子句）
    pub fn reduced(&self) -> &[Span] {
        &self.reduced
    }

    pub fn into_reduced(self) -> Vec<Span> {
        self.reduced
    }

    pub fn parse(&mut self) -> Result<Disjunction, ParseError> {
        self.skip_and();
        let disjunction = self.parse_disjunction()?;
        self.skip_and();

        match self.peek() {
            None => Ok(disjunction),
            Some(token) => Err(ParseError::at_position(
                format!("Unexpected token: {:?}", token.kind),
                token.span,
            )),
        }
    }

    /// `Conjunction ("or" Conjunction)*`
    fn parse_disjunction(&mut self) -> Result<Disjunction, ParseError> {
        let mut conjunctions = vec![self.parse_conjunction()?];

        loop {
            self.skip_and();
            if !self.match_token(TokenKind::Or) {
                break;
            }
            self.advance(); // 消费 `or`
            self.skip_and();
            conjunctions.push(self.parse_conjunction()?);
        }

        Ok(Disjunction(conjunctions))
    }

    /// `Clause+`，跳过子句之间的空白
    fn parse_conjunction(&mut self) -> Result<Conjunction, ParseError> {
        let mut clauses = vec![self.parse_clause()?];

        loop {
            self.skip_and();
            if !self.starts_clause() {
                break;
            }
            clauses.push(self.parse_clause()?);
        }

        Ok(Conjunction(clauses))
    }

    fn parse_clause(&mut self) -> Result<Clause, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new(
                "Expected a clause, but reached end of input".to_string(),
                None,
            ));
        };

        match token.kind {
            TokenKind::Verbatim => {
                self.reduced.push(token.span);
                Ok(Clause::Filter(token.span))
            }
            TokenKind::OpenParen { negated } => {
                if self.depth >= MAX_NESTING {
                    return Err(ParseError::at_position(
                        format!("Groups nested deeper than {} levels", MAX_NESTING),
                        token.span,
                    ));
                }
                self.depth += 1;
                self.skip_and();
                let nested = self.parse_disjunction()?;
                self.skip_and();
                self.expect(TokenKind::CloseParen)?;
                self.depth -= 1;
                let polarity = if negated {
                    Polarity::Negative
                } else {
                    Polarity::Positive
                };
                Ok(Clause::Disjunction(polarity, nested))
            }
            kind => Err(ParseError::at_position(
                format!("Expected a clause, found {:?}", kind),
                token.span,
            )),
        }
    }
}

/// 用完整语法解析 `input`
pub fn parse(input: &str) -> Result<Disjunction, ParseError> {
    let tokens = tokenize(input);
    Parser::new(&tokens).parse()
}

/// 用户可能正在输入的子句 span，即使查询无法解析。从不失败，结果可能为空
pub fn plausible_filter_ranges(input: &str) -> Vec<Span> {
    let tokens = tokenize(input);
    let mut parser = Parser::new(&tokens);
    if let Err(err) = parser.parse() {
        tracing::debug!(
            error = %err,
            reduced = parser.reduced().len(),
            "query did not parse, falling back to reduced spans"
        );
    }
    parser.into_reduced()
}

/// 解析并解码 `input`，得到规范化的 partial term 树
pub fn parse_query(input: &str) -> Result<FilterQuery<PartialTerm>, ParseError> {
    Ok(parse(input)?.to_query(input).flattened())
}

/// 解析 `input` 并把每个叶子提升为完整 term。
/// 查询无法解析或任一子句尚未完成时返回 `None`
pub fn parse_complete_query(input: &str) -> Option<FilterQuery<FilterTerm>> {
    let query = match parse_query(input) {
        Ok(query) => query,
        Err(err) => {
            tracing::debug!(error = %err, "query did not parse");
            return None;
        }
    };
    let complete = query.try_map(PartialTerm::complete);
    if complete.is_none() {
        tracing::debug!(query = %query, "query has incomplete clauses");
    }
    complete
}
