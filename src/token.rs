//! 查询语言的 token 定义

/// 一个 token 是语言的最小单元，带有类型和位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// token 的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `(` 或 `-(`，后者 `negated` 为 true
    OpenParen { negated: bool },
    /// `)`，包括紧挨在它前面的空白
    CloseParen,
    /// 关键字 `or`
    Or,
    /// 子句之间的空白（隐式 AND）
    And,
    /// 子句原文：裸文本、引号文本、正则文本，或它们不带空白地连在一起
    Verbatim,
}

/// 源文本中的一段区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// 起始字节偏移
    pub start: usize,
    /// 结束字节偏移
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 借用该区间覆盖的文本
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}
