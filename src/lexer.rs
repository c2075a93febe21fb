//! 卡牌查询语言的词法分析器
//!
//! 每个位置按以下顺序尝试规则：
//!
//! 1. `(` 或 `-(` 开始分组
//! 2. 可选空白加 `)` 结束分组
//! 3. 处于词边界的 `or`
//! 4. 不含空白、引号、`/` 和括号的连续文本
//! 5. 以 `'`、`"` 或 `/` 包围的文本，到匹配的结束符为止，未闭合时到输入末尾
//! 6. 剩下的空白，即隐式 AND
//!
//! 输入的每个字节恰好落在一个 token 中，所以分词从不失败。
//! 包围文本通过线性扫描查找结束符。

use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
    /// 上一个产生的 token 类型
    last: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            last: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// 返回下一个位置的字符，不推进位置
    fn peek_next(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn read_open_paren(&mut self, start: usize) -> Option<Token> {
        let negated = match (self.peek(), self.peek_next()) {
            (Some('('), _) => false,
            (Some('-'), Some('(')) => true,
            _ => return None,
        };
        self.position += if negated { 2 } else { 1 };
        Some(Token::new(
            TokenKind::OpenParen { negated },
            start,
            self.position,
        ))
    }

    fn read_close_paren(&mut self, start: usize) -> Option<Token> {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        if !trimmed.starts_with(')') {
            return None;
        }
        self.position += rest.len() - trimmed.len() + 1;
        Some(Token::new(TokenKind::CloseParen, start, self.position))
    }

    fn read_or(&mut self, start: usize) -> Option<Token> {
        // `"foo"or` 是一个子句，不是 OR
        if self.last == Some(TokenKind::Verbatim) {
            return None;
        }
        let rest = self.rest();
        let word = rest.get(..2)?;
        if !word.eq_ignore_ascii_case("or") {
            return None;
        }
        match rest[2..].chars().next() {
            None => {}
            Some(c) if c.is_whitespace() || c == '(' || c == ')' => {}
            Some(_) => return None,
        }
        self.position += 2;
        Some(Token::new(TokenKind::Or, start, self.position))
    }

    fn read_run(&mut self, start: usize) -> Option<Token> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || is_delimiter(c) || c == '(' || c == ')')
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.position += len;
        Some(Token::new(TokenKind::Verbatim, start, self.position))
    }

    fn read_delimited(&mut self, start: usize) -> Option<Token> {
        let delimiter = self.peek().filter(|&c| is_delimiter(c))?;
        let body = &self.rest()[1..];
        let len = match body.find(delimiter) {
            Some(close) => close + 2,
            None => body.len() + 1,
        };
        self.position += len;
        Some(Token::new(TokenKind::Verbatim, start, self.position))
    }

    fn read_whitespace(&mut self, start: usize) -> Token {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        self.position += len;
        Token::new(TokenKind::And, start, self.position)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        self.peek()?;

        let token = self
            .read_open_paren(start)
            .or_else(|| self.read_close_paren(start))
            .or_else(|| self.read_or(start))
            .or_else(|| self.read_run(start))
            .or_else(|| self.read_delimited(start))
            .unwrap_or_else(|| self.read_whitespace(start));
        self.last = Some(token.kind);
        Some(token)
    }
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '\'' | '"' | '/')
}

/// 对 `input` 分词并合并相邻的 Verbatim token，
/// 这样 `name:"lightning bolt"` 是一个完整子句
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for token in Lexer::new(input) {
        match tokens.last_mut() {
            Some(last)
                if last.kind == TokenKind::Verbatim
                    && token.kind == TokenKind::Verbatim
                    && last.span.end == token.span.start =>
            {
                last.span.end = token.span.end;
            }
            _ => tokens.push(token),
        }
    }
    tracing::trace!(len = input.len(), tokens = tokens.len(), "tokenized query");
    tokens
}
