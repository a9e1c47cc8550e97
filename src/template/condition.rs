//! `visible_when` conditions for badge zones.
//!
//! Small boolean language over data record values:
//!
//! ```text
//! or      := and (("||" | "or") and)*
//! and     := unary (("&&" | "and") unary)*
//! unary   := ("!" | "not") unary | primary
//! primary := "(" or ")" | operand [("==" | "!=") literal | "in" "[" literal ("," literal)* "]"]
//! ```
//!
//! A bare operand is truthy when its value is non-empty. Identifiers on the left of a
//! comparison name data fields (missing fields read as `""`); everything on the right is a
//! literal, quoted or bare.

use std::fmt;

use crate::foundation::error::{ThumbError, ThumbResult};
use crate::template::model::DataRecord;

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    /// Byte offset of the first character.
    offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Word(String),
    Str(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    Bang,
    EqEq,
    Ne,
    AndAnd,
    OrOr,

    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CondError {
    offset: usize,
    message: String,
}

impl CondError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for CondError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at byte {}: {}", self.offset, self.message)
    }
}

impl From<CondError> for ThumbError {
    fn from(err: CondError) -> Self {
        ThumbError::condition(err.to_string())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn lex(input: &str) -> Result<Vec<Token>, CondError> {
    let mut out = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' || c == '\'' {
            chars.next();
            let mut s = String::new();
            let mut closed = false;
            while let Some((i, ch)) = chars.next() {
                match ch {
                    '\\' => match chars.next() {
                        Some((_, esc)) => s.push(esc),
                        None => return Err(CondError::new(i, "dangling escape")),
                    },
                    _ if ch == c => {
                        out.push(Token {
                            kind: TokenKind::Str(std::mem::take(&mut s)),
                            offset: start,
                        });
                        closed = true;
                        break;
                    }
                    _ => s.push(ch),
                }
            }
            if !closed {
                return Err(CondError::new(start, "unterminated string literal"));
            }
            continue;
        }

        if is_word_char(c) {
            let mut s = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if !is_word_char(ch) {
                    break;
                }
                s.push(ch);
                chars.next();
            }
            out.push(Token {
                kind: TokenKind::Word(s),
                offset: start,
            });
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, ch)| ch);
        let (kind, len) = match (c, next) {
            ('&', Some('&')) => (TokenKind::AndAnd, 2),
            ('|', Some('|')) => (TokenKind::OrOr, 2),
            ('=', Some('=')) => (TokenKind::EqEq, 2),
            ('!', Some('=')) => (TokenKind::Ne, 2),
            ('!', _) => (TokenKind::Bang, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('[', _) => (TokenKind::LBracket, 1),
            (']', _) => (TokenKind::RBracket, 1),
            (',', _) => (TokenKind::Comma, 1),
            _ => {
                return Err(CondError::new(
                    start,
                    format!("unexpected character '{c}'"),
                ));
            }
        };
        if len == 2 {
            chars.next();
        }
        out.push(Token {
            kind,
            offset: start,
        });
    }

    out.push(Token {
        kind: TokenKind::Eof,
        offset: input.len(),
    });
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Field(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Cond {
    Truthy(Operand),
    Eq(Operand, String),
    Ne(Operand, String),
    In(Operand, Vec<String>),
    Not(Box<Cond>),
    /// Operands of a `&&` chain, flattened so the tree depth tracks nesting only.
    And(Vec<Cond>),
    Or(Vec<Cond>),
}

/// Deepest `!`/`not`/parenthesis nesting accepted.
const MAX_NESTING: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn at_keyword(&self, kw: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Word(w) if w == kw)
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn consume_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), CondError> {
        if self.consume(kind.clone()) {
            Ok(())
        } else {
            Err(CondError::new(
                self.peek().offset,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Cond, CondError>,
    ) -> Result<Cond, CondError> {
        if self.depth >= MAX_NESTING {
            return Err(CondError::new(
                self.peek().offset,
                format!("condition nests deeper than {MAX_NESTING} levels"),
            ));
        }
        self.depth += 1;
        let c = f(self);
        self.depth -= 1;
        c
    }

    fn parse_or(&mut self) -> Result<Cond, CondError> {
        let first = self.parse_and()?;
        let mut terms = Vec::new();
        while self.consume(TokenKind::OrOr) || self.consume_keyword("or") {
            terms.push(self.parse_and()?);
        }
        if terms.is_empty() {
            return Ok(first);
        }
        terms.insert(0, first);
        Ok(Cond::Or(terms))
    }

    fn parse_and(&mut self) -> Result<Cond, CondError> {
        let first = self.parse_unary()?;
        let mut terms = Vec::new();
        while self.consume(TokenKind::AndAnd) || self.consume_keyword("and") {
            terms.push(self.parse_unary()?);
        }
        if terms.is_empty() {
            return Ok(first);
        }
        terms.insert(0, first);
        Ok(Cond::And(terms))
    }

    fn parse_unary(&mut self) -> Result<Cond, CondError> {
        if self.consume(TokenKind::Bang) || self.consume_keyword("not") {
            let inner = self.nested(Self::parse_unary)?;
            return Ok(Cond::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Cond, CondError> {
        if self.consume(TokenKind::LParen) {
            let c = self.nested(Self::parse_or)?;
            self.expect(TokenKind::RParen)?;
            return Ok(c);
        }

        let left = self.parse_operand()?;
        if self.consume(TokenKind::EqEq) {
            return Ok(Cond::Eq(left, self.parse_literal()?));
        }
        if self.consume(TokenKind::Ne) {
            return Ok(Cond::Ne(left, self.parse_literal()?));
        }
        if self.consume_keyword("in") {
            self.expect(TokenKind::LBracket)?;
            let mut set = Vec::new();
            if !self.consume(TokenKind::RBracket) {
                loop {
                    set.push(self.parse_literal()?);
                    if self.consume(TokenKind::Comma) {
                        if self.consume(TokenKind::RBracket) {
                            break;
                        }
                        continue;
                    }
                    self.expect(TokenKind::RBracket)?;
                    break;
                }
            }
            return Ok(Cond::In(left, set));
        }
        Ok(Cond::Truthy(left))
    }

    fn parse_operand(&mut self) -> Result<Operand, CondError> {
        let t = self.bump();
        match t.kind {
            TokenKind::Word(w) if !is_keyword(&w) => Ok(Operand::Field(w)),
            TokenKind::Str(s) => Ok(Operand::Literal(s)),
            other => Err(CondError::new(
                t.offset,
                format!("expected field name or string, found {other:?}"),
            )),
        }
    }

    fn parse_literal(&mut self) -> Result<String, CondError> {
        let t = self.bump();
        match t.kind {
            TokenKind::Word(w) | TokenKind::Str(w) => Ok(w),
            other => Err(CondError::new(
                t.offset,
                format!("expected literal, found {other:?}"),
            )),
        }
    }
}

fn is_keyword(w: &str) -> bool {
    matches!(w, "and" | "or" | "not" | "in")
}

/// A parsed `visible_when` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    root: Cond,
}

impl Condition {
    pub fn parse(src: &str) -> ThumbResult<Self> {
        let tokens = lex(src)?;
        let mut p = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        if p.peek().kind == TokenKind::Eof {
            return Err(CondError::new(0, "empty condition").into());
        }
        let root = p.parse_or()?;
        p.expect(TokenKind::Eof)?;
        Ok(Self {
            source: src.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, data: &DataRecord) -> bool {
        eval(&self.root, data)
    }
}

fn resolve<'a>(op: &'a Operand, data: &'a DataRecord) -> &'a str {
    match op {
        Operand::Field(name) => data.get(name).map(String::as_str).unwrap_or(""),
        Operand::Literal(s) => s,
    }
}

fn eval(c: &Cond, data: &DataRecord) -> bool {
    match c {
        Cond::Truthy(op) => !resolve(op, data).is_empty(),
        Cond::Eq(op, v) => resolve(op, data) == v,
        Cond::Ne(op, v) => resolve(op, data) != v,
        Cond::In(op, set) => {
            let value = resolve(op, data);
            set.iter().any(|s| s == value)
        }
        Cond::Not(inner) => !eval(inner, data),
        Cond::And(terms) => terms.iter().all(|t| eval(t, data)),
        Cond::Or(terms) => terms.iter().any(|t| eval(t, data)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/condition.rs"]
mod tests;
