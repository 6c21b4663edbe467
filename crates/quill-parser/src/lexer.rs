//! Lexer for the Quill language.
//!
//! Tokenization runs in two passes: a logos-generated matcher classifies
//! raw character runs (greedy longest match, so multi-character operators
//! and named constants like `int.MaxValue` out-match their prefixes, and
//! `boolVariable` is a single identifier rather than `bool` + `Variable`),
//! then a rewrite pass applies the three stream-level rules:
//!
//! - a named constant is replaced by its literal decimal text, with a
//!   negative replacement split into Minus + Constant;
//! - an identifier immediately followed by `(` becomes a call-target Word;
//! - a semicolon immediately after a closing brace is dropped.

use crate::error::{CompileError, CompileResult};
use crate::token::{Span, Token};
use crate::types::ConstantTable;
use logos::Logos;

/// Logos-based token enum for the raw matching pass.
#[derive(Logos, Debug, Clone, PartialEq)]
enum RawToken {
    // Whitespace (skip)
    #[regex(r"[ \t\r\n]+", logos::skip)]
    Whitespace,

    // Keywords (exact matches out-prioritize the identifier regex)
    #[token("int")]
    Int,

    #[token("long")]
    Long,

    #[token("bool")]
    Bool,

    #[token("return")]
    Return,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("ref")]
    Ref,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // Named well-known constants. The callback rejects a match that is
    // immediately followed by another identifier character, matching the
    // backtracking behavior of a longest-match table: `int.MaxValueFoo`
    // falls back to `int` + `.`, and `.` is unclassifiable.
    #[regex(r"(int|long)\.(Max|Min)Value", named_constant)]
    NamedConstant(String),

    // Identifiers (after keywords)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Digit runs; the text is range-checked by the parser, not here
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Constant(String),

    // Operators (2-char before 1-char)
    #[token("==")]
    EqualEqual,

    #[token("!=")]
    NotEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    // Single-character tokens
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("!")]
    Not,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("=")]
    Assign,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

fn named_constant(lex: &mut logos::Lexer<RawToken>) -> Result<String, ()> {
    match lex.remainder().chars().next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => Err(()),
        _ => Ok(lex.slice().to_string()),
    }
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    constants: &'a ConstantTable,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            constants: ConstantTable::global(),
        }
    }

    /// Use a caller-supplied constant table instead of the shared one.
    pub fn with_constants(source: &'a str, constants: &'a ConstantTable) -> Self {
        Self { source, constants }
    }

    /// Tokenize the entire input.
    ///
    /// Fails on the first unclassifiable character run; lexing is
    /// all-or-nothing like the rest of the compile pipeline.
    pub fn tokenize(self) -> CompileResult<Vec<(Token, Span)>> {
        let raw = self.raw_tokens()?;
        let mut tokens: Vec<(Token, Span)> = Vec::with_capacity(raw.len() + 1);

        for (i, (raw_token, span)) in raw.iter().enumerate() {
            match raw_token {
                RawToken::NamedConstant(name) => {
                    let text = self.constants.lookup(name).ok_or(CompileError::Lex {
                        character: name.chars().next().unwrap_or('\0'),
                        line: span.line,
                        column: span.column,
                    })?;
                    if let Some(digits) = text.strip_prefix('-') {
                        tokens.push((Token::Minus, *span));
                        tokens.push((Token::Constant(digits.to_string()), *span));
                    } else {
                        tokens.push((Token::Constant(text.to_string()), *span));
                    }
                }
                RawToken::Identifier(name) => {
                    let next_is_paren =
                        matches!(raw.get(i + 1), Some((RawToken::LeftParen, _)));
                    if next_is_paren {
                        tokens.push((Token::Word(name.clone()), *span));
                    } else {
                        tokens.push((Token::Variable(name.clone()), *span));
                    }
                }
                RawToken::Semicolon => {
                    // Empty-statement suppression after a closing brace.
                    if matches!(tokens.last(), Some((Token::RightBrace, _))) {
                        continue;
                    }
                    tokens.push((Token::Semicolon, *span));
                }
                other => tokens.push((convert_token(other), *span)),
            }
        }

        let eof_span = Span::new(self.source.len(), self.source.len(), 0, 0);
        tokens.push((Token::Eof, eof_span));
        Ok(tokens)
    }

    fn raw_tokens(&self) -> CompileResult<Vec<(RawToken, Span)>> {
        let mut lexer = RawToken::lexer(self.source);
        let mut tokens = Vec::new();
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0usize;

        while let Some(result) = lexer.next() {
            let range = lexer.span();

            // Advance line/column over any skipped text.
            for c in self.source[last_end..range.start].chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }

            let span = Span::new(range.start, range.end, line, column);
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(_) => {
                    let character = self.source[range.start..].chars().next().unwrap_or('\0');
                    return Err(CompileError::Lex {
                        character,
                        line,
                        column,
                    });
                }
            }

            for c in self.source[range.start..range.end].chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
            last_end = range.end;
        }

        Ok(tokens)
    }
}

fn convert_token(raw: &RawToken) -> Token {
    match raw {
        RawToken::Int => Token::Int,
        RawToken::Long => Token::Long,
        RawToken::Bool => Token::Bool,
        RawToken::Return => Token::Return,
        RawToken::If => Token::If,
        RawToken::Else => Token::Else,
        RawToken::Ref => Token::Ref,
        RawToken::True => Token::True,
        RawToken::False => Token::False,
        RawToken::Constant(text) => Token::Constant(text.clone()),
        RawToken::EqualEqual => Token::EqualEqual,
        RawToken::NotEqual => Token::NotEqual,
        RawToken::LessEqual => Token::LessEqual,
        RawToken::GreaterEqual => Token::GreaterEqual,
        RawToken::AndAnd => Token::AndAnd,
        RawToken::OrOr => Token::OrOr,
        RawToken::Plus => Token::Plus,
        RawToken::Minus => Token::Minus,
        RawToken::Star => Token::Star,
        RawToken::Slash => Token::Slash,
        RawToken::Not => Token::Not,
        RawToken::Less => Token::Less,
        RawToken::Greater => Token::Greater,
        RawToken::Assign => Token::Assign,
        RawToken::LeftParen => Token::LeftParen,
        RawToken::RightParen => Token::RightParen,
        RawToken::LeftBrace => Token::LeftBrace,
        RawToken::RightBrace => Token::RightBrace,
        RawToken::Comma => Token::Comma,
        RawToken::Whitespace => unreachable!("whitespace is skipped"),
        RawToken::NamedConstant(_) | RawToken::Identifier(_) | RawToken::Semicolon => {
            unreachable!("handled by the rewrite pass")
        }
    }
}
