//! Parser for the Quill language.
//!
//! A hand-written parser over the pre-tokenized input. Each precedence
//! level is built iteratively (not recursively) so same-precedence chains
//! associate left-to-right, and constant folding runs inline in the
//! additive/multiplicative loops with compile-time overflow and
//! divide-by-zero detection.

pub mod expr;
pub mod stmt;

use crate::ast::{Block, Expression};
use crate::error::{CompileError, CompileResult};
use crate::lexer::Lexer;
use crate::symbols::Env;
use crate::token::{Span, Token};
use crate::types::CompilerType;

/// Knobs for a compile call.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Fold literal arithmetic at compile time (checked, width-promoted).
    pub fold_constants: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            fold_constants: true,
        }
    }
}

/// Slot type tables produced by a parse, consumed by the code generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotLayout {
    pub params: Vec<CompilerType>,
    pub locals: Vec<CompilerType>,
}

/// Parser state for one compile call.
///
/// All state here (token cursor, local table) is call-scoped; independent
/// compile calls can run concurrently on separate threads.
pub struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    pub(crate) env: Env,
    options: CompileOptions,
}

impl Parser {
    /// Create a parser from source text, tokenizing eagerly.
    pub fn new(source: &str, env: Env) -> CompileResult<Self> {
        Self::with_options(source, env, CompileOptions::default())
    }

    pub fn with_options(source: &str, env: Env, options: CompileOptions) -> CompileResult<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            env,
            options,
        })
    }

    /// Parse a single expression spanning the whole input.
    pub fn parse_expression(mut self) -> CompileResult<(Expression, SlotLayout)> {
        let expr = expr::parse_or(&mut self)?;
        if !self.at_eof() {
            return Err(self.syntax_error(format!(
                "expected end of input, found '{}'",
                self.current()
            )));
        }
        let layout = self.layout();
        Ok((expr, layout))
    }

    /// Parse a statement sequence spanning the whole input.
    ///
    /// The resulting block must guarantee return on every path.
    pub fn parse_program(mut self) -> CompileResult<(Block, SlotLayout)> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(stmt::parse_statement(&mut self)?);
        }
        let block = Block { statements };
        if !block.guarantees_return() {
            return Err(CompileError::MissingReturn);
        }
        let layout = self.layout();
        Ok((block, layout))
    }

    fn layout(&self) -> SlotLayout {
        SlotLayout {
            params: self.env.params.types(),
            locals: self.env.locals.types(),
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    #[inline]
    pub(crate) fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    pub(crate) fn expect(&mut self, expected: &Token) -> CompileResult<()> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(format!(
                "expected '{}', found '{}'",
                expected,
                self.current()
            )))
        }
    }

    pub(crate) fn fold_constants(&self) -> bool {
        self.options.fold_constants
    }

    // ========================================================================
    // Error construction
    // ========================================================================

    /// An excerpt of the tokens surrounding the failure point, for error
    /// messages.
    pub(crate) fn context(&self) -> String {
        let lo = self.pos.saturating_sub(3);
        let hi = (self.pos + 3).min(self.tokens.len());
        self.tokens[lo..hi]
            .iter()
            .map(|(t, _)| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn syntax_error(&self, message: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            message: message.into(),
            context: self.context(),
        }
    }

    pub(crate) fn type_error(&self, message: impl Into<String>) -> CompileError {
        CompileError::Type {
            message: message.into(),
            context: self.context(),
        }
    }

    pub(crate) fn scope_error(&self, message: impl Into<String>) -> CompileError {
        CompileError::Scope {
            message: message.into(),
            context: self.context(),
        }
    }

    pub(crate) fn overflow_error(&self) -> CompileError {
        CompileError::Overflow {
            context: self.context(),
        }
    }

    pub(crate) fn divide_by_zero_error(&self) -> CompileError {
        CompileError::DivideByZero {
            context: self.context(),
        }
    }

    pub(crate) fn constant_too_large(&self) -> CompileError {
        CompileError::ConstantTooLarge {
            context: self.context(),
        }
    }
}
