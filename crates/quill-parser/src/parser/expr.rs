//! Expression parsing, typing and constant folding.
//!
//! The precedence ladder, outermost first:
//!
//! ```text
//! Or    := And ('||' And)*
//! And   := Eq ('&&' Eq)*
//! Eq    := Rel (('=='|'!=') Rel)*
//! Rel   := Add (('<'|'<='|'>'|'>=') Add)?        -- non-chained
//! Add   := Mul (('+'|'-') Mul)*
//! Mul   := Unary (('*'|'/') Unary)*
//! Unary := '-'Constant | '-'Unary | '!'('('Or')' | BoolVariable) | Primary
//! Primary := Constant | Variable | 'ref'Variable | '('Or')' | Call
//! ```
//!
//! Folding happens inline in the Add/Mul loops whenever both operands are
//! literal-foldable, using overflow-checked arithmetic in the promoted
//! width. A multiplication with a literal-zero operand is never folded;
//! a division whose divisor is (or has folded to) a literal zero is a
//! compile-time error regardless of the dividend.

use super::Parser;
use crate::ast::{
    BinaryExpression, BinaryOperator, CallExpression, Expression, Literal, LogicalExpression,
    LogicalOperator, SlotKind, UnaryExpression, UnaryOperator, VariableRef,
};
use crate::error::CompileResult;
use crate::token::Token;
use crate::types::CompilerType;

pub(crate) fn parse_or(p: &mut Parser) -> CompileResult<Expression> {
    let mut left = parse_and(p)?;
    while p.check(&Token::OrOr) {
        p.advance();
        let right = parse_and(p)?;
        left = make_short_circuit(p, left, LogicalOperator::Or, right)?;
    }
    Ok(left)
}

fn parse_and(p: &mut Parser) -> CompileResult<Expression> {
    let mut left = parse_equality(p)?;
    while p.check(&Token::AndAnd) {
        p.advance();
        let right = parse_equality(p)?;
        left = make_short_circuit(p, left, LogicalOperator::And, right)?;
    }
    Ok(left)
}

fn parse_equality(p: &mut Parser) -> CompileResult<Expression> {
    let mut left = parse_relational(p)?;
    loop {
        let op = match p.current() {
            Token::EqualEqual => LogicalOperator::Equal,
            Token::NotEqual => LogicalOperator::NotEqual,
            _ => break,
        };
        p.advance();
        let right = parse_relational(p)?;
        left = make_equality(p, left, op, right)?;
    }
    Ok(left)
}

/// Relational comparisons do not chain: at most one per operand pair. A
/// second relational operator is left for the caller, where it fails as an
/// unexpected token.
fn parse_relational(p: &mut Parser) -> CompileResult<Expression> {
    let left = parse_additive(p)?;
    let op = match p.current() {
        Token::Less => LogicalOperator::Less,
        Token::LessEqual => LogicalOperator::LessEqual,
        Token::Greater => LogicalOperator::Greater,
        Token::GreaterEqual => LogicalOperator::GreaterEqual,
        _ => return Ok(left),
    };
    p.advance();
    let right = parse_additive(p)?;
    make_relational(p, left, op, right)
}

fn parse_additive(p: &mut Parser) -> CompileResult<Expression> {
    let mut left = parse_multiplicative(p)?;
    loop {
        let op = match p.current() {
            Token::Plus => BinaryOperator::Add,
            Token::Minus => BinaryOperator::Sub,
            _ => break,
        };
        p.advance();
        let right = parse_multiplicative(p)?;
        left = make_arithmetic(p, left, op, right)?;
    }
    Ok(left)
}

fn parse_multiplicative(p: &mut Parser) -> CompileResult<Expression> {
    let mut left = parse_unary(p)?;
    loop {
        let op = match p.current() {
            Token::Star => BinaryOperator::Mul,
            Token::Slash => BinaryOperator::Div,
            _ => break,
        };
        p.advance();
        let right = parse_unary(p)?;
        left = make_arithmetic(p, left, op, right)?;
    }
    Ok(left)
}

fn parse_unary(p: &mut Parser) -> CompileResult<Expression> {
    match p.current().clone() {
        Token::Minus => {
            p.advance();
            if let Token::Constant(text) = p.current().clone() {
                p.advance();
                parse_literal(p, &text, true)
            } else {
                let inner = parse_unary(p)?;
                negate(p, inner)
            }
        }
        Token::Not => {
            p.advance();
            let inner = match p.current().clone() {
                Token::LeftParen => {
                    p.advance();
                    let inner = parse_or(p)?;
                    p.expect(&Token::RightParen)?;
                    inner
                }
                Token::Variable(name) => {
                    p.advance();
                    resolve_variable(p, &name, false)?
                }
                _ => {
                    return Err(p.syntax_error(
                        "'!' must be followed by a parenthesized expression or a boolean variable",
                    ))
                }
            };
            if inner.ty() != CompilerType::Bool {
                return Err(p.type_error(format!(
                    "Operator '!' cannot be applied to operand of type '{}'",
                    inner.ty()
                )));
            }
            Ok(Expression::Unary(UnaryExpression {
                op: UnaryOperator::Not,
                operand: Box::new(inner),
                ty: CompilerType::Bool,
            }))
        }
        _ => parse_primary(p),
    }
}

fn parse_primary(p: &mut Parser) -> CompileResult<Expression> {
    match p.current().clone() {
        Token::Constant(text) => {
            p.advance();
            parse_literal(p, &text, false)
        }
        Token::True => {
            p.advance();
            Ok(bool_literal(true))
        }
        Token::False => {
            p.advance();
            Ok(bool_literal(false))
        }
        Token::Variable(name) => {
            p.advance();
            resolve_variable(p, &name, false)
        }
        Token::Ref => {
            p.advance();
            match p.current().clone() {
                Token::Variable(name) => {
                    p.advance();
                    resolve_variable(p, &name, true)
                }
                _ => Err(p.syntax_error("expected a variable after 'ref'")),
            }
        }
        Token::LeftParen => {
            p.advance();
            let inner = parse_or(p)?;
            p.expect(&Token::RightParen)?;
            Ok(inner)
        }
        Token::Word(name) => {
            p.advance();
            parse_call(p, name)
        }
        other => Err(p.syntax_error(format!("unexpected token '{other}'"))),
    }
}

// ============================================================================
// Node construction and typing
// ============================================================================

fn bool_literal(value: bool) -> Expression {
    Expression::Literal(Literal {
        value: value as i64,
        ty: CompilerType::Bool,
    })
}

fn literal_width(value: i64) -> CompilerType {
    if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
        CompilerType::Int
    } else {
        CompilerType::Long
    }
}

/// Parse a digit run into a literal, negating first if a leading minus was
/// consumed. Negating before the range check is what makes
/// `-9223372036854775808` representable while the bare digit run is not.
fn parse_literal(p: &Parser, text: &str, negative: bool) -> CompileResult<Expression> {
    let rendered = if negative {
        format!("-{text}")
    } else {
        text.to_string()
    };
    let value: i64 = rendered.parse().map_err(|_| p.constant_too_large())?;
    Ok(Expression::Literal(Literal {
        value,
        ty: literal_width(value),
    }))
}

fn negate(p: &Parser, inner: Expression) -> CompileResult<Expression> {
    match inner {
        // Fold a negated literal in its own width.
        Expression::Literal(lit) if lit.ty.is_numeric() => {
            let value = if lit.ty == CompilerType::Int {
                (lit.value as i32)
                    .checked_neg()
                    .map(|v| v as i64)
                    .ok_or_else(|| p.overflow_error())?
            } else {
                lit.value.checked_neg().ok_or_else(|| p.overflow_error())?
            };
            Ok(Expression::Literal(Literal { value, ty: lit.ty }))
        }
        // Double negation collapses to the inner expression.
        Expression::Unary(unary) if unary.op == UnaryOperator::Negate => Ok(*unary.operand),
        other => {
            if !other.ty().is_numeric() {
                return Err(p.type_error(format!(
                    "Operator '-' cannot be applied to operand of type '{}'",
                    other.ty()
                )));
            }
            let ty = other.ty();
            Ok(Expression::Unary(UnaryExpression {
                op: UnaryOperator::Negate,
                operand: Box::new(other),
                ty,
            }))
        }
    }
}

fn resolve_variable(p: &Parser, name: &str, by_ref: bool) -> CompileResult<Expression> {
    let (slot, index, ty) = if let Some((index, ty)) = p.env.params.lookup(name) {
        (SlotKind::Param, index, ty)
    } else if let Some((index, ty)) = p.env.locals.lookup(name) {
        (SlotKind::Local, index, ty)
    } else if let Some((index, field)) = p.env.host.field(name) {
        (SlotKind::Field, index, field.ty)
    } else {
        return Err(p.scope_error(format!(
            "The name '{name}' does not exist in the current context"
        )));
    };
    Ok(Expression::Variable(VariableRef {
        name: name.to_string(),
        ty,
        slot,
        index,
        by_ref,
    }))
}

pub(crate) fn parse_call(p: &mut Parser, name: String) -> CompileResult<Expression> {
    p.expect(&Token::LeftParen)?;
    let mut args = Vec::new();
    if !p.check(&Token::RightParen) {
        loop {
            args.push(parse_or(p)?);
            if p.check(&Token::Comma) {
                p.advance();
            } else {
                break;
            }
        }
    }
    p.expect(&Token::RightParen)?;

    let signature = match p.env.host.method(&name) {
        Some(sig) => sig.clone(),
        None => {
            return Err(p.scope_error(format!(
                "The method '{name}' does not exist in the host type"
            )))
        }
    };

    if args.len() != signature.params.len() {
        return Err(p.type_error(format!(
            "Method '{}' takes {} argument(s) but {} were supplied",
            name,
            signature.params.len(),
            args.len()
        )));
    }

    for (i, (arg, &formal)) in args.iter().zip(&signature.params).enumerate() {
        let actual = arg.ty();
        let by_ref = matches!(arg, Expression::Variable(v) if v.by_ref);
        if by_ref {
            // Widening an address has no slot to write back to.
            if actual != formal {
                return Err(p.type_error(format!(
                    "Argument {}: a 'ref' argument must match the parameter type '{formal}' exactly",
                    i + 1
                )));
            }
        } else if actual != formal && !(formal == CompilerType::Long && actual == CompilerType::Int)
        {
            return Err(p.type_error(format!(
                "Argument {}: cannot convert from '{actual}' to '{formal}'",
                i + 1
            )));
        }
    }

    Ok(Expression::Call(CallExpression {
        name,
        args,
        param_types: signature.params,
        return_type: signature.ret,
    }))
}

fn make_short_circuit(
    p: &Parser,
    left: Expression,
    op: LogicalOperator,
    right: Expression,
) -> CompileResult<Expression> {
    if left.ty() != CompilerType::Bool || right.ty() != CompilerType::Bool {
        let symbol = if op == LogicalOperator::And { "&&" } else { "||" };
        return Err(p.type_error(format!(
            "Operator '{symbol}' cannot be applied to operands of type '{}' and '{}'",
            left.ty(),
            right.ty()
        )));
    }
    Ok(Expression::Logical(LogicalExpression {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

fn make_equality(
    p: &Parser,
    left: Expression,
    op: LogicalOperator,
    right: Expression,
) -> CompileResult<Expression> {
    let compatible = (left.ty() == CompilerType::Bool && right.ty() == CompilerType::Bool)
        || (left.ty().is_numeric() && right.ty().is_numeric());
    if !compatible {
        let symbol = if op == LogicalOperator::Equal { "==" } else { "!=" };
        return Err(p.type_error(format!(
            "Operator '{symbol}' cannot be applied to operands of type '{}' and '{}'",
            left.ty(),
            right.ty()
        )));
    }
    Ok(Expression::Logical(LogicalExpression {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

fn make_relational(
    p: &Parser,
    left: Expression,
    op: LogicalOperator,
    right: Expression,
) -> CompileResult<Expression> {
    if !left.ty().is_numeric() || !right.ty().is_numeric() {
        let symbol = match op {
            LogicalOperator::Less => "<",
            LogicalOperator::LessEqual => "<=",
            LogicalOperator::Greater => ">",
            _ => ">=",
        };
        return Err(p.type_error(format!(
            "Operator '{symbol}' cannot be applied to operands of type '{}' and '{}'",
            left.ty(),
            right.ty()
        )));
    }
    Ok(Expression::Logical(LogicalExpression {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

/// Build (or fold) an additive/multiplicative pair.
fn make_arithmetic(
    p: &Parser,
    left: Expression,
    op: BinaryOperator,
    right: Expression,
) -> CompileResult<Expression> {
    if !left.ty().is_numeric() || !right.ty().is_numeric() {
        let symbol = match op {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        };
        return Err(p.type_error(format!(
            "Operator '{symbol}' cannot be applied to operands of type '{}' and '{}'",
            left.ty(),
            right.ty()
        )));
    }

    let left_lit = left.foldable_literal();
    let right_lit = right.foldable_literal();

    match op {
        BinaryOperator::Div => {
            if let Some(divisor) = right_lit {
                // A literal-zero divisor is a compile-time error no matter
                // what the dividend is.
                if divisor.value == 0 {
                    return Err(p.divide_by_zero_error());
                }
                if p.fold_constants() {
                    if divisor.value == 1 {
                        return Ok(left);
                    }
                    if let Some(dividend) = left_lit {
                        return fold_arithmetic(p, dividend, op, divisor);
                    }
                }
            }
        }
        BinaryOperator::Mul => {
            // A literal-zero multiplication is never folded.
            let has_zero = matches!(left_lit, Some(l) if l.value == 0)
                || matches!(right_lit, Some(r) if r.value == 0);
            if !has_zero && p.fold_constants() {
                if matches!(left_lit, Some(l) if l.value == 1) {
                    return Ok(right);
                }
                if matches!(right_lit, Some(r) if r.value == 1) {
                    return Ok(left);
                }
                if let (Some(a), Some(b)) = (left_lit, right_lit) {
                    return fold_arithmetic(p, a, op, b);
                }
            }
        }
        BinaryOperator::Add | BinaryOperator::Sub => {
            if p.fold_constants() {
                if let (Some(a), Some(b)) = (left_lit, right_lit) {
                    return fold_arithmetic(p, a, op, b);
                }
            }
        }
    }

    let ty = CompilerType::promote(left.ty(), right.ty());
    Ok(Expression::Binary(BinaryExpression {
        op,
        left: Box::new(left),
        right: Box::new(right),
        ty,
    }))
}

/// Evaluate a literal pair with overflow-checked arithmetic in the
/// promoted width: Int only if both operands are Int, else Long.
fn fold_arithmetic(
    p: &Parser,
    a: Literal,
    op: BinaryOperator,
    b: Literal,
) -> CompileResult<Expression> {
    // The folded literal keeps the width the operation evaluated in.
    if a.ty == CompilerType::Int && b.ty == CompilerType::Int {
        let x = a.value as i32;
        let y = b.value as i32;
        let folded = match op {
            BinaryOperator::Add => x.checked_add(y),
            BinaryOperator::Sub => x.checked_sub(y),
            BinaryOperator::Mul => x.checked_mul(y),
            BinaryOperator::Div => x.checked_div(y),
        };
        let value = folded.ok_or_else(|| p.overflow_error())? as i64;
        Ok(Expression::Literal(Literal {
            value,
            ty: CompilerType::Int,
        }))
    } else {
        let folded = match op {
            BinaryOperator::Add => a.value.checked_add(b.value),
            BinaryOperator::Sub => a.value.checked_sub(b.value),
            BinaryOperator::Mul => a.value.checked_mul(b.value),
            BinaryOperator::Div => a.value.checked_div(b.value),
        };
        let value = folded.ok_or_else(|| p.overflow_error())?;
        Ok(Expression::Literal(Literal {
            value,
            ty: CompilerType::Long,
        }))
    }
}
