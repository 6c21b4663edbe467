//! Short-circuit boolean lowering.
//!
//! Conditions are lowered in two steps. First a pure rewrite pushes every
//! `!` inward (De Morgan over `&&`/`||`, comparison flipping, and a bare
//! boolean value becomes `expr == true`), so the emitter only ever sees
//! un-negated comparisons and logical operators. Then emission produces a
//! true/false stack value while short-circuiting the right operand of
//! `&&`/`||` whenever the left already decides the result.
//!
//! The target exposes only `<`, `>` and `==` directly; `<=`, `>=` and `!=`
//! are synthesized from the opposite primitive composed with
//! compare-to-false.

use super::CodeGenerator;
use quill_bytecode::Instr;
use quill_parser::ast::{Expression, Literal, LogicalExpression, LogicalOperator, UnaryOperator};
use quill_parser::{CompileError, CompileResult, CompilerType};

/// Rewrite a condition into negation-free form. Pure: returns a new tree.
pub(crate) fn normalize_condition(expr: &Expression) -> Expression {
    normalize(expr, false)
}

fn normalize(expr: &Expression, negate: bool) -> Expression {
    match expr {
        Expression::Unary(unary) if unary.op == UnaryOperator::Not => {
            normalize(&unary.operand, !negate)
        }
        Expression::Logical(logical) => match logical.op {
            LogicalOperator::And | LogicalOperator::Or => {
                let op = if negate {
                    inverse(logical.op)
                } else {
                    logical.op
                };
                Expression::Logical(LogicalExpression {
                    op,
                    left: Box::new(normalize(&logical.left, negate)),
                    right: Box::new(normalize(&logical.right, negate)),
                })
            }
            comparison => {
                let op = if negate { inverse(comparison) } else { comparison };
                Expression::Logical(LogicalExpression {
                    op,
                    left: logical.left.clone(),
                    right: logical.right.clone(),
                })
            }
        },
        // A bare boolean value where a comparison is expected.
        other => {
            let op = if negate {
                LogicalOperator::NotEqual
            } else {
                LogicalOperator::Equal
            };
            Expression::Logical(LogicalExpression {
                op,
                left: Box::new(other.clone()),
                right: Box::new(Expression::Literal(Literal {
                    value: 1,
                    ty: CompilerType::Bool,
                })),
            })
        }
    }
}

fn inverse(op: LogicalOperator) -> LogicalOperator {
    match op {
        LogicalOperator::Less => LogicalOperator::GreaterEqual,
        LogicalOperator::LessEqual => LogicalOperator::Greater,
        LogicalOperator::Greater => LogicalOperator::LessEqual,
        LogicalOperator::GreaterEqual => LogicalOperator::Less,
        LogicalOperator::Equal => LogicalOperator::NotEqual,
        LogicalOperator::NotEqual => LogicalOperator::Equal,
        LogicalOperator::And => LogicalOperator::Or,
        LogicalOperator::Or => LogicalOperator::And,
    }
}

/// Lower a boolean expression to a true/false stack value.
pub(crate) fn emit_condition(gen: &mut CodeGenerator, expr: &Expression) -> CompileResult<()> {
    let normalized = normalize_condition(expr);
    emit_bool_value(gen, &normalized)
}

fn emit_bool_value(gen: &mut CodeGenerator, expr: &Expression) -> CompileResult<()> {
    let logical = match expr {
        Expression::Logical(logical) => logical,
        // Normalization guarantees a logical node; anything else is a
        // plain value.
        other => return gen.emit_expression(other),
    };

    match logical.op {
        LogicalOperator::And => {
            let else_label = gen.builder_mut().define_label();
            let end_label = gen.builder_mut().define_label();
            emit_bool_value(gen, &logical.left)?;
            gen.builder_mut().emit(Instr::JumpIfFalse(else_label));
            emit_bool_value(gen, &logical.right)?;
            gen.builder_mut().emit(Instr::Jump(end_label));
            gen.builder_mut().mark_label(else_label);
            gen.builder_mut().emit(Instr::ConstFalse);
            gen.builder_mut().mark_label(end_label);
            Ok(())
        }
        LogicalOperator::Or => {
            let else_label = gen.builder_mut().define_label();
            let end_label = gen.builder_mut().define_label();
            emit_bool_value(gen, &logical.left)?;
            gen.builder_mut().emit(Instr::JumpIfFalse(else_label));
            gen.builder_mut().emit(Instr::ConstTrue);
            gen.builder_mut().emit(Instr::Jump(end_label));
            gen.builder_mut().mark_label(else_label);
            emit_bool_value(gen, &logical.right)?;
            gen.builder_mut().mark_label(end_label);
            Ok(())
        }
        _ => emit_comparison(gen, logical),
    }
}

fn emit_comparison(gen: &mut CodeGenerator, logical: &LogicalExpression) -> CompileResult<()> {
    let left_ty = logical.left.ty();
    let right_ty = logical.right.ty();
    let compare_ty = if left_ty.is_numeric() && right_ty.is_numeric() {
        CompilerType::promote(left_ty, right_ty)
    } else {
        left_ty
    };

    gen.emit_expression(&logical.left)?;
    if left_ty.is_numeric() {
        gen.widen(left_ty, compare_ty);
    }
    gen.emit_expression(&logical.right)?;
    if right_ty.is_numeric() {
        gen.widen(right_ty, compare_ty);
    }

    let builder = gen.builder_mut();
    match logical.op {
        LogicalOperator::Less => builder.emit(Instr::Lt),
        LogicalOperator::Greater => builder.emit(Instr::Gt),
        LogicalOperator::Equal => builder.emit(Instr::Eq),
        LogicalOperator::LessEqual => {
            builder.emit(Instr::Gt);
            builder.emit(Instr::ConstFalse);
            builder.emit(Instr::Eq);
        }
        LogicalOperator::GreaterEqual => {
            builder.emit(Instr::Lt);
            builder.emit(Instr::ConstFalse);
            builder.emit(Instr::Eq);
        }
        LogicalOperator::NotEqual => {
            builder.emit(Instr::Eq);
            builder.emit(Instr::ConstFalse);
            builder.emit(Instr::Eq);
        }
        LogicalOperator::And | LogicalOperator::Or => {
            return Err(CompileError::Internal(
                "short-circuit operator reached comparison emission".into(),
            ))
        }
    }
    Ok(())
}
