//! Code generation from the typed AST to the instruction stream.
//!
//! Expression lowering is post-order: operands before operator, with a
//! widening instruction inserted on the narrower operand wherever a
//! binary/logical/call site mixes widths. Boolean expressions go through
//! the short-circuit lowering in [`control`].

mod control;

use quill_bytecode::{BytecodeError, Instr, Program, ProgramBuilder, SlotType};
use quill_parser::ast::{
    Block, CallExpression, Expression, IfStatement, Literal, SlotKind, Statement, UnaryOperator,
    VariableRef,
};
use quill_parser::{CompileError, CompileResult, CompilerType, SlotLayout};

/// Generates the instruction stream for one program.
///
/// All state is call-scoped; the generator is consumed by `finish`.
pub struct CodeGenerator {
    builder: ProgramBuilder,
}

impl CodeGenerator {
    pub fn new(name: &str, layout: &SlotLayout) -> CompileResult<Self> {
        let param_types = slot_types(&layout.params)?;
        let local_types = slot_types(&layout.locals)?;
        Ok(Self {
            builder: ProgramBuilder::new(name, param_types, local_types),
        })
    }

    pub fn finish(self) -> CompileResult<Program> {
        self.builder.build().map_err(internal)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn emit_block(&mut self, block: &Block) -> CompileResult<()> {
        for statement in &block.statements {
            self.emit_statement(statement)?;
        }
        Ok(())
    }

    fn emit_statement(&mut self, statement: &Statement) -> CompileResult<()> {
        match statement {
            Statement::Assign(stmt) => {
                self.emit_expression(&stmt.value)?;
                self.widen(stmt.value.ty(), stmt.target.ty);
                self.emit_store(&stmt.target)
            }
            Statement::Return(stmt) => {
                self.emit_return_value(&stmt.value)?;
                Ok(())
            }
            Statement::If(stmt) => self.emit_if(stmt),
            Statement::Call(stmt) => {
                self.emit_call(&stmt.call)?;
                if stmt.call.return_type != CompilerType::Void {
                    self.builder.emit(Instr::Pop);
                }
                Ok(())
            }
            Statement::Block(block) => self.emit_block(block),
        }
    }

    /// Emit a value and return it to the caller, widening an int result to
    /// the long calling convention.
    pub fn emit_return_value(&mut self, value: &Expression) -> CompileResult<()> {
        self.emit_expression(value)?;
        if value.ty() == CompilerType::Int {
            self.builder.emit(Instr::I2L);
        }
        self.builder.emit(Instr::Ret);
        Ok(())
    }

    fn emit_if(&mut self, stmt: &IfStatement) -> CompileResult<()> {
        // The test lowers to a single boolean on the stack, then one
        // conditional branch to the else arm (or past the whole statement
        // when there is none).
        control::emit_condition(self, &stmt.test)?;
        let else_label = self.builder.define_label();
        self.builder.emit(Instr::JumpIfFalse(else_label));

        self.emit_block(&stmt.then_block)?;

        match &stmt.else_block {
            Some(else_block) => {
                let end_label = if stmt.then_block.guarantees_return() {
                    None
                } else {
                    let end = self.builder.define_label();
                    self.builder.emit(Instr::Jump(end));
                    Some(end)
                };
                self.builder.mark_label(else_label);
                self.emit_block(else_block)?;
                if let Some(end) = end_label {
                    self.builder.mark_label(end);
                }
            }
            None => {
                self.builder.mark_label(else_label);
            }
        }
        Ok(())
    }

    fn emit_store(&mut self, target: &VariableRef) -> CompileResult<()> {
        let instr = match target.slot {
            SlotKind::Param => Instr::StoreArg(target.index),
            SlotKind::Local => Instr::StoreLocal(target.index),
            SlotKind::Field => Instr::StoreStatic(self.builder.add_field(&target.name).map_err(internal)?),
        };
        self.builder.emit(instr);
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub(crate) fn emit_expression(&mut self, expr: &Expression) -> CompileResult<()> {
        match expr {
            Expression::Literal(lit) => {
                self.emit_literal(lit);
                Ok(())
            }
            Expression::Variable(var) => self.emit_load(var),
            Expression::Unary(unary) => match unary.op {
                UnaryOperator::Negate => {
                    self.emit_expression(&unary.operand)?;
                    self.builder.emit(Instr::Neg);
                    Ok(())
                }
                // A negated boolean is a condition; the normalizer folds
                // the negation away before emission.
                UnaryOperator::Not => control::emit_condition(self, expr),
            },
            Expression::Binary(binary) => {
                self.emit_expression(&binary.left)?;
                self.widen(binary.left.ty(), binary.ty);
                self.emit_expression(&binary.right)?;
                self.widen(binary.right.ty(), binary.ty);
                self.builder.emit(match binary.op {
                    quill_parser::ast::BinaryOperator::Add => Instr::Add,
                    quill_parser::ast::BinaryOperator::Sub => Instr::Sub,
                    quill_parser::ast::BinaryOperator::Mul => Instr::Mul,
                    quill_parser::ast::BinaryOperator::Div => Instr::Div,
                });
                Ok(())
            }
            Expression::Logical(_) => control::emit_condition(self, expr),
            Expression::Call(call) => self.emit_call(call),
        }
    }

    fn emit_literal(&mut self, lit: &Literal) {
        let instr = match lit.ty {
            CompilerType::Int => Instr::ConstI32(lit.value as i32),
            CompilerType::Long => Instr::ConstI64(lit.value),
            _ => {
                if lit.value != 0 {
                    Instr::ConstTrue
                } else {
                    Instr::ConstFalse
                }
            }
        };
        self.builder.emit(instr);
    }

    fn emit_load(&mut self, var: &VariableRef) -> CompileResult<()> {
        let instr = match (var.slot, var.by_ref) {
            (SlotKind::Param, false) => Instr::LoadArg(var.index),
            (SlotKind::Param, true) => Instr::LoadArgRef(var.index),
            (SlotKind::Local, false) => Instr::LoadLocal(var.index),
            (SlotKind::Local, true) => Instr::LoadLocalRef(var.index),
            (SlotKind::Field, false) => {
                Instr::LoadStatic(self.builder.add_field(&var.name).map_err(internal)?)
            }
            (SlotKind::Field, true) => {
                Instr::LoadStaticRef(self.builder.add_field(&var.name).map_err(internal)?)
            }
        };
        self.builder.emit(instr);
        Ok(())
    }

    fn emit_call(&mut self, call: &CallExpression) -> CompileResult<()> {
        for (arg, &formal) in call.args.iter().zip(&call.param_types) {
            self.emit_expression(arg)?;
            let by_ref = matches!(arg, Expression::Variable(v) if v.by_ref);
            if !by_ref {
                self.widen(arg.ty(), formal);
            }
        }
        let index = self
            .builder
            .add_method(&call.name, call.param_types.len() as u8)
            .map_err(internal)?;
        self.builder.emit(Instr::Call(index));
        Ok(())
    }

    /// Insert the Int→Long widening instruction when a narrower operand
    /// meets a long context.
    pub(crate) fn widen(&mut self, from: CompilerType, to: CompilerType) {
        if from == CompilerType::Int && to == CompilerType::Long {
            self.builder.emit(Instr::I2L);
        }
    }

    pub(crate) fn builder_mut(&mut self) -> &mut ProgramBuilder {
        &mut self.builder
    }
}

fn slot_types(types: &[CompilerType]) -> CompileResult<Vec<SlotType>> {
    types
        .iter()
        .map(|ty| match ty {
            CompilerType::Int => Ok(SlotType::I32),
            CompilerType::Long => Ok(SlotType::I64),
            CompilerType::Bool => Ok(SlotType::Bool),
            CompilerType::Void => Err(CompileError::Internal("void slot type".into())),
        })
        .collect()
}

fn internal(err: BytecodeError) -> CompileError {
    CompileError::Internal(err.to_string())
}
