//! Typed AST for the Quill language.
//!
//! Every expression node carries its resolved static type before code
//! generation runs; no untyped node reaches the generator. The tree is
//! built once per compile call, consumed once, then discarded; generator
//! rewrites return new nodes rather than mutating in place, so ownership
//! stays strictly tree-shaped.

use crate::types::CompilerType;

/// Which slot space a variable resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Param,
    Local,
    Field,
}

/// A compile-time integer or boolean literal.
///
/// Bool literals store 0/1 in `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    pub value: i64,
    pub ty: CompilerType,
}

/// A resolved variable reference: name, type, slot space and index, and
/// whether the use site takes the address form (`ref x`).
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    pub name: String,
    pub ty: CompilerType,
    pub slot: SlotKind,
    pub index: u16,
    pub by_ref: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

/// Comparison and short-circuit operators; the node type is always Bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub op: UnaryOperator,
    pub operand: Box<Expression>,
    pub ty: CompilerType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub op: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    /// The promoted operand type under `Int < Long`.
    pub ty: CompilerType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    pub op: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

/// A call into the host type, with its resolved signature.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub name: String,
    pub args: Vec<Expression>,
    pub param_types: Vec<CompilerType>,
    pub return_type: CompilerType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(VariableRef),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Call(CallExpression),
}

impl Expression {
    /// The resolved static type of this node.
    pub fn ty(&self) -> CompilerType {
        match self {
            Expression::Literal(lit) => lit.ty,
            Expression::Variable(var) => var.ty,
            Expression::Unary(unary) => unary.ty,
            Expression::Binary(binary) => binary.ty,
            Expression::Logical(_) => CompilerType::Bool,
            Expression::Call(call) => call.return_type,
        }
    }

    /// The literal this node folds to, if it is literal-foldable: a plain
    /// literal, or a unary negation of one.
    pub fn foldable_literal(&self) -> Option<Literal> {
        match self {
            Expression::Literal(lit) => Some(*lit),
            Expression::Unary(unary) if unary.op == UnaryOperator::Negate => {
                match unary.operand.as_ref() {
                    Expression::Literal(lit) => Some(Literal {
                        value: lit.value.wrapping_neg(),
                        ty: lit.ty,
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// The type used by the shallow implicit-conversion check: only
    /// literals, unary negations, variables and calls are inspected;
    /// compound arithmetic is deliberately not (the narrowing check is a
    /// shallow one).
    pub fn shallow_type(&self) -> Option<CompilerType> {
        match self {
            Expression::Literal(_)
            | Expression::Variable(_)
            | Expression::Unary(_)
            | Expression::Call(_) => Some(self.ty()),
            Expression::Binary(_) | Expression::Logical(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStatement {
    pub target: VariableRef,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub test: Expression,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
    pub call: CallExpression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign(AssignStatement),
    Return(ReturnStatement),
    If(IfStatement),
    Call(CallStatement),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    /// Whether every path through this block ends in a return: the last
    /// statement is a Return, or an if/else whose arms both guarantee
    /// return, or a nested block that does.
    pub fn guarantees_return(&self) -> bool {
        match self.statements.last() {
            Some(Statement::Return(_)) => true,
            Some(Statement::If(stmt)) => match &stmt.else_block {
                Some(else_block) => {
                    stmt.then_block.guarantees_return() && else_block.guarantees_return()
                }
                None => false,
            },
            Some(Statement::Block(block)) => block.guarantees_return(),
            _ => false,
        }
    }
}
