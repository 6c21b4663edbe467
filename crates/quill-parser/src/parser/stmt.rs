//! Statement parsing.

use super::{expr, Parser};
use crate::ast::{
    AssignStatement, Block, CallStatement, Expression, IfStatement, ReturnStatement, SlotKind,
    Statement, VariableRef,
};
use crate::error::{CompileError, CompileResult};
use crate::token::Token;
use crate::types::CompilerType;

pub(crate) fn parse_statement(p: &mut Parser) -> CompileResult<Statement> {
    match p.current().clone() {
        Token::Int => parse_declaration(p, CompilerType::Int),
        Token::Long => parse_declaration(p, CompilerType::Long),
        Token::Bool => parse_declaration(p, CompilerType::Bool),
        Token::Variable(name) => {
            p.advance();
            parse_assignment(p, &name)
        }
        Token::Return => parse_return(p),
        Token::If => parse_if(p),
        Token::Word(name) => {
            p.advance();
            parse_call_statement(p, name)
        }
        Token::LeftBrace => Ok(Statement::Block(parse_block(p)?)),
        other => Err(p.syntax_error(format!("expected a statement, found '{other}'"))),
    }
}

fn parse_declaration(p: &mut Parser, ty: CompilerType) -> CompileResult<Statement> {
    p.advance(); // type keyword

    let name = match p.current().clone() {
        Token::Variable(name) => {
            p.advance();
            name
        }
        other => return Err(p.syntax_error(format!("expected a variable name, found '{other}'"))),
    };

    if p.env.params.lookup(&name).is_some() {
        return Err(p.scope_error(format!(
            "A local variable named '{name}' conflicts with a parameter of the same name"
        )));
    }
    if p.env.locals.lookup(&name).is_some() {
        return Err(p.scope_error(format!(
            "A local variable named '{name}' is already declared"
        )));
    }

    p.expect(&Token::Assign)?;
    let value = expr::parse_or(p)?;
    p.expect(&Token::Semicolon)?;
    check_assignable(p, ty, &value)?;

    if p.env.locals.len() >= u16::MAX as usize {
        return Err(CompileError::TooManyLocals);
    }
    let index = p
        .env
        .locals
        .declare(&name, ty)
        .ok_or_else(|| CompileError::Internal(format!("local '{name}' redeclared")))?;

    Ok(Statement::Assign(AssignStatement {
        target: VariableRef {
            name,
            ty,
            slot: SlotKind::Local,
            index,
            by_ref: false,
        },
        value,
    }))
}

fn parse_assignment(p: &mut Parser, name: &str) -> CompileResult<Statement> {
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

    p.expect(&Token::Assign)?;
    let value = expr::parse_or(p)?;
    p.expect(&Token::Semicolon)?;
    check_assignable(p, ty, &value)?;

    Ok(Statement::Assign(AssignStatement {
        target: VariableRef {
            name: name.to_string(),
            ty,
            slot,
            index,
            by_ref: false,
        },
        value,
    }))
}

fn parse_return(p: &mut Parser) -> CompileResult<Statement> {
    p.advance(); // return
    let value = expr::parse_or(p)?;
    p.expect(&Token::Semicolon)?;
    Ok(Statement::Return(ReturnStatement { value }))
}

fn parse_if(p: &mut Parser) -> CompileResult<Statement> {
    p.advance(); // if
    p.expect(&Token::LeftParen)?;
    let test = expr::parse_or(p)?;
    if test.ty() != CompilerType::Bool {
        return Err(p.type_error(format!(
            "if condition must be of type 'bool', found '{}'",
            test.ty()
        )));
    }
    p.expect(&Token::RightParen)?;
    let then_block = parse_block(p)?;

    let else_block = if p.check(&Token::Else) {
        p.advance();
        if p.check(&Token::If) {
            // `else if` chains nest as a single-statement else block.
            Some(Block {
                statements: vec![parse_statement(p)?],
            })
        } else {
            Some(parse_block(p)?)
        }
    } else {
        None
    };

    Ok(Statement::If(IfStatement {
        test,
        then_block,
        else_block,
    }))
}

fn parse_call_statement(p: &mut Parser, name: String) -> CompileResult<Statement> {
    let call = match expr::parse_call(p, name)? {
        Expression::Call(call) => call,
        _ => return Err(CompileError::Internal("call parse produced non-call".into())),
    };
    p.expect(&Token::Semicolon)?;
    Ok(Statement::Call(CallStatement { call }))
}

fn parse_block(p: &mut Parser) -> CompileResult<Block> {
    p.expect(&Token::LeftBrace)?;
    let mut statements = Vec::new();
    while !p.check(&Token::RightBrace) {
        if p.at_eof() {
            return Err(p.syntax_error("unexpected end of input, expected '}'"));
        }
        statements.push(parse_statement(p)?);
    }
    p.expect(&Token::RightBrace)?;
    Ok(Block { statements })
}

/// The implicit-conversion check for assignments and declarations.
///
/// Int→Long always widens. Narrowing Long→Int is rejected only when the
/// source's *shallow* static type is Long (a literal, negation, variable
/// or call); a compound arithmetic source escapes the check.
fn check_assignable(p: &Parser, target: CompilerType, value: &Expression) -> CompileResult<()> {
    let source = value.ty();
    if source == target {
        return Ok(());
    }
    match (target, source) {
        (CompilerType::Long, CompilerType::Int) => Ok(()),
        (CompilerType::Int, CompilerType::Long) => {
            if value.shallow_type() == Some(CompilerType::Long) {
                Err(p.type_error("Cannot implicitly convert type 'long' to 'int'"))
            } else {
                Ok(())
            }
        }
        _ => Err(p.type_error(format!(
            "Cannot implicitly convert type '{source}' to '{target}'"
        ))),
    }
}
