//! The stack-machine interpreter.
//!
//! Executes one program synchronously: fetch, dispatch, repeat. All
//! mutable state (operand stack, argument and local slots) is call-scoped,
//! so one `Vm` per thread executes independently; the only shared resource
//! is the host type's field cells, which are lock-protected.
//!
//! Runtime arithmetic is unchecked (wrapping); only division by zero
//! faults. Compile-time folding is where overflow is detected.

use crate::error::{VmError, VmResult};
use crate::host::{HostBinding, HostType};
use crate::stack::Stack;
use crate::value::{SlotRef, SlotSpace, Value};
use quill_bytecode::{Instr, Label, Program, SlotType};
use quill_parser::CompilerType;

/// The Quill virtual machine.
pub struct Vm {
    stack: Stack,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Stack::new(),
        }
    }

    /// Execute a program against a host type.
    ///
    /// `binding` must have been resolved against the same `host`.
    pub fn execute(
        &mut self,
        program: &Program,
        args: Vec<Value>,
        host: &HostType,
        binding: &HostBinding,
    ) -> VmResult<Value> {
        check_args(&args, &program.param_types)?;
        self.stack.clear();

        let mut frame = Frame {
            args,
            locals: program.local_types.iter().map(default_value).collect(),
        };

        let code = &program.code;
        let mut ip = 0usize;

        loop {
            let Some(instr) = code.get(ip) else {
                return Err(VmError::EndOfCode);
            };
            ip += 1;

            match *instr {
                Instr::ConstI32(v) => self.stack.push(Value::I32(v)),
                Instr::ConstI64(v) => self.stack.push(Value::I64(v)),
                Instr::ConstTrue => self.stack.push(Value::Bool(true)),
                Instr::ConstFalse => self.stack.push(Value::Bool(false)),

                Instr::LoadArg(i) => {
                    let value = *frame.args.get(i as usize).ok_or(VmError::BadSlot { index: i })?;
                    self.stack.push(value);
                }
                Instr::StoreArg(i) => {
                    let value = self.stack.pop()?;
                    let slot = frame.args.get_mut(i as usize).ok_or(VmError::BadSlot { index: i })?;
                    *slot = value;
                }
                Instr::LoadArgRef(i) => self.stack.push(Value::Ref(SlotRef {
                    space: SlotSpace::Arg,
                    index: i,
                })),

                Instr::LoadLocal(i) => {
                    let value = *frame
                        .locals
                        .get(i as usize)
                        .ok_or(VmError::BadSlot { index: i })?;
                    self.stack.push(value);
                }
                Instr::StoreLocal(i) => {
                    let value = self.stack.pop()?;
                    let slot = frame
                        .locals
                        .get_mut(i as usize)
                        .ok_or(VmError::BadSlot { index: i })?;
                    *slot = value;
                }
                Instr::LoadLocalRef(i) => self.stack.push(Value::Ref(SlotRef {
                    space: SlotSpace::Local,
                    index: i,
                })),

                Instr::LoadStatic(i) => {
                    let field = binding.field(host, i)?;
                    self.stack.push(field.load());
                }
                Instr::StoreStatic(i) => {
                    let value = self.stack.pop()?;
                    binding.field(host, i)?.store(value)?;
                }
                Instr::LoadStaticRef(i) => self.stack.push(Value::Ref(SlotRef {
                    space: SlotSpace::Static,
                    index: i,
                })),

                Instr::Add => self.arith(ArithOp::Add)?,
                Instr::Sub => self.arith(ArithOp::Sub)?,
                Instr::Mul => self.arith(ArithOp::Mul)?,
                Instr::Div => self.arith(ArithOp::Div)?,
                Instr::Neg => {
                    let value = self.stack.pop()?;
                    let negated = match value {
                        Value::I32(v) => Value::I32(v.wrapping_neg()),
                        Value::I64(v) => Value::I64(v.wrapping_neg()),
                        other => {
                            return Err(VmError::TypeMismatch {
                                expected: "int or long",
                                found: other.type_name(),
                            })
                        }
                    };
                    self.stack.push(negated);
                }

                Instr::I2L => {
                    let value = self.stack.pop()?;
                    let widened = match value {
                        Value::I32(v) => Value::I64(v as i64),
                        // Already wide; tolerated so a shallow-checked
                        // store that smuggled a long through an int slot
                        // still widens cleanly.
                        Value::I64(v) => Value::I64(v),
                        other => {
                            return Err(VmError::TypeMismatch {
                                expected: "int",
                                found: other.type_name(),
                            })
                        }
                    };
                    self.stack.push(widened);
                }

                Instr::Lt => self.compare(CmpOp::Lt)?,
                Instr::Gt => self.compare(CmpOp::Gt)?,
                Instr::Eq => self.compare(CmpOp::Eq)?,

                Instr::Jump(label) => {
                    ip = jump_target(program, label)?;
                }
                Instr::JumpIfFalse(label) => {
                    let value = self.stack.pop()?;
                    let test = value.as_bool().ok_or(VmError::TypeMismatch {
                        expected: "bool",
                        found: value.type_name(),
                    })?;
                    if !test {
                        ip = jump_target(program, label)?;
                    }
                }

                Instr::Call(index) => {
                    let method = binding.method(host, index)?;
                    let argc = method.params().len();
                    let mut call_args = vec![Value::I32(0); argc];
                    for slot in call_args.iter_mut().rev() {
                        *slot = self.stack.pop()?;
                    }

                    // Copy-in: replace references with the values they
                    // point at, remembering where to copy back.
                    let mut ref_args: Vec<(usize, SlotRef)> = Vec::new();
                    for (i, value) in call_args.iter_mut().enumerate() {
                        if let Value::Ref(slot) = *value {
                            ref_args.push((i, slot));
                            *value = frame.read_slot(slot, host, binding)?;
                        }
                    }

                    let result = method.invoke(&mut call_args);

                    // Copy-out through the remembered references.
                    for (i, slot) in ref_args {
                        frame.write_slot(slot, call_args[i], host, binding)?;
                    }

                    if method.return_type() != CompilerType::Void {
                        self.stack.push(result);
                    }
                }
                Instr::Ret => return self.stack.pop(),
                Instr::Pop => {
                    self.stack.pop()?;
                }
            }
        }
    }

    fn arith(&mut self, op: ArithOp) -> VmResult<()> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        let result = match (a, b) {
            (Value::I32(x), Value::I32(y)) => Value::I32(match op {
                ArithOp::Add => x.wrapping_add(y),
                ArithOp::Sub => x.wrapping_sub(y),
                ArithOp::Mul => x.wrapping_mul(y),
                ArithOp::Div => {
                    if y == 0 {
                        return Err(VmError::DivisionByZero);
                    }
                    x.wrapping_div(y)
                }
            }),
            (Value::I64(x), Value::I64(y)) => Value::I64(match op {
                ArithOp::Add => x.wrapping_add(y),
                ArithOp::Sub => x.wrapping_sub(y),
                ArithOp::Mul => x.wrapping_mul(y),
                ArithOp::Div => {
                    if y == 0 {
                        return Err(VmError::DivisionByZero);
                    }
                    x.wrapping_div(y)
                }
            }),
            (a, b) => {
                return Err(VmError::TypeMismatch {
                    expected: "matching integer widths",
                    found: if a.is_ref() || b.is_ref() {
                        "ref"
                    } else {
                        "mixed operands"
                    },
                })
            }
        };
        self.stack.push(result);
        Ok(())
    }

    fn compare(&mut self, op: CmpOp) -> VmResult<()> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        let result = match (a, b) {
            (Value::I32(x), Value::I32(y)) => match op {
                CmpOp::Lt => x < y,
                CmpOp::Gt => x > y,
                CmpOp::Eq => x == y,
            },
            (Value::I64(x), Value::I64(y)) => match op {
                CmpOp::Lt => x < y,
                CmpOp::Gt => x > y,
                CmpOp::Eq => x == y,
            },
            (Value::Bool(x), Value::Bool(y)) if op == CmpOp::Eq => x == y,
            (a, b) => {
                return Err(VmError::TypeMismatch {
                    expected: "comparable operands",
                    found: if a.is_ref() || b.is_ref() {
                        "ref"
                    } else {
                        "mixed operands"
                    },
                })
            }
        };
        self.stack.push(Value::Bool(result));
        Ok(())
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Lt,
    Gt,
    Eq,
}

/// Argument and local slots for one execution.
struct Frame {
    args: Vec<Value>,
    locals: Vec<Value>,
}

impl Frame {
    fn read_slot(&self, slot: SlotRef, host: &HostType, binding: &HostBinding) -> VmResult<Value> {
        match slot.space {
            SlotSpace::Arg => self
                .args
                .get(slot.index as usize)
                .copied()
                .ok_or(VmError::BadSlot { index: slot.index }),
            SlotSpace::Local => self
                .locals
                .get(slot.index as usize)
                .copied()
                .ok_or(VmError::BadSlot { index: slot.index }),
            SlotSpace::Static => Ok(binding.field(host, slot.index)?.load()),
        }
    }

    fn write_slot(
        &mut self,
        slot: SlotRef,
        value: Value,
        host: &HostType,
        binding: &HostBinding,
    ) -> VmResult<()> {
        match slot.space {
            SlotSpace::Arg => {
                let target = self
                    .args
                    .get_mut(slot.index as usize)
                    .ok_or(VmError::BadSlot { index: slot.index })?;
                *target = value;
                Ok(())
            }
            SlotSpace::Local => {
                let target = self
                    .locals
                    .get_mut(slot.index as usize)
                    .ok_or(VmError::BadSlot { index: slot.index })?;
                *target = value;
                Ok(())
            }
            SlotSpace::Static => binding.field(host, slot.index)?.store(value),
        }
    }
}

fn default_value(ty: &SlotType) -> Value {
    match ty {
        SlotType::I32 => Value::I32(0),
        SlotType::I64 => Value::I64(0),
        SlotType::Bool => Value::Bool(false),
    }
}

fn check_args(args: &[Value], params: &[SlotType]) -> VmResult<()> {
    if args.len() != params.len() {
        return Err(VmError::ArgumentCount {
            expected: params.len(),
            found: args.len(),
        });
    }
    for (value, ty) in args.iter().zip(params) {
        let matches = matches!(
            (value, ty),
            (Value::I32(_), SlotType::I32)
                | (Value::I64(_), SlotType::I64)
                | (Value::Bool(_), SlotType::Bool)
        );
        if !matches {
            return Err(VmError::TypeMismatch {
                expected: match ty {
                    SlotType::I32 => "int",
                    SlotType::I64 => "long",
                    SlotType::Bool => "bool",
                },
                found: value.type_name(),
            });
        }
    }
    Ok(())
}

fn jump_target(program: &Program, label: Label) -> VmResult<usize> {
    match program.label_target(label) {
        Some(target) if target <= program.code.len() => Ok(target),
        _ => Err(VmError::InvalidJump(label.0)),
    }
}
