//! Runtime value representation.
//!
//! The value universe is three scalars plus a slot reference (the address
//! form of an argument, local or host field). Widths are kept distinct so
//! the widening instruction has real meaning at run time.

use std::fmt;

/// Which slot space a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSpace {
    Arg,
    Local,
    Static,
}

/// The address of a mutable slot, produced by the `Load*Ref` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub space: SlotSpace,
    pub index: u16,
}

/// A value on the operand stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    I32(i32),
    I64(i64),
    Bool(bool),
    Ref(SlotRef),
}

impl Value {
    #[inline]
    pub fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    #[inline]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any scalar as a 64-bit integer: ints widen, booleans become 0/1.
    /// References have no numeric reading.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            Value::Bool(v) => Some(*v as i64),
            Value::Ref(_) => None,
        }
    }

    /// Type name for diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::I32(_) => "int",
            Value::I64(_) => "long",
            Value::Bool(_) => "bool",
            Value::Ref(_) => "ref",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Ref(slot) => write!(f, "&{:?}[{}]", slot.space, slot.index),
        }
    }
}
