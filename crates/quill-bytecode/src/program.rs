//! The compiled program container.

use crate::instr::{Instr, Label};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Runtime width of an argument or local slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotType {
    I32,
    I64,
    Bool,
}

/// A host method referenced by the program, bound by name at execution
/// setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRef {
    pub name: String,
    pub arity: u8,
}

/// A host static field referenced by the program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    pub name: String,
}

/// A compiled program: the linear instruction stream, the resolved label
/// table, slot type tables, and the host symbols it binds against.
///
/// Programs are immutable once built and hold no host handles themselves,
/// so one program can be executed concurrently from multiple threads, each
/// with its own VM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub code: Vec<Instr>,
    /// Label id → instruction index.
    pub labels: Vec<u32>,
    pub param_types: Vec<SlotType>,
    pub local_types: Vec<SlotType>,
    pub methods: Vec<MethodRef>,
    pub fields: Vec<FieldRef>,
}

impl Program {
    /// Resolve a label to its instruction index.
    pub fn label_target(&self, label: Label) -> Option<usize> {
        self.labels.get(label.0 as usize).map(|&i| i as usize)
    }

    /// Human-readable instruction listing with label marks, for
    /// diagnostics.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "; program {}", self.name);
        if !self.methods.is_empty() {
            for (i, m) in self.methods.iter().enumerate() {
                let _ = writeln!(out, ";   method {i} = {}/{}", m.name, m.arity);
            }
        }
        if !self.fields.is_empty() {
            for (i, f) in self.fields.iter().enumerate() {
                let _ = writeln!(out, ";   field {i} = {}", f.name);
            }
        }
        for (pos, instr) in self.code.iter().enumerate() {
            for (id, &target) in self.labels.iter().enumerate() {
                if target as usize == pos {
                    let _ = writeln!(out, "L{id}:");
                }
            }
            let _ = writeln!(out, "  {instr}");
        }
        // Labels resolving past the last instruction.
        for (id, &target) in self.labels.iter().enumerate() {
            if target as usize == self.code.len() {
                let _ = writeln!(out, "L{id}:");
            }
        }
        out
    }
}
