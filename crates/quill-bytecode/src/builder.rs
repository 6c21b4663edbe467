//! Helper for building programs.

use crate::error::BytecodeError;
use crate::instr::{Instr, Label};
use crate::program::{FieldRef, MethodRef, Program, SlotType};
use rustc_hash::FxHashMap;

/// Builds the instruction stream for one program.
///
/// Branch targets are handled in two passes: `define_label` hands out an
/// opaque handle, branch instructions embed it, and `mark_label` pins the
/// handle to the next emitted position. `build` resolves the table and
/// rejects any label that was defined but never marked.
pub struct ProgramBuilder {
    name: String,
    code: Vec<Instr>,
    labels: Vec<Option<u32>>,
    param_types: Vec<SlotType>,
    local_types: Vec<SlotType>,
    methods: Vec<MethodRef>,
    method_index: FxHashMap<String, u16>,
    fields: Vec<FieldRef>,
    field_index: FxHashMap<String, u16>,
}

impl ProgramBuilder {
    pub fn new(name: &str, param_types: Vec<SlotType>, local_types: Vec<SlotType>) -> Self {
        Self {
            name: name.to_string(),
            code: Vec::new(),
            labels: Vec::new(),
            param_types,
            local_types,
            methods: Vec::new(),
            method_index: FxHashMap::default(),
            fields: Vec::new(),
            field_index: FxHashMap::default(),
        }
    }

    pub fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    /// Allocate a fresh, unmarked label.
    pub fn define_label(&mut self) -> Label {
        let id = self.labels.len() as u32;
        self.labels.push(None);
        Label(id)
    }

    /// Pin a label to the next emitted instruction position.
    pub fn mark_label(&mut self, label: Label) {
        self.labels[label.0 as usize] = Some(self.code.len() as u32);
    }

    /// Intern a host method reference, returning its call index.
    pub fn add_method(&mut self, name: &str, arity: u8) -> Result<u16, BytecodeError> {
        if let Some(&index) = self.method_index.get(name) {
            return Ok(index);
        }
        if self.methods.len() >= u16::MAX as usize {
            return Err(BytecodeError::TooManyMethods);
        }
        let index = self.methods.len() as u16;
        self.methods.push(MethodRef {
            name: name.to_string(),
            arity,
        });
        self.method_index.insert(name.to_string(), index);
        Ok(index)
    }

    /// Intern a host field reference, returning its slot index.
    pub fn add_field(&mut self, name: &str) -> Result<u16, BytecodeError> {
        if let Some(&index) = self.field_index.get(name) {
            return Ok(index);
        }
        if self.fields.len() >= u16::MAX as usize {
            return Err(BytecodeError::TooManyFields);
        }
        let index = self.fields.len() as u16;
        self.fields.push(FieldRef {
            name: name.to_string(),
        });
        self.field_index.insert(name.to_string(), index);
        Ok(index)
    }

    /// Current emission position (used by tests inspecting branch shape).
    pub fn position(&self) -> usize {
        self.code.len()
    }

    pub fn build(self) -> Result<Program, BytecodeError> {
        let mut labels = Vec::with_capacity(self.labels.len());
        for (id, target) in self.labels.iter().enumerate() {
            match target {
                Some(pos) => labels.push(*pos),
                None => return Err(BytecodeError::UnboundLabel(id as u32)),
            }
        }
        Ok(Program {
            name: self.name,
            code: self.code,
            labels,
            param_types: self.param_types,
            local_types: self.local_types,
            methods: self.methods,
            fields: self.fields,
        })
    }
}
