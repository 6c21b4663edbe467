//! Symbol tables for name resolution.
//!
//! Resolution order at a use site is fixed: parameter table, then local
//! table, then host field table — first hit wins. Locals may shadow host
//! fields but may not collide with parameters.

use crate::types::CompilerType;
use rustc_hash::FxHashMap;

/// Fixed, positional parameter table.
#[derive(Debug, Clone, Default)]
pub struct ParamTable {
    params: Vec<(String, CompilerType)>,
}

impl ParamTable {
    pub fn new(params: &[(&str, CompilerType)]) -> Self {
        Self {
            params: params
                .iter()
                .map(|(name, ty)| (name.to_string(), *ty))
                .collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<(u16, CompilerType)> {
        self.params
            .iter()
            .position(|(n, _)| n == name)
            .map(|i| (i as u16, self.params[i].1))
    }

    pub fn types(&self) -> Vec<CompilerType> {
        self.params.iter().map(|(_, ty)| *ty).collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Mutable local table; each local's index equals its declaration order.
#[derive(Debug, Clone, Default)]
pub struct LocalTable {
    locals: Vec<(String, CompilerType)>,
    index: FxHashMap<String, u16>,
}

impl LocalTable {
    /// Declare a new local, returning its slot index, or `None` if the
    /// name is already declared.
    pub fn declare(&mut self, name: &str, ty: CompilerType) -> Option<u16> {
        if self.index.contains_key(name) {
            return None;
        }
        let slot = self.locals.len() as u16;
        self.locals.push((name.to_string(), ty));
        self.index.insert(name.to_string(), slot);
        Some(slot)
    }

    pub fn lookup(&self, name: &str) -> Option<(u16, CompilerType)> {
        self.index
            .get(name)
            .map(|&i| (i, self.locals[i as usize].1))
    }

    pub fn types(&self) -> Vec<CompilerType> {
        self.locals.iter().map(|(_, ty)| *ty).collect()
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }
}

/// A host static field visible to compiled source.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSignature {
    pub name: String,
    pub ty: CompilerType,
}

/// A host method visible to compiled source.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<CompilerType>,
    pub ret: CompilerType,
}

/// The host-provided half of the compile environment: field and method
/// signatures exported by the Host Type Provider. Shared and read-only
/// during compilation.
#[derive(Debug, Clone, Default)]
pub struct HostSignatures {
    fields: Vec<FieldSignature>,
    methods: Vec<MethodSignature>,
    field_index: FxHashMap<String, usize>,
    method_index: FxHashMap<String, usize>,
}

impl HostSignatures {
    pub fn new(fields: Vec<FieldSignature>, methods: Vec<MethodSignature>) -> Self {
        let field_index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        let method_index = methods
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Self {
            fields,
            methods,
            field_index,
            method_index,
        }
    }

    pub fn field(&self, name: &str) -> Option<(u16, &FieldSignature)> {
        self.field_index
            .get(name)
            .map(|&i| (i as u16, &self.fields[i]))
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }
}

/// The full compile environment handed to the parser: parameters, the
/// mutable local table, and the host symbol tables.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub params: ParamTable,
    pub locals: LocalTable,
    pub host: HostSignatures,
}

impl Env {
    pub fn new(params: ParamTable, host: HostSignatures) -> Self {
        Self {
            params,
            locals: LocalTable::default(),
            host,
        }
    }
}
