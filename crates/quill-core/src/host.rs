//! The Host Type Provider: the fixed external symbol table visible to
//! compiled source.
//!
//! A `HostType` exposes named methods (with full signatures and Rust
//! closures as bodies) and named static fields. Field cells are
//! lock-protected so a shared provider tolerates concurrent reads and
//! field stores from concurrently executing programs.

use crate::error::{VmError, VmResult};
use crate::value::Value;
use parking_lot::RwLock;
use quill_bytecode::Program;
use quill_parser::symbols::{FieldSignature, HostSignatures, MethodSignature};
use quill_parser::CompilerType;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A host method body. Receives the evaluated arguments; writes into the
/// slice are copied back into by-reference argument slots after the call.
pub type HostFn = Arc<dyn Fn(&mut [Value]) -> Value + Send + Sync>;

pub struct HostMethod {
    name: String,
    params: Vec<CompilerType>,
    ret: CompilerType,
    body: HostFn,
}

impl HostMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[CompilerType] {
        &self.params
    }

    pub fn return_type(&self) -> CompilerType {
        self.ret
    }

    pub fn invoke(&self, args: &mut [Value]) -> Value {
        (self.body)(args)
    }

    fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.clone(),
            params: self.params.clone(),
            ret: self.ret,
        }
    }
}

impl std::fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostMethod")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

/// A host static field: a typed, lock-protected cell.
#[derive(Debug)]
pub struct HostField {
    name: String,
    ty: CompilerType,
    cell: RwLock<i64>,
}

impl HostField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> CompilerType {
        self.ty
    }

    /// Read the cell as a typed value.
    pub fn load(&self) -> Value {
        let raw = *self.cell.read();
        match self.ty {
            CompilerType::Int => Value::I32(raw as i32),
            CompilerType::Long => Value::I64(raw),
            _ => Value::Bool(raw != 0),
        }
    }

    /// Store a scalar into the cell.
    pub fn store(&self, value: Value) -> VmResult<()> {
        let raw = value.as_long().ok_or(VmError::TypeMismatch {
            expected: "scalar",
            found: value.type_name(),
        })?;
        *self.cell.write() = raw;
        Ok(())
    }

    /// The raw cell contents, for embedders and tests.
    pub fn raw(&self) -> i64 {
        *self.cell.read()
    }
}

/// A fixed set of host methods and static fields, like a link-time symbol
/// table. Built once by the embedder, then shared read-only between
/// compile calls.
#[derive(Debug, Default)]
pub struct HostType {
    methods: Vec<HostMethod>,
    fields: Vec<HostField>,
    method_index: FxHashMap<String, usize>,
    field_index: FxHashMap<String, usize>,
}

impl HostType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method. A duplicate name replaces the earlier entry.
    pub fn define_method(
        &mut self,
        name: &str,
        params: &[CompilerType],
        ret: CompilerType,
        body: impl Fn(&mut [Value]) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        let method = HostMethod {
            name: name.to_string(),
            params: params.to_vec(),
            ret,
            body: Arc::new(body),
        };
        if let Some(&i) = self.method_index.get(name) {
            self.methods[i] = method;
        } else {
            self.method_index.insert(name.to_string(), self.methods.len());
            self.methods.push(method);
        }
        self
    }

    /// Register a static field with an initial value. A duplicate name
    /// replaces the earlier entry.
    pub fn define_field(&mut self, name: &str, ty: CompilerType, initial: i64) -> &mut Self {
        let field = HostField {
            name: name.to_string(),
            ty,
            cell: RwLock::new(initial),
        };
        if let Some(&i) = self.field_index.get(name) {
            self.fields[i] = field;
        } else {
            self.field_index.insert(name.to_string(), self.fields.len());
            self.fields.push(field);
        }
        self
    }

    pub fn method(&self, name: &str) -> Option<&HostMethod> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }

    pub fn field(&self, name: &str) -> Option<&HostField> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Current value of a field, for embedders and tests.
    pub fn field_value(&self, name: &str) -> Option<i64> {
        self.field(name).map(HostField::raw)
    }

    /// Export the signature tables the parser resolves against.
    pub fn signatures(&self) -> HostSignatures {
        HostSignatures::new(
            self.fields
                .iter()
                .map(|f| FieldSignature {
                    name: f.name.clone(),
                    ty: f.ty,
                })
                .collect(),
            self.methods.iter().map(HostMethod::signature).collect(),
        )
    }
}

/// A program's host symbols resolved to indices into one `HostType`.
///
/// Resolution happens once per compiled program; execution then reaches
/// methods and fields by position.
#[derive(Debug, Clone, Default)]
pub struct HostBinding {
    pub(crate) methods: Vec<usize>,
    pub(crate) fields: Vec<usize>,
}

impl HostBinding {
    pub fn resolve(program: &Program, host: &HostType) -> VmResult<Self> {
        let methods = program
            .methods
            .iter()
            .map(|m| {
                host.method_index
                    .get(&m.name)
                    .copied()
                    .ok_or_else(|| VmError::UnboundMethod(m.name.clone()))
            })
            .collect::<VmResult<Vec<_>>>()?;
        let fields = program
            .fields
            .iter()
            .map(|f| {
                host.field_index
                    .get(&f.name)
                    .copied()
                    .ok_or_else(|| VmError::UnboundField(f.name.clone()))
            })
            .collect::<VmResult<Vec<_>>>()?;
        Ok(Self { methods, fields })
    }

    pub(crate) fn method<'h>(&self, host: &'h HostType, index: u16) -> VmResult<&'h HostMethod> {
        let i = *self
            .methods
            .get(index as usize)
            .ok_or(VmError::BadSlot { index })?;
        Ok(&host.methods[i])
    }

    pub(crate) fn field<'h>(&self, host: &'h HostType, index: u16) -> VmResult<&'h HostField> {
        let i = *self
            .fields
            .get(index as usize)
            .ok_or(VmError::BadSlot { index })?;
        Ok(&host.fields[i])
    }
}
