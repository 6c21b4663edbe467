//! Static type tags and the named well-known constant table.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::fmt;

/// The four static types of the Quill language, ordered `Int < Long` for
/// numeric promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompilerType {
    Int,
    Long,
    Bool,
    Void,
}

impl CompilerType {
    /// True for the two integer widths.
    pub fn is_numeric(self) -> bool {
        matches!(self, CompilerType::Int | CompilerType::Long)
    }

    /// The wider of two numeric types under `Int < Long`.
    ///
    /// Callers must only pass numeric types; `Bool`/`Void` never reach a
    /// promotion site in a type-checked tree.
    pub fn promote(a: CompilerType, b: CompilerType) -> CompilerType {
        if a == CompilerType::Long || b == CompilerType::Long {
            CompilerType::Long
        } else {
            CompilerType::Int
        }
    }
}

impl fmt::Display for CompilerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompilerType::Int => "int",
            CompilerType::Long => "long",
            CompilerType::Bool => "bool",
            CompilerType::Void => "void",
        };
        f.write_str(name)
    }
}

/// Named well-known constants recognized by the lexer.
///
/// Each entry maps a source spelling to its literal decimal replacement
/// text. Negative replacements are split by the lexer into a Minus token
/// followed by the unsigned digit run, so sign handling downstream stays
/// uniform with ordinary literals.
pub struct ConstantTable {
    entries: FxHashMap<&'static str, &'static str>,
}

impl ConstantTable {
    fn new() -> Self {
        let mut entries = FxHashMap::default();
        entries.insert("int.MaxValue", "2147483647");
        entries.insert("int.MinValue", "-2147483648");
        entries.insert("long.MaxValue", "9223372036854775807");
        entries.insert("long.MinValue", "-9223372036854775808");
        Self { entries }
    }

    /// Shared immutable instance, constructed once.
    pub fn global() -> &'static ConstantTable {
        static TABLE: Lazy<ConstantTable> = Lazy::new(ConstantTable::new);
        &TABLE
    }

    pub fn lookup(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).copied()
    }
}
