//! Execution target for the Quill language: the stack-machine
//! interpreter, runtime values, and the Host Type Provider.

pub mod error;
pub mod host;
pub mod stack;
pub mod value;
pub mod vm;

pub use error::{VmError, VmResult};
pub use host::{HostBinding, HostField, HostFn, HostMethod, HostType};
pub use value::{SlotRef, SlotSpace, Value};
pub use vm::Vm;
