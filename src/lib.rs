//! Derive a command-line flag interface from a declared parameter list.
//!
//! Each parameter carries a semantic type descriptor (plus an optional
//! description and default); the crate normalizes the descriptor into a
//! flag specification (name, arity, value type, required/optional status,
//! help text) and, after parsing, binds typed values back to parameter
//! names.
//!
//! Two-stage core, consumed in order:
//! - [`resolve`]: descriptor + default -> normalized [`resolve::FlagSpec`],
//!   or a descriptive failure. Pure, no parser object.
//! - [`compile`]: ordered parameter list -> ordered compiled flags, with
//!   description splitting, default-driven naming, and rendered help.
//!
//! [`bind`] is the thin outer layer wiring compiled flags into `clap`.

pub mod bind;
pub mod compile;
pub mod decl;
pub mod errors;
pub mod resolve;

pub use compile::{CompiledFlag, FlagGroup, GroupedFlags, Parameter, compile, compile_groups};
pub use decl::{Decl, DeclaredDefault, Primitive, Value};
pub use errors::{CompileError, ResolveError};
pub use resolve::{Arity, FlagSpec, Polarity, TypeDescriptor, classify, resolve};
