//! Declaration grammar for parameters.
//!
//! A parameter's annotation is a small dynamic value: a bare type tag, a
//! string literal, the continuation marker `...`, or a tuple/list of those.
//! Nothing in this module interprets shapes; classification lives in
//! [`crate::resolve`].

use serde::Serialize;

// ------------------------------ Primitives -------------------------------- //

/// Primitive value types a flag can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Int,
    Float,
    Str,
    Bool,
}

impl Primitive {
    /// Short name used in display types and help text.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Str => "str",
            Primitive::Bool => "bool",
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ------------------------------ Annotations ------------------------------- //

/// One node of a raw annotation value.
///
/// The grammar is closed: anything outside it is rejected during
/// classification rather than silently accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// A bare type tag, e.g. `int`.
    Type(Primitive),
    /// A string literal: a choice member, or a trailing description.
    Literal(String),
    /// The "continue indefinitely" marker closing a variadic tuple.
    Ellipsis,
    /// Parenthesised sequence: fixed tuple, variadic tuple, or a
    /// `(descriptor, description)` pair.
    Tuple(Vec<Decl>),
    /// Bracketed collection: `[T]` or a choice set.
    List(Vec<Decl>),
}

impl Decl {
    pub fn lit(s: impl Into<String>) -> Self {
        Decl::Literal(s.into())
    }
}

impl From<Primitive> for Decl {
    fn from(ty: Primitive) -> Self {
        Decl::Type(ty)
    }
}

// ------------------------------- Defaults --------------------------------- //

/// A concrete value, restricted to the shapes the grammar admits. Used both
/// for declared defaults and for values bound back from parsed tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Tuple(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(f: &mut std::fmt::Formatter<'_>, items: &[Value]) -> std::fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }
        match self {
            Value::Int(v) => write!(f, "{v}"),
            // Whole floats keep a trailing `.0` so a float default never
            // reads like an int in help text.
            Value::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.1}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Tuple(items) => {
                f.write_str("(")?;
                join(f, items)?;
                f.write_str(")")
            }
            Value::List(items) => {
                f.write_str("[")?;
                join(f, items)?;
                f.write_str("]")
            }
        }
    }
}

/// Whether a parameter declared a default, and what it was.
///
/// `Null` models "a default must be supplied programmatically": the flag is
/// named like an optional one but stays externally required. Distinct from
/// `Absent` (no default at all, positional) and from any concrete `Value`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum DeclaredDefault {
    #[default]
    Absent,
    Null,
    Value(Value),
}

impl DeclaredDefault {
    /// True for `Null` and `Value`: the parameter gets a `--name` flag.
    pub fn is_present(&self) -> bool {
        !matches!(self, DeclaredDefault::Absent)
    }
}

// ------------------------------- Tests ------------------------------------ //
