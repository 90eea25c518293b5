//! Type resolver: classify a raw descriptor and normalize it into a flag
//! specification.
//!
//! Dispatch priority over the closed grammar:
//! 1. bare non-bool type tag        -> scalar, arity one
//! 2. bare `bool`                   -> presence flag, polarity from default
//! 3. `(T, T, ..., T)` n >= 2       -> fixed arity n, display `(T, T, T)`
//! 4. `(T, ..., T, ...)` marker     -> one-or-more, display `(T, ...)`
//! 5. `[T]`                         -> zero-or-more, display `[T]`
//! 6. non-empty string collection   -> choice set, display `{a,b,c}`
//! 7. anything else                 -> `UnhandledDescriptor`
//!
//! Resolution is pure and total over the grammar: the same descriptor and
//! default always produce the same specification or the same failure kind.

use serde::Serialize;

use crate::decl::{Decl, DeclaredDefault, Primitive, Value};
use crate::errors::ResolveError;

// ------------------------------ Descriptors ------------------------------- //

/// Validated descriptor, one constructor per shape.
///
/// Statically declared parameters should build these directly (via the
/// checked helpers) and convert with `Decl::from`; the raw grammar exists
/// for declarations arriving as data.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Scalar(Primitive),
    FixedTuple(Primitive, usize),
    VariadicSequence(Primitive),
    ZeroOrMore(Primitive),
    Choice(Vec<String>),
    Boolean,
}

impl TypeDescriptor {
    /// Exactly `n` values of one type; `n` must be at least 2 (one value is
    /// a scalar, not a tuple).
    pub fn fixed_tuple(ty: Primitive, n: usize) -> Result<Self, ResolveError> {
        if n < 2 {
            return Err(ResolveError::UnhandledDescriptor(Decl::Tuple(vec![
                Decl::Type(ty);
                n
            ])));
        }
        Ok(TypeDescriptor::FixedTuple(ty, n))
    }

    /// A non-empty, ordered set of accepted string literals.
    pub fn choice<I, S>(values: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(ResolveError::EmptyCollection);
        }
        Ok(TypeDescriptor::Choice(values))
    }
}

impl From<TypeDescriptor> for Decl {
    /// Render a validated descriptor back into the raw grammar.
    fn from(td: TypeDescriptor) -> Self {
        match td {
            TypeDescriptor::Scalar(ty) => Decl::Type(ty),
            TypeDescriptor::FixedTuple(ty, n) => Decl::Tuple(vec![Decl::Type(ty); n]),
            TypeDescriptor::VariadicSequence(ty) => {
                Decl::Tuple(vec![Decl::Type(ty), Decl::Ellipsis])
            }
            TypeDescriptor::ZeroOrMore(ty) => Decl::List(vec![Decl::Type(ty)]),
            TypeDescriptor::Choice(values) => {
                Decl::List(values.into_iter().map(Decl::Literal).collect())
            }
            TypeDescriptor::Boolean => Decl::Type(Primitive::Bool),
        }
    }
}

// ---------------------------- Specifications ------------------------------ //

/// Number of values a flag consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arity {
    One,
    Fixed(usize),
    OneOrMore,
    ZeroOrMore,
}

/// Whether a boolean flag's presence stores true or false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    SetTrue,
    SetFalse,
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Polarity::SetTrue => "set-true",
            Polarity::SetFalse => "set-false",
        })
    }
}

/// Normalized flag specification.
///
/// Invariant: at most one of `value_type` and `polarity` is populated.
/// Presence flags never carry a value type or arity; choice flags carry
/// neither (the literal set stands in for a type); everything else carries
/// a value type and never a polarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<Primitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity: Option<Arity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    pub display_type: String,
}

impl FlagSpec {
    fn valued(ty: Primitive, arity: Arity, display_type: String) -> Self {
        FlagSpec {
            value_type: Some(ty),
            arity: Some(arity),
            choices: None,
            polarity: None,
            display_type,
        }
    }
}

// ---------------------------- Classification ------------------------------ //

/// Classify a raw descriptor into a validated [`TypeDescriptor`].
pub fn classify(decl: &Decl) -> Result<TypeDescriptor, ResolveError> {
    match decl {
        Decl::Type(Primitive::Bool) => Ok(TypeDescriptor::Boolean),
        Decl::Type(ty) => Ok(TypeDescriptor::Scalar(*ty)),
        Decl::Tuple(elems) => classify_tuple(decl, elems),
        Decl::List(elems) => classify_list(decl, elems),
        Decl::Literal(_) | Decl::Ellipsis => {
            Err(ResolveError::UnhandledDescriptor(decl.clone()))
        }
    }
}

fn classify_tuple(whole: &Decl, elems: &[Decl]) -> Result<TypeDescriptor, ResolveError> {
    if let Some((Decl::Ellipsis, head)) = elems.split_last() {
        if head.is_empty() {
            return Err(ResolveError::UnhandledDescriptor(whole.clone()));
        }
        let ty = uniform_tag(whole, head)?;
        return Ok(TypeDescriptor::VariadicSequence(ty));
    }
    // A 1-tuple is a scalar wearing parens and a 0-tuple says nothing;
    // both are rejected rather than guessed at.
    if elems.len() < 2 {
        return Err(ResolveError::UnhandledDescriptor(whole.clone()));
    }
    let ty = uniform_tag(whole, elems)?;
    Ok(TypeDescriptor::FixedTuple(ty, elems.len()))
}

fn classify_list(whole: &Decl, elems: &[Decl]) -> Result<TypeDescriptor, ResolveError> {
    if elems.is_empty() {
        return Err(ResolveError::EmptyCollection);
    }
    if elems
        .iter()
        .any(|e| matches!(e, Decl::Tuple(_) | Decl::List(_) | Decl::Ellipsis))
    {
        return Err(ResolveError::UnhandledDescriptor(whole.clone()));
    }
    if elems.iter().all(|e| matches!(e, Decl::Literal(_))) {
        let values = elems
            .iter()
            .map(|e| match e {
                Decl::Literal(s) => s.clone(),
                _ => unreachable!(),
            })
            .collect();
        return Ok(TypeDescriptor::Choice(values));
    }
    // The element-type marker is a collection naming exactly one type.
    // `[int, int]` repeats a tag and `[int, str]` mixes tags; neither is a
    // valid marker.
    if let [Decl::Type(ty)] = elems {
        return Ok(TypeDescriptor::ZeroOrMore(*ty));
    }
    Err(ResolveError::HeterogeneousType(whole.clone()))
}

/// Every element must be the same type tag; the shared tag is returned.
fn uniform_tag(whole: &Decl, elems: &[Decl]) -> Result<Primitive, ResolveError> {
    let mut tags = Vec::with_capacity(elems.len());
    for elem in elems {
        match elem {
            Decl::Type(ty) => tags.push(*ty),
            _ => return Err(ResolveError::UnhandledDescriptor(whole.clone())),
        }
    }
    let first = tags[0];
    if tags.iter().any(|ty| *ty != first) {
        return Err(ResolveError::HeterogeneousType(whole.clone()));
    }
    Ok(first)
}

// ------------------------------ Resolution -------------------------------- //

/// Normalize a validated descriptor into a flag specification. The default
/// only matters for boolean polarity: a `true` baseline means presence must
/// drive the value to `false`, and vice versa.
pub fn resolve_descriptor(td: &TypeDescriptor, default: &DeclaredDefault) -> FlagSpec {
    match td {
        TypeDescriptor::Boolean | TypeDescriptor::Scalar(Primitive::Bool) => {
            let polarity = match default {
                DeclaredDefault::Value(Value::Bool(true)) => Polarity::SetFalse,
                _ => Polarity::SetTrue,
            };
            FlagSpec {
                value_type: None,
                arity: None,
                choices: None,
                polarity: Some(polarity),
                display_type: Primitive::Bool.name().to_string(),
            }
        }
        TypeDescriptor::Scalar(ty) => {
            FlagSpec::valued(*ty, Arity::One, ty.name().to_string())
        }
        TypeDescriptor::FixedTuple(ty, n) => {
            let display = format!("({})", vec![ty.name(); *n].join(", "));
            FlagSpec::valued(*ty, Arity::Fixed(*n), display)
        }
        TypeDescriptor::VariadicSequence(ty) => {
            let display = format!("({}, ...)", ty.name());
            FlagSpec::valued(*ty, Arity::OneOrMore, display)
        }
        TypeDescriptor::ZeroOrMore(ty) => {
            let display = format!("[{}]", ty.name());
            FlagSpec::valued(*ty, Arity::ZeroOrMore, display)
        }
        TypeDescriptor::Choice(values) => FlagSpec {
            value_type: None,
            arity: Some(Arity::One),
            choices: Some(values.clone()),
            polarity: None,
            display_type: format!("{{{}}}", values.join(",")),
        },
    }
}

/// Full resolver over the raw grammar: classify, then normalize.
pub fn resolve(decl: &Decl, default: &DeclaredDefault) -> Result<FlagSpec, ResolveError> {
    Ok(resolve_descriptor(&classify(decl)?, default))
}

// ------------------------------- Tests ------------------------------------ //
