//! Error taxonomy for descriptor resolution and parameter compilation.
//!
//! Every variant is a programming mistake in the declared parameter list,
//! detected before any command-line token is read. None are recoverable;
//! compilation aborts on the first failure and never exposes a partial
//! flag set.

use thiserror::Error;

use crate::decl::Decl;

/// Failures produced while classifying a single type descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A tuple or collection mixes distinct types where homogeneity is
    /// required.
    #[error("heterogeneous types in descriptor: {0:?}")]
    HeterogeneousType(Decl),

    /// A zero-or-more or choice collection with no elements.
    #[error("empty collection in descriptor")]
    EmptyCollection,

    /// An annotation with a string somewhere other than the description
    /// slot; it cannot be split into descriptor and description.
    #[error("ambiguous annotation, cannot split descriptor from description: {0:?}")]
    AmbiguousAnnotation(Decl),

    /// A shape outside the closed descriptor grammar.
    #[error("unhandled type descriptor: {0:?}")]
    UnhandledDescriptor(Decl),
}

/// Compilation failure, carrying the offending parameter's name so the
/// caller can pinpoint which declaration is malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("parameter `{name}`: {source}")]
    Resolve {
        name: String,
        #[source]
        source: ResolveError,
    },

    /// A default was supplied more than once for the same parameter.
    #[error("parameter `{name}`: default supplied more than once")]
    DuplicateDefault { name: String },
}
