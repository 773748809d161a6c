#![cfg_attr(not(feature = "std"), no_std)]

//! Compile-time constant folding with arbitrary-precision integers.
//!
//! The heart of the crate is [`BigInt`], a sign-magnitude integer with
//! a single-word fast path. Around it sits a small constant-declaration
//! pipeline:
//!
//!   source .kst
//!     -> lexer       (tokens)
//!     -> parser      (declarations in prefix-call notation)
//!     -> fold        (exact values, typed representability checks)
//!     -> compiler    (FoldArtifact or every diagnostic)
//!
//! Everything except package loading works without `std`.

extern crate alloc;

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod diagnostic;
pub mod error;

// ---------------------------------------------------------------------
// Arithmetic: big integers, exact values, sized types
// ---------------------------------------------------------------------

pub mod big_int;
pub mod exact_value;
pub mod types;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Folding and orchestration
// ---------------------------------------------------------------------

pub mod fold;
pub mod compiler;
#[cfg(feature = "std")]
pub mod package;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use big_int::{BigInt, Sign};
pub use compiler::{FoldArtifact, FoldedExpression, fold_expression, fold_source, fold_sources};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{BigIntError, CoreError, ExactValueError};
pub use exact_value::ExactValue;
pub use fold::Constant;
#[cfg(feature = "std")]
pub use package::{Package, fold_package, load_package};
pub use types::IntType;
