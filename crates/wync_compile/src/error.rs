//! Checker diagnostics (spec.md §4.3 "Errors", §7 "Checking").
//!
//! Follows the same hand-rolled, `Span`-carrying convention as
//! `wync_lang::ParseError` rather than reaching for `thiserror`: this crate
//! accumulates *many* diagnostics per stage and displays them uniformly, so
//! a derive macro buys little over a plain enum + `Display` impl.

use std::fmt;

use wync_base::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckErrorKind {
    UndefinedIdentifier(String),
    TypeMismatch { expected: String, found: String },
    ArityMismatch { expected: usize, found: usize },
    AmbiguousOverload(String),
    NoMatchingOverload(String),
    UnsatisfiedTraitBound { type_name: String, trait_name: String },
    RefutablePatternInIrrefutablePosition(String),
    GenericInstantiationFailure(String),
    UnknownField { type_name: String, field: String },
    MissingField { type_name: String, field: String },
    NotCallable(String),
    InvalidTryTarget,
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckError {
    pub kind: CheckErrorKind,
    pub span: Span,
}

impl CheckError {
    pub fn new(kind: CheckErrorKind, span: Span) -> Self {
        CheckError { kind, span }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CheckErrorKind::UndefinedIdentifier(name) => {
                write!(f, "undefined identifier '{}'", name)
            }
            CheckErrorKind::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            CheckErrorKind::ArityMismatch { expected, found } => {
                write!(f, "arity mismatch: expected {} arguments, found {}", expected, found)
            }
            CheckErrorKind::AmbiguousOverload(name) => {
                write!(f, "ambiguous overload for call to '{}'", name)
            }
            CheckErrorKind::NoMatchingOverload(name) => {
                write!(f, "no matching overload for call to '{}'", name)
            }
            CheckErrorKind::UnsatisfiedTraitBound { type_name, trait_name } => {
                write!(f, "type '{}' does not implement trait '{}'", type_name, trait_name)
            }
            CheckErrorKind::RefutablePatternInIrrefutablePosition(ctx) => {
                write!(f, "refutable pattern used in {} (must be irrefutable)", ctx)
            }
            CheckErrorKind::GenericInstantiationFailure(msg) => {
                write!(f, "generic instantiation failed: {}", msg)
            }
            CheckErrorKind::UnknownField { type_name, field } => {
                write!(f, "struct '{}' has no field '{}'", type_name, field)
            }
            CheckErrorKind::MissingField { type_name, field } => {
                write!(f, "struct initializer for '{}' is missing field '{}'", type_name, field)
            }
            CheckErrorKind::NotCallable(name) => write!(f, "'{}' is not callable", name),
            CheckErrorKind::InvalidTryTarget => {
                write!(f, "'?' may only be applied to a Result-like expression")
            }
            CheckErrorKind::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CheckError {}
