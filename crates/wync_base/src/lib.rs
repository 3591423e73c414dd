#![cfg_attr(docsrs, feature(doc_cfg))]

//! # wync-base
//!
//! Pure structural atoms shared by every stage of the Wyn compiler.
//!
//! - [`Arena`] — bump allocation for stable AST references
//! - [`Interner`]/[`Symbol`] — string interning for O(1) identifier equality
//! - [`Span`] — byte-offset source location tracking
//! - [`SpannedError`]/[`Result`] — errors carrying a source position
//!
//! This crate has no knowledge of Wyn syntax, C codegen, or I/O. Everything
//! here is generic infrastructure the later stages (`wync_lang`,
//! `wync_compile`) build on.

pub mod arena;
pub mod error;
pub mod intern;
pub mod span;

pub use arena::Arena;
pub use error::{Result, SpannedError};
pub use intern::{Interner, Symbol, SymbolEq};
pub use span::Span;
