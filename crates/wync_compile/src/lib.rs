#![cfg_attr(docsrs, feature(doc_cfg))]

//! # wync-compile
//!
//! Everything downstream of parsing: the semantic checker, closure lifting,
//! generics/spawn registries, optimization passes, the C emitter (primary
//! backend), the optional LLVM emitter, the module loader, and the driver
//! that ties a single compilation together and invokes the host C compiler
//! (spec.md §4.3–§4.6).
//!
//! ## Modules
//!
//! - [`analysis`]: scoped symbol resolution, type inference, overload
//!   selection, trait-bound checking (spec.md §4.3)
//! - [`closures`]: free-variable capture analysis and lambda lifting
//!   (spec.md §4.4, "Closure lifting pass")
//! - [`generics`]: the monomorphization registry (spec.md §4.4, "Generic
//!   monomorphization pass")
//! - [`spawn`]: `spawn` call sites and their thread-wrapper names
//! - [`optimize`]: dead-code elimination and constant folding (spec.md §4.6
//!   step 6)
//! - [`codegen_c`]: the primary backend (spec.md §4.4)
//! - `codegen_llvm`: the experimental alternative backend (spec.md §4.5),
//!   gated behind the `llvm-backend` feature
//! - [`loader`]: import pre-scan and module concatenation (spec.md §4.6
//!   step 2)
//! - [`diagnostic`]: `serde`-serializable diagnostics for `--json-errors`
//!   (SPEC_FULL §F)
//! - [`driver`]: orchestrates every stage above and shells out to the host
//!   C compiler (spec.md §4.6)

pub mod analysis;
pub mod closures;
pub mod codegen_c;
#[cfg(feature = "llvm-backend")]
pub mod codegen_llvm;
pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod generics;
pub mod loader;
pub mod optimize;
pub mod spawn;

pub use analysis::{check_program, CheckOutput};
pub use driver::{compile_file, compile_source, CompileError, CompileOptions, CompileOutcome};
pub use error::{CheckError, CheckErrorKind};
