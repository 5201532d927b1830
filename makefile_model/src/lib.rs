//! Makefile document model.
//!
//! Everything here is pure text assembly: ordered unique collections,
//! variable rendering, automatic-variable help, function-call syntax and
//! the [`MakefileGenerator`] document itself. Process execution lives in
//! the `makefilegen` binary crate.

pub mod autovars;
pub mod error;
pub mod functions;
pub mod generator;
pub mod unique;
pub mod var;

pub use error::{Error, Result};
pub use generator::{CondKind, MakefileGenerator, MakefileWriter};
pub use unique::{OnDuplicate, UniqueList};
pub use var::{Assign, MakeInfo, Var};
