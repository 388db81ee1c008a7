//! Core contracts and helpers for mamegen.
//!
//! This crate defines the error kinds exposed at the boundary, the cell
//! value model, the analysed program IR, and the reference store shared by
//! the DSL front-end and the row generator.

pub mod error;
pub mod program;
pub mod reference;
pub mod value;

pub use error::{DslError, Result};
pub use program::{
    ColumnRule, DateKind, DateSpec, JoinPart, JoinSpec, OutputConfig, OutputFormat, OutputSide,
    Program, RangeSpec, ReferenceUse, SeqSpec, ValueSource,
};
pub use reference::{ReferenceRow, ReferenceStore, ReferenceTable};
pub use value::CellValue;

/// Default number of rows when `CONFIG.count` is not given.
pub const DEFAULT_COUNT: u64 = 10;
