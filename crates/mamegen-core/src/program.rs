use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reference::ReferenceStore;
use crate::value::CellValue;
use crate::DEFAULT_COUNT;

/// Output format selected by `CONFIG.type` (the CLI may override it from
/// the output path extension).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Options collected from `CONFIG` sections, last writer wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format.
    pub format: OutputFormat,
    /// Number of rows to generate.
    pub count: u64,
    /// When true the engine uses a fixed seed.
    pub reproducible: bool,
    /// Character encoding label, `output_encoding` > `encoding` > utf-8.
    pub encoding: String,
    /// Emit the header line (CSV only).
    pub with_header: bool,
    /// Quote every data field (CSV only).
    pub quote_strings: bool,
    /// Quote the header fields (CSV only).
    pub quote_header: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            count: DEFAULT_COUNT,
            reproducible: false,
            encoding: "utf-8".to_string(),
            with_header: true,
            quote_strings: true,
            quote_header: true,
        }
    }
}

/// `seq` family after flattening: closed integer range plus decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqSpec {
    pub start: i64,
    pub end: i64,
    pub step: i64,
    /// Zero-pad width; `None` keeps the cell numeric.
    pub digits: Option<u32>,
}

/// Numeric `range` rule; the operand types decide integer vs float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeSpec {
    Int(i64, i64),
    Float(f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Date,
    DateTime,
}

/// Date family: `date_range`, bare `date`, bare `datetime`.
///
/// Missing bounds mean the engine's default 365-day window.
#[derive(Debug, Clone, PartialEq)]
pub struct DateSpec {
    pub kind: DateKind,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Placeholder format (`YYYY`, `MM`, `DD`, `HH`, `mm`, `ss`).
    pub format: Option<String>,
}

/// One item of a `join` rule.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinPart {
    Literal(String),
    /// Resolved header position of a referenced column.
    Column(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub separator: String,
    pub parts: Vec<JoinPart>,
}

/// Which side of a reference row a column emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSide {
    Label,
    Value,
}

/// How a reference column selects its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Synchronous mode: draw once per record, locked by reference name.
    Pick,
    /// Implicit reverse mode: read the nearest left column with the same
    /// key and `output label`. The position is precomputed at analysis
    /// time; `None` means no such column exists and the cell stays empty.
    Auto { from: Option<usize> },
    /// Explicit reverse mode: read the named column's emitted cell.
    Column { position: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceUse {
    pub key: String,
    pub output: OutputSide,
    pub source: ValueSource,
}

/// The winning merged rule block for one header position.
///
/// Each field is one rule key; flattening assigns keys last-writer-wins,
/// so distinct keys coexist and later writes replace earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnRule {
    pub name: String,
    /// 0-based header position.
    pub position: usize,
    pub allow_null: bool,
    pub null_probability: f64,
    pub seq: Option<SeqSpec>,
    /// Character pool resolved from accumulated `charset` rules.
    pub pool: Option<String>,
    pub length: Option<usize>,
    pub choices: Option<Vec<CellValue>>,
    pub fixed: Option<CellValue>,
    pub range: Option<RangeSpec>,
    pub date: Option<DateSpec>,
    /// Resolved header position of a `copy` source.
    pub copy_from: Option<usize>,
    pub join: Option<JoinSpec>,
    /// Raw minimal-regex pattern; compiled by the engine.
    pub pattern: Option<String>,
    pub reference: Option<ReferenceUse>,
}

impl ColumnRule {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            allow_null: true,
            null_probability: 0.0,
            ..Self::default()
        }
    }
}

/// The analysed program: everything the generator and writers consume.
#[derive(Debug, Clone)]
pub struct Program {
    pub config: OutputConfig,
    pub header: Vec<String>,
    pub references: ReferenceStore,
    pub columns: Vec<ColumnRule>,
}
