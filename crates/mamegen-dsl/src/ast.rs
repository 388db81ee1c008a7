//! Concrete section tree produced by the parser.
//!
//! Everything here is pre-resolution: selectors still name columns by
//! index or label, class references are unexpanded, and repeated sections
//! are kept separate. The analyser turns this into the program IR.

use chrono::NaiveDate;
use mamegen_core::{CellValue, OutputSide};

/// A top-level section in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Config(Vec<ConfigEntry>),
    Header { names: Vec<String>, line: usize },
    Reference(ReferenceDef),
    Classes(Vec<ClassDef>),
    ColumnRules(Vec<SelectorBlock>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: ConfigValue,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// One `REFERENCE "NAME" { … }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDef {
    pub name: String,
    pub rows: Vec<(String, CellValue)>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub block: RuleBlock,
    pub line: usize,
}

/// A selector plus the rule block it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorBlock {
    pub selector: Selector,
    pub block: RuleBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub kind: SelectorKind,
    pub line: usize,
}

/// Column designators, all resolved against HEADER by the analyser.
/// Index forms are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorKind {
    Index(i64),
    IndexRange(i64, i64),
    IndexList(Vec<i64>),
    Label(String),
    LabelRange(String, String),
    LabelList(Vec<String>),
}

pub type RuleBlock = Vec<RuleEntry>;

#[derive(Debug, Clone, PartialEq)]
pub struct RuleEntry {
    pub kind: RuleKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharsetArg {
    /// A named pool such as `alphabet` or `hex`.
    Named(String),
    /// A quoted literal set of characters.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CopyTarget {
    Label(String),
    /// 1-based header position.
    Index(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinItem {
    Literal(String),
    /// Bare identifier naming a header column.
    Column(String),
}

/// One parsed rule line.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    AllowNull(bool),
    NullProbability(f64),
    Seq { start: i64, end: i64 },
    Digits(u32),
    Step(i64),
    Charset(CharsetArg),
    Length(usize),
    Enum(Vec<CellValue>),
    Fixed(CellValue),
    RangeInt(i64, i64),
    RangeFloat(f64, f64),
    DateRange {
        start: NaiveDate,
        end: NaiveDate,
        format: Option<String>,
    },
    Date,
    DateTime,
    Copy(CopyTarget),
    Join {
        separator: String,
        items: Vec<JoinItem>,
    },
    Regex(String),
    Reference(String),
    Output(OutputSide),
    ValueSource(Option<String>),
    Class(String),
}
