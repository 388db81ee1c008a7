use chrono::NaiveDate;
use mamegen_core::{CellValue, DslError, OutputSide, Result};

use crate::ast::{
    CharsetArg, ClassDef, ConfigEntry, ConfigValue, CopyTarget, JoinItem, ReferenceDef, RuleBlock,
    RuleEntry, RuleKind, Section, Selector, SelectorBlock, SelectorKind,
};
use crate::token::{Token, TokenKind};

const NAMED_CHARSETS: &[&str] = &[
    "alphabet", "alnum", "digits", "lower", "upper", "number", "hex", "symbol",
];

/// Cursor parser over the token stream. Builds the concrete section tree
/// and enforces the syntactic restrictions: one rule per line, no `:` or
/// `=` in bodies, closed `seq` ranges, quoted reference labels.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Vec<Section>> {
        let mut sections = Vec::new();
        self.skip_newlines();

        // Optional `mamegen { … }` root wrapper.
        let wrapped = if self.is_ident("mamegen") {
            self.advance();
            self.expect_lbrace()?;
            self.skip_newlines();
            true
        } else {
            false
        };

        loop {
            self.skip_newlines();
            if wrapped && matches!(self.peek(), TokenKind::RBrace) {
                self.advance();
                break;
            }
            if matches!(self.peek(), TokenKind::Eof) {
                if wrapped {
                    return Err(self.err("expected '}' closing the mamegen block"));
                }
                break;
            }
            sections.push(self.section()?);
        }

        self.skip_newlines();
        if !matches!(self.peek(), TokenKind::Eof) {
            return Err(self.err(format!(
                "unexpected {} after the last section",
                self.peek().describe()
            )));
        }
        Ok(sections)
    }

    fn section(&mut self) -> Result<Section> {
        let name = match self.peek() {
            TokenKind::Ident(name) => name.clone(),
            other => {
                return Err(self.err(format!(
                    "expected a section keyword, got {}",
                    other.describe()
                )));
            }
        };
        match name.as_str() {
            "CONFIG" => self.config_section(),
            "HEADER" => self.header_section(),
            "REFERENCE" => self.reference_section(),
            "CLASS" => self.class_section(),
            "COLUMN_RULES" => self.column_rules_section(),
            other => Err(self.err(format!("unknown section '{other}'"))),
        }
    }

    // ---------- CONFIG ----------

    fn config_section(&mut self) -> Result<Section> {
        self.advance(); // CONFIG
        self.expect_lbrace()?;
        let mut entries = Vec::new();

        // Inline form: no newline before the first pair, exactly one pair.
        if !matches!(self.peek(), TokenKind::Newline | TokenKind::RBrace) {
            entries.push(self.config_pair()?);
            self.forbid_colon_eq()?;
            if !matches!(self.peek(), TokenKind::RBrace) {
                return Err(self.err("CONFIG inline must contain only one key value pair"));
            }
            self.advance();
            return Ok(Section::Config(entries));
        }

        loop {
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::RBrace) {
                self.advance();
                break;
            }
            entries.push(self.config_pair()?);
            self.end_of_line()?;
        }
        Ok(Section::Config(entries))
    }

    fn config_pair(&mut self) -> Result<ConfigEntry> {
        self.forbid_colon_eq()?;
        let line = self.cur().line;
        let key = self.take_ident("a CONFIG key")?;
        self.forbid_colon_eq()?;
        let value = match self.peek().clone() {
            TokenKind::Ident(word) => {
                self.advance();
                match word.as_str() {
                    "true" => ConfigValue::Bool(true),
                    "false" => ConfigValue::Bool(false),
                    _ => ConfigValue::Str(word),
                }
            }
            TokenKind::Str(value) => {
                self.advance();
                ConfigValue::Str(value)
            }
            TokenKind::Int(value) => {
                self.advance();
                ConfigValue::Int(value)
            }
            other => {
                return Err(self.err(format!(
                    "invalid CONFIG value for '{key}': {}",
                    other.describe()
                )));
            }
        };
        Ok(ConfigEntry { key, value, line })
    }

    // ---------- HEADER ----------

    fn header_section(&mut self) -> Result<Section> {
        let line = self.cur().line;
        self.advance(); // HEADER
        self.expect_lbrace()?;
        self.skip_newlines();
        self.expect(TokenKind::LBracket, "'[' opening the HEADER array")?;
        let mut names = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::RBracket) {
                self.advance();
                break;
            }
            let name = match self.peek().clone() {
                TokenKind::Str(value) => {
                    self.advance();
                    value
                }
                TokenKind::Ident(value) => {
                    self.advance();
                    value
                }
                other => {
                    return Err(self.err(format!(
                        "expected a column name in HEADER, got {}",
                        other.describe()
                    )));
                }
            };
            names.push(name);
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RBrace, "'}' closing HEADER")?;
        if names.is_empty() {
            return Err(DslError::syntax(
                line,
                1,
                "HEADER must contain a non-empty array",
            ));
        }
        Ok(Section::Header { names, line })
    }

    // ---------- REFERENCE ----------

    fn reference_section(&mut self) -> Result<Section> {
        let line = self.cur().line;
        self.advance(); // REFERENCE
        let name = match self.peek().clone() {
            TokenKind::Str(value) => {
                self.advance();
                value
            }
            _ => return Err(self.err("reference name must be a quoted string")),
        };
        if name.is_empty() {
            return Err(self.err("reference name must not be empty"));
        }
        self.expect_lbrace()?;
        let mut rows = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::RBrace) {
                self.advance();
                break;
            }
            let label = match self.peek().clone() {
                TokenKind::Str(value) => {
                    self.advance();
                    value
                }
                other => {
                    return Err(self.err(format!(
                        "REFERENCE \"{name}\": expected quoted label, got {}",
                        other.describe()
                    )));
                }
            };
            self.forbid_colon_eq()?;
            let value = match self.peek().clone() {
                TokenKind::Int(v) => {
                    self.advance();
                    CellValue::Int(v)
                }
                TokenKind::Float(v) => {
                    self.advance();
                    CellValue::Float(v)
                }
                TokenKind::Str(v) => {
                    self.advance();
                    CellValue::Text(v)
                }
                other => {
                    return Err(self.err(format!(
                        "REFERENCE \"{name}\": value must be a number or quoted string, got {}",
                        other.describe()
                    )));
                }
            };
            rows.push((label, value));
            if !matches!(self.peek(), TokenKind::Newline | TokenKind::RBrace) {
                return Err(self.err(format!(
                    "REFERENCE \"{name}\": extra tokens after value"
                )));
            }
            if matches!(self.peek(), TokenKind::Newline) {
                self.advance();
            }
        }
        if rows.is_empty() {
            return Err(DslError::invalid_rule(
                line,
                format!("REFERENCE \"{name}\" is empty"),
            ));
        }
        Ok(Section::Reference(ReferenceDef { name, rows, line }))
    }

    // ---------- CLASS ----------

    fn class_section(&mut self) -> Result<Section> {
        self.advance(); // CLASS
        self.expect_lbrace()?;
        let mut classes = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::RBrace) {
                self.advance();
                break;
            }
            let line = self.cur().line;
            let name = match self.peek().clone() {
                TokenKind::Str(value) => {
                    self.advance();
                    value
                }
                other => {
                    return Err(self.err(format!(
                        "expected a quoted class name, got {}",
                        other.describe()
                    )));
                }
            };
            let block = self.rule_block()?;
            classes.push(ClassDef { name, block, line });
        }
        Ok(Section::Classes(classes))
    }

    // ---------- COLUMN_RULES ----------

    fn column_rules_section(&mut self) -> Result<Section> {
        self.advance(); // COLUMN_RULES
        self.expect_lbrace()?;
        let mut blocks = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::RBrace) {
                self.advance();
                break;
            }
            let selector = self.selector()?;
            let block = self.rule_block()?;
            blocks.push(SelectorBlock { selector, block });
        }
        Ok(Section::ColumnRules(blocks))
    }

    fn selector(&mut self) -> Result<Selector> {
        let line = self.cur().line;
        let kind = match self.peek().clone() {
            // Bare quoted name is shorthand for LABEL.
            TokenKind::Str(name) => {
                self.advance();
                SelectorKind::Label(name)
            }
            TokenKind::Ident(word) => match word.as_str() {
                "INDEX" => {
                    self.advance();
                    SelectorKind::Index(self.take_int("an INDEX position")?)
                }
                "INDICES" => {
                    self.advance();
                    self.indices_selector()?
                }
                "LABEL" => {
                    self.advance();
                    SelectorKind::Label(self.take_str("a quoted column label")?)
                }
                "LABELS" => {
                    self.advance();
                    self.labels_selector()?
                }
                other => {
                    return Err(self.err(format!(
                        "expected a selector or quoted column name, got '{other}'"
                    )));
                }
            },
            other => {
                return Err(self.err(format!(
                    "expected a selector or quoted column name, got {}",
                    other.describe()
                )));
            }
        };
        Ok(Selector { kind, line })
    }

    fn indices_selector(&mut self) -> Result<SelectorKind> {
        match self.peek().clone() {
            TokenKind::Int(first) => {
                self.advance();
                if matches!(self.peek(), TokenKind::DotDot) {
                    self.advance();
                    let last = self.take_int("the end of the INDICES range")?;
                    Ok(SelectorKind::IndexRange(first, last))
                } else {
                    Ok(SelectorKind::Index(first))
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                loop {
                    match self.peek().clone() {
                        TokenKind::RBracket => {
                            self.advance();
                            break;
                        }
                        TokenKind::Int(value) => {
                            self.advance();
                            items.push(value);
                            if matches!(self.peek(), TokenKind::Comma) {
                                self.advance();
                            }
                        }
                        other => {
                            return Err(self.err(format!(
                                "INDICES expects an integer list, got {}",
                                other.describe()
                            )));
                        }
                    }
                }
                if items.is_empty() {
                    return Err(self.err("INDICES list must not be empty"));
                }
                Ok(SelectorKind::IndexList(items))
            }
            other => Err(self.err(format!(
                "INDICES expects a range or list, got {}",
                other.describe()
            ))),
        }
    }

    fn labels_selector(&mut self) -> Result<SelectorKind> {
        match self.peek().clone() {
            TokenKind::Str(first) => {
                self.advance();
                self.expect(TokenKind::DotDot, "'..' in the LABELS range")?;
                let last = self.take_str("the end label of the LABELS range")?;
                Ok(SelectorKind::LabelRange(first, last))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                loop {
                    match self.peek().clone() {
                        TokenKind::RBracket => {
                            self.advance();
                            break;
                        }
                        TokenKind::Str(value) => {
                            self.advance();
                            items.push(value);
                            if matches!(self.peek(), TokenKind::Comma) {
                                self.advance();
                            }
                        }
                        other => {
                            return Err(self.err(format!(
                                "LABELS expects a quoted string list, got {}",
                                other.describe()
                            )));
                        }
                    }
                }
                if items.is_empty() {
                    return Err(self.err("LABELS list must not be empty"));
                }
                Ok(SelectorKind::LabelList(items))
            }
            other => Err(self.err(format!(
                "LABELS expects a range or list, got {}",
                other.describe()
            ))),
        }
    }

    // ---------- rule blocks ----------

    fn rule_block(&mut self) -> Result<RuleBlock> {
        self.expect_lbrace()?;
        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek(), TokenKind::RBrace) {
                self.advance();
                break;
            }
            entries.push(self.rule_entry()?);
            self.end_of_line()?;
        }
        Ok(entries)
    }

    fn rule_entry(&mut self) -> Result<RuleEntry> {
        self.forbid_colon_eq()?;
        let line = self.cur().line;
        let keyword = self.take_ident("a rule keyword")?;
        self.forbid_colon_eq()?;
        let kind = match keyword.as_str() {
            "allow_null" => {
                let word = self.take_ident("'true' or 'false'")?;
                match word.as_str() {
                    "true" => RuleKind::AllowNull(true),
                    "false" => RuleKind::AllowNull(false),
                    _ => {
                        return Err(DslError::invalid_rule(
                            line,
                            "allow_null must be true or false",
                        ));
                    }
                }
            }
            "null_probability" => {
                let p = self.take_number("a probability")?;
                if !(0.0..=1.0).contains(&p) {
                    return Err(DslError::invalid_rule(
                        line,
                        "null_probability must be between 0 and 1",
                    ));
                }
                RuleKind::NullProbability(p)
            }
            "seq" => {
                let start = self.take_int("the start of the seq range")?;
                if !matches!(self.peek(), TokenKind::DotDot) {
                    return Err(self.err("seq requires a closed range: seq <start>..<end>"));
                }
                self.advance();
                let end = match self.peek().clone() {
                    TokenKind::Int(value) => {
                        self.advance();
                        value
                    }
                    _ => return Err(self.err("open-ended seq range is not allowed")),
                };
                if start > end {
                    return Err(DslError::invalid_rule(line, "seq start must be <= end"));
                }
                RuleKind::Seq { start, end }
            }
            "digits" => {
                let n = self.take_int("a digit count")?;
                if n <= 0 {
                    return Err(DslError::invalid_rule(line, "digits must be > 0"));
                }
                RuleKind::Digits(n as u32)
            }
            "step" => {
                let k = self.take_int("a step size")?;
                if k <= 0 {
                    return Err(DslError::invalid_rule(line, "step must be > 0"));
                }
                RuleKind::Step(k)
            }
            "charset" => match self.peek().clone() {
                TokenKind::Ident(name) => {
                    self.advance();
                    if !NAMED_CHARSETS.contains(&name.as_str()) {
                        return Err(DslError::invalid_rule(
                            line,
                            format!(
                                "unsupported charset '{name}' (allowed: {})",
                                NAMED_CHARSETS.join(", ")
                            ),
                        ));
                    }
                    RuleKind::Charset(CharsetArg::Named(name))
                }
                TokenKind::Str(set) => {
                    self.advance();
                    if set.is_empty() {
                        return Err(DslError::invalid_rule(
                            line,
                            "charset literal set must not be empty",
                        ));
                    }
                    RuleKind::Charset(CharsetArg::Literal(set))
                }
                other => {
                    return Err(self.err(format!(
                        "charset expects a kind or quoted set, got {}",
                        other.describe()
                    )));
                }
            },
            "length" => {
                let n = self.take_int("a length")?;
                if n <= 0 {
                    return Err(DslError::invalid_rule(line, "length must be > 0"));
                }
                RuleKind::Length(n as usize)
            }
            "enum" => {
                let values = self.value_list("enum")?;
                if values.is_empty() {
                    return Err(DslError::invalid_rule(line, "enum requires non-empty list"));
                }
                RuleKind::Enum(values)
            }
            "fixed" => match self.peek().clone() {
                TokenKind::Int(v) => {
                    self.advance();
                    RuleKind::Fixed(CellValue::Int(v))
                }
                TokenKind::Float(v) => {
                    self.advance();
                    RuleKind::Fixed(CellValue::Float(v))
                }
                TokenKind::Str(v) => {
                    self.advance();
                    RuleKind::Fixed(CellValue::Text(v))
                }
                _ => {
                    return Err(DslError::invalid_rule(
                        line,
                        "fixed value must be a number or a quoted string",
                    ));
                }
            },
            "range" => {
                let (lo_int, lo_float) = self.take_int_or_float("the range lower bound")?;
                if !matches!(self.peek(), TokenKind::DotDot) {
                    return Err(self.err("range requires a closed range: range <lo>..<hi>"));
                }
                self.advance();
                let (hi_int, hi_float) = self.take_int_or_float("the range upper bound")?;
                match (lo_int, hi_int) {
                    (Some(lo), Some(hi)) => {
                        if lo > hi {
                            return Err(DslError::invalid_rule(
                                line,
                                "range lower bound must be <= upper bound",
                            ));
                        }
                        RuleKind::RangeInt(lo, hi)
                    }
                    _ => {
                        let lo = lo_float;
                        let hi = hi_float;
                        if lo > hi {
                            return Err(DslError::invalid_rule(
                                line,
                                "range lower bound must be <= upper bound",
                            ));
                        }
                        RuleKind::RangeFloat(lo, hi)
                    }
                }
            }
            "date_range" => {
                let start = self.take_date(line)?;
                self.expect(TokenKind::DotDot, "'..' in the date_range bounds")?;
                let end = self.take_date(line)?;
                if start > end {
                    return Err(DslError::invalid_rule(
                        line,
                        "date_range start must be <= end",
                    ));
                }
                let format = match self.peek().clone() {
                    TokenKind::Str(fmt) => {
                        self.advance();
                        Some(fmt)
                    }
                    _ => None,
                };
                RuleKind::DateRange { start, end, format }
            }
            "date" => RuleKind::Date,
            "datetime" => RuleKind::DateTime,
            "copy" => match self.peek().clone() {
                TokenKind::Str(name) => {
                    self.advance();
                    RuleKind::Copy(CopyTarget::Label(name))
                }
                TokenKind::Int(index) => {
                    self.advance();
                    if index < 1 {
                        return Err(DslError::invalid_rule(line, "copy index must be >= 1"));
                    }
                    RuleKind::Copy(CopyTarget::Index(index))
                }
                _ => {
                    return Err(DslError::invalid_rule(
                        line,
                        "copy expects a quoted label or a 1-based index",
                    ));
                }
            },
            "join" => {
                let separator = self.take_str("the join separator")?;
                self.expect(TokenKind::LBracket, "'[' opening the join item list")?;
                let mut items = Vec::new();
                loop {
                    match self.peek().clone() {
                        TokenKind::RBracket => {
                            self.advance();
                            break;
                        }
                        TokenKind::Str(value) => {
                            self.advance();
                            items.push(JoinItem::Literal(value));
                        }
                        TokenKind::Ident(name) => {
                            self.advance();
                            items.push(JoinItem::Column(name));
                        }
                        other => {
                            return Err(self.err(format!(
                                "join items must be identifiers or quoted literals, got {}",
                                other.describe()
                            )));
                        }
                    }
                    if matches!(self.peek(), TokenKind::Comma) {
                        self.advance();
                    }
                }
                if items.is_empty() {
                    return Err(DslError::invalid_rule(
                        line,
                        "join requires a non-empty item list",
                    ));
                }
                RuleKind::Join { separator, items }
            }
            "regex" => RuleKind::Regex(self.take_str("a quoted pattern")?),
            "reference" => {
                let key = match self.peek().clone() {
                    TokenKind::Str(value) => {
                        self.advance();
                        value
                    }
                    _ => {
                        return Err(DslError::invalid_rule(
                            line,
                            "reference key must be a quoted string",
                        ));
                    }
                };
                if key.is_empty() {
                    return Err(DslError::invalid_rule(
                        line,
                        "reference key must not be empty",
                    ));
                }
                RuleKind::Reference(key)
            }
            "output" => {
                let side = self.take_ident("'label' or 'value'")?;
                match side.as_str() {
                    "label" => RuleKind::Output(OutputSide::Label),
                    "value" => RuleKind::Output(OutputSide::Value),
                    _ => {
                        return Err(DslError::invalid_rule(
                            line,
                            "output must be label or value",
                        ));
                    }
                }
            }
            "value_source" => match self.peek().clone() {
                TokenKind::Str(name) => {
                    self.advance();
                    if name.is_empty() {
                        return Err(DslError::invalid_rule(
                            line,
                            "value_source column name must not be empty",
                        ));
                    }
                    RuleKind::ValueSource(Some(name))
                }
                _ => RuleKind::ValueSource(None),
            },
            "class" => {
                let name = self.take_str("a quoted class name")?;
                RuleKind::Class(name)
            }
            other => return Err(self.err(format!("unknown rule '{other}'"))),
        };
        Ok(RuleEntry { kind, line })
    }

    fn value_list(&mut self, rule: &str) -> Result<Vec<CellValue>> {
        self.expect(TokenKind::LBracket, "'[' opening the value list")?;
        let mut values = Vec::new();
        loop {
            match self.peek().clone() {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Int(v) => {
                    self.advance();
                    values.push(CellValue::Int(v));
                }
                TokenKind::Float(v) => {
                    self.advance();
                    values.push(CellValue::Float(v));
                }
                TokenKind::Str(v) => {
                    self.advance();
                    values.push(CellValue::Text(v));
                }
                TokenKind::Ident(v) => {
                    self.advance();
                    values.push(CellValue::Text(v));
                }
                other => {
                    return Err(self.err(format!(
                        "{rule} list expects values, got {}",
                        other.describe()
                    )));
                }
            }
            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
            }
        }
        Ok(values)
    }

    fn take_date(&mut self, line: usize) -> Result<NaiveDate> {
        let text = match self.peek().clone() {
            TokenKind::Str(value) => {
                self.advance();
                value
            }
            _ => {
                return Err(DslError::invalid_rule(
                    line,
                    "date must be a quoted string, e.g. \"2025-09-17\"",
                ));
            }
        };
        NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
            DslError::invalid_rule(line, format!("invalid date: {text} (expected YYYY-MM-DD)"))
        })
    }

    // ---------- cursor helpers ----------

    fn cur(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &TokenKind {
        &self.cur().kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
    }

    fn is_ident(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(w) if w == word)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.peek() == &kind {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {what}, got {}", self.peek().describe())))
        }
    }

    fn expect_lbrace(&mut self) -> Result<()> {
        self.expect(TokenKind::LBrace, "'{'")
    }

    /// After a rule or config pair, only a newline or the closing brace may
    /// follow on the same line.
    fn end_of_line(&mut self) -> Result<()> {
        match self.peek() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            TokenKind::Symbol(':') | TokenKind::Symbol('=') => {
                Err(self.err("':' and '=' are not allowed"))
            }
            other => Err(self.err(format!(
                "one rule per line: unexpected {} after rule",
                other.describe()
            ))),
        }
    }

    fn forbid_colon_eq(&self) -> Result<()> {
        match self.peek() {
            TokenKind::Symbol(':') | TokenKind::Symbol('=') => {
                Err(self.err("':' and '=' are not allowed"))
            }
            _ => Ok(()),
        }
    }

    fn take_ident(&mut self, what: &str) -> Result<String> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.err(format!("expected {what}, got {}", other.describe()))),
        }
    }

    fn take_str(&mut self, what: &str) -> Result<String> {
        match self.peek().clone() {
            TokenKind::Str(value) => {
                self.advance();
                Ok(value)
            }
            other => Err(self.err(format!("expected {what}, got {}", other.describe()))),
        }
    }

    fn take_int(&mut self, what: &str) -> Result<i64> {
        match self.peek().clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok(value)
            }
            other => Err(self.err(format!("expected {what}, got {}", other.describe()))),
        }
    }

    fn take_number(&mut self, what: &str) -> Result<f64> {
        match self.peek().clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok(value as f64)
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(value)
            }
            other => Err(self.err(format!("expected {what}, got {}", other.describe()))),
        }
    }

    /// Returns `(Some(int), as_float)` for integers and `(None, float)`
    /// for floats, so `range` can decide integer vs float semantics.
    fn take_int_or_float(&mut self, what: &str) -> Result<(Option<i64>, f64)> {
        match self.peek().clone() {
            TokenKind::Int(value) => {
                self.advance();
                Ok((Some(value), value as f64))
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok((None, value))
            }
            other => Err(self.err(format!("expected {what}, got {}", other.describe()))),
        }
    }

    fn err(&self, message: impl Into<String>) -> DslError {
        let token = self.cur();
        DslError::syntax(token.line, token.column, message)
    }
}
