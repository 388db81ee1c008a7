use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use mamegen_core::{
    CellValue, ColumnRule, DateKind, DateSpec, DslError, JoinPart, JoinSpec, OutputConfig,
    OutputFormat, OutputSide, Program, RangeSpec, ReferenceRow, ReferenceStore, ReferenceUse,
    Result, SeqSpec, ValueSource,
};

use crate::ast::{
    CharsetArg, ClassDef, ConfigEntry, ConfigValue, CopyTarget, JoinItem, RuleBlock, RuleEntry,
    RuleKind, Section, Selector, SelectorKind,
};

/// Transform the section tree into the validated program IR.
///
/// Repeated sections merge (CONFIG last-writer-wins, REFERENCE tables
/// concatenate), selectors resolve to header positions, class references
/// expand at depth 1, and per-column rules flatten last-writer-wins per
/// rule key.
pub fn analyse(sections: &[Section]) -> Result<Program> {
    let config = merge_config(sections)?;
    let header = merge_header(sections)?;
    let references = merge_references(sections);
    let classes = collect_classes(sections)?;

    let positions: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut working: Vec<WorkingRule> = (0..header.len()).map(|_| WorkingRule::default()).collect();

    for section in sections {
        let Section::ColumnRules(blocks) = section else {
            continue;
        };
        for selector_block in blocks {
            let covered = resolve_selector(&selector_block.selector, &header, &positions)?;
            let expanded = expand_classes(&selector_block.block, &classes)?;
            for &position in &covered {
                apply_block(&mut working[position], &expanded)?;
            }
        }
    }

    let mut columns = Vec::with_capacity(header.len());
    for (position, work) in working.into_iter().enumerate() {
        columns.push(lower_column(
            &header[position],
            position,
            work,
            &positions,
            &references,
        )?);
    }
    resolve_auto_sources(&mut columns);

    Ok(Program {
        config,
        header,
        references,
        columns,
    })
}

// ---------- section merging ----------

fn merge_config(sections: &[Section]) -> Result<OutputConfig> {
    let mut config = OutputConfig::default();
    let mut encoding: Option<String> = None;
    let mut output_encoding: Option<String> = None;

    for section in sections {
        let Section::Config(entries) = section else {
            continue;
        };
        for entry in entries {
            apply_config_entry(entry, &mut config, &mut encoding, &mut output_encoding)?;
        }
    }

    if let Some(label) = output_encoding.or(encoding) {
        config.encoding = label;
    }
    Ok(config)
}

fn apply_config_entry(
    entry: &ConfigEntry,
    config: &mut OutputConfig,
    encoding: &mut Option<String>,
    output_encoding: &mut Option<String>,
) -> Result<()> {
    let line = entry.line;
    match entry.key.as_str() {
        "type" => {
            let value = expect_config_str(entry)?;
            config.format = match value.to_uppercase().as_str() {
                "CSV" => OutputFormat::Csv,
                "JSON" => OutputFormat::Json,
                other => {
                    return Err(DslError::invalid_rule(
                        line,
                        format!("type must be CSV or JSON, got '{other}'"),
                    ));
                }
            };
        }
        "count" => match entry.value {
            ConfigValue::Int(value) if value > 0 => config.count = value as u64,
            _ => {
                return Err(DslError::invalid_rule(
                    line,
                    "count must be a positive integer",
                ));
            }
        },
        "reproducible" => config.reproducible = expect_config_bool(entry)?,
        "with_header" => config.with_header = expect_config_bool(entry)?,
        "quote_strings" => config.quote_strings = expect_config_bool(entry)?,
        "quote_header" => config.quote_header = expect_config_bool(entry)?,
        "encoding" => *encoding = Some(expect_config_str(entry)?),
        "output_encoding" => *output_encoding = Some(expect_config_str(entry)?),
        other => {
            return Err(DslError::invalid_rule(
                line,
                format!("unknown CONFIG key '{other}'"),
            ));
        }
    }
    Ok(())
}

fn expect_config_bool(entry: &ConfigEntry) -> Result<bool> {
    match entry.value {
        ConfigValue::Bool(value) => Ok(value),
        _ => Err(DslError::invalid_rule(
            entry.line,
            format!("{} must be true or false", entry.key),
        )),
    }
}

fn expect_config_str(entry: &ConfigEntry) -> Result<String> {
    match &entry.value {
        ConfigValue::Str(value) => Ok(value.clone()),
        ConfigValue::Int(value) => Ok(value.to_string()),
        ConfigValue::Bool(_) => Err(DslError::invalid_rule(
            entry.line,
            format!("{} must be a string", entry.key),
        )),
    }
}

fn merge_header(sections: &[Section]) -> Result<Vec<String>> {
    let mut found: Option<Vec<String>> = None;
    for section in sections {
        let Section::Header { names, line } = section else {
            continue;
        };
        if found.is_some() {
            return Err(DslError::invalid_rule(
                *line,
                "HEADER must appear exactly once",
            ));
        }
        let mut seen = BTreeSet::new();
        let duplicates: Vec<&str> = names
            .iter()
            .filter(|name| !seen.insert(name.as_str()))
            .map(|name| name.as_str())
            .collect();
        if !duplicates.is_empty() {
            return Err(DslError::invalid_rule(
                *line,
                format!("duplicate column names in HEADER: {}", duplicates.join(", ")),
            ));
        }
        found = Some(names.clone());
    }
    found.ok_or_else(|| DslError::invalid_rule(1, "HEADER section is required"))
}

fn merge_references(sections: &[Section]) -> ReferenceStore {
    let mut store = ReferenceStore::new();
    for section in sections {
        let Section::Reference(def) = section else {
            continue;
        };
        let rows = def
            .rows
            .iter()
            .map(|(label, value)| ReferenceRow {
                label: label.clone(),
                value: value.clone(),
            })
            .collect();
        store.add_rows(&def.name, rows);
    }
    store
}

fn collect_classes(sections: &[Section]) -> Result<HashMap<String, RuleBlock>> {
    let mut classes: HashMap<String, RuleBlock> = HashMap::new();
    for section in sections {
        let Section::Classes(defs) = section else {
            continue;
        };
        for ClassDef { name, block, line } in defs {
            if classes.contains_key(name) {
                return Err(DslError::invalid_rule(
                    *line,
                    format!("class \"{name}\" is already defined"),
                ));
            }
            if let Some(entry) = block
                .iter()
                .find(|entry| matches!(entry.kind, RuleKind::Class(_)))
            {
                return Err(DslError::invalid_rule(
                    entry.line,
                    format!("class \"{name}\" may not reference another class"),
                ));
            }
            classes.insert(name.clone(), block.clone());
        }
    }
    Ok(classes)
}

// ---------- selectors ----------

fn resolve_selector(
    selector: &Selector,
    header: &[String],
    positions: &HashMap<&str, usize>,
) -> Result<Vec<usize>> {
    let line = selector.line;
    let width = header.len();
    let check_index = |index: i64| -> Result<usize> {
        if index < 1 || index as usize > width {
            Err(DslError::unknown_column(
                line,
                format!("index {index} is outside HEADER (1..={width})"),
            ))
        } else {
            Ok(index as usize - 1)
        }
    };
    let check_label = |label: &str| -> Result<usize> {
        positions.get(label).copied().ok_or_else(|| {
            DslError::unknown_column(line, format!("column label \"{label}\" is not in HEADER"))
        })
    };

    match &selector.kind {
        SelectorKind::Index(index) => Ok(vec![check_index(*index)?]),
        SelectorKind::IndexRange(first, last) => {
            let first_pos = check_index(*first)?;
            let last_pos = check_index(*last)?;
            if first_pos > last_pos {
                return Err(DslError::invalid_rule(
                    line,
                    format!("INDICES range is inverted: {first}..{last}"),
                ));
            }
            Ok((first_pos..=last_pos).collect())
        }
        SelectorKind::IndexList(items) => items.iter().map(|&index| check_index(index)).collect(),
        SelectorKind::Label(label) => Ok(vec![check_label(label)?]),
        SelectorKind::LabelRange(first, last) => {
            let first_pos = check_label(first)?;
            let last_pos = check_label(last)?;
            if first_pos > last_pos {
                return Err(DslError::invalid_rule(
                    line,
                    format!("LABELS range is inverted: \"{first}\"..\"{last}\""),
                ));
            }
            Ok((first_pos..=last_pos).collect())
        }
        SelectorKind::LabelList(labels) => {
            labels.iter().map(|label| check_label(label)).collect()
        }
    }
}

// ---------- class expansion ----------

fn expand_classes(
    block: &RuleBlock,
    classes: &HashMap<String, RuleBlock>,
) -> Result<Vec<RuleEntry>> {
    let mut expanded = Vec::with_capacity(block.len());
    for entry in block {
        match &entry.kind {
            RuleKind::Class(name) => match classes.get(name) {
                Some(body) => expanded.extend(body.iter().cloned()),
                None => {
                    return Err(DslError::invalid_rule(
                        entry.line,
                        format!("unknown class \"{name}\""),
                    ));
                }
            },
            _ => expanded.push(entry.clone()),
        }
    }
    Ok(expanded)
}

// ---------- flattening ----------

/// Per-column accumulation state: one slot per rule key, with the source
/// line kept where later validation may need it.
#[derive(Debug, Clone, Default)]
struct WorkingRule {
    allow_null: Option<bool>,
    null_probability: Option<f64>,
    seq: Option<(i64, i64)>,
    step: Option<(i64, usize)>,
    digits: Option<(u32, usize)>,
    charset: Option<BTreeSet<char>>,
    length: Option<usize>,
    choices: Option<Vec<CellValue>>,
    fixed: Option<CellValue>,
    range: Option<RangeSpec>,
    date: Option<(DateKind, Option<NaiveDate>, Option<NaiveDate>, Option<String>)>,
    copy: Option<(CopyTarget, usize)>,
    join: Option<(String, Vec<JoinItem>, usize)>,
    pattern: Option<String>,
    reference: Option<(String, usize)>,
    output: Option<(OutputSide, usize)>,
    value_source: Option<(Option<String>, usize)>,
}

fn apply_block(rule: &mut WorkingRule, entries: &[RuleEntry]) -> Result<()> {
    // A block that specifies charset replaces any earlier pool; repeated
    // charset lines inside the block accumulate.
    let mut block_pool: Option<BTreeSet<char>> = None;

    for entry in entries {
        match &entry.kind {
            RuleKind::AllowNull(value) => rule.allow_null = Some(*value),
            RuleKind::NullProbability(value) => rule.null_probability = Some(*value),
            RuleKind::Seq { start, end } => rule.seq = Some((*start, *end)),
            RuleKind::Digits(n) => rule.digits = Some((*n, entry.line)),
            RuleKind::Step(k) => rule.step = Some((*k, entry.line)),
            RuleKind::Charset(arg) => {
                let pool = block_pool.get_or_insert_with(BTreeSet::new);
                match arg {
                    CharsetArg::Named(name) => pool.extend(named_pool(name).chars()),
                    CharsetArg::Literal(set) => pool.extend(set.chars()),
                }
            }
            RuleKind::Length(n) => rule.length = Some(*n),
            RuleKind::Enum(values) => rule.choices = Some(values.clone()),
            RuleKind::Fixed(value) => rule.fixed = Some(value.clone()),
            RuleKind::RangeInt(lo, hi) => rule.range = Some(RangeSpec::Int(*lo, *hi)),
            RuleKind::RangeFloat(lo, hi) => rule.range = Some(RangeSpec::Float(*lo, *hi)),
            RuleKind::DateRange { start, end, format } => {
                let kind = match rule.date {
                    Some((DateKind::DateTime, ..)) => DateKind::DateTime,
                    _ => DateKind::Date,
                };
                rule.date = Some((kind, Some(*start), Some(*end), format.clone()));
            }
            RuleKind::Date => {
                let (_, start, end, format) = rule.date.take().unwrap_or((
                    DateKind::Date,
                    None,
                    None,
                    None,
                ));
                rule.date = Some((DateKind::Date, start, end, format));
            }
            RuleKind::DateTime => {
                let (_, start, end, format) = rule.date.take().unwrap_or((
                    DateKind::DateTime,
                    None,
                    None,
                    None,
                ));
                rule.date = Some((DateKind::DateTime, start, end, format));
            }
            RuleKind::Copy(target) => rule.copy = Some((target.clone(), entry.line)),
            RuleKind::Join { separator, items } => {
                rule.join = Some((separator.clone(), items.clone(), entry.line));
            }
            RuleKind::Regex(pattern) => rule.pattern = Some(pattern.clone()),
            RuleKind::Reference(key) => rule.reference = Some((key.clone(), entry.line)),
            RuleKind::Output(side) => rule.output = Some((*side, entry.line)),
            RuleKind::ValueSource(source) => {
                rule.value_source = Some((source.clone(), entry.line));
            }
            RuleKind::Class(_) => unreachable!("classes are expanded before flattening"),
        }
    }

    if let Some(pool) = block_pool {
        rule.charset = Some(pool);
    }
    Ok(())
}

fn named_pool(name: &str) -> &'static str {
    match name {
        "lower" => "abcdefghijklmnopqrstuvwxyz",
        "upper" => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        "alphabet" => "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
        "alnum" => "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
        "number" | "digits" => "0123456789",
        "hex" => "0123456789ABCDEF",
        "symbol" => "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
        _ => "",
    }
}

// ---------- lowering & validation ----------

fn lower_column(
    name: &str,
    position: usize,
    work: WorkingRule,
    positions: &HashMap<&str, usize>,
    references: &ReferenceStore,
) -> Result<ColumnRule> {
    let mut column = ColumnRule::new(name, position);

    column.allow_null = work.allow_null.unwrap_or(true);
    column.null_probability = work.null_probability.unwrap_or(0.0);
    if !column.allow_null {
        column.null_probability = 0.0;
    }

    match (work.seq, work.digits, work.step) {
        (Some((start, end)), digits, step) => {
            column.seq = Some(SeqSpec {
                start,
                end,
                step: step.map(|(k, _)| k).unwrap_or(1),
                digits: digits.map(|(n, _)| n),
            });
        }
        (None, Some((_, line)), _) => {
            return Err(DslError::invalid_rule(line, "digits requires a seq rule"));
        }
        (None, None, Some((_, line))) => {
            return Err(DslError::invalid_rule(line, "step requires a seq rule"));
        }
        (None, None, None) => {}
    }

    column.pool = work.charset.map(|set| set.into_iter().collect());
    column.length = work.length;
    column.choices = work.choices;
    column.fixed = work.fixed;
    column.range = work.range;
    column.date = work.date.map(|(kind, start, end, format)| DateSpec {
        kind,
        start,
        end,
        format,
    });
    column.pattern = work.pattern;

    if let Some((target, line)) = work.copy {
        column.copy_from = Some(match target {
            CopyTarget::Label(label) => *positions.get(label.as_str()).ok_or_else(|| {
                DslError::unknown_column(
                    line,
                    format!("copy target \"{label}\" is not in HEADER"),
                )
            })?,
            CopyTarget::Index(index) => {
                if index < 1 || index as usize > positions.len() {
                    return Err(DslError::unknown_column(
                        line,
                        format!("copy index {index} is outside HEADER"),
                    ));
                }
                index as usize - 1
            }
        });
    }

    if let Some((separator, items, line)) = work.join {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            parts.push(match item {
                JoinItem::Literal(text) => JoinPart::Literal(text),
                JoinItem::Column(label) => JoinPart::Column(
                    *positions.get(label.as_str()).ok_or_else(|| {
                        DslError::unknown_column(
                            line,
                            format!("join column '{label}' is not in HEADER"),
                        )
                    })?,
                ),
            });
        }
        column.join = Some(JoinSpec { separator, parts });
    }

    match (work.reference, work.output, work.value_source) {
        (Some((key, line)), output, value_source) => {
            if !references.contains(&key) {
                return Err(DslError::unknown_reference(
                    line,
                    format!("reference table \"{key}\" is not defined"),
                ));
            }
            let Some((output, _)) = output else {
                return Err(DslError::invalid_rule(
                    line,
                    format!("reference column \"{name}\" requires 'output label' or 'output value'"),
                ));
            };
            let source = match value_source {
                None => ValueSource::Pick,
                Some((None, _)) => ValueSource::Auto { from: None },
                Some((Some(source_label), source_line)) => ValueSource::Column {
                    position: *positions.get(source_label.as_str()).ok_or_else(|| {
                        DslError::unknown_column(
                            source_line,
                            format!("value_source column \"{source_label}\" is not in HEADER"),
                        )
                    })?,
                },
            };
            column.reference = Some(ReferenceUse {
                key,
                output,
                source,
            });
        }
        (None, Some((_, line)), _) => {
            return Err(DslError::invalid_rule(
                line,
                "output requires a reference rule on the same column",
            ));
        }
        (None, None, Some((_, line))) => {
            return Err(DslError::invalid_rule(
                line,
                "value_source requires a reference rule on the same column",
            ));
        }
        (None, None, None) => {}
    }

    Ok(column)
}

/// Precompute, for each argument-less `value_source` column, the nearest
/// left column sharing its reference key with `output label`.
fn resolve_auto_sources(columns: &mut [ColumnRule]) {
    for index in 0..columns.len() {
        let Some(reference) = &columns[index].reference else {
            continue;
        };
        if !matches!(reference.source, ValueSource::Auto { .. }) {
            continue;
        }
        let key = reference.key.clone();
        let from = columns[..index].iter().rposition(|candidate| {
            candidate
                .reference
                .as_ref()
                .is_some_and(|r| r.key == key && r.output == OutputSide::Label)
        });
        if let Some(reference) = &mut columns[index].reference {
            reference.source = ValueSource::Auto { from };
        }
    }
}
