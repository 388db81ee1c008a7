use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use mamegen_core::{
    CellValue, ColumnRule, DslError, JoinPart, OutputSide, Program, ReferenceUse, Result,
    ValueSource,
};

use crate::model::GenerateOptions;
use crate::pattern::Pattern;
use crate::rules;

/// Seed used when `CONFIG.reproducible` is true.
const REPRODUCIBLE_SEED: u64 = 42;

/// Entry point for producing the row sequence from an analysed program.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Produce `config.count` rows, each as wide as the header.
    ///
    /// Evaluation is strictly row-major: rows in index order, columns
    /// left to right, every RNG draw in the order evaluation reaches it.
    pub fn run(&self, program: &Program) -> Result<Vec<Vec<CellValue>>> {
        let mut rng = if program.config.reproducible {
            ChaCha8Rng::seed_from_u64(REPRODUCIBLE_SEED)
        } else {
            ChaCha8Rng::from_entropy()
        };

        let patterns = compile_patterns(&program.columns)?;
        let mut seq_counters: Vec<Option<i64>> = vec![None; program.columns.len()];
        let mut rows = Vec::with_capacity(program.config.count as usize);

        for _ in 0..program.config.count {
            // The reference lock map and the cell buffer are per-record.
            let mut locks: HashMap<&str, usize> = HashMap::new();
            let mut buffer: Vec<CellValue> = vec![CellValue::Empty; program.columns.len()];

            for (position, column) in program.columns.iter().enumerate() {
                let cell = self.cell(
                    column,
                    program,
                    &buffer,
                    &mut locks,
                    &mut seq_counters[position],
                    patterns[position].as_ref(),
                    &mut rng,
                )?;
                let cell = self.enforce_null_policy(column, cell)?;
                buffer[position] = cell;
            }
            rows.push(buffer);
        }
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    fn cell<'p>(
        &self,
        column: &'p ColumnRule,
        program: &Program,
        buffer: &[CellValue],
        locks: &mut HashMap<&'p str, usize>,
        seq_counter: &mut Option<i64>,
        pattern: Option<&Pattern>,
        rng: &mut ChaCha8Rng,
    ) -> Result<CellValue> {
        if column.allow_null
            && column.null_probability > 0.0
            && rng.gen::<f64>() < column.null_probability
        {
            return Ok(CellValue::Empty);
        }

        if let Some(value) = &column.fixed {
            return Ok(value.clone());
        }

        if let Some(source) = column.copy_from {
            return Ok(buffer[source].clone());
        }

        if let Some(join) = &column.join {
            let parts: Vec<String> = join
                .parts
                .iter()
                .map(|part| match part {
                    JoinPart::Literal(text) => text.clone(),
                    JoinPart::Column(position) => buffer[*position].to_field(),
                })
                .collect();
            return Ok(CellValue::Text(parts.join(&join.separator)));
        }

        if let Some(reference) = &column.reference {
            return self.reference_cell(reference, program, buffer, locks, rng);
        }

        if let Some(seq) = &column.seq {
            return Ok(rules::next_seq(seq, seq_counter));
        }

        if let Some(date) = &column.date {
            return Ok(rules::random_date(date, rng));
        }

        if let Some(choices) = &column.choices {
            return Ok(rules::random_choice(choices, rng));
        }

        if let Some(range) = &column.range {
            return Ok(rules::random_in_range(range, rng));
        }

        if let Some(pattern) = pattern {
            return Ok(CellValue::Text(pattern.expand(rng)));
        }

        if column.pool.is_some() || column.length.is_some() {
            let pool = column.pool.as_deref().unwrap_or(rules::DEFAULT_POOL);
            let length = column.length.unwrap_or(rules::DEFAULT_LENGTH);
            return Ok(rules::random_string(pool, length, rng));
        }

        Ok(CellValue::Text(String::new()))
    }

    fn reference_cell<'p>(
        &self,
        reference: &'p ReferenceUse,
        program: &Program,
        buffer: &[CellValue],
        locks: &mut HashMap<&'p str, usize>,
        rng: &mut ChaCha8Rng,
    ) -> Result<CellValue> {
        let table = program.references.get(&reference.key).ok_or_else(|| {
            DslError::generation(format!("reference table \"{}\" is missing", reference.key))
        })?;

        match &reference.source {
            // Synchronous mode: one row per record per reference name,
            // locked on first use.
            ValueSource::Pick => {
                let index = match locks.get(reference.key.as_str()) {
                    Some(&index) => index,
                    None => {
                        let index = rng.gen_range(0..table.len());
                        locks.insert(&reference.key, index);
                        index
                    }
                };
                let row = table.row(index).ok_or_else(|| {
                    DslError::generation(format!(
                        "reference \"{}\" row {index} is out of bounds",
                        reference.key
                    ))
                })?;
                Ok(emit_side(row.label.as_str(), &row.value, reference.output))
            }
            // Reverse modes never touch the lock map.
            ValueSource::Auto { from } => {
                let Some(source) = from else {
                    return Ok(CellValue::Empty);
                };
                let cell = &buffer[*source];
                if cell.is_empty() {
                    return Ok(CellValue::Empty);
                }
                match table.row_by_label(&cell.to_field()) {
                    Some(row) => Ok(emit_side(row.label.as_str(), &row.value, reference.output)),
                    None => Ok(CellValue::Empty),
                }
            }
            ValueSource::Column { position } => {
                let cell = &buffer[*position];
                if cell.is_empty() {
                    return Ok(CellValue::Empty);
                }
                let field = cell.to_field();
                let row = table
                    .row_by_label(&field)
                    .or_else(|| table.row_by_value(&field));
                match row {
                    Some(row) => Ok(emit_side(row.label.as_str(), &row.value, reference.output)),
                    None => Ok(CellValue::Empty),
                }
            }
        }
    }

    fn enforce_null_policy(&self, column: &ColumnRule, cell: CellValue) -> Result<CellValue> {
        if cell.is_empty() && !column.allow_null && self.options.strict_nulls {
            return Err(DslError::generation(format!(
                "column \"{}\" produced an empty cell but allow_null is false",
                column.name
            )));
        }
        Ok(cell)
    }
}

fn emit_side(label: &str, value: &CellValue, side: OutputSide) -> CellValue {
    match side {
        OutputSide::Label => CellValue::Text(label.to_string()),
        OutputSide::Value => value.clone(),
    }
}

fn compile_patterns(columns: &[ColumnRule]) -> Result<Vec<Option<Pattern>>> {
    columns
        .iter()
        .map(|column| {
            column
                .pattern
                .as_deref()
                .map(Pattern::compile)
                .transpose()
        })
        .collect()
}
