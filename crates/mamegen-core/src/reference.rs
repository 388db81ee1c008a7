use std::collections::HashMap;

use crate::value::CellValue;

/// One `(label, value)` pair of a reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    pub label: String,
    pub value: CellValue,
}

/// A named, ordered list of reference rows with inverse indices.
///
/// Duplicate labels are allowed; lookups resolve to the first occurrence,
/// matching insertion order.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    name: String,
    rows: Vec<ReferenceRow>,
    by_label: HashMap<String, usize>,
    by_value: HashMap<String, usize>,
}

impl ReferenceTable {
    pub fn new(name: impl Into<String>, rows: Vec<ReferenceRow>) -> Self {
        let mut table = Self {
            name: name.into(),
            rows: Vec::new(),
            by_label: HashMap::new(),
            by_value: HashMap::new(),
        };
        table.extend(rows);
        table
    }

    /// Append rows, keeping first-occurrence semantics for the indices.
    pub fn extend(&mut self, rows: Vec<ReferenceRow>) {
        for row in rows {
            let index = self.rows.len();
            self.by_label.entry(row.label.clone()).or_insert(index);
            self.by_value
                .entry(row.value.to_field())
                .or_insert(index);
            self.rows.push(row);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&ReferenceRow> {
        self.rows.get(index)
    }

    /// First row whose label equals `label`.
    pub fn row_by_label(&self, label: &str) -> Option<&ReferenceRow> {
        self.by_label.get(label).and_then(|&i| self.rows.get(i))
    }

    /// First row whose value's text form equals `value`.
    pub fn row_by_value(&self, value: &str) -> Option<&ReferenceRow> {
        self.by_value.get(value).and_then(|&i| self.rows.get(i))
    }
}

/// Immutable mapping from reference name to its table.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    tables: HashMap<String, ReferenceTable>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows under `name`, concatenating with any existing table.
    pub fn add_rows(&mut self, name: &str, rows: Vec<ReferenceRow>) {
        match self.tables.get_mut(name) {
            Some(table) => table.extend(rows),
            None => {
                self.tables
                    .insert(name.to_string(), ReferenceTable::new(name, rows));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ReferenceTable> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
