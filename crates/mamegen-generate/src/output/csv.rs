use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use mamegen_core::{CellValue, OutputConfig};

use crate::errors::OutputError;

/// Write rows as CSV, honouring the header and quoting flags.
///
/// `quote_header` and `quote_strings` are independent, so the header line
/// is rendered through its own writer before the data rows.
pub fn write_rows_csv(
    path: &Path,
    header: &[String],
    rows: &[Vec<CellValue>],
    config: &OutputConfig,
) -> Result<(), OutputError> {
    let mut file = File::create(path)?;

    if config.with_header {
        let line = format_record(
            header.iter().map(String::as_str),
            quote_style(config.quote_header),
        )?;
        file.write_all(&line)?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(quote_style(config.quote_strings))
        .from_writer(file);

    for row in rows {
        let record: Vec<String> = row.iter().map(CellValue::to_field).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn quote_style(always: bool) -> QuoteStyle {
    if always {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    }
}

fn format_record<'a>(
    fields: impl Iterator<Item = &'a str>,
    style: QuoteStyle,
) -> Result<Vec<u8>, OutputError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(style)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|err| OutputError::Io(err.into_error()))
}
