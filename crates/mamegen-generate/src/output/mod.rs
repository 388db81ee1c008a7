//! Serialisation of the generated row sequence.

pub mod csv;
pub mod json;

use crate::errors::OutputError;

pub use self::csv::write_rows_csv;
pub use self::json::write_rows_json;

/// Resolve an encoding label to its canonical name.
///
/// Only UTF-8 aliases are supported; anything else fails fast instead of
/// silently writing the wrong bytes.
pub fn resolve_encoding(label: &str) -> Result<&'static str, OutputError> {
    match label.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" | "us-ascii" => Ok("utf-8"),
        _ => Err(OutputError::UnsupportedEncoding(label.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_aliases_resolve() {
        assert_eq!(resolve_encoding("UTF-8").unwrap(), "utf-8");
        assert_eq!(resolve_encoding("utf8").unwrap(), "utf-8");
        assert_eq!(resolve_encoding("ascii").unwrap(), "utf-8");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!(matches!(
            resolve_encoding("sjis"),
            Err(OutputError::UnsupportedEncoding(_))
        ));
    }
}
