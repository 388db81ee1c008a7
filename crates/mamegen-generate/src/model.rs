/// Options for the generation engine.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Raise a generation error when a cell comes out empty on a column
    /// with `allow_null false`; when false, coerce to empty instead.
    pub strict_nulls: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { strict_nulls: true }
    }
}
