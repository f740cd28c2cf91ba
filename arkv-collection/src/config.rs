/// Column types chosen for fields first seen during ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestOptions {
    /// Precision of decimal columns created for fractional numbers.
    pub decimal_precision: u8,
    /// Scale of decimal columns created for fractional numbers. Values are
    /// rounded half away from zero to the scale of the column they land in.
    pub decimal_scale: i8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            decimal_precision: 15,
            decimal_scale: 3,
        }
    }
}
