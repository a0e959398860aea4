//! Error types for so6-core operations

/// Result type for so6-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in so6-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Ring division requested with a divisor that does not exactly divide
    /// the dividend. Call sites are expected to prevent this.
    #[error("ring division is not exact: ({dividend}) / ({divisor})")]
    RingDomain { dividend: String, divisor: String },

    /// Generator index outside the fifteen transvection generators
    #[error("generator index out of range: {0} (expected 0..=14)")]
    InvalidGeneratorIndex(usize),

    /// Pattern line of the wrong length (72 or 36 binary digits expected)
    #[error("malformed pattern line: {digits} binary digits (expected 72 or 36)")]
    MalformedPattern { digits: usize },

    /// Unparseable token in a circuit history line
    #[error("malformed circuit history token: {token:?}")]
    MalformedHistory { token: String },
}
