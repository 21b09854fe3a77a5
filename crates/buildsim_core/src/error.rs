//! Error types for the build-order simulation.
//!
//! Only configuration and chromosome problems are errors. A player action
//! that cannot be carried out is an ordinary outcome, see
//! [`crate::actions::ActionOutcome`].

use thiserror::Error;

use crate::data::ConstantsFormat;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// One or more required top-level constant entries are absent.
    #[error("Missing required constant entries: {missing:?}")]
    MissingFields {
        /// Absent keys, sorted.
        missing: Vec<String>,
    },

    /// The constants source is not a well-formed document.
    #[error("Failed to parse {format} constants: {message}")]
    Parse {
        /// Format the source was parsed as.
        format: ConstantsFormat,
        /// Parser error message.
        message: String,
    },

    /// A chromosome gene has no entry in the decode table.
    #[error("Unknown action index '{gene}' at tick {tick}")]
    UnknownGene {
        /// The offending gene value.
        gene: i32,
        /// Tick index the gene was scheduled for.
        tick: usize,
    },

    /// Chromosome text contained something that is not an integer.
    #[error("Invalid gene token '{token}' at position {position}")]
    InvalidGeneToken {
        /// The offending token.
        token: String,
        /// Zero-based position of the token in the chromosome.
        position: usize,
    },

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),
}
