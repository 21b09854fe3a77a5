//! Parsing balance constants from structured text.
//!
//! RON, YAML and JSON are interchangeable front-ends: each deserializes into
//! the same all-optional raw document, which is then checked for the required
//! top-level keys so that every missing key is reported at once.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

use super::constants::{ActionParam, Constants};
use crate::error::{Result, SimError};

/// Top-level keys every constants document must define.
pub const REQUIRED_KEYS: [&str; 6] = [
    "tick_seconds",
    "gather_rates",
    "actions",
    "initial_state",
    "penalties",
    "fitness_weights",
];

/// Text format of a constants document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstantsFormat {
    /// Rusty Object Notation.
    Ron,
    /// YAML.
    Yaml,
    /// JSON.
    Json,
}

impl ConstantsFormat {
    /// Pick a format from a file extension (case-insensitive).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ron" => Some(Self::Ron),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Pick a format from a path's extension. Does not touch the filesystem.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ConstantsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ron => write!(f, "RON"),
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Constants document before required-key validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConstants {
    tick_seconds: Option<f64>,
    gather_rates: Option<BTreeMap<String, f64>>,
    actions: Option<BTreeMap<String, BTreeMap<String, ActionParam>>>,
    initial_state: Option<BTreeMap<String, f64>>,
    penalties: Option<BTreeMap<String, f64>>,
    fitness_weights: Option<BTreeMap<String, f64>>,
}

impl RawConstants {
    fn missing_keys(&self) -> Vec<String> {
        let present = [
            self.tick_seconds.is_some(),
            self.gather_rates.is_some(),
            self.actions.is_some(),
            self.initial_state.is_some(),
            self.penalties.is_some(),
            self.fitness_weights.is_some(),
        ];
        let mut missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .zip(present)
            .filter(|(_, is_present)| !is_present)
            .map(|(key, _)| (*key).to_string())
            .collect();
        missing.sort();
        missing
    }

    fn into_constants(self) -> Result<Constants> {
        let missing = self.missing_keys();
        match (
            self.tick_seconds,
            self.gather_rates,
            self.actions,
            self.initial_state,
            self.penalties,
            self.fitness_weights,
        ) {
            (
                Some(tick_seconds),
                Some(gather_rates),
                Some(actions),
                Some(initial_state),
                Some(penalties),
                Some(fitness_weights),
            ) => Ok(Constants {
                tick_seconds,
                gather_rates,
                actions,
                initial_state,
                penalties,
                fitness_weights,
            }),
            _ => Err(SimError::MissingFields { missing }),
        }
    }
}

fn parse_raw(source: &str, format: ConstantsFormat) -> Result<RawConstants> {
    let parse_error = |message: String| SimError::Parse { format, message };
    match format {
        ConstantsFormat::Ron => ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(source)
            .map_err(|e| parse_error(e.to_string())),
        ConstantsFormat::Yaml => {
            // An empty YAML document is a document with no keys.
            if source.trim().is_empty() {
                return Ok(RawConstants::default());
            }
            serde_yaml::from_str(source).map_err(|e| parse_error(e.to_string()))
        }
        ConstantsFormat::Json => serde_json::from_str(source).map_err(|e| parse_error(e.to_string())),
    }
}

/// Parse balance constants from a document in the given format.
///
/// # Errors
///
/// Returns [`SimError::Parse`] if the document is malformed, or
/// [`SimError::MissingFields`] listing every absent required key (sorted).
pub fn load_constants(source: &str, format: ConstantsFormat) -> Result<Constants> {
    let constants = parse_raw(source, format)?.into_constants()?;
    tracing::debug!(
        %format,
        tick_seconds = constants.tick_seconds,
        actions = constants.actions.len(),
        "Loaded constants"
    );
    Ok(constants)
}
