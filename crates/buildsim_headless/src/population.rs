//! Population files.
//!
//! A population is the list of chromosomes scored together in one batch.
//! Two file shapes are accepted:
//!
//! - JSON: an array of integer arrays, `[[1, 2, 0], [3, 3, 6]]`
//! - Text: one chromosome per line, genes separated by commas or whitespace.
//!   Blank lines and lines starting with `#` are ignored.

use std::fs;
use std::path::Path;

use buildsim_core::error::SimError;
use buildsim_core::genes::parse_chromosome;
use thiserror::Error;

/// Error loading a population.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// Failed to read file.
    #[error("IO error reading '{0}': {1}")]
    IoError(String, String),
    /// JSON document is not an array of integer arrays.
    #[error("Invalid JSON population: {0}")]
    Json(String),
    /// A text line held something other than integers.
    #[error("Line {line}: {source}")]
    Line {
        /// One-based line number.
        line: usize,
        /// Underlying parse error.
        #[source]
        source: SimError,
    },
}

/// Parse population text, detecting JSON by a leading `[`.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a text line has a bad token.
pub fn parse_population(text: &str) -> Result<Vec<Vec<i32>>, PopulationError> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).map_err(|e| PopulationError::Json(e.to_string()));
    }

    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, content)| {
            parse_chromosome(content).map_err(|source| PopulationError::Line { line, source })
        })
        .collect()
}

/// Load a population file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_population(path: &Path) -> Result<Vec<Vec<i32>>, PopulationError> {
    let text = fs::read_to_string(path)
        .map_err(|e| PopulationError::IoError(path.display().to_string(), e.to_string()))?;
    let population = parse_population(&text)?;
    tracing::info!(path = %path.display(), chromosomes = population.len(), "Loaded population");
    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_population() {
        let population = parse_population("  [[1, 2, 0], [], [6]]").unwrap();
        assert_eq!(population, vec![vec![1, 2, 0], vec![], vec![6]]);
    }

    #[test]
    fn test_parse_text_population() {
        let text = "# generation 4\n1,2,0\n\n  3 3 6  \n# tail\n";
        let population = parse_population(text).unwrap();
        assert_eq!(population, vec![vec![1, 2, 0], vec![3, 3, 6]]);
    }

    #[test]
    fn test_bad_token_reports_line() {
        let err = parse_population("1,2\n3,x\n").unwrap_err();
        match err {
            PopulationError::Line { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(
                    source,
                    SimError::InvalidGeneToken {
                        token: "x".to_string(),
                        position: 1
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            parse_population("[[1, 2], \"three\"]"),
            Err(PopulationError::Json(_))
        ));
    }

    #[test]
    fn test_genes_are_not_range_checked_here() {
        assert_eq!(parse_population("99,-1").unwrap(), vec![vec![99, -1]]);
    }

    #[test]
    fn test_load_sample_population() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pop.txt");
        fs::write(&path, "0 0 0\n2 2 3\n").unwrap();

        assert_eq!(load_population(&path).unwrap().len(), 2);
    }
}
