//! Constants validation.
//!
//! Loading already guarantees that every required key exists. These checks
//! catch documents that load fine but cannot describe a sensible economy.

use std::fmt;
use std::path::{Path, PathBuf};

use buildsim_core::actions::Action;
use buildsim_core::data::Constants;
use serde::Serialize;

use crate::constants_loader::{constants_files_in, load_constants_file, ConstantsLoadError};

/// One problem found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// File the issue was found in.
    pub path: PathBuf,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Result of validating a file or directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Files that were examined.
    pub files_checked: Vec<PathBuf>,
    /// Problems found, in file order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether no issues were found.
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Sanity-check loaded constants.
///
/// Returns one message per problem; an empty list means the constants are
/// usable.
pub fn validate_constants(constants: &Constants) -> Vec<String> {
    let mut issues = Vec::new();

    if !constants.tick_seconds.is_finite() || constants.tick_seconds <= 0.0 {
        issues.push(format!(
            "tick_seconds must be a positive number, got {}",
            constants.tick_seconds
        ));
    }

    for (resource, rate) in &constants.gather_rates {
        if *rate < 0.0 {
            issues.push(format!("gather rate for '{resource}' is negative ({rate})"));
        }
    }

    for action in [Action::TrainVillager, Action::BuildHouse] {
        if !constants.actions.contains_key(action.name()) {
            issues.push(format!("missing parameters for action '{action}'"));
        }
    }

    issues
}

fn validate_file(path: &Path, report: &mut ValidationReport) {
    report.files_checked.push(path.to_path_buf());

    match load_constants_file(path) {
        Ok(constants) => {
            for message in validate_constants(&constants) {
                tracing::warn!(path = %path.display(), "{message}");
                report.issues.push(ValidationIssue {
                    path: path.to_path_buf(),
                    message,
                });
            }
        }
        Err(e) => {
            tracing::warn!("{e}");
            report.issues.push(ValidationIssue {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    }
}

/// Validate a single constants file or every constants file in a directory.
///
/// Load failures of individual files are reported as issues, not errors.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be read.
pub fn validate_path(path: &Path) -> Result<ValidationReport, ConstantsLoadError> {
    let mut report = ValidationReport::default();

    if path.is_dir() {
        for file in constants_files_in(path)? {
            validate_file(&file, &mut report);
        }
    } else {
        validate_file(path, &mut report);
    }

    tracing::info!(
        files = report.files_checked.len(),
        issues = report.issues.len(),
        "Validation finished"
    );
    Ok(report)
}
