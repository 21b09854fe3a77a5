//! Constants file loading.
//!
//! Reads balance documents from disk and hands the text to the core parser.
//! The document format is picked from the file extension.

use std::fs;
use std::path::{Path, PathBuf};

use buildsim_core::data::{load_constants, Constants, ConstantsFormat};
use buildsim_core::error::SimError;
use thiserror::Error;

/// Environment variable that overrides the default constants file.
pub const CONSTANTS_PATH_ENV: &str = "BUILDSIM_CONSTANTS";

/// Error loading a constants file.
#[derive(Debug, Error)]
pub enum ConstantsLoadError {
    /// Failed to read file or directory.
    #[error("IO error reading '{0}': {1}")]
    IoError(String, String),
    /// Extension is not `.ron`, `.yaml`, `.yml` or `.json`.
    #[error("Unsupported constants format for '{0}'")]
    UnsupportedFormat(String),
    /// The document parsed badly or is missing required keys.
    #[error("Invalid constants in '{0}': {1}")]
    Invalid(String, #[source] SimError),
    /// Directory not found.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
}

/// Load a constants file, choosing the parser from its extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unknown extension, or
/// does not hold a complete constants document.
pub fn load_constants_file(path: &Path) -> Result<Constants, ConstantsLoadError> {
    let format = ConstantsFormat::from_path(path)
        .ok_or_else(|| ConstantsLoadError::UnsupportedFormat(path.display().to_string()))?;

    let content = fs::read_to_string(path)
        .map_err(|e| ConstantsLoadError::IoError(path.display().to_string(), e.to_string()))?;

    let constants = load_constants(&content, format)
        .map_err(|e| ConstantsLoadError::Invalid(path.display().to_string(), e))?;

    tracing::info!(path = %path.display(), %format, "Loaded constants file");
    Ok(constants)
}

/// List every constants file in a directory, sorted by path.
///
/// Files with other extensions are skipped. Subdirectories are not searched.
///
/// # Errors
///
/// Returns an error if the directory is missing or cannot be read.
pub fn constants_files_in(dir: &Path) -> Result<Vec<PathBuf>, ConstantsLoadError> {
    if !dir.is_dir() {
        return Err(ConstantsLoadError::DirectoryNotFound(
            dir.display().to_string(),
        ));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| ConstantsLoadError::IoError(dir.display().to_string(), e.to_string()))?
    {
        let entry = entry
            .map_err(|e| ConstantsLoadError::IoError(dir.display().to_string(), e.to_string()))?;
        let path = entry.path();

        if path.is_file() && ConstantsFormat::from_path(&path).is_some() {
            files.push(path);
        } else {
            tracing::debug!("Skipping {:?}", path);
        }
    }

    files.sort();
    Ok(files)
}

/// Resolve the default constants file.
///
/// Looks in standard locations:
/// 1. Environment variable `BUILDSIM_CONSTANTS`
/// 2. `./assets/data/constants.ron` (repo root)
/// 3. `../../assets/data/constants.ron` (running from a crate directory)
pub fn default_constants_path() -> Option<PathBuf> {
    if let Ok(file) = std::env::var(CONSTANTS_PATH_ENV) {
        let path = PathBuf::from(file);
        if path.is_file() {
            return Some(path);
        }
        tracing::warn!("{CONSTANTS_PATH_ENV} points at missing file {:?}", path);
    }

    let candidates = ["assets/data/constants.ron", "../../assets/data/constants.ron"];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}
