//! Headless build-order runner.
//!
//! This crate wraps the pure simulation core with everything that touches
//! the outside world:
//!
//! - **Constants files**: RON, YAML or JSON, picked by extension
//! - **Populations**: JSON arrays or plain-text chromosome lists
//! - **Batch scoring**: a whole population scored in parallel with rayon
//! - **Verification**: replaying one chromosome to catch non-determinism
//! - **Validation**: sanity checks over a directory of constants files
//!
//! Logs go to stderr; reports go to stdout or a file as JSON.
//!
//! # Example
//!
//! ```bash
//! # Score one chromosome
//! cargo run -p buildsim_headless -- run --chromosome "2,2,3,1,0,6"
//!
//! # Score a population on 8 threads
//! cargo run -p buildsim_headless -- batch --population assets/populations/sample.json --parallel 8
//!
//! # Check every constants file under assets/data
//! cargo run -p buildsim_headless -- validate assets/data
//! ```

pub mod batch;
pub mod constants_loader;
pub mod population;
pub mod runner;
pub mod validate;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, BatchSummary};
pub use constants_loader::{default_constants_path, load_constants_file, ConstantsLoadError};
pub use population::{load_population, parse_population, PopulationError};
pub use runner::{run_chromosome, RunReport};
pub use validate::{validate_constants, validate_path, ValidationIssue, ValidationReport};
