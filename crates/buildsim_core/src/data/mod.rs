//! Balance constants consumed by the simulation.
//!
//! This module contains the [`Constants`] value every tick reads from, and
//! the parsers that turn a RON, YAML or JSON document into it.
//!
//! **Note:** This module contains no IO - it parses from strings only.
//! File loading is handled by `buildsim_headless`.

mod constants;
mod loader;

pub use constants::{ActionParam, BuildHouseParams, Constants, TrainVillagerParams};
pub use loader::{load_constants, ConstantsFormat, REQUIRED_KEYS};
