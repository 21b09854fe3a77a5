//! # Build-Order Simulation Core
//!
//! Deterministic economy simulator used to score build orders for a
//! genetic-algorithm search.
//!
//! A chromosome is a sequence of integer genes, one per tick. Each gene decodes
//! to a coarse player action (train a villager, assign a worker, build a house,
//! ...). The simulation replays those actions against a discrete-tick model of
//! villager assignment, resource gathering, training and construction, and
//! reduces the final state to a scalar fitness.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (constants are parsed from an in-memory string)
//! - No randomness
//! - Ordered maps everywhere iteration order could leak into results
//!
//! ## Crate Structure
//!
//! - [`data`] - Balance constants and their loaders
//! - [`state`] - Mutable simulation snapshot
//! - [`actions`] - Player action resolution
//! - [`production`] - Training and construction timers
//! - [`economy`] - Passive resource income
//! - [`fitness`] - Final-state scoring
//! - [`genes`] - Chromosome decoding
//! - [`simulation`] - Tick loop driver
//! - [`trace`] - Per-tick trace records

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod data;
pub mod economy;
pub mod error;
pub mod fitness;
pub mod genes;
pub mod production;
pub mod simulation;
pub mod state;
pub mod trace;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{apply, apply_action, Action, ActionOutcome, Rejection, ResourceKind};
    pub use crate::data::{load_constants, ActionParam, Constants, ConstantsFormat};
    pub use crate::economy::{gather, Income};
    pub use crate::error::{Result, SimError};
    pub use crate::fitness::score;
    pub use crate::genes::{decode_chromosome, parse_chromosome, GeneAction, GENE_TABLE};
    pub use crate::production::advance;
    pub use crate::simulation::{simulate, step, SimulationReport};
    pub use crate::state::{State, TickEvent};
    pub use crate::trace::{SummaryRecord, TickRecord, TraceEntry};
}
