//! Guillotine cut-list optimizer.
//!
//! Packs rectangular parts onto stock sheets with a deadline-bounded
//! branch-and-bound search, and derives the cut sequence for each sheet.

pub mod api;
pub mod error;
pub mod expand;
pub mod guillotine;
pub mod render;
pub mod score;
pub mod solver;
pub mod types;

pub use error::{Error, Result};
pub use solver::{Outcome, Solver, SolverConfig};
pub use types::{Demand, Part, Rect, Solution};
