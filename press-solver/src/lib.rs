//! # press-solver
//! Solves button-press machines: for every machine, the fewest presses that light up the desired
//! indicator pattern, and the fewest presses that bring every joltage counter exactly to its
//! target.
//!
//! The solving itself lives in `press-core`, which is re-exported here; this crate adds the
//! `press-solver` binary that reads machine descriptions from a file.
pub use press_core::*;
