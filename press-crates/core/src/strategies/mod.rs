//! The solving strategies.
//!
//! Every strategy computes the same thing, the minimum total number of presses for a
//! [`Problem`], and differs only in how it searches:
//! - [`ConstraintSearch`] assigns buttons slot by slot in a depth-first branch-and-bound search;
//! - [`PartitionSearch`] commits all buttons of the most constrained slot at once;
//! - [`MilpSearch`] solves the linear relaxation and restores integrality by branch-and-bound,
//!   falling back to [`ConstraintSearch`] whenever its answer cannot be trusted.
mod csp;
mod milp;
mod partition;

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;

pub use csp::*;
pub use milp::*;
pub use partition::*;

use crate::model::OptimisationResult;
use crate::model::Problem;
use crate::statistics::StatisticLogger;

/// The capability shared by all strategies: solve one problem to optimality.
///
/// A strategy instance may be reused for many problems; it only keeps statistics between calls,
/// never search state.
pub trait SolvingStrategy: Debug + Send {
    /// Computes a solution with the minimum total number of presses, or reports that no
    /// assignment reaches every target.
    fn solve(&mut self, problem: &Problem) -> OptimisationResult;

    /// Logs the statistics accumulated over all calls to [`SolvingStrategy::solve`].
    fn log_statistics(&self, statistic_logger: StatisticLogger);
}

/// Selects which strategy is used for a batch of problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum StrategyKind {
    /// Depth-first search over the slots, ordered by constraint tightness, with
    /// branch-and-bound pruning.
    Csp,
    /// Recursively commits every available button of the most constrained slot by enumerating
    /// the ways to split its residual target.
    #[default]
    Partition,
    /// Simplex-based branch-and-bound on the linear relaxation, with the constraint search as a
    /// fallback.
    Milp,
}

impl StrategyKind {
    /// Creates a fresh instance of the selected strategy.
    pub fn create(self) -> Box<dyn SolvingStrategy> {
        match self {
            StrategyKind::Csp => Box::new(ConstraintSearch::default()),
            StrategyKind::Partition => Box::new(PartitionSearch::default()),
            StrategyKind::Milp => Box::new(MilpSearch::default()),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Csp => write!(f, "csp"),
            StrategyKind::Partition => write!(f, "partition"),
            StrategyKind::Milp => write!(f, "milp"),
        }
    }
}
