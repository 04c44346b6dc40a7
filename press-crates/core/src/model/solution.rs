use std::fmt::Display;
use std::fmt::Formatter;

use super::ButtonId;
use crate::containers::KeyedVec;

/// A complete assignment of press counts to buttons.
///
/// Strategies only hand out solutions which satisfy every slot of the problem they were computed
/// for, see [`crate::Problem::is_satisfied_by`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    presses: KeyedVec<ButtonId, u64>,
}

impl Solution {
    pub fn new(presses: KeyedVec<ButtonId, u64>) -> Solution {
        Solution { presses }
    }

    /// The total number of presses over all buttons.
    ///
    /// For a solution satisfying a [`crate::Problem`] this is at most the sum of its targets,
    /// which [`crate::Problem::new`] guarantees to fit.
    pub fn total(&self) -> u64 {
        self.presses.iter().sum()
    }

    pub fn presses_of(&self, button: ButtonId) -> u64 {
        self.presses[button]
    }

    pub fn presses(&self) -> &KeyedVec<ButtonId, u64> {
        &self.presses
    }
}

/// The result of solving a single [`crate::Problem`].
///
/// Being infeasible is a regular outcome rather than an error; callers are expected to match on
/// it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptimisationResult {
    /// A solution with the minimum total number of presses.
    Optimal(Solution),
    /// No assignment of press counts reaches every target exactly.
    Infeasible,
}

impl OptimisationResult {
    /// The minimum total, or [`None`] if the problem is infeasible.
    pub fn total(&self) -> Option<u64> {
        self.solution().map(Solution::total)
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            OptimisationResult::Optimal(solution) => Some(solution),
            OptimisationResult::Infeasible => None,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, OptimisationResult::Infeasible)
    }
}

impl Display for OptimisationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimisationResult::Optimal(solution) => write!(f, "{}", solution.total()),
            OptimisationResult::Infeasible => write!(f, "infeasible"),
        }
    }
}
