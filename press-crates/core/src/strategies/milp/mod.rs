//! The linear-programming based strategy.
//!
//! The relaxation of a problem is solved with [`simplex`] and integrality is restored by a
//! best-first branch-and-bound. Only an incumbent that is proven optimal and reproduces every
//! slot target exactly is returned; in every other case the problem is handed to the
//! [`ConstraintSearch`].
mod branch_and_bound;
pub mod simplex;

use std::fmt::Display;
use std::fmt::Formatter;

pub use branch_and_bound::BranchAndBoundOutcome;
pub use branch_and_bound::INTEGRALITY_TOLERANCE;
pub use branch_and_bound::MilpLimits;
pub use branch_and_bound::MAX_DEPTH;
pub use branch_and_bound::MAX_NODES;
use log::debug;

use self::branch_and_bound::branch_and_bound;
use self::simplex::LinearProgram;
use super::ConstraintSearch;
use super::SolvingStrategy;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::model::ButtonId;
use crate::model::OptimisationResult;
use crate::model::Problem;
use crate::model::Solution;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(
    /// Statistics of the [`MilpSearch`]; the statistics of its fallback search are logged
    /// separately.
    MilpStatistics {
        /// The number of relaxations handed to the simplex
        lp_solves: u64,
        /// The number of branch-and-bound nodes taken from the queue
        nodes_explored: u64,
        /// The number of problems that were redirected to the constraint search
        fallbacks: u64,
});

/// Why the branch-and-bound answer was not used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FallbackReason {
    /// No all-integer solution was found, either because the relaxation is infeasible or because
    /// the search ran out of budget first.
    NoIncumbent,
    /// An incumbent exists but the node or depth cap cut off part of the tree.
    SearchExhausted,
    /// The rounded incumbent does not reproduce every target.
    ValidationMismatch,
}

impl Display for FallbackReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NoIncumbent => write!(f, "no integer solution was found"),
            FallbackReason::SearchExhausted => write!(f, "the search budget was exhausted"),
            FallbackReason::ValidationMismatch => {
                write!(f, "the rounded solution violates a slot target")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MilpSearch {
    limits: MilpLimits,
    statistics: MilpStatistics,
    fallback: ConstraintSearch,
}

impl MilpSearch {
    /// A search with other budgets than [`MilpLimits::default`].
    pub fn with_limits(limits: MilpLimits) -> MilpSearch {
        MilpSearch {
            limits,
            ..MilpSearch::default()
        }
    }

    pub fn statistics(&self) -> MilpStatistics {
        self.statistics
    }
}

impl SolvingStrategy for MilpSearch {
    fn solve(&mut self, problem: &Problem) -> OptimisationResult {
        if let Some(slot) = problem.find_unreachable_slot() {
            debug!("Slot {slot} has a positive target but no affecting buttons");
            return OptimisationResult::Infeasible;
        }

        let program = LinearProgram::from_problem(problem);
        let outcome = branch_and_bound(&program, self.limits, &mut self.statistics);

        match accept(problem, outcome) {
            Ok(solution) => OptimisationResult::Optimal(solution),
            Err(reason) => {
                debug!("Falling back to the constraint search: {reason}");
                self.statistics.fallbacks += 1;
                self.fallback.solve(problem)
            }
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger.clone());
        self.fallback
            .log_statistics(statistic_logger.attach_to_prefix("fallback"));
    }
}

fn accept(problem: &Problem, outcome: BranchAndBoundOutcome) -> Result<Solution, FallbackReason> {
    let incumbent = outcome.incumbent.ok_or(FallbackReason::NoIncumbent)?;
    if !outcome.proven {
        return Err(FallbackReason::SearchExhausted);
    }

    let presses: KeyedVec<ButtonId, u64> = incumbent.into();
    if !problem.is_satisfied_by(&presses) {
        return Err(FallbackReason::ValidationMismatch);
    }

    Ok(Solution::new(presses))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pair at one half gives a relaxation of 1.5, while the integer optimum is 2.
    fn fractional_cover() -> Problem {
        Problem::new(
            vec![
                vec![0, 1],
                vec![1, 2],
                vec![0, 2],
                vec![0],
                vec![1],
                vec![2],
            ],
            vec![1, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn integral_relaxation_needs_no_fallback() {
        let mut search = MilpSearch::default();
        let problem = Problem::new(vec![vec![0, 1], vec![1]], vec![3, 5]).unwrap();

        assert_eq!(search.solve(&problem).total(), Some(5));
        assert_eq!(search.statistics().fallbacks, 0);
    }

    #[test]
    fn infeasible_relaxation_falls_back() {
        let mut search = MilpSearch::default();
        let problem = Problem::new(vec![vec![0, 1]], vec![1, 2]).unwrap();

        assert!(search.solve(&problem).is_infeasible());
        assert_eq!(search.statistics().fallbacks, 1);
        assert!(search.fallback.statistics().nodes_visited > 0);
    }

    #[test]
    fn unreachable_slot_is_infeasible_without_fallback() {
        let mut search = MilpSearch::default();
        let problem = Problem::new(vec![vec![0]], vec![1, 4]).unwrap();

        assert!(search.solve(&problem).is_infeasible());
        assert_eq!(search.statistics().fallbacks, 0);
        assert_eq!(search.statistics().lp_solves, 0);
    }

    #[test]
    fn fractional_relaxation_is_branched_to_the_optimum() {
        let mut search = MilpSearch::default();
        let problem = fractional_cover();

        let result = search.solve(&problem);

        assert_eq!(result.total(), Some(2));
        assert!(problem.is_satisfied_by(result.solution().unwrap().presses()));
        assert_eq!(search.statistics().fallbacks, 0);
        assert!(search.statistics().nodes_explored > 1);
    }

    #[test]
    fn exhausted_depth_budget_falls_back_to_the_optimum() {
        let mut search = MilpSearch::with_limits(MilpLimits {
            max_depth: 0,
            ..MilpLimits::default()
        });
        let problem = fractional_cover();

        assert_eq!(search.solve(&problem).total(), Some(2));
        assert_eq!(search.statistics().fallbacks, 1);
    }

    #[test]
    fn exhausted_node_budget_falls_back_to_the_optimum() {
        let mut search = MilpSearch::with_limits(MilpLimits {
            max_nodes: 1,
            ..MilpLimits::default()
        });
        let problem = fractional_cover();

        assert_eq!(search.solve(&problem).total(), Some(2));
        assert_eq!(search.statistics().fallbacks, 1);
        assert_eq!(search.statistics().nodes_explored, 1);
    }

    #[test]
    fn unfinished_relaxation_falls_back_to_the_optimum() {
        let mut search = MilpSearch::with_limits(MilpLimits {
            max_simplex_iterations: 0,
            ..MilpLimits::default()
        });
        let problem = Problem::new(vec![vec![0, 1], vec![1]], vec![3, 5]).unwrap();

        assert_eq!(search.solve(&problem).total(), Some(5));
        assert_eq!(search.statistics().fallbacks, 1);
    }

    #[test]
    fn unproven_incumbent_is_not_trusted() {
        let problem = Problem::new(vec![vec![0]], vec![2]).unwrap();
        let outcome = BranchAndBoundOutcome {
            incumbent: Some(vec![2]),
            proven: false,
        };

        assert_eq!(
            accept(&problem, outcome),
            Err(FallbackReason::SearchExhausted)
        );
    }

    #[test]
    fn mismatching_incumbent_is_rejected() {
        let problem = Problem::new(vec![vec![0]], vec![2]).unwrap();
        let outcome = BranchAndBoundOutcome {
            incumbent: Some(vec![1]),
            proven: true,
        };

        assert_eq!(
            accept(&problem, outcome),
            Err(FallbackReason::ValidationMismatch)
        );
    }
}
