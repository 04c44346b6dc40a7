use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;

use super::simplex::LinearConstraint;
use super::simplex::LinearProgram;
use super::simplex::Relation;
use super::simplex::SimplexOutcome;
use super::simplex::EPSILON;
use super::simplex::MAX_SIMPLEX_ITERATIONS;
use super::MilpStatistics;

/// A relaxation value is integral when it is this close to the nearest integer.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;
/// The number of nodes after which the search stops.
pub const MAX_NODES: usize = 50_000;
/// Nodes deeper than this are discarded without being solved.
pub const MAX_DEPTH: usize = 50;

/// The budgets of one branch-and-bound search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MilpLimits {
    /// The number of nodes after which the search stops.
    pub max_nodes: usize,
    /// Nodes deeper than this are discarded without being solved.
    pub max_depth: usize,
    /// The number of pivots after which the relaxation of a node is given up.
    pub max_simplex_iterations: usize,
}

impl Default for MilpLimits {
    fn default() -> Self {
        MilpLimits {
            max_nodes: MAX_NODES,
            max_depth: MAX_DEPTH,
            max_simplex_iterations: MAX_SIMPLEX_ITERATIONS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchAndBoundOutcome {
    /// The best all-integer solution found, rounded.
    pub incumbent: Option<Vec<u64>>,
    /// Whether the whole tree was explored; if `false` the incumbent may not be optimal, or an
    /// integer solution may have been missed altogether.
    pub proven: bool,
}

/// A subproblem: the base program plus the branching bounds on the path to this node.
#[derive(Debug)]
struct Node {
    /// The relaxation value of the parent, a lower bound for this node.
    lower_bound: f64,
    /// Creation order, to break ties between equal bounds deterministically.
    sequence: u64,
    depth: usize,
    bounds: Vec<LinearConstraint>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so that the max-heap pops the smallest bound, and the oldest node among equals
        other
            .lower_bound
            .total_cmp(&self.lower_bound)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Best-first branch-and-bound on the relaxation of `base`.
///
/// Nodes whose relaxation could not be solved to optimality (iteration limit, unbounded) are
/// dropped like infeasible nodes but leave the search unproven.
pub(crate) fn branch_and_bound(
    base: &LinearProgram,
    limits: MilpLimits,
    statistics: &mut MilpStatistics,
) -> BranchAndBoundOutcome {
    let num_variables = base.num_variables();

    let mut queue = BinaryHeap::new();
    queue.push(Node {
        lower_bound: f64::NEG_INFINITY,
        sequence: 0,
        depth: 0,
        bounds: vec![],
    });
    let mut next_sequence = 1_u64;

    let mut incumbent: Option<(f64, Vec<u64>)> = None;
    let mut proven = true;
    let mut num_explored = 0;

    while num_explored < limits.max_nodes {
        let Some(node) = queue.pop() else {
            break;
        };
        num_explored += 1;
        statistics.nodes_explored += 1;

        if node.depth > limits.max_depth {
            proven = false;
            continue;
        }

        let best_value = incumbent
            .as_ref()
            .map_or(f64::INFINITY, |(value, _)| *value);
        if node.lower_bound >= best_value - EPSILON {
            continue;
        }

        statistics.lp_solves += 1;
        let relaxation = base
            .with_constraints(&node.bounds)
            .solve_within(limits.max_simplex_iterations);
        let (value, solution) = match relaxation {
            SimplexOutcome::Optimal { value, solution } => (value, solution),
            SimplexOutcome::Infeasible => continue,
            outcome @ (SimplexOutcome::Unbounded | SimplexOutcome::IterationLimit) => {
                trace!("Relaxation at depth {} ended with {outcome:?}", node.depth);
                proven = false;
                continue;
            }
        };

        if value >= best_value - EPSILON {
            continue;
        }

        let Some(variable) = most_fractional(&solution) else {
            let rounded = solution.iter().map(|x| x.round() as u64).collect();
            trace!("New incumbent with value {value}");
            incumbent = Some((value, rounded));
            continue;
        };

        let x = solution[variable];
        for (relation, rhs) in [
            (Relation::LessOrEqual, x.floor()),
            (Relation::GreaterOrEqual, x.ceil()),
        ] {
            let mut bounds = node.bounds.clone();
            bounds.push(LinearConstraint::bound(variable, num_variables, relation, rhs));

            queue.push(Node {
                lower_bound: value,
                sequence: next_sequence,
                depth: node.depth + 1,
                bounds,
            });
            next_sequence += 1;
        }
    }

    if !queue.is_empty() {
        proven = false;
    }

    BranchAndBoundOutcome {
        incumbent: incumbent.map(|(_, rounded)| rounded),
        proven,
    }
}

/// The variable whose fractional part is closest to `0.5`, the first one among equals; [`None`]
/// if every variable is integral.
fn most_fractional(solution: &[f64]) -> Option<usize> {
    let mut most_fractional: Option<(usize, f64)> = None;

    for (variable, &x) in solution.iter().enumerate() {
        let distance = (x - x.round()).abs();
        if distance <= INTEGRALITY_TOLERANCE {
            continue;
        }
        if most_fractional.is_none_or(|(_, best)| distance > best) {
            most_fractional = Some((variable, distance));
        }
    }

    most_fractional.map(|(variable, _)| variable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Problem;

    fn run(buttons: Vec<Vec<usize>>, targets: Vec<u64>) -> BranchAndBoundOutcome {
        run_within(buttons, targets, MilpLimits::default()).0
    }

    fn run_within(
        buttons: Vec<Vec<usize>>,
        targets: Vec<u64>,
        limits: MilpLimits,
    ) -> (BranchAndBoundOutcome, MilpStatistics) {
        let problem = Problem::new(buttons, targets).unwrap();
        let mut statistics = MilpStatistics::default();
        let outcome = branch_and_bound(
            &LinearProgram::from_problem(&problem),
            limits,
            &mut statistics,
        );
        (outcome, statistics)
    }

    /// The optimum is 2, while the relaxation takes every pair at one half for 1.5.
    fn fractional_cover() -> (Vec<Vec<usize>>, Vec<u64>) {
        (
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
    }

    #[test]
    fn integral_relaxation_is_accepted_at_the_root() {
        let mut statistics = MilpStatistics::default();
        let problem = Problem::new(vec![vec![0, 1], vec![1]], vec![3, 5]).unwrap();

        let outcome = branch_and_bound(
            &LinearProgram::from_problem(&problem),
            MilpLimits::default(),
            &mut statistics,
        );

        assert_eq!(
            outcome,
            BranchAndBoundOutcome {
                incumbent: Some(vec![3, 2]),
                proven: true
            }
        );
        assert_eq!(statistics.lp_solves, 1);
    }

    #[test]
    fn branching_restores_integrality() {
        let (buttons, targets) = fractional_cover();
        let outcome = run(buttons, targets);

        assert!(outcome.proven);
        assert_eq!(outcome.incumbent.map(|x| x.iter().sum::<u64>()), Some(2));
    }

    #[test]
    fn depth_cap_leaves_the_search_unproven() {
        let (buttons, targets) = fractional_cover();
        let limits = MilpLimits {
            max_depth: 0,
            ..MilpLimits::default()
        };

        let (outcome, statistics) = run_within(buttons, targets, limits);

        assert_eq!(
            outcome,
            BranchAndBoundOutcome {
                incumbent: None,
                proven: false
            }
        );
        // both children are popped but only the root relaxation is solved
        assert_eq!(statistics.nodes_explored, 3);
        assert_eq!(statistics.lp_solves, 1);
    }

    #[test]
    fn node_cap_leaves_the_search_unproven() {
        let (buttons, targets) = fractional_cover();
        let limits = MilpLimits {
            max_nodes: 1,
            ..MilpLimits::default()
        };

        let (outcome, statistics) = run_within(buttons, targets, limits);

        assert_eq!(
            outcome,
            BranchAndBoundOutcome {
                incumbent: None,
                proven: false
            }
        );
        assert_eq!(statistics.nodes_explored, 1);
    }

    #[test]
    fn unfinished_relaxation_leaves_the_search_unproven() {
        let limits = MilpLimits {
            max_simplex_iterations: 0,
            ..MilpLimits::default()
        };

        let (outcome, statistics) = run_within(vec![vec![0, 1], vec![1]], vec![3, 5], limits);

        assert_eq!(
            outcome,
            BranchAndBoundOutcome {
                incumbent: None,
                proven: false
            }
        );
        assert_eq!(statistics.lp_solves, 1);
    }

    #[test]
    fn odd_cycle_has_no_integer_solution() {
        let outcome = run(vec![vec![0, 1], vec![1, 2], vec![0, 2]], vec![1, 1, 1]);

        assert_eq!(
            outcome,
            BranchAndBoundOutcome {
                incumbent: None,
                proven: true
            }
        );
    }

    #[test]
    fn most_fractional_prefers_values_close_to_a_half() {
        assert_eq!(most_fractional(&[1.0, 0.2, 2.5, 0.5]), Some(2));
        assert_eq!(most_fractional(&[1.0, 3.000_000_1]), None);
    }

    #[test]
    fn nodes_pop_in_order_of_their_bound() {
        let mut queue = BinaryHeap::new();
        for (sequence, lower_bound) in [(0, 3.0), (1, 1.0), (2, 1.0), (3, 2.0)] {
            queue.push(Node {
                lower_bound,
                sequence,
                depth: 0,
                bounds: vec![],
            });
        }

        let order = std::iter::from_fn(|| queue.pop().map(|node| node.sequence)).collect::<Vec<_>>();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }
}
