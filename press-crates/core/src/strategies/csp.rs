use std::cmp::Reverse;

use log::debug;

use super::SolvingStrategy;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::model::ButtonId;
use crate::model::OptimisationResult;
use crate::model::Problem;
use crate::model::SlotId;
use crate::model::Solution;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(
    /// Statistics of the [`ConstraintSearch`], accumulated over every problem it solved.
    ConstraintSearchStatistics {
        /// The number of slots that were entered during the search
        nodes_visited: u64,
        /// The number of partial assignments discarded because they could not beat the incumbent
        bound_prunings: u64,
        /// The number of times a strictly better complete assignment was recorded
        solutions_improved: u64,
});

/// Exact depth-first search over the slots with branch-and-bound pruning.
///
/// Slots are visited in order of increasing number of affecting buttons (ties broken by the
/// larger target), so that the tightest slots fix the most buttons early. At every slot the
/// residual target is split over the buttons which are still unassigned, where each button is
/// bounded by the residuals of the slots that have not been visited yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstraintSearch {
    statistics: ConstraintSearchStatistics,
}

impl ConstraintSearch {
    pub fn statistics(&self) -> ConstraintSearchStatistics {
        self.statistics
    }
}

impl SolvingStrategy for ConstraintSearch {
    fn solve(&mut self, problem: &Problem) -> OptimisationResult {
        if let Some(slot) = problem.find_unreachable_slot() {
            debug!("Slot {slot} has a positive target but no affecting buttons");
            return OptimisationResult::Infeasible;
        }

        let mut search = Search::new(problem, &mut self.statistics);
        search.visit(0, PartialAssignment::unassigned(problem.num_buttons()));

        match search.best {
            Some(solution) => OptimisationResult::Optimal(solution),
            None => OptimisationResult::Infeasible,
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

/// The press counts fixed so far; every branch of the search owns its own copy.
#[derive(Clone, Debug)]
struct PartialAssignment {
    presses: KeyedVec<ButtonId, Option<u64>>,
    total: u64,
}

impl PartialAssignment {
    fn unassigned(num_buttons: usize) -> Self {
        PartialAssignment {
            presses: KeyedVec::filled(num_buttons, None),
            total: 0,
        }
    }

    fn get(&self, button: ButtonId) -> Option<u64> {
        self.presses[button]
    }

    fn with(&self, button: ButtonId, count: u64) -> Self {
        let mut next = self.clone();
        next.presses[button] = Some(count);
        next.total += count;
        next
    }

    /// The sum of the assigned counts of `buttons`; unassigned buttons count as zero.
    fn assigned_sum(&self, buttons: &[ButtonId]) -> u64 {
        buttons
            .iter()
            .filter_map(|&button| self.presses[button])
            .sum()
    }

    /// Buttons which were never assigned affect no slot and are not pressed.
    fn into_presses(self) -> KeyedVec<ButtonId, u64> {
        self.presses
            .iter()
            .map(|count| count.unwrap_or(0))
            .collect()
    }
}

/// How the residual target of one slot is split over its unassigned buttons.
#[derive(Debug)]
struct Split<'a> {
    buttons: &'a [ButtonId],
    /// For each button, the most it may be pressed given the residual and the unvisited slots.
    bounds: &'a [u64],
    /// `capacity[i]` is the sum of `bounds[i..]`.
    capacity: &'a [u64],
}

#[derive(Debug)]
struct Search<'a> {
    problem: &'a Problem,
    slot_order: Vec<SlotId>,
    best: Option<Solution>,
    statistics: &'a mut ConstraintSearchStatistics,
}

impl<'a> Search<'a> {
    fn new(problem: &'a Problem, statistics: &'a mut ConstraintSearchStatistics) -> Self {
        let mut slot_order = problem.slots().collect::<Vec<_>>();
        slot_order.sort_by_key(|&slot| {
            (
                problem.affecting_buttons(slot).len(),
                Reverse(problem.target(slot)),
            )
        });

        Search {
            problem,
            slot_order,
            best: None,
            statistics,
        }
    }

    fn is_dominated(&mut self, total: u64) -> bool {
        let dominated = self
            .best
            .as_ref()
            .is_some_and(|best| total >= best.total());
        if dominated {
            self.statistics.bound_prunings += 1;
        }
        dominated
    }

    fn visit(&mut self, position: usize, assignment: PartialAssignment) {
        self.statistics.nodes_visited += 1;
        if self.is_dominated(assignment.total) {
            return;
        }

        let problem = self.problem;
        let Some(&slot) = self.slot_order.get(position) else {
            self.record(assignment);
            return;
        };

        let affecting = problem.affecting_buttons(slot);
        let Some(residual) = problem
            .target(slot)
            .checked_sub(assignment.assigned_sum(affecting))
        else {
            return;
        };

        let unassigned = affecting
            .iter()
            .copied()
            .filter(|&button| assignment.get(button).is_none())
            .collect::<Vec<_>>();
        if unassigned.is_empty() {
            if residual == 0 {
                self.visit(position + 1, assignment);
            }
            return;
        }

        let mut bounds = Vec::with_capacity(unassigned.len());
        for &button in &unassigned {
            let Some(bound) = self.tightened_bound(button, position + 1, &assignment) else {
                return;
            };
            bounds.push(bound.min(residual));
        }

        // every bound may be as large as the residual, so the sum can exceed u64
        let mut capacity = vec![0_u64; bounds.len() + 1];
        for index in (0..bounds.len()).rev() {
            capacity[index] = capacity[index + 1].saturating_add(bounds[index]);
        }
        if capacity[0] < residual {
            return;
        }

        let split = Split {
            buttons: &unassigned,
            bounds: &bounds,
            capacity: &capacity,
        };
        self.distribute(position, &split, 0, residual, assignment);
    }

    /// Assigns `split.buttons[index..]` such that they sum to `remaining`, then moves on to the
    /// next slot. The last button is forced to whatever is left.
    fn distribute(
        &mut self,
        position: usize,
        split: &Split<'_>,
        index: usize,
        remaining: u64,
        assignment: PartialAssignment,
    ) {
        if self.is_dominated(assignment.total) {
            return;
        }

        let button = split.buttons[index];
        if index + 1 == split.buttons.len() {
            if remaining <= split.bounds[index] {
                self.visit(position + 1, assignment.with(button, remaining));
            }
            return;
        }

        // leave at least what the later buttons cannot absorb
        let lowest = remaining.saturating_sub(split.capacity[index + 1]);
        let highest = split.bounds[index].min(remaining);
        for count in lowest..=highest {
            self.distribute(
                position,
                split,
                index + 1,
                remaining - count,
                assignment.with(button, count),
            );
        }
    }

    /// The trivial bound of `button` tightened by the residuals of the slots at
    /// `slot_order[from_position..]` which it affects. Returns [`None`] if one of those slots is
    /// already overshot.
    fn tightened_bound(
        &self,
        button: ButtonId,
        from_position: usize,
        assignment: &PartialAssignment,
    ) -> Option<u64> {
        let mask = self.problem.button(button).mask();

        self.slot_order[from_position..]
            .iter()
            .filter(|&&slot| mask.contains(slot))
            .try_fold(self.problem.trivial_upper_bound(button), |bound, &slot| {
                let residual = self
                    .problem
                    .target(slot)
                    .checked_sub(assignment.assigned_sum(self.problem.affecting_buttons(slot)))?;
                Some(bound.min(residual))
            })
    }

    fn record(&mut self, assignment: PartialAssignment) {
        let presses = assignment.into_presses();
        if !self.problem.is_satisfied_by(&presses) {
            return;
        }

        let solution = Solution::new(presses);
        crate::press_assert_simple!(self
            .best
            .as_ref()
            .is_none_or(|best| solution.total() < best.total()));

        self.statistics.solutions_improved += 1;
        self.best = Some(solution);
    }
}
