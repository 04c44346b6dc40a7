mod compositions;

use std::cmp::Reverse;

pub use compositions::*;
use log::trace;

use super::SolvingStrategy;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::model::ButtonId;
use crate::model::ButtonSet;
use crate::model::OptimisationResult;
use crate::model::Problem;
use crate::model::SlotId;
use crate::model::Solution;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(
    /// Statistics of the [`PartitionSearch`].
    PartitionStatistics {
        /// The number of recursive calls, including the root call of every problem
        calls: u64,
        /// The number of compositions that were enumerated over all pivots
        partitions_tried: u64,
        /// The number of compositions that would have overshot some slot
        partitions_rejected: u64,
});

/// Recursive search which repeatedly takes the most constrained unsatisfied slot and commits all
/// of its available buttons at once, trying every split of the slot's residual over them.
///
/// Once a button is committed it is never reconsidered, so every level of the recursion
/// satisfies at least one more slot and the depth is bounded by the number of slots.
#[derive(Clone, Copy, Debug, Default)]
pub struct PartitionSearch {
    statistics: PartitionStatistics,
}

impl PartitionSearch {
    pub fn statistics(&self) -> PartitionStatistics {
        self.statistics
    }

    fn search(
        &mut self,
        problem: &Problem,
        residuals: KeyedVec<SlotId, u64>,
        available: ButtonSet,
    ) -> Option<Commitments> {
        self.statistics.calls += 1;

        let Some(pivot) = select_pivot(problem, &residuals, available) else {
            // every slot is satisfied
            return Some(Commitments::default());
        };

        let matching = problem
            .affecting_buttons(pivot)
            .iter()
            .copied()
            .filter(|&button| available.contains(button))
            .collect::<Vec<_>>();
        if matching.is_empty() {
            trace!("Slot {pivot} has residual {} but no available buttons", residuals[pivot]);
            return None;
        }

        let remaining = available.without(matching.iter().copied());
        let mut compositions = Compositions::new(residuals[pivot], matching.len());
        let mut best: Option<Commitments> = None;

        while let Some(composition) = compositions.next_composition() {
            self.statistics.partitions_tried += 1;

            let Some(reduced) = apply(problem, &residuals, &matching, composition) else {
                self.statistics.partitions_rejected += 1;
                continue;
            };

            let Some(sub_result) = self.search(problem, reduced, remaining) else {
                continue;
            };

            let candidate = sub_result.extended(&matching, composition);
            if best
                .as_ref()
                .is_none_or(|best| candidate.total < best.total)
            {
                best = Some(candidate);
            }
        }

        best
    }
}

impl SolvingStrategy for PartitionSearch {
    fn solve(&mut self, problem: &Problem) -> OptimisationResult {
        let commitments = self.search(
            problem,
            problem.targets().clone(),
            ButtonSet::full(problem.num_buttons()),
        );

        match commitments {
            Some(commitments) => {
                let presses = commitments.into_presses(problem.num_buttons());
                crate::press_assert_moderate!(problem.is_satisfied_by(&presses));
                OptimisationResult::Optimal(Solution::new(presses))
            }
            None => OptimisationResult::Infeasible,
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

/// The unsatisfied slot with the fewest available affecting buttons; ties go to the larger
/// residual and then to the lower slot index. Returns [`None`] when every residual is zero.
fn select_pivot(
    problem: &Problem,
    residuals: &KeyedVec<SlotId, u64>,
    available: ButtonSet,
) -> Option<SlotId> {
    problem
        .slots()
        .filter(|&slot| residuals[slot] > 0)
        .min_by_key(|&slot| {
            let num_available = problem
                .affecting_buttons(slot)
                .iter()
                .filter(|&&button| available.contains(button))
                .count();
            (num_available, Reverse(residuals[slot]))
        })
}

/// Subtracts the chosen counts from every slot the buttons affect, or returns [`None`] if a
/// residual would become negative.
fn apply(
    problem: &Problem,
    residuals: &KeyedVec<SlotId, u64>,
    buttons: &[ButtonId],
    counts: &[u64],
) -> Option<KeyedVec<SlotId, u64>> {
    let mut reduced = residuals.clone();

    for (&button, &count) in buttons.iter().zip(counts) {
        if count == 0 {
            continue;
        }
        for slot in problem.button(button).mask().slots() {
            reduced[slot] = reduced[slot].checked_sub(count)?;
        }
    }

    Some(reduced)
}

/// The presses committed by one branch of the recursion and everything below it.
#[derive(Clone, Debug, Default)]
struct Commitments {
    total: u64,
    presses: Vec<(ButtonId, u64)>,
}

impl Commitments {
    fn extended(mut self, buttons: &[ButtonId], counts: &[u64]) -> Self {
        for (&button, &count) in buttons.iter().zip(counts) {
            if count > 0 {
                self.total += count;
                self.presses.push((button, count));
            }
        }
        self
    }

    fn into_presses(self, num_buttons: usize) -> KeyedVec<ButtonId, u64> {
        let mut presses = KeyedVec::filled(num_buttons, 0);
        for (button, count) in self.presses {
            presses[button] = count;
        }
        presses
    }
}
