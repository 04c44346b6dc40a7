//! Solves a batch of independent problems on a pool of worker threads.
//!
//! Workers claim problem indices from a shared atomic counter and solve each claimed problem end
//! to end with their own strategy instance. Every index is claimed by exactly one worker, which
//! is also the only one to write its entry of the result table.
mod progress;

use std::num::NonZeroUsize;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::info;
pub use progress::Progress;

use crate::create_statistics_struct;
use crate::model::OptimisationResult;
use crate::model::Problem;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::strategies::SolvingStrategy;
use crate::strategies::StrategyKind;

/// The default of [`BatchOptions::slow_problem_threshold`], in milliseconds.
pub const DEFAULT_SLOW_PROBLEM_THRESHOLD_MS: u64 = 1_000;

create_statistics_struct!(BatchStatistics {
    problems: usize,
    infeasible: usize,
    solve_time: u128,
    slowest_problem_time: u128,
});

#[derive(Clone, Copy, Debug)]
pub struct BatchOptions {
    /// The strategy every worker uses.
    pub strategy: StrategyKind,
    /// The size of the pool; [`None`] uses the available hardware parallelism.
    pub num_workers: Option<NonZeroUsize>,
    /// Problems taking at least this long are reported at `info` level.
    pub slow_problem_threshold: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            strategy: StrategyKind::default(),
            num_workers: None,
            slow_problem_threshold: Duration::from_millis(DEFAULT_SLOW_PROBLEM_THRESHOLD_MS),
        }
    }
}

impl BatchOptions {
    /// The pool never has more workers than there are problems.
    fn worker_count(&self, num_problems: usize) -> usize {
        self.num_workers
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
            .min(num_problems)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProblemOutcome {
    pub result: OptimisationResult,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct BatchOutcome {
    outcomes: Vec<ProblemOutcome>,
    elapsed: Duration,
    /// The strategy instance of every worker, kept for their statistics.
    strategies: Vec<Box<dyn SolvingStrategy>>,
}

impl BatchOutcome {
    /// The outcome of every problem, in input order.
    pub fn outcomes(&self) -> &[ProblemOutcome] {
        &self.outcomes
    }

    /// The sum of the minimum totals of the feasible problems.
    ///
    /// Each total fits a `u64`, their sum over a batch does not have to.
    pub fn total_presses(&self) -> u128 {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.total())
            .map(u128::from)
            .sum()
    }

    /// The (0-based) indices of the infeasible problems.
    pub fn infeasible_problems(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.result.is_infeasible())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn log_statistics(&self) {
        if !should_log_statistics() {
            return;
        }

        let statistics = BatchStatistics {
            problems: self.outcomes.len(),
            infeasible: self.infeasible_problems().len(),
            solve_time: self.elapsed.as_millis(),
            slowest_problem_time: self
                .outcomes
                .iter()
                .map(|outcome| outcome.elapsed.as_millis())
                .max()
                .unwrap_or(0),
        };
        statistics.log(StatisticLogger::default());

        for (worker, strategy) in self.strategies.iter().enumerate() {
            strategy.log_statistics(StatisticLogger::new([format!("worker_{worker}")]));
        }

        log_statistic_postfix();
    }
}

/// The state shared by all workers of one batch.
#[derive(Clone, Copy, Debug)]
struct WorkerContext<'a> {
    problems: &'a [Problem],
    options: &'a BatchOptions,
    next_problem: &'a AtomicUsize,
    results: &'a [OnceLock<ProblemOutcome>],
    progress: &'a Progress,
}

/// Solves every problem with the strategy selected in `options`.
///
/// Blocks until every problem has been solved. A panic inside a worker is propagated to the
/// caller once all workers have stopped.
pub fn solve_batch(problems: &[Problem], options: &BatchOptions) -> BatchOutcome {
    let started = Instant::now();
    let num_workers = options.worker_count(problems.len());
    info!(
        "Solving {} problems with the {} strategy on {num_workers} workers",
        problems.len(),
        options.strategy
    );

    let next_problem = AtomicUsize::new(0);
    let results = (0..problems.len())
        .map(|_| OnceLock::<ProblemOutcome>::new())
        .collect::<Vec<_>>();
    let progress = Progress::new(num_workers, problems.len());
    let context = WorkerContext {
        problems,
        options,
        next_problem: &next_problem,
        results: &results,
        progress: &progress,
    };

    let strategies = thread::scope(|scope| {
        let handles = (0..num_workers)
            .map(|worker| scope.spawn(move || run_worker(worker, context)))
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect::<Vec<_>>()
    });

    let outcomes = results
        .into_iter()
        .map(|result| {
            result
                .into_inner()
                .expect("every problem is claimed by exactly one worker")
        })
        .collect();

    BatchOutcome {
        outcomes,
        elapsed: started.elapsed(),
        strategies,
    }
}

fn run_worker(worker: usize, context: WorkerContext<'_>) -> Box<dyn SolvingStrategy> {
    let mut strategy = context.options.strategy.create();

    loop {
        let index = context.next_problem.fetch_add(1, Ordering::Relaxed);
        let Some(problem) = context.problems.get(index) else {
            break;
        };

        context.progress.start(worker, index);
        let started = Instant::now();
        let result = strategy.solve(problem);
        let elapsed = started.elapsed();
        context.progress.finish(worker);

        debug!("Problem {} solved in {elapsed:?}: {result}", index + 1);
        if elapsed >= context.options.slow_problem_threshold {
            info!(
                "Problem {} took {elapsed:?} ({}/{} done, still solving {:?})",
                index + 1,
                context.progress.completed(),
                context.progress.num_problems(),
                context
                    .progress
                    .in_progress()
                    .iter()
                    .map(|index| index + 1)
                    .collect::<Vec<_>>()
            );
        }

        let stored = context.results[index].set(ProblemOutcome { result, elapsed });
        crate::press_assert_simple!(stored.is_ok(), "problem {index} was solved twice");
    }

    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems() -> Vec<Problem> {
        vec![
            Problem::new(vec![vec![0]], vec![5]).unwrap(),
            Problem::new(vec![vec![0, 1], vec![1]], vec![3, 5]).unwrap(),
            Problem::new(vec![], vec![4]).unwrap(),
            Problem::new(vec![vec![0], vec![1], vec![2]], vec![2, 0, 7]).unwrap(),
        ]
    }

    fn options(strategy: StrategyKind, num_workers: usize) -> BatchOptions {
        BatchOptions {
            strategy,
            num_workers: NonZeroUsize::new(num_workers),
            slow_problem_threshold: Duration::from_secs(60),
        }
    }

    #[test]
    fn results_are_reported_in_input_order() {
        let outcome = solve_batch(&problems(), &options(StrategyKind::Partition, 2));

        let totals = outcome
            .outcomes()
            .iter()
            .map(|outcome| outcome.result.total())
            .collect::<Vec<_>>();
        assert_eq!(totals, vec![Some(5), Some(5), None, Some(9)]);
        assert_eq!(outcome.total_presses(), 19);
        assert_eq!(outcome.infeasible_problems(), vec![2]);
    }

    #[test]
    fn every_strategy_gives_the_same_batch_total() {
        for strategy in [StrategyKind::Csp, StrategyKind::Partition, StrategyKind::Milp] {
            let outcome = solve_batch(&problems(), &options(strategy, 3));

            assert_eq!(outcome.total_presses(), 19, "strategy {strategy}");
        }
    }

    #[test]
    fn pool_is_limited_by_the_number_of_problems() {
        let outcome = solve_batch(&problems()[..1], &options(StrategyKind::Csp, 8));

        assert_eq!(outcome.strategies.len(), 1);
        assert_eq!(outcome.total_presses(), 5);
    }

    #[test]
    fn batch_total_exceeds_a_single_u64() {
        let large = Problem::new(vec![vec![0]], vec![u64::MAX]).unwrap();
        let outcome = solve_batch(&[large.clone(), large], &options(StrategyKind::Csp, 2));

        assert_eq!(outcome.total_presses(), 2 * u128::from(u64::MAX));
    }

    #[test]
    fn empty_batch_spawns_no_workers() {
        let outcome = solve_batch(&[], &BatchOptions::default());

        assert!(outcome.outcomes().is_empty());
        assert!(outcome.strategies.is_empty());
        assert_eq!(outcome.total_presses(), 0);
    }
}
