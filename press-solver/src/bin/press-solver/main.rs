mod parser;
mod result;

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use parser::parse_machines;
use parser::Machine;
use press_solver::batch::solve_batch;
use press_solver::batch::BatchOptions;
use press_solver::batch::DEFAULT_SLOW_PROBLEM_THRESHOLD_MS;
use press_solver::convert_case::Case;
use press_solver::indicator::min_presses_for_lights;
use press_solver::statistics::configure_statistic_logging;
use press_solver::strategies::StrategyKind;
use press_solver::Button;
use press_solver::Problem;
use result::PressError;
use result::PressResult;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The instance to solve, with one machine per line, e.g.
    ///   [.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
    /// where the square brackets hold the indicator lights, every parenthesised list is a button
    /// and the curly braces hold the joltage targets.
    #[clap(verbatim_doc_comment)]
    instance_path: PathBuf,

    /// The strategy used to find the minimum presses for the joltage targets.
    ///
    /// All strategies give the same totals; they only differ in running time.
    #[arg(long, value_enum, default_value_t)]
    strategy: StrategyKind,

    /// The number of worker threads solving machines in parallel.
    ///
    /// Defaults to the available hardware parallelism.
    ///
    /// Possible values: usize (Optional), at least 1
    #[arg(short = 'j', long = "workers", verbatim_doc_comment)]
    workers: Option<NonZeroUsize>,

    /// Machines taking longer than this, given in milliseconds, are reported while solving.
    ///
    /// Only visible with `--verbose`.
    ///
    /// Possible values: u64
    #[arg(
        long = "slow-problem-threshold-ms",
        default_value_t = DEFAULT_SLOW_PROBLEM_THRESHOLD_MS,
        verbatim_doc_comment
    )]
    slow_problem_threshold_ms: u64,

    /// Enables log message output from the solver.
    ///
    /// Possible values: bool
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,

    /// Enables logging of statistics from the solver.
    ///
    /// Possible values: bool
    #[arg(short = 's', long = "log-statistics", verbatim_doc_comment)]
    log_statistics: bool,

    /// Skips the indicator lights and only solves the joltage targets.
    ///
    /// Possible values: bool
    #[arg(long = "skip-indicators", verbatim_doc_comment)]
    skip_indicators: bool,
}

fn configure_logging(verbose: bool, log_statistics: bool) {
    if log_statistics {
        configure_statistic_logging(
            "%%%press-stat:",
            Some("%%%press-stat-end"),
            Some(Case::Camel),
            None,
        );
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "% ")?;

            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> PressResult<()> {
    let args = Args::parse();

    configure_logging(args.verbose, args.log_statistics);

    if press_solver::asserts::PRESS_ASSERT_LEVEL_DEFINITION
        >= press_solver::asserts::PRESS_ASSERT_MODERATE
    {
        warn!(
            "Potential performance degradation: the assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.",
            press_solver::asserts::PRESS_ASSERT_LEVEL_DEFINITION
        );
    }

    let source = std::fs::read_to_string(&args.instance_path)?;
    let machines = parse_machines(&source)?;
    let problems = machines
        .iter()
        .map(|machine| {
            machine
                .to_problem()
                .map_err(|source| PressError::MalformedMachine {
                    line: machine.line,
                    source,
                })
        })
        .collect::<PressResult<Vec<_>>>()?;
    info!("Read {} machines from {}", machines.len(), args.instance_path.display());

    if !args.skip_indicators {
        let total = solve_indicators(&machines, &problems)?;
        println!("Total minimum indicator button presses: {total}");
    }

    let options = BatchOptions {
        strategy: args.strategy,
        num_workers: args.workers,
        slow_problem_threshold: Duration::from_millis(args.slow_problem_threshold_ms),
    };
    let outcome = solve_batch(&problems, &options);
    info!("Solved the joltage targets in {:?}", outcome.elapsed());

    println!(
        "Total minimum joltage button presses: {}",
        outcome.total_presses()
    );

    let infeasible = outcome.infeasible_problems();
    if !infeasible.is_empty() {
        let lines = infeasible
            .iter()
            .map(|&index| machines[index].line.to_string())
            .collect::<Vec<_>>();
        println!("Infeasible problems: {}", lines.join(","));
    }

    outcome.log_statistics();

    Ok(())
}

/// The sum of the fewest presses for the indicator lights of every machine; machines whose
/// pattern cannot be reached are skipped with a warning.
fn solve_indicators(machines: &[Machine], problems: &[Problem]) -> PressResult<u64> {
    let mut total = 0;

    for (machine, problem) in machines.iter().zip(problems) {
        let buttons = problem.buttons().map(Button::mask).collect::<Vec<_>>();

        match min_presses_for_lights(&buttons, machine.light_mask())? {
            Some(presses) => total += u64::from(presses),
            None => warn!(
                "The indicator lights on line {} cannot be reached",
                machine.line
            ),
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_defaults_match_the_batch_defaults() {
        let args = Args::parse_from(["press-solver", "machines.txt"]);
        let defaults = BatchOptions::default();

        assert_eq!(
            Duration::from_millis(args.slow_problem_threshold_ms),
            defaults.slow_problem_threshold
        );
        assert_eq!(args.workers, defaults.num_workers);
        assert_eq!(args.strategy, defaults.strategy);
    }
}
