use press_solver::indicator::IndicatorError;
use press_solver::ProblemError;
use thiserror::Error;

use crate::parser::ParseError;

pub(crate) type PressResult<T> = Result<T, PressError>;

#[derive(Error, Debug)]
pub(crate) enum PressError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The instance could not be parsed, more details: {0}")]
    InvalidInstance(#[from] ParseError),
    #[error("The machine on line {line} is malformed, more details: {source}")]
    MalformedMachine { line: usize, source: ProblemError },
    #[error("The indicator lights could not be solved, more details: {0}")]
    Indicator(#[from] IndicatorError),
}
