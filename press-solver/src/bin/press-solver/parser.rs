//! Reads machine descriptions, one per non-empty line:
//!
//! ```text
//! [.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
//! ```
//!
//! The bracketed pattern gives the desired indicator lights (`#` on, `.` off), every
//! parenthesised list is a button with the slots it affects, and the braced list holds the
//! joltage target of every slot.
use std::str::FromStr;

use press_solver::IncidenceMask;
use press_solver::Problem;
use press_solver::ProblemError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum ParseError {
    #[error("line {line}: expected the indicator lights in square brackets")]
    MissingIndicators { line: usize },
    #[error("line {line}: expected the joltage targets in curly braces")]
    MissingTargets { line: usize },
    #[error("line {line}: unterminated section '{token}'")]
    UnterminatedSection { line: usize, token: String },
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
    #[error("line {line}: invalid indicator light '{character}', expected '#' or '.'")]
    InvalidLight { line: usize, character: char },
    #[error("line {line}: '{value}' is not a valid number")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: {num_lights} indicator lights but {num_targets} joltage targets")]
    LengthMismatch {
        line: usize,
        num_lights: usize,
        num_targets: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Machine {
    /// The 1-based line on which the machine is described.
    pub(crate) line: usize,
    pub(crate) lights: Vec<bool>,
    pub(crate) buttons: Vec<Vec<usize>>,
    pub(crate) targets: Vec<u64>,
}

impl Machine {
    pub(crate) fn to_problem(&self) -> Result<Problem, ProblemError> {
        Problem::new(self.buttons.clone(), self.targets.clone())
    }

    /// The lights which should be on.
    ///
    /// Only call this once [`Machine::to_problem`] succeeded, which guarantees that the lights fit
    /// a mask.
    pub(crate) fn light_mask(&self) -> IncidenceMask {
        IncidenceMask::from_slots(
            self.lights
                .iter()
                .enumerate()
                .filter(|&(_, &on)| on)
                .map(|(slot, _)| slot),
        )
    }
}

pub(crate) fn parse_machines(source: &str) -> Result<Vec<Machine>, ParseError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| parse_machine(index + 1, text))
        .collect()
}

fn parse_machine(line: usize, text: &str) -> Result<Machine, ParseError> {
    let tokens = text.split_whitespace().collect::<Vec<_>>();

    let Some((&first, rest)) = tokens.split_first() else {
        return Err(ParseError::MissingIndicators { line });
    };
    let lights = section(line, first, '[', ']')
        .ok_or(ParseError::MissingIndicators { line })??
        .chars()
        .map(|character| match character {
            '#' => Ok(true),
            '.' => Ok(false),
            _ => Err(ParseError::InvalidLight { line, character }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some((&last, button_tokens)) = rest.split_last() else {
        return Err(ParseError::MissingTargets { line });
    };
    let targets = section(line, last, '{', '}')
        .ok_or(ParseError::MissingTargets { line })?
        .and_then(|content| parse_list::<u64>(line, content))?;

    let buttons = button_tokens
        .iter()
        .map(|&token| {
            section(line, token, '(', ')')
                .ok_or_else(|| ParseError::UnexpectedToken {
                    line,
                    token: token.to_owned(),
                })?
                .and_then(|content| parse_list::<usize>(line, content))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if lights.len() != targets.len() {
        return Err(ParseError::LengthMismatch {
            line,
            num_lights: lights.len(),
            num_targets: targets.len(),
        });
    }

    Ok(Machine {
        line,
        lights,
        buttons,
        targets,
    })
}

/// Strips the delimiters of a section. Returns [`None`] if `token` does not open with `open`, and
/// an error if it opens but is not closed with `close`.
fn section(line: usize, token: &str, open: char, close: char) -> Option<Result<&str, ParseError>> {
    let content = token.strip_prefix(open)?;

    Some(
        content
            .strip_suffix(close)
            .ok_or_else(|| ParseError::UnterminatedSection {
                line,
                token: token.to_owned(),
            }),
    )
}

/// Parses a comma separated list; the empty list is allowed.
fn parse_list<T: FromStr>(line: usize, content: &str) -> Result<Vec<T>, ParseError> {
    if content.is_empty() {
        return Ok(vec![]);
    }

    content
        .split(',')
        .map(|value| {
            value.trim().parse().map_err(|_| ParseError::InvalidNumber {
                line,
                value: value.to_owned(),
            })
        })
        .collect()
}
