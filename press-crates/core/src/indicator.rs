//! The indicator-light puzzle: every press of a button toggles the lights of its mask, find the
//! fewest presses which produce the desired light pattern.
//!
//! Pressing a button twice cancels out, so only subsets of buttons need to be considered; the
//! search simply tries all of them.
use thiserror::Error;

use crate::model::IncidenceMask;

/// The largest number of buttons for which all subsets are enumerated.
pub const MAX_INDICATOR_BUTTONS: usize = 24;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("{num_buttons} buttons exceed the maximum of {max} for the indicator lights", max = MAX_INDICATOR_BUTTONS)]
    TooManyButtons { num_buttons: usize },
}

/// The minimum number of distinct buttons whose masks XOR to `lights`, or [`None`] if no subset
/// does.
pub fn min_presses_for_lights(
    buttons: &[IncidenceMask],
    lights: IncidenceMask,
) -> Result<Option<u32>, IndicatorError> {
    if buttons.len() > MAX_INDICATOR_BUTTONS {
        return Err(IndicatorError::TooManyButtons {
            num_buttons: buttons.len(),
        });
    }

    let fewest = (0_u32..1 << buttons.len())
        .filter(|&subset| {
            let toggled = buttons
                .iter()
                .enumerate()
                .filter(|(index, _)| subset & (1 << index) != 0)
                .fold(IncidenceMask::EMPTY, |state, (_, &mask)| state ^ mask);
            toggled == lights
        })
        .map(u32::count_ones)
        .min();

    Ok(fewest)
}
