use thiserror::Error;

use super::ButtonId;
use super::IncidenceMask;
use super::SlotId;
use super::MAX_BUTTONS;
use super::MAX_SLOTS;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// A button which, when pressed once, increments every slot of its mask by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Button {
    id: ButtonId,
    mask: IncidenceMask,
}

impl Button {
    pub fn mask(&self) -> IncidenceMask {
        self.mask
    }
}

/// Reasons for which a [`Problem`] cannot be constructed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("button {button} references slot {slot}, but there are only {num_slots} slots")]
    SlotOutOfBounds {
        button: usize,
        slot: usize,
        num_slots: usize,
    },
    #[error("{num_slots} slots do not fit in an incidence mask of {max} slots", max = MAX_SLOTS)]
    TooManySlots { num_slots: usize },
    #[error("{num_buttons} buttons exceed the supported maximum of {max}", max = MAX_BUTTONS)]
    TooManyButtons { num_buttons: usize },
    #[error("the targets sum to more than {max}", max = u64::MAX)]
    TargetSumOverflow,
}

/// An instance: find the minimum number of presses such that every slot reaches its target
/// exactly.
///
/// The problem is immutable once constructed; the derived views (which buttons affect a slot, the
/// trivial upper bound of a button) are computed once here so that the strategies can share them.
#[derive(Clone, Debug)]
pub struct Problem {
    buttons: KeyedVec<ButtonId, Button>,
    targets: KeyedVec<SlotId, u64>,
    /// For every slot the buttons affecting it, in increasing order.
    affecting_buttons: KeyedVec<SlotId, Vec<ButtonId>>,
    /// For every button the smallest target among the slots it affects.
    upper_bounds: KeyedVec<ButtonId, u64>,
}

impl Problem {
    /// Creates a problem from, for every button, the list of slots it affects and the target of
    /// every slot.
    ///
    /// The number of slots is the length of `targets`. Fails when a button references a slot
    /// outside of `targets`, when the problem does not fit the fixed-width masks, or when the
    /// targets do not sum to a `u64`.
    ///
    /// Every feasible total is at most the sum of the targets, so rejecting larger sums lets the
    /// strategies count presses in `u64` without overflow.
    pub fn new(buttons: Vec<Vec<usize>>, targets: Vec<u64>) -> Result<Problem, ProblemError> {
        let num_slots = targets.len();
        if num_slots > MAX_SLOTS {
            return Err(ProblemError::TooManySlots { num_slots });
        }
        if buttons.len() > MAX_BUTTONS {
            return Err(ProblemError::TooManyButtons {
                num_buttons: buttons.len(),
            });
        }
        if targets
            .iter()
            .try_fold(0_u64, |sum, &target| sum.checked_add(target))
            .is_none()
        {
            return Err(ProblemError::TargetSumOverflow);
        }

        let mut keyed_buttons: KeyedVec<ButtonId, Button> = KeyedVec::default();
        for (button, slots) in buttons.into_iter().enumerate() {
            if let Some(&slot) = slots.iter().find(|&&slot| slot >= num_slots) {
                return Err(ProblemError::SlotOutOfBounds {
                    button,
                    slot,
                    num_slots,
                });
            }

            let _ = keyed_buttons.push(Button {
                id: ButtonId::create_from_index(button),
                mask: IncidenceMask::from_slots(slots),
            });
        }

        Ok(Problem::from_validated(keyed_buttons, targets.into()))
    }

    fn from_validated(buttons: KeyedVec<ButtonId, Button>, targets: KeyedVec<SlotId, u64>) -> Self {
        let affecting_buttons = targets
            .keys()
            .map(|slot| {
                buttons
                    .iter()
                    .filter(|button| button.mask.contains(slot))
                    .map(|button| button.id)
                    .collect::<Vec<_>>()
            })
            .collect();

        // A button affecting no slot can never contribute to a target, so it is never pressed.
        let upper_bounds = buttons
            .iter()
            .map(|button| {
                button
                    .mask
                    .slots()
                    .map(|slot| targets[slot])
                    .min()
                    .unwrap_or(0)
            })
            .collect();

        Problem {
            buttons,
            targets,
            affecting_buttons,
            upper_bounds,
        }
    }

    pub fn num_buttons(&self) -> usize {
        self.buttons.len()
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.buttons.iter()
    }

    pub fn button(&self, button: ButtonId) -> &Button {
        &self.buttons[button]
    }

    pub fn button_ids(&self) -> impl Iterator<Item = ButtonId> {
        self.buttons.keys()
    }

    pub fn slots(&self) -> impl Iterator<Item = SlotId> {
        self.targets.keys()
    }

    pub fn target(&self, slot: SlotId) -> u64 {
        self.targets[slot]
    }

    pub fn targets(&self) -> &KeyedVec<SlotId, u64> {
        &self.targets
    }

    /// The buttons affecting `slot`, in increasing order.
    pub fn affecting_buttons(&self, slot: SlotId) -> &[ButtonId] {
        &self.affecting_buttons[slot]
    }

    /// The smallest target among the slots affected by `button`; no feasible assignment presses
    /// the button more often than this. A button affecting no slot has a bound of `0`.
    pub fn trivial_upper_bound(&self, button: ButtonId) -> u64 {
        self.upper_bounds[button]
    }

    /// Returns the first slot which has a positive target but no button affecting it.
    pub fn find_unreachable_slot(&self) -> Option<SlotId> {
        self.slots()
            .find(|&slot| self.targets[slot] > 0 && self.affecting_buttons[slot].is_empty())
    }

    /// The accumulated count of every slot under the given press counts.
    pub fn slot_sums(&self, presses: &KeyedVec<ButtonId, u64>) -> KeyedVec<SlotId, u64> {
        crate::press_assert_eq_simple!(presses.len(), self.num_buttons());

        self.slots()
            .map(|slot| {
                self.affecting_buttons[slot]
                    .iter()
                    .fold(0_u64, |sum, &button| sum.saturating_add(presses[button]))
            })
            .collect()
    }

    /// Whether every slot sum equals its target exactly under the given press counts.
    pub fn is_satisfied_by(&self, presses: &KeyedVec<ButtonId, u64>) -> bool {
        presses.len() == self.num_buttons() && self.slot_sums(presses) == self.targets
    }
}
