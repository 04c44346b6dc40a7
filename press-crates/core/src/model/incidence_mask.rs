use std::ops::BitXor;

use super::ButtonId;
use super::SlotId;
use crate::containers::StorageKey;

/// The maximum number of slots an [`IncidenceMask`] can address.
pub const MAX_SLOTS: usize = u64::BITS as usize;
/// The maximum number of buttons a [`ButtonSet`] can hold.
pub const MAX_BUTTONS: usize = u64::BITS as usize;

/// A fixed-width bit-vector over slot indices; bit `j` set means slot `j` is affected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IncidenceMask(u64);

impl IncidenceMask {
    pub const EMPTY: IncidenceMask = IncidenceMask(0);

    /// Builds the mask from a list of slot indices; duplicates are idempotent.
    ///
    /// Every index must be smaller than [`MAX_SLOTS`]; [`crate::Problem::new`] checks this before
    /// building any mask.
    pub fn from_slots(slots: impl IntoIterator<Item = usize>) -> IncidenceMask {
        IncidenceMask(slots.into_iter().fold(0, |bits, slot| {
            crate::press_assert_simple!(slot < MAX_SLOTS, "slot index {slot} does not fit a mask");
            bits | (1_u64 << slot)
        }))
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, slot: SlotId) -> bool {
        self.0 & (1_u64 << slot.index()) != 0
    }

    /// The number of slots in the mask.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the affected slots in increasing order.
    pub fn slots(self) -> impl Iterator<Item = SlotId> {
        BitIter(self.0).map(SlotId::create_from_index)
    }
}

impl BitXor for IncidenceMask {
    type Output = IncidenceMask;

    fn bitxor(self, rhs: Self) -> Self::Output {
        IncidenceMask(self.0 ^ rhs.0)
    }
}

/// A set of buttons, used to track which buttons are still uncommitted during a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ButtonSet(u64);

impl ButtonSet {
    /// The set of buttons `0..num_buttons`.
    pub fn full(num_buttons: usize) -> ButtonSet {
        crate::press_assert_simple!(num_buttons <= MAX_BUTTONS);
        if num_buttons == MAX_BUTTONS {
            ButtonSet(u64::MAX)
        } else {
            ButtonSet((1_u64 << num_buttons) - 1)
        }
    }

    pub fn contains(self, button: ButtonId) -> bool {
        self.0 & (1_u64 << button.index()) != 0
    }

    /// Returns a copy of the set without the given buttons.
    pub fn without(self, buttons: impl IntoIterator<Item = ButtonId>) -> ButtonSet {
        ButtonSet(
            buttons
                .into_iter()
                .fold(self.0, |bits, button| bits & !(1_u64 << button.index())),
        )
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Yields the indices of the set bits, lowest first.
#[derive(Clone, Copy, Debug)]
struct BitIter(u64);

impl Iterator for BitIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }

        let index = self.0.trailing_zeros() as usize;
        // clear the lowest set bit
        self.0 &= self.0 - 1;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_from_slots_ignores_duplicates() {
        let mask = IncidenceMask::from_slots([3, 1, 3]);

        assert_eq!(mask.bits(), 0b1010);
        assert_eq!(mask.len(), 2);
        assert_eq!(
            mask.slots().collect::<Vec<_>>(),
            vec![SlotId::create_from_index(1), SlotId::create_from_index(3)]
        );
    }

    #[test]
    fn highest_slot_is_addressable() {
        let mask = IncidenceMask::from_slots([MAX_SLOTS - 1]);

        assert!(mask.contains(SlotId::create_from_index(MAX_SLOTS - 1)));
        assert_eq!(mask.slots().count(), 1);
    }

    #[test]
    fn full_button_set_contains_exactly_the_first_buttons() {
        let set = ButtonSet::full(3);

        assert_eq!(set.len(), 3);
        assert!(set.contains(ButtonId::create_from_index(2)));
        assert!(!set.contains(ButtonId::create_from_index(3)));
        assert_eq!(ButtonSet::full(MAX_BUTTONS).len(), MAX_BUTTONS);
    }

    #[test]
    fn removing_buttons_leaves_the_original_untouched() {
        let set = ButtonSet::full(4);
        let reduced = set.without([ButtonId::create_from_index(0), ButtonId::create_from_index(2)]);

        assert_eq!(set.len(), 4);
        assert_eq!(reduced.len(), 2);
        assert!(!reduced.contains(ButtonId::create_from_index(0)));
        assert!(reduced.contains(ButtonId::create_from_index(1)));
        assert!(!reduced.contains(ButtonId::create_from_index(2)));
        assert!(reduced.contains(ButtonId::create_from_index(3)));
    }

    #[test]
    fn xor_of_masks_toggles_shared_slots() {
        let first = IncidenceMask::from_slots([0, 1]);
        let second = IncidenceMask::from_slots([1, 2]);

        assert_eq!((first ^ second).bits(), 0b101);
    }
}
