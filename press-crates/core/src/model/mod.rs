//! The button/slot model shared by every solving strategy.
//!
//! A [`Problem`] is built once through the fallible [`Problem::new`], after which all strategies
//! may assume that every [`IncidenceMask`] only references existing slots.
mod incidence_mask;
mod problem;
mod solution;

use std::fmt::Display;
use std::fmt::Formatter;

pub use incidence_mask::*;
pub use problem::*;
pub use solution::*;

use crate::containers::StorageKey;

/// Identifies a button of a [`Problem`] by its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ButtonId(u32);

/// Identifies a slot (counter) of a [`Problem`] by its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u32);

impl StorageKey for ButtonId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        ButtonId(index as u32)
    }
}

impl StorageKey for SlotId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        SlotId(index as u32)
    }
}

impl Display for ButtonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}
