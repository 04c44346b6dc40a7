//! Contains containers which are used by the solving strategies.
mod keyed_vec;

pub use keyed_vec::*;
