//! # press-core
//! Computes the minimum number of button presses such that every slot (counter) reaches its
//! target exactly, where every button increments a fixed subset of the slots.
//!
//! In other words, it solves `min sum(x)` subject to `A x = b` with `x` a vector of non-negative
//! integers and `A` a 0/1 incidence matrix. Three interchangeable strategies are provided, see
//! [`strategies`]; all of them return the same minimum (or [`OptimisationResult::Infeasible`]).
//!
//! ```rust
//! # use press_core::Problem;
//! # use press_core::strategies::StrategyKind;
//! // button 0 affects slots 0 and 1, button 1 affects slot 1
//! let problem = Problem::new(vec![vec![0, 1], vec![1]], vec![3, 5]).unwrap();
//!
//! let mut strategy = StrategyKind::Partition.create();
//! let result = strategy.solve(&problem);
//!
//! assert_eq!(result.total(), Some(5));
//! ```
//!
//! Batches of independent problems are solved in parallel with [`batch::solve_batch`].
pub mod asserts;
pub mod batch;
pub mod containers;
pub mod indicator;
pub mod statistics;
pub mod strategies;

pub use convert_case;

// The model is declared as a private module with public use, so that `press_core::Problem` is
// available directly.
mod model;

pub use model::*;
