//! Problem variants plugged into the GA engine.
//!
//! - [`knapsack`]: Target matching over inclusion vectors
//! - [`tsp`]: Traveling Salesman over permutations

pub mod knapsack;
pub mod tsp;

pub use knapsack::{InclusionVector, KnapsackInstance, KnapsackProblem};
pub use tsp::{City, Tour, TspInstance, TspProblem};
