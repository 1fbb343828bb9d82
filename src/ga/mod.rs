//! Generational Genetic Algorithm engine.
//!
//! A generic, encoding-agnostic engine built on trait-based abstractions.
//! Problem variants implement [`GaProblem`], which specifies how to create,
//! evaluate, cross over, and mutate individuals; the [`Engine`] supplies
//! elitism, tournament selection and the generation state machine.
//!
//! # Core Traits
//!
//! - [`Individual`]: A candidate solution with a cached fitness
//! - [`GaProblem`]: Problem definition: initialization, evaluation and operators
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, elitism, presets)
//! - [`Engine`]: One synchronous generation per [`Engine::step`]
//! - [`GaRunner`]: Drives an engine to completion or cancellation
//! - [`ProgressRecord`]: Compressed best-fitness history
//!
//! # Submodules
//!
//! - [`operators`]: Crossover and mutation over inclusion vectors and permutations
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
mod engine;
pub mod operators;
mod progress;
mod runner;
mod selection;
mod types;

pub(crate) use config::check_penalty_factor;
pub use config::GaConfig;
pub use engine::{Engine, RunState, Snapshot};
pub use progress::{ProgressEntry, ProgressRecord};
pub use runner::{GaRunner, RunSummary};
pub use selection::Selection;
pub use types::{Fitness, GaProblem, GenerationContext, Individual};
