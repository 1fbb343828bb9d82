//! Generational genetic search for two combinatorial problems.
//!
//! - **Target matching**: choose a subset of items whose values sum as
//!   close as possible to a target, overshoot penalized more than
//!   undershoot. Genomes are inclusion vectors.
//! - **Traveling Salesman**: find a short closed tour through all cities.
//!   Genomes are permutations, seeded partly by nearest-neighbour tours.
//!
//! Both share one engine: tournament selection, problem-specific crossover
//! and mutation, elitism, and scheduled parameters (decaying mutation,
//! growing tournaments).
//!
//! # Architecture
//!
//! - [`ga`]: the encoding-agnostic engine, operators and run controller
//! - [`problems`]: the two problem variants implementing [`ga::GaProblem`]
//! - [`configure`] / [`EngineHandle`]: a tagged-variant facade for callers
//!   that choose the problem at runtime
//!
//! The engine holds no reference to any presentation layer. Callers own
//! the scheduling loop and read a snapshot after each
//! [`step`](ga::Engine::step).

pub mod error;
pub mod ga;
mod handle;
pub mod problems;
pub mod random;

pub use error::EngineError;
pub use handle::{configure, EngineHandle, Genome, ProblemInstance};
