//! Tagged-variant facade over the two problem encodings.
//!
//! A UI shell that lets the user pick either problem at runtime works with
//! [`ProblemInstance`], [`Genome`] and [`EngineHandle`] instead of the
//! generic [`Engine`].

use crate::error::EngineError;
use crate::ga::{Engine, GaConfig, ProgressRecord, RunState};
use crate::problems::{KnapsackInstance, KnapsackProblem, TspInstance, TspProblem};

/// Static problem data supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProblemInstance {
    /// Item values and a target sum.
    TargetMatching(KnapsackInstance),
    /// City coordinates.
    Routing(TspInstance),
}

/// A candidate solution in either encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Genome {
    /// One inclusion flag per item.
    InclusionVector(Vec<bool>),
    /// City visiting order.
    Permutation(Vec<usize>),
}

/// A configured engine of either variant.
pub enum EngineHandle {
    TargetMatching(Engine<KnapsackProblem>),
    Routing(Engine<TspProblem>),
}

/// Validates the parameters and builds an idle engine for `instance`.
///
/// `config.penalty_factor` applies to target matching only; the routing
/// variant reads its tournament schedule from `config.selection`.
///
/// # Errors
/// [`EngineError::Configuration`] for invalid parameters or an empty or
/// malformed instance.
///
/// ```
/// use u_evolve::{configure, ProblemInstance, Genome};
/// use u_evolve::ga::GaConfig;
/// use u_evolve::problems::KnapsackInstance;
///
/// let instance = KnapsackInstance::new(vec![10, 20, 30, 40], 50).unwrap();
/// let mut engine = configure(
///     ProblemInstance::TargetMatching(instance),
///     GaConfig::target_matching().with_max_generations(20).with_seed(1),
/// )
/// .unwrap();
/// engine.initialize();
/// let (best, fitness) = engine.step(0).unwrap();
/// assert!(matches!(best, Genome::InclusionVector(ref g) if g.len() == 4));
/// assert!(fitness >= 0.0);
/// ```
pub fn configure(instance: ProblemInstance, config: GaConfig) -> Result<EngineHandle, EngineError> {
    match instance {
        ProblemInstance::TargetMatching(inst) => {
            Engine::new(KnapsackProblem::new(inst), config).map(EngineHandle::TargetMatching)
        }
        ProblemInstance::Routing(inst) => {
            Engine::new(TspProblem::new(inst), config).map(EngineHandle::Routing)
        }
    }
}

impl EngineHandle {
    /// Builds a fresh starting population.
    pub fn initialize(&mut self) {
        match self {
            EngineHandle::TargetMatching(e) => e.initialize(),
            EngineHandle::Routing(e) => e.initialize(),
        }
    }

    /// Advances exactly one generation; see [`Engine::step`].
    pub fn step(&mut self, generation: usize) -> Result<(Genome, f64), EngineError> {
        match self {
            EngineHandle::TargetMatching(e) => {
                let (best, fitness) = e.step(generation)?;
                Ok((Genome::InclusionVector(best.into_genes()), fitness))
            }
            EngineHandle::Routing(e) => {
                let (best, fitness) = e.step(generation)?;
                Ok((Genome::Permutation(best.into_order()), fitness))
            }
        }
    }

    /// Stops the run. Idempotent.
    pub fn stop(&mut self) {
        match self {
            EngineHandle::TargetMatching(e) => e.stop(),
            EngineHandle::Routing(e) => e.stop(),
        }
    }

    /// Compressed best-fitness history.
    pub fn progress(&self) -> &ProgressRecord {
        match self {
            EngineHandle::TargetMatching(e) => e.progress(),
            EngineHandle::Routing(e) => e.progress(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        match self {
            EngineHandle::TargetMatching(e) => e.state(),
            EngineHandle::Routing(e) => e.state(),
        }
    }

    /// Index the next `step` call must use.
    pub fn next_generation(&self) -> usize {
        match self {
            EngineHandle::TargetMatching(e) => e.next_generation(),
            EngineHandle::Routing(e) => e.next_generation(),
        }
    }

    /// The validated configuration.
    pub fn config(&self) -> &GaConfig {
        match self {
            EngineHandle::TargetMatching(e) => e.config(),
            EngineHandle::Routing(e) => e.config(),
        }
    }
}
