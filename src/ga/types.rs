//! Core trait definitions for the GA engine.
//!
//! The two central traits, [`Individual`] and [`GaProblem`], define the
//! contract between the encoding-agnostic [`Engine`](super::Engine) and the
//! problem variants in [`crate::problems`].

use super::GaConfig;
use crate::error::EngineError;
use rand::Rng;

/// Marker trait for fitness values.
///
/// Fitness must support comparison and be cheaply copyable.
/// Lower fitness is considered better (minimization).
///
/// Built-in implementations exist for `f64` and `f32`.
pub trait Fitness: PartialOrd + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Returns a value representing the worst possible fitness.
    ///
    /// Used for unevaluated individuals and corrupt genomes.
    fn worst() -> Self;

    /// Converts the fitness to `f64` for progress records and logging.
    fn to_f64(self) -> f64;
}

impl Fitness for f64 {
    fn worst() -> Self {
        f64::INFINITY
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Fitness for f32 {
    fn worst() -> Self {
        f32::INFINITY
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// A candidate solution in the population.
///
/// Individuals carry their own cached fitness. The engine calls
/// [`GaProblem::evaluate`] once per new individual and stores the result via
/// [`set_fitness`](Individual::set_fitness); elites keep their cached value.
pub trait Individual: Clone + Send + Sync {
    /// The fitness type. Must implement [`Fitness`].
    type Fitness: Fitness;

    /// Returns the cached fitness of this individual.
    fn fitness(&self) -> Self::Fitness;

    /// Sets the cached fitness of this individual.
    fn set_fitness(&mut self, fitness: Self::Fitness);
}

/// Per-generation parameters handed to operators.
///
/// Operators with scheduled behaviour (decaying mutation, growing
/// tournaments) read the generation index from here instead of holding
/// their own counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationContext {
    /// Index of the generation being bred (0-based).
    pub generation: usize,
    /// Configured generation count of the run.
    pub max_generations: usize,
    /// Base mutation rate from the configuration.
    pub mutation_rate: f64,
}

impl GenerationContext {
    /// Mutation rate decayed linearly toward zero over the run:
    /// `rate × (1 − generation / max_generations)`, clamped to `[0, 1]`.
    pub fn decayed_mutation_rate(&self) -> f64 {
        if self.max_generations == 0 {
            return self.mutation_rate.clamp(0.0, 1.0);
        }
        let progress = self.generation as f64 / self.max_generations as f64;
        (self.mutation_rate * (1.0 - progress)).clamp(0.0, 1.0)
    }
}

/// Defines a GA optimization problem.
///
/// Implementors plug one genome encoding into the generic engine:
///
/// 1. **Initialization**: how to build the starting population
/// 2. **Evaluation**: how to compute fitness (pure, no randomness)
/// 3. **Crossover**: how to recombine two parents into one child
/// 4. **Mutation**: how to perturb a child, including its own
///    probability gates
///
/// # Thread Safety
///
/// `GaProblem` must be `Send + Sync` because the engine may evaluate
/// individuals in parallel using rayon.
pub trait GaProblem: Send + Sync {
    /// The individual (solution) type for this problem.
    type Individual: Individual;

    /// Checks the problem data and adopts problem-specific settings from
    /// the validated engine configuration.
    ///
    /// Called once by [`Engine::new`](super::Engine::new) after
    /// [`GaConfig::validate`]. Instances that bypassed their constructors
    /// (for example through deserialization) are rejected here.
    fn prepare(&mut self, config: &GaConfig) -> Result<(), EngineError> {
        let _ = config;
        Ok(())
    }

    /// Creates one random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Builds the starting population of `size` unevaluated individuals.
    ///
    /// The default implementation calls
    /// [`create_individual`](GaProblem::create_individual) `size` times.
    /// Problems with seeding heuristics override this.
    fn initial_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual> {
        (0..size).map(|_| self.create_individual(rng)).collect()
    }

    /// Evaluates an individual and returns its fitness.
    ///
    /// Must be deterministic: the same genome always yields the same value.
    fn evaluate(&self, individual: &Self::Individual) -> <Self::Individual as Individual>::Fitness;

    /// Recombines two parents into a single child.
    ///
    /// The child must be a valid genome of the problem's encoding.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> Self::Individual;

    /// Possibly mutates a freshly bred child in place.
    ///
    /// Called by the engine for every child; the implementation owns the
    /// decision of whether and how often to perturb.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, ctx: &GenerationContext, rng: &mut R);
}
