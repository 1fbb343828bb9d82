//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::selection::Selection;
use crate::error::EngineError;

/// Configuration for the Genetic Algorithm.
///
/// Controls population size, generation count, elitism, mutation,
/// selection and parallelism. Problem-specific knobs (the overshoot
/// penalty) live here too so a UI shell can hand the engine one struct;
/// [`Engine::new`](super::Engine::new) passes them to the problem.
///
/// # Defaults
///
/// ```
/// use u_evolve::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.elitism_count, 2);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::ga::{GaConfig, Selection};
///
/// let config = GaConfig::routing()
///     .with_population_size(200)
///     .with_elitism_count(10)
///     .with_mutation_rate(0.15)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Number of generations before the run completes.
    pub max_generations: usize,

    /// Number of best individuals copied unchanged into each new generation.
    ///
    /// Any value above zero makes the best fitness non-increasing.
    pub elitism_count: usize,

    /// Base mutation probability (0.0–1.0).
    ///
    /// Inclusion vectors use it as a gate and as the bit-flip fraction;
    /// permutations decay it linearly over the run.
    pub mutation_rate: f64,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Multiplier applied to overshooting the target (target matching only).
    pub penalty_factor: f64,

    /// Whether to evaluate offspring in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

pub(crate) fn check_penalty_factor(factor: f64) -> Result<(), EngineError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(EngineError::config("penalty_factor must be positive and finite"));
    }
    Ok(())
}

impl Default for GaConfig {
    fn default() -> Self {
        Self::target_matching()
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the number of elites carried over each generation.
    pub fn with_elitism_count(mut self, n: usize) -> Self {
        self.elitism_count = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for a fixed tournament size.
    ///
    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the overshoot penalty factor.
    pub fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for target matching over inclusion vectors.
    ///
    /// - Population: 50, Generations: 1000, Elites: 2
    /// - Mutation rate: 0.1, Tournament: 5, Penalty factor: 2
    pub fn target_matching() -> Self {
        Self {
            population_size: 50,
            max_generations: 1000,
            elitism_count: 2,
            mutation_rate: 0.1,
            selection: Selection::Tournament(5),
            penalty_factor: 2.0,
            parallel: false,
            seed: None,
        }
    }

    /// Preset for routing over permutations.
    ///
    /// - Population: 100, Generations: 500, Elites: 5
    /// - Mutation rate: 0.1 (decaying)
    /// - Tournament: 5, growing by one every 50 generations
    pub fn routing() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            elitism_count: 5,
            mutation_rate: 0.1,
            selection: Selection::AdaptiveTournament {
                base: 5,
                growth_interval: 50,
            },
            ..Self::target_matching()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns [`EngineError::Configuration`] describing the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.population_size == 0 {
            return Err(EngineError::config("population_size must be at least 1"));
        }
        if self.max_generations == 0 {
            return Err(EngineError::config("max_generations must be at least 1"));
        }
        if self.elitism_count >= self.population_size {
            return Err(EngineError::config(format!(
                "elitism_count ({}) must be smaller than population_size ({})",
                self.elitism_count, self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EngineError::config("mutation_rate must be within [0, 1]"));
        }
        check_penalty_factor(self.penalty_factor)?;
        match self.selection {
            Selection::Tournament(0) | Selection::AdaptiveTournament { base: 0, .. } => {
                return Err(EngineError::config("tournament size must be at least 1"));
            }
            Selection::Tournament(k) if k > self.population_size => {
                log::warn!(
                    "tournament size {k} exceeds population size {}, it will be clamped",
                    self.population_size
                );
            }
            _ => {}
        }
        Ok(())
    }
}
