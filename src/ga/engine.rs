//! Generation-by-generation evolution engine.
//!
//! [`Engine`] owns one population and advances it exactly one generation
//! per [`step`](Engine::step) call. The caller owns scheduling: a timer, an
//! event loop, or the [`GaRunner`](super::GaRunner) loop.
//!
//! ```text
//!   Idle ──initialize──▶ Running ──step (last generation)──▶ Completed
//!                          │
//!                          └──stop──▶ Stopped
//! ```
//!
//! `initialize` may be called again from any state to start a fresh run.

use super::config::GaConfig;
use super::progress::ProgressRecord;
use super::types::{Fitness, GaProblem, GenerationContext, Individual};
use crate::error::EngineError;
use crate::random::rng_from_option;
use rand::rngs::StdRng;
use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Lifecycle state of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    /// Configured, no population yet.
    Idle,
    /// Population initialized; generations may be stepped.
    Running,
    /// Cancelled externally between generations.
    Stopped,
    /// The configured generation count has been exhausted.
    Completed,
}

impl RunState {
    /// Returns `true` for `Stopped` and `Completed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Stopped | RunState::Completed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Stopped => "stopped",
            RunState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Published after every generation for display.
#[derive(Debug, Clone)]
pub struct Snapshot<I> {
    /// Generation that produced this population.
    pub generation: usize,
    /// Best individual of the population.
    pub best: I,
    /// Best fitness as `f64`.
    pub best_fitness: f64,
}

/// Evolution engine for one problem instance.
///
/// # Usage
///
/// ```ignore
/// let mut engine = Engine::new(problem, GaConfig::routing().with_seed(42))?;
/// engine.initialize();
/// for gen in 0..engine.config().max_generations {
///     let (best, fitness) = engine.step(gen)?;
///     draw(best, fitness, gen);
/// }
/// println!("{}", engine.progress());
/// ```
pub struct Engine<P: GaProblem> {
    problem: P,
    config: GaConfig,
    rng: StdRng,
    population: Vec<P::Individual>,
    state: RunState,
    next_generation: usize,
    progress: ProgressRecord,
}

impl<P: GaProblem> Engine<P> {
    /// Creates an idle engine after validating the configuration and the
    /// problem data.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] if either check fails; see
    /// [`GaConfig::validate`] and [`GaProblem::prepare`].
    pub fn new(mut problem: P, config: GaConfig) -> Result<Self, EngineError> {
        config.validate()?;
        problem.prepare(&config)?;
        let rng = rng_from_option(config.seed);
        Ok(Self {
            problem,
            config,
            rng,
            population: Vec::new(),
            state: RunState::Idle,
            next_generation: 0,
            progress: ProgressRecord::new(),
        })
    }

    /// Builds and evaluates a fresh starting population.
    ///
    /// Resets the generation counter and progress record; the engine
    /// becomes `Running`.
    pub fn initialize(&mut self) {
        let mut population = self
            .problem
            .initial_population(self.config.population_size, &mut self.rng);
        evaluate_all(&self.problem, &mut population, self.config.parallel);

        self.population = population;
        self.next_generation = 0;
        self.progress.clear();
        self.state = RunState::Running;

        log::info!(
            "initialized population of {} (initial best {:?})",
            self.population.len(),
            find_best(&self.population).map(|b| b.fitness())
        );
    }

    /// Advances exactly one generation and returns the best individual of
    /// the new population with its fitness.
    ///
    /// 1. Sort by fitness and copy the `elitism_count` best unchanged
    /// 2. Select two parents, cross them, mutate the child; repeat until
    ///    the population is refilled
    /// 3. Evaluate the children and replace the population
    ///
    /// After the last configured generation the engine is `Completed`.
    ///
    /// # Errors
    /// - [`EngineError::InvalidState`] unless the engine is `Running`
    /// - [`EngineError::GenerationOutOfOrder`] if `generation` is not the
    ///   next generation index
    pub fn step(
        &mut self,
        generation: usize,
    ) -> Result<(P::Individual, <P::Individual as Individual>::Fitness), EngineError> {
        if self.state != RunState::Running {
            return Err(EngineError::InvalidState {
                operation: "step",
                state: self.state,
            });
        }
        if generation != self.next_generation {
            return Err(EngineError::GenerationOutOfOrder {
                expected: self.next_generation,
                got: generation,
            });
        }

        let ctx = GenerationContext {
            generation,
            max_generations: self.config.max_generations,
            mutation_rate: self.config.mutation_rate,
        };

        sort_by_fitness(&mut self.population);

        let pop_size = self.config.population_size;
        let elite_count = self.config.elitism_count.min(self.population.len());
        let mut next_gen: Vec<P::Individual> = Vec::with_capacity(pop_size);
        next_gen.extend_from_slice(&self.population[..elite_count]);

        while next_gen.len() < pop_size {
            let (p1, p2) =
                self.config
                    .selection
                    .select_pair(&self.population, generation, &mut self.rng);
            let mut child =
                self.problem
                    .crossover(&self.population[p1], &self.population[p2], &mut self.rng);
            self.problem.mutate(&mut child, &ctx, &mut self.rng);
            next_gen.push(child);
        }

        // Elites keep their cached fitness.
        evaluate_all(&self.problem, &mut next_gen[elite_count..], self.config.parallel);
        self.population = next_gen;

        let best = find_best(&self.population)
            .cloned()
            .ok_or(EngineError::InvalidState {
                operation: "step",
                state: self.state,
            })?;
        let best_fitness = best.fitness();

        self.progress.record(generation, best_fitness.to_f64());
        self.next_generation = generation + 1;
        log::debug!("generation {generation}: best fitness {best_fitness:?}");

        if self.next_generation >= self.config.max_generations {
            self.state = RunState::Completed;
            log::info!(
                "completed after {} generations, best fitness {best_fitness:?}",
                self.next_generation
            );
        }

        Ok((best, best_fitness))
    }

    /// Stops a run between generations. Idempotent.
    ///
    /// A `Completed` run stays `Completed`.
    pub fn stop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = RunState::Stopped;
        log::info!("stopped before generation {}", self.next_generation);
    }

    /// Compressed best-fitness history of the current run.
    pub fn progress(&self) -> &ProgressRecord {
        &self.progress
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Index the next `step` call must use.
    pub fn next_generation(&self) -> usize {
        self.next_generation
    }

    /// Current population (empty while `Idle`).
    pub fn population(&self) -> &[P::Individual] {
        &self.population
    }

    /// Best individual of the current population.
    pub fn best(&self) -> Option<&P::Individual> {
        find_best(&self.population)
    }

    /// The problem being optimized.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// The validated configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Best individual packaged for display, tagged with the last
    /// completed generation.
    pub fn snapshot(&self) -> Option<Snapshot<P::Individual>> {
        let generation = self.next_generation.checked_sub(1)?;
        let best = self.best()?.clone();
        Some(Snapshot {
            generation,
            best_fitness: best.fitness().to_f64(),
            best,
        })
    }
}

/// Evaluate every individual in the slice.
#[cfg(feature = "parallel")]
fn evaluate_all<P: GaProblem>(problem: &P, individuals: &mut [P::Individual], parallel: bool) {
    if parallel {
        individuals.par_iter_mut().for_each(|ind| {
            let f = problem.evaluate(ind);
            ind.set_fitness(f);
        });
    } else {
        evaluate_sequential(problem, individuals);
    }
}

/// Evaluate every individual in the slice.
#[cfg(not(feature = "parallel"))]
fn evaluate_all<P: GaProblem>(problem: &P, individuals: &mut [P::Individual], _parallel: bool) {
    evaluate_sequential(problem, individuals);
}

fn evaluate_sequential<P: GaProblem>(problem: &P, individuals: &mut [P::Individual]) {
    for ind in individuals.iter_mut() {
        let f = problem.evaluate(ind);
        ind.set_fitness(f);
    }
}

fn compare_fitness<I: Individual>(a: &I, b: &I) -> Ordering {
    a.fitness()
        .partial_cmp(&b.fitness())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort, best (lowest fitness) first.
fn sort_by_fitness<I: Individual>(population: &mut [I]) {
    population.sort_by(compare_fitness);
}

/// Find the individual with the best (lowest) fitness.
fn find_best<I: Individual>(population: &[I]) -> Option<&I> {
    population.iter().min_by(|a, b| compare_fitness(*a, *b))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Selection;
    use rand::Rng;

    // ---- OneMax problem: maximize true bits (minimize false bits) ----

    #[derive(Clone, Debug)]
    struct BitString {
        bits: Vec<bool>,
        fitness: f64,
    }

    impl Individual for BitString {
        type Fitness = f64;
        fn fitness(&self) -> f64 {
            self.fitness
        }
        fn set_fitness(&mut self, f: f64) {
            self.fitness = f;
        }
    }

    struct OneMaxProblem {
        n: usize,
    }

    impl GaProblem for OneMaxProblem {
        type Individual = BitString;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> BitString {
            BitString {
                bits: (0..self.n).map(|_| rng.random_bool(0.5)).collect(),
                fitness: f64::INFINITY,
            }
        }

        fn evaluate(&self, ind: &BitString) -> f64 {
            ind.bits.iter().filter(|&&b| !b).count() as f64
        }

        fn crossover<R: Rng>(&self, p1: &BitString, p2: &BitString, rng: &mut R) -> BitString {
            let point = rng.random_range(0..self.n);
            let mut bits = p1.bits[..point].to_vec();
            bits.extend_from_slice(&p2.bits[point..]);
            BitString {
                bits,
                fitness: f64::INFINITY,
            }
        }

        fn mutate<R: Rng>(&self, ind: &mut BitString, ctx: &GenerationContext, rng: &mut R) {
            if rng.random_bool(ctx.mutation_rate) {
                let idx = rng.random_range(0..self.n);
                ind.bits[idx] = !ind.bits[idx];
            }
        }
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(30)
            .with_max_generations(100)
            .with_elitism_count(2)
            .with_mutation_rate(0.3)
            .with_seed(42)
    }

    #[test]
    fn test_step_before_initialize_is_invalid_state() {
        let mut engine = Engine::new(OneMaxProblem { n: 8 }, config()).unwrap();
        assert_eq!(engine.state(), RunState::Idle);
        let err = engine.step(0).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                operation: "step",
                state: RunState::Idle
            }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = config().with_elitism_count(30);
        assert!(matches!(
            Engine::new(OneMaxProblem { n: 8 }, bad),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_initialize_builds_evaluated_population() {
        let mut engine = Engine::new(OneMaxProblem { n: 8 }, config()).unwrap();
        engine.initialize();
        assert_eq!(engine.state(), RunState::Running);
        assert_eq!(engine.population().len(), 30);
        assert!(engine.population().iter().all(|i| i.fitness().is_finite()));
        assert!(engine.snapshot().is_none());
    }

    #[test]
    fn test_onemax_convergence_and_monotonic_best() {
        let mut engine = Engine::new(OneMaxProblem { n: 20 }, config()).unwrap();
        engine.initialize();

        let mut last = f64::INFINITY;
        for gen in 0..100 {
            let (best, fitness) = engine.step(gen).unwrap();
            assert_eq!(best.fitness(), fitness);
            assert!(fitness <= last, "best got worse at {gen}: {fitness} > {last}");
            assert_eq!(engine.population().len(), 30);
            last = fitness;
        }
        assert!(last <= 3.0, "expected near-optimal OneMax, got {last}");
        assert_eq!(engine.state(), RunState::Completed);
    }

    #[test]
    fn test_step_after_completion_is_invalid_state() {
        let mut engine =
            Engine::new(OneMaxProblem { n: 6 }, config().with_max_generations(3)).unwrap();
        engine.initialize();
        for gen in 0..3 {
            engine.step(gen).unwrap();
        }
        assert_eq!(engine.state(), RunState::Completed);
        assert!(matches!(
            engine.step(3),
            Err(EngineError::InvalidState {
                state: RunState::Completed,
                ..
            })
        ));
    }

    #[test]
    fn test_generation_out_of_order() {
        let mut engine = Engine::new(OneMaxProblem { n: 6 }, config()).unwrap();
        engine.initialize();
        engine.step(0).unwrap();
        assert_eq!(
            engine.step(5).unwrap_err(),
            EngineError::GenerationOutOfOrder {
                expected: 1,
                got: 5
            }
        );
        // A rejected step leaves the engine usable.
        assert!(engine.step(1).is_ok());
    }

    #[test]
    fn test_stop_is_idempotent_and_blocks_step() {
        let mut engine = Engine::new(OneMaxProblem { n: 6 }, config()).unwrap();
        engine.initialize();
        engine.step(0).unwrap();
        engine.stop();
        engine.stop();
        assert_eq!(engine.state(), RunState::Stopped);
        assert_eq!(engine.population().len(), 30);
        assert!(matches!(
            engine.step(1),
            Err(EngineError::InvalidState {
                state: RunState::Stopped,
                ..
            })
        ));
    }

    #[test]
    fn test_stop_does_not_override_completed() {
        let mut engine =
            Engine::new(OneMaxProblem { n: 6 }, config().with_max_generations(1)).unwrap();
        engine.initialize();
        engine.step(0).unwrap();
        engine.stop();
        assert_eq!(engine.state(), RunState::Completed);
    }

    #[test]
    fn test_reinitialize_restarts_run() {
        let mut engine = Engine::new(OneMaxProblem { n: 6 }, config()).unwrap();
        engine.initialize();
        engine.step(0).unwrap();
        engine.stop();

        engine.initialize();
        assert_eq!(engine.state(), RunState::Running);
        assert_eq!(engine.next_generation(), 0);
        assert!(engine.progress().is_empty());
        assert!(engine.step(0).is_ok());
    }

    #[test]
    fn test_progress_is_compressed() {
        let mut engine = Engine::new(OneMaxProblem { n: 12 }, config()).unwrap();
        engine.initialize();
        for gen in 0..100 {
            engine.step(gen).unwrap();
        }
        let entries = engine.progress().entries();
        assert!(!entries.is_empty());
        assert_eq!(entries[0].generation, 0);
        for pair in entries.windows(2) {
            assert!(pair[0].generation < pair[1].generation);
            assert_ne!(pair[0].fitness, pair[1].fitness);
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let run = || {
            let mut engine = Engine::new(OneMaxProblem { n: 16 }, config()).unwrap();
            engine.initialize();
            (0..40)
                .map(|gen| engine.step(gen).unwrap().1)
                .collect::<Vec<f64>>()
        };
        assert_eq!(run(), run());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_evaluation_matches_sequential() {
        let run = |parallel: bool| {
            let cfg = config().with_population_size(64).with_parallel(parallel);
            let mut engine = Engine::new(OneMaxProblem { n: 32 }, cfg).unwrap();
            engine.initialize();
            let history: Vec<f64> = (0..60).map(|gen| engine.step(gen).unwrap().1).collect();
            let genomes: Vec<Vec<bool>> = engine.population().iter().map(|b| b.bits.clone()).collect();
            (history, genomes)
        };
        assert_eq!(run(true), run(false));
    }

    #[test]
    fn test_no_elitism_still_fills_population() {
        let cfg = config()
            .with_elitism_count(0)
            .with_selection(Selection::Tournament(2));
        let mut engine = Engine::new(OneMaxProblem { n: 10 }, cfg).unwrap();
        engine.initialize();
        for gen in 0..10 {
            engine.step(gen).unwrap();
            assert_eq!(engine.population().len(), 30);
        }
    }

    #[test]
    fn test_snapshot_tracks_last_generation() {
        let mut engine = Engine::new(OneMaxProblem { n: 10 }, config()).unwrap();
        engine.initialize();
        engine.step(0).unwrap();
        let (_, fitness) = engine.step(1).unwrap();
        let snap = engine.snapshot().unwrap();
        assert_eq!(snap.generation, 1);
        assert_eq!(snap.best_fitness, fitness);
    }

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::Completed.to_string(), "completed");
        assert!(RunState::Stopped.is_terminal());
        assert!(!RunState::Running.is_terminal());
    }
}
