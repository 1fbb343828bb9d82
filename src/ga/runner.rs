//! Run controller for the evolution engine.
//!
//! [`GaRunner`] drives an [`Engine`] from initialization to a terminal
//! state, forwarding a [`Snapshot`] to the caller after every generation.
//! Cancellation is observed between generations only, so a stopped run
//! always holds a fully evolved population.

use super::config::GaConfig;
use super::engine::{Engine, RunState, Snapshot};
use super::progress::ProgressRecord;
use super::types::{Fitness, GaProblem, Individual};
use crate::error::EngineError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of a driven run.
#[derive(Debug, Clone)]
pub struct RunSummary<I: Individual> {
    /// Best individual of the final population.
    pub best: I,

    /// Best fitness value (same as `best.fitness()`).
    pub best_fitness: I::Fitness,

    /// Number of generations executed.
    pub generations: usize,

    /// Terminal state: `Completed` or `Stopped`.
    pub state: RunState,

    /// Compressed best-fitness history.
    pub progress: ProgressRecord,
}

impl<I: Individual> RunSummary<I> {
    /// Whether the run was cancelled before exhausting its generations.
    pub fn cancelled(&self) -> bool {
        self.state == RunState::Stopped
    }
}

/// Drives the generation loop.
///
/// # Usage
///
/// ```ignore
/// let problem = TspProblem::new(instance)?;
/// let result = GaRunner::solve(problem, GaConfig::routing().with_seed(42))?;
/// println!("Best tour length: {}", result.best_fitness);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Builds an engine and runs it to completion.
    pub fn solve<P: GaProblem>(
        problem: P,
        config: GaConfig,
    ) -> Result<RunSummary<P::Individual>, EngineError> {
        let mut engine = Engine::new(problem, config)?;
        Self::run(&mut engine)
    }

    /// Runs the engine to completion without observation or cancellation.
    pub fn run<P: GaProblem>(
        engine: &mut Engine<P>,
    ) -> Result<RunSummary<P::Individual>, EngineError> {
        Self::run_with_cancel(engine, None, |_| {})
    }

    /// Runs the engine with an optional cancellation token and a
    /// per-generation observer.
    ///
    /// A `Running` engine is resumed from its next generation; any other
    /// state starts a fresh run. If `cancel` is set to `true`, the engine
    /// is stopped before the next generation is scheduled.
    pub fn run_with_cancel<P, F>(
        engine: &mut Engine<P>,
        cancel: Option<Arc<AtomicBool>>,
        mut on_generation: F,
    ) -> Result<RunSummary<P::Individual>, EngineError>
    where
        P: GaProblem,
        F: FnMut(&Snapshot<P::Individual>),
    {
        if engine.state() != RunState::Running {
            engine.initialize();
        }

        while engine.state() == RunState::Running {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    engine.stop();
                    break;
                }
            }

            let generation = engine.next_generation();
            let (best, best_fitness) = engine.step(generation)?;
            on_generation(&Snapshot {
                generation,
                best_fitness: best_fitness.to_f64(),
                best,
            });
        }

        let best = engine.best().cloned().ok_or(EngineError::InvalidState {
            operation: "summarize",
            state: engine.state(),
        })?;

        Ok(RunSummary {
            best_fitness: best.fitness(),
            best,
            generations: engine.next_generation(),
            state: engine.state(),
            progress: engine.progress().clone(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
