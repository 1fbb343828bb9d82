//! Error types surfaced by the engine.
//!
//! Invalid genomes are deliberately absent: a corrupt permutation is
//! scored with infinite fitness and removed by selection pressure instead
//! of aborting the run.

use crate::ga::RunState;
use thiserror::Error;

/// Errors returned by configuration and engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Parameters or problem data were rejected before any generation ran.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation is not allowed in the engine's current state.
    #[error("cannot {operation} while engine is {state}")]
    InvalidState {
        operation: &'static str,
        state: RunState,
    },

    /// `step` was called with a generation index other than the next one.
    #[error("generation {got} requested, expected {expected}")]
    GenerationOutOfOrder { expected: usize, got: usize },
}

impl EngineError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }
}
