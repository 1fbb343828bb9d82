//! Tournament selection for the GA.
//!
//! A tournament draws a sample of distinct individuals and returns the one
//! with the lowest fitness. Larger samples mean stronger selection
//! pressure; the adaptive variant widens the sample as the run progresses
//! to shift from exploration toward exploitation.
//!
//! # References
//!
//! - Miller & Goldberg (1995), "Genetic Algorithms, Tournament Selection,
//!   and the Effects of Noise"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::types::Individual;
use rand::seq::index;
use rand::Rng;

/// Selection strategy for choosing parents.
///
/// All strategies assume **minimization** (lower fitness = better).
///
/// # Examples
///
/// ```
/// use u_evolve::ga::Selection;
///
/// // Fixed tournament of 5
/// let sel = Selection::Tournament(5);
/// assert_eq!(sel.tournament_size(0, 50), 5);
///
/// // Starts at 5, grows by one every 50 generations, capped at pop/2
/// let sel = Selection::AdaptiveTournament { base: 5, growth_interval: 50 };
/// assert_eq!(sel.tournament_size(120, 100), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Pick `k` distinct individuals at random, select the best.
    ///
    /// `k` is clamped to the population size.
    Tournament(usize),

    /// Tournament whose size grows with the generation index:
    /// `min(base + generation / growth_interval, population_size / 2)`.
    AdaptiveTournament {
        /// Tournament size at generation 0.
        base: usize,
        /// Generations between each increment of the tournament size.
        growth_interval: usize,
    },
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(5)
    }
}

impl Selection {
    /// Effective tournament size for a generation and population size.
    ///
    /// Never exceeds `population_size` and is at least 1 for a non-empty
    /// population.
    pub fn tournament_size(&self, generation: usize, population_size: usize) -> usize {
        let k = match *self {
            Selection::Tournament(k) => k.min(population_size),
            Selection::AdaptiveTournament {
                base,
                growth_interval,
            } => {
                let growth = generation.checked_div(growth_interval).unwrap_or(0);
                (base + growth).min(population_size / 2)
            }
        };
        k.clamp(1, population_size.max(1))
    }

    /// Select a parent index from the population.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<I: Individual, R: Rng>(
        &self,
        population: &[I],
        generation: usize,
        rng: &mut R,
    ) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );
        let k = self.tournament_size(generation, population.len());
        tournament(population, k, rng)
    }

    /// Select two parents with independent tournaments.
    ///
    /// The same individual may win both.
    pub fn select_pair<I: Individual, R: Rng>(
        &self,
        population: &[I],
        generation: usize,
        rng: &mut R,
    ) -> (usize, usize) {
        let first = self.select(population, generation, rng);
        let second = self.select(population, generation, rng);
        (first, second)
    }
}

/// Tournament selection without replacement: sample `k` distinct indices,
/// return the one with the lowest fitness.
fn tournament<I: Individual, R: Rng>(population: &[I], k: usize, rng: &mut R) -> usize {
    let n = population.len();
    let k = k.clamp(1, n);

    let mut contenders = index::sample(rng, n, k).into_iter();
    let mut best_idx = contenders
        .next()
        .expect("sample of size >= 1 yields at least one index");
    for idx in contenders {
        if population[idx].fitness() < population[best_idx].fitness() {
            best_idx = idx;
        }
    }
    best_idx
}
