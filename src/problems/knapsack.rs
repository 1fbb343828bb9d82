//! Target matching over inclusion vectors.
//!
//! Choose a subset of items whose values sum as close as possible to a
//! target. Overshooting is penalized more than undershooting, which steers
//! the search toward subsets at or just below the target.

use crate::error::EngineError;
use crate::ga::operators::{flip_bits, two_point_crossover};
use crate::ga::{check_penalty_factor, GaConfig, GaProblem, GenerationContext, Individual};
use rand::seq::index;
use rand::Rng;
use std::ops::RangeInclusive;

/// Item values and the target sum. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnapsackInstance {
    values: Vec<u32>,
    target: u64,
}

impl KnapsackInstance {
    /// Item count used by [`generate_default`](Self::generate_default).
    pub const DEFAULT_ITEMS: usize = 100;
    /// Value range used by [`generate_default`](Self::generate_default).
    pub const DEFAULT_VALUE_RANGE: RangeInclusive<u32> = 128..=2048;
    /// Fraction of items summed into the target by default.
    pub const DEFAULT_TARGET_FRACTION: f64 = 0.7;

    /// Builds an instance from explicit values and target.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] if `values` is empty or contains a zero.
    pub fn new(values: Vec<u32>, target: u64) -> Result<Self, EngineError> {
        let instance = Self { values, target };
        instance.validate()?;
        Ok(instance)
    }

    /// Re-checks the invariants enforced by [`new`](Self::new).
    ///
    /// Deserialized instances skip the constructor, so the engine calls
    /// this before accepting one.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.values.is_empty() {
            return Err(EngineError::config("target-matching instance has no items"));
        }
        if self.values.contains(&0) {
            return Err(EngineError::config("item values must be positive"));
        }
        Ok(())
    }

    /// Generates `n` distinct random values from `value_range` and a target
    /// equal to the sum of a random subset of `floor(n × target_fraction)`
    /// items.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] if `n` is zero, the range holds fewer
    /// than `n` distinct positive values, or `target_fraction` is outside
    /// `[0, 1]`.
    pub fn generate<R: Rng>(
        n: usize,
        value_range: RangeInclusive<u32>,
        target_fraction: f64,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&target_fraction) {
            return Err(EngineError::config("target_fraction must be within [0, 1]"));
        }
        let low = (*value_range.start()).max(1);
        let high = *value_range.end();
        let span = if high >= low {
            (high - low) as usize + 1
        } else {
            0
        };
        if n == 0 || span < n {
            return Err(EngineError::config(format!(
                "cannot draw {n} distinct item values from {low}..={high}"
            )));
        }

        let values: Vec<u32> = index::sample(rng, span, n)
            .into_iter()
            .map(|offset| low + offset as u32)
            .collect();

        let subset_len = (n as f64 * target_fraction) as usize;
        let target = index::sample(rng, n, subset_len)
            .into_iter()
            .map(|i| values[i] as u64)
            .sum();

        Self::new(values, target)
    }

    /// [`generate`](Self::generate) with 100 items in `[128, 2048]` and a
    /// 70% target subset.
    pub fn generate_default<R: Rng>(rng: &mut R) -> Result<Self, EngineError> {
        Self::generate(
            Self::DEFAULT_ITEMS,
            Self::DEFAULT_VALUE_RANGE,
            Self::DEFAULT_TARGET_FRACTION,
            rng,
        )
    }

    /// Item values in order.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Target sum.
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a validated instance.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of the values of included items.
    pub fn subset_sum(&self, genes: &[bool]) -> u64 {
        self.values
            .iter()
            .zip(genes)
            .filter(|&(_, &included)| included)
            .map(|(&v, _)| v as u64)
            .sum()
    }
}

/// One boolean per item; `true` means the item is included.
#[derive(Debug, Clone, PartialEq)]
pub struct InclusionVector {
    genes: Vec<bool>,
    fitness: f64,
}

impl InclusionVector {
    /// Wraps genes as an unevaluated individual.
    pub fn new(genes: Vec<bool>) -> Self {
        Self {
            genes,
            fitness: f64::INFINITY,
        }
    }

    /// Inclusion flags, one per item.
    pub fn genes(&self) -> &[bool] {
        &self.genes
    }

    /// Consumes the individual and returns its genes.
    pub fn into_genes(self) -> Vec<bool> {
        self.genes
    }

    /// Indices of included items.
    pub fn included(&self) -> impl Iterator<Item = usize> + '_ {
        self.genes
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
    }
}

impl Individual for InclusionVector {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

/// Target matching problem over a [`KnapsackInstance`].
#[derive(Debug, Clone)]
pub struct KnapsackProblem {
    instance: KnapsackInstance,
    penalty_factor: f64,
    inclusion_probability: f64,
}

impl KnapsackProblem {
    /// Default overshoot multiplier.
    pub const DEFAULT_PENALTY_FACTOR: f64 = 2.0;

    /// Creates the problem with an overshoot penalty of 2 and a 70%
    /// inclusion probability for initial genomes.
    pub fn new(instance: KnapsackInstance) -> Self {
        Self {
            instance,
            penalty_factor: Self::DEFAULT_PENALTY_FACTOR,
            inclusion_probability: KnapsackInstance::DEFAULT_TARGET_FRACTION,
        }
    }

    /// Sets the overshoot multiplier for standalone evaluation.
    ///
    /// An [`Engine`](crate::ga::Engine) replaces it with
    /// [`GaConfig::penalty_factor`] when the problem is handed over.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] unless `factor` is positive and finite.
    pub fn with_penalty_factor(mut self, factor: f64) -> Result<Self, EngineError> {
        check_penalty_factor(factor)?;
        self.penalty_factor = factor;
        Ok(self)
    }

    /// Sets the probability that each item is included in an initial genome.
    pub fn with_inclusion_probability(mut self, p: f64) -> Self {
        self.inclusion_probability = p.clamp(0.0, 1.0);
        self
    }

    /// The problem instance.
    pub fn instance(&self) -> &KnapsackInstance {
        &self.instance
    }

    /// The overshoot multiplier.
    pub fn penalty_factor(&self) -> f64 {
        self.penalty_factor
    }

    /// Penalized distance from the target: `(S − target) × penalty` when
    /// the subset sum `S` overshoots, `target − S` otherwise.
    pub fn fitness(&self, genes: &[bool]) -> f64 {
        let sum = self.instance.subset_sum(genes);
        let target = self.instance.target;
        if sum > target {
            (sum - target) as f64 * self.penalty_factor
        } else {
            (target - sum) as f64
        }
    }

    /// Subset sum of a genome.
    pub fn selected_sum(&self, genome: &InclusionVector) -> u64 {
        self.instance.subset_sum(&genome.genes)
    }

    /// Signed distance `S − target`; positive means overshoot.
    pub fn deviation(&self, genome: &InclusionVector) -> i64 {
        self.selected_sum(genome) as i64 - self.instance.target as i64
    }
}

impl GaProblem for KnapsackProblem {
    type Individual = InclusionVector;

    fn prepare(&mut self, config: &GaConfig) -> Result<(), EngineError> {
        self.instance.validate()?;
        check_penalty_factor(config.penalty_factor)?;
        self.penalty_factor = config.penalty_factor;
        Ok(())
    }

    fn create_individual<R: Rng>(&self, rng: &mut R) -> InclusionVector {
        let genes = (0..self.instance.len())
            .map(|_| rng.random_bool(self.inclusion_probability))
            .collect();
        InclusionVector::new(genes)
    }

    fn evaluate(&self, individual: &InclusionVector) -> f64 {
        self.fitness(&individual.genes)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &InclusionVector,
        parent2: &InclusionVector,
        rng: &mut R,
    ) -> InclusionVector {
        InclusionVector::new(two_point_crossover(&parent1.genes, &parent2.genes, rng))
    }

    /// Two independent gates: with probability `mutation_rate`, flip
    /// `max(1, floor(n × mutation_rate))` randomly drawn positions.
    fn mutate<R: Rng>(&self, individual: &mut InclusionVector, ctx: &GenerationContext, rng: &mut R) {
        let rate = ctx.mutation_rate.clamp(0.0, 1.0);
        if !rng.random_bool(rate) {
            return;
        }
        let n = individual.genes.len();
        let count = ((n as f64 * rate) as usize).max(1);
        flip_bits(&mut individual.genes, count, rng);
        individual.fitness = f64::INFINITY;
    }
}
