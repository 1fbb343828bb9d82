//! Traveling Salesman over permutations.
//!
//! A genome is a visiting order of all cities; its fitness is the length
//! of the closed tour. Corrupt orders (duplicate or missing city) score
//! `+inf` and are removed by selection instead of raising an error.

use crate::error::EngineError;
use crate::ga::operators::{
    invert_mutation, is_valid_permutation, order_segment_crossover, random_permutation,
    swap_mutation,
};
use crate::ga::{GaConfig, GaProblem, GenerationContext, Individual};
use rand::Rng;

/// A city location in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct City {
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &City) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// City coordinates. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TspInstance {
    cities: Vec<City>,
}

impl TspInstance {
    /// City count used by [`generate_default`](Self::generate_default).
    pub const DEFAULT_CITIES: usize = 30;

    /// Builds an instance from explicit coordinates.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] if `cities` is empty or a coordinate
    /// is not finite.
    pub fn new(cities: Vec<City>) -> Result<Self, EngineError> {
        let instance = Self { cities };
        instance.validate()?;
        Ok(instance)
    }

    /// Re-checks the invariants enforced by [`new`](Self::new).
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.cities.is_empty() {
            return Err(EngineError::config("routing instance has no cities"));
        }
        if self.cities.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(EngineError::config("city coordinates must be finite"));
        }
        Ok(())
    }

    /// Places `n` cities at integer coordinates within
    /// `[padding, width - padding] × [padding, height - padding]`.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] if `n` is zero or the padded area is
    /// empty.
    pub fn generate<R: Rng>(
        n: usize,
        width: u32,
        height: u32,
        padding: u32,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if width < padding.saturating_mul(2) || height < padding.saturating_mul(2) {
            return Err(EngineError::config(format!(
                "padding {padding} leaves no room in a {width}x{height} area"
            )));
        }
        let cities = (0..n)
            .map(|_| {
                City::new(
                    rng.random_range(padding..=width - padding) as f64,
                    rng.random_range(padding..=height - padding) as f64,
                )
            })
            .collect();
        Self::new(cities)
    }

    /// [`generate`](Self::generate) with 30 cities on a 1920×1080 area
    /// padded by 100.
    pub fn generate_default<R: Rng>(rng: &mut R) -> Result<Self, EngineError> {
        Self::generate(Self::DEFAULT_CITIES, 1920, 1080, 100, rng)
    }

    /// City coordinates in index order.
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Always `false` for a validated instance.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Distance between cities `a` and `b` by index.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.cities[a].distance(&self.cities[b])
    }

    /// Closed-tour length of `order`, or `+inf` if it is not a permutation
    /// of all city indices.
    pub fn tour_length(&self, order: &[usize]) -> f64 {
        if !is_valid_permutation(order, self.cities.len()) {
            return f64::INFINITY;
        }
        self.tour_edges(order)
            .map(|(a, b)| self.distance(a, b))
            .sum()
    }

    /// Consecutive city pairs of the tour, including the closing edge from
    /// the last city back to the first.
    pub fn tour_edges<'a>(&self, order: &'a [usize]) -> impl Iterator<Item = (usize, usize)> + 'a {
        let closing = match (order.last(), order.first()) {
            (Some(&last), Some(&first)) if order.len() > 1 => Some((last, first)),
            _ => None,
        };
        order
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    /// Greedy tour from `start`: repeatedly move to the nearest unvisited
    /// city. Ties go to the lowest index.
    ///
    /// # Panics
    ///
    /// Panics if `start >= self.len()`.
    pub fn nearest_neighbor_tour(&self, start: usize) -> Vec<usize> {
        let n = self.cities.len();
        let mut visited = vec![false; n];
        let mut tour = Vec::with_capacity(n);
        let mut current = start;
        visited[current] = true;
        tour.push(current);

        while tour.len() < n {
            let mut next = None;
            let mut next_dist = f64::INFINITY;
            for (candidate, seen) in visited.iter().enumerate() {
                if *seen {
                    continue;
                }
                let d = self.distance(current, candidate);
                if next.is_none() || d < next_dist {
                    next = Some(candidate);
                    next_dist = d;
                }
            }
            let Some(next) = next else { break };
            visited[next] = true;
            tour.push(next);
            current = next;
        }
        tour
    }
}

/// Visiting order of all cities.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    order: Vec<usize>,
    fitness: f64,
}

impl Tour {
    /// Wraps an order as an unevaluated individual.
    pub fn new(order: Vec<usize>) -> Self {
        Self {
            order,
            fitness: f64::INFINITY,
        }
    }

    /// City indices in visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Consumes the individual and returns its order.
    pub fn into_order(self) -> Vec<usize> {
        self.order
    }
}

impl Individual for Tour {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

/// Routing problem over a [`TspInstance`].
#[derive(Debug, Clone)]
pub struct TspProblem {
    instance: TspInstance,
    seed_fraction: f64,
}

impl TspProblem {
    /// Share of the initial population built by nearest-neighbour seeding.
    pub const DEFAULT_SEED_FRACTION: f64 = 0.2;

    pub fn new(instance: TspInstance) -> Self {
        Self {
            instance,
            seed_fraction: Self::DEFAULT_SEED_FRACTION,
        }
    }

    /// Sets the share of nearest-neighbour tours in the initial population.
    pub fn with_seed_fraction(mut self, fraction: f64) -> Self {
        self.seed_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// The problem instance.
    pub fn instance(&self) -> &TspInstance {
        &self.instance
    }

    /// Closed-tour length, `+inf` for a corrupt order.
    pub fn fitness(&self, order: &[usize]) -> f64 {
        self.instance.tour_length(order)
    }
}

impl GaProblem for TspProblem {
    type Individual = Tour;

    fn prepare(&mut self, _config: &GaConfig) -> Result<(), EngineError> {
        self.instance.validate()
    }

    fn create_individual<R: Rng>(&self, rng: &mut R) -> Tour {
        Tour::new(random_permutation(self.instance.len(), rng))
    }

    /// `floor(size × seed_fraction)` greedy tours from random start cities,
    /// the rest uniformly random.
    fn initial_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Tour> {
        let seeded = (size as f64 * self.seed_fraction) as usize;
        let n = self.instance.len();
        let mut population = Vec::with_capacity(size);
        for _ in 0..seeded {
            let start = rng.random_range(0..n);
            population.push(Tour::new(self.instance.nearest_neighbor_tour(start)));
        }
        while population.len() < size {
            population.push(self.create_individual(rng));
        }
        population
    }

    fn evaluate(&self, individual: &Tour) -> f64 {
        self.fitness(&individual.order)
    }

    fn crossover<R: Rng>(&self, parent1: &Tour, parent2: &Tour, rng: &mut R) -> Tour {
        Tour::new(order_segment_crossover(&parent1.order, &parent2.order, rng))
    }

    /// Decaying mutation: with probability `rate(g)` swap two cities and,
    /// independently, with probability `rate(g) / 5` reverse a segment.
    fn mutate<R: Rng>(&self, individual: &mut Tour, ctx: &GenerationContext, rng: &mut R) {
        let rate = ctx.decayed_mutation_rate();
        if rng.random_bool(rate) {
            swap_mutation(&mut individual.order, rng);
            individual.fitness = f64::INFINITY;
        }
        if rng.random_bool(rate / 5.0) {
            invert_mutation(&mut individual.order, rng);
            individual.fitness = f64::INFINITY;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Engine;
    use crate::random::create_rng;

    fn rectangle() -> TspInstance {
        TspInstance::new(vec![
            City::new(0.0, 0.0),
            City::new(0.0, 3.0),
            City::new(4.0, 3.0),
            City::new(4.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_rectangle_tour_length() {
        let inst = rectangle();
        for order in [
            vec![0, 1, 2, 3],
            vec![3, 2, 1, 0],
            vec![1, 2, 3, 0],
            vec![2, 1, 0, 3],
        ] {
            assert!((inst.tour_length(&order) - 14.0).abs() < 1e-12, "{order:?}");
        }
        // Crossing the diagonals: 3 + 5 + 3 + 5
        assert!((inst.tour_length(&[0, 1, 3, 2]) - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_engine_rejects_unvalidated_instance() {
        // Struct literals stand in for instances that skipped `new`.
        let empty = TspInstance { cities: vec![] };
        let nan = TspInstance {
            cities: vec![City::new(0.0, 0.0), City::new(f64::NAN, 1.0)],
        };
        for instance in [empty, nan] {
            let result = Engine::new(TspProblem::new(instance), GaConfig::routing());
            assert!(matches!(result, Err(EngineError::Configuration(_))));
        }
    }

    #[test]
    #[should_panic]
    fn test_nearest_neighbor_start_out_of_range_panics() {
        rectangle().nearest_neighbor_tour(4);
    }

    #[test]
    fn test_invalid_order_is_infinite() {
        let inst = rectangle();
        assert!(inst.tour_length(&[0, 1, 1, 2]).is_infinite());
        assert!(inst.tour_length(&[0, 1, 2]).is_infinite());
        assert!(inst.tour_length(&[0, 1, 2, 7]).is_infinite());
    }

    #[test]
    fn test_single_city_tour_is_zero() {
        let inst = TspInstance::new(vec![City::new(5.0, 5.0)]).unwrap();
        assert_eq!(inst.tour_length(&[0]), 0.0);
        assert_eq!(inst.tour_edges(&[0]).count(), 0);
    }

    #[test]
    fn test_tour_edges_close_the_loop() {
        let inst = rectangle();
        let edges: Vec<_> = inst.tour_edges(&[2, 0, 3, 1]).collect();
        assert_eq!(edges, vec![(2, 0), (0, 3), (3, 1), (1, 2)]);
    }

    #[test]
    fn test_fitness_is_idempotent() {
        let problem = TspProblem::new(rectangle());
        let tour = Tour::new(vec![1, 3, 0, 2]);
        assert_eq!(problem.evaluate(&tour), problem.evaluate(&tour));
    }

    #[test]
    fn test_empty_instance_rejected() {
        assert!(matches!(
            TspInstance::new(vec![]),
            Err(EngineError::Configuration(_))
        ));
        assert!(TspInstance::new(vec![City::new(f64::NAN, 0.0)]).is_err());
    }

    #[test]
    fn test_generate_within_padding() {
        let mut rng = create_rng(42);
        let inst = TspInstance::generate(50, 800, 600, 100, &mut rng).unwrap();
        assert_eq!(inst.len(), 50);
        for c in inst.cities() {
            assert!((100.0..=700.0).contains(&c.x));
            assert!((100.0..=500.0).contains(&c.y));
            assert_eq!(c.x.fract(), 0.0);
        }
        assert!(TspInstance::generate(5, 100, 100, 60, &mut rng).is_err());
        assert!(TspInstance::generate(0, 100, 100, 10, &mut rng).is_err());
        assert_eq!(TspInstance::generate_default(&mut rng).unwrap().len(), 30);
    }

    #[test]
    fn test_nearest_neighbor_on_line() {
        let inst = TspInstance::new(
            [0.0, 10.0, 1.0, 3.0, 6.0]
                .iter()
                .map(|&x| City::new(x, 0.0))
                .collect(),
        )
        .unwrap();
        // From x=1: 0 (d=1), then 3, 6, 10
        assert_eq!(inst.nearest_neighbor_tour(2), vec![2, 0, 3, 4, 1]);
    }

    #[test]
    fn test_nearest_neighbor_is_valid_permutation() {
        let mut rng = create_rng(5);
        let inst = TspInstance::generate_default(&mut rng).unwrap();
        for start in 0..inst.len() {
            let tour = inst.nearest_neighbor_tour(start);
            assert_eq!(tour[0], start);
            assert!(is_valid_permutation(&tour, inst.len()));
        }
    }

    #[test]
    fn test_initial_population_mix() {
        let mut rng = create_rng(17);
        let inst = TspInstance::generate_default(&mut rng).unwrap();
        let problem = TspProblem::new(inst.clone());
        let population = problem.initial_population(100, &mut rng);

        assert_eq!(population.len(), 100);
        assert!(population.iter().all(|t| is_valid_permutation(t.order(), 30)));
        for tour in &population[..20] {
            assert_eq!(tour.order(), inst.nearest_neighbor_tour(tour.order()[0]).as_slice());
        }
    }

    #[test]
    fn test_seed_fraction_zero_is_all_random() {
        let mut rng = create_rng(17);
        let problem = TspProblem::new(rectangle()).with_seed_fraction(0.0);
        assert_eq!(problem.initial_population(10, &mut rng).len(), 10);
    }

    #[test]
    fn test_mutation_keeps_permutation_valid() {
        let problem = TspProblem::new(rectangle());
        let mut rng = create_rng(3);
        let ctx = GenerationContext {
            generation: 0,
            max_generations: 10,
            mutation_rate: 1.0,
        };
        let mut tour = Tour::new(vec![0, 1, 2, 3]);
        for _ in 0..200 {
            problem.mutate(&mut tour, &ctx, &mut rng);
            assert!(is_valid_permutation(tour.order(), 4));
        }
    }

    #[test]
    fn test_mutation_vanishes_at_final_generation() {
        let problem = TspProblem::new(rectangle());
        let mut rng = create_rng(3);
        let ctx = GenerationContext {
            generation: 10,
            max_generations: 10,
            mutation_rate: 1.0,
        };
        let mut tour = Tour::new(vec![0, 1, 2, 3]);
        for _ in 0..100 {
            problem.mutate(&mut tour, &ctx, &mut rng);
        }
        assert_eq!(tour.order(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_engine_finds_rectangle_optimum() {
        let problem = TspProblem::new(rectangle());
        let config = GaConfig::routing()
            .with_population_size(20)
            .with_elitism_count(2)
            .with_max_generations(30)
            .with_seed(1);
        let mut engine = Engine::new(problem, config).unwrap();
        engine.initialize();
        let mut fitness = f64::INFINITY;
        for gen in 0..30 {
            fitness = engine.step(gen).unwrap().1;
        }
        assert!((fitness - 14.0).abs() < 1e-9, "got {fitness}");
    }

    #[test]
    fn test_engine_improves_random_instance() {
        let mut rng = create_rng(2024);
        let inst = TspInstance::generate(25, 1000, 1000, 50, &mut rng).unwrap();
        let problem = TspProblem::new(inst).with_seed_fraction(0.0);
        let config = GaConfig::routing().with_max_generations(150).with_seed(7);

        let mut engine = Engine::new(problem, config).unwrap();
        engine.initialize();
        let initial = engine.best().map(|b| b.fitness()).unwrap();
        let mut last = initial;
        for gen in 0..150 {
            let (best, fitness) = engine.step(gen).unwrap();
            assert!(is_valid_permutation(best.order(), 25));
            assert!(fitness <= last);
            last = fitness;
        }
        assert!(last < initial * 0.8, "initial {initial}, final {last}");
    }
}
