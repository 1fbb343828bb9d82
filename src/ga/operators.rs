//! Encoding-level genetic operators.
//!
//! Free functions over plain slices, shared by the problem variants in
//! [`crate::problems`]. They carry no probability gates; callers decide
//! when to apply them.
//!
//! # Inclusion vectors (`&[bool]`, or any `Clone` gene)
//!
//! - [`two_point_crossover`]: Splice the middle section of parent2 into parent1
//! - [`flip_bits`]: Flip bits at independently drawn positions
//!
//! # Permutations (`&[usize]`)
//!
//! - [`order_segment_crossover`]: Copy a segment from parent1, fill the rest
//!   in parent2's order, which always yields a valid permutation
//! - [`swap_mutation`]: Exchange two distinct positions
//! - [`invert_mutation`]: Reverse a contiguous segment (2-opt move)
//! - [`random_permutation`], [`is_valid_permutation`]
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use rand::seq::index;
use rand::seq::SliceRandom;
use rand::Rng;

// ============================================================================
// Inclusion-vector operators
// ============================================================================

/// Two-point crossover.
///
/// Draws two cut points uniformly from `0..n`, sorts them as `(p1, p2)` and
/// returns `parent1[..p1] ++ parent2[p1..p2] ++ parent1[p2..]`. The child
/// always has the parents' length.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn two_point_crossover<T: Clone, R: Rng>(parent1: &[T], parent2: &[T], rng: &mut R) -> Vec<T> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n == 0 {
        return Vec::new();
    }

    let (p1, p2) = sorted_pair(rng.random_range(0..n), rng.random_range(0..n));

    let mut child = Vec::with_capacity(n);
    child.extend_from_slice(&parent1[..p1]);
    child.extend_from_slice(&parent2[p1..p2]);
    child.extend_from_slice(&parent1[p2..]);
    child
}

/// Flips `count` bits at positions drawn independently with replacement.
///
/// A position drawn twice flips back, so fewer than `count` distinct bits
/// may change.
pub fn flip_bits<R: Rng>(genes: &mut [bool], count: usize, rng: &mut R) {
    let n = genes.len();
    if n == 0 {
        return;
    }
    for _ in 0..count {
        let i = rng.random_range(0..n);
        genes[i] = !genes[i];
    }
}

// ============================================================================
// Permutation operators
// ============================================================================

/// Order-preserving segment crossover for permutations.
///
/// # Algorithm
///
/// 1. Draw two distinct cut points and sort them as `start < end`
/// 2. Copy `parent1[start..end]` to the same positions of the child
/// 3. Walk parent2 from its first position; every city not in the copied
///    segment is written at a fill cursor that starts at `end` and wraps to
///    0 when it reaches `n`
///
/// The cursor fills `end..n` then `0..start`, so each city appears exactly
/// once when both parents are valid permutations.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths.
pub fn order_segment_crossover<R: Rng>(parent1: &[usize], parent2: &[usize], rng: &mut R) -> Vec<usize> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < 2 {
        return parent1.to_vec();
    }

    let (start, end) = distinct_cut_points(n, rng);
    segment_fill(parent1, parent2, start, end)
}

/// Builds one child from a fixed segment `[start, end)` of `template`,
/// filling the remaining positions in `donor` order.
pub(crate) fn segment_fill(template: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = template.len();
    let mut child = vec![usize::MAX; n];
    let mut in_segment = vec![false; n];

    for i in start..end {
        child[i] = template[i];
        if let Some(seen) = in_segment.get_mut(template[i]) {
            *seen = true;
        }
    }

    let mut pos = end;
    for &city in donor {
        if in_segment.get(city).copied().unwrap_or(false) {
            continue;
        }
        if pos >= n {
            pos = 0;
        }
        if pos == start && start < end {
            // Only reachable with corrupt parents: the free slots are used up.
            break;
        }
        child[pos] = city;
        pos += 1;
    }

    child
}

/// Swap mutation: exchange two distinct random positions.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let (i, j) = distinct_cut_points(n, rng);
    perm.swap(i, j);
}

/// Invert mutation: reverse `perm[start..end]` for two distinct, sorted
/// cut points.
///
/// # Complexity
/// O(n) worst case for segment reversal
pub fn invert_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let (start, end) = distinct_cut_points(n, rng);
    perm[start..end].reverse();
}

/// Uniformly random permutation of `0..n`.
pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// Returns `true` if `perm` contains every index of `0..n` exactly once.
pub fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in perm {
        match seen.get_mut(v) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

// ============================================================================
// Helpers
// ============================================================================

/// Two distinct positions from `0..n`, sorted ascending. Requires `n >= 2`.
fn distinct_cut_points<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let picks = index::sample(rng, n, 2);
    sorted_pair(picks.index(0), picks.index(1))
}

fn sorted_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
