//! Compressed best-fitness history.
//!
//! A [`ProgressRecord`] keeps one `(generation, fitness)` entry per change
//! of the best fitness, not one per generation.

use std::fmt;

/// One change point in the best-fitness history.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressEntry {
    /// Generation at which the value was first observed.
    pub generation: usize,
    /// Best fitness of that generation.
    pub fitness: f64,
}

/// Ordered sequence of best-fitness change points.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressRecord {
    entries: Vec<ProgressEntry>,
}

impl ProgressRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `(generation, fitness)` unless `fitness` equals the last
    /// recorded value. Returns whether an entry was added.
    pub fn record(&mut self, generation: usize, fitness: f64) -> bool {
        if self.entries.last().is_some_and(|last| last.fitness == fitness) {
            return false;
        }
        self.entries.push(ProgressEntry {
            generation,
            fitness,
        });
        true
    }

    /// The recorded entries, oldest first.
    pub fn entries(&self) -> &[ProgressEntry] {
        &self.entries
    }

    /// First recorded fitness, if any.
    pub fn initial(&self) -> Option<f64> {
        self.entries.first().map(|e| e.fitness)
    }

    /// Most recent recorded fitness, if any.
    pub fn latest(&self) -> Option<f64> {
        self.entries.last().map(|e| e.fitness)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Renders a plain-text summary table.
///
/// ```
/// use u_evolve::ga::ProgressRecord;
///
/// let mut progress = ProgressRecord::new();
/// progress.record(0, 120.0);
/// progress.record(4, 36.5);
/// let report = progress.to_string();
/// assert!(report.contains("Initial: 120.00"));
/// ```
impl fmt::Display for ProgressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Summary")?;
        if let Some(initial) = self.initial() {
            writeln!(f, "Initial: {initial:.2}")?;
        }
        writeln!(f, "{:-<40}", "")?;
        writeln!(f, "{:<12}| {:>14}", "Generation", "Best fitness")?;
        writeln!(f, "{:-<40}", "")?;
        for entry in &self.entries {
            writeln!(f, "{:<12}| {:>14.2}", entry.generation, entry.fitness)?;
        }
        write!(f, "{:-<40}", "")
    }
}

impl<'a> IntoIterator for &'a ProgressRecord {
    type Item = &'a ProgressEntry;
    type IntoIter = std::slice::Iter<'a, ProgressEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
