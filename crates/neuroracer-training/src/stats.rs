//! Per-generation fitness statistics.

use serde::{Deserialize, Serialize};

/// Read-only summary of one evaluated generation.
///
/// This is also the payload broadcast to listeners once a generation completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f32,
    pub avg_fitness: f32,
    pub worst_fitness: f32,
    pub population_size: usize,
}

impl GenerationStats {
    /// Summarizes the fitness scores of one generation.
    ///
    /// Returns `None` if `scores` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use neuroracer_training::stats::GenerationStats;
    /// let stats = GenerationStats::from_scores(3, &[26.0, 1200.0, 500.0, 274.0]).unwrap();
    /// assert_eq!(stats.generation, 3);
    /// assert_eq!(stats.best_fitness, 1200.0);
    /// assert_eq!(stats.worst_fitness, 26.0);
    /// assert_eq!(stats.avg_fitness, 500.0);
    /// assert_eq!(stats.population_size, 4);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_scores(generation: usize, scores: &[f32]) -> Option<Self> {
        let (&first, rest) = scores.split_first()?;
        let (best, worst, sum) = rest
            .iter()
            .fold((first, first, first), |(best, worst, sum), &s| {
                (best.max(s), worst.min(s), sum + s)
            });
        Some(Self {
            generation,
            best_fitness: best,
            avg_fitness: sum / scores.len() as f32,
            worst_fitness: worst,
            population_size: scores.len(),
        })
    }
}
