#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic weighted template selection.

use hound_chase_core::{Fault, TemplateId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Template paired with its relative spawn weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnTableEntry {
    /// Template selected when the entry wins the draw.
    pub template: TemplateId,
    /// Relative weight. Negative and non-finite weights count as zero.
    pub weight: f32,
}

impl SpawnTableEntry {
    /// Creates a new spawn table entry.
    #[must_use]
    pub const fn new(template: TemplateId, weight: f32) -> Self {
        Self { template, weight }
    }

    fn effective_weight(&self) -> f32 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// Seeded cumulative-weight selector.
#[derive(Clone, Debug)]
pub struct WeightedSelector {
    rng: ChaCha8Rng,
}

impl WeightedSelector {
    /// Creates a selector whose draw sequence is fixed by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restarts the draw sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Picks a template with probability proportional to its weight.
    ///
    /// Draws uniformly in `[0, total)` and returns the first entry whose
    /// cumulative weight exceeds the draw, so zero-weight entries are never
    /// chosen. Returns `None` when the table is empty or carries no weight.
    pub fn select(&mut self, entries: &[SpawnTableEntry]) -> Option<TemplateId> {
        let total: f32 = entries.iter().map(SpawnTableEntry::effective_weight).sum();
        if entries.is_empty() || !total.is_finite() || total <= 0.0 {
            let _ = Fault::InvalidConfiguration(format!(
                "spawn table of {} entries has total weight {total}",
                entries.len()
            ))
            .report();
            return None;
        }

        let draw = self.rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        let mut last_weighted = None;
        for entry in entries {
            let weight = entry.effective_weight();
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            last_weighted = Some(entry.template);
            if cumulative > draw {
                return Some(entry.template);
            }
        }

        // Rounding can leave the final cumulative sum a hair below the draw.
        last_weighted
    }
}
