//! Loot spawn policy
//!
//! Decides how many lost objects to create on a tick. The chance to spawn
//! grows with the time since the last spawn, and the amount is bounded by
//! the shortage of loot relative to dogs on the map.

use serde::{Deserialize, Serialize};

/// Spawn policy parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootGeneratorConfig {
    /// Base interval in milliseconds
    pub period_ms: f64,
    /// Probability of spawning within one base interval
    pub probability: f64,
    /// Scale the spawn chance by a uniform random factor each tick
    #[serde(default)]
    pub jitter: bool,
}

impl Default for LootGeneratorConfig {
    fn default() -> Self {
        Self {
            period_ms: 5000.0,
            probability: 0.5,
            jitter: false,
        }
    }
}

/// Per-session spawn policy state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootGenerator {
    config: LootGeneratorConfig,
    time_without_loot_ms: f64,
}

impl LootGenerator {
    pub fn new(config: LootGeneratorConfig) -> Self {
        Self {
            config,
            time_without_loot_ms: 0.0,
        }
    }

    pub fn config(&self) -> &LootGeneratorConfig {
        &self.config
    }

    /// Time accumulated since the last spawn
    pub fn time_without_loot_ms(&self) -> f64 {
        self.time_without_loot_ms
    }

    pub fn set_time_without_loot_ms(&mut self, ms: f64) {
        self.time_without_loot_ms = ms;
    }

    /// Number of lost objects to spawn after `delta_ms`.
    ///
    /// `random_factor` in [0, 1] scales the spawn chance; pass 1.0 for the
    /// deterministic policy.
    pub fn generate(
        &mut self,
        delta_ms: f64,
        loot_count: usize,
        looter_count: usize,
        random_factor: f64,
    ) -> usize {
        self.time_without_loot_ms += delta_ms;
        let shortage = looter_count.saturating_sub(loot_count);
        if shortage == 0 || self.config.period_ms <= 0.0 {
            return 0;
        }

        let ratio = self.time_without_loot_ms / self.config.period_ms;
        let chance = ((1.0 - (1.0 - self.config.probability).powf(ratio)) * random_factor)
            .clamp(0.0, 1.0);
        let generated = (shortage as f64 * chance).round() as usize;
        if generated > 0 {
            self.time_without_loot_ms = 0.0;
        }
        generated
    }
}
