//! Tuning surface for a single boss encounter.
//!
//! Durations are expressed in whole milliseconds so the structs deserialize
//! directly from designer-authored TOML.

use std::time::Duration;

use glam::Vec3;
use serde::Deserialize;

/// Aggregated tuning knobs for the hound encounter.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Immutable combat statistics.
    pub stats: EncounterStats,
    /// Tantrum overlay tuning.
    pub tantrum: TantrumTuning,
    /// Overclocked overlay tuning.
    pub overclocked: OverclockTuning,
    /// Distraction window tuning.
    pub distraction: DistractionTuning,
    /// Weak points created when the encounter starts.
    pub weak_points: Vec<WeakPointSpec>,
    /// Destroyed weak points required to defeat the boss. Zero disables the path.
    pub weak_points_to_destroy: u32,
    /// Length of one logical step in milliseconds.
    pub tick_interval_ms: u64,
    /// Delay between the attack cue and the damage landing.
    pub attack_windup_ms: u64,
    /// Probability that an attack also catches the companion for half damage.
    pub splash_chance: f32,
    /// Delay between defeat and the despawn request.
    pub defeat_delay_ms: u64,
    /// Seed for splash rolls.
    pub seed: u64,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            stats: EncounterStats::default(),
            tantrum: TantrumTuning::default(),
            overclocked: OverclockTuning::default(),
            distraction: DistractionTuning::default(),
            weak_points: vec![
                WeakPointSpec::new(120.0, Vec3::new(0.0, 1.8, 1.2)),
                WeakPointSpec::new(80.0, Vec3::new(-0.9, 1.0, 0.0)),
                WeakPointSpec::new(80.0, Vec3::new(0.9, 1.0, 0.0)),
            ],
            weak_points_to_destroy: 3,
            tick_interval_ms: 100,
            attack_windup_ms: 400,
            splash_chance: 0.2,
            defeat_delay_ms: 2_500,
            seed: 0x686f_756e_64,
        }
    }
}

impl EncounterConfig {
    /// Length of one logical step.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Attack wind-up.
    #[must_use]
    pub fn attack_windup(&self) -> Duration {
        Duration::from_millis(self.attack_windup_ms)
    }

    /// Delay before the despawn request.
    #[must_use]
    pub fn defeat_delay(&self) -> Duration {
        Duration::from_millis(self.defeat_delay_ms)
    }
}

/// Combat statistics fixed for the lifetime of an encounter.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EncounterStats {
    /// Maximum boss health; hosts size the boss health sink with it.
    pub max_health: f32,
    /// Damage of a basic attack before multipliers.
    pub attack_damage: f32,
    /// Distance at which the boss can attack.
    pub attack_range: f32,
    /// Minimum time between attacks in milliseconds.
    pub attack_interval_ms: u64,
    /// Chase speed in world units per second.
    pub move_speed: f32,
}

impl Default for EncounterStats {
    fn default() -> Self {
        Self {
            max_health: 500.0,
            attack_damage: 20.0,
            attack_range: 3.0,
            attack_interval_ms: 1_500,
            move_speed: 7.0,
        }
    }
}

impl EncounterStats {
    /// Minimum time between attacks.
    #[must_use]
    pub fn attack_interval(&self) -> Duration {
        Duration::from_millis(self.attack_interval_ms)
    }
}

/// Tantrum: a short burst of speed and damage at moderate health loss.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TantrumTuning {
    /// Health fraction at or below which the tantrum triggers.
    pub threshold: f32,
    /// How long the tantrum lasts.
    pub duration_ms: u64,
    /// Time after a tantrum ends before another may start.
    pub cooldown_ms: u64,
    /// Movement multiplier while raging.
    pub speed_multiplier: f32,
    /// Damage multiplier while raging.
    pub damage_multiplier: f32,
}

impl Default for TantrumTuning {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            duration_ms: 4_000,
            cooldown_ms: 12_000,
            speed_multiplier: 1.4,
            damage_multiplier: 1.5,
        }
    }
}

impl TantrumTuning {
    /// Tantrum length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Tantrum cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Overclocked: area pulses followed by a sustained frenzy at low health.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OverclockTuning {
    /// Health fraction at or below which overclocking triggers. Lower than the tantrum threshold.
    pub threshold: f32,
    /// Number of area pulses emitted on entry.
    pub pulse_count: u32,
    /// Delay between consecutive pulses.
    pub pulse_interval_ms: u64,
    /// Radius of each pulse around the boss.
    pub pulse_radius: f32,
    /// Pulse damage applied to the runner.
    pub pulse_damage_primary: f32,
    /// Reduced pulse damage applied to the companion.
    pub pulse_damage_companion: f32,
    /// Time spent in the elevated state after the last pulse.
    pub duration_ms: u64,
    /// Time after overclocking ends before it may start again.
    pub cooldown_ms: u64,
    /// Movement multiplier while overclocked.
    pub speed_multiplier: f32,
    /// Damage multiplier while overclocked.
    pub damage_multiplier: f32,
    /// Divides the attack interval while overclocked.
    pub attack_rate_multiplier: f32,
}

impl Default for OverclockTuning {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            pulse_count: 3,
            pulse_interval_ms: 600,
            pulse_radius: 8.0,
            pulse_damage_primary: 15.0,
            pulse_damage_companion: 8.0,
            duration_ms: 6_000,
            cooldown_ms: 20_000,
            speed_multiplier: 1.8,
            damage_multiplier: 2.0,
            attack_rate_multiplier: 1.5,
        }
    }
}

impl OverclockTuning {
    /// Delay between pulses.
    #[must_use]
    pub fn pulse_interval(&self) -> Duration {
        Duration::from_millis(self.pulse_interval_ms)
    }

    /// Sustain length after the pulses.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Overclocked cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Distraction: the companion throws a decoy that freezes the boss.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DistractionTuning {
    /// How long the boss stays distracted.
    pub duration_ms: u64,
    /// Time after a distraction starts before another may start.
    pub cooldown_ms: u64,
}

impl Default for DistractionTuning {
    fn default() -> Self {
        Self {
            duration_ms: 3_000,
            cooldown_ms: 8_000,
        }
    }
}

impl DistractionTuning {
    /// Distraction length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Distraction ability cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Template for one weak point.
#[derive(Clone, Debug, Deserialize)]
pub struct WeakPointSpec {
    /// Starting and maximum health.
    pub max_health: f32,
    /// Offset from the boss origin.
    #[serde(default)]
    pub offset: Vec3,
}

impl WeakPointSpec {
    /// Creates a weak point template.
    #[must_use]
    pub const fn new(max_health: f32, offset: Vec3) -> Self {
        Self { max_health, offset }
    }
}
