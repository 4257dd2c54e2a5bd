use std::{fs, path::Path};

use anyhow::{Context, Result};
use hound_chase_system_boss_encounter::EncounterConfig;
use hound_chase_system_obstacle_field::FieldConfig;
use serde::Deserialize;

/// Full configuration of a scripted chase run.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ChaseConfig {
    pub(crate) field: FieldConfig,
    pub(crate) encounter: EncounterConfig,
    pub(crate) runner: RunnerTuning,
}

/// Script followed by the runner and companion.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct RunnerTuning {
    /// Forward speed in world units per second.
    pub(crate) speed: f32,
    pub(crate) max_health: f32,
    pub(crate) companion_health: f32,
    /// Host frame length; several frames may fit in one encounter step.
    pub(crate) frame_ms: u64,
    /// Frames between attempts to smash the nearest obstacle into a trap.
    pub(crate) smash_every: u32,
    /// Travelled distance at which the boss appears.
    pub(crate) boss_checkpoint: f32,
    /// Distance behind the runner at which the boss appears.
    pub(crate) boss_spawn_behind: f32,
    /// Frames between runner strikes at the boss.
    pub(crate) strike_every: u32,
    pub(crate) strike_damage: f32,
    pub(crate) weak_point_damage: f32,
    /// Boss distance below which the companion throws a decoy.
    pub(crate) distraction_range: f32,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            speed: 6.0,
            max_health: 300.0,
            companion_health: 120.0,
            frame_ms: 50,
            smash_every: 40,
            boss_checkpoint: 150.0,
            boss_spawn_behind: 12.0,
            strike_every: 10,
            strike_damage: 12.0,
            weak_point_damage: 15.0,
            distraction_range: 4.0,
        }
    }
}

/// Loads the optional TOML file and applies the command-line seed.
pub(crate) fn load(path: Option<&Path>, seed: Option<u64>) -> Result<ChaseConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read chase config at {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("failed to parse chase config at {}", path.display()))?
        }
        None => ChaseConfig::default(),
    };

    if let Some(seed) = seed {
        config.field.seed = seed;
        config.encounter.seed = seed.rotate_left(17);
    }
    Ok(config)
}

fn parse(contents: &str) -> Result<ChaseConfig> {
    toml::from_str(contents).context("invalid chase config toml")
}
