#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Obstacle field that streams pooled obstacles around the runner.
//!
//! The field keeps obstacles ahead of a moving reference point. Forward
//! progress accumulates into a distance counter; once the counter reaches
//! the spacing dictated by the difficulty curve a template is drawn from the
//! weighted spawn table and placed in a random lane. Obstacles that fall far
//! enough behind the reference are released back to the pool.

use std::time::Duration;

use glam::{Quat, Vec3};
use hound_chase_core::{Event, Fault, InstanceHandle};
use hound_chase_system_selection::{SpawnTableEntry, WeightedSelector};
use hound_chase_world::PooledInstancePool;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

const LANE_STREAM: u64 = 0x6c61_6e65_7374_726d;

/// Spacing floor; a stationary reference never accumulates enough to spawn.
const MIN_SPACING: f32 = 0.01;

/// Spacing between spawns as a function of elapsed run time.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DifficultyCurve {
    /// Distance between obstacles when the run starts.
    pub start_interval: f32,
    /// Tightest spacing reached once the ramp completes.
    pub min_interval: f32,
    /// Run time in milliseconds over which spacing shrinks to the minimum.
    pub ramp_ms: u64,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            start_interval: 18.0,
            min_interval: 6.0,
            ramp_ms: 120_000,
        }
    }
}

impl DifficultyCurve {
    /// Spawn spacing after `elapsed` run time.
    #[must_use]
    pub fn interval_at(&self, elapsed: Duration) -> f32 {
        let start = if self.start_interval.is_finite() {
            self.start_interval.max(MIN_SPACING)
        } else {
            MIN_SPACING
        };
        let end = if self.min_interval.is_nan() {
            start
        } else {
            self.min_interval.clamp(MIN_SPACING, start)
        };
        if self.ramp_ms == 0 {
            return end;
        }
        let progress = (elapsed.as_millis() as f32 / self.ramp_ms as f32).clamp(0.0, 1.0);
        start + (end - start) * progress
    }

    fn is_valid(&self) -> bool {
        [self.start_interval, self.min_interval]
            .iter()
            .all(|interval| interval.is_finite() && *interval >= MIN_SPACING)
    }
}

/// Placement and cadence tuning for the obstacle field.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of lanes across the track. Zero is treated as a single lane.
    pub lane_count: u32,
    /// Lateral distance between adjacent lane centres.
    pub lane_width: f32,
    /// Distance ahead of the reference at which obstacles appear.
    pub spawn_ahead: f32,
    /// Distance behind the reference after which obstacles are released.
    pub despawn_behind: f32,
    /// Spacing curve controlling spawn cadence.
    pub difficulty: DifficultyCurve,
    /// Seed for template and lane draws.
    pub seed: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            lane_count: 3,
            lane_width: 2.5,
            spawn_ahead: 60.0,
            despawn_behind: 15.0,
            difficulty: DifficultyCurve::default(),
            seed: 0x0b57_ac1e,
        }
    }
}

/// Spawns and despawns pooled obstacles relative to a moving reference.
#[derive(Debug)]
pub struct ObstacleField {
    config: FieldConfig,
    table: Vec<SpawnTableEntry>,
    spawnable: bool,
    selector: WeightedSelector,
    lane_rng: ChaCha8Rng,
    active: Vec<InstanceHandle>,
    last_reference: Option<Vec3>,
    since_spawn: f32,
    travelled: f32,
    elapsed: Duration,
}

impl ObstacleField {
    /// Creates a field drawing from `table`.
    #[must_use]
    pub fn new(config: FieldConfig, table: Vec<SpawnTableEntry>) -> Self {
        let spawnable = table
            .iter()
            .any(|entry| entry.weight.is_finite() && entry.weight > 0.0);
        if !spawnable {
            let _ = Fault::InvalidConfiguration(
                "obstacle spawn table carries no weight; field will only despawn".to_owned(),
            )
            .report();
        }
        if !config.difficulty.is_valid() {
            let _ = Fault::InvalidConfiguration(format!(
                "difficulty intervals {} and {} clamped to a spacing of at least {MIN_SPACING}",
                config.difficulty.start_interval, config.difficulty.min_interval
            ))
            .report();
        }

        Self {
            selector: WeightedSelector::new(config.seed),
            lane_rng: ChaCha8Rng::seed_from_u64(config.seed ^ LANE_STREAM),
            config,
            table,
            spawnable,
            active: Vec::new(),
            last_reference: None,
            since_spawn: 0.0,
            travelled: 0.0,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the field by one host tick.
    pub fn tick(
        &mut self,
        pool: &mut PooledInstancePool,
        reference: Vec3,
        forward: Vec3,
        right: Vec3,
        dt: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let Some(forward) = forward.try_normalize() else {
            log::trace!("obstacle field skipped tick with degenerate forward axis");
            return;
        };

        self.active.retain(|handle| pool.is_live(*handle));
        self.despawn_behind(pool, reference, forward, out_events);

        let advanced = self
            .last_reference
            .map_or(0.0, |last| (reference - last).dot(forward).max(0.0));
        self.last_reference = Some(reference);
        self.travelled += advanced;
        self.since_spawn += advanced;
        self.elapsed = self.elapsed.saturating_add(dt);

        if !self.spawnable {
            return;
        }

        let interval = self.current_interval();
        if self.since_spawn < interval {
            return;
        }
        self.since_spawn = 0.0;
        self.spawn(pool, reference, forward, right, out_events);
    }

    /// Hands an externally acquired instance to the field for despawning.
    pub fn adopt(&mut self, handle: InstanceHandle) {
        if self.active.contains(&handle) {
            let _ = Fault::RedundantStateEntry("instance already managed by the field").report();
            return;
        }
        self.active.push(handle);
    }

    /// Releases every managed instance back to the pool.
    pub fn clear(&mut self, pool: &mut PooledInstancePool) {
        for handle in self.active.drain(..) {
            if pool.is_live(handle) {
                let _ = pool.release(handle);
            }
        }
    }

    /// Instances currently managed by the field.
    #[must_use]
    pub fn active(&self) -> &[InstanceHandle] {
        &self.active
    }

    /// Total forward distance observed so far.
    #[must_use]
    pub fn travelled(&self) -> f32 {
        self.travelled
    }

    /// Spawn spacing at the current point of the run.
    #[must_use]
    pub fn current_interval(&self) -> f32 {
        self.config.difficulty.interval_at(self.elapsed)
    }

    fn despawn_behind(
        &mut self,
        pool: &mut PooledInstancePool,
        reference: Vec3,
        forward: Vec3,
        out_events: &mut Vec<Event>,
    ) {
        let threshold = self.config.despawn_behind.max(0.0);
        self.active.retain(|handle| {
            let Some(instance) = pool.instance(*handle) else {
                return false;
            };
            let longitudinal = (instance.pose().position - reference).dot(forward);
            if longitudinal >= -threshold {
                return true;
            }
            if pool.release(*handle).is_ok() {
                out_events.push(Event::ObstacleDespawned { instance: *handle });
            }
            false
        });
    }

    fn spawn(
        &mut self,
        pool: &mut PooledInstancePool,
        reference: Vec3,
        forward: Vec3,
        right: Vec3,
        out_events: &mut Vec<Event>,
    ) {
        let Some(template) = self.selector.select(&self.table) else {
            return;
        };

        let lanes = self.config.lane_count.max(1);
        let lane = self.lane_rng.gen_range(0..lanes);
        let offset = (lane as f32 - (lanes - 1) as f32 * 0.5) * self.config.lane_width;
        let position =
            reference + forward * self.config.spawn_ahead + right.normalize_or_zero() * offset;
        let orientation = Quat::from_rotation_arc(Vec3::Z, forward);

        let Some(instance) = pool.acquire(template, position, orientation) else {
            return;
        };
        self.active.push(instance);
        log::trace!(
            "spawned obstacle {} from template {} in lane {lane}",
            instance.get(),
            template.get()
        );
        out_events.push(Event::ObstacleSpawned {
            instance,
            template,
            lane,
        });
    }
}
