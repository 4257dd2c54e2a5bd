//! Scripted headless chase wiring every system together.

use std::{collections::BTreeMap, fmt, time::Duration};

use glam::Vec3;
use hound_chase_core::{Category, Combatant, Event, Health, HealthSink, Role, Roster, TemplateId};
use hound_chase_system_boss_encounter::{
    Ability, BossEncounter, Collaborators, EncounterConfig, EncounterTrigger,
};
use hound_chase_system_obstacle_field::ObstacleField;
use hound_chase_system_repurpose::ObstacleRepurposer;
use hound_chase_system_selection::SpawnTableEntry;
use hound_chase_world::{PooledInstancePool, TemplateCatalog};

use crate::config::{ChaseConfig, RunnerTuning};

const FORWARD: Vec3 = Vec3::Z;
const RIGHT: Vec3 = Vec3::X;
const PRELOAD: usize = 4;

/// Runner, companion, obstacle field and boss advanced frame by frame.
pub(crate) struct Chase {
    script: RunnerTuning,
    encounter_config: EncounterConfig,
    pool: PooledInstancePool,
    field: ObstacleField,
    repurposer: ObstacleRepurposer,
    trigger: EncounterTrigger,
    encounter: Option<BossEncounter>,
    boss_health: Health,
    roster: Roster,
    decoy: TemplateId,
    position: Vec3,
    frame: Duration,
    frames: u32,
    strikes: u32,
    events: Vec<Event>,
}

impl Chase {
    pub(crate) fn new(config: ChaseConfig) -> Self {
        let mut catalog = TemplateCatalog::new();
        let spike = catalog.register("spike", Category::Obstacle, 1.0);
        let fallen_log = catalog.register("fallen-log", Category::Obstacle, 1.2);
        let boulder = catalog.register("boulder", Category::Obstacle, 1.6);
        let trap = catalog.register("bear-trap", Category::Trap, 1.0);
        let decoy = catalog.register("chew-toy", Category::Prop, 0.5);

        let mut pool = PooledInstancePool::new(catalog);
        for template in [spike, fallen_log, boulder] {
            pool.preload(template, PRELOAD);
        }
        pool.preload(decoy, 1);

        let table = vec![
            SpawnTableEntry::new(spike, 3.0),
            SpawnTableEntry::new(fallen_log, 2.0),
            SpawnTableEntry::new(boulder, 1.0),
        ];
        let ChaseConfig {
            field,
            encounter,
            runner,
        } = config;

        Self {
            pool,
            field: ObstacleField::new(field, table),
            repurposer: ObstacleRepurposer::new(Some(trap)),
            trigger: EncounterTrigger::new(runner.boss_checkpoint),
            encounter: None,
            boss_health: Health::new(encounter.stats.max_health),
            roster: Roster::new(Combatant::new(Vec3::ZERO, runner.max_health)).with_companion(
                Combatant::new(companion_position(Vec3::ZERO), runner.companion_health),
            ),
            decoy,
            position: Vec3::ZERO,
            frame: Duration::from_millis(runner.frame_ms.max(1)),
            frames: 0,
            strikes: 0,
            events: Vec::new(),
            encounter_config: encounter,
            script: runner,
        }
    }

    /// Simulates up to `frames` host frames, tears the run down and summarises it.
    pub(crate) fn run(mut self, frames: u32) -> Summary {
        for _ in 0..frames {
            if self.runner_caught() {
                log::info!("runner caught after {} frames", self.frames);
                break;
            }
            let emitted = self.events.len();
            self.advance_frame();
            for event in &self.events[emitted..] {
                log::debug!("frame {}: {event:?}", self.frames);
            }
        }
        self.teardown();
        self.summary()
    }

    fn advance_frame(&mut self) {
        self.frames += 1;
        let position =
            self.position + FORWARD * self.script.speed.max(0.0) * self.frame.as_secs_f32();
        self.move_runner(position);

        self.field.tick(
            &mut self.pool,
            position,
            FORWARD,
            RIGHT,
            self.frame,
            &mut self.events,
        );
        if self.frames % self.script.smash_every.max(1) == 0 {
            self.smash_nearest_obstacle();
        }

        if self.trigger.observe(self.field.travelled()) {
            log::info!("hound boss appears at {:.1}", self.field.travelled());
            let spawn = position - FORWARD * self.script.boss_spawn_behind;
            self.encounter = Some(
                BossEncounter::new(self.encounter_config.clone(), spawn)
                    .with_distraction_prop(self.decoy),
            );
        }
        self.drive_encounter();
    }

    fn move_runner(&mut self, position: Vec3) {
        self.position = position;
        if let Some(runner) = self.roster.combatant_mut(Role::Primary) {
            runner.position = position;
        }
        if let Some(companion) = self.roster.combatant_mut(Role::Companion) {
            companion.position = companion_position(position);
        }
    }

    fn smash_nearest_obstacle(&mut self) {
        let runner = self.position;
        let nearest = self
            .field
            .active()
            .iter()
            .copied()
            .filter(|handle| self.pool.category(*handle) == Some(Category::Obstacle))
            .filter_map(|handle| {
                self.pool
                    .instance(handle)
                    .map(|instance| (handle, instance.pose().position))
            })
            .filter(|(_, position)| (*position - runner).dot(FORWARD) > 0.0)
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(runner)
                    .total_cmp(&b.distance_squared(runner))
            });
        let Some((obstacle, position)) = nearest else {
            return;
        };

        let converted = self.repurposer.try_repurpose(
            Some(&mut self.pool),
            obstacle,
            position - FORWARD * 0.5,
            -FORWARD,
            &mut self.events,
        );
        if !converted {
            return;
        }
        if let Some(Event::ObstacleRepurposed { trap, .. }) = self.events.last() {
            self.field.adopt(*trap);
        }
    }

    fn drive_encounter(&mut self) {
        let Some(encounter) = self.encounter.as_mut() else {
            return;
        };

        if !encounter.is_defeated() {
            if self.frames % self.script.strike_every.max(1) == 0 {
                self.strikes += 1;
                let _ = self.boss_health.apply_damage(self.script.strike_damage);
                let intact = encounter
                    .weak_points()
                    .iter()
                    .find(|point| !point.is_destroyed())
                    .map(|point| point.id());
                if let Some(id) = intact {
                    encounter.damage_weak_point(id, self.script.weak_point_damage, &mut self.events);
                }
            }

            let close = encounter.position().distance(self.position) <= self.script.distraction_range;
            if close
                && !encounter.is_distracted()
                && encounter.cooldown_remaining(Ability::Distraction).is_zero()
            {
                let mut collaborators = Collaborators {
                    boss_health: Some(&self.boss_health),
                    targets: Some(&mut self.roster),
                    pool: Some(&mut self.pool),
                };
                if let Err(fault) = encounter.start_distraction(&mut collaborators, &mut self.events)
                {
                    log::debug!("companion decoy declined: {fault}");
                }
            }
        }

        let mut collaborators = Collaborators {
            boss_health: Some(&self.boss_health),
            targets: Some(&mut self.roster),
            pool: Some(&mut self.pool),
        };
        encounter.advance(self.frame, &mut collaborators, &mut self.events);
        if encounter.is_finished() {
            log::info!("hound boss despawned after {} frames", self.frames);
            self.encounter = None;
        }
    }

    fn runner_caught(&self) -> bool {
        self.roster
            .combatant(Role::Primary)
            .is_none_or(|runner| runner.health.is_dead())
    }

    /// Returns every pooled instance the run still holds.
    fn teardown(&mut self) {
        self.field.clear(&mut self.pool);
        if let Some(mut encounter) = self.encounter.take() {
            let _ = encounter.defeat(&mut self.events);
            let mut collaborators = Collaborators {
                pool: Some(&mut self.pool),
                ..Collaborators::default()
            };
            encounter.advance(Duration::ZERO, &mut collaborators, &mut self.events);
        }
    }

    fn summary(self) -> Summary {
        let health_of = |role| {
            self.roster
                .combatant(role)
                .map_or(0.0, |combatant| combatant.health.current_health())
        };
        Summary {
            frames: self.frames,
            travelled: self.field.travelled(),
            strikes: self.strikes,
            runner_health: health_of(Role::Primary),
            companion_health: health_of(Role::Companion),
            boss_health: self.boss_health.current_health(),
            live_instances: self.pool.live_count(),
            total_instances: self.pool.total_instances(),
            events: self.events,
        }
    }
}

fn companion_position(runner: Vec3) -> Vec3 {
    runner - FORWARD * 1.5 + RIGHT
}

/// Outcome of a chase run.
#[derive(Debug, PartialEq)]
pub(crate) struct Summary {
    frames: u32,
    travelled: f32,
    strikes: u32,
    runner_health: f32,
    companion_health: f32,
    boss_health: f32,
    live_instances: usize,
    total_instances: usize,
    events: Vec<Event>,
}

impl Summary {
    fn event_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event_name(event)).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames simulated: {}", self.frames)?;
        writeln!(f, "distance travelled: {:.1}", self.travelled)?;
        writeln!(
            f,
            "runner health: {:.1} (companion {:.1})",
            self.runner_health, self.companion_health
        )?;
        writeln!(
            f,
            "boss health: {:.1} after {} strikes",
            self.boss_health, self.strikes
        )?;
        writeln!(
            f,
            "pool: {} live of {} instances",
            self.live_instances, self.total_instances
        )?;
        write!(f, "events:")?;
        for (name, count) in self.event_counts() {
            write!(f, "\n  {name}: {count}")?;
        }
        Ok(())
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::ObstacleSpawned { .. } => "obstacle_spawned",
        Event::ObstacleDespawned { .. } => "obstacle_despawned",
        Event::ObstacleRepurposed { .. } => "obstacle_repurposed",
        Event::AttackStarted { .. } => "attack_started",
        Event::AttackLanded { .. } => "attack_landed",
        Event::TantrumStarted => "tantrum_started",
        Event::TantrumEnded => "tantrum_ended",
        Event::OverclockedStarted => "overclocked_started",
        Event::OverclockedPulse { .. } => "overclocked_pulse",
        Event::OverclockedEnded => "overclocked_ended",
        Event::DistractionStarted { .. } => "distraction_started",
        Event::DistractionEnded => "distraction_ended",
        Event::WeakPointDestroyed { .. } => "weak_point_destroyed",
        Event::Defeated { .. } => "defeated",
        Event::DespawnRequested => "despawn_requested",
    }
}
