#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Boss encounter phase engine for the hound chase.
//!
//! The encounter is a synchronous state machine advanced by host time. Host
//! `dt` is folded into fixed logical steps; each step first advances every
//! independent timer (ability cooldowns, overlay lifecycles, the attack
//! wind-up and the distraction window) and then walks a fixed decision list:
//! target lookup, distraction expiry, attack or movement, tantrum trigger and
//! overclocked trigger. Timed behaviors are explicit state rather than
//! suspended routines, so cancelling one is a matter of overwriting its
//! state before the next step observes it.
//!
//! Collaborators are borrowed per call through [`Collaborators`]. Each one is
//! optional; a missing collaborator is logged and the dependent action is
//! skipped, which keeps the weak-point defeat path reachable even when the
//! host supplies nothing at all.

mod config;
mod overlay;
mod trigger;
mod weak_points;

pub use config::{
    DistractionTuning, EncounterConfig, EncounterStats, OverclockTuning, TantrumTuning,
    WeakPointSpec,
};
pub use overlay::{Ability, OverclockStage, OverlayState};
pub use trigger::EncounterTrigger;
pub use weak_points::WeakPoint;

use std::time::Duration;

use glam::{Quat, Vec3};
use hound_chase_core::{
    DefeatCause, Event, Fault, HealthSink, InstanceHandle, Role, RoleFilter, TargetRoster,
    TemplateId, WeakPointId,
};
use hound_chase_world::PooledInstancePool;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use overlay::Cooldown;
use weak_points::{WeakPointHit, WeakPoints};

const FALLBACK_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// External collaborators borrowed for a single call.
#[derive(Default)]
pub struct Collaborators<'a> {
    /// Boss health component, read for phase thresholds and death.
    pub boss_health: Option<&'a dyn HealthSink>,
    /// Runner and companion positions, health sinks and spatial queries.
    pub targets: Option<&'a mut dyn TargetRoster>,
    /// Pool supplying distraction props.
    pub pool: Option<&'a mut PooledInstancePool>,
}

/// Base cadence underneath any overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasePhase {
    /// No target is known.
    Idle,
    /// Closing distance to the target.
    Approaching,
    /// Winding up an attack.
    Attacking,
    /// The encounter is over.
    Defeated,
}

#[derive(Clone, Copy, Debug)]
struct Distraction {
    remaining: Duration,
    prop: Option<InstanceHandle>,
}

#[derive(Clone, Copy, Debug)]
struct Defeat {
    despawn_in: Option<Duration>,
}

/// Hound boss encounter state machine.
#[derive(Debug)]
pub struct BossEncounter {
    config: EncounterConfig,
    tick_interval: Duration,
    overclocked_attack_interval: Duration,
    accumulator: Duration,
    position: Vec3,
    facing: Vec3,
    last_known_target: Option<Vec3>,
    weak_points: WeakPoints,
    overlay: OverlayState,
    distraction: Option<Distraction>,
    tantrum_cooldown: Cooldown,
    overclock_cooldown: Cooldown,
    distraction_cooldown: Cooldown,
    pending_strike: Option<Duration>,
    since_last_attack: Duration,
    defeat: Option<Defeat>,
    prop_template: Option<TemplateId>,
    pending_releases: Vec<InstanceHandle>,
    missing_health_reported: bool,
    rng: ChaCha8Rng,
    steps: u64,
}

impl BossEncounter {
    /// Starts an encounter with the boss standing at `position`.
    #[must_use]
    pub fn new(config: EncounterConfig, position: Vec3) -> Self {
        let tick_interval = if config.tick_interval_ms == 0 {
            let _ = Fault::InvalidConfiguration(
                "tick interval of 0 ms replaced with 100 ms".to_owned(),
            )
            .report();
            FALLBACK_TICK_INTERVAL
        } else {
            config.tick_interval()
        };
        if config.overclocked.threshold >= config.tantrum.threshold {
            log::warn!(
                "overclocked threshold {} is not below tantrum threshold {}",
                config.overclocked.threshold,
                config.tantrum.threshold
            );
        }

        let overclocked_attack_interval = overclocked_attack_interval(&config);
        let weak_points =
            WeakPoints::from_specs(&config.weak_points, config.weak_points_to_destroy);
        Self {
            tick_interval,
            overclocked_attack_interval,
            accumulator: Duration::ZERO,
            position,
            facing: Vec3::Z,
            last_known_target: None,
            weak_points,
            overlay: OverlayState::None,
            distraction: None,
            tantrum_cooldown: Cooldown::default(),
            overclock_cooldown: Cooldown::default(),
            distraction_cooldown: Cooldown::default(),
            pending_strike: None,
            since_last_attack: config.stats.attack_interval(),
            defeat: None,
            prop_template: None,
            pending_releases: Vec::new(),
            missing_health_reported: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            steps: 0,
            config,
        }
    }

    /// Uses `template` as the decoy prop acquired for distractions.
    #[must_use]
    pub fn with_distraction_prop(mut self, template: TemplateId) -> Self {
        self.prop_template = Some(template);
        self
    }

    /// Advances the encounter by host time, running every logical step that fits.
    pub fn advance(
        &mut self,
        dt: Duration,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) {
        self.flush_releases(collaborators);
        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.tick_interval {
            self.accumulator -= self.tick_interval;
            self.step(collaborators, out_events);
        }
        self.flush_releases(collaborators);
    }

    /// Starts a distraction window.
    ///
    /// Cancels any in-flight overclocked pulses and a pending attack, then
    /// acquires the decoy prop next to the boss when a pool is available.
    pub fn start_distraction(
        &mut self,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), Fault> {
        if self.defeat.is_some() {
            return Err(Fault::RedundantStateEntry("encounter already defeated").report());
        }
        if self.distraction.is_some() {
            return Err(Fault::RedundantStateEntry("boss already distracted").report());
        }
        if !self.distraction_cooldown.is_ready() {
            return Err(Fault::AbilityCoolingDown("distraction").report());
        }

        self.cancel_in_flight();
        let prop = match (self.prop_template, collaborators.pool.as_deref_mut()) {
            (Some(template), Some(pool)) => pool.acquire(template, self.position, Quat::IDENTITY),
            (Some(_), None) => {
                let _ = Fault::MissingCollaborator("instance pool").report();
                None
            }
            (None, _) => None,
        };

        self.distraction = Some(Distraction {
            remaining: self.config.distraction.duration(),
            prop,
        });
        self.distraction_cooldown
            .start(self.config.distraction.cooldown());
        log::debug!("boss distracted for {:?}", self.config.distraction.duration());
        out_events.push(Event::DistractionStarted { prop });
        Ok(())
    }

    /// Applies damage to a weak point.
    ///
    /// Destroying the configured number of weak points defeats the boss
    /// regardless of its health sink.
    pub fn damage_weak_point(
        &mut self,
        id: WeakPointId,
        amount: f32,
        out_events: &mut Vec<Event>,
    ) {
        if self.defeat.is_some() {
            return;
        }
        match self.weak_points.damage(id, amount) {
            WeakPointHit::Ignored | WeakPointHit::Damaged => {}
            WeakPointHit::Destroyed { destroyed, defeats } => {
                log::debug!("weak point {} destroyed ({destroyed} total)", id.get());
                out_events.push(Event::WeakPointDestroyed {
                    weak_point: id,
                    destroyed,
                });
                if defeats {
                    let _ = self.conclude(DefeatCause::WeakPoints, out_events);
                }
            }
        }
    }

    /// Defeats the boss. Returns `false` if it was already defeated.
    pub fn defeat(&mut self, out_events: &mut Vec<Event>) -> bool {
        self.conclude(DefeatCause::Forced, out_events)
    }

    /// Current boss position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Direction the boss faces.
    #[must_use]
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    /// Last position at which the primary target was seen.
    #[must_use]
    pub fn last_known_target(&self) -> Option<Vec3> {
        self.last_known_target
    }

    /// Active overlay.
    #[must_use]
    pub fn overlay(&self) -> OverlayState {
        self.overlay
    }

    /// Reports whether a distraction window is open.
    #[must_use]
    pub fn is_distracted(&self) -> bool {
        self.distraction.is_some()
    }

    /// Reports whether the boss has been defeated.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.defeat.is_some()
    }

    /// Reports whether the despawn request has been emitted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.defeat, Some(Defeat { despawn_in: None }))
    }

    /// Base cadence underneath the overlays.
    #[must_use]
    pub fn base_phase(&self) -> BasePhase {
        if self.defeat.is_some() {
            BasePhase::Defeated
        } else if self.pending_strike.is_some() {
            BasePhase::Attacking
        } else if self.last_known_target.is_some() {
            BasePhase::Approaching
        } else {
            BasePhase::Idle
        }
    }

    /// Time left before `ability` can trigger again.
    #[must_use]
    pub fn cooldown_remaining(&self, ability: Ability) -> Duration {
        match ability {
            Ability::Tantrum => self.tantrum_cooldown.remaining(),
            Ability::Overclocked => self.overclock_cooldown.remaining(),
            Ability::Distraction => self.distraction_cooldown.remaining(),
        }
    }

    /// Weak points in identifier order.
    #[must_use]
    pub fn weak_points(&self) -> &[WeakPoint] {
        self.weak_points.as_slice()
    }

    /// Number of destroyed weak points.
    #[must_use]
    pub fn destroyed_weak_points(&self) -> u32 {
        self.weak_points.destroyed()
    }

    /// Props waiting for a pool to be released into.
    #[must_use]
    pub fn pending_releases(&self) -> &[InstanceHandle] {
        &self.pending_releases
    }

    /// Logical steps simulated so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Configuration the encounter was created with.
    #[must_use]
    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    fn step(&mut self, collaborators: &mut Collaborators<'_>, out_events: &mut Vec<Event>) {
        self.steps += 1;
        let step = self.tick_interval;

        if let Some(defeat) = self.defeat.as_mut() {
            if let Some(remaining) = defeat.despawn_in {
                let remaining = remaining.saturating_sub(step);
                if remaining.is_zero() {
                    defeat.despawn_in = None;
                    out_events.push(Event::DespawnRequested);
                } else {
                    defeat.despawn_in = Some(remaining);
                }
            }
            return;
        }

        if collaborators.boss_health.is_some_and(|health| health.is_dead()) {
            let _ = self.conclude(DefeatCause::HealthDepleted, out_events);
            return;
        }

        self.tantrum_cooldown.advance(step);
        self.overclock_cooldown.advance(step);
        self.distraction_cooldown.advance(step);
        self.advance_overlay(step, collaborators, out_events);
        self.advance_strike(step, collaborators, out_events);
        if let Some(distraction) = self.distraction.as_mut() {
            distraction.remaining = distraction.remaining.saturating_sub(step);
        }
        self.since_last_attack = self.since_last_attack.saturating_add(step);

        let target = collaborators
            .targets
            .as_deref()
            .and_then(|targets| targets.position(Role::Primary));
        if let Some(target) = target {
            self.last_known_target = Some(target);
        } else {
            log::trace!("no primary target; boss idles");
        }

        if self
            .distraction
            .is_some_and(|distraction| distraction.remaining.is_zero())
        {
            self.end_distraction(out_events);
        }

        if let (Some(target), None) = (target, self.distraction) {
            self.attack_or_move(target, step, collaborators, out_events);
        }

        let Some(fraction) = self.boss_health_fraction(collaborators) else {
            return;
        };
        if !self.overlay.is_active()
            && self.tantrum_cooldown.is_ready()
            && fraction <= self.config.tantrum.threshold
        {
            self.begin_tantrum(out_events);
        }
        if !self.overlay.is_active()
            && self.overclock_cooldown.is_ready()
            && fraction <= self.config.overclocked.threshold
        {
            self.begin_overclocked(collaborators, out_events);
        }
    }

    fn boss_health_fraction(&mut self, collaborators: &Collaborators<'_>) -> Option<f32> {
        let fraction = collaborators
            .boss_health
            .and_then(|health| health.health_fraction());
        if fraction.is_none() && !self.missing_health_reported {
            self.missing_health_reported = true;
            let _ = Fault::MissingCollaborator("boss health sink").report();
        }
        fraction
    }

    fn attack_or_move(
        &mut self,
        target: Vec3,
        step: Duration,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) {
        if self.pending_strike.is_some() {
            return;
        }

        let offset = target - self.position;
        let distance = offset.length();
        let direction = offset.try_normalize().unwrap_or(self.facing);

        if distance <= self.config.stats.attack_range
            && self.since_last_attack >= self.effective_attack_interval()
        {
            self.facing = direction;
            self.since_last_attack = Duration::ZERO;
            out_events.push(Event::AttackStarted {
                facing: self.facing,
            });
            let windup = self.config.attack_windup();
            if windup.is_zero() {
                self.land_strike(collaborators, out_events);
            } else {
                self.pending_strike = Some(windup);
            }
            return;
        }

        let speed = self.config.stats.move_speed.max(0.0) * self.speed_multiplier();
        let travel = (speed * step.as_secs_f32()).min(distance);
        if travel > 0.0 {
            self.facing = direction;
            self.position += direction * travel;
        }
    }

    fn advance_strike(
        &mut self,
        step: Duration,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(remaining) = self.pending_strike else {
            return;
        };
        let remaining = remaining.saturating_sub(step);
        if remaining.is_zero() {
            self.pending_strike = None;
            self.land_strike(collaborators, out_events);
        } else {
            self.pending_strike = Some(remaining);
        }
    }

    fn land_strike(&mut self, collaborators: &mut Collaborators<'_>, out_events: &mut Vec<Event>) {
        let amount = self.config.stats.attack_damage * self.damage_multiplier();
        let splashes = self.rng.gen::<f32>() < self.config.splash_chance;

        let Some(targets) = collaborators.targets.as_deref_mut() else {
            let _ = Fault::MissingCollaborator("target roster").report();
            return;
        };

        match targets.health_sink(Role::Primary) {
            Some(sink) => {
                let _ = sink.apply_damage(amount);
                out_events.push(Event::AttackLanded {
                    role: Role::Primary,
                    amount,
                });
            }
            None => {
                let _ = Fault::MissingCollaborator("primary health sink").report();
            }
        }

        if splashes {
            if let Some(sink) = targets.health_sink(Role::Companion) {
                let splash = amount * 0.5;
                let _ = sink.apply_damage(splash);
                out_events.push(Event::AttackLanded {
                    role: Role::Companion,
                    amount: splash,
                });
            }
        }
    }

    fn advance_overlay(
        &mut self,
        step: Duration,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) {
        match self.overlay {
            OverlayState::None => {}
            OverlayState::Tantrum { remaining } => {
                let remaining = remaining.saturating_sub(step);
                if remaining.is_zero() {
                    self.overlay = OverlayState::None;
                    self.tantrum_cooldown.start(self.config.tantrum.cooldown());
                    log::debug!("tantrum ended");
                    out_events.push(Event::TantrumEnded);
                } else {
                    self.overlay = OverlayState::Tantrum { remaining };
                }
            }
            OverlayState::Overclocked {
                stage:
                    OverclockStage::Pulsing {
                        pulses_left,
                        next_pulse_in,
                    },
            } => {
                let next_pulse_in = next_pulse_in.saturating_sub(step);
                if next_pulse_in.is_zero() {
                    self.emit_pulses(pulses_left, collaborators, out_events);
                } else {
                    self.overlay = OverlayState::Overclocked {
                        stage: OverclockStage::Pulsing {
                            pulses_left,
                            next_pulse_in,
                        },
                    };
                }
            }
            OverlayState::Overclocked {
                stage: OverclockStage::Sustaining { remaining },
            } => {
                let remaining = remaining.saturating_sub(step);
                if remaining.is_zero() {
                    self.overlay = OverlayState::None;
                    self.overclock_cooldown
                        .start(self.config.overclocked.cooldown());
                    log::debug!("overclocked ended");
                    out_events.push(Event::OverclockedEnded);
                } else {
                    self.overlay = OverlayState::Overclocked {
                        stage: OverclockStage::Sustaining { remaining },
                    };
                }
            }
        }
    }

    fn begin_tantrum(&mut self, out_events: &mut Vec<Event>) {
        self.overlay = OverlayState::Tantrum {
            remaining: self.config.tantrum.duration(),
        };
        log::debug!("tantrum started");
        out_events.push(Event::TantrumStarted);
    }

    fn begin_overclocked(
        &mut self,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) {
        log::debug!("overclocked started");
        out_events.push(Event::OverclockedStarted);
        self.emit_pulses(self.config.overclocked.pulse_count, collaborators, out_events);
    }

    /// Emits the next pulse of a sequence with `pulses_left` remaining and
    /// schedules what follows it.
    fn emit_pulses(
        &mut self,
        pulses_left: u32,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let mut pulses_left = pulses_left;
        if pulses_left > 0 {
            let pulse = self.config.overclocked.pulse_count - pulses_left + 1;
            self.pulse(pulse, collaborators, out_events);
            pulses_left -= 1;
        }

        let stage = if pulses_left == 0 {
            OverclockStage::Sustaining {
                remaining: self.config.overclocked.duration(),
            }
        } else {
            OverclockStage::Pulsing {
                pulses_left,
                next_pulse_in: self.config.overclocked.pulse_interval(),
            }
        };
        self.overlay = OverlayState::Overclocked { stage };
    }

    fn pulse(
        &self,
        pulse: u32,
        collaborators: &mut Collaborators<'_>,
        out_events: &mut Vec<Event>,
    ) {
        let tuning = &self.config.overclocked;
        let mut hits = 0;
        match collaborators.targets.as_deref_mut() {
            Some(targets) => {
                let caught =
                    targets.targets_within(self.position, tuning.pulse_radius, RoleFilter::Any);
                for role in caught {
                    let amount = match role {
                        Role::Primary => tuning.pulse_damage_primary,
                        Role::Companion => tuning.pulse_damage_companion,
                    };
                    if let Some(sink) = targets.health_sink(role) {
                        let _ = sink.apply_damage(amount);
                        hits += 1;
                    }
                }
            }
            None => {
                let _ = Fault::MissingCollaborator("spatial query").report();
            }
        }
        out_events.push(Event::OverclockedPulse { pulse, hits });
    }

    fn end_distraction(&mut self, out_events: &mut Vec<Event>) {
        let Some(distraction) = self.distraction.take() else {
            return;
        };
        if let Some(prop) = distraction.prop {
            self.pending_releases.push(prop);
        }
        log::debug!("distraction ended");
        out_events.push(Event::DistractionEnded);
    }

    /// Drops the pending attack and any remaining overclocked pulses.
    fn cancel_in_flight(&mut self) {
        if self.pending_strike.take().is_some() {
            log::debug!("pending attack cancelled");
        }
        if let OverlayState::Overclocked {
            stage: OverclockStage::Pulsing { pulses_left, .. },
        } = self.overlay
        {
            log::debug!("{pulses_left} overclocked pulses cancelled");
            self.overlay = OverlayState::Overclocked {
                stage: OverclockStage::Sustaining {
                    remaining: self.config.overclocked.duration(),
                },
            };
        }
    }

    fn conclude(&mut self, cause: DefeatCause, out_events: &mut Vec<Event>) -> bool {
        if self.defeat.is_some() {
            let _ = Fault::RedundantStateEntry("boss already defeated").report();
            return false;
        }

        self.pending_strike = None;
        self.overlay = OverlayState::None;
        if let Some(distraction) = self.distraction.take() {
            self.pending_releases.extend(distraction.prop);
        }
        self.defeat = Some(Defeat {
            despawn_in: Some(self.config.defeat_delay()),
        });
        log::info!("boss defeated: {cause:?}");
        out_events.push(Event::Defeated { cause });
        if self.config.defeat_delay().is_zero() {
            self.defeat = Some(Defeat { despawn_in: None });
            out_events.push(Event::DespawnRequested);
        }
        true
    }

    fn flush_releases(&mut self, collaborators: &mut Collaborators<'_>) {
        if self.pending_releases.is_empty() {
            return;
        }
        let Some(pool) = collaborators.pool.as_deref_mut() else {
            return;
        };
        for prop in self.pending_releases.drain(..) {
            let _ = pool.release(prop);
        }
    }

    fn damage_multiplier(&self) -> f32 {
        match self.overlay {
            OverlayState::Tantrum { .. } => self.config.tantrum.damage_multiplier,
            OverlayState::Overclocked { .. } => self.config.overclocked.damage_multiplier,
            OverlayState::None => 1.0,
        }
    }

    fn speed_multiplier(&self) -> f32 {
        match self.overlay {
            OverlayState::Overclocked { .. } => self.config.overclocked.speed_multiplier,
            OverlayState::Tantrum { .. } => self.config.tantrum.speed_multiplier,
            OverlayState::None => 1.0,
        }
    }

    fn effective_attack_interval(&self) -> Duration {
        if self.overlay.is_overclocked() {
            self.overclocked_attack_interval
        } else {
            self.config.stats.attack_interval()
        }
    }
}

/// Attack interval while overclocked; unusable rate multipliers fall back to 1.0.
fn overclocked_attack_interval(config: &EncounterConfig) -> Duration {
    let interval = config.stats.attack_interval();
    let rate = config.overclocked.attack_rate_multiplier;
    let shortened = (rate.is_finite() && rate > 0.0)
        .then(|| Duration::try_from_secs_f64(interval.as_secs_f64() / f64::from(rate)).ok())
        .flatten();
    match shortened {
        Some(shortened) => shortened,
        None => {
            let _ = Fault::InvalidConfiguration(format!(
                "overclocked attack rate multiplier {rate} replaced with 1.0"
            ))
            .report();
            interval
        }
    }
}
