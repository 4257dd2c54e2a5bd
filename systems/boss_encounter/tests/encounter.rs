use std::time::Duration;

use glam::Vec3;
use hound_chase_core::{
    Category, Combatant, DefeatCause, Event, Fault, Health, HealthSink, Role, Roster, TemplateId,
    WeakPointId,
};
use hound_chase_system_boss_encounter::{
    Ability, BasePhase, BossEncounter, Collaborators, EncounterConfig, OverclockStage,
    OverlayState,
};
use hound_chase_world::{PooledInstancePool, TemplateCatalog};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const STEP: Duration = Duration::from_millis(100);

fn quiet_config() -> EncounterConfig {
    let mut config = EncounterConfig::default();
    config.splash_chance = 0.0;
    config
}

fn far_roster() -> Roster {
    Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 1_000.0), 1_000.0))
}

fn advance(
    encounter: &mut BossEncounter,
    health: &Health,
    roster: &mut Roster,
    steps: u32,
) -> Vec<Event> {
    let mut events = Vec::new();
    let mut collaborators = Collaborators {
        boss_health: Some(health),
        targets: Some(roster),
        pool: None,
    };
    encounter.advance(STEP * steps, &mut collaborators, &mut events);
    events
}

fn count(events: &[Event], wanted: &Event) -> usize {
    events.iter().filter(|event| *event == wanted).count()
}

fn pool_with_decoy() -> (PooledInstancePool, TemplateId) {
    let mut catalog = TemplateCatalog::new();
    let decoy = catalog.register("chew-toy", Category::Prop, 1.0);
    (PooledInstancePool::new(catalog), decoy)
}

#[test]
fn destroying_required_weak_points_defeats_boss_with_health_left() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let health = Health::new(500.0);
    let mut roster = far_roster();
    let mut events = Vec::new();

    encounter.damage_weak_point(WeakPointId::new(0), 60.0, &mut events);
    encounter.damage_weak_point(WeakPointId::new(0), 60.0, &mut events);
    encounter.damage_weak_point(WeakPointId::new(1), 80.0, &mut events);
    assert!(!encounter.is_defeated());
    encounter.damage_weak_point(WeakPointId::new(2), 95.0, &mut events);

    assert_eq!(
        events,
        vec![
            Event::WeakPointDestroyed {
                weak_point: WeakPointId::new(0),
                destroyed: 1
            },
            Event::WeakPointDestroyed {
                weak_point: WeakPointId::new(1),
                destroyed: 2
            },
            Event::WeakPointDestroyed {
                weak_point: WeakPointId::new(2),
                destroyed: 3
            },
            Event::Defeated {
                cause: DefeatCause::WeakPoints
            },
        ]
    );
    assert!(health.current_health() > 0.0);
    assert_eq!(encounter.destroyed_weak_points(), 3);

    let later = advance(&mut encounter, &health, &mut roster, 10);
    assert!(!later
        .iter()
        .any(|event| matches!(event, Event::Defeated { .. })));
    assert_eq!(encounter.base_phase(), BasePhase::Defeated);
}

#[test]
fn defeat_is_idempotent() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let mut events = Vec::new();

    assert!(encounter.defeat(&mut events));
    assert!(!encounter.defeat(&mut events));
    for id in 0..3 {
        encounter.damage_weak_point(WeakPointId::new(id), 500.0, &mut events);
    }

    assert_eq!(
        events,
        vec![Event::Defeated {
            cause: DefeatCause::Forced
        }]
    );
}

#[test]
fn weak_points_defeat_without_any_collaborator() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let mut events = Vec::new();
    let mut nobody = Collaborators::default();

    encounter.advance(STEP * 50, &mut nobody, &mut events);
    assert!(events.is_empty());
    assert_eq!(encounter.base_phase(), BasePhase::Idle);
    assert!(encounter
        .start_distraction(&mut nobody, &mut events)
        .is_ok());

    for id in 0..3 {
        encounter.damage_weak_point(WeakPointId::new(id), 200.0, &mut events);
    }
    assert!(encounter.is_defeated());
    assert!(!encounter.is_distracted());

    encounter.advance(STEP * 24, &mut nobody, &mut events);
    assert_eq!(count(&events, &Event::DespawnRequested), 0);
    encounter.advance(STEP, &mut nobody, &mut events);
    assert_eq!(count(&events, &Event::DespawnRequested), 1);
    encounter.advance(STEP * 30, &mut nobody, &mut events);
    assert_eq!(count(&events, &Event::DespawnRequested), 1);
    assert!(encounter.is_finished());
}

#[test]
fn depleted_health_sink_defeats_and_schedules_despawn() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let mut health = Health::new(500.0);
    let mut roster = far_roster();

    assert!(advance(&mut encounter, &health, &mut roster, 1).is_empty());
    let _ = health.apply_damage(600.0);

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(
        events,
        vec![Event::Defeated {
            cause: DefeatCause::HealthDepleted
        }]
    );

    let events = advance(&mut encounter, &health, &mut roster, 24);
    assert!(events.is_empty());
    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(events, vec![Event::DespawnRequested]);
}

#[test]
fn tantrum_triggers_ends_and_respects_cooldown() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let health = Health::with_current(500.0, 100.0);
    let mut roster = far_roster();

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(count(&events, &Event::TantrumStarted), 1);
    assert!(encounter.overlay().is_tantrum());

    let events = advance(&mut encounter, &health, &mut roster, 39);
    assert!(events.is_empty());
    assert!(encounter.overlay().is_tantrum());

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(events, vec![Event::TantrumEnded]);
    assert_eq!(encounter.overlay(), OverlayState::None);
    assert_eq!(
        encounter.cooldown_remaining(Ability::Tantrum),
        Duration::from_millis(12_000)
    );

    let events = advance(&mut encounter, &health, &mut roster, 119);
    assert_eq!(count(&events, &Event::TantrumStarted), 0);
    assert!(!encounter.overlay().is_active());

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(count(&events, &Event::TantrumStarted), 1);
}

#[test]
fn simultaneous_threshold_crossing_enters_tantrum_first() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let mut health = Health::new(500.0);
    let mut roster = far_roster();

    assert!(advance(&mut encounter, &health, &mut roster, 1).is_empty());
    health.set_current(5.0);

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(events, vec![Event::TantrumStarted]);

    let events = advance(&mut encounter, &health, &mut roster, 40);
    let ended = events
        .iter()
        .position(|event| *event == Event::TantrumEnded)
        .expect("tantrum ended");
    let overclocked = events
        .iter()
        .position(|event| *event == Event::OverclockedStarted)
        .expect("overclocked started");
    assert!(ended < overclocked);
    assert!(encounter.overlay().is_overclocked());
}

#[test]
fn overlays_never_overlap_for_random_health_trajectories() {
    for seed in 0..16_u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut config = quiet_config();
        config.tantrum.duration_ms = rng.gen_range(1..40) * 100;
        config.tantrum.cooldown_ms = rng.gen_range(0..60) * 100;
        config.overclocked.duration_ms = rng.gen_range(1..40) * 100;
        config.overclocked.cooldown_ms = rng.gen_range(0..60) * 100;
        config.weak_points.clear();

        let mut encounter = BossEncounter::new(config, Vec3::ZERO);
        let mut health = Health::new(500.0);
        let mut roster = far_roster();
        let mut tantrum = false;
        let mut overclocked = false;

        for _ in 0..600 {
            if rng.gen_bool(0.1) {
                health.set_current(rng.gen_range(1.0..500.0));
            }
            for event in advance(&mut encounter, &health, &mut roster, 1) {
                match event {
                    Event::TantrumStarted => {
                        assert!(!tantrum && !overclocked, "seed {seed}");
                        tantrum = true;
                    }
                    Event::TantrumEnded => tantrum = false,
                    Event::OverclockedStarted => {
                        assert!(!tantrum && !overclocked, "seed {seed}");
                        overclocked = true;
                    }
                    Event::OverclockedEnded => overclocked = false,
                    _ => {}
                }
            }
            assert_eq!(encounter.overlay().is_tantrum(), tantrum);
            assert_eq!(encounter.overlay().is_overclocked(), overclocked);
        }
    }
}

#[test]
fn overclocked_pulses_hit_targets_in_radius() {
    let mut config = quiet_config();
    config.tantrum.threshold = 0.0;
    let mut encounter = BossEncounter::new(config, Vec3::ZERO);
    let health = Health::with_current(500.0, 50.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 2.0), 1_000.0))
        .with_companion(Combatant::new(Vec3::new(0.0, 0.0, 5.0), 50.0));

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(count(&events, &Event::OverclockedStarted), 1);
    assert_eq!(
        count(&events, &Event::OverclockedPulse { pulse: 1, hits: 2 }),
        1
    );

    let events = advance(&mut encounter, &health, &mut roster, 12);
    let pulses: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::OverclockedPulse { pulse, .. } => Some(*pulse),
            _ => None,
        })
        .collect();
    assert_eq!(pulses, vec![2, 3]);
    assert_eq!(
        encounter.overlay(),
        OverlayState::Overclocked {
            stage: OverclockStage::Sustaining {
                remaining: Duration::from_millis(6_000)
            }
        }
    );

    let companion = roster
        .combatant(Role::Companion)
        .expect("companion")
        .health
        .current_health();
    assert_eq!(companion, 50.0 - 3.0 * 8.0);

    let events = advance(&mut encounter, &health, &mut roster, 60);
    assert_eq!(count(&events, &Event::OverclockedEnded), 1);
    assert_eq!(
        encounter.cooldown_remaining(Ability::Overclocked),
        Duration::from_millis(20_000)
    );
}

#[test]
fn distraction_cancels_remaining_pulses() {
    let mut config = quiet_config();
    config.tantrum.threshold = 0.0;
    let mut encounter = BossEncounter::new(config, Vec3::ZERO);
    let health = Health::with_current(500.0, 50.0);
    let mut roster = far_roster();

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(
        count(&events, &Event::OverclockedPulse { pulse: 1, hits: 0 }),
        1
    );

    let mut events = Vec::new();
    encounter
        .start_distraction(&mut Collaborators::default(), &mut events)
        .expect("distraction starts");
    assert_eq!(events, vec![Event::DistractionStarted { prop: None }]);

    let events = advance(&mut encounter, &health, &mut roster, 20);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::OverclockedPulse { .. })));
    assert!(encounter.overlay().is_overclocked());
}

#[test]
fn distraction_cancels_pending_attack() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let health = Health::new(500.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 2.0), 100.0));

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(
        events,
        vec![Event::AttackStarted { facing: Vec3::Z }]
    );
    assert_eq!(encounter.base_phase(), BasePhase::Attacking);

    let mut events = Vec::new();
    encounter
        .start_distraction(&mut Collaborators::default(), &mut events)
        .expect("distraction starts");
    let events = advance(&mut encounter, &health, &mut roster, 10);
    assert!(events.is_empty());
    let runner = roster.combatant(Role::Primary).expect("runner");
    assert_eq!(runner.health.current_health(), 100.0);
}

#[test]
fn movement_resumes_on_the_step_distraction_ends() {
    let (mut pool, decoy) = pool_with_decoy();
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO).with_distraction_prop(decoy);
    let health = Health::new(500.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 20.0), 100.0));
    let mut events = Vec::new();

    {
        let mut collaborators = Collaborators {
            boss_health: Some(&health),
            targets: Some(&mut roster),
            pool: Some(&mut pool),
        };
        encounter
            .start_distraction(&mut collaborators, &mut events)
            .expect("distraction starts");
    }
    let prop = match events.as_slice() {
        [Event::DistractionStarted { prop: Some(prop) }] => *prop,
        other => panic!("unexpected events {other:?}"),
    };
    assert!(pool.is_live(prop));

    let events = advance(&mut encounter, &health, &mut roster, 29);
    assert!(events.is_empty());
    assert_eq!(encounter.position(), Vec3::ZERO);
    assert!(encounter.is_distracted());

    let mut events = Vec::new();
    {
        let mut collaborators = Collaborators {
            boss_health: Some(&health),
            targets: Some(&mut roster),
            pool: Some(&mut pool),
        };
        encounter.advance(STEP, &mut collaborators, &mut events);
    }
    assert_eq!(events, vec![Event::DistractionEnded]);
    assert!(!encounter.is_distracted());
    assert!((encounter.position().z - 0.7).abs() < 1e-5);
    assert!(!pool.is_live(prop));
    assert!(encounter.pending_releases().is_empty());
}

#[test]
fn distraction_rejects_reentry_and_cooldown() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let health = Health::new(500.0);
    let mut roster = far_roster();
    let mut events = Vec::new();
    let mut nobody = Collaborators::default();

    encounter
        .start_distraction(&mut nobody, &mut events)
        .expect("first distraction");
    assert_eq!(
        encounter.start_distraction(&mut nobody, &mut events),
        Err(Fault::RedundantStateEntry("boss already distracted"))
    );

    let _ = advance(&mut encounter, &health, &mut roster, 30);
    assert!(!encounter.is_distracted());
    assert_eq!(
        encounter.start_distraction(&mut nobody, &mut events),
        Err(Fault::AbilityCoolingDown("distraction"))
    );

    let _ = advance(&mut encounter, &health, &mut roster, 50);
    assert!(encounter.start_distraction(&mut nobody, &mut events).is_ok());
}

#[test]
fn prop_released_late_when_pool_returns() {
    let (mut pool, decoy) = pool_with_decoy();
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO).with_distraction_prop(decoy);
    let mut events = Vec::new();

    {
        let mut collaborators = Collaborators {
            pool: Some(&mut pool),
            ..Collaborators::default()
        };
        encounter
            .start_distraction(&mut collaborators, &mut events)
            .expect("distraction starts");
    }
    assert_eq!(pool.live_count(), 1);

    encounter.advance(STEP * 30, &mut Collaborators::default(), &mut events);
    assert_eq!(encounter.pending_releases().len(), 1);
    assert_eq!(pool.live_count(), 1);

    let mut collaborators = Collaborators {
        pool: Some(&mut pool),
        ..Collaborators::default()
    };
    encounter.advance(Duration::ZERO, &mut collaborators, &mut events);
    assert!(encounter.pending_releases().is_empty());
    assert_eq!(pool.live_count(), 0);
    assert_eq!(pool.free_count(), 1);
}

#[test]
fn attack_lands_after_windup_with_multiplier() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let health = Health::with_current(500.0, 100.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 2.0), 100.0));

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(
        events,
        vec![
            Event::AttackStarted { facing: Vec3::Z },
            Event::TantrumStarted
        ]
    );

    let events = advance(&mut encounter, &health, &mut roster, 3);
    assert!(events.is_empty());

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(
        events,
        vec![Event::AttackLanded {
            role: Role::Primary,
            amount: 30.0
        }]
    );
    let runner = roster.combatant(Role::Primary).expect("runner");
    assert_eq!(runner.health.current_health(), 70.0);
}

#[test]
fn attack_interval_gates_the_next_attack() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let health = Health::new(500.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 2.0), 1_000.0));

    let events = advance(&mut encounter, &health, &mut roster, 15);
    let started = |events: &[Event]| {
        events
            .iter()
            .filter(|event| matches!(event, Event::AttackStarted { .. }))
            .count()
    };
    assert_eq!(started(&events), 1);
    assert_eq!(
        count(
            &events,
            &Event::AttackLanded {
                role: Role::Primary,
                amount: 20.0
            }
        ),
        1
    );

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(started(&events), 1);
}

#[test]
fn tiny_overclocked_rate_falls_back_to_base_interval() {
    let mut config = quiet_config();
    config.tantrum.threshold = 0.0;
    config.overclocked.attack_rate_multiplier = 1e-30;
    let mut encounter = BossEncounter::new(config, Vec3::ZERO);
    let health = Health::with_current(500.0, 10.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 2.0), 10_000.0));
    let started = |events: &[Event]| {
        events
            .iter()
            .filter(|event| matches!(event, Event::AttackStarted { .. }))
            .count()
    };

    let events = advance(&mut encounter, &health, &mut roster, 15);
    assert_eq!(count(&events, &Event::OverclockedStarted), 1);
    assert_eq!(started(&events), 1);
    assert!(encounter.overlay().is_overclocked());

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(started(&events), 1);
}

#[test]
fn certain_splash_hits_companion_for_half() {
    let mut config = quiet_config();
    config.splash_chance = 1.0;
    config.attack_windup_ms = 0;
    let mut encounter = BossEncounter::new(config, Vec3::ZERO);
    let health = Health::new(500.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 2.0), 100.0))
        .with_companion(Combatant::new(Vec3::new(1.0, 0.0, 2.0), 50.0));

    let events = advance(&mut encounter, &health, &mut roster, 1);
    assert_eq!(
        events,
        vec![
            Event::AttackStarted { facing: Vec3::Z },
            Event::AttackLanded {
                role: Role::Primary,
                amount: 20.0
            },
            Event::AttackLanded {
                role: Role::Companion,
                amount: 10.0
            },
        ]
    );
}

#[test]
fn boss_closes_distance_and_tracks_target() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let health = Health::new(500.0);
    let mut roster = Roster::new(Combatant::new(Vec3::new(0.0, 0.0, 10.0), 100.0));

    let _ = advance(&mut encounter, &health, &mut roster, 10);
    assert!((encounter.position().z - 7.0).abs() < 1e-4);
    assert_eq!(encounter.facing(), Vec3::Z);
    assert_eq!(encounter.last_known_target(), Some(Vec3::new(0.0, 0.0, 10.0)));
    assert_eq!(encounter.base_phase(), BasePhase::Approaching);

    let mut events = Vec::new();
    encounter.advance(
        STEP * 5,
        &mut Collaborators {
            boss_health: Some(&health),
            ..Collaborators::default()
        },
        &mut events,
    );
    assert!(events.is_empty());
    assert!((encounter.position().z - 7.0).abs() < 1e-4);
    assert_eq!(encounter.last_known_target(), Some(Vec3::new(0.0, 0.0, 10.0)));
}

#[test]
fn partial_steps_accumulate() {
    let mut encounter = BossEncounter::new(quiet_config(), Vec3::ZERO);
    let mut nobody = Collaborators::default();
    let mut events = Vec::new();

    for _ in 0..7 {
        encounter.advance(Duration::from_millis(30), &mut nobody, &mut events);
    }
    assert_eq!(encounter.steps(), 2);
}
