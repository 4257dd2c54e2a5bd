//! Reference collaborators used by adapters and tests.

use glam::Vec3;

use crate::{HealthSink, Role, RoleFilter, SpatialQuery, TargetRoster};

/// Plain health pool that reports death exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
    died: bool,
}

impl Health {
    /// Creates a full health pool. Negative or non-finite maxima become zero.
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self::with_current(max, max)
    }

    /// Creates a health pool holding `current` out of `max`.
    #[must_use]
    pub fn with_current(max: f32, current: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        let current = if current.is_finite() {
            current.clamp(0.0, max)
        } else {
            0.0
        };
        Self {
            current,
            max,
            died: current <= 0.0,
        }
    }

    /// Overwrites the remaining health, clamped to the maximum.
    ///
    /// Hosts use this to model healing or scripted health changes. Raising
    /// health above zero re-arms the death report.
    pub fn set_current(&mut self, current: f32) {
        if !current.is_finite() {
            return;
        }
        self.current = current.clamp(0.0, self.max);
        self.died = self.current <= 0.0;
    }
}

impl HealthSink for Health {
    fn apply_damage(&mut self, amount: f32) -> bool {
        if !amount.is_finite() || amount <= 0.0 || self.died {
            return false;
        }

        self.current = (self.current - amount).max(0.0);
        if self.current <= 0.0 {
            self.died = true;
            return true;
        }
        false
    }

    fn current_health(&self) -> f32 {
        self.current
    }

    fn max_health(&self) -> f32 {
        self.max
    }
}

/// Chase participant with a position and a health pool.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    /// World position of the participant.
    pub position: Vec3,
    /// Health pool receiving boss damage.
    pub health: Health,
}

impl Combatant {
    /// Creates a participant at `position` with full health.
    #[must_use]
    pub fn new(position: Vec3, max_health: f32) -> Self {
        Self {
            position,
            health: Health::new(max_health),
        }
    }
}

/// Runner plus optional companion, answering spatial queries by distance.
#[derive(Clone, Debug, PartialEq)]
pub struct Roster {
    primary: Combatant,
    companion: Option<Combatant>,
}

impl Roster {
    /// Creates a roster containing only the runner.
    #[must_use]
    pub fn new(primary: Combatant) -> Self {
        Self {
            primary,
            companion: None,
        }
    }

    /// Adds a companion to the roster.
    #[must_use]
    pub fn with_companion(mut self, companion: Combatant) -> Self {
        self.companion = Some(companion);
        self
    }

    /// Participant occupying the role, if present.
    #[must_use]
    pub fn combatant(&self, role: Role) -> Option<&Combatant> {
        match role {
            Role::Primary => Some(&self.primary),
            Role::Companion => self.companion.as_ref(),
        }
    }

    /// Mutable participant occupying the role, if present.
    pub fn combatant_mut(&mut self, role: Role) -> Option<&mut Combatant> {
        match role {
            Role::Primary => Some(&mut self.primary),
            Role::Companion => self.companion.as_mut(),
        }
    }
}

impl SpatialQuery for Roster {
    fn targets_within(&self, center: Vec3, radius: f32, filter: RoleFilter) -> Vec<Role> {
        if !radius.is_finite() || radius < 0.0 {
            return Vec::new();
        }

        [Role::Primary, Role::Companion]
            .into_iter()
            .filter(|role| filter.matches(*role))
            .filter(|role| {
                self.combatant(*role)
                    .is_some_and(|combatant| combatant.position.distance(center) <= radius)
            })
            .collect()
    }
}

impl TargetRoster for Roster {
    fn position(&self, role: Role) -> Option<Vec3> {
        self.combatant(role).map(|combatant| combatant.position)
    }

    fn health_sink(&mut self, role: Role) -> Option<&mut dyn HealthSink> {
        self.combatant_mut(role)
            .map(|combatant| &mut combatant.health as &mut dyn HealthSink)
    }
}
