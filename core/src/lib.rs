#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hound Chase engine.
//!
//! This crate defines the surface that connects the pooled-instance world,
//! the pure chase systems, and the adapters driving them. Systems receive a
//! caller-owned `&mut Vec<Event>` and push typed [`Event`] values describing
//! every observable transition; adapters and tests drain that buffer instead
//! of registering per-event callbacks. Systems never own their external
//! collaborators. Health, spatial queries and target lookups are reached
//! through the traits declared here, and every collaborator is optional so a
//! broken host degrades a behavior instead of crashing the chase.

mod fault;
mod health;

pub use fault::Fault;
pub use health::{Combatant, Health, Roster};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a template registered in the template catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Creates a new template identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque handle to a pooled instance stored in the instance arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle(u32);

impl InstanceHandle {
    /// Creates a new instance handle with the provided arena index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the arena index backing the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a weak point on the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeakPointId(u32);

impl WeakPointId {
    /// Creates a new weak point identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Classification assigned to every template in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Plain obstacle spawned ahead of the runner.
    Obstacle,
    /// Enlarged defensive trap produced by repurposing an obstacle.
    Trap,
    /// Decoy prop used to distract the boss.
    Prop,
}

/// Targets the boss can damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// The runner being chased.
    Primary,
    /// The companion accompanying the runner.
    Companion,
}

/// Narrows spatial queries to particular roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleFilter {
    /// Matches every role.
    Any,
    /// Matches a single role.
    Only(Role),
}

impl RoleFilter {
    /// Reports whether the filter accepts the provided role.
    #[must_use]
    pub const fn matches(self, role: Role) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => matches!(
                (only, role),
                (Role::Primary, Role::Primary) | (Role::Companion, Role::Companion)
            ),
        }
    }
}

/// World transform applied to a pooled instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Position in world units.
    pub position: Vec3,
    /// Orientation of the instance.
    pub orientation: Quat,
    /// Uniform scale factor.
    pub scale: f32,
}

impl Pose {
    /// Creates a unit-scale pose at the provided position and orientation.
    #[must_use]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            scale: 1.0,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Reason the boss encounter ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefeatCause {
    /// Enough weak points were destroyed.
    WeakPoints,
    /// The boss health sink reported death.
    HealthDepleted,
    /// The host requested defeat directly.
    Forced,
}

/// Events broadcast by systems after processing a tick or request.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the obstacle field placed a pooled obstacle.
    ObstacleSpawned {
        /// Handle of the spawned instance.
        instance: InstanceHandle,
        /// Template the instance was acquired from.
        template: TemplateId,
        /// Lane index the obstacle occupies.
        lane: u32,
    },
    /// Confirms that an obstacle fell behind the runner and returned to the pool.
    ObstacleDespawned {
        /// Handle of the released instance.
        instance: InstanceHandle,
    },
    /// Confirms that a destroyed obstacle was converted into a trap.
    ObstacleRepurposed {
        /// Obstacle instance that was released.
        obstacle: InstanceHandle,
        /// Trap instance acquired in its place.
        trap: InstanceHandle,
    },
    /// Animation cue raised when the boss begins an attack wind-up.
    AttackStarted {
        /// Direction the boss faces while attacking.
        facing: Vec3,
    },
    /// Reports damage dealt by a completed attack.
    AttackLanded {
        /// Target that received the damage.
        role: Role,
        /// Amount of damage applied.
        amount: f32,
    },
    /// Announces that the boss entered a tantrum.
    TantrumStarted,
    /// Announces that the tantrum ran its course.
    TantrumEnded,
    /// Announces that the boss entered overclocked mode.
    OverclockedStarted,
    /// Reports a single overclocked area pulse.
    OverclockedPulse {
        /// One-based index of the pulse within the sequence.
        pulse: u32,
        /// Number of targets caught by the pulse.
        hits: u32,
    },
    /// Announces that overclocked mode ended.
    OverclockedEnded,
    /// Announces that the boss is distracted.
    DistractionStarted {
        /// Decoy prop acquired for the distraction, when a pool was available.
        prop: Option<InstanceHandle>,
    },
    /// Announces that the distraction window closed.
    DistractionEnded,
    /// Reports that a weak point lost its last health.
    WeakPointDestroyed {
        /// Weak point that was destroyed.
        weak_point: WeakPointId,
        /// Total weak points destroyed so far.
        destroyed: u32,
    },
    /// Announces that the boss was defeated.
    Defeated {
        /// Condition that ended the encounter.
        cause: DefeatCause,
    },
    /// Requests that the host remove the boss from the world.
    DespawnRequested,
}

/// External health component that receives damage.
pub trait HealthSink {
    /// Applies damage, returning `true` only on the call that kills.
    fn apply_damage(&mut self, amount: f32) -> bool;

    /// Remaining health.
    fn current_health(&self) -> f32;

    /// Health the sink started with.
    fn max_health(&self) -> f32;

    /// Reports whether the sink has been depleted.
    fn is_dead(&self) -> bool {
        self.current_health() <= 0.0
    }

    /// Remaining health as a fraction of maximum, if the maximum is positive.
    fn health_fraction(&self) -> Option<f32> {
        let max = self.max_health();
        if max > 0.0 && max.is_finite() {
            Some((self.current_health() / max).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

/// Finds targets around a point.
pub trait SpatialQuery {
    /// Lists every target within `radius` of `center` accepted by `filter`.
    fn targets_within(&self, center: Vec3, radius: f32, filter: RoleFilter) -> Vec<Role>;
}

/// Resolves chase targets to positions and health sinks.
pub trait TargetRoster: SpatialQuery {
    /// Current position of the target, if it exists.
    fn position(&self, role: Role) -> Option<Vec3>;

    /// Health sink of the target, if it exists.
    fn health_sink(&mut self, role: Role) -> Option<&mut dyn HealthSink>;
}
