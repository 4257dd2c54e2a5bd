#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Converts destroyed obstacles into enlarged defensive traps.

use glam::{Quat, Vec3};
use hound_chase_core::{Category, Event, Fault, InstanceHandle, TemplateId};
use hound_chase_world::PooledInstancePool;

/// Default enlargement applied to traps on top of their template scale.
pub const DEFAULT_TRAP_SCALE: f32 = 1.5;

/// One-way obstacle to trap converter.
#[derive(Clone, Debug)]
pub struct ObstacleRepurposer {
    trap_template: Option<TemplateId>,
    scale_factor: f32,
}

impl ObstacleRepurposer {
    /// Creates a repurposer that produces `trap_template` instances.
    ///
    /// Without a trap template every conversion request is declined.
    #[must_use]
    pub fn new(trap_template: Option<TemplateId>) -> Self {
        Self {
            trap_template,
            scale_factor: DEFAULT_TRAP_SCALE,
        }
    }

    /// Overrides the enlargement factor. Non-positive factors are ignored.
    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        } else {
            let _ = Fault::InvalidConfiguration(format!(
                "trap scale factor {scale_factor} ignored"
            ))
            .report();
        }
        self
    }

    /// Replaces a live obstacle with a trap at the hit location.
    ///
    /// The obstacle goes back to its pool through a normal release; it is
    /// never reactivated here. The trap faces along `hit_normal` and is
    /// scaled by the configured factor. Returns `false` without side effects
    /// when the pool or trap template is missing or `hit` is not a live
    /// obstacle.
    pub fn try_repurpose(
        &self,
        pool: Option<&mut PooledInstancePool>,
        hit: InstanceHandle,
        hit_position: Vec3,
        hit_normal: Vec3,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(pool) = pool else {
            let _ = Fault::MissingCollaborator("instance pool").report();
            return false;
        };
        let Some(trap_template) = self.trap_template else {
            let _ = Fault::MissingCollaborator("trap template").report();
            return false;
        };
        if !pool.is_live(hit) || pool.category(hit) != Some(Category::Obstacle) {
            log::debug!("instance {} is not a live obstacle", hit.get());
            return false;
        }
        let base_scale = match pool.catalog().definition(trap_template) {
            Some(definition) if definition.category() == Category::Trap => {
                definition.base_scale()
            }
            Some(definition) => {
                let _ = Fault::InvalidConfiguration(format!(
                    "trap template {} is a {:?}, not a trap",
                    trap_template.get(),
                    definition.category()
                ))
                .report();
                return false;
            }
            None => {
                let _ = Fault::InvalidConfiguration(format!(
                    "trap template {} is not registered",
                    trap_template.get()
                ))
                .report();
                return false;
            }
        };

        if pool.release(hit).is_err() {
            return false;
        }

        let orientation = hit_normal
            .try_normalize()
            .map_or(Quat::IDENTITY, |normal| Quat::from_rotation_arc(Vec3::Y, normal));
        let Some(trap) = pool.acquire(trap_template, hit_position, orientation) else {
            return false;
        };
        let _ = pool.set_scale(trap, base_scale * self.scale_factor);

        log::debug!("repurposed obstacle {} into trap {}", hit.get(), trap.get());
        out_events.push(Event::ObstacleRepurposed {
            obstacle: hit,
            trap,
        });
        true
    }
}
