use glam::Vec3;
use hound_chase_core::{Fault, WeakPointId};

use crate::config::WeakPointSpec;

/// Sub-target on the boss with independent health.
#[derive(Clone, Debug, PartialEq)]
pub struct WeakPoint {
    id: WeakPointId,
    current_health: f32,
    max_health: f32,
    destroyed: bool,
    offset: Vec3,
}

impl WeakPoint {
    /// Identifier of the weak point.
    #[must_use]
    pub const fn id(&self) -> WeakPointId {
        self.id
    }

    /// Remaining health.
    #[must_use]
    pub const fn current_health(&self) -> f32 {
        self.current_health
    }

    /// Starting health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Reports whether the weak point has been destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Offset from the boss origin.
    #[must_use]
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }
}

/// Result of damaging a weak point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WeakPointHit {
    Ignored,
    Damaged,
    Destroyed { destroyed: u32, defeats: bool },
}

#[derive(Clone, Debug)]
pub(crate) struct WeakPoints {
    points: Vec<WeakPoint>,
    destroyed: u32,
    required: Option<u32>,
}

impl WeakPoints {
    /// Builds the weak point set, skipping malformed entries.
    ///
    /// The alternate defeat path is disabled when `required` is zero or
    /// exceeds the number of usable weak points.
    pub(crate) fn from_specs(specs: &[WeakPointSpec], required: u32) -> Self {
        let points: Vec<WeakPoint> = specs
            .iter()
            .filter(|entry| {
                let usable = entry.max_health.is_finite() && entry.max_health > 0.0;
                if !usable {
                    let _ = Fault::InvalidConfiguration(format!(
                        "weak point with max health {} skipped",
                        entry.max_health
                    ))
                    .report();
                }
                usable
            })
            .enumerate()
            .map(|(index, entry)| WeakPoint {
                id: WeakPointId::new(index as u32),
                current_health: entry.max_health,
                max_health: entry.max_health,
                destroyed: false,
                offset: entry.offset,
            })
            .collect();

        let required = if required == 0 {
            None
        } else if required as usize > points.len() {
            let _ = Fault::InvalidConfiguration(format!(
                "{required} weak points required but only {} configured; health-only defeat",
                points.len()
            ))
            .report();
            None
        } else {
            Some(required)
        };

        Self {
            points,
            destroyed: 0,
            required,
        }
    }

    pub(crate) fn as_slice(&self) -> &[WeakPoint] {
        &self.points
    }

    pub(crate) fn destroyed(&self) -> u32 {
        self.destroyed
    }

    pub(crate) fn damage(&mut self, id: WeakPointId, amount: f32) -> WeakPointHit {
        if !amount.is_finite() || amount < 0.0 {
            log::warn!("ignored weak point damage of {amount}");
            return WeakPointHit::Ignored;
        }
        let Some(point) = self.points.get_mut(id.get() as usize) else {
            log::warn!("unknown weak point {}", id.get());
            return WeakPointHit::Ignored;
        };
        if point.destroyed {
            return WeakPointHit::Ignored;
        }

        point.current_health = (point.current_health - amount).max(0.0);
        if point.current_health > 0.0 {
            return WeakPointHit::Damaged;
        }

        point.destroyed = true;
        self.destroyed += 1;
        WeakPointHit::Destroyed {
            destroyed: self.destroyed,
            defeats: self.required.is_some_and(|required| self.destroyed >= required),
        }
    }
}
