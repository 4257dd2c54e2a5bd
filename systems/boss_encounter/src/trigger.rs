/// Fires once when the runner crosses a distance checkpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncounterTrigger {
    checkpoint: f32,
    armed: bool,
}

impl EncounterTrigger {
    /// Arms a trigger at `checkpoint` units of travelled distance.
    #[must_use]
    pub const fn new(checkpoint: f32) -> Self {
        Self {
            checkpoint,
            armed: true,
        }
    }

    /// Returns `true` on the first observation at or beyond the checkpoint.
    pub fn observe(&mut self, travelled: f32) -> bool {
        if !self.armed || travelled < self.checkpoint {
            return false;
        }
        self.armed = false;
        log::debug!("encounter checkpoint {} crossed at {travelled}", self.checkpoint);
        true
    }

    /// Arms the trigger again at a new checkpoint.
    pub fn rearm(&mut self, checkpoint: f32) {
        self.checkpoint = checkpoint;
        self.armed = true;
    }

    /// Reports whether the trigger can still fire.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Distance at which the trigger fires.
    #[must_use]
    pub const fn checkpoint(&self) -> f32 {
        self.checkpoint
    }
}
