use std::time::Duration;

/// Temporary modifier phase layered over the approach/attack cadence.
///
/// Tantrum and Overclocked share one slot, so they can never be active at
/// the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OverlayState {
    /// No modifier active.
    #[default]
    None,
    /// Raging with boosted speed and damage.
    Tantrum {
        /// Time left before the tantrum ends.
        remaining: Duration,
    },
    /// Pulsing or sustaining the overclocked frenzy.
    Overclocked {
        /// Current stage of the overclocked sequence.
        stage: OverclockStage,
    },
}

impl OverlayState {
    /// Reports whether any modifier is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Reports whether the boss is in a tantrum.
    #[must_use]
    pub const fn is_tantrum(&self) -> bool {
        matches!(self, Self::Tantrum { .. })
    }

    /// Reports whether the boss is overclocked.
    #[must_use]
    pub const fn is_overclocked(&self) -> bool {
        matches!(self, Self::Overclocked { .. })
    }
}

/// Progress through the overclocked sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverclockStage {
    /// Area pulses still queued.
    Pulsing {
        /// Pulses not yet emitted.
        pulses_left: u32,
        /// Time until the next pulse.
        next_pulse_in: Duration,
    },
    /// Pulses finished; multipliers stay elevated.
    Sustaining {
        /// Time left before overclocking ends.
        remaining: Duration,
    },
}

/// Abilities gated by their own cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ability {
    /// Tantrum overlay.
    Tantrum,
    /// Overclocked overlay.
    Overclocked,
    /// Distraction window.
    Distraction,
}

/// Independently ticking cooldown; ready once it reaches zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cooldown {
    remaining: Duration,
}

impl Cooldown {
    pub(crate) fn start(&mut self, duration: Duration) {
        self.remaining = duration;
    }

    pub(crate) fn advance(&mut self, step: Duration) {
        self.remaining = self.remaining.saturating_sub(step);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.remaining.is_zero()
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.remaining
    }
}
