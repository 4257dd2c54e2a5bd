use thiserror::Error;

use crate::InstanceHandle;

/// Recoverable faults detected by the chase systems.
///
/// None of these are fatal. The component that detects a fault logs it,
/// skips the affected operation and keeps its own state consistent.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    /// A required external collaborator was absent.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
    /// Configuration could not be used as provided.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The instance was already free when released.
    #[error("instance {0:?} released twice")]
    DoubleRelease(InstanceHandle),
    /// The handle does not name a pooled instance.
    #[error("instance {0:?} is not tracked by the pool")]
    UnknownInstance(InstanceHandle),
    /// The requested transition was already satisfied.
    #[error("redundant state entry: {0}")]
    RedundantStateEntry(&'static str),
    /// The requested ability has not finished cooling down.
    #[error("ability cooling down: {0}")]
    AbilityCoolingDown(&'static str),
}

impl Fault {
    /// Logs the fault at warning level and hands it back to the caller.
    pub fn report(self) -> Self {
        log::warn!("{self}");
        self
    }
}
