#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative pooled-instance state for Hound Chase.
//!
//! Every obstacle, trap and decoy prop in the chase lives in a single dense
//! arena owned by [`PooledInstancePool`]. Systems address instances through
//! opaque [`InstanceHandle`] values and never touch the live/free
//! bookkeeping directly; they request acquisitions and releases and read
//! transforms back through queries.

mod catalog;

pub use catalog::{TemplateCatalog, TemplateDefinition};

use std::collections::{BTreeSet, VecDeque};

use glam::{Quat, Vec3};
use hound_chase_core::{Category, Fault, InstanceHandle, Pose, TemplateId};

/// Bookkeeping state of a single arena slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstanceState {
    /// Active in the world and owned by whichever system acquired it.
    Live,
    /// Inactive and queued for reuse.
    Free,
    /// Released while recycling was disabled; the handle is dead.
    Destroyed,
}

/// Instance stored in the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    template: TemplateId,
    pose: Pose,
    state: InstanceState,
}

impl Instance {
    /// Template the instance was cloned from.
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// Current world transform.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    /// Current bookkeeping state.
    #[must_use]
    pub const fn state(&self) -> InstanceState {
        self.state
    }

    /// Reports whether the instance is active in the world.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == InstanceState::Live
    }
}

#[derive(Clone, Debug, Default)]
struct PooledEntry {
    live: BTreeSet<InstanceHandle>,
    free: VecDeque<InstanceHandle>,
    allocations: u64,
}

/// Acquire/release registry keyed by template.
#[derive(Debug)]
pub struct PooledInstancePool {
    catalog: TemplateCatalog,
    instances: Vec<Instance>,
    entries: Vec<PooledEntry>,
    recycling: bool,
}

impl PooledInstancePool {
    /// Creates a recycling pool able to instantiate every catalog template.
    #[must_use]
    pub fn new(catalog: TemplateCatalog) -> Self {
        let entries = vec![PooledEntry::default(); catalog.len()];
        Self {
            catalog,
            instances: Vec::new(),
            entries,
            recycling: true,
        }
    }

    /// Disables recycling so released instances are destroyed instead of queued.
    #[must_use]
    pub fn without_recycling(mut self) -> Self {
        self.recycling = false;
        self
    }

    /// Template catalog backing the pool.
    #[must_use]
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Eagerly allocates `count` inactive instances of `template`.
    pub fn preload(&mut self, template: TemplateId, count: usize) {
        let Some(entry) = self.entries.get_mut(template.get() as usize) else {
            let _ = unregistered(template).report();
            return;
        };

        for _ in 0..count {
            let handle = InstanceHandle::new(self.instances.len() as u32);
            self.instances.push(Instance {
                template,
                pose: Pose::default(),
                state: InstanceState::Free,
            });
            entry.allocations += 1;
            entry.free.push_back(handle);
        }
        log::debug!(
            "preloaded {count} instances of template {}",
            template.get()
        );
    }

    /// Activates an instance of `template` at the provided transform.
    ///
    /// Reuses the oldest free instance and allocates only when none is free.
    /// Returns `None` only when the template is not registered.
    pub fn acquire(
        &mut self,
        template: TemplateId,
        position: Vec3,
        orientation: Quat,
    ) -> Option<InstanceHandle> {
        let Some(definition) = self.catalog.definition(template) else {
            let _ = unregistered(template).report();
            return None;
        };
        let scale = definition.base_scale();
        let entry = self.entries.get_mut(template.get() as usize)?;

        let handle = match entry.free.pop_front() {
            Some(handle) => handle,
            None => {
                let handle = InstanceHandle::new(self.instances.len() as u32);
                self.instances.push(Instance {
                    template,
                    pose: Pose::default(),
                    state: InstanceState::Free,
                });
                entry.allocations += 1;
                handle
            }
        };

        let instance = self.instances.get_mut(handle.get() as usize)?;
        instance.pose = Pose {
            position,
            orientation,
            scale,
        };
        instance.state = InstanceState::Live;
        let _ = entry.live.insert(handle);
        Some(handle)
    }

    /// Deactivates a live instance and requeues it under its template.
    ///
    /// Releasing an instance that is already free is reported as
    /// [`Fault::DoubleRelease`] and leaves the free queue untouched.
    pub fn release(&mut self, handle: InstanceHandle) -> Result<(), Fault> {
        let Some(instance) = self.instances.get_mut(handle.get() as usize) else {
            return Err(Fault::UnknownInstance(handle).report());
        };

        match instance.state {
            InstanceState::Live => {}
            InstanceState::Free => return Err(Fault::DoubleRelease(handle).report()),
            InstanceState::Destroyed => return Err(Fault::UnknownInstance(handle).report()),
        }

        let Some(entry) = self.entries.get_mut(instance.template.get() as usize) else {
            return Err(Fault::UnknownInstance(handle).report());
        };

        let _ = entry.live.remove(&handle);
        if self.recycling {
            instance.state = InstanceState::Free;
            entry.free.push_back(handle);
        } else {
            instance.state = InstanceState::Destroyed;
        }
        Ok(())
    }

    /// Rescales a live instance.
    pub fn set_scale(&mut self, handle: InstanceHandle, scale: f32) -> Result<(), Fault> {
        match self.instances.get_mut(handle.get() as usize) {
            Some(instance) if instance.state == InstanceState::Live => {
                instance.pose.scale = scale;
                Ok(())
            }
            _ => Err(Fault::UnknownInstance(handle).report()),
        }
    }

    /// Retrieves the instance behind a handle.
    #[must_use]
    pub fn instance(&self, handle: InstanceHandle) -> Option<&Instance> {
        self.instances.get(handle.get() as usize)
    }

    /// Reports whether the handle names a live instance.
    #[must_use]
    pub fn is_live(&self, handle: InstanceHandle) -> bool {
        self.instance(handle).is_some_and(Instance::is_active)
    }

    /// Category of the template the instance was cloned from.
    #[must_use]
    pub fn category(&self, handle: InstanceHandle) -> Option<Category> {
        let instance = self.instance(handle)?;
        self.catalog
            .definition(instance.template)
            .map(TemplateDefinition::category)
    }

    /// Live handles of `template` in ascending order.
    pub fn live_handles(&self, template: TemplateId) -> impl Iterator<Item = InstanceHandle> + '_ {
        self.entries
            .get(template.get() as usize)
            .into_iter()
            .flat_map(|entry| entry.live.iter().copied())
    }

    /// Free handles of `template` in reuse order.
    pub fn free_handles(&self, template: TemplateId) -> impl Iterator<Item = InstanceHandle> + '_ {
        self.entries
            .get(template.get() as usize)
            .into_iter()
            .flat_map(|entry| entry.free.iter().copied())
    }

    /// Number of instances allocated for `template` since the pool was created.
    #[must_use]
    pub fn allocations(&self, template: TemplateId) -> u64 {
        self.entries
            .get(template.get() as usize)
            .map_or(0, |entry| entry.allocations)
    }

    /// Number of live instances across every template.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.live.len()).sum()
    }

    /// Number of free instances across every template.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.free.len()).sum()
    }

    /// Number of instances that are either live or free.
    #[must_use]
    pub fn total_instances(&self) -> usize {
        self.live_count() + self.free_count()
    }
}

fn unregistered(template: TemplateId) -> Fault {
    Fault::InvalidConfiguration(format!("template {} is not registered", template.get()))
}
