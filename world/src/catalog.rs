//! Template catalog mapping compact identifiers to instantiable definitions.

use std::collections::HashMap;

use hound_chase_core::{Category, Fault, TemplateId};

/// Blueprint cloned by the pool whenever it allocates an instance.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateDefinition {
    name: String,
    category: Category,
    base_scale: f32,
}

impl TemplateDefinition {
    /// Human readable name the template was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classification used by the repurposer and the obstacle field.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Scale applied to freshly acquired instances.
    #[must_use]
    pub const fn base_scale(&self) -> f32 {
        self.base_scale
    }
}

/// Small id table of every template the pool can instantiate.
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    definitions: Vec<TemplateDefinition>,
    by_name: HashMap<String, TemplateId>,
}

impl TemplateCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template and returns its identifier.
    ///
    /// Names are unique. Registering a known name returns the existing
    /// identifier and leaves the original definition in place. A base scale
    /// that is not a positive finite number falls back to `1.0`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        category: Category,
        base_scale: f32,
    ) -> TemplateId {
        let name = name.into();
        if let Some(existing) = self.by_name.get(&name) {
            let _ = Fault::RedundantStateEntry("template already registered").report();
            return *existing;
        }

        let base_scale = if base_scale.is_finite() && base_scale > 0.0 {
            base_scale
        } else {
            let _ = Fault::InvalidConfiguration(format!(
                "template `{name}` has base scale {base_scale}, using 1.0"
            ))
            .report();
            1.0
        };

        let id = TemplateId::new(self.definitions.len() as u32);
        self.definitions.push(TemplateDefinition {
            name: name.clone(),
            category,
            base_scale,
        });
        let _ = self.by_name.insert(name, id);
        id
    }

    /// Resolves a template name to its identifier.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<TemplateId> {
        self.by_name.get(name).copied()
    }

    /// Retrieves the definition registered under the identifier.
    #[must_use]
    pub fn definition(&self, id: TemplateId) -> Option<&TemplateDefinition> {
        self.definitions.get(id.get() as usize)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Reports whether no template has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates over identifiers and definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TemplateId, &TemplateDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(index, definition)| (TemplateId::new(index as u32), definition))
    }
}
