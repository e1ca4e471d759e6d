//=========================================================================
// GameObject & Component
//=========================================================================
//
// A GameObject is a named, ordered list of Components. Each component
// sits in a Slot so the orchestrator can track its lazy `start`.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::error::{Hook, HookResult, LifecycleError};
use crate::core::lifecycle::dispatcher::guarded;
use crate::core::lifecycle::{Behaviour, Slot};

//=== Component Trait =====================================================

/// Scene-scoped lifecycle unit attached to a [`GameObject`].
pub trait Component: Behaviour {
    /// Called when the owning scene is destroyed.
    fn on_destroy(&mut self) -> HookResult {
        Ok(())
    }
}

//=== GameObject ==========================================================

/// Named container of components, dispatched in attachment order.
pub struct GameObject {
    name: String,
    components: Vec<Slot<dyn Component>>,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// Builder-style [`add_component`](Self::add_component).
    pub fn with_component<C: Component>(mut self, component: C) -> Self {
        self.add_component(component);
        self
    }

    pub fn add_component<C: Component>(&mut self, component: C) {
        self.components.push(Slot::new(Box::new(component)));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn Component> + '_ {
        self.components.iter().map(|slot| &*slot.unit)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// First component of type `C`.
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components
            .iter()
            .find_map(|slot| (*slot.unit).as_any().downcast_ref::<C>())
    }

    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find_map(|slot| (*slot.unit).as_any_mut().downcast_mut::<C>())
    }

    /// Whether the component at `index` has gone through its lazy start.
    pub fn is_component_started(&self, index: usize) -> Option<bool> {
        self.components.get(index).map(Slot::is_started)
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<dyn Component>] {
        &mut self.components
    }

    pub(crate) fn destroy_components(&mut self) -> Vec<LifecycleError> {
        self.components
            .iter_mut()
            .filter_map(|slot| guarded(Hook::Destroy, &mut *slot.unit, |c| c.on_destroy()).err())
            .collect()
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.components().map(|c| c.name()).collect();
        f.debug_struct("GameObject")
            .field("name", &self.name)
            .field("components", &names)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
