//=========================================================================
// System Contract
//=========================================================================
//
// Systems are global, scene-independent lifecycle units. They share the
// per-frame hooks of `Behaviour` and add registration-time hooks.
//
// Registration order (see Game::add_system):
//   init(params) → set_system_observer → init_observer → awake → append
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::context::GameContext;
use crate::core::error::{HookResult, RegistrationError};
use crate::core::lifecycle::{short_type_name, Behaviour};

//=== Params ==============================================================

/// Free-form parameters for system `init` hooks and scene loads.
pub type Params = toml::Table;

//=== System Trait ========================================================

/// A global lifecycle unit.
///
/// At most one instance of each concrete type may be registered with a
/// game at a time.
///
/// # Minimal Implementation
///
/// ```rust
/// use aetheric_gocs::prelude::*;
///
/// struct Gravity;
///
/// impl Behaviour for Gravity {}
/// impl System for Gravity {}
/// ```
pub trait System: Behaviour {
    /// Receives the registration params before observers are wired.
    fn init(&mut self, _params: &Params) -> HookResult {
        Ok(())
    }

    /// Called once after observer wiring, before the system joins the
    /// registry.
    fn awake(&mut self, _ctx: &mut GameContext) -> HookResult {
        Ok(())
    }

    /// Called when the system is removed from the registry.
    fn destroy(&mut self) -> HookResult {
        Ok(())
    }
}

//=== SystemId ============================================================

/// Identity of one registered system instance.
///
/// Returned by [`Game::add_system`](crate::Game::add_system); never reused
/// within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub(crate) u64);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

//=== SystemRef ===========================================================

/// Identifies a registered system for lookup or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemRef {
    /// A specific instance.
    Id(SystemId),

    /// Whatever instance has this concrete type.
    Type { type_id: TypeId, name: &'static str },

    /// The first instance whose declared name matches.
    Name(String),
}

impl SystemRef {
    /// Refers to the registered instance of type `S`.
    pub fn of<S: System>() -> Self {
        Self::Type {
            type_id: TypeId::of::<S>(),
            name: short_type_name(std::any::type_name::<S>()),
        }
    }
}

impl From<SystemId> for SystemRef {
    fn from(id: SystemId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for SystemRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for SystemRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for SystemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Type { name, .. } => write!(f, "type {}", name),
            Self::Name(name) => write!(f, "{:?}", name),
        }
    }
}

//=== Observer Wiring =====================================================

/// Hook point for reactive-property bindings on newly registered systems.
///
/// Both calls receive the system and its concrete type. The default
/// implementations do nothing.
pub trait ObserverWiring {
    fn set_system_observer(&mut self, _system: &mut dyn System, _type_id: TypeId) {}

    fn init_observer(&mut self, _system: &mut dyn System, _type_id: TypeId) {}
}

/// Observer wiring that binds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl ObserverWiring for NoObserver {}

//=== SystemFactory =======================================================

type Constructor = Box<dyn Fn() -> Box<dyn System>>;

/// Name-keyed system constructors.
///
/// Lets configuration files and hooks create systems by name
/// (see [`Game::spawn_system`](crate::Game::spawn_system)).
#[derive(Default)]
pub struct SystemFactory {
    constructors: HashMap<String, Constructor>,
}

impl SystemFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `name`, replacing any previous one.
    pub fn register<S, F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        S: System,
        F: Fn() -> S + 'static,
    {
        let name = name.into();
        let boxed: Constructor = Box::new(move || -> Box<dyn System> { Box::new(constructor()) });
        if self.constructors.insert(name.clone(), boxed).is_some() {
            warn!("System constructor {:?} was already registered and has been replaced", name);
        }
        self
    }

    /// Registers `S::default` under `name`.
    pub fn register_default<S>(&mut self, name: impl Into<String>) -> &mut Self
    where
        S: System + Default,
    {
        self.register(name, S::default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Builds a fresh instance of the system registered as `name`.
    pub fn construct(&self, name: &str) -> Result<Box<dyn System>, RegistrationError> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| RegistrationError::UnknownSystem {
                name: name.to_owned(),
            })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Physics {
        gravity: f32,
    }
    impl Behaviour for Physics {}
    impl System for Physics {}

    #[test]
    fn system_ref_of_type_uses_short_name() {
        match SystemRef::of::<Physics>() {
            SystemRef::Type { type_id, name } => {
                assert_eq!(type_id, TypeId::of::<Physics>());
                assert_eq!(name, "Physics");
            }
            other => panic!("unexpected ref {:?}", other),
        }
    }

    #[test]
    fn system_ref_conversions() {
        assert_eq!(SystemRef::from("Physics"), SystemRef::Name("Physics".into()));
        assert_eq!(SystemRef::from(SystemId(3)), SystemRef::Id(SystemId(3)));
        assert_eq!(SystemRef::from(SystemId(3)).to_string(), "system#3");
    }

    #[test]
    fn factory_constructs_registered_systems() {
        let mut factory = SystemFactory::new();
        factory
            .register("physics", || Physics { gravity: 9.8 })
            .register_default::<Physics>("physics.zero");

        let system = factory.construct("physics").unwrap();
        let physics = (*system).as_any().downcast_ref::<Physics>().unwrap();
        assert_eq!(physics.gravity, 9.8);

        assert!(factory.contains("physics.zero"));
    }

    #[test]
    fn factory_rejects_unknown_names() {
        let factory = SystemFactory::new();
        let err = factory.construct("missing").err().unwrap();
        assert_eq!(
            err,
            RegistrationError::UnknownSystem {
                name: "missing".into()
            }
        );
    }
}
