//=========================================================================
// System Registry
//=========================================================================
//
// Registration, lookup and removal of Systems on a Game.
//
// Registration order:
//   reject (destroyed / duplicate type)
//     → assign id and game back-reference
//     → init(params) → set_system_observer → init_observer → awake
//     → append
//
// Registry order is dispatch order. Removal splices the entry out and
// keeps the relative order of the rest.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{Any, TypeId};

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::Game;
use crate::core::context::{GameContext, GameId};
use crate::core::error::{Hook, RegistrationError};
use crate::core::lifecycle::dispatcher;
use crate::core::lifecycle::Slot;
use crate::core::system::{Params, System, SystemId, SystemRef};

//=== SystemEntry =========================================================

/// One registered system and the orchestrator state kept beside it.
pub(super) struct SystemEntry {
    pub(super) id: SystemId,
    pub(super) type_id: TypeId,
    pub(super) game: GameId,
    pub(super) slot: Slot<dyn System>,
}

impl SystemEntry {
    fn name(&self) -> &str {
        self.slot.unit.name()
    }

    fn matches(&self, target: &SystemRef) -> bool {
        match target {
            SystemRef::Id(id) => self.id == *id,
            SystemRef::Type { type_id, .. } => self.type_id == *type_id,
            SystemRef::Name(name) => self.name() == name,
        }
    }

    fn status(&self) -> SystemStatus {
        SystemStatus {
            id: self.id,
            name: self.name().to_owned(),
            game: self.game,
            started: self.slot.is_started(),
        }
    }
}

//=== SystemStatus ========================================================

/// Snapshot of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub id: SystemId,
    pub name: String,

    /// The game the system was registered with.
    pub game: GameId,

    /// Whether `start` has been dispatched.
    pub started: bool,
}

//=== Registration ========================================================

impl Game {
    /// Registers `system` with empty init params.
    ///
    /// Returns `None`, leaving the registry untouched, if a system of the
    /// same type is already registered or the game is destroyed.
    pub fn add_system<S: System>(&mut self, system: S) -> Option<SystemId> {
        self.add_system_with(system, Params::new())
    }

    /// Registers `system`, passing `params` to its `init` hook.
    pub fn add_system_with<S: System>(&mut self, system: S, params: Params) -> Option<SystemId> {
        self.add_boxed_system(Box::new(system), params)
    }

    /// Registers a default-constructed `S`.
    pub fn add_system_default<S: System + Default>(&mut self) -> Option<SystemId> {
        self.add_system(S::default())
    }

    /// Constructs the system registered as `name` in the game's
    /// [`SystemFactory`](crate::core::system::SystemFactory) and registers it.
    pub fn spawn_system(&mut self, name: &str, params: &Params) -> Option<SystemId> {
        match self.factory.construct(name) {
            Ok(system) => self.add_boxed_system(system, params.clone()),
            Err(err) => {
                warn!("System registration rejected: {}", err);
                None
            }
        }
    }

    /// Like [`add_system_with`](Self::add_system_with), but reports why a
    /// registration was rejected.
    pub fn try_add_system<S: System>(
        &mut self,
        system: S,
        params: Params,
    ) -> Result<SystemId, RegistrationError> {
        self.try_add_boxed_system(Box::new(system), params)
    }

    pub(super) fn add_boxed_system(
        &mut self,
        system: Box<dyn System>,
        params: Params,
    ) -> Option<SystemId> {
        match self.try_add_boxed_system(system, params) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!("System registration rejected: {}", err);
                None
            }
        }
    }

    fn try_add_boxed_system(
        &mut self,
        system: Box<dyn System>,
        params: Params,
    ) -> Result<SystemId, RegistrationError> {
        let mut ctx = self.context();
        let id = self.register(system, params, &mut ctx)?;
        self.apply_commands(ctx);
        Ok(id)
    }

    /// Runs the registration sequence. Requests queued by `awake` land in
    /// `ctx` for the caller to apply.
    pub(super) fn register(
        &mut self,
        mut system: Box<dyn System>,
        params: Params,
        ctx: &mut GameContext,
    ) -> Result<SystemId, RegistrationError> {
        if self.is_destroyed() {
            return Err(RegistrationError::GameDestroyed);
        }

        let type_id = Any::type_id((*system).as_any());
        if self.systems.iter().any(|entry| entry.type_id == type_id) {
            return Err(RegistrationError::Duplicate {
                name: system.name().to_owned(),
            });
        }

        let id = SystemId(self.next_system_id);
        self.next_system_id += 1;

        let initialised = dispatcher::guarded(Hook::Init, &mut *system, |s| s.init(&params));
        self.reporter.check(initialised);

        self.observer.set_system_observer(&mut *system, type_id);
        self.observer.init_observer(&mut *system, type_id);

        let awoken = dispatcher::guarded(Hook::Awake, &mut *system, |s| s.awake(ctx));
        self.reporter.check(awoken);

        debug!("Registered system {} as {}", system.name(), id);
        self.systems.push(SystemEntry {
            id,
            type_id,
            game: self.id,
            slot: Slot::new(system),
        });

        Ok(id)
    }

    //--- Removal ----------------------------------------------------------

    /// Calls `destroy` on the system matching `target` and removes it.
    ///
    /// Returns `false`, doing nothing, if no system matches. The entry is
    /// removed even if `destroy` fails.
    pub fn remove_system(&mut self, target: impl Into<SystemRef>) -> bool {
        let target = target.into();
        let Some(index) = self.systems.iter().position(|entry| entry.matches(&target)) else {
            debug!("remove_system({}) ignored: no such system", target);
            return false;
        };

        let destroyed = {
            let entry = &mut self.systems[index];
            dispatcher::guarded(Hook::Destroy, &mut *entry.slot.unit, |s| s.destroy())
        };
        self.reporter.check(destroyed);

        let entry = self.systems.remove(index);
        debug!("Removed system {} ({})", entry.name(), entry.id);
        true
    }

    /// Removes every system, front to back.
    pub fn destroy_systems(&mut self) {
        while let Some(id) = self.systems.first().map(|entry| entry.id) {
            self.remove_system(id);
        }
    }

    //--- Lookup -----------------------------------------------------------

    /// First system matching `target`.
    pub fn get_system(&self, target: impl Into<SystemRef>) -> Option<&dyn System> {
        let target = target.into();
        self.systems
            .iter()
            .find(|entry| entry.matches(&target))
            .map(|entry| &*entry.slot.unit)
    }

    /// The registered instance of `S`.
    pub fn system<S: System>(&self) -> Option<&S> {
        let type_id = TypeId::of::<S>();
        self.systems
            .iter()
            .find(|entry| entry.type_id == type_id)
            .and_then(|entry| (*entry.slot.unit).as_any().downcast_ref::<S>())
    }

    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        let type_id = TypeId::of::<S>();
        self.systems
            .iter_mut()
            .find(|entry| entry.type_id == type_id)
            .and_then(|entry| (*entry.slot.unit).as_any_mut().downcast_mut::<S>())
    }

    pub fn system_id(&self, target: impl Into<SystemRef>) -> Option<SystemId> {
        let target = target.into();
        self.systems
            .iter()
            .find(|entry| entry.matches(&target))
            .map(|entry| entry.id)
    }

    pub fn has_system(&self, target: impl Into<SystemRef>) -> bool {
        self.system_id(target).is_some()
    }

    /// Whether the matching system has been started; `None` if absent.
    pub fn is_system_started(&self, target: impl Into<SystemRef>) -> Option<bool> {
        let target = target.into();
        self.systems
            .iter()
            .find(|entry| entry.matches(&target))
            .map(|entry| entry.slot.is_started())
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Registry entries in dispatch order.
    pub fn systems(&self) -> impl Iterator<Item = SystemStatus> + '_ {
        self.systems.iter().map(SystemEntry::status)
    }

    //--- Internal ---------------------------------------------------------

    pub(super) fn system_ids(&self) -> Vec<SystemId> {
        self.systems.iter().map(|entry| entry.id).collect()
    }

    /// Finds the entry for `id`, scanning forward from `cursor` and leaving
    /// the cursor on the match.
    ///
    /// Walking a snapshot in registry order therefore stays linear. Entries
    /// only move left (removals) or append (additions), so a miss ahead of
    /// the cursor falls back to the entries behind it.
    pub(super) fn entry_after(
        &mut self,
        cursor: &mut usize,
        id: SystemId,
    ) -> Option<&mut SystemEntry> {
        let start = (*cursor).min(self.systems.len());
        let index = self.systems[start..]
            .iter()
            .position(|entry| entry.id == id)
            .map(|offset| start + offset)
            .or_else(|| self.systems[..start].iter().position(|entry| entry.id == id))?;
        *cursor = index;
        self.systems.get_mut(index)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
