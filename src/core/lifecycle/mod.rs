//=========================================================================
// Lifecycle
//=========================================================================
//
// Shared hook contract for Systems and Components, plus the dispatcher
// that invokes hooks with per-unit failure containment.
//
// Architecture:
//   Behaviour (start, update, late_update, on_pause, on_resume)
//     ├─ System    (+ init, awake, destroy)
//     └─ Component (+ on_destroy, scene-owned)
//
//   Slot<T> = unit + orchestrator-owned `started` flag
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== Internal Dependencies ===============================================

use crate::core::context::GameContext;
use crate::core::error::HookResult;
use crate::core::ticker::FrameEvent;

//=== Module Declarations =================================================

pub(crate) mod dispatcher;

//=== AsAny ===============================================================

/// Upcast helper used for type identity and downcasting of trait objects.
///
/// Blanket-implemented for every `'static` type; never implement by hand.
/// Call it on the trait object (`(*boxed).as_any()`), not on the `Box`,
/// or the box itself is what gets upcast.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=== Behaviour Trait =====================================================

/// Per-frame lifecycle hooks shared by Systems and Components.
///
/// Every hook is optional. The default implementations do nothing and
/// succeed, which the dispatcher treats the same as an absent hook.
///
/// Hooks may fail by returning `Err` or by panicking; either way the
/// failure is contained to this unit and the frame carries on.
pub trait Behaviour: AsAny {
    /// Declared name used in failure reports and name lookups.
    ///
    /// Defaults to the unqualified type name.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called once, lazily, on the first frame this unit is dispatched.
    fn start(&mut self, _ctx: &mut GameContext) -> HookResult {
        Ok(())
    }

    /// Called every frame while the game is playing.
    fn update(&mut self, _ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
        Ok(())
    }

    /// Called every frame after every unit of the same kind has updated.
    fn late_update(&mut self, _ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
        Ok(())
    }

    fn on_pause(&mut self, _ctx: &mut GameContext) -> HookResult {
        Ok(())
    }

    fn on_resume(&mut self, _ctx: &mut GameContext) -> HookResult {
        Ok(())
    }
}

/// Strips the module path from a `type_name` result.
///
/// Generic parameters are kept intact (`Pool<Bullet>` stays readable).
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

//=== Slot ================================================================

/// A lifecycle unit together with its orchestrator-owned `started` flag.
pub(crate) struct Slot<T: ?Sized> {
    started: bool,
    pub(crate) unit: Box<T>,
}

impl<T: ?Sized> Slot<T> {
    pub(crate) fn new(unit: Box<T>) -> Self {
        Self { started: false, unit }
    }

    pub(crate) fn is_started(&self) -> bool {
        self.started
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
