//=========================================================================
// Lifecycle Dispatcher
//=========================================================================
//
// Applies the lazy-start-then-update protocol and the pause/resume
// protocol to a single unit. Every hook call is guarded: an `Err` or a
// panic becomes a `LifecycleError` for the caller to report, and never
// escapes further.
//
// Per frame (driven by Game::tick):
//   for each unit: per_frame_update      (trigger_start + update)
//   for each unit: per_frame_late_update
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

//=== Internal Dependencies ===============================================

use super::{Behaviour, Slot};
use crate::core::context::GameContext;
use crate::core::error::{Hook, HookResult, LifecycleError};
use crate::core::ticker::FrameEvent;

/// Outcome of a single guarded hook call.
pub(crate) type Dispatch = Result<(), LifecycleError>;

//=== Guard ===============================================================

/// Runs one hook body against `unit`, converting `Err` and panics into
/// `LifecycleError` tagged with the unit's declared name.
pub(crate) fn guarded<T>(
    hook: Hook,
    unit: &mut T,
    body: impl FnOnce(&mut T) -> HookResult,
) -> Dispatch
where
    T: Behaviour + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *unit)));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(LifecycleError::HookFailed {
            unit: unit.name().to_owned(),
            hook,
            source,
        }),
        Err(payload) => Err(LifecycleError::HookPanicked {
            unit: unit.name().to_owned(),
            hook,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

//=== Dispatch Operations =================================================

/// Calls `start` the first time a unit is dispatched.
///
/// The unit is marked started even if `start` fails; it is never retried.
pub(crate) fn trigger_start<T>(slot: &mut Slot<T>, ctx: &mut GameContext) -> Dispatch
where
    T: Behaviour + ?Sized,
{
    if slot.is_started() {
        return Ok(());
    }

    let result = guarded(Hook::Start, &mut *slot.unit, |unit| unit.start(ctx));
    slot.mark_started();
    result
}

/// Lazy start followed by `update`.
///
/// Both outcomes are returned; a failed start does not skip the update.
pub(crate) fn per_frame_update<T>(
    slot: &mut Slot<T>,
    ctx: &mut GameContext,
    frame: &FrameEvent,
) -> (Dispatch, Dispatch)
where
    T: Behaviour + ?Sized,
{
    let started = trigger_start(slot, ctx);
    let updated = guarded(Hook::Update, &mut *slot.unit, |unit| unit.update(ctx, frame));
    (started, updated)
}

pub(crate) fn per_frame_late_update<T>(
    slot: &mut Slot<T>,
    ctx: &mut GameContext,
    frame: &FrameEvent,
) -> Dispatch
where
    T: Behaviour + ?Sized,
{
    guarded(Hook::LateUpdate, &mut *slot.unit, |unit| unit.late_update(ctx, frame))
}

pub(crate) fn pause_unit<T>(slot: &mut Slot<T>, ctx: &mut GameContext) -> Dispatch
where
    T: Behaviour + ?Sized,
{
    guarded(Hook::OnPause, &mut *slot.unit, |unit| unit.on_pause(ctx))
}

pub(crate) fn resume_unit<T>(slot: &mut Slot<T>, ctx: &mut GameContext) -> Dispatch
where
    T: Behaviour + ?Sized,
{
    guarded(Hook::OnResume, &mut *slot.unit, |unit| unit.on_resume(ctx))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::GameId;

    #[derive(Default)]
    struct Tally {
        starts: u32,
        updates: u32,
        fail_start: bool,
        panic_update: bool,
    }

    impl Behaviour for Tally {
        fn start(&mut self, _ctx: &mut GameContext) -> HookResult {
            self.starts += 1;
            if self.fail_start {
                return Err("cold engine".into());
            }
            Ok(())
        }

        fn update(&mut self, _ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
            self.updates += 1;
            if self.panic_update {
                panic!("update exploded");
            }
            Ok(())
        }
    }

    fn tally_slot(tally: Tally) -> Slot<Tally> {
        Slot::new(Box::new(tally))
    }

    fn ctx() -> GameContext {
        GameContext::new(GameId::next(), true)
    }

    #[test]
    fn start_runs_once_across_frames() {
        let mut slot = tally_slot(Tally::default());
        let mut ctx = ctx();
        let frame = FrameEvent::first(120.0);

        for _ in 0..3 {
            let (started, updated) = per_frame_update(&mut slot, &mut ctx, &frame);
            assert!(started.is_ok());
            assert!(updated.is_ok());
        }

        assert_eq!(slot.unit.starts, 1);
        assert_eq!(slot.unit.updates, 3);
    }

    #[test]
    fn failed_start_is_marked_and_not_retried() {
        let mut slot = tally_slot(Tally {
            fail_start: true,
            ..Tally::default()
        });
        let mut ctx = ctx();

        let err = trigger_start(&mut slot, &mut ctx).unwrap_err();
        assert_eq!(err.unit(), "Tally");
        assert_eq!(err.hook(), Hook::Start);
        assert!(slot.is_started());

        assert!(trigger_start(&mut slot, &mut ctx).is_ok());
        assert_eq!(slot.unit.starts, 1);
    }

    #[test]
    fn failed_start_still_updates() {
        let mut slot = tally_slot(Tally {
            fail_start: true,
            ..Tally::default()
        });
        let mut ctx = ctx();

        let (started, updated) = per_frame_update(&mut slot, &mut ctx, &FrameEvent::first(60.0));
        assert!(started.is_err());
        assert!(updated.is_ok());
        assert_eq!(slot.unit.updates, 1);
    }

    #[test]
    fn panic_in_update_is_contained() {
        let mut slot = tally_slot(Tally {
            panic_update: true,
            ..Tally::default()
        });
        let mut ctx = ctx();

        let (_, updated) = per_frame_update(&mut slot, &mut ctx, &FrameEvent::first(60.0));
        match updated {
            Err(LifecycleError::HookPanicked { unit, hook, message }) => {
                assert_eq!(unit, "Tally");
                assert_eq!(hook, Hook::Update);
                assert_eq!(message, "update exploded");
            }
            other => panic!("expected a contained panic, got {:?}", other),
        }
    }

    #[test]
    fn absent_hooks_succeed() {
        let mut slot = tally_slot(Tally::default());
        let mut ctx = ctx();

        assert!(per_frame_late_update(&mut slot, &mut ctx, &FrameEvent::first(60.0)).is_ok());
        assert!(pause_unit(&mut slot, &mut ctx).is_ok());
        assert!(resume_unit(&mut slot, &mut ctx).is_ok());
    }
}
