//=========================================================================
// Test Support
//=========================================================================
//
// Recording lifecycle units for unit tests. Every hook call is appended
// to a shared journal as "<label>.<hook>", so tests can assert on the
// exact dispatch order across Components and Systems.
//
//=========================================================================

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::core::context::GameContext;
use crate::core::error::{Hook, HookResult};
use crate::core::lifecycle::Behaviour;
use crate::core::scene::Component;
use crate::core::system::{Params, System};
use crate::core::ticker::FrameEvent;

/// Shared, ordered hook log.
pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Marker giving `Recorder` a second concrete type, so two can be
/// registered as Systems on one game.
pub(crate) enum Second {}

/// A System and Component that journals every hook it receives.
///
/// Can be told to fail or panic in one hook.
pub(crate) struct Recorder<M: 'static = ()> {
    label: String,
    log: Journal,
    fail: Option<Hook>,
    panic: Option<Hook>,
    _marker: PhantomData<fn() -> M>,
}

impl Recorder {
    pub(crate) fn new(label: &str, log: &Journal) -> Self {
        Self::tagged(label, log)
    }
}

impl<M: 'static> Recorder<M> {
    pub(crate) fn tagged(label: &str, log: &Journal) -> Self {
        Self {
            label: label.to_owned(),
            log: Rc::clone(log),
            fail: None,
            panic: None,
            _marker: PhantomData,
        }
    }

    /// Makes `hook` return an error.
    pub(crate) fn failing(mut self, hook: Hook) -> Self {
        self.fail = Some(hook);
        self
    }

    /// Makes `hook` panic.
    pub(crate) fn panicking(mut self, hook: Hook) -> Self {
        self.panic = Some(hook);
        self
    }

    fn record(&mut self, hook: Hook, entry: &str) -> HookResult {
        self.log.borrow_mut().push(format!("{}.{}", self.label, entry));
        if self.panic == Some(hook) {
            panic!("{} panicked in {}", self.label, entry);
        }
        if self.fail == Some(hook) {
            return Err(format!("{} failed in {}", self.label, entry).into());
        }
        Ok(())
    }
}

impl<M: 'static> Behaviour for Recorder<M> {
    fn name(&self) -> &str {
        &self.label
    }

    fn start(&mut self, _ctx: &mut GameContext) -> HookResult {
        self.record(Hook::Start, "start")
    }

    fn update(&mut self, _ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
        self.record(Hook::Update, "update")
    }

    fn late_update(&mut self, _ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
        self.record(Hook::LateUpdate, "late_update")
    }

    fn on_pause(&mut self, _ctx: &mut GameContext) -> HookResult {
        self.record(Hook::OnPause, "on_pause")
    }

    fn on_resume(&mut self, _ctx: &mut GameContext) -> HookResult {
        self.record(Hook::OnResume, "on_resume")
    }
}

impl<M: 'static> System for Recorder<M> {
    fn init(&mut self, _params: &Params) -> HookResult {
        self.record(Hook::Init, "init")
    }

    fn awake(&mut self, _ctx: &mut GameContext) -> HookResult {
        self.record(Hook::Awake, "awake")
    }

    fn destroy(&mut self) -> HookResult {
        self.record(Hook::Destroy, "destroy")
    }
}

impl<M: 'static> Component for Recorder<M> {
    fn on_destroy(&mut self) -> HookResult {
        self.record(Hook::Destroy, "on_destroy")
    }
}

/// Journal entries matching `suffix`, e.g. every `".update"`.
pub(crate) fn entries_ending(log: &Journal, suffix: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|entry| entry.ends_with(suffix))
        .cloned()
        .collect()
}
