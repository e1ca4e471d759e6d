//=========================================================================
// Listeners
//=========================================================================
//
// Synchronous observer lists owned by the Game:
//   scene listeners   - receive SceneChanged after every scene load
//   failure reporter  - logs each contained hook failure, then forwards
//                       it to failure listeners
//
// Delivery is immediate, on the calling thread, in registration order.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::error;

//=== Internal Dependencies ===============================================

use crate::core::error::LifecycleError;
use crate::core::lifecycle::dispatcher::Dispatch;
use crate::core::scene::SceneChanged;

//=== ListenerId ==========================================================

/// Handle returned when registering a listener; used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

//=== Listeners ===========================================================

/// Ordered list of boxed callbacks.
pub(crate) struct Listeners<F: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Box<F>)>,
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: Box<F>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<F>> + '_ {
        self.entries.iter_mut().map(|(_, listener)| listener)
    }
}

pub(crate) type SceneListener = dyn FnMut(&SceneChanged<'_>);
pub(crate) type FailureListener = dyn FnMut(&LifecycleError);

impl Listeners<SceneListener> {
    pub(crate) fn emit(&mut self, event: &SceneChanged<'_>) {
        for listener in self.iter_mut() {
            listener(event);
        }
    }
}

//=== FailureReporter =====================================================

/// Reporting channel for contained hook failures.
pub(crate) struct FailureReporter {
    listeners: Listeners<FailureListener>,
}

impl FailureReporter {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Listeners::new(),
        }
    }

    pub(crate) fn listeners(&mut self) -> &mut Listeners<FailureListener> {
        &mut self.listeners
    }

    pub(crate) fn report(&mut self, failure: LifecycleError) {
        error!(target: "gocs::lifecycle", "{}", failure);
        for listener in self.listeners.iter_mut() {
            listener(&failure);
        }
    }

    /// Reports the failure, if any, carried by a dispatch outcome.
    pub(crate) fn check(&mut self, outcome: Dispatch) {
        if let Err(failure) = outcome {
            self.report(failure);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Hook;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn failure(unit: &str) -> LifecycleError {
        LifecycleError::HookPanicked {
            unit: unit.into(),
            hook: Hook::Update,
            message: "boom".into(),
        }
    }

    #[test]
    fn listeners_get_distinct_ids() {
        let mut listeners: Listeners<FailureListener> = Listeners::new();
        let a = listeners.add(Box::new(|_: &LifecycleError| {}));
        let b = listeners.add(Box::new(|_: &LifecycleError| {}));

        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);
        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn reporter_forwards_to_every_listener_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reporter = FailureReporter::new();

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            reporter.listeners().add(Box::new(move |f: &LifecycleError| {
                seen.borrow_mut().push(format!("{}:{}", tag, f.unit()));
            }));
        }

        reporter.check(Ok(()));
        reporter.check(Err(failure("Radar")));

        assert_eq!(*seen.borrow(), vec!["first:Radar", "second:Radar"]);
    }
}
