//=========================================================================
// Command Queue
//=========================================================================
//
// FIFO queues of mutations requested by hooks. The orchestrator drains
// them at unit boundaries (registry) and at frame end (deferred).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

//=== Internal Dependencies ===============================================

use crate::core::scene::LoadSceneRequest;
use crate::core::system::{Params, System, SystemRef};

//=== Commands ============================================================

/// System registry mutation.
pub(crate) enum RegistryCommand {
    Add { system: Box<dyn System>, params: Params },
    Remove(SystemRef),
}

/// Mutation applied once the current frame has finished.
pub(crate) enum DeferredCommand {
    LoadScene(LoadSceneRequest),
    Pause,
    Destroy,
}

//=== CommandQueue ========================================================

#[derive(Default)]
pub(crate) struct CommandQueue {
    registry: VecDeque<RegistryCommand>,
    deferred: VecDeque<DeferredCommand>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_registry(&mut self, command: RegistryCommand) {
        self.registry.push_back(command);
    }

    pub(crate) fn push_deferred(&mut self, command: DeferredCommand) {
        self.deferred.push_back(command);
    }

    /// Pops the oldest registry command.
    ///
    /// Applying a command may queue more (an `awake` hook adding another
    /// system), so callers drain with `while let` rather than `drain(..)`.
    pub(crate) fn pop_registry(&mut self) -> Option<RegistryCommand> {
        self.registry.pop_front()
    }

    pub(crate) fn pop_deferred(&mut self) -> Option<DeferredCommand> {
        self.deferred.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn registry_len(&self) -> usize {
        self.registry.len()
    }

    #[cfg(test)]
    pub(crate) fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.deferred.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
