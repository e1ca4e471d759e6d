//=========================================================================
// Game Context
//=========================================================================
//
// The handle every hook receives in place of a direct back-reference to
// the Game. Hooks cannot borrow the Game while it is iterating them, so
// requests for mutation are queued here and applied by the orchestrator
// at well-defined points.
//
// Architecture:
//   GameContext
//     ├─ game: GameId           (owning game, for identity checks)
//     ├─ playing: bool          (snapshot at hook invocation)
//     └─ commands: CommandQueue
//          ├─ registry: add/remove system   (applied at unit boundary)
//          └─ deferred: load scene, pause,  (applied at frame end)
//                       destroy
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicU64, Ordering};

//=== Internal Dependencies ===============================================

use crate::core::scene::LoadSceneRequest;
use crate::core::system::{Params, System, SystemRef};

//=== Module Declarations =================================================

mod command_queue;

//=== Public API ==========================================================

pub(crate) use command_queue::{CommandQueue, DeferredCommand, RegistryCommand};

//=== GameId ==============================================================

/// Process-unique identity of a [`Game`](crate::Game) instance.
///
/// Stored on every registered system as its back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(u64);

impl GameId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

//=== GameContext =========================================================

/// Per-invocation view of the game handed to lifecycle hooks.
///
/// Mutations requested through the context are not applied immediately.
/// Registry changes made from a System hook take effect as soon as that
/// hook returns; changes made from a Component hook take effect once all
/// GameObjects have been dispatched. Scene loads, pause and destroy take
/// effect when the current frame ends.
pub struct GameContext {
    game: GameId,
    playing: bool,
    pub(crate) commands: CommandQueue,
}

impl GameContext {
    pub(crate) fn new(game: GameId, playing: bool) -> Self {
        Self {
            game,
            playing,
            commands: CommandQueue::new(),
        }
    }

    /// Identity of the game running this hook.
    pub fn game(&self) -> GameId {
        self.game
    }

    /// Whether the game was playing when this context was created.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    //--- Registry Requests ------------------------------------------------

    /// Queues registration of `system` with empty init params.
    pub fn add_system<S: System>(&mut self, system: S) {
        self.add_system_with(system, Params::new());
    }

    /// Queues registration of `system`, passing `params` to its `init` hook.
    pub fn add_system_with<S: System>(&mut self, system: S, params: Params) {
        self.commands.push_registry(RegistryCommand::Add {
            system: Box::new(system),
            params,
        });
    }

    /// Queues removal of the system matching `target`.
    pub fn remove_system(&mut self, target: impl Into<SystemRef>) {
        self.commands
            .push_registry(RegistryCommand::Remove(target.into()));
    }

    //--- Deferred Requests ------------------------------------------------

    /// Queues a scene load for the end of the frame.
    pub fn load_scene(&mut self, request: LoadSceneRequest) {
        self.commands
            .push_deferred(DeferredCommand::LoadScene(request));
    }

    /// Requests a pause once the current frame completes.
    pub fn pause(&mut self) {
        self.commands.push_deferred(DeferredCommand::Pause);
    }

    /// Requests teardown once the current frame completes.
    ///
    /// The frame in flight finishes normally; no further frame is delivered.
    pub fn destroy(&mut self) {
        self.commands.push_deferred(DeferredCommand::Destroy);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lifecycle::Behaviour;
    use crate::core::scene::Scene;

    struct Audio;
    impl Behaviour for Audio {}
    impl System for Audio {}

    #[test]
    fn game_ids_are_unique() {
        let a = GameId::next();
        let b = GameId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn requests_land_in_their_queues() {
        let mut ctx = GameContext::new(GameId::next(), true);

        ctx.add_system(Audio);
        ctx.remove_system("Audio");
        ctx.load_scene(LoadSceneRequest::new(Scene::new("menu")));
        ctx.pause();

        assert_eq!(ctx.commands.registry_len(), 2);
        assert_eq!(ctx.commands.deferred_len(), 2);
        assert!(ctx.is_playing());
    }
}
