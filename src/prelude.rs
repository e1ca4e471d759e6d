//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_gocs::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Orchestrator
pub use crate::{Game, GameBuilder, ListenerId, SystemStatus};

// Configuration
pub use crate::config::{ConfigError, GameConfig, SystemSpec};

// Lifecycle contracts
pub use crate::core::context::{GameContext, GameId};
pub use crate::core::error::{Hook, HookError, HookResult, LifecycleError, RegistrationError};
pub use crate::core::lifecycle::{AsAny, Behaviour};
pub use crate::core::system::{
    NoObserver, ObserverWiring, Params, System, SystemFactory, SystemId, SystemRef,
};

// Scene system
pub use crate::core::scene::{
    Component, GameObject, LoadMode, LoadSceneRequest, Scene, SceneChanged,
};

// Frame sources
pub use crate::core::ticker::{
    FrameEvent, FrameTicker, ManualTicker, TickSignal, Ticker, TickerCommand, TickerHandle,
};
