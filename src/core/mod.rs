//=========================================================================
// Core
//
// Building blocks the Game orchestrator is assembled from.
//
// Responsibilities:
// - `lifecycle`: the Behaviour contract and the guarded hook dispatcher
// - `system`:    global units, their identities and constructors
// - `scene`:     Scene → GameObject → Component composition
// - `context`:   the handle hooks use to request mutations
// - `ticker`:    frame sources (clock-driven and scripted)
// - `error`:     contained-failure and registration error types
//
//=========================================================================

pub mod context;
pub mod error;
pub mod lifecycle;
pub mod scene;
pub mod system;
pub mod ticker;
