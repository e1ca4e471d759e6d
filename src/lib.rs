//=========================================================================
// Aetheric GOCS - Library Root
//
// Game-object / component / system runtime core.
//
// Responsibilities:
// - Expose the orchestrator (`Game`) and its builder
// - Expose the unit contracts (`Behaviour`, `System`, `Component`) and
//   the scene model they live in
// - Keep orchestrator internals (registry entries, listener lists,
//   command queues) private
//
// Typical usage:
// ```no_run
// use aetheric_gocs::prelude::*;
//
// fn main() {
//     let mut game = Game::builder().with_frame_rate(60.0).build();
//     game.run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the unit contracts, the scene model, tickers and error
// types. `config` holds the TOML-loadable construction options.
//
pub mod config;
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `game` defines the orchestrator; only its public types are re-exported.
//
mod game;

#[cfg(test)]
mod test_support;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the orchestrator so applications can simply
// `use aetheric_gocs::Game;`.
//
pub use game::{Game, GameBuilder, ListenerId, SystemStatus, DEFAULT_SCENE_NAME};
