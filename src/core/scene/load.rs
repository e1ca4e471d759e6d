//=========================================================================
// Scene Loading
//=========================================================================
//
// Request and notification types for Game::load_scene.
//
//   Single      → replaces the primary scene
//   MultiCanvas → appended to the secondary scenes
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::Scene;
use crate::core::system::Params;

//=== LoadMode ============================================================

/// How a loaded scene joins the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Replace the primary scene.
    #[default]
    Single,

    /// Add alongside the primary scene; dispatched after it.
    MultiCanvas,
}

//=== LoadSceneRequest ====================================================

/// Arguments for [`Game::load_scene`](crate::Game::load_scene).
///
/// A request without a scene is accepted and ignored.
#[derive(Debug, Default)]
pub struct LoadSceneRequest {
    pub scene: Option<Scene>,
    pub mode: LoadMode,
    pub params: Params,
}

impl LoadSceneRequest {
    /// Single-mode request for `scene` with empty params.
    pub fn new(scene: Scene) -> Self {
        Self {
            scene: Some(scene),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

//=== SceneChanged ========================================================

/// Notification emitted after a scene load.
#[derive(Debug, Clone, Copy)]
pub struct SceneChanged<'a> {
    pub scene: &'a Scene,
    pub mode: LoadMode,
    pub params: &'a Params,
}

//=========================================================================
// Unit Tests
//=========================================================================
