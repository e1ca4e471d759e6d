//=========================================================================
// Scene System
//=========================================================================
//
// Entity-composition hierarchy consumed by the orchestrator.
//
// Architecture:
//   Scene
//     └─ game_objects: Vec<GameObject>      (ordered)
//          └─ components: Vec<Slot<dyn Component>>  (attachment order)
//
// Scenes are loaded into a Game either as the primary scene (Single) or
// appended as a secondary scene (MultiCanvas). See `load`.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::error::LifecycleError;

//=== Module Declarations =================================================

mod game_object;
mod load;

//=== Public API ==========================================================

pub use game_object::{Component, GameObject};
pub use load::{LoadMode, LoadSceneRequest, SceneChanged};

//=== Scene ===============================================================

/// An ordered collection of GameObjects.
///
/// ```rust
/// # use aetheric_gocs::prelude::*;
/// struct Spin;
/// impl Behaviour for Spin {}
/// impl Component for Spin {}
///
/// let scene = Scene::new("level-1")
///     .with_game_object(GameObject::new("top").with_component(Spin));
///
/// assert_eq!(scene.game_objects().len(), 1);
/// ```
pub struct Scene {
    name: String,
    game_objects: Vec<GameObject>,
}

impl Scene {
    //--- Construction -----------------------------------------------------

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            game_objects: Vec::new(),
        }
    }

    /// Builder-style [`add_game_object`](Self::add_game_object).
    pub fn with_game_object(mut self, game_object: GameObject) -> Self {
        self.add_game_object(game_object);
        self
    }

    pub fn add_game_object(&mut self, game_object: GameObject) {
        debug!("Scene {:?}: adding game object {:?}", self.name, game_object.name());
        self.game_objects.push(game_object);
    }

    /// Detaches the first game object called `name`.
    ///
    /// Its components do not receive `on_destroy`; that is up to the caller.
    pub fn remove_game_object(&mut self, name: &str) -> Option<GameObject> {
        let pos = self.game_objects.iter().position(|go| go.name() == name)?;
        Some(self.game_objects.remove(pos))
    }

    //--- Queries ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn game_objects(&self) -> &[GameObject] {
        &self.game_objects
    }

    pub fn game_objects_mut(&mut self) -> &mut [GameObject] {
        &mut self.game_objects
    }

    pub fn find(&self, name: &str) -> Option<&GameObject> {
        self.game_objects.iter().find(|go| go.name() == name)
    }

    //--- Teardown ---------------------------------------------------------

    /// Calls `on_destroy` on every component and empties the scene.
    ///
    /// Failures are returned for the caller to report; every component is
    /// visited.
    pub fn destroy(&mut self) -> Vec<LifecycleError> {
        debug!("Destroying scene {:?} ({} game objects)", self.name, self.game_objects.len());

        let mut failures = Vec::new();
        for game_object in &mut self.game_objects {
            failures.extend(game_object.destroy_components());
        }
        self.game_objects.clear();
        failures
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("game_objects", &self.game_objects)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
