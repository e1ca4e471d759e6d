//=========================================================================
// Scene Composition
//=========================================================================
//
// Loading scenes into a Game and notifying listeners.
//
//   LoadMode::Single       replaces the primary scene
//   LoadMode::MultiCanvas  appends a secondary scene
//
// Every successful load emits SceneChanged synchronously to the scene
// listeners, in registration order.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{Game, ListenerId};
use crate::core::error::LifecycleError;
use crate::core::scene::{GameObject, LoadMode, LoadSceneRequest, Scene, SceneChanged};

//=== Scene Loading =======================================================

impl Game {
    /// Loads the scene carried by `request`.
    ///
    /// A request without a scene does nothing. In `Single` mode the previous
    /// primary scene is handed back without running `on_destroy`; call
    /// [`Scene::destroy`] on it if its components need teardown.
    ///
    /// Returns the replaced primary scene, if any. `MultiCanvas` loads and
    /// ignored requests return `None`.
    pub fn load_scene(&mut self, request: LoadSceneRequest) -> Option<Scene> {
        if self.is_destroyed() {
            warn!("load_scene() ignored: game is destroyed");
            return None;
        }

        let LoadSceneRequest { scene, mode, params } = request;
        let Some(scene) = scene else {
            debug!("load_scene() ignored: no scene supplied");
            return None;
        };

        debug!("Loading scene {:?} ({:?})", scene.name(), mode);
        let (loaded, replaced): (&Scene, _) = match mode {
            LoadMode::Single => {
                let replaced = self.primary_scene.take();
                (self.primary_scene.insert(scene), replaced)
            }
            LoadMode::MultiCanvas => {
                self.secondary_scenes.push(scene);
                let last = self.secondary_scenes.len() - 1;
                (&self.secondary_scenes[last], None)
            }
        };

        self.scene_listeners.emit(&SceneChanged {
            scene: loaded,
            mode,
            params: &params,
        });

        replaced
    }

    //--- Accessors --------------------------------------------------------

    /// The primary scene.
    pub fn scene(&self) -> Option<&Scene> {
        self.primary_scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.primary_scene.as_mut()
    }

    /// Scenes loaded with [`LoadMode::MultiCanvas`], in load order.
    pub fn secondary_scenes(&self) -> &[Scene] {
        &self.secondary_scenes
    }

    pub fn secondary_scenes_mut(&mut self) -> &mut [Scene] {
        &mut self.secondary_scenes
    }

    /// Every GameObject in dispatch order: the primary scene's, then each
    /// secondary scene's.
    pub fn game_objects(&self) -> impl Iterator<Item = &GameObject> + '_ {
        self.primary_scene
            .iter()
            .chain(self.secondary_scenes.iter())
            .flat_map(|scene| scene.game_objects().iter())
    }

    //--- Listeners --------------------------------------------------------

    /// Registers a callback for every successful scene load.
    pub fn on_scene_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SceneChanged<'_>) + 'static,
    {
        self.scene_listeners.add(Box::new(listener))
    }

    /// Unregisters a scene listener. Returns `false` if it was not found.
    pub fn off_scene_changed(&mut self, id: ListenerId) -> bool {
        self.scene_listeners.remove(id)
    }

    /// Registers a callback for every contained hook failure.
    ///
    /// Failures are logged whether or not any callback is registered.
    pub fn on_hook_failure<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LifecycleError) + 'static,
    {
        self.reporter.listeners().add(Box::new(listener))
    }

    pub fn off_hook_failure(&mut self, id: ListenerId) -> bool {
        self.reporter.listeners().remove(id)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
