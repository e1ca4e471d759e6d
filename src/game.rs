//=========================================================================
// Game Orchestrator
//
// Owns the frame loop, the System registry, the loaded scenes and the
// Ticker binding, and drives the lifecycle protocol across all of them.
//
// Architecture:
// ```text
//     GameBuilder  ──build()──>  Game  ──run()──>  [Frame loop]
//         │                       │
//         ├─ with_frame_rate()    ├─ tick(frame)
//         ├─ with_system()        │    ├─ components: update ×N, late ×N
//         ├─ with_ticker()        │    └─ systems:    update ×N, late ×N
//         └─ with_config()        └─ start / pause / resume / destroy
// ```
//
// Run-state machine:
// ```text
//   constructed ──start()──> playing ──pause()──> paused
//                              ▲                    │
//                              └─────resume()───────┘
//   any ──destroy()──> destroyed (terminal)
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::config::{ConfigError, GameConfig, SystemSpec};
use crate::core::context::{DeferredCommand, GameContext, GameId, RegistryCommand};
use crate::core::lifecycle::dispatcher::{self, Dispatch};
use crate::core::lifecycle::{Behaviour, Slot};
use crate::core::scene::{Component, GameObject, Scene};
use crate::core::system::{NoObserver, ObserverWiring, Params, System, SystemFactory, SystemId};
use crate::core::ticker::{checked_period, FrameEvent, FrameTicker, TickSignal, Ticker, TickerCommand, TickerHandle};

//=== Module Declarations =================================================

mod listeners;
mod registry;
mod scenes;

//=== Public API ==========================================================

pub use listeners::ListenerId;
pub use registry::SystemStatus;

use listeners::{FailureReporter, Listeners, SceneListener};
use registry::SystemEntry;

/// Name of the primary scene created when `need_scene` is set.
pub const DEFAULT_SCENE_NAME: &str = "main";

//=== GameBuilder =========================================================

/// Builder for configuring and constructing a [`Game`].
///
/// # Default Values
///
/// - **Frame rate**: 120.0
/// - **Auto start**: true
/// - **Default scene**: created
/// - **Ticker**: [`FrameTicker`] at the configured frame rate
///
/// # Examples
///
/// ```no_run
/// use aetheric_gocs::prelude::*;
///
/// struct Physics;
/// impl Behaviour for Physics {}
/// impl System for Physics {}
///
/// let mut game = GameBuilder::new()
///     .with_frame_rate(60.0)
///     .with_system(Physics)
///     .build();
///
/// game.run();
/// ```
pub struct GameBuilder {
    config: GameConfig,
    systems: Vec<(Box<dyn System>, Params)>,
    ticker: Option<Box<dyn Ticker>>,
    factory: SystemFactory,
    observer: Box<dyn ObserverWiring>,
}

impl GameBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            systems: Vec::new(),
            ticker: None,
            factory: SystemFactory::new(),
            observer: Box::new(NoObserver),
        }
    }

    /// Replaces all construction options with `config`.
    ///
    /// Systems listed in the config are resolved through the factory set
    /// with [`with_factory`](Self::with_factory). The config is validated
    /// when the game is built: [`build`](Self::build) panics on an invalid
    /// one, [`try_build`](Self::try_build) reports it.
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the target frame rate of the default ticker.
    ///
    /// Ignored when a ticker is supplied with [`with_ticker`](Self::with_ticker).
    ///
    /// # Panics
    ///
    /// Panics if `frame_rate` is not positive and finite, or its period
    /// does not fit a `Duration`.
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        assert!(
            checked_period(frame_rate).is_some(),
            "Frame rate must be positive and finite, got {}",
            frame_rate
        );
        self.config.frame_rate = frame_rate;
        self
    }

    /// Whether the game starts playing as soon as it is built.
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.config.auto_start = auto_start;
        self
    }

    /// Whether an empty primary scene is created at construction.
    pub fn need_scene(mut self, need_scene: bool) -> Self {
        self.config.need_scene = need_scene;
        self
    }

    /// Installs `system` at construction, after any config-listed systems.
    pub fn with_system<S: System>(self, system: S) -> Self {
        self.with_system_params(system, Params::new())
    }

    /// Installs `system` at construction, passing `params` to `init`.
    pub fn with_system_params<S: System>(mut self, system: S, params: Params) -> Self {
        self.systems.push((Box::new(system), params));
        self
    }

    /// Uses `ticker` instead of the default [`FrameTicker`].
    pub fn with_ticker<T: Ticker>(mut self, ticker: T) -> Self {
        self.ticker = Some(Box::new(ticker));
        self
    }

    /// Constructors for systems requested by name.
    pub fn with_factory(mut self, factory: SystemFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Observer wiring applied to every registered system.
    pub fn with_observer<O: ObserverWiring + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Builds the game.
    ///
    /// Order: wire the ticker, install systems (config list, then
    /// builder-supplied), create the default scene, then auto-start.
    ///
    /// # Panics
    ///
    /// Panics if the configuration fails [`GameConfig::validate`].
    pub fn build(self) -> Game {
        match self.try_build() {
            Ok(game) => game,
            Err(err) => panic!("Invalid game configuration: {}", err),
        }
    }

    /// Like [`build`](Self::build), but returns a configuration error
    /// instead of panicking.
    pub fn try_build(self) -> Result<Game, ConfigError> {
        self.config.validate()?;

        let Self {
            config,
            systems,
            ticker,
            factory,
            observer,
        } = self;

        let ticker = ticker.unwrap_or_else(|| Box::new(FrameTicker::new(config.frame_rate)));
        info!(
            "Building game (frame rate: {}, auto start: {}, default scene: {})",
            ticker.frame_rate(),
            config.auto_start,
            config.need_scene
        );

        let mut game = Game::with_parts(ticker, factory, observer);

        for SystemSpec { name, params } in &config.systems {
            game.spawn_system(name, params);
        }
        for (system, params) in systems {
            game.add_boxed_system(system, params);
        }

        if config.need_scene {
            game.primary_scene = Some(Scene::new(DEFAULT_SCENE_NAME));
        }

        if config.auto_start {
            game.start();
        }

        Ok(game)
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Game ================================================================

/// The GOCS orchestrator.
///
/// Drives, once per frame, the lifecycle of every Component on every
/// GameObject of every loaded scene, then of every registered System.
/// A failing hook is reported and isolated to its unit; it never aborts
/// a frame or a pause/resume sweep.
///
/// Not thread-safe by design: one frame runs to completion before the
/// next. Use a [`TickerHandle`] to control a running game from another
/// thread.
pub struct Game {
    id: GameId,
    playing: bool,
    started: bool,
    primary_scene: Option<Scene>,
    secondary_scenes: Vec<Scene>,
    systems: Vec<SystemEntry>,
    next_system_id: u64,
    ticker: Option<Box<dyn Ticker>>,
    factory: SystemFactory,
    observer: Box<dyn ObserverWiring>,
    scene_listeners: Listeners<SceneListener>,
    reporter: FailureReporter,
}

impl Game {
    //--- Construction -----------------------------------------------------

    /// Shorthand for `GameBuilder::new()`.
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    /// Builds a game from `config` with the default ticker.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`GameConfig::validate`].
    pub fn from_config(config: GameConfig) -> Self {
        GameBuilder::new().with_config(config).build()
    }

    /// Like [`from_config`](Self::from_config), but returns a configuration
    /// error instead of panicking.
    pub fn try_from_config(config: GameConfig) -> Result<Self, ConfigError> {
        GameBuilder::new().with_config(config).try_build()
    }

    fn with_parts(
        ticker: Box<dyn Ticker>,
        factory: SystemFactory,
        observer: Box<dyn ObserverWiring>,
    ) -> Self {
        Self {
            id: GameId::next(),
            playing: false,
            started: false,
            primary_scene: None,
            secondary_scenes: Vec::new(),
            systems: Vec::new(),
            next_system_id: 0,
            ticker: Some(ticker),
            factory,
            observer,
            scene_listeners: Listeners::new(),
            reporter: FailureReporter::new(),
        }
    }

    //--- State Queries ----------------------------------------------------

    pub fn id(&self) -> GameId {
        self.id
    }

    /// True between `start`/`resume` and the next `pause`.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once `start` has succeeded; never reset.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_destroyed(&self) -> bool {
        self.ticker.is_none()
    }

    pub fn ticker(&self) -> Option<&dyn Ticker> {
        self.ticker.as_deref()
    }

    /// The ticker, if it is a `T`.
    pub fn ticker_as<T: Ticker>(&self) -> Option<&T> {
        self.ticker
            .as_deref()
            .and_then(|ticker| ticker.as_any().downcast_ref::<T>())
    }

    pub fn ticker_as_mut<T: Ticker>(&mut self) -> Option<&mut T> {
        self.ticker
            .as_deref_mut()
            .and_then(|ticker| ticker.as_any_mut().downcast_mut::<T>())
    }

    /// Remote control for the ticker, if it supports one.
    pub fn ticker_handle(&self) -> Option<TickerHandle> {
        self.ticker.as_ref().and_then(|ticker| ticker.handle())
    }

    //--- Run-State Machine ------------------------------------------------

    /// Starts frame emission. No-op while playing.
    pub fn start(&mut self) {
        if self.playing {
            debug!("start() ignored: already playing");
            return;
        }
        let Some(ticker) = self.ticker.as_mut() else {
            warn!("start() ignored: game is destroyed");
            return;
        };

        ticker.start();
        self.playing = true;
        self.started = true;
        info!("Game started");
    }

    /// Stops frame emission and sends `on_pause` to every Component, then
    /// every System. No-op unless playing.
    pub fn pause(&mut self) {
        if !self.playing {
            debug!("pause() ignored: not playing");
            return;
        }
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.pause();
        }
        self.playing = false;
        info!("Game paused");

        let mut ctx = self.context();
        self.sweep(&mut ctx, Sweep::Pause);
        self.apply_commands(ctx);
    }

    /// Restarts frame emission and sends `on_resume` to every Component,
    /// then every System, before marking the game as playing. No-op while
    /// playing.
    pub fn resume(&mut self) {
        if self.playing {
            debug!("resume() ignored: already playing");
            return;
        }
        let Some(ticker) = self.ticker.as_mut() else {
            warn!("resume() ignored: game is destroyed");
            return;
        };

        ticker.start();
        let mut ctx = self.context();
        self.sweep(&mut ctx, Sweep::Resume);
        self.playing = true;
        info!("Game resumed");

        self.apply_commands(ctx);
    }

    /// Tears the game down. Idempotent.
    ///
    /// Detaches scene listeners, pauses if playing, destroys the primary
    /// scene and every system, then drops the ticker and all scenes. No
    /// frame is delivered afterwards.
    ///
    /// Failure listeners stay attached until teardown finishes, so they
    /// receive failures from `on_pause`, `on_destroy` and `destroy`.
    pub fn destroy(&mut self) {
        let Some(mut ticker) = self.ticker.take() else {
            debug!("destroy() ignored: already destroyed");
            return;
        };
        info!("Destroying game");

        self.scene_listeners.clear();

        if self.playing {
            ticker.pause();
            self.playing = false;

            let mut ctx = self.context();
            self.sweep(&mut ctx, Sweep::Pause);
            // Only registry changes are honoured; the systems are about to go.
            self.apply_registry_commands(&mut ctx);
        }

        if let Some(mut scene) = self.primary_scene.take() {
            for failure in scene.destroy() {
                self.reporter.report(failure);
            }
        }
        self.destroy_systems();
        self.secondary_scenes.clear();
        self.reporter.listeners().clear();

        info!("Game destroyed");
    }

    //--- Frame Loop -------------------------------------------------------

    /// Drives the ticker until it is stopped or the game is destroyed.
    ///
    /// Frames go to [`tick`](Self::tick); `Pause`/`Resume` control requests
    /// map onto [`pause`](Self::pause)/[`resume`](Self::resume). While
    /// paused this blocks waiting for a control request.
    pub fn run(&mut self) {
        info!("Entering frame loop");

        loop {
            let Some(ticker) = self.ticker.as_mut() else {
                break;
            };

            match ticker.poll() {
                TickSignal::Frame(frame) => self.tick(&frame),
                TickSignal::Control(TickerCommand::Pause) => self.pause(),
                TickSignal::Control(TickerCommand::Resume) => self.resume(),
                TickSignal::Control(TickerCommand::Stop) => break,
            }
        }

        info!("Frame loop exited");
    }

    /// The per-frame callback.
    ///
    /// 1. `update` (with lazy `start`) on every Component of every scene
    /// 2. `late_update` on every Component
    /// 3. `update` (with lazy `start`) on every System
    /// 4. `late_update` on every System
    /// 5. deferred scene loads, pause and destroy requests
    ///
    /// Ignored unless playing.
    pub fn tick(&mut self, frame: &FrameEvent) {
        if self.ticker.is_none() {
            trace!("Frame {} ignored: game is destroyed", frame.frame);
            return;
        }
        if !self.playing {
            trace!("Frame {} ignored: game is paused", frame.frame);
            return;
        }

        let snapshot = self.system_ids();
        let mut ctx = self.context();
        self.update_game_objects(&mut ctx, frame);
        self.apply_registry_commands(&mut ctx);
        self.update_systems(&mut ctx, frame, &snapshot);
        self.apply_commands(ctx);
    }

    //--- Internal Helpers -------------------------------------------------

    fn context(&self) -> GameContext {
        GameContext::new(self.id, self.playing)
    }

    fn component_slots<'a>(
        primary: &'a mut Option<Scene>,
        secondary: &'a mut [Scene],
    ) -> impl Iterator<Item = &'a mut Slot<dyn Component>> + 'a {
        primary
            .iter_mut()
            .chain(secondary.iter_mut())
            .flat_map(|scene| scene.game_objects_mut().iter_mut())
            .flat_map(|game_object: &'a mut GameObject| game_object.slots_mut().iter_mut())
    }

    fn update_game_objects(&mut self, ctx: &mut GameContext, frame: &FrameEvent) {
        for slot in Self::component_slots(&mut self.primary_scene, &mut self.secondary_scenes) {
            let (started, updated) = dispatcher::per_frame_update(slot, ctx, frame);
            self.reporter.check(started);
            self.reporter.check(updated);
        }

        for slot in Self::component_slots(&mut self.primary_scene, &mut self.secondary_scenes) {
            let outcome = dispatcher::per_frame_late_update(slot, ctx, frame);
            self.reporter.check(outcome);
        }
    }

    /// System passes walk the ids registered when the frame began. Systems
    /// removed since are skipped; systems added since wait for the next
    /// frame.
    fn update_systems(
        &mut self,
        ctx: &mut GameContext,
        frame: &FrameEvent,
        snapshot: &[SystemId],
    ) {
        let mut cursor = 0;
        for &id in snapshot {
            let Some(entry) = self.entry_after(&mut cursor, id) else {
                continue;
            };
            let (started, updated) = dispatcher::per_frame_update(&mut entry.slot, ctx, frame);
            self.reporter.check(started);
            self.reporter.check(updated);
            self.apply_registry_commands(ctx);
        }

        let mut cursor = 0;
        for &id in snapshot {
            let Some(entry) = self.entry_after(&mut cursor, id) else {
                continue;
            };
            let outcome = dispatcher::per_frame_late_update(&mut entry.slot, ctx, frame);
            self.reporter.check(outcome);
            self.apply_registry_commands(ctx);
        }
    }

    fn sweep(&mut self, ctx: &mut GameContext, sweep: Sweep) {
        for slot in Self::component_slots(&mut self.primary_scene, &mut self.secondary_scenes) {
            let outcome = sweep.dispatch(slot, ctx);
            self.reporter.check(outcome);
        }
        self.apply_registry_commands(ctx);

        let mut cursor = 0;
        for id in self.system_ids() {
            let Some(entry) = self.entry_after(&mut cursor, id) else {
                continue;
            };
            let outcome = sweep.dispatch(&mut entry.slot, ctx);
            self.reporter.check(outcome);
            self.apply_registry_commands(ctx);
        }
    }

    /// Applies queued registry commands, including any queued while
    /// applying them.
    fn apply_registry_commands(&mut self, ctx: &mut GameContext) {
        while let Some(command) = ctx.commands.pop_registry() {
            match command {
                RegistryCommand::Add { system, params } => {
                    if let Err(err) = self.register(system, params, ctx) {
                        warn!("Queued system registration rejected: {}", err);
                    }
                }
                RegistryCommand::Remove(target) => {
                    self.remove_system(target);
                }
            }
        }
    }

    /// Applies every queued command. Consumes the context: a frame or sweep
    /// ends here.
    fn apply_commands(&mut self, mut ctx: GameContext) {
        self.apply_registry_commands(&mut ctx);

        while let Some(command) = ctx.commands.pop_deferred() {
            match command {
                DeferredCommand::LoadScene(request) => {
                    self.load_scene(request);
                }
                DeferredCommand::Pause => self.pause(),
                DeferredCommand::Destroy => {
                    self.destroy();
                    break;
                }
            }
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        GameBuilder::new().build()
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.destroy();
    }
}

//=== Sweep ===============================================================

/// Which hook a pause/resume sweep dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Pause,
    Resume,
}

impl Sweep {
    fn dispatch<T>(self, slot: &mut Slot<T>, ctx: &mut GameContext) -> Dispatch
    where
        T: Behaviour + ?Sized,
    {
        match self {
            Self::Pause => dispatcher::pause_unit(slot, ctx),
            Self::Resume => dispatcher::resume_unit(slot, ctx),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Hook, HookResult, LifecycleError};
    use crate::core::scene::{LoadMode, LoadSceneRequest, SceneChanged};
    use crate::core::system::SystemRef;
    use crate::core::ticker::ManualTicker;
    use crate::test_support::{entries_ending, journal, Journal, Recorder, Second};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn headless() -> GameBuilder {
        GameBuilder::new()
            .with_ticker(ManualTicker::default())
            .auto_start(false)
    }

    fn manual(game: &Game) -> &ManualTicker {
        game.ticker_as::<ManualTicker>().unwrap()
    }

    fn frame() -> FrameEvent {
        FrameEvent::first(120.0)
    }

    /// Two scenes (c1, c2 on the primary; c3 on a secondary) and two
    /// systems (s1, s2), with the registration entries cleared.
    fn populated(log: &Journal) -> Game {
        let mut game = headless().need_scene(false).build();
        game.load_scene(LoadSceneRequest::new(Scene::new("primary").with_game_object(
            GameObject::new("go1")
                .with_component(Recorder::new("c1", log))
                .with_component(Recorder::new("c2", log)),
        )));
        game.load_scene(
            LoadSceneRequest::new(
                Scene::new("overlay")
                    .with_game_object(GameObject::new("go2").with_component(Recorder::new("c3", log))),
            )
            .with_mode(LoadMode::MultiCanvas),
        );
        game.add_system(Recorder::new("s1", log));
        game.add_system(Recorder::<Second>::tagged("s2", log));
        log.borrow_mut().clear();
        game
    }

    fn collect_failures(game: &mut Game) -> Rc<RefCell<Vec<(String, Hook)>>> {
        let failures = Rc::new(RefCell::new(Vec::new()));
        let sink = failures.clone();
        game.on_hook_failure(move |failure: &LifecycleError| {
            sink.borrow_mut()
                .push((failure.unit().to_owned(), failure.hook()));
        });
        failures
    }

    //--- Construction -----------------------------------------------------

    #[test]
    fn builder_defaults_start_playing_with_a_scene() {
        let game = GameBuilder::new().with_ticker(ManualTicker::default()).build();

        assert!(game.is_playing());
        assert!(game.is_started());
        assert_eq!(game.scene().map(Scene::name), Some(DEFAULT_SCENE_NAME));
        assert_eq!(manual(&game).start_calls(), 1);
    }

    #[test]
    fn default_ticker_uses_configured_frame_rate() {
        let game = GameBuilder::new().auto_start(false).with_frame_rate(30.0).build();
        assert_eq!(game.ticker().map(|t| t.frame_rate()), Some(30.0));
        assert!(game.ticker_handle().is_some());
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn builder_rejects_zero_frame_rate() {
        let _ = GameBuilder::new().with_frame_rate(0.0);
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive and finite")]
    fn builder_rejects_vanishing_frame_rate() {
        let _ = GameBuilder::new().with_frame_rate(1e-20);
    }

    #[test]
    fn try_build_rejects_unrepresentable_frame_rate() {
        for frame_rate in [1e-20, f64::NAN, 0.0] {
            let config = GameConfig {
                frame_rate,
                auto_start: false,
                ..GameConfig::default()
            };
            let result = Game::try_from_config(config);
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "{}", frame_rate);
        }

        let config = GameConfig {
            frame_rate: 25.0,
            auto_start: false,
            ..GameConfig::default()
        };
        let game = Game::try_from_config(config).unwrap();
        assert_eq!(game.ticker().map(|t| t.frame_rate()), Some(25.0));
    }

    #[test]
    #[should_panic(expected = "Invalid game configuration")]
    fn from_config_panics_on_invalid_config() {
        let config = GameConfig {
            frame_rate: 0.0,
            ..GameConfig::default()
        };
        let _ = Game::from_config(config);
    }

    #[test]
    fn config_systems_install_before_builder_systems() {
        let log = journal();
        let mut factory = SystemFactory::new();
        {
            let log = log.clone();
            factory.register("configured", move || Recorder::new("configured", &log));
        }

        let mut config = GameConfig::default();
        config.auto_start = false;
        config.systems.push(SystemSpec::new("configured"));
        config.systems.push(SystemSpec::new("unknown"));

        let game = headless()
            .with_config(config)
            .with_ticker(ManualTicker::default())
            .with_factory(factory)
            .with_system(Recorder::<Second>::tagged("direct", &log))
            .build();

        let names: Vec<_> = game.systems().map(|status| status.name).collect();
        assert_eq!(names, vec!["configured", "direct"]);
        assert!(!game.is_playing());
    }

    //--- Run-State Machine ------------------------------------------------

    #[test]
    fn start_only_once() {
        let mut game = headless().build();
        assert!(!game.is_playing());
        assert!(!game.is_started());

        game.start();
        game.start();

        assert!(game.is_playing());
        assert!(game.is_started());
        assert_eq!(manual(&game).start_calls(), 1);
    }

    #[test]
    fn double_pause_sweeps_once() {
        let log = journal();
        let mut game = populated(&log);
        game.start();

        game.pause();
        game.pause();

        assert!(!game.is_playing());
        assert_eq!(
            entries_ending(&log, ".on_pause"),
            vec!["c1.on_pause", "c2.on_pause", "c3.on_pause", "s1.on_pause", "s2.on_pause"]
        );
        assert_eq!(manual(&game).pause_calls(), 1);
    }

    #[test]
    fn pause_before_start_is_ignored() {
        let log = journal();
        let mut game = populated(&log);

        game.pause();

        assert!(log.borrow().is_empty());
        assert_eq!(manual(&game).pause_calls(), 0);
    }

    #[test]
    fn resume_sweeps_then_plays() {
        let log = journal();
        let mut game = populated(&log);
        game.start();
        game.pause();
        log.borrow_mut().clear();

        game.resume();
        game.resume();

        assert!(game.is_playing());
        assert_eq!(
            *log.borrow(),
            vec!["c1.on_resume", "c2.on_resume", "c3.on_resume", "s1.on_resume", "s2.on_resume"]
        );
        assert_eq!(manual(&game).start_calls(), 2);
    }

    #[test]
    fn resume_hooks_see_game_not_yet_playing() {
        struct Observer(Rc<RefCell<Option<bool>>>);
        impl Behaviour for Observer {
            fn on_resume(&mut self, ctx: &mut GameContext) -> HookResult {
                *self.0.borrow_mut() = Some(ctx.is_playing());
                Ok(())
            }
        }
        impl System for Observer {}

        let seen = Rc::new(RefCell::new(None));
        let mut game = headless().build();
        game.add_system(Observer(seen.clone()));
        game.start();
        game.pause();
        game.resume();

        assert_eq!(*seen.borrow(), Some(false));
    }

    #[test]
    fn destroy_tears_everything_down_once() {
        let log = journal();
        let mut game = populated(&log);
        game.start();

        game.destroy();

        assert_eq!(
            *log.borrow(),
            vec![
                "c1.on_pause",
                "c2.on_pause",
                "c3.on_pause",
                "s1.on_pause",
                "s2.on_pause",
                "c1.on_destroy",
                "c2.on_destroy",
                "s1.destroy",
                "s2.destroy",
            ]
        );
        assert!(game.is_destroyed());
        assert!(!game.is_playing());
        assert!(game.scene().is_none());
        assert!(game.secondary_scenes().is_empty());
        assert_eq!(game.system_count(), 0);
        assert!(game.ticker().is_none());

        log.borrow_mut().clear();
        game.destroy();
        game.start();
        game.resume();
        game.tick(&frame());
        assert!(log.borrow().is_empty());
        assert!(!game.is_playing());
    }

    #[test]
    fn destroy_reports_teardown_failures_to_listeners() {
        let log = journal();
        let mut game = headless().build();
        game.add_system(Recorder::new("brittle", &log).failing(Hook::Destroy));
        let failures = collect_failures(&mut game);

        game.destroy();

        assert_eq!(*failures.borrow(), vec![("brittle".to_owned(), Hook::Destroy)]);
        assert_eq!(game.system_count(), 0);
    }

    #[test]
    fn destroy_detaches_scene_listeners() {
        let mut game = headless().build();
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let id = game.on_scene_changed(move |_: &SceneChanged<'_>| *sink.borrow_mut() += 1);

        game.destroy();

        assert!(!game.off_scene_changed(id));
        assert_eq!(*calls.borrow(), 0);
    }

    //--- Frame Dispatch ---------------------------------------------------

    #[test]
    fn tick_runs_components_then_systems_in_two_passes() {
        let log = journal();
        let mut game = populated(&log);
        game.start();

        game.tick(&frame());

        assert_eq!(
            *log.borrow(),
            vec![
                "c1.start",
                "c1.update",
                "c2.start",
                "c2.update",
                "c3.start",
                "c3.update",
                "c1.late_update",
                "c2.late_update",
                "c3.late_update",
                "s1.start",
                "s1.update",
                "s2.start",
                "s2.update",
                "s1.late_update",
                "s2.late_update",
            ]
        );
    }

    #[test]
    fn every_update_precedes_every_late_update() {
        let log = journal();
        let mut game = populated(&log);
        game.start();
        game.tick(&frame());

        let entries = log.borrow();
        let last_component_update = entries
            .iter()
            .rposition(|e| e.starts_with('c') && e.ends_with(".update"))
            .unwrap();
        let first_component_late = entries
            .iter()
            .position(|e| e.starts_with('c') && e.ends_with(".late_update"))
            .unwrap();
        assert!(last_component_update < first_component_late);
    }

    #[test]
    fn start_is_dispatched_once_per_unit() {
        let log = journal();
        let mut game = populated(&log);
        game.start();

        let mut next = frame();
        for _ in 0..3 {
            game.tick(&next);
            next = next.next();
        }

        assert_eq!(entries_ending(&log, ".start").len(), 5);
        assert_eq!(entries_ending(&log, ".update").len(), 15);
        assert_eq!(game.is_system_started("s1"), Some(true));
    }

    #[test]
    fn tick_is_ignored_unless_playing() {
        let log = journal();
        let mut game = populated(&log);

        game.tick(&frame());
        assert!(log.borrow().is_empty());

        game.start();
        game.pause();
        log.borrow_mut().clear();
        game.tick(&frame());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn failing_start_marks_started_and_is_not_retried() {
        let log = journal();
        let mut game = headless().build();
        let failures = collect_failures(&mut game);
        game.add_system(Recorder::new("flaky", &log).failing(Hook::Start));
        assert_eq!(game.is_system_started("flaky"), Some(false));
        game.start();

        game.tick(&frame());
        game.tick(&frame().next());

        assert_eq!(game.is_system_started("flaky"), Some(true));
        assert_eq!(entries_ending(&log, ".start"), vec!["flaky.start"]);
        assert_eq!(entries_ending(&log, ".update").len(), 2);
        assert_eq!(*failures.borrow(), vec![("flaky".to_owned(), Hook::Start)]);
    }

    #[test]
    fn hook_failures_are_contained_per_unit() {
        let log = journal();
        let mut game = headless().build();
        let failures = collect_failures(&mut game);
        if let Some(scene) = game.scene_mut() {
            scene.add_game_object(
                GameObject::new("go")
                    .with_component(Recorder::new("bad", &log).failing(Hook::Update))
                    .with_component(Recorder::new("wild", &log).panicking(Hook::LateUpdate))
                    .with_component(Recorder::new("good", &log)),
            );
        }
        game.add_system(Recorder::new("sys", &log));
        game.start();

        game.tick(&frame());

        assert_eq!(
            *failures.borrow(),
            vec![("bad".to_owned(), Hook::Update), ("wild".to_owned(), Hook::LateUpdate)]
        );
        assert!(log.borrow().contains(&"good.late_update".to_owned()));
        assert!(log.borrow().contains(&"sys.late_update".to_owned()));
        assert!(game.is_playing());
    }

    //--- Mid-Frame Mutation -----------------------------------------------

    struct Remover;
    impl Behaviour for Remover {
        fn update(&mut self, ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
            ctx.remove_system(SystemRef::of::<Recorder>());
            Ok(())
        }
    }
    impl System for Remover {}
    impl Component for Remover {}

    struct Spawner {
        log: Journal,
        spawned: bool,
    }
    impl Behaviour for Spawner {
        fn update(&mut self, ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
            if !self.spawned {
                ctx.add_system(Recorder::new("late", &self.log));
                self.spawned = true;
            }
            Ok(())
        }
    }
    impl System for Spawner {}
    impl Component for Spawner {}

    #[test]
    fn system_removed_mid_frame_is_skipped() {
        let log = journal();
        let mut game = headless().build();
        game.add_system(Remover);
        game.add_system(Recorder::new("victim", &log));
        game.start();
        log.borrow_mut().clear();

        game.tick(&frame());

        assert_eq!(*log.borrow(), vec!["victim.destroy"]);
        assert_eq!(game.system_count(), 1);
    }

    #[test]
    fn system_removed_by_component_is_skipped() {
        let log = journal();
        let mut game = headless().build();
        if let Some(scene) = game.scene_mut() {
            scene.add_game_object(GameObject::new("remover").with_component(Remover));
        }
        game.add_system(Recorder::new("victim", &log));
        game.start();
        log.borrow_mut().clear();

        game.tick(&frame());

        assert_eq!(*log.borrow(), vec!["victim.destroy"]);
        assert_eq!(game.system_count(), 0);
    }

    #[test]
    fn system_removed_after_its_turn_is_not_revisited() {
        let log = journal();
        let mut game = headless().build();
        game.add_system(Recorder::new("early", &log));
        game.add_system(Remover);
        game.add_system(Recorder::<Second>::tagged("after", &log));
        game.start();
        log.borrow_mut().clear();

        game.tick(&frame());

        assert_eq!(
            *log.borrow(),
            vec![
                "early.start",
                "early.update",
                "early.destroy",
                "after.start",
                "after.update",
                "after.late_update",
            ]
        );
        assert_eq!(game.system_count(), 2);

        log.borrow_mut().clear();
        game.tick(&frame().next());
        assert_eq!(*log.borrow(), vec!["after.update", "after.late_update"]);
    }

    #[test]
    fn system_added_mid_frame_waits_for_next_frame() {
        let log = journal();
        let mut game = headless().build();
        game.add_system(Spawner {
            log: log.clone(),
            spawned: false,
        });
        game.start();

        game.tick(&frame());
        assert_eq!(*log.borrow(), vec!["late.init", "late.awake"]);

        game.tick(&frame().next());
        assert_eq!(
            *log.borrow(),
            vec!["late.init", "late.awake", "late.start", "late.update", "late.late_update"]
        );
    }

    #[test]
    fn system_added_by_component_waits_for_next_frame() {
        let log = journal();
        let mut game = headless().build();
        if let Some(scene) = game.scene_mut() {
            scene.add_game_object(GameObject::new("spawner").with_component(Spawner {
                log: log.clone(),
                spawned: false,
            }));
        }
        game.start();

        game.tick(&frame());
        assert!(game.has_system("late"));
        assert!(entries_ending(&log, ".update").is_empty());

        game.tick(&frame().next());
        assert_eq!(entries_ending(&log, ".update"), vec!["late.update"]);
    }

    #[test]
    fn scene_load_requested_by_hook_applies_at_frame_end() {
        struct Loader {
            seen_during_frame: Rc<RefCell<Vec<String>>>,
        }
        impl Behaviour for Loader {
            fn update(&mut self, ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
                ctx.load_scene(LoadSceneRequest::new(Scene::new("next")));
                Ok(())
            }
            fn late_update(&mut self, _ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
                self.seen_during_frame.borrow_mut().push("late".into());
                Ok(())
            }
        }
        impl System for Loader {}

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut game = headless().build();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let trail = seen.clone();
        game.on_scene_changed(move |event: &SceneChanged<'_>| {
            trail.borrow_mut().push(format!("loaded {}", event.scene.name()));
            sink.borrow_mut().push(event.scene.name().to_owned());
        });
        game.add_system(Loader {
            seen_during_frame: seen.clone(),
        });
        game.start();

        game.tick(&frame());

        assert_eq!(*seen.borrow(), vec!["late", "loaded next"]);
        assert_eq!(game.scene().map(Scene::name), Some("next"));
        assert_eq!(*events.borrow(), vec!["next"]);
    }

    #[test]
    fn pause_requested_by_hook_applies_after_frame() {
        struct Brake;
        impl Behaviour for Brake {
            fn update(&mut self, ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
                ctx.pause();
                Ok(())
            }
        }
        impl System for Brake {}

        let log = journal();
        let mut game = headless().build();
        game.add_system(Brake);
        game.add_system(Recorder::new("after", &log));
        game.start();

        game.tick(&frame());

        assert!(!game.is_playing());
        assert_eq!(
            *log.borrow(),
            vec![
                "after.init",
                "after.awake",
                "after.start",
                "after.update",
                "after.late_update",
                "after.on_pause",
            ]
        );
    }

    #[test]
    fn destroy_requested_by_hook_finishes_the_frame() {
        struct Detonator;
        impl Behaviour for Detonator {
            fn update(&mut self, ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
                ctx.destroy();
                Ok(())
            }
        }
        impl System for Detonator {}

        let log = journal();
        let mut game = headless().build();
        game.add_system(Detonator);
        game.add_system(Recorder::new("bystander", &log));
        game.start();
        log.borrow_mut().clear();

        game.tick(&frame());
        game.tick(&frame().next());

        assert!(game.is_destroyed());
        assert_eq!(
            *log.borrow(),
            vec![
                "bystander.start",
                "bystander.update",
                "bystander.late_update",
                "bystander.on_pause",
                "bystander.destroy",
            ]
        );
    }

    //--- Frame Loop -------------------------------------------------------

    #[test]
    fn run_consumes_frames_until_stopped() {
        let log = journal();
        let mut ticker = ManualTicker::default();
        ticker.push_frames(3);

        let mut game = GameBuilder::new()
            .with_ticker(ticker)
            .with_system(Recorder::new("s", &log))
            .build();
        game.run();

        assert_eq!(entries_ending(&log, ".update").len(), 3);
        assert!(game.is_playing());
        assert_eq!(manual(&game).pending(), 0);
    }

    #[test]
    fn run_maps_control_requests_onto_the_state_machine() {
        let log = journal();
        let mut ticker = ManualTicker::default();
        ticker
            .push_frames(1)
            .push_command(TickerCommand::Pause)
            .push_frames(2)
            .push_command(TickerCommand::Resume)
            .push_frames(1);

        let mut game = GameBuilder::new()
            .with_ticker(ticker)
            .with_system(Recorder::new("s", &log))
            .build();
        game.run();

        assert_eq!(entries_ending(&log, ".update").len(), 2);
        assert_eq!(entries_ending(&log, ".on_pause"), vec!["s.on_pause"]);
        assert_eq!(entries_ending(&log, ".on_resume"), vec!["s.on_resume"]);
    }

    #[test]
    fn run_returns_once_destroyed() {
        struct Detonator;
        impl Behaviour for Detonator {
            fn update(&mut self, ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
                ctx.destroy();
                Ok(())
            }
        }
        impl System for Detonator {}

        let mut ticker = ManualTicker::default();
        ticker.push_frames(5);

        let mut game = GameBuilder::new()
            .with_ticker(ticker)
            .with_system(Detonator)
            .build();
        game.run();

        assert!(game.is_destroyed());
    }
}
