//=========================================================================
// Orbit Demo
//
// A clock-driven game with two scenes and two systems:
//   - `Orbit` components advance an angle every frame
//   - `Telemetry` logs frame timing once a second
//   - `Stopwatch` stops the ticker after a fixed number of frames
//
// A helper thread pauses and resumes the game through a TickerHandle.
//
// Run with:
//   RUST_LOG=debug cargo run --example orbit
//
//=========================================================================

use std::thread;
use std::time::Duration;

use aetheric_gocs::prelude::*;

const FRAME_RATE: f64 = 60.0;
const RUN_FRAMES: u64 = 180;

//=== Components ==========================================================

struct Orbit {
    radius: f32,
    speed: f32,
    angle: f32,
}

impl Orbit {
    fn new(radius: f32, speed: f32) -> Self {
        Self {
            radius,
            speed,
            angle: 0.0,
        }
    }
}

impl Behaviour for Orbit {
    fn update(&mut self, _ctx: &mut GameContext, frame: &FrameEvent) -> HookResult {
        self.angle = (self.angle + self.speed * frame.delta_secs()) % std::f32::consts::TAU;
        Ok(())
    }

    fn late_update(&mut self, _ctx: &mut GameContext, frame: &FrameEvent) -> HookResult {
        if frame.frame % 60 == 0 {
            let (x, y) = (self.radius * self.angle.cos(), self.radius * self.angle.sin());
            log::info!("orbit r={:.1} at ({:.2}, {:.2})", self.radius, x, y);
        }
        Ok(())
    }

    fn on_pause(&mut self, _ctx: &mut GameContext) -> HookResult {
        log::info!("orbit r={:.1} holding at {:.2} rad", self.radius, self.angle);
        Ok(())
    }
}

impl Component for Orbit {}

//=== Systems =============================================================

#[derive(Default)]
struct Telemetry {
    window: Duration,
}

impl Behaviour for Telemetry {
    fn update(&mut self, _ctx: &mut GameContext, frame: &FrameEvent) -> HookResult {
        self.window += frame.delta;
        if self.window >= Duration::from_secs(1) {
            log::info!(
                "frame {} elapsed {:.2}s (target {} fps)",
                frame.frame,
                frame.elapsed.as_secs_f32(),
                frame.frame_rate
            );
            self.window = Duration::ZERO;
        }
        Ok(())
    }
}

impl System for Telemetry {}

struct Stopwatch {
    handle: TickerHandle,
    limit: u64,
    frames: u64,
}

impl Behaviour for Stopwatch {
    fn update(&mut self, _ctx: &mut GameContext, _frame: &FrameEvent) -> HookResult {
        self.frames += 1;
        if self.frames == self.limit {
            log::info!("{} frames delivered, stopping", self.frames);
            self.handle.stop();
        }
        Ok(())
    }
}

impl System for Stopwatch {
    fn init(&mut self, params: &Params) -> HookResult {
        if let Some(limit) = params.get("limit").and_then(|v| v.as_integer()) {
            self.limit = u64::try_from(limit)?;
        }
        Ok(())
    }
}

//=== Main ================================================================

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut game = Game::builder()
        .with_frame_rate(FRAME_RATE)
        .auto_start(false)
        .with_system(Telemetry::default())
        .build();

    let Some(handle) = game.ticker_handle() else {
        log::error!("default ticker has no handle");
        return;
    };

    let mut params = Params::new();
    params.insert("limit".into(), (RUN_FRAMES as i64).into());
    game.add_system_with(
        Stopwatch {
            handle: handle.clone(),
            limit: u64::MAX,
            frames: 0,
        },
        params,
    );

    game.on_scene_changed(|event: &SceneChanged<'_>| {
        log::info!(
            "scene {:?} loaded ({:?}, {} game objects)",
            event.scene.name(),
            event.mode,
            event.scene.game_objects().len()
        );
    });
    game.load_scene(LoadSceneRequest::new(
        Scene::new("system")
            .with_game_object(GameObject::new("inner").with_component(Orbit::new(1.0, 2.0)))
            .with_game_object(GameObject::new("outer").with_component(Orbit::new(3.0, 0.5))),
    ));
    game.load_scene(
        LoadSceneRequest::new(
            Scene::new("moons")
                .with_game_object(GameObject::new("moon").with_component(Orbit::new(0.3, 6.0))),
        )
        .with_mode(LoadMode::MultiCanvas),
    );

    let remote = thread::spawn(move || {
        thread::sleep(Duration::from_millis(1000));
        handle.pause();
        thread::sleep(Duration::from_millis(500));
        handle.resume();
    });

    game.start();
    game.run();
    game.destroy();

    if remote.join().is_err() {
        log::error!("remote control thread panicked");
    }
}
