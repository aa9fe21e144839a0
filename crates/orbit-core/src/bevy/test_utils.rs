//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `OrbitHeadlessPlugin` for testing scene logic
//! without a rendering or windowing backend.

use std::sync::Arc;

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::bevy::plugin::OrbitHeadlessPlugin;
use crate::bevy::resources::{ActiveScene, CommandQueue, SceneCommand, UrlOpenerRes};
use crate::config::SceneConfig;
use crate::interaction::tests::RecordingOpener;
use crate::orbit::ORBIT_DT;
use crate::pointer::{PointerPhase, RawPointer};
use crate::stage::OrbitScene;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
    pub opener: Arc<RecordingOpener>,
}

impl TestApp {
    pub fn new() -> Self {
        let opener = Arc::new(RecordingOpener::default());
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(OrbitHeadlessPlugin {
            command_queue: None,
            url_opener: Some(UrlOpenerRes(opener.clone())),
        });
        // Pause virtual time so that only explicit step calls
        // advance the orbits.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        app.update();
        Self { app, opener }
    }

    pub fn update(&mut self) {
        self.app.update();
    }

    /// Advance the orbit field by exactly `n` fixed timesteps.
    ///
    /// Uses `Time<Fixed>::accumulate_overstep` to feed time directly into
    /// the fixed-timestep accumulator, bypassing virtual time.
    pub fn step_orbits(&mut self, n: usize) {
        let dt = std::time::Duration::from_secs_f32(ORBIT_DT);
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    pub fn push_command(&mut self, cmd: SceneCommand) {
        self.app.world().resource::<CommandQueue>().push(cmd);
    }

    /// Load a scene and run an update so it is processed.
    pub fn load_scene(&mut self, config: SceneConfig) {
        self.push_command(SceneCommand::LoadScene { config });
        self.update();
    }

    /// Send one mouse event in window pixels and process it.
    pub fn mouse(&mut self, phase: PointerPhase, x: f32, y: f32) {
        self.push_command(SceneCommand::Pointer(RawPointer::mouse(phase, x, y)));
        self.update();
    }

    pub fn scene(&self) -> &OrbitScene {
        self.app
            .world()
            .resource::<ActiveScene>()
            .get()
            .expect("no scene loaded")
    }

    /// Messages of type `M` still buffered in the world.
    pub fn messages<M: Message + Clone>(&self) -> Vec<M> {
        let messages = self.app.world().resource::<Messages<M>>();
        messages.get_cursor().read(messages).cloned().collect()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
