//! Orbit Viewer
//!
//! On desktop, opens a window and runs the scene from a JSON config given as
//! the first argument or through `ORBIT_SCENE`, falling back to the built-in
//! three-moon scene.
//!
//! On wasm32, only installs logging. The page then calls `start_orbit_scene`
//! with its canvas id and scene config.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,wgpu=error,naga=warn")
            }),
        )
        .init();

    desktop::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, Layer};
    use tracing_web::MakeWebConsoleWriter;

    console_error_panic_hook::set_once();

    let filter = EnvFilter::new("info,wgpu=error,naga=warn");

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new())
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).init();
}

#[cfg(not(target_arch = "wasm32"))]
mod desktop {
    use std::path::PathBuf;

    use anyhow::Context;
    use bevy::prelude::*;
    use orbit_core::bevy::{CommandQueue, OrbitScenePlugin, SceneCommand, UrlOpenerRes};
    use orbit_core::{LogUrlOpener, SceneConfig};

    /// Environment variable naming a scene config file.
    const SCENE_ENV: &str = "ORBIT_SCENE";

    fn scene_path() -> Option<PathBuf> {
        std::env::args_os()
            .nth(1)
            .or_else(|| std::env::var_os(SCENE_ENV))
            .map(PathBuf::from)
    }

    fn load_config() -> anyhow::Result<SceneConfig> {
        let Some(path) = scene_path() else {
            tracing::info!("[orbit] no scene file given, using the default scene");
            return Ok(SceneConfig::default());
        };
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        let config = SceneConfig::from_json_str(&json)
            .with_context(|| format!("invalid scene file {}", path.display()))?;
        tracing::info!(
            "[orbit] loaded {} ({} satellites)",
            path.display(),
            config.satellites.len()
        );
        Ok(config)
    }

    pub fn run() -> anyhow::Result<()> {
        let config = load_config()?;

        let queue = CommandQueue::new();
        queue.push(SceneCommand::LoadScene { config });

        App::new()
            .add_plugins(
                DefaultPlugins
                    .set(WindowPlugin {
                        primary_window: Some(Window {
                            title: "Orbit Viewer".into(),
                            ..default()
                        }),
                        ..default()
                    })
                    .disable::<bevy::log::LogPlugin>(),
            )
            .add_plugins(OrbitScenePlugin::new(queue, UrlOpenerRes::new(LogUrlOpener)))
            .run();

        Ok(())
    }
}
