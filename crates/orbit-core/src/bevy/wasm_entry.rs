//! WASM entry points for the orbit scene.
//!
//! Provides JavaScript-callable functions to start the scene on a canvas and
//! control it afterwards.

use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use bevy::winit::{UpdateMode, WinitSettings};
use parking_lot::Mutex;
use wasm_bindgen::prelude::*;

use crate::bevy::{CommandQueue, OrbitScenePlugin, SceneCommand, UrlOpenerRes};
use crate::config::SceneConfig;
use crate::interaction::UrlOpener;

// ============================================================================
// Global State
// ============================================================================

/// Atomic flag for signaling app shutdown (checked every frame by Bevy system).
static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);

/// In WASM the EventLoop can only be created once, so a second start only
/// loads the new scene into the running app.
static BEVY_APP_STARTED: AtomicBool = AtomicBool::new(false);

/// Command queue shared with the running app.
static COMMAND_QUEUE: Mutex<Option<CommandQueue>> = Mutex::new(None);

fn get_command_queue() -> CommandQueue {
    COMMAND_QUEUE.lock().get_or_insert_with(CommandQueue::new).clone()
}

fn parse_config(config_json: &str) -> Result<SceneConfig, JsValue> {
    SceneConfig::from_json_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Opens navigate targets in a new browsing context.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserUrlOpener;

impl UrlOpener for BrowserUrlOpener {
    fn open(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("[pick] no window to open {}", url);
            return;
        };
        if let Err(e) = window.open_with_url_and_target(url, "_blank") {
            tracing::warn!("[pick] window.open failed for {}: {:?}", url, e);
        }
    }
}

/// Request Bevy app to exit. Called before page unload.
#[wasm_bindgen]
pub fn request_orbit_exit() {
    tracing::info!("[orbit] request_orbit_exit called - signaling app to exit");
    SHOULD_EXIT.store(true, Ordering::SeqCst);
    if let Some(queue) = COMMAND_QUEUE.lock().take() {
        queue.clear();
    }
}

/// Bevy system that checks if exit was requested and sends AppExit.
pub fn check_exit_system(mut exit: MessageWriter<bevy::app::AppExit>) {
    if SHOULD_EXIT.load(Ordering::SeqCst) {
        tracing::info!("[orbit] check_exit_system: sending AppExit");
        exit.write(bevy::app::AppExit::Success);
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Starts the scene app on `canvas_id` and loads `config_json` into it.
///
/// An invalid config is rejected before anything starts. If the app is
/// already running, only the scene is replaced.
#[wasm_bindgen]
pub fn start_orbit_scene(canvas_id: &str, config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    tracing::info!("[orbit] start_orbit_scene called");

    let config = parse_config(config_json)?;
    let queue = get_command_queue();
    queue.push(SceneCommand::LoadScene { config });

    if BEVY_APP_STARTED.load(Ordering::SeqCst) {
        tracing::info!("[orbit] App already running, scene queued");
        return Ok(());
    }

    tracing::info!("[orbit] creating Bevy app for canvas: #{}", canvas_id);

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    canvas: Some(format!("#{canvas_id}")),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: true,
                    transparent: true,
                    ..default()
                }),
                ..default()
            })
            .disable::<bevy::log::LogPlugin>(),
    );

    app.insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::Continuous,
    });

    app.add_plugins(OrbitScenePlugin::new(queue, UrlOpenerRes::new(BrowserUrlOpener)));

    BEVY_APP_STARTED.store(true, Ordering::SeqCst);
    SHOULD_EXIT.store(false, Ordering::SeqCst);

    tracing::info!("[orbit] calling app.run()");
    app.run();

    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

/// Replaces the running scene.
#[wasm_bindgen]
pub fn load_scene(config_json: &str) -> Result<(), JsValue> {
    if SHOULD_EXIT.load(Ordering::SeqCst) {
        return Err(JsValue::from_str("Bevy app is shutting down"));
    }
    let config = parse_config(config_json)?;
    tracing::info!("[orbit] load_scene: {} satellites", config.satellites.len());
    let queue = get_command_queue();
    queue.push(SceneCommand::ClearScene);
    queue.push(SceneCommand::Yield);
    queue.push(SceneCommand::LoadScene { config });
    Ok(())
}

/// Whether the app is running and not shutting down.
#[wasm_bindgen]
pub fn is_orbit_ready() -> bool {
    BEVY_APP_STARTED.load(Ordering::SeqCst) && !SHOULD_EXIT.load(Ordering::SeqCst)
}
