//! Command processing system.
//!
//! Processes commands from the JavaScript/WASM interface or the host binary.

use bevy::prelude::*;

use crate::bevy::{ClearSceneEvent, CommandQueue, LoadSceneEvent, PointerInputEvent, SceneCommand};

/// System to process commands from the external command queue.
///
/// Handles commands until a Yield is encountered.
/// Commands after Yield are processed in the next frame.
pub fn process_commands(
    command_queue: Res<CommandQueue>,
    mut load_events: MessageWriter<LoadSceneEvent>,
    mut clear_events: MessageWriter<ClearSceneEvent>,
    mut pointer_events: MessageWriter<PointerInputEvent>,
) {
    for command in command_queue.drain_until_yield() {
        match command {
            SceneCommand::LoadScene { config } => {
                tracing::info!("[command] LoadScene with {} satellites", config.satellites.len());
                load_events.write(LoadSceneEvent { config });
            }
            SceneCommand::ClearScene => {
                tracing::info!("[command] ClearScene");
                clear_events.write(ClearSceneEvent);
            }
            SceneCommand::Pointer(raw) => {
                tracing::trace!("[command] Pointer {:?}", raw.phase);
                pointer_events.write(PointerInputEvent(raw));
            }
            // Yield is consumed by drain_until_yield(), should not reach here
            SceneCommand::Yield => {}
        }
    }
}
