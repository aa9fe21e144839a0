//! Mouse and touch capture.
//!
//! Both modalities are forwarded as [`PointerInputEvent`]s in window pixels;
//! normalization and single-touch tracking happen in the router.

use bevy::input::touch::{Touch, Touches};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bevy::{PointerInput, PointerInputEvent};
use crate::pointer::{PointerPhase, RawPointer, Viewport};

/// System to turn left-button presses and cursor motion into pointer input.
pub fn capture_mouse_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut last_cursor: Local<Option<Vec2>>,
    mut pointer_events: MessageWriter<PointerInputEvent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    // A release outside the window still ends the drag at the last position.
    let Some(cursor) = window.cursor_position().or(*last_cursor) else {
        return;
    };

    let mut send = |phase| {
        pointer_events.write(PointerInputEvent(RawPointer::mouse(phase, cursor.x, cursor.y)));
    };
    if mouse_button.just_pressed(MouseButton::Left) {
        send(PointerPhase::Press);
    } else if *last_cursor != Some(cursor) {
        send(PointerPhase::Move);
    }
    if mouse_button.just_released(MouseButton::Left) {
        send(PointerPhase::Release);
    }
    *last_cursor = Some(cursor);
}

/// System to forward touch start, motion and end.
pub fn capture_touch_input(
    touches: Res<Touches>,
    mut pointer_events: MessageWriter<PointerInputEvent>,
) {
    let mut send = |touch: &Touch, phase| {
        let pos = touch.position();
        pointer_events.write(PointerInputEvent(RawPointer::touch(touch.id(), phase, pos.x, pos.y)));
    };
    for touch in touches.iter_just_pressed() {
        send(touch, PointerPhase::Press);
    }
    for touch in touches.iter() {
        if touch.delta() != Vec2::ZERO && !touches.just_pressed(touch.id()) {
            send(touch, PointerPhase::Move);
        }
    }
    for touch in touches.iter_just_released().chain(touches.iter_just_canceled()) {
        send(touch, PointerPhase::Release);
    }
}

/// System to keep the pointer viewport equal to the window's logical size.
pub fn track_window_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut pointer: ResMut<PointerInput>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = Viewport::new(window.width(), window.height());
    if pointer.viewport != viewport {
        pointer.viewport = viewport;
    }
}
