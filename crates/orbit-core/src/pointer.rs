//! Pointer normalization.
//!
//! Mouse events and touch events are reduced to one [`PointerEvent`]
//! carrying normalized device coordinates, so the picking and routing code
//! never branches on the input modality.
//!
//! Only a single pointer is tracked: the first touch that goes down owns the
//! interaction until it is released; any other finger is ignored.

use bevy::math::Vec2;

/// Press / move / release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Press,
    Move,
    Release,
}

/// Where a raw pointer event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch { id: u64 },
}

/// A raw pointer event in screen pixels (origin top-left, Y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointer {
    pub source: PointerSource,
    pub phase: PointerPhase,
    pub screen: Vec2,
}

impl RawPointer {
    pub fn mouse(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            source: PointerSource::Mouse,
            phase,
            screen: Vec2::new(x, y),
        }
    }

    pub fn touch(id: u64, phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            source: PointerSource::Touch { id },
            phase,
            screen: Vec2::new(x, y),
        }
    }
}

/// A modality-agnostic pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Normalized device coordinates, `[-1, 1]` on both axes, Y up.
    pub ndc: Vec2,
}

/// Size of the surface pointer coordinates are measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Converts screen pixels to NDC. Returns `None` for an empty viewport.
    pub fn to_ndc(&self, screen: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (screen.x / self.width) * 2.0 - 1.0,
            -(screen.y / self.height) * 2.0 + 1.0,
        ))
    }
}

/// Folds mouse and touch input into a single pointer stream.
#[derive(Debug, Clone, Default)]
pub struct PointerNormalizer {
    active_touch: Option<u64>,
}

impl PointerNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The touch currently driving the pointer, if any.
    pub fn active_touch(&self) -> Option<u64> {
        self.active_touch
    }

    /// Normalizes one raw event. Returns `None` for secondary touches and
    /// for events measured against an empty viewport.
    pub fn normalize(&mut self, raw: RawPointer, viewport: Viewport) -> Option<PointerEvent> {
        if let PointerSource::Touch { id } = raw.source {
            match (raw.phase, self.active_touch) {
                (PointerPhase::Press, None) => self.active_touch = Some(id),
                (PointerPhase::Release, Some(active)) if active == id => {
                    self.active_touch = None;
                }
                (_, Some(active)) if active == id => {}
                _ => return None,
            }
        }

        let ndc = viewport.to_ndc(raw.screen)?;
        Some(PointerEvent {
            phase: raw.phase,
            ndc,
        })
    }

    /// Forgets the active touch (e.g. when the scene is reloaded).
    pub fn reset(&mut self) {
        self.active_touch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_to_ndc() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.to_ndc(Vec2::new(400.0, 300.0)), Some(Vec2::ZERO));
        assert_eq!(viewport.to_ndc(Vec2::new(0.0, 0.0)), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(viewport.to_ndc(Vec2::new(800.0, 600.0)), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(Viewport::new(0.0, 600.0).to_ndc(Vec2::ZERO), None);
    }

    #[test]
    fn test_mouse_and_touch_normalize_identically() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut normalizer = PointerNormalizer::new();

        let mouse = normalizer
            .normalize(RawPointer::mouse(PointerPhase::Press, 200.0, 150.0), viewport)
            .unwrap();
        let touch = normalizer
            .normalize(RawPointer::touch(3, PointerPhase::Press, 200.0, 150.0), viewport)
            .unwrap();
        assert_eq!(mouse, touch);
        assert_eq!(mouse.ndc, Vec2::new(-0.5, 0.5));
    }

    #[test]
    fn test_secondary_touch_is_ignored() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut normalizer = PointerNormalizer::new();

        assert!(normalizer
            .normalize(RawPointer::touch(1, PointerPhase::Press, 10.0, 10.0), viewport)
            .is_some());
        assert!(normalizer
            .normalize(RawPointer::touch(2, PointerPhase::Press, 90.0, 90.0), viewport)
            .is_none());
        assert!(normalizer
            .normalize(RawPointer::touch(2, PointerPhase::Move, 80.0, 80.0), viewport)
            .is_none());
        assert!(normalizer
            .normalize(RawPointer::touch(1, PointerPhase::Move, 20.0, 20.0), viewport)
            .is_some());

        let release = normalizer
            .normalize(RawPointer::touch(1, PointerPhase::Release, 20.0, 20.0), viewport)
            .unwrap();
        assert_eq!(release.phase, PointerPhase::Release);
        assert_eq!(normalizer.active_touch(), None);

        // After release the next finger takes over
        assert!(normalizer
            .normalize(RawPointer::touch(2, PointerPhase::Press, 50.0, 50.0), viewport)
            .is_some());
        assert_eq!(normalizer.active_touch(), Some(2));
    }

    #[test]
    fn test_mouse_moves_pass_through_without_press() {
        let mut normalizer = PointerNormalizer::new();
        let event = normalizer
            .normalize(RawPointer::mouse(PointerPhase::Move, 0.0, 0.0), Viewport::default())
            .unwrap();
        assert_eq!(event.phase, PointerPhase::Move);
    }
}
