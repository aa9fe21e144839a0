//! Orbit field: deterministic kinematics for satellites around an anchor body.
//!
//! All satellites of one field share a single [`OrbitClock`]. Each satellite
//! keeps its relative phase through [`OrbitSpec::phase_offset`], so the
//! whole field advances with one scalar update per tick.

use std::f32::consts::TAU;

use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::NodeId;

/// Fixed frame step for the orbit clock (60Hz, one tick per step).
pub const ORBIT_DT: f32 = 1.0 / 60.0;

/// Wraps an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Immutable orbital parameters of one satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitSpec {
    /// Radius along the X axis.
    pub radius_major: f32,
    /// Radius of the tilted Y/Z component.
    pub radius_minor: f32,
    /// Splits the minor radius between Y (`sin`) and Z (`cos`), in radians.
    #[serde(default)]
    pub tilt: f32,
    /// Self-rotation per tick, in radians.
    #[serde(default)]
    pub spin_speed: f32,
    /// Phase relative to the shared clock, in radians.
    #[serde(default)]
    pub phase_offset: f32,
}

impl OrbitSpec {
    /// A planar circular orbit of the given radius.
    pub fn circular(radius: f32) -> Self {
        Self {
            radius_major: radius,
            radius_minor: radius,
            tilt: 0.0,
            spin_speed: 0.0,
            phase_offset: 0.0,
        }
    }

    pub fn with_tilt(mut self, tilt: f32) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn with_spin(mut self, spin_speed: f32) -> Self {
        self.spin_speed = spin_speed;
        self
    }

    pub fn with_phase(mut self, phase_offset: f32) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    /// Offset from the anchor at orbital angle `theta`.
    pub fn offset_at(&self, theta: f32) -> Vec3 {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_tilt, cos_tilt) = self.tilt.sin_cos();
        Vec3::new(
            cos_t * self.radius_major,
            sin_t * sin_tilt * self.radius_minor,
            sin_t * cos_tilt * self.radius_minor,
        )
    }
}

/// Shared phase clock of an orbit field.
///
/// The angle is kept wrapped in `[0, 2π)`; completed turns are counted
/// separately so the total angle never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitClock {
    angle: f32,
    turns: u64,
}

impl OrbitClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wrapped angle in `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Monotonic total angle (turns included).
    pub fn total_angle(&self) -> f64 {
        self.turns as f64 * std::f64::consts::TAU + f64::from(self.angle)
    }

    /// Advances the clock by `delta` radians. Negative deltas are ignored.
    pub fn advance(&mut self, delta: f32) {
        if delta.is_nan() || delta <= 0.0 {
            return;
        }
        let raw = self.angle + delta;
        let turns = (raw / TAU).floor();
        // Float-to-int casts saturate; the sum must too.
        self.turns = self.turns.saturating_add(turns as u64);
        self.angle = wrap_angle(raw - turns * TAU);
    }
}

/// Per-tick derived state of a satellite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteState {
    pub position: Vec3,
    /// Accumulated self-rotation about Y, wrapped in `[0, 2π)`.
    pub spin: f32,
}

impl SatelliteState {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.spin)
    }
}

/// One satellite of the field: its spec, the node it drives and its state.
#[derive(Debug, Clone)]
pub struct Satellite {
    pub spec: OrbitSpec,
    pub node: NodeId,
    pub state: SatelliteState,
}

/// Ordered collection of satellites sharing one clock and one anchor.
#[derive(Debug, Clone)]
pub struct OrbitField {
    clock: OrbitClock,
    angular_step: f32,
    anchor: Vec3,
    satellites: Vec<Satellite>,
}

impl OrbitField {
    /// Creates an empty field advancing `angular_step` radians per tick.
    pub fn new(angular_step: f32) -> Self {
        Self {
            clock: OrbitClock::new(),
            angular_step,
            anchor: Vec3::ZERO,
            satellites: Vec::new(),
        }
    }

    pub fn clock(&self) -> &OrbitClock {
        &self.clock
    }

    pub fn angular_step(&self) -> f32 {
        self.angular_step
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Moves the anchor. Satellites follow on the next [`advance`](Self::advance).
    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = anchor;
    }

    /// Adds a satellite driving `node` and places it at the current phase.
    pub fn add(&mut self, spec: OrbitSpec, node: NodeId) -> usize {
        let state = SatelliteState {
            position: self.anchor + spec.offset_at(self.clock.angle() + spec.phase_offset),
            spin: 0.0,
        };
        self.satellites.push(Satellite { spec, node, state });
        self.satellites.len() - 1
    }

    /// Removes the satellite driving `node`, keeping the order of the rest.
    pub fn remove_node(&mut self, node: NodeId) -> Option<Satellite> {
        let index = self.satellites.iter().position(|s| s.node == node)?;
        Some(self.satellites.remove(index))
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Advances the shared clock by `dt_ticks` ticks and recomputes every
    /// satellite from its spec and the current anchor position.
    pub fn advance(&mut self, dt_ticks: f32) {
        self.clock.advance(self.angular_step * dt_ticks);
        let angle = self.clock.angle();
        for satellite in &mut self.satellites {
            let theta = wrap_angle(angle + satellite.spec.phase_offset);
            satellite.state.position = self.anchor + satellite.spec.offset_at(theta);
            satellite.state.spin =
                wrap_angle(satellite.state.spin + satellite.spec.spin_speed * dt_ticks);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    const EPS: f32 = 1e-3;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, EPS)
    }

    fn angle_approx(a: f32, b: f32) -> bool {
        let d = wrap_angle(a - b);
        d < EPS || TAU - d < EPS
    }

    #[test]
    fn test_formula_matches_tilted_ellipse() {
        let spec = OrbitSpec {
            radius_major: 3.0,
            radius_minor: 2.0,
            tilt: FRAC_PI_2 / 3.0,
            spin_speed: 0.0,
            phase_offset: 0.0,
        };
        let theta = 0.7_f32;
        let offset = spec.offset_at(theta);
        assert!((offset.x - theta.cos() * 3.0).abs() < 1e-6);
        assert!((offset.y - theta.sin() * spec.tilt.sin() * 2.0).abs() < 1e-6);
        assert!((offset.z - theta.sin() * spec.tilt.cos() * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_tilt_is_planar() {
        let mut field = OrbitField::new(0.1);
        field.add(OrbitSpec::circular(2.0), NodeId(0));
        for _ in 0..100 {
            field.advance(1.0);
            assert_eq!(field.satellites()[0].state.position.y, 0.0);
            let r = field.satellites()[0].state.position.length();
            assert!((r - 2.0).abs() < EPS);
        }
    }

    #[test]
    fn test_zero_radii_degenerate_to_anchor() {
        let mut field = OrbitField::new(0.3);
        field.set_anchor(Vec3::new(1.0, 2.0, 3.0));
        field.add(OrbitSpec::circular(0.0), NodeId(0));
        field.advance(5.0);
        assert!(approx(field.satellites()[0].state.position, Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_orbit_periodicity() {
        let step = TAU / 360.0;
        let mut field = OrbitField::new(step);
        field.set_anchor(Vec3::new(0.5, -1.0, 2.0));
        field.add(
            OrbitSpec {
                radius_major: 4.0,
                radius_minor: 1.5,
                tilt: 0.4,
                spin_speed: step * 2.0,
                phase_offset: 1.1,
            },
            NodeId(0),
        );
        field.add(OrbitSpec::circular(2.0).with_phase(PI), NodeId(1));
        field.advance(0.0);
        let before: Vec<SatelliteState> = field.satellites().iter().map(|s| s.state).collect();

        for _ in 0..360 {
            field.advance(1.0);
        }

        assert!((field.clock().total_angle() - std::f64::consts::TAU).abs() < 1e-3);
        for (sat, start) in field.satellites().iter().zip(&before) {
            assert!(approx(sat.state.position, start.position));
            assert!(angle_approx(sat.state.spin, start.spin));
        }
    }

    #[test]
    fn test_phase_separation() {
        let mut field = OrbitField::new(0.05);
        field.add(OrbitSpec::circular(3.0), NodeId(0));
        field.add(OrbitSpec::circular(3.0).with_phase(FRAC_PI_2), NodeId(1));
        for _ in 0..500 {
            field.advance(1.0);
            let a = field.satellites()[0].state.position;
            let b = field.satellites()[1].state.position;
            assert!(a.distance(b) > 1.0);
        }
    }

    #[test]
    fn test_same_phase_modulo_tau_coincides() {
        let mut field = OrbitField::new(0.05);
        field.add(OrbitSpec::circular(3.0).with_phase(0.25), NodeId(0));
        field.add(OrbitSpec::circular(3.0).with_phase(0.25 + TAU), NodeId(1));
        field.advance(7.0);
        let a = field.satellites()[0].state.position;
        let b = field.satellites()[1].state.position;
        assert!(approx(a, b));
    }

    #[test]
    fn test_anchor_moves_satellites() {
        let mut field = OrbitField::new(0.02);
        field.add(OrbitSpec::circular(2.0), NodeId(0));
        field.advance(1.0);
        let before = field.satellites()[0].state.position;

        field.set_anchor(Vec3::new(0.0, 5.0, 0.0));
        field.advance(0.0);
        let after = field.satellites()[0].state.position;
        assert!(approx(after - before, Vec3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_spin_is_independent_of_orbit() {
        let mut field = OrbitField::new(0.0);
        field.add(OrbitSpec::circular(2.0).with_spin(0.1), NodeId(0));
        let start = field.satellites()[0].state.position;
        for _ in 0..10 {
            field.advance(1.0);
        }
        let sat = &field.satellites()[0];
        assert!(approx(sat.state.position, start));
        assert!((sat.state.spin - 1.0).abs() < EPS);
    }

    #[test]
    fn test_clock_is_monotonic_and_wrapped() {
        let mut clock = OrbitClock::new();
        let mut last = clock.total_angle();
        for _ in 0..1000 {
            clock.advance(0.37);
            assert!(clock.total_angle() > last);
            assert!((0.0..TAU).contains(&clock.angle()));
            last = clock.total_angle();
        }
        clock.advance(-1.0);
        assert_eq!(clock.total_angle(), last);
    }

    #[test]
    fn test_huge_steps_saturate_turn_count() {
        let mut field = OrbitField::new(1e20);
        field.add(OrbitSpec::circular(2.0), NodeId(1));
        for _ in 0..4 {
            field.advance(1.0);
        }
        let clock = field.clock();
        assert!((0.0..TAU).contains(&clock.angle()));
        assert!(clock.total_angle().is_finite());
        assert!(field.satellites()[0].state.position.is_finite());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut field = OrbitField::new(0.02);
        field.add(OrbitSpec::circular(2.0), NodeId(1));
        field.add(OrbitSpec::circular(3.0), NodeId(2));
        field.add(OrbitSpec::circular(4.0), NodeId(3));

        let removed = field.remove_node(NodeId(2)).map(|s| s.node);
        assert_eq!(removed, Some(NodeId(2)));
        let nodes: Vec<NodeId> = field.satellites().iter().map(|s| s.node).collect();
        assert_eq!(nodes, vec![NodeId(1), NodeId(3)]);
        assert!(field.remove_node(NodeId(2)).is_none());
    }
}
