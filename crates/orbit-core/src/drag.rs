//! Camera-facing plane drag.

use bevy::math::primitives::InfinitePlane3d;
use bevy::math::{Dir3, Ray3d, Vec3};

use crate::scene::NodeId;

/// An in-progress drag of one node.
///
/// The node moves on the plane through its grab-time position whose normal
/// is the camera's view direction. The offset between the first pointer
/// intersection and the node origin is kept, so the node does not jump to
/// the pointer when grabbed off-center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    target: NodeId,
    plane_origin: Vec3,
    plane: InfinitePlane3d,
    offset: Vec3,
}

impl DragSession {
    /// Starts a drag of `target`, currently at `object_position`.
    ///
    /// If `ray` misses the plane the offset is zero and the node snaps to
    /// the first pointer position that does intersect it.
    pub fn begin(target: NodeId, object_position: Vec3, facing: Dir3, ray: Ray3d) -> Self {
        let plane = InfinitePlane3d::new(facing);
        let offset = ray
            .intersect_plane(object_position, plane)
            .map_or(Vec3::ZERO, |d| ray.get_point(d) - object_position);
        Self {
            target,
            plane_origin: object_position,
            plane,
            offset,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// New world position for the target under `ray`, or `None` when the ray
    /// is parallel to the plane or points away from it.
    pub fn update(&self, ray: Ray3d) -> Option<Vec3> {
        let distance = ray.intersect_plane(self.plane_origin, self.plane)?;
        Some(ray.get_point(distance) - self.offset)
    }

    /// Ends the drag, handing back the node that was dragged.
    pub fn end(self) -> NodeId {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: Vec3, towards: Vec3) -> Ray3d {
        Ray3d::new(origin, Dir3::new(towards - origin).unwrap())
    }

    #[test]
    fn test_update_with_grab_ray_keeps_position() {
        let object = Vec3::new(1.0, 0.5, 0.0);
        let grab = ray(Vec3::new(0.0, 0.0, 10.0), Vec3::new(1.2, 0.7, 0.0));
        let session = DragSession::begin(NodeId(3), object, Dir3::NEG_Z, grab);

        let moved = session.update(grab).unwrap();
        assert!(moved.abs_diff_eq(object, 1e-5));
        assert!(session.offset().abs_diff_eq(Vec3::new(0.2, 0.2, 0.0), 1e-5));
    }

    #[test]
    fn test_update_moves_on_facing_plane() {
        let object = Vec3::ZERO;
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let session = DragSession::begin(NodeId(0), object, Dir3::NEG_Z, ray(eye, object));

        let moved = session.update(ray(eye, Vec3::new(2.0, -1.0, 0.0))).unwrap();
        assert!(moved.abs_diff_eq(Vec3::new(2.0, -1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_parallel_or_backward_ray_is_ignored() {
        let session = DragSession::begin(
            NodeId(0),
            Vec3::ZERO,
            Dir3::NEG_Z,
            ray(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO),
        );

        let parallel = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::X);
        assert_eq!(session.update(parallel), None);

        let away = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::Z);
        assert_eq!(session.update(away), None);
    }

    #[test]
    fn test_end_returns_target() {
        let session = DragSession::begin(
            NodeId(9),
            Vec3::ZERO,
            Dir3::NEG_Z,
            Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::NEG_Z),
        );
        assert_eq!(session.target(), NodeId(9));
        assert_eq!(session.end(), NodeId(9));
    }
}
