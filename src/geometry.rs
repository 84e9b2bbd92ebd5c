//! Geometry helpers shared by the layout engine
//!
//! Angles are in degrees throughout. Rotations around the wand are expressed
//! as rotations about the wand's local Z (forward) axis; the wand's local Y
//! (up) axis is the direction that points at the pane at angle 0.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Wrap an angle in degrees into `[0, 360)`
pub fn normalize_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed difference `to - from`, in `[-180, 180)`
pub fn signed_angle_delta(from: f32, to: f32) -> f32 {
    let delta = normalize_angle(to - from);
    if delta >= 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Sign that treats zero as positive
#[inline]
pub fn sign(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Unsigned angle between two vectors, in degrees
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Remove the component of `v` along `normal`
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    v - n * v.dot(n)
}

/// Rotation about the wand's forward axis by `degrees`
#[inline]
pub fn ring_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_z(degrees.to_radians())
}

/// Orientation adjustment that turns a ring-facing frame into a panel frame
pub fn panel_adjust() -> Quat {
    Quat::from_rotation_x(90f32.to_radians())
}

/// World pose of something mounted on the ring at `angle`
///
/// `radius` is the distance from the wand axis, `height` the offset along it.
pub fn ring_pose(wand: &Pose, angle: f32, radius: f32, height: f32, adjust: Quat) -> Pose {
    let q = ring_rotation(angle);
    let local = q * (Vec3::Y * radius + Vec3::Z * height);
    Pose {
        position: wand.transform_point(local),
        rotation: wand.rotation * q * adjust,
    }
}

/// Position + orientation in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Local +Z in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local +Y in world space
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Map a point from this pose's local space into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Map a world-space point into this pose's local space
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Linear position / spherical rotation blend, `t` clamped to `[0, 1]`
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-40.0), 320.0);
        assert_eq!(normalize_angle(725.0), 5.0);
        assert!(normalize_angle(-1e-7) < 360.0);
    }

    #[test]
    fn test_signed_angle_delta_wraps() {
        assert_eq!(signed_angle_delta(350.0, 10.0), 20.0);
        assert_eq!(signed_angle_delta(10.0, 350.0), -20.0);
        assert_eq!(signed_angle_delta(0.0, 180.0), -180.0);
    }

    #[test]
    fn test_ring_rotation_maps_up_to_pane_direction() {
        let dir = ring_rotation(90.0) * Vec3::Y;
        assert!((dir - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_ring_pose_follows_wand() {
        let wand = Pose::new(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY);
        let pose = ring_pose(&wand, 0.0, 0.25, 0.1, Quat::IDENTITY);
        assert!((pose.position - Vec3::new(0.0, 1.25, 0.1)).length() < 1e-5);

        let turned = ring_pose(&wand, 180.0, 0.25, 0.0, Quat::IDENTITY);
        assert!((turned.position - Vec3::new(0.0, 0.75, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_pose_round_trip_point() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7));
        let local = Vec3::new(0.3, -0.2, 0.5);
        let back = pose.inverse_transform_point(pose.transform_point(local));
        assert!((back - local).length() < 1e-5);
    }

    #[test]
    fn test_angle_between() {
        assert!((angle_between(Vec3::X, Vec3::Y) - 90.0).abs() < 1e-4);
        assert_eq!(angle_between(Vec3::ZERO, Vec3::Y), 0.0);
    }
}
