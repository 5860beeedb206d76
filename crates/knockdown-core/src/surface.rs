//! Tracked surfaces and fall-volume geometry.
//!
//! The platform's tracking layer reports horizontal surfaces with a pose
//! and a boundary polygon. The session only needs their world extents:
//! placement seats objects on them, and at game start their combined
//! footprint defines the fall volume hung underneath the lowest one.

use bevy::prelude::{Quat, Vec2, Vec3};
use uuid::Uuid;

/// Opaque handle for a tracked surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// World-space position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// A tracked surface with its boundary polygon.
///
/// Boundary vertices live in the plane's local XZ frame; `world_vertices`
/// applies the pose to recover world positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: SurfaceId,
    pub pose: Pose,
    pub boundary: Vec<Vec2>,
}

impl Surface {
    pub fn new(id: SurfaceId, pose: Pose, boundary: Vec<Vec2>) -> Self {
        Self { id, pose, boundary }
    }

    /// Axis-aligned rectangular surface, `half_extents` in local XZ.
    pub fn rect(id: SurfaceId, pose: Pose, half_extents: Vec2) -> Self {
        let (hx, hz) = (half_extents.x, half_extents.y);
        Self::new(
            id,
            pose,
            vec![
                Vec2::new(-hx, -hz),
                Vec2::new(hx, -hz),
                Vec2::new(hx, hz),
                Vec2::new(-hx, hz),
            ],
        )
    }

    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.boundary.iter().map(move |v| {
            self.pose.position + self.pose.rotation * Vec3::new(v.x, 0.0, v.y)
        })
    }
}

/// Target returned by a surface raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub surface: SurfaceId,
    pub pose: Pose,
}

/// Axis-aligned detection box placed beneath the play area.
///
/// Spans the combined XZ footprint of the tracked surfaces; its top sits
/// `margin` below the lowest surface so objects still resting on a surface
/// can never touch it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl FallVolume {
    /// Builds the volume from the given surfaces, or `None` when there are
    /// no surfaces (or only degenerate ones without boundary vertices).
    pub fn beneath<'a, I>(surfaces: I, margin: f32, depth: f32) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Surface>,
    {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut lowest_y = f32::INFINITY;
        let mut any = false;

        for surface in surfaces {
            lowest_y = lowest_y.min(surface.pose.position.y);
            for vertex in surface.world_vertices() {
                min = min.min(vertex);
                max = max.max(vertex);
                any = true;
            }
        }

        if !any {
            return None;
        }

        let top = lowest_y - margin;
        Some(Self {
            center: Vec3::new(
                (min.x + max.x) * 0.5,
                top - depth * 0.5,
                (min.z + max.z) * 0.5,
            ),
            half_extents: Vec3::new(
                (max.x - min.x) * 0.5,
                depth * 0.5,
                (max.z - min.z) * 0.5,
            ),
        })
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y && d.z <= self.half_extents.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_world_vertices() {
        let pose = Pose::from_position(Vec3::new(1.0, 0.5, -2.0));
        let surface = Surface::rect(SurfaceId::new(), pose, Vec2::new(2.0, 1.0));

        let xs: Vec<f32> = surface.world_vertices().map(|v| v.x).collect();
        let zs: Vec<f32> = surface.world_vertices().map(|v| v.z).collect();
        assert!((xs.iter().cloned().fold(f32::INFINITY, f32::min) - -1.0).abs() < 0.001);
        assert!((xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max) - 3.0).abs() < 0.001);
        assert!((zs.iter().cloned().fold(f32::INFINITY, f32::min) - -3.0).abs() < 0.001);
        assert!((zs.iter().cloned().fold(f32::NEG_INFINITY, f32::max) - -1.0).abs() < 0.001);
    }

    #[test]
    fn test_rotated_boundary() {
        // 90° about Y swaps local X into world -Z
        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let surface = Surface::rect(SurfaceId::new(), pose, Vec2::new(2.0, 1.0));

        let max_z = surface
            .world_vertices()
            .map(|v| v.z)
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((max_z - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_volume_spans_all_surfaces() {
        let a = Surface::rect(
            SurfaceId::new(),
            Pose::from_position(Vec3::new(-2.0, 0.0, 0.0)),
            Vec2::splat(1.0),
        );
        let b = Surface::rect(
            SurfaceId::new(),
            Pose::from_position(Vec3::new(3.0, 0.4, 1.0)),
            Vec2::splat(1.0),
        );

        let volume = FallVolume::beneath([&a, &b], 0.5, 1.0).expect("two surfaces");

        // X spans [-3, 4], Z spans [-1, 2]
        assert!((volume.center.x - 0.5).abs() < 0.001);
        assert!((volume.half_extents.x - 3.5).abs() < 0.001);
        assert!((volume.center.z - 0.5).abs() < 0.001);
        assert!((volume.half_extents.z - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_volume_hangs_below_lowest_surface() {
        let low = Surface::rect(
            SurfaceId::new(),
            Pose::from_position(Vec3::new(0.0, -0.3, 0.0)),
            Vec2::splat(1.0),
        );
        let high = Surface::rect(
            SurfaceId::new(),
            Pose::from_position(Vec3::new(0.0, 1.2, 0.0)),
            Vec2::splat(1.0),
        );

        let volume = FallVolume::beneath([&low, &high], 0.5, 1.0).expect("two surfaces");

        // top = -0.3 - 0.5 = -0.8, center = -0.8 - 0.5
        assert!((volume.center.y - -1.3).abs() < 0.001);
        assert!(!volume.contains(Vec3::new(0.0, -0.3, 0.0)));
        assert!(volume.contains(Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_empty_input_has_no_volume() {
        let surfaces: Vec<Surface> = Vec::new();
        assert!(FallVolume::beneath(&surfaces, 0.5, 1.0).is_none());
    }

    #[test]
    fn test_contains_respects_xz_bounds() {
        let surface = Surface::rect(
            SurfaceId::new(),
            Pose::from_position(Vec3::ZERO),
            Vec2::splat(1.0),
        );
        let volume = FallVolume::beneath([&surface], 0.5, 1.0).expect("one surface");

        // Below the surface but outside the footprint
        assert!(!volume.contains(Vec3::new(5.0, -1.0, 0.0)));
        assert!(volume.contains(Vec3::new(0.9, -1.0, 0.9)));
    }
}
