//! ECS Components for the knockdown session.

use bevy::prelude::*;

use crate::surface::SurfaceId;

/// A player-placed knockdown target.
#[derive(Component, Debug, Clone)]
pub struct PlacedObject {
    /// The surface the object was placed on.
    pub surface: SurfaceId,
    /// Hit point on the surface; the object is re-seated on this point
    /// when gameplay starts.
    pub surface_position: Vec3,
}

impl PlacedObject {
    pub fn new(surface: SurfaceId, surface_position: Vec3) -> Self {
        Self {
            surface,
            surface_position,
        }
    }
}

/// Local-space bounding half extents, used to rest the object base on its
/// surface (`y offset = half_extents.y * scale.y`).
#[derive(Component, Debug, Clone, Copy)]
pub struct ObjectBounds {
    pub half_extents: Vec3,
}

impl ObjectBounds {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }
}

/// Rigid-body intent consumed by the platform physics engine.
///
/// Placed objects spawn frozen (kinematic, gravity off) so they hold their
/// pose through placement and scaling; gameplay entry unfreezes them.
#[derive(Component, Debug, Clone, Copy)]
pub struct PhysicsProxy {
    pub frozen: bool,
}

impl PhysicsProxy {
    pub fn frozen() -> Self {
        Self { frozen: true }
    }
}

/// A thrown sphere. Scores at most once, on its first contact with a
/// placed object.
#[derive(Component, Debug, Clone, Default)]
pub struct Projectile {
    pub scored: bool,
}

/// Initial velocity for the platform physics engine to apply on spawn.
#[derive(Component, Debug, Clone, Copy)]
pub struct LaunchVelocity(pub Vec3);

/// The device-local anchor candidate for cloud hosting. At most one exists;
/// placing a new one replaces it.
#[derive(Component, Debug, Clone)]
pub struct LocalAnchorMarker {
    pub surface: SurfaceId,
}

/// Spawned at the pose recovered from a resolved cloud anchor.
#[derive(Component, Debug, Clone, Default)]
pub struct ResolvedAnchorMarker;
