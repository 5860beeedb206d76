//! ECS Events (Messages) for the knockdown session.
//!
//! Platform adapters write input messages (taps, pinches, surface updates,
//! physics contacts) and read session messages (placements, removals, win,
//! anchor completions). Internal request messages fan out of the command
//! queue. Note: in Bevy 0.18+, buffered events use the Message trait.

use bevy::prelude::*;

use crate::anchor::ResolvedAnchor;
use crate::surface::{Surface, SurfaceId};

/// Phase of a two-finger pinch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Fingers went down; `distance` is the baseline.
    Began,
    /// Fingers moved while held.
    Moved,
}

// ========== Platform input ==========

/// Message for a single screen tap (or click).
#[derive(Message, Debug, Clone)]
pub struct TapEvent {
    /// Screen-space position in pixels.
    pub screen: Vec2,
}

/// Message for a pinch gesture sample.
#[derive(Message, Debug, Clone)]
pub struct PinchEvent {
    pub phase: GesturePhase,
    /// Screen-space position of the primary touch, used to pick the object
    /// when the gesture begins.
    pub screen: Vec2,
    /// Current distance between the two touches, in pixels.
    pub distance: f32,
}

/// Message for a scroll-wheel notch (desktop testing path).
#[derive(Message, Debug, Clone)]
pub struct ScrollEvent {
    /// Signed notch count; positive grows the selection.
    pub delta: f32,
}

/// Message carrying a batch of surface tracking changes.
#[derive(Message, Debug, Clone, Default)]
pub struct SurfaceUpdateEvent {
    pub added: Vec<Surface>,
    pub updated: Vec<Surface>,
    pub removed: Vec<SurfaceId>,
}

/// Message from the platform physics engine: `entity` entered the fall
/// volume. The built-in transform observer writes the same message, so
/// both detection paths share one handler.
#[derive(Message, Debug, Clone)]
pub struct VolumeEnteredEvent {
    pub entity: Entity,
}

/// Message from the platform physics engine: a projectile touched
/// something.
#[derive(Message, Debug, Clone)]
pub struct ProjectileContactEvent {
    pub projectile: Entity,
    pub other: Entity,
}

// ========== Internal requests ==========

/// Message to start hosting the current local anchor.
#[derive(Message, Debug, Clone, Default)]
pub struct HostAnchorEvent {
    /// Lifetime override; `None` uses the configured TTL.
    pub ttl_days: Option<u32>,
}

/// Message to start resolving the known cloud anchor id.
#[derive(Message, Debug, Clone, Default)]
pub struct ResolveAnchorEvent;

/// Message to launch a projectile from the camera.
#[derive(Message, Debug, Clone, Default)]
pub struct ThrowRequestedEvent;

// ========== Session output ==========

/// Message fired when a tap placed a new object.
#[derive(Message, Debug, Clone)]
pub struct ObjectPlacedEvent {
    pub entity: Entity,
    pub surface: SurfaceId,
    /// Hit point on the surface.
    pub position: Vec3,
}

/// Message fired when a fallen object was removed from the session.
#[derive(Message, Debug, Clone)]
pub struct ObjectRemovedEvent {
    pub entity: Entity,
    /// Objects still standing after the removal.
    pub remaining: usize,
}

/// Message fired once when the last object falls.
#[derive(Message, Debug, Clone, Default)]
pub struct GameWonEvent;

/// Message fired when hosting completed successfully.
#[derive(Message, Debug, Clone)]
pub struct AnchorHostedEvent {
    pub anchor_id: String,
}

/// Message fired when resolving completed successfully.
#[derive(Message, Debug, Clone)]
pub struct AnchorResolvedEvent {
    pub anchor: ResolvedAnchor,
}
