//! ECS Resources for the knockdown session.
//!
//! These resources hold shared session state, the collaborator seams the
//! platform wires in, and the command queue the host UI pushes into.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::anchor::{
    CloudAnchorApi, HostOutcome, LocalAnchor, ResolveOutcome, Ticket, validate_anchor_id,
};
use crate::error::SessionError;
use crate::store::{KeyValueStore, MemoryStore};
use crate::surface::{FallVolume, Surface, SurfaceHit, SurfaceId};

/// Tracked surfaces plus the two platform-facing tracking switches.
///
/// `detection_enabled` gates whether incoming surface updates are applied;
/// `visualized` tells the host renderer whether to draw the surfaces. Both
/// are driven by mode transitions. Surfaces already in the registry persist
/// while detection is off.
#[derive(Resource, Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, Surface>,
    detection_enabled: bool,
    visualized: bool,
}

impl SurfaceRegistry {
    pub fn detection_enabled(&self) -> bool {
        self.detection_enabled
    }

    pub fn set_detection(&mut self, enabled: bool) {
        self.detection_enabled = enabled;
    }

    pub fn visualized(&self) -> bool {
        self.visualized
    }

    pub fn set_visualized(&mut self, visualized: bool) {
        self.visualized = visualized;
    }

    pub fn upsert(&mut self, surface: Surface) {
        self.surfaces.insert(surface.id, surface);
    }

    pub fn remove(&mut self, id: &SurfaceId) -> bool {
        self.surfaces.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    pub fn contains(&self, id: &SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }

    pub fn get(&self, id: &SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }
}

/// One tracked placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerEntry {
    pub entity: Entity,
    pub surface_position: Vec3,
    /// Monotonic creation order, never reused within a session.
    pub order: u64,
}

/// Registry of placed objects, in creation order.
///
/// The ledger is the authoritative count for the start-game guard and the
/// win condition; entities carry the rest of their state as components.
#[derive(Resource, Debug, Default)]
pub struct PlacementLedger {
    entries: Vec<LedgerEntry>,
    next_order: u64,
}

impl PlacementLedger {
    /// Records a placement and returns its creation order.
    pub fn record(&mut self, entity: Entity, surface_position: Vec3) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        self.entries.push(LedgerEntry {
            entity,
            surface_position,
            order,
        });
        order
    }

    /// Removes an entry by entity. Returns false if it was not tracked,
    /// which makes duplicate fall reports harmless.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.entity != entity);
        self.entries.len() != before
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.iter().any(|entry| entry.entity == entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Active scale interaction, valid only during Scaling mode.
///
/// `initial_scale` is captured at selection; pinch and scroll factors apply
/// relative to it. Wheel deltas accumulate since selection so repeated
/// scrolls keep growing or shrinking the object.
#[derive(Resource, Debug, Default)]
pub struct ScaleGesture {
    pub selected: Option<Entity>,
    pub initial_scale: Vec3,
    pub pinch_start_distance: Option<f32>,
    pub scroll_accum: f32,
}

impl ScaleGesture {
    pub fn select(&mut self, entity: Entity, scale: Vec3) {
        self.selected = Some(entity);
        self.initial_scale = scale;
        self.pinch_start_distance = None;
        self.scroll_accum = 0.0;
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.initial_scale = Vec3::ONE;
        self.pinch_start_distance = None;
        self.scroll_accum = 0.0;
    }
}

/// Projectile hits on placed objects for the current game. Reset when
/// gameplay starts.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SessionScore {
    pub object_hits: u32,
}

impl SessionScore {
    pub fn reset(&mut self) {
        self.object_hits = 0;
    }
}

/// Fall volume for the running game, `None` outside gameplay or when no
/// surfaces were tracked at start.
#[derive(Resource, Debug, Default)]
pub struct FallVolumeRes(pub Option<FallVolume>);

/// Win flag and the delay timer between the win and automatic session end.
#[derive(Resource, Debug, Default)]
pub struct WinTeardown {
    pub won: bool,
    pub timer: Option<Timer>,
}

impl WinTeardown {
    pub fn reset(&mut self) {
        self.won = false;
        self.timer = None;
    }
}

/// Device camera pose, written by the platform tracking adapter every
/// frame. Projectiles launch from here along `forward`.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl CameraPose {
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// The single local anchor candidate and its marker entity.
#[derive(Resource, Debug, Default)]
pub struct LocalAnchorState {
    anchor: Option<LocalAnchor>,
    marker: Option<Entity>,
}

impl LocalAnchorState {
    /// Installs a new anchor, returning the previous marker entity so the
    /// caller can despawn it.
    pub fn replace(&mut self, anchor: LocalAnchor, marker: Entity) -> Option<Entity> {
        self.anchor = Some(anchor);
        self.marker.replace(marker)
    }

    pub fn anchor(&self) -> Option<&LocalAnchor> {
        self.anchor.as_ref()
    }

    pub fn clear(&mut self) -> Option<Entity> {
        self.anchor = None;
        self.marker.take()
    }
}

/// An in-flight anchor operation: the completion ticket plus its deadline.
#[derive(Debug)]
pub struct PendingAnchorOp<T> {
    pub ticket: Ticket<T>,
    pub timeout: Timer,
}

impl<T> PendingAnchorOp<T> {
    pub fn new(ticket: Ticket<T>, timeout_secs: f32) -> Self {
        Self {
            ticket,
            timeout: Timer::from_seconds(timeout_secs, TimerMode::Once),
        }
    }
}

/// Cloud anchor session state: the known (persisted) anchor id and at most
/// one pending host plus one pending resolve.
#[derive(Resource, Debug, Default)]
pub struct CloudAnchorBridge {
    pub known_id: Option<String>,
    host: Option<PendingAnchorOp<HostOutcome>>,
    resolve: Option<PendingAnchorOp<ResolveOutcome>>,
}

impl CloudAnchorBridge {
    pub fn host_pending(&self) -> bool {
        self.host.is_some()
    }

    pub fn resolve_pending(&self) -> bool {
        self.resolve.is_some()
    }

    pub fn busy(&self) -> bool {
        self.host.is_some() || self.resolve.is_some()
    }

    pub fn begin_host(&mut self, ticket: Ticket<HostOutcome>, timeout_secs: f32) {
        self.host = Some(PendingAnchorOp::new(ticket, timeout_secs));
    }

    pub fn begin_resolve(&mut self, ticket: Ticket<ResolveOutcome>, timeout_secs: f32) {
        self.resolve = Some(PendingAnchorOp::new(ticket, timeout_secs));
    }

    /// Takes the pending host op for polling; the poller restores it while
    /// it is still pending.
    pub fn take_host(&mut self) -> Option<PendingAnchorOp<HostOutcome>> {
        self.host.take()
    }

    pub fn restore_host(&mut self, op: PendingAnchorOp<HostOutcome>) {
        self.host = Some(op);
    }

    pub fn take_resolve(&mut self) -> Option<PendingAnchorOp<ResolveOutcome>> {
        self.resolve.take()
    }

    pub fn restore_resolve(&mut self, op: PendingAnchorOp<ResolveOutcome>) {
        self.resolve = Some(op);
    }

    /// Abandons any pending operations, e.g. when the session returns to
    /// Idle. The known id survives.
    pub fn abandon_pending(&mut self) {
        self.host = None;
        self.resolve = None;
    }

    pub fn resolvable_id(&self) -> Result<&str, SessionError> {
        validate_anchor_id(self.known_id.as_deref())
    }
}

// ============================================================================
// Collaborator seams
// ============================================================================

/// Platform raycaster: screen point to tracked surfaces or placed objects.
pub trait Raycaster: Send + Sync {
    /// Surface hits sorted near to far.
    fn surface_hits(&self, screen: Vec2) -> Vec<SurfaceHit>;

    /// The placed-object entity under the screen point, if any.
    fn pick_object(&self, screen: Vec2) -> Option<Entity>;
}

/// Raycaster handle, absent until the platform wires one in.
#[derive(Resource, Clone, Default)]
pub struct RaycasterRes(pub Option<Arc<dyn Raycaster>>);

impl RaycasterRes {
    pub fn get(&self) -> Option<&dyn Raycaster> {
        self.0.as_deref()
    }
}

/// Cloud anchor service handle, absent until the platform wires one in.
#[derive(Resource, Clone, Default)]
pub struct AnchorServiceRes(pub Option<Arc<dyn CloudAnchorApi>>);

impl AnchorServiceRes {
    pub fn get(&self) -> Option<&dyn CloudAnchorApi> {
        self.0.as_deref()
    }
}

/// Persistence handle. Defaults to [`MemoryStore`]; platforms substitute
/// their device-local storage to survive restarts.
#[derive(Resource, Clone)]
pub struct PersistenceRes(pub Arc<dyn KeyValueStore>);

impl PersistenceRes {
    pub fn get(&self) -> &dyn KeyValueStore {
        self.0.as_ref()
    }
}

impl Default for PersistenceRes {
    fn default() -> Self {
        Self(Arc::new(MemoryStore::new()))
    }
}

// ============================================================================
// Command queue
// ============================================================================

/// Commands the host UI sends into the session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Enter Placement mode. Rejected during gameplay.
    EnterPlacementMode,
    /// Enter Scaling mode. Rejected during gameplay.
    EnterScalingMode,
    /// Start the game. Rejected with no placed objects.
    StartGame,
    /// End the running game and return to Idle.
    EndGame,
    /// Switch what a placement tap produces (object or anchor).
    SetPlacementTarget {
        target: crate::bevy::plugin::PlacementTarget,
    },
    /// Host the current local anchor.
    HostAnchor { ttl_days: Option<u32> },
    /// Resolve the known cloud anchor id.
    ResolveAnchor,
    /// Launch a projectile from the camera.
    ThrowProjectile,
}

/// Thread-safe command queue for host-UI interop.
///
/// The host pushes commands from its own thread; the session drains them
/// at the start of the next frame.
#[derive(Resource, Clone)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<SessionCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: SessionCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands.
    pub fn drain(&self) -> Vec<SessionCommand> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
