//! Mode transition systems.
//!
//! OnEnter/OnExit handlers own every mode side effect: the surface
//! tracking switches, gameplay setup and teardown, and the Idle reset.
//! Command processing only queues transitions; the work happens here.

use bevy::prelude::*;

use crate::bevy::{
    CloudAnchorBridge, FallVolumeRes, HudStores, LocalAnchorMarker, LocalAnchorState, ObjectBounds,
    PhysicsProxy, PlacedObject, PlacementLedger, Projectile, ResolvedAnchorMarker, ScaleGesture,
    SessionScore, SurfaceRegistry, WinTeardown,
};
use crate::config::SessionConfig;
use crate::surface::FallVolume;

/// Placement wants fresh surfaces: detection and visualization both on.
pub fn on_enter_placement(mut registry: ResMut<SurfaceRegistry>) {
    tracing::info!("[session] enter placement");
    registry.set_detection(true);
    registry.set_visualized(true);
}

/// Scaling locks the tracked set and hides the overlay so the surfaces
/// do not distract from the object being adjusted.
pub fn on_enter_scaling(mut registry: ResMut<SurfaceRegistry>) {
    tracing::info!("[session] enter scaling");
    registry.set_detection(false);
    registry.set_visualized(false);
}

pub fn on_exit_scaling(mut gesture: ResMut<ScaleGesture>) {
    gesture.clear();
}

/// Gameplay setup: freeze the tracked set (still visible), build the fall
/// volume under it, seat every object on its surface, hand the objects to
/// physics, and zero the score.
#[allow(clippy::too_many_arguments)]
pub fn on_enter_gameplay(
    config: Res<SessionConfig>,
    mut registry: ResMut<SurfaceRegistry>,
    mut volume: ResMut<FallVolumeRes>,
    mut score: ResMut<SessionScore>,
    mut teardown: ResMut<WinTeardown>,
    ledger: Res<PlacementLedger>,
    mut placed: Query<(&PlacedObject, &ObjectBounds, &mut Transform, &mut PhysicsProxy)>,
    stores: Res<HudStores>,
    time: Res<Time>,
) {
    tracing::info!("[session] enter gameplay ({} objects)", ledger.len());

    registry.set_detection(false);
    registry.set_visualized(true);

    volume.0 = FallVolume::beneath(
        registry.iter(),
        config.fall_margin,
        config.fall_volume_depth,
    );
    if volume.0.is_none() {
        tracing::warn!("[session] no tracked surfaces, built-in fall detection disabled");
    }

    for (object, bounds, mut transform, mut proxy) in placed.iter_mut() {
        // Scaling may have sunk the base into the surface or lifted it off;
        // re-seat using the scaled half height.
        transform.translation.y =
            object.surface_position.y + bounds.half_extents.y * transform.scale.y;
        proxy.frozen = false;
    }

    score.reset();
    teardown.reset();
    stores.status.push(
        format!("Game started with {} objects.", ledger.len()),
        time.elapsed_secs_f64(),
    );
}

/// Gameplay teardown: despawn the play entities and drop per-game state.
/// The score survives so the menu can show the final tally.
pub fn on_exit_gameplay(
    mut commands: Commands,
    placed: Query<Entity, With<PlacedObject>>,
    projectiles: Query<Entity, With<Projectile>>,
    mut ledger: ResMut<PlacementLedger>,
    mut volume: ResMut<FallVolumeRes>,
    mut teardown: ResMut<WinTeardown>,
) {
    tracing::info!("[session] exit gameplay");

    for entity in placed.iter() {
        commands.entity(entity).despawn();
    }
    for entity in projectiles.iter() {
        commands.entity(entity).despawn();
    }

    ledger.clear();
    volume.0 = None;
    teardown.reset();
}

/// Idle is the menu: clear the tracked surfaces, drop the anchor markers,
/// and abandon any anchor operation still in flight. The persisted anchor
/// id survives for the next session.
pub fn on_enter_idle(
    mut commands: Commands,
    mut registry: ResMut<SurfaceRegistry>,
    mut local_anchor: ResMut<LocalAnchorState>,
    mut bridge: ResMut<CloudAnchorBridge>,
    local_markers: Query<Entity, With<LocalAnchorMarker>>,
    resolved_markers: Query<Entity, With<ResolvedAnchorMarker>>,
) {
    tracing::info!("[session] enter idle");

    registry.clear();
    registry.set_detection(false);
    registry.set_visualized(false);

    local_anchor.clear();
    bridge.abandon_pending();

    for entity in local_markers.iter() {
        commands.entity(entity).despawn();
    }
    for entity in resolved_markers.iter() {
        commands.entity(entity).despawn();
    }
}
