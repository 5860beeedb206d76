//! Placement systems: objects and the local anchor candidate.

use bevy::prelude::*;

use crate::anchor::LocalAnchor;
use crate::bevy::{
    HudStores, LocalAnchorMarker, LocalAnchorState, ObjectBounds, ObjectPlacedEvent, PhysicsProxy,
    PlacedObject, PlacementLedger, RaycasterRes, SurfaceRegistry, TapEvent,
};
use crate::config::SessionConfig;

/// System to place an object where a tap hits a tracked surface.
///
/// The nearest hit that resolves to a tracked surface wins; a tap that
/// only hits untracked geometry is a no-op. Objects spawn frozen, seated
/// half their bounding height above the hit point.
#[allow(clippy::too_many_arguments)]
pub fn handle_placement_taps(
    mut commands: Commands,
    mut taps: MessageReader<TapEvent>,
    raycaster: Res<RaycasterRes>,
    registry: Res<SurfaceRegistry>,
    config: Res<SessionConfig>,
    mut ledger: ResMut<PlacementLedger>,
    mut placed_events: MessageWriter<ObjectPlacedEvent>,
    stores: Res<HudStores>,
    time: Res<Time>,
) {
    let Some(raycaster) = raycaster.get() else {
        // Reported at startup; without a raycaster taps go nowhere.
        taps.clear();
        return;
    };

    for tap in taps.read() {
        let hits = raycaster.surface_hits(tap.screen);
        let Some(hit) = hits.iter().find(|hit| registry.contains(&hit.surface)) else {
            tracing::debug!("[placement] tap at {:?} hit no tracked surface", tap.screen);
            continue;
        };

        let half_extents = config.object_half_extents();
        let mut translation = hit.pose.position;
        translation.y += half_extents.y;

        let entity = commands
            .spawn((
                PlacedObject::new(hit.surface, hit.pose.position),
                ObjectBounds::new(half_extents),
                PhysicsProxy::frozen(),
                Transform::from_translation(translation).with_rotation(hit.pose.rotation),
            ))
            .id();
        let order = ledger.record(entity, hit.pose.position);

        tracing::info!("[placement] object {} placed on surface {}", order, hit.surface);
        stores.status.push(
            format!("Placed object {}.", order + 1),
            time.elapsed_secs_f64(),
        );
        placed_events.write(ObjectPlacedEvent {
            entity,
            surface: hit.surface,
            position: hit.pose.position,
        });
    }
}

/// System to seat the local cloud anchor candidate under a tap.
///
/// Only one candidate exists; a new tap replaces the previous marker.
pub fn handle_anchor_taps(
    mut commands: Commands,
    mut taps: MessageReader<TapEvent>,
    raycaster: Res<RaycasterRes>,
    registry: Res<SurfaceRegistry>,
    mut local_anchor: ResMut<LocalAnchorState>,
    stores: Res<HudStores>,
    time: Res<Time>,
) {
    let Some(raycaster) = raycaster.get() else {
        taps.clear();
        return;
    };

    for tap in taps.read() {
        let hits = raycaster.surface_hits(tap.screen);
        let Some(hit) = hits.iter().find(|hit| registry.contains(&hit.surface)) else {
            tracing::debug!("[placement] anchor tap at {:?} hit no tracked surface", tap.screen);
            continue;
        };

        let marker = commands
            .spawn((
                LocalAnchorMarker {
                    surface: hit.surface,
                },
                Transform::from_translation(hit.pose.position).with_rotation(hit.pose.rotation),
            ))
            .id();

        let anchor = LocalAnchor {
            pose: hit.pose,
            surface: hit.surface,
        };
        if let Some(previous) = local_anchor.replace(anchor, marker) {
            commands.entity(previous).despawn();
            tracing::info!("[placement] local anchor moved to surface {}", hit.surface);
        } else {
            tracing::info!("[placement] local anchor placed on surface {}", hit.surface);
        }
        stores
            .status
            .push("Anchor placed.", time.elapsed_secs_f64());
    }
}
