//! Surface tracking intake.

use bevy::prelude::*;

use crate::bevy::{SurfaceRegistry, SurfaceUpdateEvent};

/// System to apply surface tracking batches to the registry.
///
/// Whole batches are dropped while detection is off; the platform keeps
/// tracking internally but the session's surface set stays frozen, which
/// is what scaling and gameplay rely on.
pub fn apply_surface_updates(
    mut events: MessageReader<SurfaceUpdateEvent>,
    mut registry: ResMut<SurfaceRegistry>,
) {
    for update in events.read() {
        if !registry.detection_enabled() {
            tracing::debug!(
                "[session] surface batch dropped, detection off (+{} ~{} -{})",
                update.added.len(),
                update.updated.len(),
                update.removed.len()
            );
            continue;
        }

        for surface in &update.added {
            registry.upsert(surface.clone());
        }
        for surface in &update.updated {
            registry.upsert(surface.clone());
        }
        for id in &update.removed {
            if registry.remove(id) {
                tracing::debug!("[session] surface {} lost", id);
            }
        }
    }
}
