//! Scale-mode gesture handling.
//!
//! All factors are multiplicative against the scale captured when the
//! object was selected, so a gesture can always be undone by returning
//! to its starting point.

use bevy::prelude::*;

use crate::bevy::{
    GesturePhase, PinchEvent, PlacedObject, RaycasterRes, ScaleGesture, ScrollEvent, TapEvent,
};
use crate::config::SessionConfig;

/// System to select the object under a pointer-down for scaling.
///
/// A tap over empty space keeps the current selection.
pub fn handle_scale_selection(
    mut taps: MessageReader<TapEvent>,
    raycaster: Res<RaycasterRes>,
    mut gesture: ResMut<ScaleGesture>,
    objects: Query<&Transform, With<PlacedObject>>,
) {
    let Some(raycaster) = raycaster.get() else {
        taps.clear();
        return;
    };

    for tap in taps.read() {
        let Some(entity) = raycaster.pick_object(tap.screen) else {
            tracing::debug!("[scaling] tap at {:?} picked nothing", tap.screen);
            continue;
        };
        let Ok(transform) = objects.get(entity) else {
            tracing::debug!("[scaling] picked entity {entity} is not a placed object");
            continue;
        };
        gesture.select(entity, transform.scale);
        tracing::debug!("[scaling] selected {entity} at scale {}", transform.scale);
    }
}

/// System to apply two-pointer pinch scaling to the selected object.
pub fn handle_pinch_gestures(
    mut pinches: MessageReader<PinchEvent>,
    raycaster: Res<RaycasterRes>,
    mut gesture: ResMut<ScaleGesture>,
    mut objects: Query<&mut Transform, With<PlacedObject>>,
) {
    for pinch in pinches.read() {
        match pinch.phase {
            GesturePhase::Began => {
                // The midpoint acts as pointer-down, so a pinch straight
                // onto an object selects it without a separate tap.
                if let Some(entity) = raycaster
                    .get()
                    .and_then(|raycaster| raycaster.pick_object(pinch.screen))
                    && let Ok(transform) = objects.get(entity)
                {
                    gesture.select(entity, transform.scale);
                }
                if gesture.selected.is_some() {
                    gesture.pinch_start_distance = Some(pinch.distance);
                }
            }
            GesturePhase::Moved => {
                let (Some(entity), Some(start)) = (gesture.selected, gesture.pinch_start_distance)
                else {
                    continue;
                };
                if start <= f32::EPSILON {
                    continue;
                }
                let Ok(mut transform) = objects.get_mut(entity) else {
                    gesture.clear();
                    continue;
                };
                let factor = pinch.distance / start;
                transform.scale = gesture.initial_scale * factor;
            }
        }
    }
}

/// System to apply mouse-wheel scaling to the selected object.
pub fn handle_scroll_scaling(
    mut scrolls: MessageReader<ScrollEvent>,
    config: Res<SessionConfig>,
    mut gesture: ResMut<ScaleGesture>,
    mut objects: Query<&mut Transform, With<PlacedObject>>,
) {
    for scroll in scrolls.read() {
        let Some(entity) = gesture.selected else {
            continue;
        };
        let Ok(mut transform) = objects.get_mut(entity) else {
            gesture.clear();
            continue;
        };
        gesture.scroll_accum += scroll.delta;
        let factor = (1.0 + gesture.scroll_accum * config.scale_sensitivity).max(f32::EPSILON);
        transform.scale = gesture.initial_scale * factor;
    }
}
