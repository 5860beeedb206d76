//! Gameplay rules: fall detection, object removal and the win condition.

use bevy::prelude::*;

use crate::bevy::plugin::SessionMode;
use crate::bevy::{
    FallVolumeRes, GameWonEvent, HudStores, ObjectRemovedEvent, PlacedObject, PlacementLedger,
    VolumeEnteredEvent, WinTeardown,
};
use crate::config::SessionConfig;

/// System watching placed objects against the fall volume, once per fixed
/// tick. Entities inside the volume are reported through the same message an
/// external physics integration would write.
pub fn detect_fallen_objects(
    objects: Query<(Entity, &Transform), With<PlacedObject>>,
    volume: Res<FallVolumeRes>,
    mut entries: MessageWriter<VolumeEnteredEvent>,
) {
    let Some(volume) = volume.0 else {
        return;
    };
    for (entity, transform) in &objects {
        if volume.contains(transform.translation) {
            entries.write(VolumeEnteredEvent { entity });
        }
    }
}

/// System removing objects that entered the fall volume and declaring the
/// win once the ledger runs empty.
///
/// Removal goes through the ledger first, so duplicate reports for the same
/// entity are harmless.
pub fn handle_volume_entries(
    mut commands: Commands,
    mut entries: MessageReader<VolumeEnteredEvent>,
    mut ledger: ResMut<PlacementLedger>,
    mut teardown: ResMut<WinTeardown>,
    config: Res<SessionConfig>,
    mut removed_events: MessageWriter<ObjectRemovedEvent>,
    mut won_events: MessageWriter<GameWonEvent>,
    stores: Res<HudStores>,
    time: Res<Time>,
) {
    for entry in entries.read() {
        if !ledger.remove(entry.entity) {
            tracing::debug!("[game] fall report for untracked entity {}", entry.entity);
            continue;
        }
        commands.entity(entry.entity).despawn();

        let remaining = ledger.len();
        tracing::info!("[game] object {} fell, {remaining} remaining", entry.entity);
        removed_events.write(ObjectRemovedEvent {
            entity: entry.entity,
            remaining,
        });

        if remaining == 0 && !teardown.won {
            teardown.won = true;
            teardown.timer = Some(Timer::from_seconds(
                config.win_teardown_secs,
                TimerMode::Once,
            ));
            tracing::info!("[game] all objects down, session ends shortly");
            stores
                .status
                .push("You knocked down every object!", time.elapsed_secs_f64());
            won_events.write(GameWonEvent);
        }
    }
}

/// System counting down the post-win delay, then returning the session to
/// Idle.
pub fn tick_win_teardown(
    time: Res<Time>,
    mut teardown: ResMut<WinTeardown>,
    mut next_mode: ResMut<NextState<SessionMode>>,
) {
    let Some(timer) = teardown.timer.as_mut() else {
        return;
    };
    timer.tick(time.delta());
    if timer.just_finished() {
        tracing::info!("[game] win teardown elapsed, leaving gameplay");
        next_mode.set(SessionMode::Idle);
    }
}
