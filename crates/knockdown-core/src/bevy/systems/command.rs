//! Command processing system.
//!
//! Drains the host-UI command queue and guards every mode transition
//! before it is queued.

use bevy::prelude::*;

use crate::bevy::plugin::{PlacementTarget, SessionMode};
use crate::bevy::{
    CommandQueue, HostAnchorEvent, HudStores, PlacementLedger, ResolveAnchorEvent, SessionCommand,
    ThrowRequestedEvent,
};

/// System to process all commands from the external command queue.
///
/// Transition rules enforced here: placement and scaling are unreachable
/// while a game runs, starting requires at least one placed object, and a
/// transition command that lands while another transition is already
/// queued this frame is dropped instead of stacking.
#[allow(clippy::too_many_arguments)]
pub fn process_commands(
    command_queue: Res<CommandQueue>,
    mode: Res<State<SessionMode>>,
    mut next_mode: ResMut<NextState<SessionMode>>,
    mut next_target: ResMut<NextState<PlacementTarget>>,
    ledger: Res<PlacementLedger>,
    stores: Res<HudStores>,
    time: Res<Time>,
    mut host_events: MessageWriter<HostAnchorEvent>,
    mut resolve_events: MessageWriter<ResolveAnchorEvent>,
    mut throw_events: MessageWriter<ThrowRequestedEvent>,
) {
    for command in command_queue.drain() {
        match command {
            SessionCommand::EnterPlacementMode => {
                tracing::info!("[command] EnterPlacementMode");
                if *mode.get() == SessionMode::Gameplay {
                    tracing::warn!("[command] placement unavailable during gameplay");
                    continue;
                }
                if transition_queued(&next_mode) {
                    tracing::warn!("[command] transition already queued, dropping");
                    continue;
                }
                if *mode.get() != SessionMode::Placement {
                    next_mode.set(SessionMode::Placement);
                }
            }
            SessionCommand::EnterScalingMode => {
                tracing::info!("[command] EnterScalingMode");
                if *mode.get() == SessionMode::Gameplay {
                    tracing::warn!("[command] scaling unavailable during gameplay");
                    continue;
                }
                if transition_queued(&next_mode) {
                    tracing::warn!("[command] transition already queued, dropping");
                    continue;
                }
                if *mode.get() != SessionMode::Scaling {
                    next_mode.set(SessionMode::Scaling);
                }
            }
            SessionCommand::StartGame => {
                tracing::info!("[command] StartGame ({} objects placed)", ledger.len());
                if *mode.get() == SessionMode::Gameplay {
                    tracing::warn!("[command] game already running");
                    continue;
                }
                if transition_queued(&next_mode) {
                    tracing::warn!("[command] transition already queued, dropping");
                    continue;
                }
                if ledger.is_empty() {
                    tracing::warn!("[command] cannot start the game with 0 placed objects");
                    stores.status.push(
                        "Cannot start the game with 0 placed objects.",
                        time.elapsed_secs_f64(),
                    );
                    continue;
                }
                next_mode.set(SessionMode::Gameplay);
            }
            SessionCommand::EndGame => {
                tracing::info!("[command] EndGame");
                if *mode.get() != SessionMode::Gameplay {
                    tracing::warn!("[command] no game in progress");
                    continue;
                }
                if transition_queued(&next_mode) {
                    tracing::warn!("[command] transition already queued, dropping");
                    continue;
                }
                next_mode.set(SessionMode::Idle);
            }
            SessionCommand::SetPlacementTarget { target } => {
                tracing::info!("[command] SetPlacementTarget: {:?}", target);
                if *mode.get() != SessionMode::Placement {
                    tracing::warn!("[command] placement target only selectable in placement mode");
                    continue;
                }
                next_target.set(target);
            }
            SessionCommand::HostAnchor { ttl_days } => {
                tracing::info!("[command] HostAnchor (ttl_days={:?})", ttl_days);
                host_events.write(HostAnchorEvent { ttl_days });
            }
            SessionCommand::ResolveAnchor => {
                tracing::info!("[command] ResolveAnchor");
                resolve_events.write(ResolveAnchorEvent);
            }
            SessionCommand::ThrowProjectile => {
                if *mode.get() != SessionMode::Gameplay {
                    tracing::warn!("[command] throw ignored outside gameplay");
                    continue;
                }
                throw_events.write(ThrowRequestedEvent);
            }
        }
    }
}

/// A transition set earlier this frame has not been applied yet.
fn transition_queued(next: &NextState<SessionMode>) -> bool {
    matches!(next, NextState::Pending(_))
}
