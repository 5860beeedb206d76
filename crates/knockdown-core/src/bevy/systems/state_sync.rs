//! Session state to HUD store synchronization.

use bevy::prelude::*;

use crate::bevy::plugin::SessionMode;
use crate::bevy::state_store::{HudPanel, SessionSummary};
use crate::bevy::{CloudAnchorBridge, HudStores, PlacementLedger, SessionScore, WinTeardown};

/// System publishing the current session summary to the HUD store.
///
/// Runs every frame; the store only bumps its version when the summary
/// actually changed, so pollers stay quiet on idle frames.
pub fn sync_session_to_stores(
    mode: Res<State<SessionMode>>,
    ledger: Res<PlacementLedger>,
    score: Res<SessionScore>,
    bridge: Res<CloudAnchorBridge>,
    teardown: Res<WinTeardown>,
    stores: Res<HudStores>,
) {
    let mode = *mode.get();
    // 게임플레이 중에만 Game 패널을 보여준다
    let panel = if mode == SessionMode::Gameplay {
        HudPanel::Game
    } else {
        HudPanel::Setup
    };

    stores.session.update(SessionSummary {
        mode,
        panel,
        placed_count: ledger.len(),
        score: score.object_hits,
        anchor_id: bridge.known_id.clone(),
        anchor_busy: bridge.busy(),
        won: teardown.won,
    });
}
