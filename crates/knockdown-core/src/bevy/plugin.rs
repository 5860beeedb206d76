//! Bevy plugin for the knockdown session.
//!
//! Provides:
//! - `SessionMode` / `PlacementTarget`: interaction mode states
//! - `KnockdownSessionPlugin`: logic-only plugin; rendering, input capture
//!   and physics integration stay in the host shell behind the collaborator
//!   seams

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::anchor::{CloudAnchorApi, LAST_ANCHOR_KEY};
use crate::bevy::events::*;
use crate::bevy::resources::*;
use crate::bevy::state_store::HudStores;
use crate::bevy::systems;
use crate::config::{SessionConfig, TICK_DT};
use crate::error::SessionError;
use crate::store::KeyValueStore;

/// Interaction mode of the session.
///
/// Transitions are driven exclusively by [`SessionCommand`]s; systems gate
/// themselves with `run_if(in_state(..))` instead of checking flags.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionMode {
    /// No session running; nothing tracked, nothing placed.
    #[default]
    Idle,
    /// Surface detection on, taps place objects or the local anchor.
    Placement,
    /// Taps select, pinch/scroll scale the selection.
    Scaling,
    /// Physics live, throws and falls active, detection frozen.
    Gameplay,
}

/// What a placement tap places (SubState of `SessionMode::Placement`).
///
/// Only exists while the session is in Placement. Automatically removed
/// when the mode transitions away, so the target always resets to Object.
#[derive(SubStates, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[source(SessionMode = SessionMode::Placement)]
pub enum PlacementTarget {
    #[default]
    Object,
    Anchor,
}

// ============================================================================
// Session Plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// Session coordination plugin.
///
/// Runs on `MinimalPlugins` plus `StatesPlugin`; everything platform-bound
/// (AR raycasts, the cloud anchor service, durable storage) arrives through
/// the optional collaborator fields. Unwired collaborators are reported at
/// startup and the operations needing them degrade to logged no-ops.
pub struct KnockdownSessionPlugin {
    pub config: SessionConfig,
    pub command_queue: Option<CommandQueue>,
    pub hud_stores: Option<HudStores>,
    pub raycaster: Option<Arc<dyn Raycaster>>,
    pub anchor_service: Option<Arc<dyn CloudAnchorApi>>,
    pub persistence: Option<Arc<dyn KeyValueStore>>,
}

impl Default for KnockdownSessionPlugin {
    fn default() -> Self {
        Self {
            config: SessionConfig::default(),
            command_queue: None,
            hud_stores: None,
            raycaster: None,
            anchor_service: None,
            persistence: None,
        }
    }
}

impl KnockdownSessionPlugin {
    pub fn new(command_queue: CommandQueue, hud_stores: HudStores) -> Self {
        Self {
            command_queue: Some(command_queue),
            hud_stores: Some(hud_stores),
            ..Self::default()
        }
    }
}

impl Plugin for KnockdownSessionPlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // States
        // ====================================================================
        app.init_state::<SessionMode>();
        app.add_sub_state::<PlacementTarget>();

        // ====================================================================
        // Fixed tick (timers, fall detection, anchor polling)
        // ====================================================================
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(TICK_DT)));

        // ====================================================================
        // Resources (all registered upfront, systems gated by run_if)
        // ====================================================================

        // Core resources
        app.insert_resource(self.config.clone())
            .insert_resource(SurfaceRegistry::default())
            .insert_resource(PlacementLedger::default())
            .insert_resource(ScaleGesture::default())
            .insert_resource(SessionScore::default())
            .insert_resource(FallVolumeRes::default())
            .insert_resource(WinTeardown::default())
            .insert_resource(CameraPose::default())
            .insert_resource(LocalAnchorState::default())
            .insert_resource(CloudAnchorBridge::default())
            .insert_resource(self.command_queue.clone().unwrap_or_default())
            .insert_resource(self.hud_stores.clone().unwrap_or_default());

        // Collaborator seams (host-provided; None degrades to no-ops)
        app.insert_resource(RaycasterRes(self.raycaster.clone()))
            .insert_resource(AnchorServiceRes(self.anchor_service.clone()));
        match &self.persistence {
            Some(store) => app.insert_resource(PersistenceRes(Arc::clone(store))),
            None => app.insert_resource(PersistenceRes::default()),
        };

        // ====================================================================
        // Messages (all registered upfront)
        // ====================================================================

        // Platform input messages
        app.add_message::<TapEvent>()
            .add_message::<PinchEvent>()
            .add_message::<ScrollEvent>()
            .add_message::<SurfaceUpdateEvent>()
            .add_message::<VolumeEnteredEvent>()
            .add_message::<ProjectileContactEvent>();

        // Internal request messages
        app.add_message::<HostAnchorEvent>()
            .add_message::<ResolveAnchorEvent>()
            .add_message::<ThrowRequestedEvent>();

        // Session output messages
        app.add_message::<ObjectPlacedEvent>()
            .add_message::<ObjectRemovedEvent>()
            .add_message::<GameWonEvent>()
            .add_message::<AnchorHostedEvent>()
            .add_message::<AnchorResolvedEvent>();

        // ====================================================================
        // Startup
        // ====================================================================
        app.add_systems(Startup, (load_persisted_anchor, report_missing_collaborators));

        // ====================================================================
        // Command processing and always-active handlers
        // ====================================================================
        app.add_systems(
            Update,
            (
                systems::process_commands,
                systems::apply_surface_updates,
                systems::handle_placement_taps.run_if(in_state(PlacementTarget::Object)),
                systems::handle_anchor_taps.run_if(in_state(PlacementTarget::Anchor)),
                systems::handle_host_requests,
                systems::handle_resolve_requests,
            )
                .chain(),
        );

        // ====================================================================
        // Scale interactions (Scaling only)
        // ====================================================================
        app.add_systems(
            Update,
            (
                systems::handle_scale_selection,
                systems::handle_pinch_gestures,
                systems::handle_scroll_scaling,
            )
                .chain()
                .after(systems::process_commands)
                .run_if(in_state(SessionMode::Scaling)),
        );

        // ====================================================================
        // Throws and scoring (Gameplay only)
        // ====================================================================
        app.add_systems(
            Update,
            (systems::handle_throw_requests, systems::record_projectile_hits)
                .chain()
                .after(systems::process_commands)
                .run_if(in_state(SessionMode::Gameplay)),
        );

        // ====================================================================
        // Fixed-tick systems
        // ====================================================================

        // Anchor ticket polling (always active, one check per tick)
        app.add_systems(FixedUpdate, systems::poll_anchor_operations);

        // Fall detection, removal and win teardown (Gameplay only)
        app.add_systems(
            FixedUpdate,
            (
                systems::detect_fallen_objects,
                systems::handle_volume_entries,
                systems::tick_win_teardown,
            )
                .chain()
                .run_if(in_state(SessionMode::Gameplay)),
        );

        // ====================================================================
        // State sync (always active)
        // ====================================================================
        app.add_systems(PostUpdate, systems::sync_session_to_stores);

        // ====================================================================
        // Mode transition systems
        // ====================================================================
        app.add_systems(OnEnter(SessionMode::Placement), systems::on_enter_placement);
        app.add_systems(OnEnter(SessionMode::Scaling), systems::on_enter_scaling);
        app.add_systems(OnExit(SessionMode::Scaling), systems::on_exit_scaling);
        app.add_systems(OnEnter(SessionMode::Gameplay), systems::on_enter_gameplay);
        app.add_systems(OnExit(SessionMode::Gameplay), systems::on_exit_gameplay);
        app.add_systems(OnEnter(SessionMode::Idle), systems::on_enter_idle);
    }
}

/// Seeds the anchor bridge with a previously persisted cloud anchor id.
fn load_persisted_anchor(
    persistence: Res<PersistenceRes>,
    mut bridge: ResMut<CloudAnchorBridge>,
) {
    if let Some(id) = persistence.0.get(LAST_ANCHOR_KEY) {
        tracing::info!("[session] loaded persisted cloud anchor id {id}");
        bridge.known_id = Some(id);
    }
}

/// Reports collaborator seams left unwired. The session still runs; the
/// operations needing them become logged no-ops.
fn report_missing_collaborators(raycaster: Res<RaycasterRes>, service: Res<AnchorServiceRes>) {
    if raycaster.0.is_none() {
        tracing::warn!("[session] {}", SessionError::MissingCollaborator("Raycaster"));
    }
    if service.0.is_none() {
        tracing::warn!("[session] {}", SessionError::MissingCollaborator("CloudAnchorApi"));
    }
}
