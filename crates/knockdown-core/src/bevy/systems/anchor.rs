//! Cloud anchor hosting and resolving.
//!
//! Requests go out through the [`crate::anchor::CloudAnchorApi`] seam and
//! come back as settled tickets. One poll system checks pending tickets
//! once per fixed tick, so completion never blocks a frame and never spins.

use bevy::prelude::*;

use crate::anchor::{HostOutcome, LAST_ANCHOR_KEY, ResolveOutcome};
use crate::bevy::{
    AnchorHostedEvent, AnchorResolvedEvent, AnchorServiceRes, CloudAnchorBridge, HostAnchorEvent,
    HudStores, LocalAnchorState, PersistenceRes, ResolveAnchorEvent, ResolvedAnchorMarker,
};
use crate::config::SessionConfig;
use crate::error::SessionError;

/// System to submit host requests for the current local anchor.
pub fn handle_host_requests(
    mut requests: MessageReader<HostAnchorEvent>,
    service: Res<AnchorServiceRes>,
    local_anchor: Res<LocalAnchorState>,
    mut bridge: ResMut<CloudAnchorBridge>,
    config: Res<SessionConfig>,
    stores: Res<HudStores>,
    time: Res<Time>,
) {
    for request in requests.read() {
        let Some(anchor) = local_anchor.anchor() else {
            let err = SessionError::Precondition("no local anchor to host".into());
            tracing::warn!("[anchor] {err}");
            stores
                .status
                .push("Place an anchor before hosting.", time.elapsed_secs_f64());
            continue;
        };
        if bridge.host_pending() {
            tracing::warn!("[anchor] host request ignored, one is already in flight");
            stores
                .status
                .push("Hosting already in progress.", time.elapsed_secs_f64());
            continue;
        }
        let Some(service) = service.get() else {
            tracing::error!("[anchor] {}", SessionError::MissingCollaborator("CloudAnchorApi"));
            continue;
        };

        let ttl_days = request.ttl_days.unwrap_or(config.anchor_ttl_days);
        let ticket = service.host_anchor(anchor, ttl_days);
        bridge.begin_host(ticket, config.anchor_timeout_secs);

        tracing::info!("[anchor] hosting cloud anchor, ttl {ttl_days} days");
        stores
            .status
            .push("Hosting cloud anchor...", time.elapsed_secs_f64());
    }
}

/// System to submit resolve requests for the known anchor id.
///
/// A missing id fails before the service is looked at, so restarts with no
/// persisted anchor never touch the network.
pub fn handle_resolve_requests(
    mut requests: MessageReader<ResolveAnchorEvent>,
    service: Res<AnchorServiceRes>,
    mut bridge: ResMut<CloudAnchorBridge>,
    config: Res<SessionConfig>,
    stores: Res<HudStores>,
    time: Res<Time>,
) {
    for _request in requests.read() {
        let anchor_id = match bridge.resolvable_id() {
            Ok(id) => id.to_owned(),
            Err(err) => {
                tracing::warn!("[anchor] {err}");
                stores
                    .status
                    .push("No cloud anchor id to resolve.", time.elapsed_secs_f64());
                continue;
            }
        };
        if bridge.resolve_pending() {
            tracing::warn!("[anchor] resolve request ignored, one is already in flight");
            stores
                .status
                .push("Resolving already in progress.", time.elapsed_secs_f64());
            continue;
        }
        let Some(service) = service.get() else {
            tracing::error!("[anchor] {}", SessionError::MissingCollaborator("CloudAnchorApi"));
            continue;
        };

        let ticket = service.resolve_anchor(&anchor_id);
        bridge.begin_resolve(ticket, config.anchor_timeout_secs);

        tracing::info!("[anchor] resolving cloud anchor {anchor_id}");
        stores
            .status
            .push("Resolving cloud anchor...", time.elapsed_secs_f64());
    }
}

/// System polling pending anchor operations, once per fixed tick.
#[allow(clippy::too_many_arguments)]
pub fn poll_anchor_operations(
    mut commands: Commands,
    time: Res<Time>,
    mut bridge: ResMut<CloudAnchorBridge>,
    persistence: Res<PersistenceRes>,
    mut hosted_events: MessageWriter<AnchorHostedEvent>,
    mut resolved_events: MessageWriter<AnchorResolvedEvent>,
    stores: Res<HudStores>,
) {
    let now = time.elapsed_secs_f64();

    if let Some(mut op) = bridge.take_host() {
        op.timeout.tick(time.delta());
        match op.ticket.try_take() {
            Some(HostOutcome::Success { anchor_id }) => {
                persistence.0.set(LAST_ANCHOR_KEY, &anchor_id);
                bridge.known_id = Some(anchor_id.clone());
                tracing::info!("[anchor] hosted as {anchor_id}");
                stores
                    .status
                    .push(format!("Cloud anchor hosted: {anchor_id}"), now);
                hosted_events.write(AnchorHostedEvent { anchor_id });
            }
            Some(HostOutcome::Failure { reason }) => {
                let err = SessionError::Service { reason };
                tracing::error!("[anchor] hosting failed: {err}");
                stores.status.push(format!("Hosting failed: {err}"), now);
            }
            None if op.timeout.is_finished() => {
                let err = SessionError::Timeout {
                    operation: "host",
                    seconds: op.timeout.duration().as_secs_f32(),
                };
                tracing::error!("[anchor] {err}");
                stores.status.push(err.to_string(), now);
            }
            None => bridge.restore_host(op),
        }
    }

    if let Some(mut op) = bridge.take_resolve() {
        op.timeout.tick(time.delta());
        match op.ticket.try_take() {
            Some(ResolveOutcome::Success { anchor }) => {
                commands.spawn((
                    ResolvedAnchorMarker,
                    Transform::from_translation(anchor.pose.position)
                        .with_rotation(anchor.pose.rotation),
                ));
                tracing::info!("[anchor] resolved at {}", anchor.pose.position);
                stores.status.push("Cloud anchor resolved.", now);
                resolved_events.write(AnchorResolvedEvent { anchor });
            }
            Some(ResolveOutcome::Failure { reason }) => {
                let err = SessionError::Service { reason };
                tracing::error!("[anchor] resolving failed: {err}");
                stores.status.push(format!("Resolving failed: {err}"), now);
            }
            None if op.timeout.is_finished() => {
                let err = SessionError::Timeout {
                    operation: "resolve",
                    seconds: op.timeout.duration().as_secs_f32(),
                };
                tracing::error!("[anchor] {err}");
                stores.status.push(err.to_string(), now);
            }
            None => bridge.restore_resolve(op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::SessionCommand;
    use crate::bevy::plugin::PlacementTarget;
    use crate::bevy::test_utils::{AnchorScript, TestApp};
    use crate::store::KeyValueStore;

    fn place_anchor(app: &mut TestApp) {
        app.enter_placement_with_surface(Vec3::ZERO);
        app.run_command(SessionCommand::SetPlacementTarget {
            target: PlacementTarget::Anchor,
        });
        app.tap(Vec2::ZERO);
    }

    #[test]
    fn test_host_success_persists_anchor_id() {
        let mut app = TestApp::new();
        place_anchor(&mut app);
        app.anchors.script_host(AnchorScript::Succeed);

        app.run_command(SessionCommand::HostAnchor { ttl_days: None });
        assert!(app.world().resource::<CloudAnchorBridge>().host_pending());
        app.advance_ticks(1);

        let bridge = app.world().resource::<CloudAnchorBridge>();
        assert!(!bridge.host_pending());
        let known = bridge.known_id.clone().expect("known id");
        assert_eq!(app.persistence.get(LAST_ANCHOR_KEY), Some(known));
        assert_eq!(app.anchors.host_calls(), 1);
    }

    #[test]
    fn test_host_failure_persists_nothing() {
        let mut app = TestApp::new();
        place_anchor(&mut app);
        app.anchors
            .script_host(AnchorScript::Fail("quota exhausted".into()));

        app.run_command(SessionCommand::HostAnchor { ttl_days: None });
        app.advance_ticks(1);

        let bridge = app.world().resource::<CloudAnchorBridge>();
        assert!(!bridge.host_pending());
        assert!(bridge.known_id.is_none());
        assert_eq!(app.persistence.get(LAST_ANCHOR_KEY), None);
    }

    #[test]
    fn test_host_without_local_anchor_is_rejected() {
        let mut app = TestApp::new();
        app.run_command(SessionCommand::EnterPlacementMode);

        app.run_command(SessionCommand::HostAnchor { ttl_days: None });

        assert!(!app.world().resource::<CloudAnchorBridge>().host_pending());
        assert_eq!(app.anchors.host_calls(), 0);
    }

    #[test]
    fn test_second_host_while_pending_is_rejected() {
        let mut app = TestApp::new();
        place_anchor(&mut app);
        app.anchors.script_host(AnchorScript::Pend);

        app.run_command(SessionCommand::HostAnchor { ttl_days: None });
        app.run_command(SessionCommand::HostAnchor { ttl_days: None });

        assert_eq!(app.anchors.host_calls(), 1);
        assert!(app.world().resource::<CloudAnchorBridge>().host_pending());
    }

    #[test]
    fn test_pending_host_times_out() {
        let mut app = TestApp::new();
        place_anchor(&mut app);
        app.anchors.script_host(AnchorScript::Pend);

        app.run_command(SessionCommand::HostAnchor { ttl_days: None });
        // Default timeout is 30 s of fixed ticks
        app.advance_ticks(30 * 60 + 1);

        let bridge = app.world().resource::<CloudAnchorBridge>();
        assert!(!bridge.host_pending());
        assert!(bridge.known_id.is_none());
    }

    #[test]
    fn test_resolve_without_known_id_never_contacts_service() {
        let mut app = TestApp::new();
        app.run_command(SessionCommand::ResolveAnchor);
        app.advance_ticks(1);

        assert_eq!(app.anchors.resolve_calls(), 0);
        assert!(!app.world().resource::<CloudAnchorBridge>().resolve_pending());
    }

    #[test]
    fn test_resolve_spawns_marker_at_resolved_pose() {
        let mut app = TestApp::new();
        app.world_mut().resource_mut::<CloudAnchorBridge>().known_id =
            Some("ua-test".into());
        app.anchors.script_resolve(AnchorScript::Succeed);
        app.anchors
            .set_resolve_position(Vec3::new(1.0, 2.0, 3.0));

        app.run_command(SessionCommand::ResolveAnchor);
        app.advance_ticks(1);
        app.update();

        assert_eq!(app.anchors.resolve_calls(), 1);
        let (count, position) = {
            let mut query = app
                .world_mut()
                .query_filtered::<&Transform, With<ResolvedAnchorMarker>>();
            let transforms: Vec<_> = query.iter(app.world()).collect();
            (
                transforms.len(),
                transforms.first().map(|t| t.translation),
            )
        };
        assert_eq!(count, 1);
        assert_eq!(position, Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_hosted_id_resolvable_in_fresh_session() {
        let mut app = TestApp::new();
        place_anchor(&mut app);
        app.anchors.script_host(AnchorScript::Succeed);
        app.run_command(SessionCommand::HostAnchor { ttl_days: None });
        app.advance_ticks(1);
        let hosted = app
            .world()
            .resource::<CloudAnchorBridge>()
            .known_id
            .clone()
            .expect("hosted id");

        // Fresh app over the same store picks the id up at startup
        let mut restarted = TestApp::with_persistence(app.persistence.clone());
        restarted.anchors.script_resolve(AnchorScript::Succeed);
        restarted.run_command(SessionCommand::ResolveAnchor);
        restarted.advance_ticks(1);

        assert_eq!(restarted.anchors.resolve_calls(), 1);
        assert_eq!(restarted.anchors.last_resolved_id(), Some(hosted));
    }
}
