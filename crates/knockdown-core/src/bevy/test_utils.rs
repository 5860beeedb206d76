//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `KnockdownSessionPlugin` with scripted collaborator
//! fakes, for testing session logic without a platform backend.

use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::anchor::{
    CloudAnchorApi, HostOutcome, LocalAnchor, ResolveOutcome, ResolvedAnchor, Ticket,
};
use crate::bevy::plugin::{KnockdownSessionPlugin, PlacementTarget, SessionMode};
use crate::bevy::resources::{CommandQueue, Raycaster, SessionCommand};
use crate::bevy::state_store::HudStores;
use crate::bevy::{PlacementLedger, SurfaceUpdateEvent, TapEvent};
use crate::config::{SessionConfig, TICK_DT};
use crate::store::{KeyValueStore, MemoryStore};
use crate::surface::{Pose, Surface, SurfaceHit, SurfaceId};

/// Raycaster fake returning whatever the test scripted.
///
/// Screen coordinates are ignored; tests control outcomes, not geometry.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRaycaster {
    hits: Mutex<Vec<SurfaceHit>>,
    object: Mutex<Option<Entity>>,
}

impl ScriptedRaycaster {
    pub fn set_hits(&self, hits: Vec<SurfaceHit>) {
        *self.hits.lock() = hits;
    }

    pub fn hits(&self) -> Vec<SurfaceHit> {
        self.hits.lock().clone()
    }

    pub fn set_object(&self, object: Option<Entity>) {
        *self.object.lock() = object;
    }
}

impl Raycaster for ScriptedRaycaster {
    fn surface_hits(&self, _screen: Vec2) -> Vec<SurfaceHit> {
        self.hits.lock().clone()
    }

    fn pick_object(&self, _screen: Vec2) -> Option<Entity> {
        *self.object.lock()
    }
}

/// How the scripted anchor service settles the next ticket.
#[derive(Debug, Clone)]
pub(crate) enum AnchorScript {
    /// Settle successfully at call time.
    Succeed,
    /// Settle as failed at call time.
    Fail(String),
    /// Never settle; the ticket stays pending until the bridge times out.
    Pend,
}

/// Cloud anchor service fake with per-operation scripts and call counters.
pub(crate) struct ScriptedAnchorService {
    host_script: Mutex<AnchorScript>,
    resolve_script: Mutex<AnchorScript>,
    resolve_position: Mutex<Vec3>,
    host_calls: Mutex<usize>,
    resolve_calls: Mutex<usize>,
    next_host_id: Mutex<u32>,
    last_resolved_id: Mutex<Option<String>>,
}

impl Default for ScriptedAnchorService {
    fn default() -> Self {
        Self {
            host_script: Mutex::new(AnchorScript::Succeed),
            resolve_script: Mutex::new(AnchorScript::Succeed),
            resolve_position: Mutex::new(Vec3::ZERO),
            host_calls: Mutex::new(0),
            resolve_calls: Mutex::new(0),
            next_host_id: Mutex::new(0),
            last_resolved_id: Mutex::new(None),
        }
    }
}

impl ScriptedAnchorService {
    pub fn script_host(&self, script: AnchorScript) {
        *self.host_script.lock() = script;
    }

    pub fn script_resolve(&self, script: AnchorScript) {
        *self.resolve_script.lock() = script;
    }

    pub fn set_resolve_position(&self, position: Vec3) {
        *self.resolve_position.lock() = position;
    }

    pub fn host_calls(&self) -> usize {
        *self.host_calls.lock()
    }

    pub fn resolve_calls(&self) -> usize {
        *self.resolve_calls.lock()
    }

    pub fn last_resolved_id(&self) -> Option<String> {
        self.last_resolved_id.lock().clone()
    }
}

impl CloudAnchorApi for ScriptedAnchorService {
    fn host_anchor(&self, _anchor: &LocalAnchor, _ttl_days: u32) -> Ticket<HostOutcome> {
        *self.host_calls.lock() += 1;
        let ticket = Ticket::new();
        match &*self.host_script.lock() {
            AnchorScript::Succeed => {
                let id = {
                    let mut next = self.next_host_id.lock();
                    *next += 1;
                    format!("hosted-{}", *next)
                };
                ticket.settle(HostOutcome::Success { anchor_id: id });
            }
            AnchorScript::Fail(reason) => ticket.settle(HostOutcome::Failure {
                reason: reason.clone(),
            }),
            AnchorScript::Pend => {}
        }
        ticket
    }

    fn resolve_anchor(&self, anchor_id: &str) -> Ticket<ResolveOutcome> {
        *self.resolve_calls.lock() += 1;
        *self.last_resolved_id.lock() = Some(anchor_id.to_owned());
        let ticket = Ticket::new();
        match &*self.resolve_script.lock() {
            AnchorScript::Succeed => ticket.settle(ResolveOutcome::Success {
                anchor: ResolvedAnchor {
                    pose: Pose::from_position(*self.resolve_position.lock()),
                },
            }),
            AnchorScript::Fail(reason) => ticket.settle(ResolveOutcome::Failure {
                reason: reason.clone(),
            }),
            AnchorScript::Pend => {}
        }
        ticket
    }
}

/// A headless Bevy app wrapper for testing.
///
/// Wires the session plugin to scripted fakes and keeps handles to them so
/// tests can steer raycasts and anchor outcomes, and inspect persistence.
pub(crate) struct TestApp {
    pub app: App,
    pub queue: CommandQueue,
    pub stores: HudStores,
    pub raycaster: Arc<ScriptedRaycaster>,
    pub anchors: Arc<ScriptedAnchorService>,
    pub persistence: Arc<MemoryStore>,
}

impl TestApp {
    /// Create a fully wired test app with a fresh persistence store.
    pub fn new() -> Self {
        Self::with_persistence(Arc::new(MemoryStore::new()))
    }

    /// Create a fully wired test app over an existing persistence store,
    /// as a host restarting the session would.
    pub fn with_persistence(persistence: Arc<MemoryStore>) -> Self {
        let queue = CommandQueue::default();
        let stores = HudStores::new();
        let raycaster = Arc::new(ScriptedRaycaster::default());
        let anchors = Arc::new(ScriptedAnchorService::default());

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(KnockdownSessionPlugin {
            config: SessionConfig::default(),
            command_queue: Some(queue.clone()),
            hud_stores: Some(stores.clone()),
            raycaster: Some(Arc::clone(&raycaster) as Arc<dyn Raycaster>),
            anchor_service: Some(Arc::clone(&anchors) as Arc<dyn CloudAnchorApi>),
            persistence: Some(Arc::clone(&persistence) as Arc<dyn KeyValueStore>),
        });
        Self::finish(app, queue, stores, raycaster, anchors, persistence)
    }

    /// Create a test app with no collaborators wired, for exercising the
    /// degraded no-op paths.
    pub fn bare() -> Self {
        let queue = CommandQueue::default();
        let stores = HudStores::new();
        let raycaster = Arc::new(ScriptedRaycaster::default());
        let anchors = Arc::new(ScriptedAnchorService::default());
        let persistence = Arc::new(MemoryStore::new());

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(KnockdownSessionPlugin {
            command_queue: Some(queue.clone()),
            hud_stores: Some(stores.clone()),
            ..KnockdownSessionPlugin::default()
        });
        Self::finish(app, queue, stores, raycaster, anchors, persistence)
    }

    fn finish(
        mut app: App,
        queue: CommandQueue,
        stores: HudStores,
        raycaster: Arc<ScriptedRaycaster>,
        anchors: Arc<ScriptedAnchorService>,
        persistence: Arc<MemoryStore>,
    ) -> Self {
        // Pause virtual time so that only explicit tick stepping advances
        // timers.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        // Run one update to initialize all resources and state
        app.update();
        Self {
            app,
            queue,
            stores,
            raycaster,
            anchors,
            persistence,
        }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Push a command to the command queue without running a frame.
    pub fn push_command(&self, command: SessionCommand) {
        self.queue.push(command);
    }

    /// Push a command and run two updates: one to process it, one to apply
    /// the resulting state transition and its OnEnter systems.
    pub fn run_command(&mut self, command: SessionCommand) {
        self.push_command(command);
        self.update();
        // Extra update to process OnEnter systems
        self.update();
    }

    /// Advance session logic by exactly `n` fixed ticks.
    ///
    /// Uses `Time<Fixed>::accumulate_overstep` to feed time directly into
    /// the fixed-timestep accumulator, bypassing virtual time. Combined
    /// with paused virtual time this gives fully deterministic timers.
    pub fn advance_ticks(&mut self, n: u32) {
        let dt = std::time::Duration::from_secs_f32(TICK_DT);
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    /// Current session mode.
    pub fn mode(&self) -> SessionMode {
        *self.app.world().resource::<State<SessionMode>>().get()
    }

    /// Current placement target, `None` outside Placement mode.
    pub fn placement_target(&self) -> Option<PlacementTarget> {
        self.app
            .world()
            .get_resource::<State<PlacementTarget>>()
            .map(|state| *state.get())
    }

    /// Write a message into the world and leave it for the next update.
    pub fn send_message<M: Message>(&mut self, message: M) {
        self.app.world_mut().write_message(message);
    }

    /// Deliver one added surface through a detection batch.
    pub fn send_surface_added(&mut self, surface: Surface) {
        self.send_message(SurfaceUpdateEvent {
            added: vec![surface],
            ..SurfaceUpdateEvent::default()
        });
        self.update();
    }

    /// Send a tap and run a frame to process it.
    pub fn tap(&mut self, screen: Vec2) {
        self.send_message(TapEvent { screen });
        self.update();
    }

    /// Enter Placement mode with one tracked 2 m square surface at
    /// `position`, raycaster scripted to hit its center. Returns the id.
    pub fn enter_placement_with_surface(&mut self, position: Vec3) -> SurfaceId {
        self.run_command(SessionCommand::EnterPlacementMode);
        let id = SurfaceId::new();
        let pose = Pose::from_position(position);
        self.send_surface_added(Surface::rect(id, pose, Vec2::splat(1.0)));
        self.raycaster.set_hits(vec![SurfaceHit { surface: id, pose }]);
        id
    }

    /// Shortest path to one placed object: Placement mode, a surface at
    /// the origin, one tap. Returns the placed entity.
    pub fn place_default_object(&mut self) -> Entity {
        self.enter_placement_with_surface(Vec3::ZERO);
        self.tap(Vec2::ZERO);
        let ledger = self.app.world().resource::<PlacementLedger>();
        ledger.entries().last().expect("object placed").entity
    }

    /// Get a reference to the World.
    pub fn world(&self) -> &World {
        self.app.world()
    }

    /// Get a mutable reference to the World.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
