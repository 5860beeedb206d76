//! Cloud anchor contract between the session and the platform.
//!
//! Hosting and resolving are long-running platform operations. The session
//! never blocks on them: each call returns a [`Ticket`] that the platform
//! adapter settles from its own completion callback, and the session polls
//! once per fixed tick until the ticket settles or the timeout expires.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SessionError;
use crate::surface::{Pose, SurfaceId};

/// Persistence key for the most recently hosted cloud anchor id.
pub const LAST_ANCHOR_KEY: &str = "LastCloudAnchorID";

/// A device-local anchor eligible for hosting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalAnchor {
    pub pose: Pose,
    pub surface: SurfaceId,
}

/// Pose recovered by resolving a previously hosted anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAnchor {
    pub pose: Pose,
}

/// Terminal state of a hosting operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    Success { anchor_id: String },
    Failure { reason: String },
}

/// Terminal state of a resolving operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    Success { anchor: ResolvedAnchor },
    Failure { reason: String },
}

/// Settle-once completion slot shared across the platform boundary.
///
/// The platform adapter keeps one clone and calls [`Ticket::settle`] from
/// its completion callback; the session keeps the other and drains it with
/// [`Ticket::try_take`] on its fixed tick. An unsettled ticket means the
/// operation is still pending.
#[derive(Debug, Clone)]
pub struct Ticket<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Ticket<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Stores the outcome. Later settles overwrite an unclaimed value;
    /// adapters are expected to settle exactly once.
    pub fn settle(&self, value: T) {
        *self.slot.lock() = Some(value);
    }

    /// Takes the outcome if the ticket has settled.
    pub fn try_take(&self) -> Option<T> {
        self.slot.lock().take()
    }
}

impl<T> Default for Ticket<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform cloud anchor service.
pub trait CloudAnchorApi: Send + Sync {
    /// Starts hosting `anchor` with the requested lifetime.
    fn host_anchor(&self, anchor: &LocalAnchor, ttl_days: u32) -> Ticket<HostOutcome>;

    /// Starts resolving a previously hosted anchor by id.
    fn resolve_anchor(&self, anchor_id: &str) -> Ticket<ResolveOutcome>;
}

/// Checks that a stored anchor id is usable for resolving.
///
/// Fails without touching the service; a session that never hosted (and
/// never loaded a persisted id) has nothing to resolve.
pub fn validate_anchor_id(id: Option<&str>) -> Result<&str, SessionError> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(SessionError::Precondition(
            "no cloud anchor id to resolve".into(),
        )),
    }
}
