//! Knockdown Core Library
//!
//! Session coordination for an AR knockdown game: interaction modes,
//! surface-anchored object placement, cloud anchor hosting/resolving,
//! and the fall/win rules.
//!
//! The crate is platform-agnostic. AR tracking, rendering, and rigid-body
//! physics stay in the host application and talk to the session through
//! trait seams (`Raycaster`, `CloudAnchorApi`, `KeyValueStore`) and Bevy
//! messages; everything here runs headless.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod anchor;
pub mod config;
pub mod error;
pub mod store;
pub mod surface;

// Bevy integration
pub mod bevy;

pub use anchor::{
    CloudAnchorApi, HostOutcome, LAST_ANCHOR_KEY, LocalAnchor, ResolveOutcome, ResolvedAnchor,
    Ticket,
};
pub use config::{SessionConfig, TICK_DT, TICK_RATE_HZ};
pub use error::SessionError;
pub use store::{KeyValueStore, MemoryStore};
pub use surface::{FallVolume, Pose, Surface, SurfaceHit, SurfaceId};
