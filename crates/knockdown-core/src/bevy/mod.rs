//! Bevy integration for the knockdown session.
//!
//! Provides the session coordination plugin with its mode states, ECS
//! components and resources, message types for platform input and session
//! output, and the shared stores a host UI polls for HUD state.

pub mod components;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod state_store;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{KnockdownSessionPlugin, PlacementTarget, SessionMode};
pub use resources::*;
pub use state_store::{
    HudPanel, HudStores, SessionStore, SessionSummary, StatusLine, StatusStore,
};
