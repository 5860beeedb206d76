//! Systems for the knockdown session.
//!
//! Organized by functionality:
//! - command: Command queue processing from the host shell
//! - mode: Mode enter/exit transitions (tracking flags, spawns, cleanup)
//! - surfaces: Surface registry updates from platform detection
//! - placement: Object and local-anchor placement from taps
//! - scaling: Scale-mode selection and pinch/scroll gestures
//! - anchor: Cloud anchor hosting, resolving and ticket polling
//! - game_rules: Fall detection, removal, win condition and teardown
//! - projectile: Throw handling and hit scoring
//! - state_sync: Sync ECS state to shared stores for UI

pub mod anchor;
pub mod command;
pub mod game_rules;
pub mod mode;
pub mod placement;
pub mod projectile;
pub mod scaling;
pub mod state_sync;
pub mod surfaces;

pub use anchor::*;
pub use command::*;
pub use game_rules::*;
pub use mode::*;
pub use placement::*;
pub use projectile::*;
pub use scaling::*;
pub use state_sync::*;
pub use surfaces::*;
