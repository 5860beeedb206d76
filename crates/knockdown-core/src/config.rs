//! Session configuration and fixed-tick constants.

use bevy::prelude::{Resource, Vec3};
use serde::{Deserialize, Serialize};

/// Fixed tick rate for session logic (Hz).
pub const TICK_RATE_HZ: f64 = 60.0;

/// Fixed timestep driving timers, fall detection, and anchor polling.
pub const TICK_DT: f32 = 1.0 / 60.0;

/// Tunable session parameters.
///
/// Every field has a serde default so partial JSON overrides work:
/// `SessionConfig::from_json(r#"{"throw_force": 14.0}"#)` keeps the rest
/// at their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Launch speed for thrown projectiles, in m/s along the camera forward.
    #[serde(default = "default_throw_force")]
    pub throw_force: f32,
    /// Scroll-wheel scaling factor per notch: `1.0 + delta * sensitivity`.
    #[serde(default = "default_scale_sensitivity")]
    pub scale_sensitivity: f32,
    /// Vertical gap between the lowest tracked surface and the top of the
    /// fall volume, in meters.
    #[serde(default = "default_fall_margin")]
    pub fall_margin: f32,
    /// Vertical thickness of the fall volume, in meters.
    #[serde(default = "default_fall_volume_depth")]
    pub fall_volume_depth: f32,
    /// Delay between the win announcement and automatic session end.
    #[serde(default = "default_win_teardown_secs")]
    pub win_teardown_secs: f32,
    /// Cloud anchor lifetime requested when hosting.
    #[serde(default = "default_anchor_ttl_days")]
    pub anchor_ttl_days: u32,
    /// How long a host/resolve operation may stay pending before it is
    /// abandoned.
    #[serde(default = "default_anchor_timeout_secs")]
    pub anchor_timeout_secs: f32,
    /// Local-space bounding half extents for placed objects, used to seat
    /// them on their surface.
    #[serde(default = "default_object_half_extents")]
    pub object_half_extents: [f32; 3],
}

fn default_throw_force() -> f32 {
    10.0
}

fn default_scale_sensitivity() -> f32 {
    0.1
}

fn default_fall_margin() -> f32 {
    0.5
}

fn default_fall_volume_depth() -> f32 {
    1.0
}

fn default_win_teardown_secs() -> f32 {
    3.0
}

fn default_anchor_ttl_days() -> u32 {
    1
}

fn default_anchor_timeout_secs() -> f32 {
    30.0
}

fn default_object_half_extents() -> [f32; 3] {
    [0.25, 0.25, 0.25]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            throw_force: default_throw_force(),
            scale_sensitivity: default_scale_sensitivity(),
            fall_margin: default_fall_margin(),
            fall_volume_depth: default_fall_volume_depth(),
            win_teardown_secs: default_win_teardown_secs(),
            anchor_ttl_days: default_anchor_ttl_days(),
            anchor_timeout_secs: default_anchor_timeout_secs(),
            object_half_extents: default_object_half_extents(),
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn object_half_extents(&self) -> Vec3 {
        Vec3::from_array(self.object_half_extents)
    }
}
