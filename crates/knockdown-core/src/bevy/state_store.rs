//! Shared state stores for session-to-UI communication.
//!
//! The host UI polls these instead of reaching into the ECS. Each store
//! carries a version counter so pollers can skip unchanged state.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::Resource;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::bevy::plugin::SessionMode;

/// Maximum number of status lines to keep.
const MAX_STATUS_LINES: usize = 100;

// ============================================================================
// Data Types
// ============================================================================

/// Which HUD panel the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HudPanel {
    /// Placement/scaling controls and the start button.
    #[default]
    Setup,
    /// In-game HUD with the score readout.
    Game,
}

/// Session state summary for UI display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionSummary {
    pub mode: SessionMode,
    pub panel: HudPanel,
    pub placed_count: usize,
    pub score: u32,
    pub anchor_id: Option<String>,
    /// True while a host or resolve operation is pending.
    pub anchor_busy: bool,
    pub won: bool,
}

/// One line of the on-screen status feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLine {
    pub id: u64,
    pub text: String,
    pub timestamp: f64,
}

// ============================================================================
// Individual Stores
// ============================================================================

/// Store for the session summary.
#[derive(Debug, Default)]
pub struct SessionStore {
    summary: RwLock<SessionSummary>,
    /// UI 폴링용 버전 카운터. 요약이 실제로 바뀔 때만 증가한다.
    version: RwLock<u64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_summary(&self) -> SessionSummary {
        self.summary.read().clone()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    pub fn update(&self, summary: SessionSummary) {
        let mut current = self.summary.write();
        if *current == summary {
            return;
        }
        *current = summary;
        *self.version.write() += 1;
    }
}

/// Store for the status feed (anchor progress, rejections, win message).
#[derive(Debug, Default)]
pub struct StatusStore {
    lines: RwLock<VecDeque<StatusLine>>,
    next_id: RwLock<u64>,
    version: RwLock<u64>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_lines(&self) -> Vec<StatusLine> {
        self.lines.read().iter().cloned().collect()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    pub fn push(&self, text: impl Into<String>, timestamp: f64) {
        let id = {
            let mut next = self.next_id.write();
            let id = *next;
            *next += 1;
            id
        };

        let mut lines = self.lines.write();
        lines.push_back(StatusLine {
            id,
            text: text.into(),
            timestamp,
        });

        // Trim old lines
        while lines.len() > MAX_STATUS_LINES {
            lines.pop_front();
        }

        *self.version.write() += 1;
    }

    pub fn clear(&self) {
        self.lines.write().clear();
        *self.version.write() += 1;
    }
}

// ============================================================================
// Combined Stores
// ============================================================================

/// All HUD stores combined for easy sharing.
#[derive(Debug, Clone, Resource)]
pub struct HudStores {
    pub session: Arc<SessionStore>,
    pub status: Arc<StatusStore>,
}

impl HudStores {
    pub fn new() -> Self {
        Self {
            session: Arc::new(SessionStore::new()),
            status: Arc::new(StatusStore::new()),
        }
    }
}

impl Default for HudStores {
    fn default() -> Self {
        Self::new()
    }
}
