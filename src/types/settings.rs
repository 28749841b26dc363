use serde::{Deserialize, Serialize};

/// Settings store keys.
pub mod keys {
    pub const HISTORY: &str = "history";
    pub const CURRENT_INDEX: &str = "currentIndex";
    pub const WINDOW_FRAME: &str = "windowFrame";
    pub const MINI_VIEW_MODE: &str = "miniViewMode";
    pub const LEFT_PANEL_COLLAPSED: &str = "leftPanelCollapsed";
    pub const DETECTION_ENABLED: &str = "detectionEnabled";
    pub const WAS_PLAYING_ON_QUIT: &str = "wasPlayingOnQuit";
    pub const POLL_INTERVAL_SECS: &str = "pollIntervalSecs";

    pub const ALL: &[&str] = &[
        HISTORY,
        CURRENT_INDEX,
        WINDOW_FRAME,
        MINI_VIEW_MODE,
        LEFT_PANEL_COLLAPSED,
        DETECTION_ENABLED,
        WAS_PLAYING_ON_QUIT,
        POLL_INTERVAL_SECS,
    ];
}

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Player window position and size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Typed view of the presentation and detection flags held in the settings
/// store. The history itself is read by the history manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub window_frame: Option<WindowFrame>,
    pub mini_view_mode: bool,
    pub left_panel_collapsed: bool,
    pub detection_enabled: bool,
    pub was_playing_on_quit: bool,
    pub poll_interval_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_frame: None,
            mini_view_mode: false,
            left_panel_collapsed: false,
            detection_enabled: true,
            was_playing_on_quit: false,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}
