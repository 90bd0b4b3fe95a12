//! UI preferences persisted alongside the rest of the state.

use serde::{Deserialize, Serialize};

use crate::enums::ThemeMode;
use crate::error::Result;
use crate::validate;

/// Window position and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 1600,
            height: 900,
        }
    }
}

/// UI-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub theme: ThemeMode,
    pub window_geometry: WindowGeometry,
    pub left_dock_width: u32,
    pub right_rail_width: u32,
    pub activity_log_collapsed: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            window_geometry: WindowGeometry::default(),
            left_dock_width: 280,
            right_rail_width: 320,
            activity_log_collapsed: false,
        }
    }
}

impl UiPreferences {
    /// Validate geometry and panel widths.
    pub fn validate(&self) -> Result<()> {
        let geometry = &self.window_geometry;
        validate::range("window_width", i64::from(geometry.width), 1280, i64::from(u32::MAX))?;
        validate::range(
            "window_height",
            i64::from(geometry.height),
            720,
            i64::from(u32::MAX),
        )?;
        validate::range("left_dock_width", i64::from(self.left_dock_width), 200, 400)?;
        validate::range("right_rail_width", i64::from(self.right_rail_width), 200, 500)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_window_rejected() {
        let mut prefs = UiPreferences::default();
        assert!(prefs.validate().is_ok());
        prefs.window_geometry.width = 800;
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn panel_width_bounds() {
        let prefs = UiPreferences {
            right_rail_width: 501,
            ..UiPreferences::default()
        };
        assert!(prefs.validate().is_err());
    }
}
