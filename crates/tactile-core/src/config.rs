//! Input configuration.
//!
//! Thresholds for gesture recognition and limits for dispatch, loadable from
//! TOML. Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```toml
//! [gesture]
//! tap_time_ms = 250
//! drag_distance = 24.0
//! ```

use crate::error::{InputError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Gesture recognizer thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A press released within this many milliseconds is a tap, otherwise a hold.
    pub tap_time_ms: u64,
    /// A tap starting within this many milliseconds of the previous tap's end is a double tap.
    pub double_tap_time_ms: u64,
    /// Movement (pixels) beyond which a press becomes a drag.
    pub drag_distance: f32,
    /// Frame-count fallback for low frame rates: events this many frames apart
    /// are treated as within the tap and double-tap windows.
    pub frame_slack: u64,
    /// Recover a tap from the two-point state when a fast second press
    /// overlaps the first release by exactly one frame.
    pub overlap_tap_compensation: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_time_ms: 300,
            double_tap_time_ms: 300,
            drag_distance: 20.0,
            frame_slack: 2,
            overlap_tap_compensation: true,
        }
    }
}

impl GestureConfig {
    /// Tap window as a duration.
    #[must_use]
    pub const fn tap_time(&self) -> Duration {
        Duration::from_millis(self.tap_time_ms)
    }

    /// Double-tap window as a duration.
    #[must_use]
    pub const fn double_tap_time(&self) -> Duration {
        Duration::from_millis(self.double_tap_time_ms)
    }
}

/// Dispatcher limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of stacked scopes, including the base scope.
    pub max_scope_depth: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { max_scope_depth: 8 }
    }
}

/// Complete input configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Gesture thresholds.
    pub gesture: GestureConfig,
    /// Dispatch limits.
    pub dispatch: DispatchConfig,
}

impl InputConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded input config");
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let drag = self.gesture.drag_distance;
        if !drag.is_finite() || drag < 0.0 {
            return Err(InputError::InvalidConfig(format!(
                "gesture.drag_distance must be a non-negative number, got {drag}"
            )));
        }
        if self.dispatch.max_scope_depth == 0 {
            return Err(InputError::InvalidConfig(
                "dispatch.max_scope_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InputConfig::default();
        assert_eq!(config.gesture.tap_time(), Duration::from_millis(300));
        assert_eq!(config.gesture.double_tap_time(), Duration::from_millis(300));
        assert_eq!(config.gesture.drag_distance, 20.0);
        assert_eq!(config.gesture.frame_slack, 2);
        assert!(config.gesture.overlap_tap_compensation);
        assert_eq!(config.dispatch.max_scope_depth, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = InputConfig::from_toml_str(
            r"
            [gesture]
            tap_time_ms = 250
            ",
        )
        .expect("valid config");
        assert_eq!(config.gesture.tap_time_ms, 250);
        assert_eq!(config.gesture.drag_distance, 20.0);
        assert_eq!(config.dispatch, DispatchConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = InputConfig::from_toml_str("").expect("valid config");
        assert_eq!(config, InputConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = InputConfig::from_toml_str("[gesture]\ndrag_distance = -1.0\n")
            .expect_err("negative drag distance");
        assert!(matches!(err, InputError::InvalidConfig(_)));

        let err = InputConfig::from_toml_str("[dispatch]\nmax_scope_depth = 0\n")
            .expect_err("zero depth");
        assert!(matches!(err, InputError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = InputConfig::from_toml_str("[gesture\n").expect_err("malformed");
        assert!(matches!(err, InputError::ConfigParse(_)));
    }

    #[test]
    fn test_toml_output_parses_back() {
        let mut config = InputConfig::default();
        config.gesture.drag_distance = 32.0;
        let text = config.to_toml_string().expect("serializable");
        assert!(text.contains("drag_distance = 32.0"));
        assert_eq!(InputConfig::from_toml_str(&text).expect("parses"), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = InputConfig::load(Path::new("/nonexistent/tactile.toml")).expect_err("missing");
        assert!(matches!(err, InputError::Io(_)));
    }
}
