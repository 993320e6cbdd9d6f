//=========================================================================
// World Properties
//=========================================================================
//
// Device and view configuration consumed by the coordinate mapper, the
// scene transitions and the platform window.
//
// Sources:
//   WorldProperties::default()         → 800x600 centered, Y flipped
//   WorldProperties::from_toml_str()   → inline TOML
//   WorldProperties::load(path)        → TOML file on disk
//
// Example file:
// ```toml
// device_width = 1280
// device_height = 720
// view_width = 1280.0
// view_height = 720.0
// origin = "centered"
// flip_y = true
// transition_ms = 350
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::error::StageError;

//=== ViewOrigin ==========================================================

/// Where the view-space origin sits on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewOrigin {
    /// Origin in the middle of the surface.
    #[default]
    Centered,

    /// Origin in the top-left corner (bottom-left when `flip_y` is set).
    TopLeft,
}

//=== WorldProperties =====================================================

/// Device resolution and view configuration.
///
/// Device space is raw input pixels (Y down). View space is the
/// normalized render space nodes live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldProperties {
    /// Input device width in pixels.
    pub device_width: u32,

    /// Input device height in pixels.
    pub device_height: u32,

    /// View width in world units.
    pub view_width: f64,

    /// View height in world units.
    pub view_height: f64,

    /// Placement of the view origin.
    pub origin: ViewOrigin,

    /// Whether view Y grows upwards while device Y grows downwards.
    pub flip_y: bool,

    /// Default scene transition length in milliseconds.
    pub transition_ms: u64,

    /// Nominal update step in milliseconds (used by fixed-step drivers).
    pub ms_per_update: f64,

    /// Window title used by the platform layer.
    pub title: String,
}

impl Default for WorldProperties {
    fn default() -> Self {
        Self {
            device_width: 800,
            device_height: 600,
            view_width: 800.0,
            view_height: 600.0,
            origin: ViewOrigin::Centered,
            flip_y: true,
            transition_ms: 500,
            ms_per_update: 16.6,
            title: "Aetheric Stage".to_string(),
        }
    }
}

impl WorldProperties {
    //--- Construction -----------------------------------------------------

    /// Properties where device pixels map 1:1 onto view units.
    pub fn with_resolution(width: u32, height: u32) -> Self {
        Self {
            device_width: width,
            device_height: height,
            view_width: f64::from(width),
            view_height: f64::from(height),
            ..Self::default()
        }
    }

    /// Parses properties from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, StageError> {
        let properties: Self =
            toml::from_str(text).map_err(|e| StageError::ConfigParse(e.to_string()))?;
        properties.validate()?;
        Ok(properties)
    }

    /// Loads properties from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String, StageError> {
        toml::to_string(self).map_err(|e| StageError::ConfigSerialize(e.to_string()))
    }

    //--- Validation -------------------------------------------------------

    /// Rejects sizes the coordinate mapper cannot divide by, and steps the
    /// logic thread cannot turn into a [`Duration`].
    pub fn validate(&self) -> Result<(), StageError> {
        if self.device_width == 0 || self.device_height == 0 {
            return Err(StageError::InvalidConfig(format!(
                "device resolution must be non-zero, got {}x{}",
                self.device_width, self.device_height
            )));
        }

        if !(is_positive_finite(self.view_width) && is_positive_finite(self.view_height)) {
            return Err(StageError::InvalidConfig(format!(
                "view size must be positive and finite, got {}x{}",
                self.view_width, self.view_height
            )));
        }

        if !is_positive_finite(self.ms_per_update) {
            return Err(StageError::InvalidConfig(format!(
                "ms_per_update must be positive and finite, got {}",
                self.ms_per_update
            )));
        }

        Ok(())
    }

    //--- Derived Values ---------------------------------------------------

    /// Default transition duration as a [`Duration`].
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Nominal update step as a [`Duration`].
    pub fn update_step(&self) -> Duration {
        Duration::from_secs_f64(self.ms_per_update / 1000.0)
    }
}

/// False for zero, negatives, NaN and infinities.
fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let props = WorldProperties::default();
        assert!(props.validate().is_ok());
        assert_eq!(props.transition_duration(), Duration::from_millis(500));
        assert_eq!(props.origin, ViewOrigin::Centered);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let props = WorldProperties::from_toml_str(
            r#"
            device_width = 1280
            device_height = 720
            origin = "top_left"
            "#,
        )
        .unwrap();

        assert_eq!(props.device_width, 1280);
        assert_eq!(props.device_height, 720);
        assert_eq!(props.origin, ViewOrigin::TopLeft);
        assert_eq!(props.view_width, 800.0);
        assert!(props.flip_y);
    }

    #[test]
    fn rejects_zero_resolution() {
        let err = WorldProperties::from_toml_str("device_width = 0").unwrap_err();
        assert!(matches!(err, StageError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = WorldProperties::from_toml_str("device_width = [").unwrap_err();
        assert!(matches!(err, StageError::ConfigParse(_)));
    }

    #[test]
    fn rejects_negative_view() {
        let props = WorldProperties {
            view_width: -1.0,
            ..WorldProperties::default()
        };
        assert!(props.validate().is_err());
    }

    #[test]
    fn rejects_infinite_update_step() {
        let err = WorldProperties::from_toml_str("ms_per_update = inf").unwrap_err();
        assert!(matches!(err, StageError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_finite_view() {
        let err = WorldProperties::from_toml_str("view_width = inf").unwrap_err();
        assert!(matches!(err, StageError::InvalidConfig(_)));

        let props = WorldProperties {
            view_height: f64::NAN,
            ..WorldProperties::default()
        };
        assert!(props.validate().is_err());
    }

    #[test]
    fn toml_output_parses_back() {
        let props = WorldProperties::with_resolution(1024, 768);
        let text = props.to_toml_string().unwrap();
        let parsed = WorldProperties::from_toml_str(&text).unwrap();
        assert_eq!(parsed, props);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = WorldProperties::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, StageError::Io(_)));
    }
}
