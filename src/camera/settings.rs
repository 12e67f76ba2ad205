//! Capture configuration read from the capture target.
//!
//! Settings are stored as YAML:
//!
//! ```yaml
//! headbox_size: [100.0, 100.0, 100.0]
//! samples_per_face: 8
//! resolution: 1024
//! frame_budget: 4
//! ```
//!
//! Sample counts and resolutions are restricted to the values the capture
//! actor exposes; anything else is rejected as [`CaptureError::InvalidNumericInput`].

use std::fs;
use std::path::Path;

use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::CaptureError;

/// Ticks spent on one face: render submission, GPU execution and readback
/// each need at least one full host frame.
pub const DEFAULT_FRAME_BUDGET: u32 = 4;

/// Number of headbox sample positions. Always a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SampleCount {
    K2,
    K4,
    K8,
    K16,
    K32,
    K64,
    K128,
    K256,
}

impl SampleCount {
    pub fn count(&self) -> usize {
        match self {
            SampleCount::K2 => 2,
            SampleCount::K4 => 4,
            SampleCount::K8 => 8,
            SampleCount::K16 => 16,
            SampleCount::K32 => 32,
            SampleCount::K64 => 64,
            SampleCount::K128 => 128,
            SampleCount::K256 => 256,
        }
    }
}

impl TryFrom<u32> for SampleCount {
    type Error = CaptureError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(SampleCount::K2),
            4 => Ok(SampleCount::K4),
            8 => Ok(SampleCount::K8),
            16 => Ok(SampleCount::K16),
            32 => Ok(SampleCount::K32),
            64 => Ok(SampleCount::K64),
            128 => Ok(SampleCount::K128),
            256 => Ok(SampleCount::K256),
            other => Err(CaptureError::InvalidNumericInput(format!(
                "sample count must be a power of two in 2..=256, got {other}"
            ))),
        }
    }
}

impl From<SampleCount> for u32 {
    fn from(value: SampleCount) -> Self {
        value.count() as u32
    }
}

/// Square output resolution of every captured face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CaptureResolution {
    K512,
    K1024,
    K2048,
    K4096,
    K1536,
}

impl CaptureResolution {
    pub fn pixels(&self) -> u32 {
        match self {
            CaptureResolution::K512 => 512,
            CaptureResolution::K1024 => 1024,
            CaptureResolution::K2048 => 2048,
            CaptureResolution::K4096 => 4096,
            CaptureResolution::K1536 => 1536,
        }
    }
}

impl TryFrom<u32> for CaptureResolution {
    type Error = CaptureError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            512 => Ok(CaptureResolution::K512),
            1024 => Ok(CaptureResolution::K1024),
            2048 => Ok(CaptureResolution::K2048),
            4096 => Ok(CaptureResolution::K4096),
            1536 => Ok(CaptureResolution::K1536),
            other => Err(CaptureError::InvalidNumericInput(format!(
                "resolution must be one of 512, 1024, 1536, 2048, 4096, got {other}"
            ))),
        }
    }
}

impl From<CaptureResolution> for u32 {
    fn from(value: CaptureResolution) -> Self {
        value.pixels()
    }
}

fn default_frame_budget() -> u32 {
    DEFAULT_FRAME_BUDGET
}

/// Per-target capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Extent of the headbox in host units, centered on the capture camera.
    pub headbox_size: Vector3<f64>,
    pub samples_per_face: SampleCount,
    pub resolution: CaptureResolution,
    /// Host frames spent per face. May be raised for slow renderers, never
    /// lowered below [`DEFAULT_FRAME_BUDGET`].
    #[serde(default = "default_frame_budget")]
    pub frame_budget: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            headbox_size: Vector3::new(100.0, 100.0, 100.0),
            samples_per_face: SampleCount::K8,
            resolution: CaptureResolution::K1024,
            frame_budget: DEFAULT_FRAME_BUDGET,
        }
    }
}

impl CaptureSettings {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self
            .headbox_size
            .iter()
            .any(|extent| !extent.is_finite() || *extent < 0.0)
        {
            return Err(CaptureError::InvalidParams(format!(
                "headbox size must be finite and non-negative, got {:?}",
                self.headbox_size
            )));
        }
        if self.frame_budget < DEFAULT_FRAME_BUDGET {
            return Err(CaptureError::InvalidParams(format!(
                "frame budget must be at least {DEFAULT_FRAME_BUDGET}, got {}",
                self.frame_budget
            )));
        }
        Ok(())
    }

    /// Loads and validates settings from a YAML file.
    pub fn load_from_yaml(path: &str) -> Result<Self, CaptureError> {
        let contents = fs::read_to_string(path)?;
        let settings: CaptureSettings = serde_yaml::from_str(&contents)?;
        settings.validate()?;
        info!("Loaded capture settings from {path}: {settings:?}");
        Ok(settings)
    }

    /// Saves settings to a YAML file, creating the parent directory if needed.
    pub fn save_to_yaml(&self, path: &str) -> Result<(), CaptureError> {
        let yaml = serde_yaml::to_string(self)?;
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::DirectoryCreateFailed(e.to_string()))?;
        }
        fs::write(path, yaml).map_err(|e| CaptureError::WriteFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.samples_per_face.count(), 8);
        assert_eq!(settings.resolution.pixels(), 1024);
        assert_eq!(settings.frame_budget, 4);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_sample_count_values() {
        for (value, count) in [(2, 2), (16, 16), (256, 256)] {
            assert_eq!(SampleCount::try_from(value).unwrap().count(), count);
        }
        assert!(matches!(
            SampleCount::try_from(3),
            Err(CaptureError::InvalidNumericInput(_))
        ));
        assert!(SampleCount::try_from(512).is_err());
        assert!(SampleCount::try_from(1).is_err());
    }

    #[test]
    fn test_resolution_values() {
        assert_eq!(CaptureResolution::try_from(1536).unwrap().pixels(), 1536);
        assert_eq!(CaptureResolution::try_from(4096).unwrap().pixels(), 4096);
        assert!(matches!(
            CaptureResolution::try_from(3000),
            Err(CaptureError::InvalidNumericInput(_))
        ));
    }

    #[test]
    fn test_yaml_rejects_unknown_resolution() {
        let yaml = "headbox_size: [1.0, 1.0, 1.0]\nsamples_per_face: 8\nresolution: 1000\n";
        assert!(serde_yaml::from_str::<CaptureSettings>(yaml).is_err());
    }

    #[test]
    fn test_frame_budget_defaults_when_missing() {
        let yaml = "headbox_size: [1.0, 2.0, 3.0]\nsamples_per_face: 4\nresolution: 512\n";
        let settings: CaptureSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.frame_budget, DEFAULT_FRAME_BUDGET);
        assert_eq!(settings.headbox_size, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_validate_rejects_narrow_budget() {
        let settings = CaptureSettings {
            frame_budget: 2,
            ..CaptureSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CaptureError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_headbox() {
        let settings = CaptureSettings {
            headbox_size: Vector3::new(1.0, -1.0, 1.0),
            ..CaptureSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
