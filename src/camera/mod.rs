//! Camera poses, cube faces and the error type shared by the capture pipeline.
//!
//! Poses are expressed in the host's convention: +X forward, +Y right, +Z up,
//! with orientation given as pitch/yaw/roll in degrees. The submodules provide
//! the change of basis into Seurat's camera space ([`coordinates`]) and the
//! capture configuration surface ([`settings`]).

use nalgebra::{Matrix3, Matrix4, Point3};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod coordinates;
pub mod settings;

pub use coordinates::{build_clip_matrix, CoordinateConverter};
pub use settings::{CaptureResolution, CaptureSettings, SampleCount, DEFAULT_FRAME_BUDGET};

/// Defines the errors that can occur while configuring or running a capture.
///
/// None of these are used for control flow inside the per-tick state machine;
/// they are returned from the boundary calls (begin, settings parsing, I/O).
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// The host is neither in the editor nor in play-in-editor mode.
    #[error("Capture only runs in Editor or Play-In-Editor mode")]
    InvalidHostMode,
    /// A capture session is already running.
    #[error("A capture is already in progress")]
    CaptureAlreadyInProgress,
    /// The capture target disappeared while a session was running.
    #[error("Lost capture target reference")]
    TargetLost,
    /// A session was started without any sample positions.
    #[error("Capture requires at least one sample position")]
    NoSamples,
    /// The output directory could not be created.
    #[error("Failed to create directory: {0}")]
    DirectoryCreateFailed(String),
    /// A file could not be written.
    #[error("Failed to write file: {0}")]
    WriteFailed(String),
    /// A numeric value outside the accepted set was supplied.
    #[error("Invalid numeric input: {0}")]
    InvalidNumericInput(String),
    /// Parameters are inconsistent or out of range.
    #[error("Invalid capture parameters: {0}")]
    InvalidParams(String),
    /// The render target readback did not produce a usable buffer.
    #[error("Readback failed: {0}")]
    ReadbackFailed(String),
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    #[error("JSON error: {0}")]
    JsonError(String),
    #[error("IO Error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::IOError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CaptureError {
    fn from(err: serde_yaml::Error) -> Self {
        CaptureError::YamlError(err.to_string())
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::JsonError(err.to_string())
    }
}

/// Orientation in degrees, applied in the host's yaw-pitch-roll order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotator {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Returns the rotation as a column-vector matrix whose columns are the
    /// world-space images of the local forward, right and up axes.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sr, cr) = self.roll.to_radians().sin_cos();

        let forward = [cp * cy, cp * sy, sp];
        let right = [sr * sp * cy - cr * sy, sr * sp * sy + cr * cy, -sr * cp];
        let up = [-(cr * sp * cy + sr * sy), cy * sr - cr * sp * sy, cr * cp];

        Matrix3::new(
            forward[0], right[0], up[0], //
            forward[1], right[1], up[1], //
            forward[2], right[2], up[2],
        )
    }
}

/// Rigid camera pose in host world space. Scale is never part of a pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub location: Point3<f64>,
    pub rotation: Rotator,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            location: Point3::origin(),
            rotation: Rotator::default(),
        }
    }
}

impl Pose {
    pub fn new(location: Point3<f64>, rotation: Rotator) -> Self {
        Self { location, rotation }
    }

    /// World-from-local transform of this pose (column-vector convention).
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let r = self.rotation.to_matrix();
        let t = self.location;
        Matrix4::new(
            r[(0, 0)], r[(0, 1)], r[(0, 2)], t.x, //
            r[(1, 0)], r[(1, 1)], r[(1, 2)], t.y, //
            r[(2, 0)], r[(2, 1)], r[(2, 2)], t.z, //
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// The six cube faces captured at every sample position.
///
/// The declaration order is the order views appear in a view group and must
/// not change: downstream tools index views by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeFace {
    Front,
    Back,
    Right,
    Left,
    Top,
    Bottom,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Front,
        CubeFace::Back,
        CubeFace::Right,
        CubeFace::Left,
        CubeFace::Top,
        CubeFace::Bottom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CubeFace::Front => "Front",
            CubeFace::Back => "Back",
            CubeFace::Right => "Right",
            CubeFace::Left => "Left",
            CubeFace::Top => "Top",
            CubeFace::Bottom => "Bottom",
        }
    }

    /// Absolute world orientation the camera takes for this face.
    pub fn rotation(&self) -> Rotator {
        match self {
            CubeFace::Front => Rotator::new(0.0, 0.0, 0.0),
            CubeFace::Back => Rotator::new(0.0, 180.0, 0.0),
            CubeFace::Right => Rotator::new(0.0, 90.0, 0.0),
            CubeFace::Left => Rotator::new(0.0, 270.0, 0.0),
            CubeFace::Top => Rotator::new(90.0, 0.0, 0.0),
            CubeFace::Bottom => Rotator::new(270.0, 0.0, 0.0),
        }
    }
}

impl fmt::Display for CubeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
