//! Seurat capture manifest.
//!
//! A manifest lists one [`ViewGroup`] per headbox sample, each holding one
//! [`View`] per cube face. The JSON layout is consumed by the Seurat pipeline
//! and is fixed:
//!
//! ```json
//! { "view_groups": [ { "views": [ {
//!     "projective_camera": { "image_width": 1024, "image_height": 1024,
//!         "clip_from_eye_matrix": [16 numbers], "world_from_eye_matrix": [16 numbers],
//!         "depth_type": "EYE_Z" },
//!     "depth_image_file": {
//!         "color": { "path": "...", "channel_0": "R", "channel_1": "G",
//!                    "channel_2": "B", "channel_alpha": "CONSTANT_ONE" },
//!         "depth": { "path": "...", "channel_0": "A" } } } ] } ] }
//! ```
//!
//! Matrices are written row by row from their column-vector form, which is
//! the column-outer, row-inner walk over the host's row-vector matrices.

use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::camera::CaptureError;

/// Flattens a column-vector matrix into the manifest's 16-number order.
pub fn matrix_to_array(matrix: &Matrix4<f64>) -> [f64; 16] {
    let mut values = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            values[row * 4 + col] = matrix[(row, col)];
        }
    }
    values
}

/// Inverse of [`matrix_to_array`].
pub fn matrix_from_array(values: &[f64; 16]) -> Matrix4<f64> {
    Matrix4::from_row_slice(values)
}

mod matrix_serde {
    use super::{matrix_from_array, matrix_to_array};
    use nalgebra::Matrix4;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(matrix: &Matrix4<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        matrix_to_array(matrix).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Matrix4<f64>, D::Error> {
        let values = <[f64; 16]>::deserialize(deserializer)?;
        Ok(matrix_from_array(&values))
    }
}

/// How depth values in the depth channel are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthType {
    /// Positive distance along the eye-space view axis.
    #[serde(rename = "EYE_Z")]
    EyeZ,
}

/// Calibration of one captured view, in Seurat coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectiveCamera {
    pub image_width: u32,
    pub image_height: u32,
    #[serde(with = "matrix_serde")]
    pub clip_from_eye_matrix: Matrix4<f64>,
    #[serde(with = "matrix_serde")]
    pub world_from_eye_matrix: Matrix4<f64>,
    pub depth_type: DepthType,
}

impl ProjectiveCamera {
    /// Creates a camera for a square capture of `resolution` pixels.
    pub fn square(
        resolution: u32,
        clip_from_eye_matrix: Matrix4<f64>,
        world_from_eye_matrix: Matrix4<f64>,
    ) -> Self {
        Self {
            image_width: resolution,
            image_height: resolution,
            clip_from_eye_matrix,
            world_from_eye_matrix,
            depth_type: DepthType::EyeZ,
        }
    }
}

/// Four-channel image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image4File {
    pub path: String,
    pub channel_0: String,
    pub channel_1: String,
    pub channel_2: String,
    pub channel_alpha: String,
}

impl Image4File {
    /// RGB color with an implicit opaque alpha.
    pub fn color(path: &str) -> Self {
        Self {
            path: path.to_string(),
            channel_0: "R".to_string(),
            channel_1: "G".to_string(),
            channel_2: "B".to_string(),
            channel_alpha: "CONSTANT_ONE".to_string(),
        }
    }
}

/// Single-channel image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image1File {
    pub path: String,
    pub channel_0: String,
}

impl Image1File {
    /// Depth stored in the alpha channel.
    pub fn alpha(path: &str) -> Self {
        Self {
            path: path.to_string(),
            channel_0: "A".to_string(),
        }
    }
}

/// Color and depth for one view, both read from the same RGBA image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthImageFile {
    pub color: Image4File,
    pub depth: Image1File,
}

impl DepthImageFile {
    /// References an image packing linear color in RGB and depth in A.
    pub fn packed_rgba(path: &str) -> Self {
        Self {
            color: Image4File::color(path),
            depth: Image1File::alpha(path),
        }
    }
}

/// One capture of one face at one sample position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub projective_camera: ProjectiveCamera,
    pub depth_image_file: DepthImageFile,
}

/// All face views captured at a single sample position, in face order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewGroup {
    pub views: Vec<View>,
}

/// The complete capture description, in sample visitation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub view_groups: Vec<ViewGroup>,
}

impl Manifest {
    /// Total number of views across all groups.
    pub fn view_count(&self) -> usize {
        self.view_groups.iter().map(|g| g.views.len()).sum()
    }

    /// Serializes to pretty-printed JSON. Equal manifests give identical bytes.
    pub fn to_json_string(&self) -> Result<String, CaptureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        Ok(serde_json::from_str(json)?)
    }
}
