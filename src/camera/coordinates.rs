//! Change of basis between the host's world space and Seurat's camera space.
//!
//! The host uses +X forward, +Y right, +Z up. Seurat follows the usual graphics
//! convention where a camera looks down -Z with +Y up, so:
//!
//! - host +X (forward) maps to Seurat -Z
//! - host +Y (right) maps to Seurat +X
//! - host +Z (up) maps to Seurat +Y
//!
//! All matrices are column-vector transforms (`p' = M * p`).

use nalgebra::Matrix4;

/// Converts rigid transforms between host and Seurat coordinates.
///
/// The basis matrix is orthonormal, so its inverse is its transpose and both
/// are computed once at construction.
#[derive(Debug, Clone)]
pub struct CoordinateConverter {
    seurat_from_host: Matrix4<f64>,
    host_from_seurat: Matrix4<f64>,
}

impl Default for CoordinateConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateConverter {
    pub fn new() -> Self {
        #[rustfmt::skip]
        let seurat_from_host = Matrix4::new(
             0.0, 1.0, 0.0, 0.0,
             0.0, 0.0, 1.0, 0.0,
            -1.0, 0.0, 0.0, 0.0,
             0.0, 0.0, 0.0, 1.0,
        );
        Self {
            seurat_from_host,
            host_from_seurat: seurat_from_host.transpose(),
        }
    }

    /// The fixed change-of-basis matrix `P`.
    pub fn seurat_from_host(&self) -> &Matrix4<f64> {
        &self.seurat_from_host
    }

    /// Converts a host world transform into Seurat space: `P * M * P^-1`.
    pub fn to_target_space(&self, host_transform: &Matrix4<f64>) -> Matrix4<f64> {
        self.seurat_from_host * host_transform * self.host_from_seurat
    }

    /// Inverse of [`CoordinateConverter::to_target_space`]: `P^-1 * S * P`.
    pub fn from_target_space(&self, seurat_transform: &Matrix4<f64>) -> Matrix4<f64> {
        self.host_from_seurat * seurat_transform * self.seurat_from_host
    }
}

/// Builds the clip-from-eye matrix shared by every captured face.
///
/// It describes a 90 degree frustum with an infinite far plane. It does not
/// have to match the renderer's own projection since depth is stored as eye
/// space Z; it tells consumers where the near plane is and that the far plane
/// is at infinity.
pub fn build_clip_matrix(near_clip: f64) -> Matrix4<f64> {
    let c = -1.0;
    let d = -2.0 * near_clip;
    #[rustfmt::skip]
    let clip_from_eye = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0,   c,   d,
        0.0, 0.0,   c, 0.0,
    );
    clip_from_eye
}
