//! Capture sequencing and the host capabilities it drives.
//!
//! The capture core never talks to an engine directly. Everything it needs
//! from the host is expressed through the traits in this module:
//!
//! - [`CaptureTarget`]: the camera being driven (pose, render, readback)
//! - [`ImageWriter`]: encoding a readback buffer to disk
//! - [`HostEnvironment`]: execution mode, time flow and quality toggles
//! - [`ManifestStore`]: saving the manifest text
//!
//! Tests supply fakes that complete renders instantly.

use std::path::Path;

use crate::camera::{CaptureError, CaptureSettings, CubeFace, Pose};

pub mod orchestrator;
pub mod session;
pub mod storage;

pub use orchestrator::{CaptureOrchestrator, IMAGE_EXTENSION, MANIFEST_FILE_NAME};
pub use session::{CaptureSession, CaptureState, ViewSetup};
pub use storage::{ExrImageWriter, FileSystemStore};

/// Pixels read back from a render target: linear RGB color with depth in A.
#[derive(Debug, Clone, PartialEq)]
pub struct Readback {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl Readback {
    /// Checks that the buffer holds exactly `width * height` pixels.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let expected = self.width as usize * self.height as usize;
        if self.width == 0 || self.height == 0 || self.pixels.len() != expected {
            return Err(CaptureError::ReadbackFailed(format!(
                "expected {}x{} = {expected} pixels, got {}",
                self.width,
                self.height,
                self.pixels.len()
            )));
        }
        Ok(())
    }
}

/// The camera actor a capture session drives.
///
/// Implementations are usually weak handles to a host object, which is why
/// liveness is polled through [`CaptureTarget::is_valid`].
pub trait CaptureTarget {
    /// Whether the underlying host object still exists.
    fn is_valid(&self) -> bool;

    /// Capture configuration exposed by the target.
    fn settings(&self) -> CaptureSettings;

    fn pose(&self) -> Pose;

    fn set_pose(&mut self, pose: &Pose);

    /// Allocates a square float RGBA render target capturing color and depth.
    fn acquire_render_target(&mut self, resolution: u32);

    fn release_render_target(&mut self);

    /// Enqueues a scene render into the render target. Completion is not
    /// guaranteed until a later frame.
    fn render_now(&mut self);

    /// Synchronously reads back the render target.
    fn read_back(&mut self) -> Result<Readback, CaptureError>;
}

/// Encodes a readback buffer and saves it at `path`.
pub trait ImageWriter {
    fn write_image(&mut self, readback: &Readback, path: &Path) -> Result<(), CaptureError>;
}

/// Host execution modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Editing a level with no game running.
    Editor,
    /// Game running inside the editor.
    PlayInEditor,
    /// Anything else, e.g. a packaged game. Captures are not supported here.
    Other,
}

/// Global host state a capture needs to freeze and restore.
pub trait HostEnvironment {
    fn mode(&self) -> HostMode;

    /// Near clipping plane distance used by the renderer, in host units.
    fn near_clip_plane(&self) -> f64;

    /// Whether the editor viewport redraws every frame.
    fn is_realtime(&self) -> bool;

    fn set_realtime(&mut self, realtime: bool);

    fn is_game_paused(&self) -> bool;

    /// Returns false if the host refused the request.
    fn set_game_paused(&mut self, paused: bool) -> bool;

    /// Whether the host lowers render quality when frame times get long.
    fn performance_monitoring(&self) -> bool;

    fn set_performance_monitoring(&mut self, enabled: bool);
}

/// Saves text files such as the manifest.
pub trait ManifestStore {
    /// Writes `text` to `dir/file_name`, creating `dir` if needed. Fails with
    /// [`CaptureError::WriteFailed`] if the file exists and overwriting is not
    /// allowed.
    fn save_text(
        &mut self,
        dir: &Path,
        file_name: &str,
        text: &str,
        allow_overwrite: bool,
    ) -> Result<(), CaptureError>;
}

/// File name of the packed color+depth image for one face at one sample,
/// e.g. `Cube_Front_0_ColorDepth.exr`.
pub fn image_file_name(face: CubeFace, sample_index: usize, extension: &str) -> String {
    format!("Cube_{}_{sample_index}_ColorDepth.{extension}", face.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_file_name() {
        assert_eq!(
            image_file_name(CubeFace::Front, 0, "exr"),
            "Cube_Front_0_ColorDepth.exr"
        );
        assert_eq!(
            image_file_name(CubeFace::Bottom, 17, "exr"),
            "Cube_Bottom_17_ColorDepth.exr"
        );
    }

    #[test]
    fn test_readback_validate() {
        let ok = Readback {
            width: 2,
            height: 2,
            pixels: vec![[0.0; 4]; 4],
        };
        assert!(ok.validate().is_ok());

        let short = Readback {
            width: 2,
            height: 2,
            pixels: vec![[0.0; 4]; 3],
        };
        assert!(matches!(short.validate(), Err(CaptureError::ReadbackFailed(_))));

        let empty = Readback {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        assert!(empty.validate().is_err());
    }
}
