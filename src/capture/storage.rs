//! Filesystem-backed collaborators: manifest text files and EXR images.

use std::fs;
use std::path::Path;

use image::{ImageBuffer, Rgba};
use log::info;

use super::{ImageWriter, ManifestStore, Readback};
use crate::camera::CaptureError;
use crate::util::ensure_output_dir;

/// Saves text files to the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct FileSystemStore;

impl ManifestStore for FileSystemStore {
    fn save_text(
        &mut self,
        dir: &Path,
        file_name: &str,
        text: &str,
        allow_overwrite: bool,
    ) -> Result<(), CaptureError> {
        ensure_output_dir(dir)?;

        let path = dir.join(file_name);
        if !allow_overwrite && path.exists() {
            return Err(CaptureError::WriteFailed(format!(
                "{} already exists",
                path.display()
            )));
        }

        fs::write(&path, text)
            .map_err(|e| CaptureError::WriteFailed(format!("{}: {e}", path.display())))?;
        info!("Saved {}", path.display());
        Ok(())
    }
}

/// Writes readbacks as 32-bit float RGBA OpenEXR files.
///
/// Color stays linear and depth is kept in alpha unchanged, in host units.
#[derive(Debug, Default, Clone)]
pub struct ExrImageWriter;

impl ImageWriter for ExrImageWriter {
    fn write_image(&mut self, readback: &Readback, path: &Path) -> Result<(), CaptureError> {
        readback.validate()?;
        if let Some(parent) = path.parent() {
            ensure_output_dir(parent)?;
        }

        let samples: Vec<f32> = readback.pixels.iter().flatten().copied().collect();
        let buffer: ImageBuffer<Rgba<f32>, Vec<f32>> =
            ImageBuffer::from_raw(readback.width, readback.height, samples).ok_or_else(|| {
                CaptureError::ReadbackFailed("pixel buffer does not match dimensions".to_string())
            })?;

        buffer
            .save_with_format(path, image::ImageFormat::OpenExr)
            .map_err(|e| CaptureError::WriteFailed(format!("{}: {e}", path.display())))
    }
}
