use std::fs;
use std::path::Path;

use crate::camera::CaptureError;

mod point_sampling;

pub use point_sampling::{generate_headbox_samples, radical_inverse};

/// Ensure the output directory exists, creating it and any parents if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<(), CaptureError> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| {
            CaptureError::DirectoryCreateFailed(format!("{}: {e}", dir.display()))
        })?;
    }
    // Creation can report success on some filesystems without the directory
    // being usable, so check again.
    if !dir.is_dir() {
        return Err(CaptureError::DirectoryCreateFailed(
            dir.display().to_string(),
        ));
    }
    Ok(())
}
