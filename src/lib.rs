//! Seurat Capture Library
//!
//! Drives a multi-frame scene capture for the Seurat scene simplification
//! pipeline. A camera is moved through a set of sample positions inside a
//! small "headbox" volume; at each position six cube faces are rendered with
//! color and eye-space depth, and a JSON manifest describes every view.
//!
//! The library covers:
//! - Hammersley sample generation inside the headbox ([`util`])
//! - Host-to-Seurat coordinate conversion and the capture clip matrix ([`camera`])
//! - The frame-budgeted capture state machine and its host driver ([`capture`])
//! - The manifest data model and its JSON form ([`manifest`])
//!
//! Rendering, readback and engine state are reached through the traits in
//! [`capture`], so the sequencing logic runs without a GPU.

pub mod camera;
pub mod capture;
pub mod manifest;
pub mod util;

// Re-export commonly used types
pub use camera::{
    CaptureError, CaptureResolution, CaptureSettings, CoordinateConverter, CubeFace, Pose,
    Rotator, SampleCount,
};
pub use capture::{
    CaptureOrchestrator, CaptureSession, CaptureState, CaptureTarget, HostEnvironment, HostMode,
    ImageWriter, ManifestStore, Readback,
};
pub use manifest::{DepthImageFile, Image1File, Image4File, Manifest, ProjectiveCamera, View, ViewGroup};
