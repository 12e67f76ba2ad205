//! Frame-budgeted capture state machine.
//!
//! A [`CaptureSession`] walks every (sample, face) pair. Each pair owns a
//! window of `frame_budget` host ticks:
//!
//! - on the second tick of the window the camera is posed, a render is
//!   enqueued and the view is recorded;
//! - on the last tick the render target is read back and written to disk.
//!
//! Render submission, GPU execution and readback are asynchronous relative to
//! the host frame, so at least one full tick separates the render trigger from
//! the readback. A session of `K` samples and `F` faces completes after
//! exactly `K * F * frame_budget` ticks.

use std::path::PathBuf;

use log::{debug, error, info};
use nalgebra::{Matrix4, Point3};

use super::{image_file_name, CaptureTarget, ImageWriter};
use crate::camera::{CaptureError, CoordinateConverter, CubeFace, Pose, DEFAULT_FRAME_BUDGET};
use crate::manifest::{DepthImageFile, Manifest, ProjectiveCamera, View, ViewGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No session is running.
    Idle,
    /// Samples are generated and the first window has not started.
    Armed,
    /// Inside a face window, waiting on the render.
    Rendering,
    /// A face was written and the next face of the same sample is up.
    AdvancingFace,
    /// A sample's view group was closed and the next sample is up.
    AdvancingSample,
    /// All faces of all samples were written.
    Done,
    /// The capture target was lost; all partial results are discarded.
    Cancelled,
}

impl CaptureState {
    pub fn is_finished(&self) -> bool {
        matches!(self, CaptureState::Done | CaptureState::Cancelled)
    }
}

/// Parameters shared by every view of a session.
#[derive(Debug, Clone)]
pub struct ViewSetup {
    /// Square image size in pixels.
    pub resolution: u32,
    pub clip_from_eye: Matrix4<f64>,
    /// Pose of the reference camera in Seurat space. Views are written
    /// relative to it.
    pub world_from_reference: Matrix4<f64>,
    /// Directory images are written to. Manifest paths are relative to it.
    pub output_dir: PathBuf,
    pub image_extension: String,
    pub frame_budget: u32,
}

#[derive(Debug)]
pub struct CaptureSession {
    samples: Vec<Point3<f64>>,
    faces: Vec<CubeFace>,
    sample_index: usize,
    face_index: usize,
    frames_until_next_action: u32,
    views_completed: usize,
    state: CaptureState,
    setup: ViewSetup,
    converter: CoordinateConverter,
    reference_from_world: Matrix4<f64>,
    current_group: ViewGroup,
    manifest: Manifest,
}

impl CaptureSession {
    /// Arms a new session over `samples`, capturing `faces` at each one.
    pub fn begin(
        samples: Vec<Point3<f64>>,
        faces: Vec<CubeFace>,
        setup: ViewSetup,
    ) -> Result<Self, CaptureError> {
        if samples.is_empty() {
            return Err(CaptureError::NoSamples);
        }
        if faces.is_empty() {
            return Err(CaptureError::InvalidParams(
                "at least one cube face must be captured".to_string(),
            ));
        }
        if setup.frame_budget < DEFAULT_FRAME_BUDGET {
            return Err(CaptureError::InvalidParams(format!(
                "frame budget must be at least {DEFAULT_FRAME_BUDGET}, got {}",
                setup.frame_budget
            )));
        }
        if setup.resolution == 0 {
            return Err(CaptureError::InvalidParams(
                "resolution must be positive".to_string(),
            ));
        }
        let reference_from_world = setup.world_from_reference.try_inverse().ok_or_else(|| {
            CaptureError::InvalidParams("reference camera transform is singular".to_string())
        })?;

        info!(
            "Armed capture: {} samples x {} faces, {} frames per face",
            samples.len(),
            faces.len(),
            setup.frame_budget
        );

        Ok(Self {
            frames_until_next_action: setup.frame_budget,
            samples,
            faces,
            sample_index: 0,
            face_index: 0,
            views_completed: 0,
            state: CaptureState::Armed,
            setup,
            converter: CoordinateConverter::new(),
            reference_from_world,
            current_group: ViewGroup::default(),
            manifest: Manifest::default(),
        })
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn samples(&self) -> &[Point3<f64>] {
        &self.samples
    }

    pub fn faces(&self) -> &[CubeFace] {
        &self.faces
    }

    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    pub fn face_index(&self) -> usize {
        self.face_index
    }

    pub fn frames_until_next_action(&self) -> u32 {
        self.frames_until_next_action
    }

    /// Views written so far and the total the session will write.
    pub fn progress(&self) -> (usize, usize) {
        (self.views_completed, self.samples.len() * self.faces.len())
    }

    /// View groups closed so far.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }

    /// Advances the session by one host frame.
    pub fn tick<T>(&mut self, target: &mut T, images: &mut dyn ImageWriter) -> CaptureState
    where
        T: CaptureTarget + ?Sized,
    {
        if self.state.is_finished() || self.state == CaptureState::Idle {
            return self.state;
        }

        if !target.is_valid() {
            self.cancel();
            return self.state;
        }

        self.frames_until_next_action = self.frames_until_next_action.saturating_sub(1);
        if self.frames_until_next_action == 0 {
            self.write_current_face(target, images);
            self.advance();
        } else {
            if self.frames_until_next_action == self.setup.frame_budget - 1 {
                self.render_current_face(target);
            }
            self.state = CaptureState::Rendering;
        }
        self.state
    }

    /// Drops every sample and partial view. The session cannot be resumed.
    pub fn cancel(&mut self) {
        self.samples.clear();
        self.current_group = ViewGroup::default();
        self.manifest = Manifest::default();
        self.sample_index = 0;
        self.face_index = 0;
        self.frames_until_next_action = 0;
        self.state = CaptureState::Cancelled;
    }

    fn current_image_name(&self) -> String {
        image_file_name(
            self.faces[self.face_index],
            self.sample_index,
            &self.setup.image_extension,
        )
    }

    fn render_current_face<T>(&mut self, target: &mut T)
    where
        T: CaptureTarget + ?Sized,
    {
        let face = self.faces[self.face_index];
        let pose = Pose::new(self.samples[self.sample_index], face.rotation());
        target.set_pose(&pose);
        target.render_now();

        // Read the pose back: the host may snap or clamp what was requested.
        let world_from_eye = self.converter.to_target_space(&target.pose().to_matrix());
        let image_name = self.current_image_name();
        debug!(
            "Rendering {face} at sample {} ({:?}) into {image_name}",
            self.sample_index, pose.location
        );

        self.current_group.views.push(View {
            projective_camera: ProjectiveCamera::square(
                self.setup.resolution,
                self.setup.clip_from_eye,
                self.reference_from_world * world_from_eye,
            ),
            depth_image_file: DepthImageFile::packed_rgba(&image_name),
        });
    }

    fn write_current_face<T>(&mut self, target: &mut T, images: &mut dyn ImageWriter)
    where
        T: CaptureTarget + ?Sized,
    {
        let path = self.setup.output_dir.join(self.current_image_name());
        let written = target.read_back().and_then(|readback| {
            readback.validate()?;
            images.write_image(&readback, &path)
        });
        match written {
            Ok(()) => debug!("Wrote {}", path.display()),
            // A failed image leaves a hole on disk but the manifest still
            // references it; the session carries on.
            Err(e) => error!("Failed to write {}: {e}", path.display()),
        }
    }

    fn advance(&mut self) {
        self.views_completed += 1;
        self.face_index += 1;
        if self.face_index < self.faces.len() {
            self.frames_until_next_action = self.setup.frame_budget;
            self.state = CaptureState::AdvancingFace;
            return;
        }

        let group = std::mem::take(&mut self.current_group);
        self.manifest.view_groups.push(group);
        self.face_index = 0;
        self.sample_index += 1;

        if self.sample_index < self.samples.len() {
            self.frames_until_next_action = self.setup.frame_budget;
            self.state = CaptureState::AdvancingSample;
        } else {
            self.frames_until_next_action = 0;
            self.state = CaptureState::Done;
            info!(
                "Capture finished: {} view groups, {} views",
                self.manifest.view_groups.len(),
                self.manifest.view_count()
            );
        }
    }
}
