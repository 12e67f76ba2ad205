//! Host-facing capture driver.
//!
//! [`CaptureOrchestrator`] holds the single active capture session. It checks
//! that the host can freeze time, saves and restores the camera pose and the
//! host's global toggles around the session, feeds the session one tick per
//! host frame and hands the finished manifest to the [`ManifestStore`].

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use super::session::{CaptureSession, CaptureState, ViewSetup};
use super::{CaptureTarget, HostEnvironment, HostMode, ImageWriter, ManifestStore};
use crate::camera::{build_clip_matrix, CaptureError, CoordinateConverter, CubeFace, Pose};
use crate::util::generate_headbox_samples;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const IMAGE_EXTENSION: &str = "exr";

/// Host state changed by a capture that has to be put back afterwards.
#[derive(Debug, Clone, Copy)]
struct HostRestore {
    mode: HostMode,
    realtime: bool,
    game_paused: bool,
    performance_monitoring: bool,
}

struct ActiveCapture<T> {
    target: T,
    session: CaptureSession,
    initial_pose: Pose,
    restore: HostRestore,
}

pub struct CaptureOrchestrator<T: CaptureTarget> {
    host: Box<dyn HostEnvironment>,
    store: Box<dyn ManifestStore>,
    images: Box<dyn ImageWriter>,
    output_dir: PathBuf,
    faces: Vec<CubeFace>,
    converter: CoordinateConverter,
    active: Option<ActiveCapture<T>>,
}

impl<T: CaptureTarget> CaptureOrchestrator<T> {
    pub fn new(
        host: Box<dyn HostEnvironment>,
        store: Box<dyn ManifestStore>,
        images: Box<dyn ImageWriter>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host,
            store,
            images,
            output_dir: output_dir.into(),
            faces: CubeFace::ALL.to_vec(),
            converter: CoordinateConverter::new(),
            active: None,
        }
    }

    /// Restricts capture to a subset of faces, kept in the given order.
    pub fn with_faces(mut self, faces: Vec<CubeFace>) -> Self {
        self.faces = faces;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> CaptureState {
        self.active
            .as_ref()
            .map_or(CaptureState::Idle, |active| active.session.state())
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.active.as_ref().map(|active| &active.session)
    }

    /// Views written so far and the session total, if a capture is running.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.session().map(CaptureSession::progress)
    }

    /// Starts capturing from `target`'s current pose.
    ///
    /// Rejected without touching any state if a capture is already running,
    /// the host is not in a mode where time can be frozen, or the target is
    /// already gone.
    pub fn begin(&mut self, mut target: T) -> Result<(), CaptureError> {
        if self.active.is_some() {
            warn!("Please wait for the current capture to finish before starting another");
            return Err(CaptureError::CaptureAlreadyInProgress);
        }

        let mode = self.host.mode();
        if mode == HostMode::Other {
            error!("Capture only runs in Editor or Play-In-Editor mode");
            return Err(CaptureError::InvalidHostMode);
        }

        if !target.is_valid() {
            error!("{}. Select a capture camera before starting.", CaptureError::TargetLost);
            return Err(CaptureError::TargetLost);
        }

        let settings = target.settings();
        settings.validate()?;

        let initial_pose = target.pose();
        let box_to_world = initial_pose.to_matrix();
        let samples = generate_headbox_samples(
            &settings.headbox_size,
            settings.samples_per_face.count(),
            &initial_pose.location,
            &box_to_world,
        );

        let resolution = settings.resolution.pixels();
        let setup = ViewSetup {
            resolution,
            clip_from_eye: build_clip_matrix(self.host.near_clip_plane()),
            world_from_reference: self.converter.to_target_space(&box_to_world),
            output_dir: self.output_dir.clone(),
            image_extension: IMAGE_EXTENSION.to_string(),
            frame_budget: settings.frame_budget,
        };
        let session = CaptureSession::begin(samples, self.faces.clone(), setup)?;

        let restore = self.freeze_host(mode);
        target.acquire_render_target(resolution);

        info!(
            "Capture started at {:?}: {} samples, {resolution}px, output {}",
            initial_pose.location,
            session.samples().len(),
            self.output_dir.display()
        );

        self.active = Some(ActiveCapture {
            target,
            session,
            initial_pose,
            restore,
        });
        Ok(())
    }

    /// Cancels the running capture if its target is gone. Returns whether a
    /// capture was cancelled.
    pub fn cancel_if_target_invalid(&mut self) -> bool {
        let lost = self
            .active
            .as_ref()
            .is_some_and(|active| !active.target.is_valid());
        if !lost {
            return false;
        }
        if let Some(mut active) = self.active.take() {
            active.session.cancel();
            self.abandon(active);
        }
        true
    }

    /// Advances the running capture by one host frame.
    pub fn tick(&mut self, _delta_seconds: f64) -> CaptureState {
        let Some(active) = self.active.as_mut() else {
            return CaptureState::Idle;
        };

        let state = active
            .session
            .tick(&mut active.target, self.images.as_mut());

        match state {
            CaptureState::Done => {
                if let Some(active) = self.active.take() {
                    self.finish(active);
                }
            }
            CaptureState::Cancelled => {
                if let Some(active) = self.active.take() {
                    self.abandon(active);
                }
            }
            _ => {}
        }
        state
    }

    fn finish(&mut self, active: ActiveCapture<T>) {
        let ActiveCapture {
            mut target,
            session,
            initial_pose,
            restore,
        } = active;

        let manifest = session.into_manifest();
        let saved = manifest.to_json_string().and_then(|json| {
            self.store
                .save_text(&self.output_dir, MANIFEST_FILE_NAME, &json, true)
        });
        if let Err(e) = saved {
            error!("Saving manifest failed: {e}");
        }

        target.set_pose(&initial_pose);
        target.release_render_target();
        self.restore_host(restore);
        info!("Scene captured");
    }

    fn abandon(&mut self, active: ActiveCapture<T>) {
        let ActiveCapture {
            mut target,
            initial_pose,
            restore,
            ..
        } = active;

        error!(
            "{}. Don't modify the scene while capturing.",
            CaptureError::TargetLost
        );
        if target.is_valid() {
            target.set_pose(&initial_pose);
            target.release_render_target();
        }
        self.restore_host(restore);
    }

    /// Stops time and quality scaling for the duration of the capture. Only
    /// what is actually changed is recorded for restoring.
    fn freeze_host(&mut self, mode: HostMode) -> HostRestore {
        let performance_monitoring = self.host.performance_monitoring();
        self.host.set_performance_monitoring(false);

        let mut restore = HostRestore {
            mode,
            realtime: false,
            game_paused: false,
            performance_monitoring,
        };

        match mode {
            HostMode::Editor => {
                if self.host.is_realtime() {
                    self.host.set_realtime(false);
                    restore.realtime = true;
                }
            }
            HostMode::PlayInEditor => {
                if !self.host.is_game_paused() {
                    restore.game_paused = true;
                    if !self.host.set_game_paused(true) {
                        error!(
                            "Capture cannot pause the game. Please pause the game manually before capture."
                        );
                    }
                }
            }
            HostMode::Other => {}
        }
        restore
    }

    fn restore_host(&mut self, restore: HostRestore) {
        if restore.realtime && restore.mode == HostMode::Editor {
            self.host.set_realtime(true);
        } else if restore.game_paused && restore.mode == HostMode::PlayInEditor {
            self.host.set_game_paused(false);
        }
        self.host
            .set_performance_monitoring(restore.performance_monitoring);
    }
}
