//! Shared fakes for the capture integration tests.
//!
//! Every fake is a cheap handle around shared state so a test can keep one
//! copy for assertions while the orchestrator owns the other.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use seurat_capture::camera::{CaptureError, CaptureSettings, Pose};
use seurat_capture::capture::{
    CaptureTarget, HostEnvironment, HostMode, ImageWriter, ManifestStore, Readback,
};

#[derive(Debug, Default)]
pub struct TargetState {
    pub valid: bool,
    pub pose: Pose,
    pub resolution: Option<u32>,
    pub renders: Vec<Pose>,
    pub readbacks: usize,
    pub pose_history: Vec<Pose>,
}

#[derive(Clone)]
pub struct FakeTarget {
    pub state: Rc<RefCell<TargetState>>,
    pub settings: CaptureSettings,
}

impl FakeTarget {
    pub fn new(pose: Pose, settings: CaptureSettings) -> Self {
        Self {
            state: Rc::new(RefCell::new(TargetState {
                valid: true,
                pose,
                ..TargetState::default()
            })),
            settings,
        }
    }

    pub fn invalidate(&self) {
        self.state.borrow_mut().valid = false;
    }
}

impl CaptureTarget for FakeTarget {
    fn is_valid(&self) -> bool {
        self.state.borrow().valid
    }

    fn settings(&self) -> CaptureSettings {
        self.settings.clone()
    }

    fn pose(&self) -> Pose {
        self.state.borrow().pose
    }

    fn set_pose(&mut self, pose: &Pose) {
        let mut state = self.state.borrow_mut();
        state.pose = *pose;
        state.pose_history.push(*pose);
    }

    fn acquire_render_target(&mut self, resolution: u32) {
        self.state.borrow_mut().resolution = Some(resolution);
    }

    fn release_render_target(&mut self) {
        self.state.borrow_mut().resolution = None;
    }

    fn render_now(&mut self) {
        let mut state = self.state.borrow_mut();
        let pose = state.pose;
        state.renders.push(pose);
    }

    fn read_back(&mut self) -> Result<Readback, CaptureError> {
        let mut state = self.state.borrow_mut();
        state.readbacks += 1;
        let size = state.resolution.unwrap_or(1).min(4);
        Ok(Readback {
            width: size,
            height: size,
            pixels: vec![[0.5, 0.5, 0.5, 100.0]; (size * size) as usize],
        })
    }
}

#[derive(Debug)]
pub struct HostState {
    pub mode: HostMode,
    pub near_clip: f64,
    pub realtime: bool,
    pub game_paused: bool,
    pub pause_succeeds: bool,
    pub performance_monitoring: bool,
}

impl Default for HostState {
    fn default() -> Self {
        Self {
            mode: HostMode::Editor,
            near_clip: 10.0,
            realtime: true,
            game_paused: false,
            pause_succeeds: true,
            performance_monitoring: true,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeHost {
    pub state: Rc<RefCell<HostState>>,
}

impl FakeHost {
    pub fn with_mode(mode: HostMode) -> Self {
        let host = Self::default();
        host.state.borrow_mut().mode = mode;
        host
    }
}

impl HostEnvironment for FakeHost {
    fn mode(&self) -> HostMode {
        self.state.borrow().mode
    }

    fn near_clip_plane(&self) -> f64 {
        self.state.borrow().near_clip
    }

    fn is_realtime(&self) -> bool {
        self.state.borrow().realtime
    }

    fn set_realtime(&mut self, realtime: bool) {
        self.state.borrow_mut().realtime = realtime;
    }

    fn is_game_paused(&self) -> bool {
        self.state.borrow().game_paused
    }

    fn set_game_paused(&mut self, paused: bool) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.pause_succeeds {
            return false;
        }
        state.game_paused = paused;
        true
    }

    fn performance_monitoring(&self) -> bool {
        self.state.borrow().performance_monitoring
    }

    fn set_performance_monitoring(&mut self, enabled: bool) {
        self.state.borrow_mut().performance_monitoring = enabled;
    }
}

#[derive(Debug, Clone)]
pub struct SavedText {
    pub dir: PathBuf,
    pub file_name: String,
    pub text: String,
    pub allow_overwrite: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    pub saved: Rc<RefCell<Vec<SavedText>>>,
    pub fail: bool,
}

impl ManifestStore for MemoryStore {
    fn save_text(
        &mut self,
        dir: &Path,
        file_name: &str,
        text: &str,
        allow_overwrite: bool,
    ) -> Result<(), CaptureError> {
        if self.fail {
            return Err(CaptureError::DirectoryCreateFailed(dir.display().to_string()));
        }
        self.saved.borrow_mut().push(SavedText {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
            text: text.to_string(),
            allow_overwrite,
        });
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingImages {
    pub paths: Rc<RefCell<Vec<PathBuf>>>,
}

impl ImageWriter for RecordingImages {
    fn write_image(&mut self, _readback: &Readback, path: &Path) -> Result<(), CaptureError> {
        self.paths.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
