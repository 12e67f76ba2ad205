//! Headless Seurat Capture Driver
//!
//! Runs the full capture sequence without an engine: a synthetic camera
//! "renders" a flat backdrop, and the tool writes the per-face EXR images and
//! `manifest.json` exactly as an in-editor capture would. Useful for checking
//! sample layouts and manifest output before spending GPU time.
//!
//! Usage:
//!   cargo run --bin seurat_capture -- -s samples/capture_settings.yaml -o output/capture
//!   cargo run --bin seurat_capture -- --location 0 0 170 --yaw 45 --manifest-only

use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;
use nalgebra::Point3;
use seurat_capture::camera::{CaptureError, CaptureSettings, Pose, Rotator};
use seurat_capture::capture::{
    CaptureOrchestrator, CaptureState, CaptureTarget, ExrImageWriter, FileSystemStore,
    HostEnvironment, HostMode, ImageWriter, Readback,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a headless Seurat capture")]
struct Cli {
    /// Capture settings YAML file (defaults are used when omitted)
    #[arg(short = 's', long)]
    settings: Option<PathBuf>,

    /// Output directory for images and manifest
    #[arg(short = 'o', long, default_value = "output/seurat_capture")]
    output: PathBuf,

    /// Reference camera location in host units (x y z)
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [0.0, 0.0, 0.0], allow_negative_numbers = true)]
    location: Vec<f64>,

    /// Reference camera yaw in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    yaw: f64,

    /// Reference camera pitch in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pitch: f64,

    /// Near clipping plane distance in host units
    #[arg(long, default_value_t = 10.0)]
    near_clip: f64,

    /// Distance of the synthetic backdrop written to the depth channel
    #[arg(long, default_value_t = 1000.0)]
    backdrop_distance: f32,

    /// Only write the manifest, skip image files
    #[arg(long)]
    manifest_only: bool,
}

/// Camera whose renders complete instantly and show a flat gray backdrop.
struct HeadlessCamera {
    settings: CaptureSettings,
    pose: Pose,
    resolution: u32,
    backdrop_distance: f32,
}

impl CaptureTarget for HeadlessCamera {
    fn is_valid(&self) -> bool {
        true
    }

    fn settings(&self) -> CaptureSettings {
        self.settings.clone()
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: &Pose) {
        self.pose = *pose;
    }

    fn acquire_render_target(&mut self, resolution: u32) {
        self.resolution = resolution;
    }

    fn release_render_target(&mut self) {
        self.resolution = 0;
    }

    fn render_now(&mut self) {}

    fn read_back(&mut self) -> Result<Readback, CaptureError> {
        let count = self.resolution as usize * self.resolution as usize;
        Ok(Readback {
            width: self.resolution,
            height: self.resolution,
            pixels: vec![[0.18, 0.18, 0.18, self.backdrop_distance]; count],
        })
    }
}

/// Editor host with time already frozen.
struct HeadlessHost {
    near_clip: f64,
    realtime: bool,
    performance_monitoring: bool,
}

impl HostEnvironment for HeadlessHost {
    fn mode(&self) -> HostMode {
        HostMode::Editor
    }

    fn near_clip_plane(&self) -> f64 {
        self.near_clip
    }

    fn is_realtime(&self) -> bool {
        self.realtime
    }

    fn set_realtime(&mut self, realtime: bool) {
        self.realtime = realtime;
    }

    fn is_game_paused(&self) -> bool {
        true
    }

    fn set_game_paused(&mut self, _paused: bool) -> bool {
        true
    }

    fn performance_monitoring(&self) -> bool {
        self.performance_monitoring
    }

    fn set_performance_monitoring(&mut self, enabled: bool) {
        self.performance_monitoring = enabled;
    }
}

struct SkipImages;

impl ImageWriter for SkipImages {
    fn write_image(&mut self, _readback: &Readback, _path: &Path) -> Result<(), CaptureError> {
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => {
            let path = path.to_str().ok_or("settings path is not valid UTF-8")?;
            CaptureSettings::load_from_yaml(path)?
        }
        None => CaptureSettings::default(),
    };

    println!("🎥 Seurat Headless Capture");
    println!("==========================");
    println!(
        "Headbox: {:?}, samples: {}, resolution: {}px",
        settings.headbox_size.as_slice(),
        settings.samples_per_face.count(),
        settings.resolution.pixels()
    );

    let camera = HeadlessCamera {
        settings,
        pose: Pose::new(
            Point3::new(cli.location[0], cli.location[1], cli.location[2]),
            Rotator::new(cli.pitch, cli.yaw, 0.0),
        ),
        resolution: 0,
        backdrop_distance: cli.backdrop_distance,
    };
    let host = HeadlessHost {
        near_clip: cli.near_clip,
        realtime: true,
        performance_monitoring: true,
    };
    let images: Box<dyn ImageWriter> = if cli.manifest_only {
        Box::new(SkipImages)
    } else {
        Box::new(ExrImageWriter)
    };

    let mut orchestrator = CaptureOrchestrator::new(
        Box::new(host),
        Box::new(FileSystemStore),
        images,
        cli.output.clone(),
    );
    orchestrator.begin(camera)?;

    let mut frames = 0_u64;
    let mut last_reported = 0;
    loop {
        let state = orchestrator.tick(1.0 / 60.0);
        frames += 1;
        if let Some((done, total)) = orchestrator.progress() {
            if done != last_reported {
                last_reported = done;
                info!("{done}/{total} views written");
            }
        }
        match state {
            CaptureState::Done => break,
            CaptureState::Cancelled => return Err("capture was cancelled".into()),
            _ => {}
        }
    }

    println!("✓ Captured in {frames} frames");
    println!(
        "✓ Manifest: {}",
        cli.output.join(seurat_capture::capture::MANIFEST_FILE_NAME).display()
    );
    Ok(())
}
