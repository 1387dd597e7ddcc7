//! Configuration management for the head pose amplitude application

use crate::{
    constants::{
        DEFAULT_CAPTURE_QUEUE_DEPTH, DEFAULT_DROPOUT_PROBABILITY, DEFAULT_FPS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
        DEFAULT_NOD_AMPLITUDE, DEFAULT_NOD_FREQUENCY, DEFAULT_NOISE_LEVEL, DEFAULT_TICK_PERIOD_MS,
        DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH, DEFAULT_WINDOW_CAPACITY,
    },
    overlay::PreviewGeometry,
    source::frame_interval,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sample window configuration
    pub window: WindowConfig,

    /// Amplitude evaluator configuration
    pub evaluator: EvaluatorConfig,

    /// Capture-to-evaluator hand-off configuration
    pub capture: CaptureConfig,

    /// Measurement source configuration
    pub source: SourceConfig,

    /// Preview geometry for the overlay
    pub preview: PreviewConfig,
}

/// Sample window parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Number of most recent pitch samples kept
    pub capacity: usize,
}

/// Evaluator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Milliseconds between two amplitude evaluations
    pub tick_period_ms: u64,
}

/// Capture queue parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Detections allowed to wait for the evaluator before new ones are dropped
    pub queue_depth: usize,

    /// Discard new detections while the queue is full instead of waiting
    pub drop_late_frames: bool,
}

/// Measurement source selection and tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source type: "synthetic" or "replay"
    pub kind: String,

    /// Recorded detections, required by the replay source
    pub replay_path: Option<PathBuf>,

    /// Frame delivery rate
    pub fps: f64,

    /// Sleep between frames to emulate a live camera
    pub paced: bool,

    /// Peak pitch of the synthetic nod
    pub nod_amplitude: f64,

    /// Nods per second
    pub nod_frequency: f64,

    /// Uniform noise added to every synthetic angle
    pub noise_level: f64,

    /// Probability that a synthetic frame has no face
    pub dropout_probability: f64,

    /// Fixed RNG seed for reproducible synthetic streams
    pub seed: Option<u64>,

    /// Stop after this many frames (unbounded when absent)
    pub max_frames: Option<u64>,
}

/// Preview dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub view_width: f64,
    pub view_height: f64,
    pub frame_width: f64,
    pub frame_height: f64,
    /// Mirror the overlay horizontally (front camera)
    pub mirrored: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_CAPTURE_QUEUE_DEPTH,
            drop_late_frames: true,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: "synthetic".to_string(),
            replay_path: None,
            fps: DEFAULT_FPS,
            paced: true,
            nod_amplitude: DEFAULT_NOD_AMPLITUDE,
            nod_frequency: DEFAULT_NOD_FREQUENCY,
            noise_level: DEFAULT_NOISE_LEVEL,
            dropout_probability: DEFAULT_DROPOUT_PROBABILITY,
            seed: None,
            max_frames: None,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            view_width: DEFAULT_VIEW_WIDTH,
            view_height: DEFAULT_VIEW_HEIGHT,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            mirrored: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Evaluator tick period
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.evaluator.tick_period_ms)
    }

    /// Preview geometry for the overlay
    pub fn preview_geometry(&self) -> Result<PreviewGeometry> {
        PreviewGeometry::new(
            self.preview.view_width,
            self.preview.view_height,
            self.preview.frame_width,
            self.preview.frame_height,
            self.preview.mirrored,
        )
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.window.capacity == 0 {
            return Err(Error::ConfigError(
                "Window capacity must be greater than 0".to_string(),
            ));
        }
        if self.evaluator.tick_period_ms == 0 {
            return Err(Error::ConfigError(
                "Evaluator tick period must be greater than 0".to_string(),
            ));
        }
        if self.capture.queue_depth == 0 {
            return Err(Error::ConfigError(
                "Capture queue depth must be greater than 0".to_string(),
            ));
        }

        // Validate source parameters
        frame_interval(self.source.fps).map_err(|e| Error::ConfigError(format!("Source FPS: {e}")))?;
        if !(0.0..=1.0).contains(&self.source.dropout_probability) {
            return Err(Error::ConfigError(
                "Dropout probability must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !self.source.noise_level.is_finite() || self.source.noise_level < 0.0 {
            return Err(Error::ConfigError("Noise level must be non-negative".to_string()));
        }
        if !self.source.nod_amplitude.is_finite() || !self.source.nod_frequency.is_finite() {
            return Err(Error::ConfigError("Nod amplitude and frequency must be finite".to_string()));
        }
        match self.source.kind.to_lowercase().as_str() {
            "synthetic" => {}
            "replay" => match &self.source.replay_path {
                Some(path) if path.exists() => {}
                Some(path) => {
                    return Err(Error::ConfigError(format!(
                        "Replay file not found: {}",
                        path.display()
                    )))
                }
                None => {
                    return Err(Error::ConfigError(
                        "Replay source requires a replay_path".to_string(),
                    ))
                }
            },
            other => {
                return Err(Error::ConfigError(format!("Unknown source kind: {other}")));
            }
        }

        self.preview_geometry()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Head Pose Amplitude Configuration

# Pitch samples kept for the amplitude
window:
  capacity: 5

# Amplitude evaluation cadence
evaluator:
  tick_period_ms: 300

# Detections waiting for the evaluator before late frames are dropped
capture:
  queue_depth: 4
  drop_late_frames: true

# Measurement source ("synthetic" or "replay")
source:
  kind: "synthetic"
  replay_path: null
  fps: 30.0
  paced: true
  nod_amplitude: 0.35
  nod_frequency: 0.5
  noise_level: 0.02
  dropout_probability: 0.05
  seed: null
  max_frames: null

# Preview geometry (points)
preview:
  view_width: 390.0
  view_height: 844.0
  frame_width: 720.0
  frame_height: 1280.0
  mirrored: true
"#;
