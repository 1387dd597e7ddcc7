//! Measurement sources feeding the tracking session.
//!
//! A source stands in for the camera plus face detector: every call yields the
//! detection for one frame. Two software sources are provided, a synthetic
//! nodding head and a replay of recorded detections.

use crate::{
    config::SourceConfig,
    constants::MIN_SOURCE_FPS,
    observation::{Detection, FaceObservation, NormalizedRect},
    shutdown::StopSignal,
    Error, Result,
};
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::TAU,
    path::Path,
    time::{Duration, Instant},
};

/// Producer of per-frame detections
pub trait MeasurementSource: Send {
    /// Detection for the next frame, or `None` once the stream has ended
    fn next_detection(&mut self) -> Result<Option<Detection>>;

    /// Get source name
    fn name(&self) -> &str;

    /// Signal that cuts short any wait for the next frame
    ///
    /// After the signal fires, a paced source returns `Ok(None)` instead of
    /// sleeping out the rest of its frame interval.
    fn attach_stop(&mut self, _stop: StopSignal) {}
}

/// Time between frames delivered at `fps`
///
/// # Errors
///
/// Returns an error if `fps` is not finite or below [`MIN_SOURCE_FPS`]
pub fn frame_interval(fps: f64) -> Result<Duration> {
    if !fps.is_finite() || fps < MIN_SOURCE_FPS {
        return Err(Error::InvalidInput(format!(
            "Frame rate must be at least {MIN_SOURCE_FPS}, got {fps}"
        )));
    }

    Duration::try_from_secs_f64(1.0 / fps)
        .map_err(|e| Error::InvalidInput(format!("Frame rate {fps} has no representable interval: {e}")))
}

/// Create a measurement source from configuration
pub fn create_source(config: &SourceConfig) -> Result<Box<dyn MeasurementSource>> {
    match config.kind.to_lowercase().as_str() {
        "synthetic" => Ok(Box::new(SyntheticSource::from_config(config)?)),
        "replay" => {
            let path = config
                .replay_path
                .as_ref()
                .ok_or_else(|| Error::SourceError("Replay source requires a replay_path".to_string()))?;
            let source = ReplaySource::from_file(path)?;
            Ok(Box::new(source.with_rate(config.fps, config.paced)?.with_max_frames(config.max_frames)))
        }
        _ => Err(Error::SourceError(format!("Unknown source kind: {}", config.kind))),
    }
}

/// Keeps frame delivery on a fixed cadence when pacing is enabled
#[derive(Debug)]
struct FramePacer {
    interval: Duration,
    next_frame: Option<Instant>,
    paced: bool,
    stop: StopSignal,
}

impl FramePacer {
    fn new(fps: f64, paced: bool) -> Result<Self> {
        Ok(Self {
            interval: frame_interval(fps)?,
            next_frame: None,
            paced,
            stop: StopSignal::new(),
        })
    }

    /// Wait for the next frame slot; false if the stop signal fired instead
    fn wait(&mut self) -> bool {
        if self.stop.is_triggered() {
            return false;
        }
        if !self.paced {
            return true;
        }

        let now = Instant::now();
        let due = self.next_frame.unwrap_or(now);
        if due > now && self.stop.wait_timeout(due - now) {
            return false;
        }
        // A slow consumer resets the cadence rather than bursting to catch up
        let base = if due + self.interval < now { now } else { due };
        self.next_frame = Some(base + self.interval);
        true
    }
}

/// Nodding head: pitch follows a sine wave with uniform noise and face dropouts
pub struct SyntheticSource {
    rng: StdRng,
    pacer: FramePacer,
    frame: u64,
    fps: f64,
    nod_amplitude: f64,
    nod_frequency: f64,
    noise_level: f64,
    dropout_probability: f64,
    max_frames: Option<u64>,
}

impl SyntheticSource {
    /// Create a synthetic source from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the frame rate, noise level or dropout probability is out of range
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.dropout_probability) {
            return Err(Error::InvalidInput(format!(
                "Dropout probability must be in [0, 1], got {}",
                config.dropout_probability
            )));
        }
        if !config.noise_level.is_finite() || config.noise_level < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Noise level must be non-negative, got {}",
                config.noise_level
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "Synthetic source: {:.1} fps, nod amplitude {:.3}, frequency {:.2} Hz",
            config.fps, config.nod_amplitude, config.nod_frequency
        );

        Ok(Self {
            rng,
            pacer: FramePacer::new(config.fps, config.paced)?,
            frame: 0,
            fps: config.fps,
            nod_amplitude: config.nod_amplitude,
            nod_frequency: config.nod_frequency,
            noise_level: config.noise_level,
            dropout_probability: config.dropout_probability,
            max_frames: config.max_frames,
        })
    }

    fn noise(&mut self) -> f64 {
        if self.noise_level == 0.0 {
            0.0
        } else {
            self.rng.gen_range(-self.noise_level..=self.noise_level)
        }
    }

    /// Pitch of the noiseless nod at frame `frame`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ideal_pitch(&self, frame: u64) -> f64 {
        let t = frame as f64 / self.fps;
        self.nod_amplitude * (TAU * self.nod_frequency * t).sin()
    }
}

impl MeasurementSource for SyntheticSource {
    #[allow(clippy::cast_precision_loss)]
    fn next_detection(&mut self) -> Result<Option<Detection>> {
        if self.max_frames.is_some_and(|max| self.frame >= max) {
            return Ok(None);
        }

        if !self.pacer.wait() {
            return Ok(None);
        }
        let frame = self.frame;
        self.frame += 1;

        if self.dropout_probability > 0.0 && self.rng.gen_bool(self.dropout_probability) {
            debug!("Synthetic frame {} has no face", frame);
            return Ok(Some(Detection::NoFace));
        }

        let pitch = self.ideal_pitch(frame) + self.noise();
        let t = frame as f64 / self.fps;
        let yaw = 0.1 * (TAU * self.nod_frequency * 0.5 * t).cos() + self.noise();
        let roll = self.noise();

        // Face drifts vertically with the nod
        let y = (0.35 - 0.1 * pitch).clamp(0.0, 0.6);
        let bbox = NormalizedRect::new(0.3, y, 0.4, 0.4);

        Ok(Some(Detection::Face(FaceObservation::new(bbox).with_angles(roll, yaw, pitch))))
    }

    fn name(&self) -> &str {
        "synthetic"
    }

    fn attach_stop(&mut self, stop: StopSignal) {
        self.pacer.stop = stop;
    }
}

/// One recorded frame; a missing face means the detector found nothing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub face: Option<FaceObservation>,
}

impl From<RecordedFrame> for Detection {
    fn from(frame: RecordedFrame) -> Self {
        frame.face.map_or(Self::NoFace, Self::Face)
    }
}

impl From<&Detection> for RecordedFrame {
    fn from(detection: &Detection) -> Self {
        match detection {
            Detection::Face(face) => Self { face: Some(*face) },
            Detection::NoFace => Self { face: None },
        }
    }
}

/// Replays detections recorded in a YAML file
pub struct ReplaySource {
    frames: std::vec::IntoIter<Detection>,
    pacer: Option<FramePacer>,
    remaining: Option<u64>,
    stop: StopSignal,
}

impl ReplaySource {
    /// Build an unpaced replay from in-memory detections
    #[must_use]
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            frames: detections.into_iter(),
            pacer: None,
            remaining: None,
            stop: StopSignal::new(),
        }
    }

    /// Load a recording from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        let source = Self::from_yaml(&content)?;
        info!("Loaded {} recorded frames from {}", source.frames.len(), path.display());
        Ok(source)
    }

    /// Parse a recording: a YAML sequence of `{ face: ... }` entries
    pub fn from_yaml(content: &str) -> Result<Self> {
        let frames: Vec<RecordedFrame> = serde_yaml::from_str(content)
            .map_err(|e| Error::ReplayFormatError(format!("Failed to parse recording: {}", e)))?;

        for (index, frame) in frames.iter().enumerate() {
            if let Some(face) = &frame.face {
                face.bounding_box
                    .validate()
                    .map_err(|e| Error::ReplayFormatError(format!("Frame {index}: {e}")))?;
            }
        }

        Ok(Self::new(frames.into_iter().map(Detection::from).collect()))
    }

    /// Write detections in the format read by [`ReplaySource::from_file`]
    pub fn write_recording<P: AsRef<Path>>(path: P, detections: &[Detection]) -> Result<()> {
        let frames: Vec<RecordedFrame> = detections.iter().map(RecordedFrame::from).collect();
        let content = serde_yaml::to_string(&frames)
            .map_err(|e| Error::ReplayFormatError(format!("Failed to serialize recording: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Deliver frames at `fps`, sleeping between them when `paced`
    pub fn with_rate(mut self, fps: f64, paced: bool) -> Result<Self> {
        let mut pacer = FramePacer::new(fps, paced)?;
        pacer.stop = self.stop.clone();
        self.pacer = Some(pacer);
        Ok(self)
    }

    #[must_use]
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.remaining = max_frames;
        self
    }

    /// Frames not yet delivered
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl MeasurementSource for ReplaySource {
    fn next_detection(&mut self) -> Result<Option<Detection>> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }

        if self.stop.is_triggered() || self.frames.as_slice().is_empty() {
            return Ok(None);
        }
        if let Some(pacer) = self.pacer.as_mut() {
            if !pacer.wait() {
                return Ok(None);
            }
        }
        let Some(detection) = self.frames.next() else {
            return Ok(None);
        };

        Ok(Some(detection))
    }

    fn name(&self) -> &str {
        "replay"
    }

    fn attach_stop(&mut self, stop: StopSignal) {
        if let Some(pacer) = self.pacer.as_mut() {
            pacer.stop = stop.clone();
        }
        self.stop = stop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unpaced_config(seed: u64) -> SourceConfig {
        SourceConfig {
            paced: false,
            seed: Some(seed),
            max_frames: Some(60),
            ..SourceConfig::default()
        }
    }

    fn drain(source: &mut dyn MeasurementSource) -> Vec<Detection> {
        let mut detections = Vec::new();
        while let Some(detection) = source.next_detection().unwrap() {
            detections.push(detection);
        }
        detections
    }

    #[test]
    fn test_synthetic_respects_max_frames() {
        let mut source = SyntheticSource::from_config(&unpaced_config(7)).unwrap();
        assert_eq!(drain(&mut source).len(), 60);
        assert!(source.next_detection().unwrap().is_none());
    }

    #[test]
    fn test_synthetic_is_reproducible_with_seed() {
        let mut a = SyntheticSource::from_config(&unpaced_config(42)).unwrap();
        let mut b = SyntheticSource::from_config(&unpaced_config(42)).unwrap();
        assert_eq!(drain(&mut a), drain(&mut b));
    }

    #[test]
    fn test_synthetic_pitch_bounded_by_nod_and_noise() {
        let config = SourceConfig {
            dropout_probability: 0.0,
            ..unpaced_config(3)
        };
        let bound = config.nod_amplitude + config.noise_level;
        let mut source = SyntheticSource::from_config(&config).unwrap();

        for detection in drain(&mut source) {
            let pitch = detection.pitch().expect("dropouts disabled");
            assert!(pitch.abs() <= bound + 1e-12);
            if let Detection::Face(face) = detection {
                assert!(face.bounding_box.validate().is_ok());
            }
        }
    }

    #[test]
    fn test_synthetic_full_dropout() {
        let config = SourceConfig {
            dropout_probability: 1.0,
            ..unpaced_config(5)
        };
        let mut source = SyntheticSource::from_config(&config).unwrap();
        assert!(drain(&mut source).iter().all(|d| *d == Detection::NoFace));
    }

    #[test]
    fn test_synthetic_rejects_bad_parameters() {
        let mut config = unpaced_config(1);
        config.fps = 0.0;
        assert!(SyntheticSource::from_config(&config).is_err());

        let mut config = unpaced_config(1);
        config.dropout_probability = -0.5;
        assert!(SyntheticSource::from_config(&config).is_err());
    }

    #[test]
    fn test_replay_from_yaml() {
        let yaml = r#"
- face:
    bounding_box: { x: 0.2, y: 0.3, width: 0.4, height: 0.4 }
    roll: 0.0
    yaw: 0.1
    pitch: 0.25
- {}
- face:
    bounding_box: { x: 0.2, y: 0.3, width: 0.4, height: 0.4 }
"#;
        let mut source = ReplaySource::from_yaml(yaml).unwrap();
        assert_eq!(source.remaining(), 3);

        let detections = drain(&mut source);
        assert_eq!(detections[0].pitch(), Some(0.25));
        assert_eq!(detections[1], Detection::NoFace);
        assert_eq!(detections[2].pitch(), None);
        assert!(matches!(detections[2], Detection::Face(_)));
    }

    #[test]
    fn test_replay_rejects_out_of_frame_box() {
        let yaml = "- face:\n    bounding_box: { x: 0.9, y: 0.3, width: 0.4, height: 0.4 }\n";
        assert!(matches!(
            ReplaySource::from_yaml(yaml),
            Err(Error::ReplayFormatError(_))
        ));
    }

    #[test]
    fn test_replay_max_frames() {
        let detections = vec![Detection::NoFace; 10];
        let mut source = ReplaySource::new(detections).with_max_frames(Some(4));
        assert_eq!(drain(&mut source).len(), 4);
    }

    #[test]
    fn test_frame_interval_bounds() {
        assert_eq!(frame_interval(4.0).unwrap(), Duration::from_millis(250));
        assert!(frame_interval(MIN_SOURCE_FPS).is_ok());

        for fps in [1e-300, 0.0, -30.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(frame_interval(fps), Err(Error::InvalidInput(_))), "fps {fps}");
        }
    }

    #[test]
    fn test_tiny_frame_rate_rejected_without_panic() {
        let mut config = unpaced_config(1);
        config.fps = 1e-300;
        assert!(SyntheticSource::from_config(&config).is_err());
        assert!(ReplaySource::new(Vec::new()).with_rate(1e-300, true).is_err());
        assert!(create_source(&config).is_err());
    }

    #[test]
    fn test_stop_interrupts_paced_replay() {
        let stop = StopSignal::new();
        let mut source = ReplaySource::new(vec![Detection::NoFace; 3]).with_rate(0.2, true).unwrap();
        source.attach_stop(stop.clone());

        assert_eq!(source.next_detection().unwrap(), Some(Detection::NoFace));

        let trigger = {
            let stop = stop.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                stop.trigger();
            })
        };
        let started = Instant::now();
        assert_eq!(source.next_detection().unwrap(), None);
        assert!(started.elapsed() < Duration::from_secs(2));
        trigger.join().unwrap();
    }

    #[test]
    fn test_stopped_synthetic_source_ends() {
        let mut source = SyntheticSource::from_config(&unpaced_config(4)).unwrap();
        let stop = StopSignal::new();
        source.attach_stop(stop.clone());

        assert!(source.next_detection().unwrap().is_some());
        stop.trigger();
        assert!(source.next_detection().unwrap().is_none());
    }

    #[test]
    fn test_create_source() {
        assert!(create_source(&unpaced_config(1)).is_ok());

        let mut config = unpaced_config(1);
        config.kind = "webcam".to_string();
        assert!(create_source(&config).is_err());

        config.kind = "replay".to_string();
        assert!(create_source(&config).is_err());
    }
}
