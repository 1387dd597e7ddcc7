//! Tracking session: the capture thread and the evaluator thread.
//!
//! The capture thread pulls detections from the measurement source and hands
//! them over a bounded channel. The evaluator thread is the only owner of the
//! sample window and the presentation sink. It interleaves incoming detections
//! with evaluator ticks, so every tick sees a window with whole pushes applied
//! in arrival order, and no lock guards the window.
//!
//! Stopping the session wakes a source that is waiting for its next frame and
//! joins both threads; no sink callback runs after [`TrackingSession::stop`]
//! returns.

use crate::{
    amplitude::AmplitudeEvaluator,
    config::Config,
    observation::Detection,
    overlay::{OverlayFrame, PreviewGeometry},
    shutdown::StopSignal,
    sink::PresentationSink,
    source::MeasurementSource,
    ticker::Ticker,
    window::SampleWindow,
    Error, Result,
};
use log::{debug, info, warn};
use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Parameters of a tracking session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Pitch samples kept in the window
    pub window_capacity: usize,
    /// Time between amplitude evaluations
    pub tick_period: Duration,
    /// Detections that may wait for the evaluator
    pub queue_depth: usize,
    /// Drop detections arriving while the queue is full instead of blocking capture
    pub drop_late_frames: bool,
    /// Geometry used to place the lock-on rectangle
    pub geometry: PreviewGeometry,
}

impl SessionConfig {
    /// Extract session parameters from application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            window_capacity: config.window.capacity,
            tick_period: config.tick_period(),
            queue_depth: config.capture.queue_depth,
            drop_late_frames: config.capture.drop_late_frames,
            geometry: config.preview_geometry()?,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.tick_period.is_zero() {
            return Err(Error::SessionError("Tick period must be greater than 0".to_string()));
        }
        if self.queue_depth == 0 {
            return Err(Error::SessionError("Queue depth must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames produced by the source
    pub frames_captured: u64,
    /// Frames discarded because the evaluator was behind
    pub frames_dropped: u64,
    /// Frames processed by the evaluator thread
    pub frames_processed: u64,
    /// Processed frames that contained a face
    pub faces: u64,
    /// Pitch samples that entered the window
    pub samples_accepted: u64,
    /// Pitch samples rejected as non-finite
    pub samples_rejected: u64,
    /// Evaluator ticks, including ticks over an empty window
    pub ticks: u64,
}

enum CaptureEvent {
    Detection(Detection),
    SourceEnded,
    SourceFailed(String),
    Shutdown,
}

#[derive(Debug, Default)]
struct CaptureReport {
    frames_captured: u64,
    frames_dropped: u64,
}

#[derive(Debug, Default)]
struct EvaluatorReport {
    frames_processed: u64,
    faces: u64,
    samples_accepted: u64,
    samples_rejected: u64,
    ticks: u64,
    source_error: Option<String>,
}

/// A running capture + evaluation pipeline
pub struct TrackingSession {
    stop: StopSignal,
    wake: SyncSender<CaptureEvent>,
    capture: Option<JoinHandle<CaptureReport>>,
    evaluator: Option<JoinHandle<EvaluatorReport>>,
}

impl TrackingSession {
    /// Start capturing from `source` and reporting to `sink`
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or a thread cannot be spawned
    pub fn start(
        config: SessionConfig,
        mut source: Box<dyn MeasurementSource>,
        sink: Box<dyn PresentationSink>,
    ) -> Result<Self> {
        config.validate()?;
        let window = SampleWindow::new(config.window_capacity)?;

        info!(
            "Starting session: source {}, window {}, tick {:?}, queue {}",
            source.name(),
            config.window_capacity,
            config.tick_period,
            config.queue_depth
        );

        let stop = StopSignal::new();
        source.attach_stop(stop.clone());
        let (tx, rx) = mpsc::sync_channel(config.queue_depth);

        let evaluator = {
            let stop = stop.clone();
            let config = config.clone();
            thread::Builder::new()
                .name("evaluator".to_string())
                .spawn(move || run_evaluator(&config, window, sink, &rx, &stop))?
        };

        let capture = {
            let stop = stop.clone();
            let tx = tx.clone();
            let queue_depth = config.queue_depth;
            let drop_late = config.drop_late_frames;
            thread::Builder::new()
                .name("capture".to_string())
                .spawn(move || run_capture(source, &tx, &stop, queue_depth, drop_late))
        };

        let capture = match capture {
            Ok(handle) => handle,
            Err(e) => {
                stop.trigger();
                let _ = tx.try_send(CaptureEvent::Shutdown);
                let _ = evaluator.join();
                return Err(e.into());
            }
        };

        Ok(Self {
            stop,
            wake: tx,
            capture: Some(capture),
            evaluator: Some(evaluator),
        })
    }

    /// True once the evaluator thread has exited, e.g. because the source ended
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.evaluator.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Block until the source is exhausted and every queued detection is processed
    ///
    /// Never returns for an unbounded source; use [`TrackingSession::stop`] instead.
    pub fn wait(mut self) -> Result<SessionStats> {
        self.join()
    }

    /// Stop both threads and wait for them to exit
    pub fn stop(mut self) -> Result<SessionStats> {
        self.signal_stop();
        self.join()
    }

    fn signal_stop(&self) {
        self.stop.trigger();
        // A full queue means the evaluator is awake and will see the flag
        let _ = self.wake.try_send(CaptureEvent::Shutdown);
    }

    fn join(&mut self) -> Result<SessionStats> {
        let evaluator = match self.evaluator.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::SessionError("Evaluator thread panicked".to_string()))?,
            None => EvaluatorReport::default(),
        };

        // The evaluator is gone, so a capture thread blocked on a full queue wakes up
        self.stop.trigger();
        let capture = match self.capture.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::SessionError("Capture thread panicked".to_string()))?,
            None => CaptureReport::default(),
        };

        if let Some(message) = evaluator.source_error {
            return Err(Error::SourceError(message));
        }

        let stats = SessionStats {
            frames_captured: capture.frames_captured,
            frames_dropped: capture.frames_dropped,
            frames_processed: evaluator.frames_processed,
            faces: evaluator.faces,
            samples_accepted: evaluator.samples_accepted,
            samples_rejected: evaluator.samples_rejected,
            ticks: evaluator.ticks,
        };
        info!("Session finished: {:?}", stats);
        Ok(stats)
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if self.evaluator.is_some() || self.capture.is_some() {
            self.signal_stop();
            if let Err(e) = self.join() {
                warn!("Session ended with error: {}", e);
            }
        }
    }
}

fn run_capture(
    mut source: Box<dyn MeasurementSource>,
    tx: &SyncSender<CaptureEvent>,
    stop: &StopSignal,
    queue_depth: usize,
    drop_late: bool,
) -> CaptureReport {
    let mut report = CaptureReport::default();

    while !stop.is_triggered() {
        let detection = match source.next_detection() {
            Ok(Some(detection)) => detection,
            Ok(None) if stop.is_triggered() => break,
            Ok(None) => {
                info!("Source {} exhausted after {} frames", source.name(), report.frames_captured);
                let _ = tx.send(CaptureEvent::SourceEnded);
                break;
            }
            Err(e) => {
                warn!("Source {} failed: {}", source.name(), e);
                let _ = tx.send(CaptureEvent::SourceFailed(e.to_string()));
                break;
            }
        };
        report.frames_captured += 1;

        let event = CaptureEvent::Detection(detection);
        let delivered = if drop_late {
            match tx.try_send(event) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    report.frames_dropped += 1;
                    debug!("Evaluator behind ({} queued), dropping frame", queue_depth);
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        } else {
            tx.send(event).is_ok()
        };

        if !delivered {
            break;
        }
    }

    report
}

fn run_evaluator(
    config: &SessionConfig,
    mut window: SampleWindow,
    mut sink: Box<dyn PresentationSink>,
    rx: &Receiver<CaptureEvent>,
    stop: &StopSignal,
) -> EvaluatorReport {
    let mut report = EvaluatorReport::default();
    let mut evaluator = AmplitudeEvaluator::new();
    let mut ticker = Ticker::new(config.tick_period, Instant::now());

    while !stop.is_triggered() {
        let now = Instant::now();
        if ticker.fire_if_due(now) {
            let reading = evaluator.tick(&window);
            sink.on_amplitude(reading.as_ref());
            continue;
        }

        match rx.recv_timeout(ticker.time_until_next(now)) {
            Ok(CaptureEvent::Detection(detection)) => {
                report.frames_processed += 1;
                if matches!(detection, Detection::Face(_)) {
                    report.faces += 1;
                }
                if let Some(pitch) = detection.pitch() {
                    match window.push(pitch) {
                        Ok(()) => report.samples_accepted += 1,
                        Err(e) => {
                            report.samples_rejected += 1;
                            warn!("Rejected pitch sample: {}", e);
                        }
                    }
                }
                sink.on_overlay(&OverlayFrame::from_detection(&detection, &config.geometry));
            }
            Ok(CaptureEvent::SourceEnded) => {
                // Report the final window before closing
                let reading = evaluator.tick(&window);
                sink.on_amplitude(reading.as_ref());
                break;
            }
            Ok(CaptureEvent::SourceFailed(message)) => {
                report.source_error = Some(message);
                break;
            }
            Ok(CaptureEvent::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    report.ticks = evaluator.ticks();
    debug!("Evaluator exiting after {} ticks", report.ticks);
    report
}
