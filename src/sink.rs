//! Presentation sinks consuming overlay frames and amplitude readings.

use crate::{amplitude::AmplitudeReading, overlay::OverlayFrame};
use log::{debug, info};
use std::sync::{Arc, Mutex, PoisonError};

/// Consumer of everything the session produces
///
/// Both callbacks run on the session's evaluator thread, one at a time.
pub trait PresentationSink: Send {
    /// Overlay state for a newly processed frame
    fn on_overlay(&mut self, frame: &OverlayFrame);

    /// Result of one evaluator tick; `None` when the window was empty
    fn on_amplitude(&mut self, reading: Option<&AmplitudeReading>);
}

/// Writes overlays at debug level and amplitude readings at info level
#[derive(Debug, Default)]
pub struct LogSink {
    overlay_visible: bool,
}

impl LogSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for LogSink {
    fn on_overlay(&mut self, frame: &OverlayFrame) {
        match frame {
            OverlayFrame::Hidden => {
                if self.overlay_visible {
                    debug!("Face lost, hiding lock-on");
                }
                self.overlay_visible = false;
            }
            OverlayFrame::Visible { rect, labels, .. } => {
                if !self.overlay_visible {
                    debug!("Face found");
                }
                self.overlay_visible = true;
                debug!(
                    "Lock-on at ({:.1}, {:.1}) {:.1}x{:.1} | {} | {} | {}",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    labels.roll.replace('\n', ": "),
                    labels.yaw.replace('\n', ": "),
                    labels.pitch.replace('\n', ": ")
                );
            }
        }
    }

    fn on_amplitude(&mut self, reading: Option<&AmplitudeReading>) {
        match reading {
            Some(reading) => info!(
                "Pitch amplitude #{}: {:.4} over {} samples (min {:.4}, max {:.4}, mean {:.4}, std dev {:.4})",
                reading.sequence,
                reading.amplitude,
                reading.sample_count,
                reading.min,
                reading.max,
                reading.mean,
                reading.std_dev
            ),
            None => debug!("Pitch amplitude: no samples yet"),
        }
    }
}

/// Everything a [`CollectingSink`] has received
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub overlays: Vec<OverlayFrame>,
    pub amplitudes: Vec<Option<AmplitudeReading>>,
}

/// Records every callback into shared storage readable from other threads
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    collected: Arc<Mutex<Collected>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far
    #[must_use]
    pub fn collected(&self) -> Collected {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl PresentationSink for CollectingSink {
    fn on_overlay(&mut self, frame: &OverlayFrame) {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .overlays
            .push(frame.clone());
    }

    fn on_amplitude(&mut self, reading: Option<&AmplitudeReading>) {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .amplitudes
            .push(reading.copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_shares_storage() {
        let sink = CollectingSink::new();
        let mut writer = sink.clone();

        writer.on_overlay(&OverlayFrame::Hidden);
        writer.on_amplitude(None);
        writer.on_amplitude(Some(&AmplitudeReading {
            sequence: 2,
            amplitude: 0.5,
            sample_count: 3,
            min: -0.25,
            max: 0.25,
            mean: 0.0,
            std_dev: 0.2,
        }));

        let collected = sink.collected();
        assert_eq!(collected.overlays, vec![OverlayFrame::Hidden]);
        assert_eq!(collected.amplitudes.len(), 2);
        assert!(collected.amplitudes[0].is_none());
        assert_eq!(collected.amplitudes[1].map(|r| r.sequence), Some(2));
    }

    #[test]
    fn test_log_sink_tracks_visibility() {
        let mut sink = LogSink::new();
        sink.on_overlay(&OverlayFrame::Hidden);
        assert!(!sink.overlay_visible);
    }
}
