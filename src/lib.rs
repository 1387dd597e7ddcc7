//! Head pitch amplitude tracking.
//!
//! Follows the pitch of a detected face and reports how far the head nods.
//! Every detection pushes its pitch into a bounded window holding the latest
//! samples; a fixed-period evaluator reports the window's peak-to-peak range.
//!
//! The pipeline:
//! 1. A measurement source yields one detection per camera frame
//! 2. The capture thread hands detections to the evaluator over a bounded channel
//! 3. The evaluator thread pushes pitches into the window and renders the overlay
//! 4. On every tick it evaluates `max - min` of the window and reports it
//!
//! # Examples
//!
//! ## Window and evaluator
//!
//! ```
//! use head_pose_amplitude::{amplitude::evaluate, window::SampleWindow};
//!
//! # fn main() -> head_pose_amplitude::Result<()> {
//! let mut window = SampleWindow::new(5)?;
//! for pitch in [0.1, 0.2, 0.9, 0.05, 0.4, 0.95] {
//!     window.push(pitch)?;
//! }
//!
//! assert_eq!(window.snapshot(), vec![0.95, 0.4, 0.05, 0.9, 0.2]);
//! let amplitude = evaluate(&window.snapshot()).unwrap();
//! assert!((amplitude - 0.90).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a session
//!
//! ```no_run
//! use head_pose_amplitude::{
//!     config::Config,
//!     session::{SessionConfig, TrackingSession},
//!     sink::LogSink,
//!     source::create_source,
//! };
//! use std::{thread, time::Duration};
//!
//! # fn main() -> head_pose_amplitude::Result<()> {
//! let config = Config::default();
//! let source = create_source(&config.source)?;
//! let session = TrackingSession::start(SessionConfig::from_config(&config)?, source, Box::new(LogSink::new()))?;
//!
//! thread::sleep(Duration::from_secs(3));
//! let stats = session.stop()?;
//! println!("{} frames, {} ticks", stats.frames_processed, stats.ticks);
//! # Ok(())
//! # }
//! ```

/// Bounded most-recent-first sample window
pub mod window;

/// Peak-to-peak amplitude evaluation and window statistics
pub mod amplitude;

/// Face observations produced by the detector
pub mod observation;

/// Lock-on rectangle geometry and angle labels
pub mod overlay;

/// Measurement sources (synthetic and replayed detections)
pub mod source;

/// Presentation sinks
pub mod sink;

/// Fixed-cadence tick scheduling
pub mod ticker;

/// Capture and evaluator threads
pub mod session;

/// Stop signal shared by session threads and paced sources
pub mod shutdown;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
