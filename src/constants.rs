//! Constants used throughout the application

/// Number of pitch samples retained by the window
pub const DEFAULT_WINDOW_CAPACITY: usize = 5;

/// Evaluator tick period in milliseconds
pub const DEFAULT_TICK_PERIOD_MS: u64 = 300;

/// Default frames per second assumption
pub const DEFAULT_FPS: f64 = 30.0;

/// Frames that may wait between capture and evaluation before late ones are dropped
pub const DEFAULT_CAPTURE_QUEUE_DEPTH: usize = 4;

/// Synthetic nod defaults (radians, hertz)
pub const DEFAULT_NOD_AMPLITUDE: f64 = 0.35;
pub const DEFAULT_NOD_FREQUENCY: f64 = 0.5;
pub const DEFAULT_NOISE_LEVEL: f64 = 0.02;
pub const DEFAULT_DROPOUT_PROBABILITY: f64 = 0.05;

/// Preview defaults, portrait view over a landscape 720p front camera
pub const DEFAULT_VIEW_WIDTH: f64 = 390.0;
pub const DEFAULT_VIEW_HEIGHT: f64 = 844.0;
pub const DEFAULT_FRAME_WIDTH: f64 = 720.0;
pub const DEFAULT_FRAME_HEIGHT: f64 = 1280.0;

/// Lock-on rectangle border width in points
pub const LOCK_ON_BORDER_WIDTH: f64 = 4.0;

/// How often the app checks for shutdown requests and source end
pub const IDLE_POLL_INTERVAL_MS: u64 = 50;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;

/// Slowest accepted source frame rate (one frame every 1000 s)
pub const MIN_SOURCE_FPS: f64 = 0.001;

/// Largest accepted sample magnitude, so `max - min` of a window stays finite
pub const MAX_SAMPLE_MAGNITUDE: f64 = f64::MAX / 2.0;
