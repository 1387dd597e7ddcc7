//! Main application module for head pitch amplitude tracking.

use crate::{
    config::Config,
    constants::IDLE_POLL_INTERVAL_MS,
    error::Result,
    session::{SessionConfig, SessionStats, TrackingSession},
    sink::{LogSink, PresentationSink},
    source::create_source,
};
use log::info;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

/// Main application struct
pub struct AmplitudeApp {
    config: Config,
    run_for: Option<Duration>,
    shutdown: Arc<AtomicBool>,
}

impl AmplitudeApp {
    /// Create the application from a validated configuration
    pub fn new(config: Config, run_for: Option<Duration>) -> Result<Self> {
        info!("Initializing head pose amplitude application");
        config.validate()?;

        Ok(Self {
            config,
            run_for,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that ends [`AmplitudeApp::run`] when set, e.g. from a Ctrl-C handler
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run with the logging sink
    pub fn run(&self) -> Result<SessionStats> {
        self.run_with_sink(Box::new(LogSink::new()))
    }

    /// Run until the source ends, the run duration elapses or shutdown is requested
    pub fn run_with_sink(&self, sink: Box<dyn PresentationSink>) -> Result<SessionStats> {
        let source = create_source(&self.config.source)?;
        let session = TrackingSession::start(SessionConfig::from_config(&self.config)?, source, sink)?;

        let started = Instant::now();
        let poll = Duration::from_millis(IDLE_POLL_INTERVAL_MS);

        loop {
            if session.is_finished() {
                return session.wait();
            }
            if self.shutdown.load(Ordering::Acquire) {
                info!("Exit requested by user");
                break;
            }
            if self.run_for.is_some_and(|limit| started.elapsed() >= limit) {
                info!("Run duration elapsed");
                break;
            }
            thread::sleep(poll);
        }

        info!("Application shutting down");
        session.stop()
    }
}
