//! Configuration and recording files on disk


use head_pose_amplitude::{
    app::AmplitudeApp,
    config::Config,
    observation::Detection,
    sink::CollectingSink,
    source::{MeasurementSource, ReplaySource},
    Error, Result,
};
use test_helpers::faces;

#[test]
fn test_config_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.yaml");

    let mut config = Config::default();
    config.window.capacity = 7;
    config.evaluator.tick_period_ms = 150;
    config.source.seed = Some(1234);
    config.to_file(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.window.capacity, 7);
    assert_eq!(loaded.evaluator.tick_period_ms, 150);
    assert_eq!(loaded.source.seed, Some(1234));
    assert!(loaded.validate().is_ok());
    Ok(())
}

#[test]
fn test_missing_config_file() {
    let result = Config::from_file("does/not/exist.yaml");
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_recording_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nod.yaml");

    let mut detections = faces(&[0.1, -0.2]);
    detections.insert(1, Detection::NoFace);
    ReplaySource::write_recording(&path, &detections)?;

    let mut source = ReplaySource::from_file(&path)?;
    let mut replayed = Vec::new();
    while let Some(detection) = source.next_detection()? {
        replayed.push(detection);
    }
    assert_eq!(replayed, detections);
    Ok(())
}

#[test]
fn test_app_replays_recording_from_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nod.yaml");
    ReplaySource::write_recording(&path, &faces(&[0.1, 0.2, 0.9, 0.05, 0.4, 0.95]))?;

    let yaml = format!(
        "source:\n  kind: replay\n  replay_path: {}\n  paced: false\ncapture:\n  drop_late_frames: false\n",
        path.display()
    );
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, yaml)?;

    let config = Config::from_file(&config_path)?;
    let app = AmplitudeApp::new(config, None)?;
    let sink = CollectingSink::new();
    let stats = app.run_with_sink(Box::new(sink.clone()))?;

    assert_eq!(stats.frames_processed, 6);
    let reading = sink.collected().amplitudes.last().copied().flatten().expect("final reading");
    assert!((reading.amplitude - 0.90).abs() < 1e-9);
    Ok(())
}
