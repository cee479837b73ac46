use std::path::PathBuf;

use kneecue_common::config::AppConfig;
use kneecue_pose_model::event::Event;
use kneecue_pose_model::landmark::{parse_detections, DetectionRecord};
use kneecue_signal_core::pipeline::SignalPipeline;

fn load_fixture() -> Vec<DetectionRecord> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("squat-session")
        .join("detections.jsonl");

    let content = std::fs::read_to_string(path).expect("fixture should be readable");
    parse_detections(&content).expect("fixture should parse")
}

fn cue_times(config: &AppConfig) -> Vec<f64> {
    let mut pipeline = SignalPipeline::from_config(config);
    let mut times = Vec::new();
    for record in load_fixture() {
        let events = pipeline.step(&record.output, record.timestamp_ms);
        if events.iter().any(Event::is_cue) {
            times.push(record.timestamp_ms);
        }
    }
    times
}

#[test]
fn default_config_cues_once_per_rep() {
    assert_eq!(cue_times(&AppConfig::default()), vec![1500.0, 4000.0, 6500.0]);
}

#[test]
fn threshold_below_deepest_angle_never_cues() {
    let mut config = AppConfig::default();
    config.cue.threshold_deg = 70.0;
    assert!(cue_times(&config).is_empty());
}

#[test]
fn every_angle_stays_in_range() {
    let mut pipeline = SignalPipeline::default();
    for record in load_fixture() {
        for event in pipeline.step(&record.output, record.timestamp_ms) {
            if let Some(angle) = event.angle_deg() {
                assert!((0.0..=180.0).contains(&angle), "angle {angle} out of range");
            }
        }
    }
    let stats = pipeline.stats();
    assert_eq!(stats.frames, 80);
    assert_eq!(stats.angle_updates + stats.unreliable_frames, stats.detected_frames);
}
