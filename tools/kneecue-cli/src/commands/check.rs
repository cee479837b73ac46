use std::path::PathBuf;

use kneecue_common::config::AppConfig;
use kneecue_pose_model::landmark::{parse_detections, LandmarkMapping};

pub fn run(config: &AppConfig, recording: Option<PathBuf>) -> anyhow::Result<()> {
    println!("KneeCue Configuration Check");
    println!("===========================");
    println!();

    let mut failures = 0;

    println!("Config file: {}", AppConfig::path().display());
    match config.validate() {
        Ok(()) => println!("  [OK] Values in range"),
        Err(e) => {
            println!("  [FAIL] {e}");
            failures += 1;
        }
    }
    println!(
        "  Cue:       below {:.1} deg, cooldown {:.0} ms, \"{}\"",
        config.cue.threshold_deg, config.cue.cooldown_ms, config.cue.text
    );
    println!("  Frame loop: {} fps", config.frame_loop.target_fps);

    println!();
    let mapping = LandmarkMapping::for_side(config.landmarks.side);
    println!(
        "Landmark mapping ({:?} leg): hip {}, knee {}, ankle {}",
        config.landmarks.side, mapping.hip, mapping.knee, mapping.ankle
    );
    match mapping.validate(config.landmarks.expected_landmark_count) {
        Ok(()) => println!(
            "  [OK] Valid for a {}-landmark model",
            config.landmarks.expected_landmark_count
        ),
        Err(e) => {
            println!("  [FAIL] {e}");
            failures += 1;
        }
    }
    println!("  Confidence floor: {:.2}", config.landmarks.min_confidence);

    println!();
    println!("Detector model: {}", config.detector.model_asset_path);
    println!("Runtime assets: {}", config.detector.wasm_assets_path);

    if let Some(path) = recording {
        println!();
        println!("Recording: {}", path.display());
        match std::fs::read_to_string(&path) {
            Ok(content) => match parse_detections(&content) {
                Ok(records) if records.is_empty() => {
                    println!("  [FAIL] No frames");
                    failures += 1;
                }
                Ok(records) => {
                    let detected = records.iter().filter(|r| !r.output.is_empty()).count();
                    println!(
                        "  [OK] {} frames, {} with a detected body",
                        records.len(),
                        detected
                    );
                }
                Err(e) => {
                    println!("  [FAIL] Invalid recording: {e}");
                    failures += 1;
                }
            },
            Err(e) => {
                println!("  [FAIL] Cannot read: {e}");
                failures += 1;
            }
        }
    }

    println!();
    if failures > 0 {
        anyhow::bail!("{failures} check(s) failed");
    }
    println!("All checks passed.");
    Ok(())
}
