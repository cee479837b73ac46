use kneecue_common::config::AppConfig;
use kneecue_session::{SquatMotion, SyntheticBackend};

use crate::TuningArgs;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    mut config: AppConfig,
    reps: u32,
    depth_deg: f64,
    period_ms: f64,
    dropout: f64,
    camera_fps: u32,
    realtime: bool,
    tuning: TuningArgs,
) -> anyhow::Result<()> {
    tuning.apply(&mut config);
    config.validate()?;

    let motion = SquatMotion {
        reps,
        depth_deg,
        period_ms,
        fps: camera_fps,
        dropout,
        ..SquatMotion::default()
    };
    motion.validate()?;

    tracing::info!(
        reps,
        depth_deg,
        frames = motion.frame_count(),
        realtime,
        "Simulating squats"
    );

    let backend = SyntheticBackend::new(motion).realtime(realtime);
    super::run_session(&config, Box::new(backend), "simulate", tuning.summary).await
}
