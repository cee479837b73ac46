use std::path::PathBuf;

use kneecue_common::config::AppConfig;
use kneecue_session::ReplayBackend;

use crate::TuningArgs;

pub async fn run(
    mut config: AppConfig,
    file: PathBuf,
    realtime: bool,
    tuning: TuningArgs,
) -> anyhow::Result<()> {
    tuning.apply(&mut config);
    config.validate()?;

    let backend = ReplayBackend::from_file(&file)?.realtime(realtime);
    tracing::info!(
        file = %file.display(),
        frames = backend.len(),
        realtime,
        "Replaying recording"
    );

    super::run_session(&config, Box::new(backend), "replay", tuning.summary).await
}
