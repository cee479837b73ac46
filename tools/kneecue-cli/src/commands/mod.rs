pub mod check;
pub mod config;
pub mod replay;
pub mod simulate;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use kneecue_common::config::AppConfig;
use kneecue_session::{CaptureBackend, JsonlBridge, LoopExit, PoseSession, SessionConfig};

/// Run one session to completion, streaming host messages to stdout.
///
/// Ctrl+C sets the session's stop flag; the loop winds down at the next
/// frame and resources are released as in a normal stop.
pub(crate) async fn run_session(
    config: &AppConfig,
    backend: Box<dyn CaptureBackend>,
    render_target: &str,
    print_summary: bool,
) -> anyhow::Result<()> {
    let bridge = Arc::new(JsonlBridge::stdout());
    let mut session = PoseSession::new(
        SessionConfig::from_app_config(config),
        backend,
        bridge.clone(),
    );

    session.start(render_target).await?;

    if let Some(stop_flag) = session.stop_flag() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping session");
                stop_flag.store(true, Ordering::SeqCst);
            }
        });
    }

    let summary = session.wait().await?;
    bridge.flush()?;

    let Some(summary) = summary else {
        anyhow::bail!("session did not start; see status messages for the reason");
    };

    if summary.exit == LoopExit::SourceError {
        tracing::warn!("Frame source failed before the end of the stream");
    }

    if print_summary {
        let stats = &summary.stats;
        eprintln!();
        eprintln!("Session summary");
        eprintln!("  Target:         {}", summary.render_target);
        eprintln!("  Started:        {}", summary.started_at);
        eprintln!("  Duration:       {:.2}s", summary.duration_secs);
        eprintln!("  Exit:           {:?}", summary.exit);
        eprintln!("  Frames:         {}", stats.frames);
        eprintln!(
            "  Detected:       {} ({:.1}%)",
            stats.detected_frames,
            stats.detection_rate() * 100.0
        );
        eprintln!("  Angle updates:  {}", stats.angle_updates);
        eprintln!("  Unreliable:     {}", stats.unreliable_frames);
        eprintln!("  Cues fired:     {}", stats.cues_fired);
        if let Some(angle) = summary.last_angle_deg {
            eprintln!("  Last angle:     {angle:.1} deg");
        }
    }

    tracing::debug!(summary = %serde_json::to_string(&summary)?, "Session finished");
    Ok(())
}
