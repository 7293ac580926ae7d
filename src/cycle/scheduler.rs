use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::{coordinator::CycleCoordinator, models::CycleOutcome};
use crate::config::ScheduleConfig;

/// Starts the periodic trigger. Every tick goes through the same
/// single-flight guard as on-demand triggers.
#[instrument(skip(coordinator, config))]
pub async fn start_cycle_scheduler(coordinator: Arc<CycleCoordinator>, config: ScheduleConfig) {
    info!(
        interval_secs = config.interval().as_secs(),
        run_on_startup = config.run_on_startup,
        "Starting leaderboard cycle scheduler"
    );

    let mut ticker = interval(config.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately
    if !config.run_on_startup {
        ticker.tick().await;
    }

    loop {
        ticker.tick().await;

        match coordinator.run_cycle().await {
            Ok(CycleOutcome::Completed(report)) => {
                info!(
                    cycle_id = %report.cycle_id,
                    profiles_scored = report.profiles_scored,
                    profiles_failed = report.profiles_failed,
                    "Scheduled cycle completed"
                );
            }
            Ok(CycleOutcome::AlreadyRunning) => {
                info!("Scheduled cycle skipped, another cycle is running");
            }
            Err(e) => {
                error!(error = %e, "Scheduled cycle failed");
            }
        }
    }
}

/// Pings `url` periodically so idle-suspending hosts keep the process up.
/// Failures are logged only.
#[instrument(skip(every))]
pub async fn start_keep_alive(url: String, every: Duration) {
    let client = match reqwest::Client::builder().timeout(Duration::from_secs(30)).build() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Keep-alive client could not be built");
            return;
        }
    };

    info!(interval_secs = every.as_secs(), "Starting keep-alive pings");

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Nothing to keep alive before the first interval elapses
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(status = response.status().as_u16(), "Keep-alive ping succeeded");
            }
            Ok(response) => {
                warn!(status = response.status().as_u16(), "Keep-alive ping rejected");
            }
            Err(e) => {
                warn!(error = %e, "Keep-alive ping failed");
            }
        }
    }
}
