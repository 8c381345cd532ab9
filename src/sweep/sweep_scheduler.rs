use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::error::Result;

use super::sweep_service::ExpirationSweeper;

/// Runs the sweep in-process on a six-field cron schedule
/// (e.g. `0 0 * * * *` for hourly). The returned scheduler must be kept
/// alive for as long as the jobs should fire.
pub async fn start_sweep_scheduler(
    sweeper: ExpirationSweeper,
    schedule: &str,
) -> Result<JobScheduler> {
    let job = Job::new_async(schedule, move |_uuid, _l| {
        let sweeper = sweeper.clone();

        Box::pin(async move {
            if let Err(e) = sweeper.run(Utc::now()).await {
                error!("Scheduled expiration sweep failed: {:?}", e);
            }
        })
    })?;

    let scheduler = JobScheduler::new().await?;
    scheduler.add(job).await?;
    scheduler.start().await?;

    info!(schedule, "Expiration sweep scheduler started");
    Ok(scheduler)
}
