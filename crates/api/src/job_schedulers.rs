use crate::notification::send_due_reminders::SendDueRemindersUseCase;
use crate::shared::usecase::execute;
use actix_web::rt::time::interval;
use sprout_notify_infra::SproutContext;
use std::time::Duration;
use tracing::{error, info};

/// Runs the reminder sweep on a fixed interval, in-process. On-demand
/// triggers through the HTTP surface run the same use case; the sweep
/// lock inside it keeps overlapping invocations from double-dispatching.
pub fn start_reminder_sweep_job(ctx: SproutContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(Duration::from_secs(ctx.config.sweep_interval_secs));
        loop {
            interval.tick().await;

            match execute(SendDueRemindersUseCase, &ctx).await {
                Ok(report) => info!("Reminder sweep finished: {}", report.message),
                Err(e) => error!("Reminder sweep failed: {:?}", e),
            }
        }
    });
}
