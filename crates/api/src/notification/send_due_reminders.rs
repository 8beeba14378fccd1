use crate::error::SproutError;
use crate::shared::dispatch::dispatch_in_chunks;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use futures::future::join_all;
use serde_json::json;
use sprout_notify_api_structs::run_reminder_sweep::APIResponse;
use sprout_notify_domain::{
    DeliveryTicket, NotificationLog, NotificationLogType, PushMessage, Reminder, ID,
};
use sprout_notify_infra::SproutContext;
use tracing::{error, info};

pub async fn run_reminder_sweep_controller(
    ctx: web::Data<SproutContext>,
) -> Result<HttpResponse, SproutError> {
    let usecase = SendDueRemindersUseCase;

    execute(usecase, &ctx)
        .await
        .map(|report| {
            HttpResponse::Ok().json(APIResponse::new(
                report.message.clone(),
                report.sent,
                &report.tickets,
                report.timestamp,
            ))
        })
        .map_err(SproutError::from)
}

/// Runs one reminder sweep: finds every due reminder, dispatches push
/// notifications for the ones with a resolvable device token and advances
/// their schedules so they are not re-sent until their next due time.
#[derive(Debug)]
pub struct SendDueRemindersUseCase;

/// Summary of one sweep. `sent` counts reminders whose notification was
/// handed to the push transport this run, which can be less than `due`
/// when chunks fail.
#[derive(Debug)]
pub struct SweepReport {
    pub sent: usize,
    pub due: usize,
    pub tickets: Vec<DeliveryTicket>,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
    SweepInProgress,
}

impl From<UseCaseError> for SproutError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::SweepInProgress => {
                Self::Conflict("A reminder sweep is already in progress".into())
            }
        }
    }
}

/// A due reminder together with its resolved delivery target
struct DueReminder {
    reminder: Reminder,
    user_id: ID,
    push_token: String,
}

/// Applies the cadence rule to every reminder and resolves each due one
/// through its plant association to a push token. Reminders without a
/// resolvable, non-empty token are skipped and stay due for the next
/// sweep. Does not mutate anything.
async fn resolve_due_reminders(
    reminders: Vec<Reminder>,
    now: i64,
    ctx: &SproutContext,
) -> Vec<DueReminder> {
    let mut due = Vec::new();
    for reminder in reminders.into_iter().filter(|r| r.is_due(now)) {
        let user_plant = match ctx.repos.user_plants.find(&reminder.user_plant_id).await {
            Some(user_plant) => user_plant,
            None => {
                info!(
                    "Reminder with id: {} has no plant association. Skipping it until the next sweep.",
                    reminder.id
                );
                continue;
            }
        };

        match ctx
            .repos
            .notification_users
            .find_by_user(&user_plant.user_id)
            .await
        {
            Some(user) if user.has_push_token() => due.push(DueReminder {
                reminder,
                user_id: user.user_id,
                push_token: user.push_token,
            }),
            _ => {
                info!(
                    "No push token registered for user with id: {}. Reminder with id: {} stays due.",
                    user_plant.user_id, reminder.id
                );
            }
        }
    }
    due
}

fn build_push_message(due: &DueReminder) -> PushMessage {
    PushMessage::new(
        due.push_token.clone(),
        "Plant Care Reminder".to_string(),
        due.reminder.notification_body(),
        json!({
            "reminderId": due.reminder.id.clone(),
            "userPlantId": due.reminder.user_plant_id.clone(),
            "reminderType": due.reminder.reminder_type,
            "userId": due.user_id.clone(),
        }),
    )
}

/// Persists the advanced schedule for every reminder that was handed to
/// the transport. Writes touch disjoint records and are issued
/// concurrently; a failed or timed out write is logged and leaves that
/// reminder eligible to be picked up again next sweep.
async fn commit_schedules(attempted: &[&DueReminder], now: i64, ctx: &SproutContext) -> usize {
    let commits = attempted.iter().map(|due| async move {
        let next = due.reminder.next_reminder_time(now);
        let write = ctx
            .repos
            .reminders
            .update_schedule(&due.reminder.id, now, next);
        match tokio::time::timeout(ctx.config.store_timeout, write).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(
                    "Error advancing schedule for reminder with id: {}. It may be sent again next sweep. Error message: {:?}",
                    due.reminder.id, e
                );
                false
            }
            Err(_) => {
                error!(
                    "Timed out advancing schedule for reminder with id: {}. It may be sent again next sweep.",
                    due.reminder.id
                );
                false
            }
        }
    });

    join_all(commits).await.into_iter().filter(|ok| !ok).count()
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueRemindersUseCase {
    type Response = SweepReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &SproutContext) -> Result<Self::Response, Self::Error> {
        // Serializes sweeps: together with the due-set snapshot below this
        // guarantees a reminder is never advanced twice with the same
        // `last_notification_sent` by overlapping triggers
        let _guard = ctx
            .sweep_lock
            .try_lock()
            .map_err(|_| UseCaseError::SweepInProgress)?;

        let now = ctx.sys.get_timestamp_millis();

        let reminders = ctx
            .repos
            .reminders
            .find_all()
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if reminders.is_empty() {
            return Ok(SweepReport {
                sent: 0,
                due: 0,
                tickets: Vec::new(),
                message: "No reminders found".to_string(),
                timestamp: now,
            });
        }

        // Snapshot of the due set as of fetch time
        let due = resolve_due_reminders(reminders, now, ctx).await;
        if due.is_empty() {
            return Ok(SweepReport {
                sent: 0,
                due: 0,
                tickets: Vec::new(),
                message: "No due reminders found".to_string(),
                timestamp: now,
            });
        }

        let messages = due.iter().map(build_push_message).collect::<Vec<_>>();
        let outcome = dispatch_in_chunks(&ctx.push, &messages, ctx.config.push_timeout).await;

        // Only reminders from chunks the transport accepted advance;
        // everything else is evaluated as due again next sweep
        let attempted = outcome
            .attempted
            .iter()
            .map(|&idx| &due[idx])
            .collect::<Vec<_>>();
        let commit_failures = commit_schedules(&attempted, now, ctx).await;

        let sent = attempted.len();
        if sent > 0 {
            let log = NotificationLog {
                id: ID::new(),
                log_type: NotificationLogType::SweepReminders,
                title: "Plant Care Reminders".to_string(),
                body: format!("Sent {} reminder notifications", sent),
                data: json!({ "sent": sent }),
                sent_at: now,
                recipients: sent as i64,
            };
            if let Err(e) = ctx.repos.notification_logs.insert(&log).await {
                error!("Error appending to the notification log: {:?}", e);
            }
        }

        info!(
            "Reminder sweep sent {} of {} due reminders ({} commit failures)",
            sent,
            due.len(),
            commit_failures
        );

        Ok(SweepReport {
            sent,
            due: due.len(),
            tickets: outcome.tickets,
            message: format!(
                "Reminder notifications sent to {} of {} due reminders",
                sent,
                due.len()
            ),
            timestamp: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sprout_notify_domain::{Frequency, NotificationUser, ReminderType, UserPlant};
    use sprout_notify_infra::{setup_context_inmemory, ISys, InMemoryPushGateway};
    use std::sync::Arc;

    struct StaticTimeSys(i64);
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.0
        }
    }

    fn ts(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> i64 {
        chrono::Utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .timestamp_millis()
    }

    fn setup(now: i64, chunk_limit: usize) -> (SproutContext, Arc<InMemoryPushGateway>) {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticTimeSys(now));
        let gateway = Arc::new(InMemoryPushGateway::new(chunk_limit));
        ctx.push = gateway.clone();
        (ctx, gateway)
    }

    async fn insert_reminder_with_target(
        ctx: &SproutContext,
        frequency: Frequency,
        reminder_time: i64,
        push_token: &str,
    ) -> Reminder {
        let user_id = ID::new();
        ctx.repos
            .notification_users
            .insert(&NotificationUser {
                user_id: user_id.clone(),
                push_token: push_token.to_string(),
            })
            .await
            .unwrap();

        let user_plant = UserPlant {
            id: ID::new(),
            user_id,
        };
        ctx.repos.user_plants.insert(&user_plant).await.unwrap();

        let reminder = Reminder {
            id: ID::new(),
            user_plant_id: user_plant.id,
            reminder_type: ReminderType::Watering,
            frequency,
            reminder_time,
            last_notification_sent: None,
            message: None,
        };
        ctx.repos.reminders.insert(&reminder).await.unwrap();
        reminder
    }

    #[actix_web::main]
    #[test]
    async fn sends_due_reminder_and_advances_its_schedule() {
        let now = ts(2024, 1, 1, 10, 0, 0);
        let (ctx, gateway) = setup(now, 100);
        let reminder = insert_reminder_with_target(
            &ctx,
            Frequency::Weekly,
            ts(2024, 1, 1, 9, 0, 0),
            "ExponentPushToken[aaa]",
        )
        .await;

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 1);
        assert_eq!(report.due, 1);
        assert_eq!(report.tickets.len(), 1);
        assert!(report.tickets[0].is_ok());

        let sent = gateway.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ExponentPushToken[aaa]");
        assert_eq!(sent[0].body, "Time to water your plant!");

        let updated = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(updated.last_notification_sent, Some(now));
        assert_eq!(updated.reminder_time, ts(2024, 1, 8, 9, 0, 0));
    }

    #[actix_web::main]
    #[test]
    async fn second_sweep_without_clock_advance_sends_nothing() {
        let now = ts(2024, 1, 1, 10, 0, 0);
        let (ctx, gateway) = setup(now, 100);
        insert_reminder_with_target(
            &ctx,
            Frequency::Daily,
            ts(2024, 1, 1, 9, 0, 0),
            "ExponentPushToken[aaa]",
        )
        .await;

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 1);

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(report.message, "No due reminders found");
        assert_eq!(gateway.sent_messages().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn once_reminder_is_terminal_after_one_send() {
        let now = ts(2024, 1, 1, 10, 0, 0);
        let (ctx, _) = setup(now, 100);
        let reminder = insert_reminder_with_target(
            &ctx,
            Frequency::Once,
            ts(2024, 1, 1, 9, 0, 0),
            "ExponentPushToken[aaa]",
        )
        .await;

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 1);

        let updated = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(updated.last_notification_sent, Some(now));
        // One-time reminders keep their original scheduled time
        assert_eq!(updated.reminder_time, reminder.reminder_time);

        // Far in the future it must never fire again
        let mut ctx = ctx;
        ctx.sys = Arc::new(StaticTimeSys(ts(2025, 6, 1, 10, 0, 0)));
        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 0);
    }

    #[actix_web::main]
    #[test]
    async fn reminder_without_push_token_is_skipped_and_stays_due() {
        let now = ts(2024, 1, 1, 10, 0, 0);
        let (ctx, gateway) = setup(now, 100);

        // Plant association exists but the owner never registered a device
        let user_plant = UserPlant {
            id: ID::new(),
            user_id: ID::new(),
        };
        ctx.repos.user_plants.insert(&user_plant).await.unwrap();
        let reminder = Reminder {
            id: ID::new(),
            user_plant_id: user_plant.id,
            reminder_type: ReminderType::Fertilizing,
            frequency: Frequency::Weekly,
            reminder_time: ts(2024, 1, 1, 9, 0, 0),
            last_notification_sent: None,
            message: None,
        };
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 0);
        assert!(gateway.sent_messages().is_empty());

        let untouched = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(untouched.last_notification_sent, None);
        assert!(untouched.is_due(now));
    }

    #[actix_web::main]
    #[test]
    async fn empty_push_token_counts_as_unresolved() {
        let now = ts(2024, 1, 1, 10, 0, 0);
        let (ctx, gateway) = setup(now, 100);
        let reminder =
            insert_reminder_with_target(&ctx, Frequency::Daily, ts(2024, 1, 1, 9, 0, 0), "").await;

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 0);
        assert!(gateway.sent_messages().is_empty());

        let untouched = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert_eq!(untouched.last_notification_sent, None);
    }

    #[actix_web::main]
    #[test]
    async fn failed_chunk_leaves_its_reminders_due_but_commits_the_rest() {
        let now = ts(2024, 1, 1, 10, 0, 0);
        let (ctx, gateway) = setup(now, 2);
        let mut reminders = Vec::new();
        for i in 0..4 {
            reminders.push(
                insert_reminder_with_target(
                    &ctx,
                    Frequency::Daily,
                    ts(2024, 1, 1, 9, 0, 0),
                    &format!("ExponentPushToken[{}]", i),
                )
                .await,
            );
        }
        // First chunk holds reminders 0 and 1
        gateway.fail_chunks_containing("ExponentPushToken[0]");

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.due, 4);
        assert_eq!(report.sent, 2);
        assert_eq!(report.tickets.len(), 2);

        for reminder in &reminders[..2] {
            let untouched = ctx.repos.reminders.find(&reminder.id).await.unwrap();
            assert_eq!(untouched.last_notification_sent, None);
            assert!(untouched.is_due(now));
        }
        for reminder in &reminders[2..] {
            let updated = ctx.repos.reminders.find(&reminder.id).await.unwrap();
            assert_eq!(updated.last_notification_sent, Some(now));
            assert!(!updated.is_due(now));
        }
    }

    #[actix_web::main]
    #[test]
    async fn reports_when_no_reminders_exist() {
        let (ctx, gateway) = setup(ts(2024, 1, 1, 10, 0, 0), 100);

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(report.message, "No reminders found");
        assert!(gateway.sent_chunks().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn custom_message_is_used_as_notification_body() {
        let now = ts(2024, 1, 1, 10, 0, 0);
        let (ctx, gateway) = setup(now, 100);
        let reminder = insert_reminder_with_target(
            &ctx,
            Frequency::Daily,
            ts(2024, 1, 1, 9, 0, 0),
            "ExponentPushToken[aaa]",
        )
        .await;

        // Second reminder on the same plant, with a user-written message
        let custom = Reminder {
            id: ID::new(),
            message: Some("Check the moss pole".to_string()),
            ..reminder.clone()
        };
        ctx.repos.reminders.insert(&custom).await.unwrap();

        let report = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(report.sent, 2);
        let bodies = gateway
            .sent_messages()
            .into_iter()
            .map(|m| m.body)
            .collect::<Vec<_>>();
        assert!(bodies.contains(&"Time to water your plant!".to_string()));
        assert!(bodies.contains(&"Check the moss pole".to_string()));
    }
}
