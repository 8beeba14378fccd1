use super::IReminderRepo;
use sprout_notify_domain::{Reminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    user_plant_uid: Uuid,
    reminder_type: String,
    frequency: String,
    reminder_time: i64,
    last_notification_sent: Option<i64>,
    message: Option<String>,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = anyhow::Error;

    fn try_from(raw: ReminderRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.reminder_uid.into(),
            user_plant_id: raw.user_plant_uid.into(),
            reminder_type: raw.reminder_type.parse()?,
            frequency: raw.frequency.parse()?,
            reminder_time: raw.reminder_time,
            last_notification_sent: raw.last_notification_sent,
            message: raw.message,
        })
    }
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO care_reminders
            (reminder_uid, user_plant_uid, reminder_type, frequency, reminder_time, last_notification_sent, message)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*reminder.id.inner_ref())
        .bind(*reminder.user_plant_id.inner_ref())
        .bind(reminder.reminder_type.as_str())
        .bind(reminder.frequency.as_str())
        .bind(reminder.reminder_time)
        .bind(reminder.last_notification_sent)
        .bind(reminder.message.clone())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert care reminder: {:?}. DB returned error: {:?}",
                reminder, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM care_reminders
            WHERE reminder_uid = $1
            "#,
        )
        .bind(*reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .and_then(|raw| Reminder::try_from(raw).ok())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM care_reminders
            ORDER BY reminder_time
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to fetch care reminders. DB returned error: {:?}", e);
            e
        })?;

        Ok(reminders
            .into_iter()
            .filter_map(|raw| match Reminder::try_from(raw) {
                Ok(reminder) => Some(reminder),
                Err(e) => {
                    // A malformed row is skipped, never treated as due
                    error!("Skipping malformed care reminder row: {:?}", e);
                    None
                }
            })
            .collect())
    }

    async fn update_schedule(
        &self,
        reminder_id: &ID,
        last_notification_sent: i64,
        reminder_time: Option<i64>,
    ) -> anyhow::Result<()> {
        let res = match reminder_time {
            Some(next) => {
                sqlx::query(
                    r#"
                    UPDATE care_reminders
                    SET last_notification_sent = $2,
                    reminder_time = $3
                    WHERE reminder_uid = $1
                    "#,
                )
                .bind(*reminder_id.inner_ref())
                .bind(last_notification_sent)
                .bind(next)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE care_reminders
                    SET last_notification_sent = $2
                    WHERE reminder_uid = $1
                    "#,
                )
                .bind(*reminder_id.inner_ref())
                .bind(last_notification_sent)
                .execute(&self.pool)
                .await
            }
        };

        res.map_err(|e| {
            error!(
                "Unable to advance schedule for reminder with id: {}. DB returned error: {:?}",
                reminder_id, e
            );
            e
        })?;
        Ok(())
    }
}
