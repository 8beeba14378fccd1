mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;
use sprout_notify_domain::{Reminder, ID};

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    async fn find_all(&self) -> anyhow::Result<Vec<Reminder>>;
    /// Advances a reminder's schedule after its notification was handed to
    /// the push transport. This is the only writer of
    /// `last_notification_sent` and `reminder_time`; `reminder_time` is left
    /// untouched when `reminder_time` is `None` (one-time reminders).
    async fn update_schedule(
        &self,
        reminder_id: &ID,
        last_notification_sent: i64,
        reminder_time: Option<i64>,
    ) -> anyhow::Result<()>;
}
