use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use sprout_notify_domain::{Reminder, ID};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |_| true))
    }

    async fn update_schedule(
        &self,
        reminder_id: &ID,
        last_notification_sent: i64,
        reminder_time: Option<i64>,
    ) -> anyhow::Result<()> {
        let mut reminders = self.reminders.lock().unwrap();
        for reminder in reminders.iter_mut() {
            if reminder.id == *reminder_id {
                reminder.last_notification_sent = Some(last_notification_sent);
                if let Some(next) = reminder_time {
                    reminder.reminder_time = next;
                }
                return Ok(());
            }
        }
        Err(anyhow::anyhow!("No reminder with id: {}", reminder_id))
    }
}
