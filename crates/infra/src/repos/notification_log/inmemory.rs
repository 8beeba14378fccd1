use super::INotificationLogRepo;
use crate::repos::shared::inmemory_repo::*;
use sprout_notify_domain::NotificationLog;

pub struct InMemoryNotificationLogRepo {
    logs: std::sync::Mutex<Vec<NotificationLog>>,
}

impl InMemoryNotificationLogRepo {
    pub fn new() -> Self {
        Self {
            logs: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationLogRepo for InMemoryNotificationLogRepo {
    async fn insert(&self, log: &NotificationLog) -> anyhow::Result<()> {
        insert(log, &self.logs);
        Ok(())
    }
}
