use super::INotificationUserRepo;
use crate::repos::shared::inmemory_repo::*;
use sprout_notify_domain::{NotificationUser, ID};

pub struct InMemoryNotificationUserRepo {
    users: std::sync::Mutex<Vec<NotificationUser>>,
}

impl InMemoryNotificationUserRepo {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationUserRepo for InMemoryNotificationUserRepo {
    async fn insert(&self, user: &NotificationUser) -> anyhow::Result<()> {
        insert(user, &self.users);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Option<NotificationUser> {
        find(user_id, &self.users)
    }

    async fn find_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<NotificationUser>> {
        Ok(find_by(&self.users, |u| user_ids.contains(&u.user_id)))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<NotificationUser>> {
        Ok(find_by(&self.users, |_| true))
    }
}
