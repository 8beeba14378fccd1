mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationUserRepo;
pub use postgres::PostgresNotificationUserRepo;
use sprout_notify_domain::{NotificationUser, ID};

#[async_trait::async_trait]
pub trait INotificationUserRepo: Send + Sync {
    async fn insert(&self, user: &NotificationUser) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> Option<NotificationUser>;
    async fn find_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<NotificationUser>>;
    async fn find_all(&self) -> anyhow::Result<Vec<NotificationUser>>;
}
