mod notification_log;
mod notification_user;
mod reminder;
mod shared;
mod user_plant;

pub use notification_log::INotificationLogRepo;
use notification_log::{InMemoryNotificationLogRepo, PostgresNotificationLogRepo};
pub use notification_user::INotificationUserRepo;
use notification_user::{InMemoryNotificationUserRepo, PostgresNotificationUserRepo};
pub use reminder::IReminderRepo;
use reminder::{InMemoryReminderRepo, PostgresReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
pub use user_plant::IUserPlantRepo;
use user_plant::{InMemoryUserPlantRepo, PostgresUserPlantRepo};

#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn IReminderRepo>,
    pub user_plants: Arc<dyn IUserPlantRepo>,
    pub notification_users: Arc<dyn INotificationUserRepo>,
    pub notification_logs: Arc<dyn INotificationLogRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        sqlx::migrate!().run(&pool).await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            user_plants: Arc::new(PostgresUserPlantRepo::new(pool.clone())),
            notification_users: Arc::new(PostgresNotificationUserRepo::new(pool.clone())),
            notification_logs: Arc::new(PostgresNotificationLogRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            reminders: Arc::new(InMemoryReminderRepo::new()),
            user_plants: Arc::new(InMemoryUserPlantRepo::new()),
            notification_users: Arc::new(InMemoryNotificationUserRepo::new()),
            notification_logs: Arc::new(InMemoryNotificationLogRepo::new()),
        }
    }
}
