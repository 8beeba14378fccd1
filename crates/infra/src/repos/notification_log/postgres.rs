use super::INotificationLogRepo;
use sprout_notify_domain::NotificationLog;
use sqlx::PgPool;
use tracing::error;

pub struct PostgresNotificationLogRepo {
    pool: PgPool,
}

impl PostgresNotificationLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl INotificationLogRepo for PostgresNotificationLogRepo {
    async fn insert(&self, log: &NotificationLog) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_logs
            (log_uid, log_type, title, body, data, sent_at, recipients)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*log.id.inner_ref())
        .bind(log.log_type.as_str())
        .bind(log.title.clone())
        .bind(log.body.clone())
        .bind(log.data.clone())
        .bind(log.sent_at)
        .bind(log.recipients)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert notification log: {:?}. DB returned error: {:?}",
                log, e
            );
            e
        })?;
        Ok(())
    }
}
