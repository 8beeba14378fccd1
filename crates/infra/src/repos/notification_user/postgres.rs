use super::INotificationUserRepo;
use sprout_notify_domain::{NotificationUser, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresNotificationUserRepo {
    pool: PgPool,
}

impl PostgresNotificationUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationUserRaw {
    user_uid: Uuid,
    push_token: String,
}

impl From<NotificationUserRaw> for NotificationUser {
    fn from(raw: NotificationUserRaw) -> Self {
        Self {
            user_id: raw.user_uid.into(),
            push_token: raw.push_token,
        }
    }
}

#[async_trait::async_trait]
impl INotificationUserRepo for PostgresNotificationUserRepo {
    async fn insert(&self, user: &NotificationUser) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_users(user_uid, push_token)
            VALUES($1, $2)
            "#,
        )
        .bind(*user.user_id.inner_ref())
        .bind(user.push_token.clone())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert notification user: {:?}. DB returned error: {:?}",
                user, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Option<NotificationUser> {
        sqlx::query_as::<_, NotificationUserRaw>(
            r#"
            SELECT * FROM notification_users
            WHERE user_uid = $1
            "#,
        )
        .bind(*user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|raw| raw.into())
    }

    async fn find_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<NotificationUser>> {
        let ids = user_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let users = sqlx::query_as::<_, NotificationUserRaw>(
            r#"
            SELECT * FROM notification_users
            WHERE user_uid = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to fetch notification users. DB returned error: {:?}",
                e
            );
            e
        })?;
        Ok(users.into_iter().map(|raw| raw.into()).collect())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<NotificationUser>> {
        let users = sqlx::query_as::<_, NotificationUserRaw>(
            r#"
            SELECT * FROM notification_users
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to fetch notification users. DB returned error: {:?}",
                e
            );
            e
        })?;
        Ok(users.into_iter().map(|raw| raw.into()).collect())
    }
}
