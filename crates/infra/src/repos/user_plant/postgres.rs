use super::IUserPlantRepo;
use sprout_notify_domain::{UserPlant, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresUserPlantRepo {
    pool: PgPool,
}

impl PostgresUserPlantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserPlantRaw {
    user_plant_uid: Uuid,
    user_uid: Uuid,
}

impl From<UserPlantRaw> for UserPlant {
    fn from(raw: UserPlantRaw) -> Self {
        Self {
            id: raw.user_plant_uid.into(),
            user_id: raw.user_uid.into(),
        }
    }
}

#[async_trait::async_trait]
impl IUserPlantRepo for PostgresUserPlantRepo {
    async fn insert(&self, user_plant: &UserPlant) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_plants(user_plant_uid, user_uid)
            VALUES($1, $2)
            "#,
        )
        .bind(*user_plant.id.inner_ref())
        .bind(*user_plant.user_id.inner_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert user plant: {:?}. DB returned error: {:?}",
                user_plant, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, user_plant_id: &ID) -> Option<UserPlant> {
        sqlx::query_as::<_, UserPlantRaw>(
            r#"
            SELECT * FROM user_plants
            WHERE user_plant_uid = $1
            "#,
        )
        .bind(*user_plant_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|raw| raw.into())
    }
}
