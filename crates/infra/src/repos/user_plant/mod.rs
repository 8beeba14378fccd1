mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserPlantRepo;
pub use postgres::PostgresUserPlantRepo;
use sprout_notify_domain::{UserPlant, ID};

#[async_trait::async_trait]
pub trait IUserPlantRepo: Send + Sync {
    async fn insert(&self, user_plant: &UserPlant) -> anyhow::Result<()>;
    async fn find(&self, user_plant_id: &ID) -> Option<UserPlant>;
}
