use super::IUserPlantRepo;
use crate::repos::shared::inmemory_repo::*;
use sprout_notify_domain::{UserPlant, ID};

pub struct InMemoryUserPlantRepo {
    user_plants: std::sync::Mutex<Vec<UserPlant>>,
}

impl InMemoryUserPlantRepo {
    pub fn new() -> Self {
        Self {
            user_plants: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUserPlantRepo for InMemoryUserPlantRepo {
    async fn insert(&self, user_plant: &UserPlant) -> anyhow::Result<()> {
        insert(user_plant, &self.user_plants);
        Ok(())
    }

    async fn find(&self, user_plant_id: &ID) -> Option<UserPlant> {
        find(user_plant_id, &self.user_plants)
    }
}
