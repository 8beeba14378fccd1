use crate::shared::entity::{Entity, ID};

/// Association between a plant in a user's collection and the `User` that
/// owns it. Reminders point at a `UserPlant`; the owning user's device
/// registration is the delivery target.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPlant {
    pub id: ID,
    pub user_id: ID,
}

impl Entity for UserPlant {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
