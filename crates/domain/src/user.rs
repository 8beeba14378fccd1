use crate::shared::entity::{Entity, ID};

/// A user's registered push notification device. Registration happens
/// outside this service; a user without one (or with an empty token) is
/// simply not a deliverable target.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationUser {
    pub user_id: ID,
    pub push_token: String,
}

impl NotificationUser {
    pub fn has_push_token(&self) -> bool {
        !self.push_token.trim().is_empty()
    }
}

impl Entity for NotificationUser {
    fn id(&self) -> ID {
        self.user_id.clone()
    }
}
