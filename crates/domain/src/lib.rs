mod notification;
mod plant;
mod reminder;
mod shared;
mod user;

pub use notification::{
    DeliveryTicket, NotificationLog, NotificationLogType, PushMessage, TicketStatus,
};
pub use plant::UserPlant;
pub use reminder::{Frequency, Reminder, ReminderType};
pub use shared::entity::{Entity, ID};
pub use user::NotificationUser;
