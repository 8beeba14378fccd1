use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A push notification addressed to a single registered device token.
/// Ephemeral: constructed per dispatch, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    /// The recipient device's push token
    pub to: String,
    pub sound: String,
    pub title: String,
    pub body: String,
    /// Opaque payload delivered to the app, carrying correlation ids
    pub data: Value,
}

impl PushMessage {
    pub fn new(to: String, title: String, body: String, data: Value) -> Self {
        Self {
            to,
            sound: "default".to_string(),
            title,
            body,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Ok,
    Error,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Per-message outcome returned by the push transport for a submitted
/// chunk, positionally aligned with the submission order. An accepted
/// ticket carries an opaque id for later receipt reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTicket {
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeliveryTicket {
    pub fn ok(id: String) -> Self {
        Self {
            status: TicketStatus::Ok,
            id: Some(id),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: TicketStatus::Error,
            id: None,
            message: Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == TicketStatus::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLogType {
    SweepReminders,
    BroadcastAll,
    BroadcastUsers,
}

impl NotificationLogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SweepReminders => "sweep_reminders",
            Self::BroadcastAll => "broadcast_all",
            Self::BroadcastUsers => "broadcast_users",
        }
    }
}

/// Record of one completed dispatch, appended to the delivery log after a
/// sweep or broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationLog {
    pub id: ID,
    pub log_type: NotificationLogType,
    pub title: String,
    pub body: String,
    pub data: Value,
    pub sent_at: i64,
    pub recipients: i64,
}

impl Entity for NotificationLog {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
