use crate::dtos::DeliveryTicketDTO;
use serde::{Deserialize, Serialize};
use sprout_notify_domain::{DeliveryTicket, ID};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummaryResponse {
    pub success: bool,
    pub message: String,
    pub sent: usize,
    pub tickets: Vec<DeliveryTicketDTO>,
    pub timestamp: i64,
}

impl NotificationSummaryResponse {
    pub fn new(message: String, sent: usize, tickets: &[DeliveryTicket], timestamp: i64) -> Self {
        Self {
            success: true,
            message,
            sent,
            tickets: tickets.iter().map(DeliveryTicketDTO::new).collect(),
            timestamp,
        }
    }
}

pub mod run_reminder_sweep {
    use super::*;

    pub type APIResponse = NotificationSummaryResponse;
}

pub mod notify_all_users {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: String,
        pub body: String,
        #[serde(default)]
        pub data: serde_json::Value,
    }

    pub type APIResponse = NotificationSummaryResponse;
}

pub mod notify_users {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_ids: Vec<ID>,
        pub title: String,
        pub body: String,
        #[serde(default)]
        pub data: serde_json::Value,
    }

    pub type APIResponse = NotificationSummaryResponse;
}
