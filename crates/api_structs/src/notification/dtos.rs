use serde::{Deserialize, Serialize};
use sprout_notify_domain::DeliveryTicket;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTicketDTO {
    pub status: String,
    pub id: Option<String>,
    pub message: Option<String>,
}

impl DeliveryTicketDTO {
    pub fn new(ticket: &DeliveryTicket) -> Self {
        Self {
            status: ticket.status.as_str().to_string(),
            id: ticket.id.clone(),
            message: ticket.message.clone(),
        }
    }
}
