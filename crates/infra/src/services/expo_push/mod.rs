mod inmemory;
mod push_api;

pub use inmemory::InMemoryPushGateway;
pub use push_api::ExpoPushGateway;

use sprout_notify_domain::{DeliveryTicket, PushMessage};

/// Batch-send capability of the push transport. A submission is
/// all-or-nothing at the transport-call level: on success there is exactly
/// one ticket per message, in submission order; on failure the whole chunk
/// yields no outcomes.
#[async_trait::async_trait]
pub trait IPushGateway: Send + Sync {
    /// Maximum number of messages the transport accepts in one submission
    fn chunk_limit(&self) -> usize;

    async fn send_chunk(&self, messages: &[PushMessage]) -> anyhow::Result<Vec<DeliveryTicket>>;
}
