use super::IPushGateway;
use sprout_notify_domain::{DeliveryTicket, PushMessage, ID};
use std::collections::HashSet;
use std::sync::Mutex;

/// Push gateway that records submitted chunks instead of talking to Expo.
/// Tests can poison specific tokens to make the chunk containing them fail
/// at submission.
pub struct InMemoryPushGateway {
    chunk_limit: usize,
    sent: Mutex<Vec<Vec<PushMessage>>>,
    failing_tokens: Mutex<HashSet<String>>,
}

impl InMemoryPushGateway {
    pub fn new(chunk_limit: usize) -> Self {
        Self {
            chunk_limit,
            sent: Mutex::new(Vec::new()),
            failing_tokens: Mutex::new(HashSet::new()),
        }
    }

    /// Every chunk containing a message addressed to this token will fail
    /// with a simulated transport error
    pub fn fail_chunks_containing(&self, push_token: &str) {
        self.failing_tokens
            .lock()
            .unwrap()
            .insert(push_token.to_string());
    }

    /// The chunks submitted so far, in submission order
    pub fn sent_chunks(&self) -> Vec<Vec<PushMessage>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait::async_trait]
impl IPushGateway for InMemoryPushGateway {
    fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    async fn send_chunk(&self, messages: &[PushMessage]) -> anyhow::Result<Vec<DeliveryTicket>> {
        if messages.len() > self.chunk_limit {
            return Err(anyhow::anyhow!(
                "Chunk of {} messages exceeds the limit of {}",
                messages.len(),
                self.chunk_limit
            ));
        }

        {
            let failing_tokens = self.failing_tokens.lock().unwrap();
            if messages.iter().any(|m| failing_tokens.contains(&m.to)) {
                return Err(anyhow::anyhow!("Simulated transport failure"));
            }
        }

        self.sent.lock().unwrap().push(messages.to_vec());
        Ok(messages
            .iter()
            .map(|_| DeliveryTicket::ok(ID::new().as_string()))
            .collect())
    }
}
