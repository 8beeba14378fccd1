use futures::stream::{self, StreamExt};
use sprout_notify_domain::{DeliveryTicket, PushMessage};
use sprout_notify_infra::IPushGateway;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// How many chunk submissions may be in flight at once. Chunks are
/// independent by construction, so this only bounds resource usage.
const MAX_CONCURRENT_CHUNK_SUBMISSIONS: usize = 4;

/// Result of submitting a message list to the push gateway in chunks.
///
/// `tickets` holds the per-message outcomes of every accepted chunk, in
/// submission order. `attempted` holds the indices (into the submitted
/// message list) of every message whose chunk was submitted without a
/// transport-level error; only those may have their schedule advanced.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub tickets: Vec<DeliveryTicket>,
    pub attempted: Vec<usize>,
}

/// Partitions `messages` into gateway-sized chunks and submits each chunk
/// independently. A chunk that fails or times out is logged and skipped;
/// it never aborts the remaining chunks.
pub async fn dispatch_in_chunks(
    gateway: &Arc<dyn IPushGateway>,
    messages: &[PushMessage],
    timeout: Duration,
) -> DispatchOutcome {
    let chunk_limit = gateway.chunk_limit().max(1);

    let submissions = messages
        .chunks(chunk_limit)
        .enumerate()
        .map(|(chunk_idx, chunk)| {
            let base = chunk_idx * chunk_limit;
            async move {
                match tokio::time::timeout(timeout, gateway.send_chunk(chunk)).await {
                    Ok(Ok(tickets)) => {
                        if tickets.len() == chunk.len() {
                            Some((base, chunk.len(), tickets))
                        } else {
                            // Outcome order within a chunk is transport
                            // guaranteed; a count mismatch means the
                            // correlation is lost and the chunk cannot be
                            // trusted
                            error!(
                                "Push gateway returned {} tickets for a chunk of {} messages, dropping chunk at offset {}",
                                tickets.len(),
                                chunk.len(),
                                base
                            );
                            None
                        }
                    }
                    Ok(Err(e)) => {
                        error!(
                            "Error sending push notification chunk at offset {}: {:?}",
                            base, e
                        );
                        None
                    }
                    Err(_) => {
                        error!(
                            "Timed out sending push notification chunk at offset {}",
                            base
                        );
                        None
                    }
                }
            }
        });

    let results = stream::iter(submissions)
        .buffered(MAX_CONCURRENT_CHUNK_SUBMISSIONS)
        .collect::<Vec<_>>()
        .await;

    let mut outcome = DispatchOutcome {
        tickets: Vec::new(),
        attempted: Vec::new(),
    };
    for (base, len, tickets) in results.into_iter().flatten() {
        outcome.tickets.extend(tickets);
        outcome.attempted.extend(base..base + len);
    }
    outcome
}
