use super::IPushGateway;
use reqwest::Client;
use serde::Deserialize;
use sprout_notify_domain::{DeliveryTicket, PushMessage};
use std::time::Duration;
use tracing::error;

const EXPO_PUSH_API_URL: &str = "https://exp.host/--/api/v2/push/send";

// https://docs.expo.dev/push-notifications/sending-notifications/
const EXPO_PUSH_CHUNK_LIMIT: usize = 100;

pub struct ExpoPushGateway {
    client: Client,
    access_token: Option<String>,
    timeout: Duration,
}

impl ExpoPushGateway {
    pub fn new(access_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            access_token,
            timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpoPushResponse {
    data: Vec<DeliveryTicket>,
}

#[async_trait::async_trait]
impl IPushGateway for ExpoPushGateway {
    fn chunk_limit(&self) -> usize {
        EXPO_PUSH_CHUNK_LIMIT
    }

    async fn send_chunk(&self, messages: &[PushMessage]) -> anyhow::Result<Vec<DeliveryTicket>> {
        let mut req = self
            .client
            .post(EXPO_PUSH_API_URL)
            .timeout(self.timeout)
            .json(&messages);
        if let Some(access_token) = &self.access_token {
            req = req.header("authorization", format!("Bearer {}", access_token));
        }

        let res = match req.send().await {
            Ok(res) => res,
            Err(e) => {
                error!("[Network Error] Expo push API error. Error message: {:?}", e);
                return Err(anyhow::Error::new(e));
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            error!(
                "[Unexpected Response] Expo push API returned status: {}",
                status
            );
            return Err(anyhow::anyhow!(
                "Expo push API returned status: {}",
                status
            ));
        }

        let res: ExpoPushResponse = res.json().await.map_err(|e| {
            error!(
                "[Unexpected Response] Expo push API returned a malformed body. Error message: {:?}",
                e
            );
            anyhow::Error::new(e)
        })?;

        Ok(res.data)
    }
}
