use std::sync::Arc;

use uuid::Uuid;

use crate::client;
use crate::client::HttpClient;
use crate::client::RequestError;

use self::config::NameHistoryConfig;
use self::data::NameHistory;
use self::ratelimit::Outcome;
use self::ratelimit::RateLimiter;

pub mod config;
pub mod data;
pub mod ratelimit;


#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("name history request failed: {0}")]
    Request(#[from] RequestError),
    #[error("name history is empty")]
    Empty,
}


#[derive(Clone)]
pub struct NameHistoryClient {
    client: Arc<dyn HttpClient>,
    base_url: String,
    limiter: RateLimiter,
}

impl NameHistoryClient {

    pub fn new(client: Arc<dyn HttpClient>, config: &NameHistoryConfig, limiter: RateLimiter) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    fn uri(&self, uuid: &Uuid) -> String {
        format!("{}/user/profiles/{}/names", self.base_url, uuid.simple())
    }

    /// Past and present names of `uuid`, newest first. Never retried here.
    pub async fn fetch_name_history(&self, uuid: &Uuid) -> Result<NameHistory, LookupError> {
        let admission = self.limiter.admit().await;
        let r = client::get_json::<NameHistory>(self.client.as_ref(), self.uri(uuid).as_str()).await;
        match r {
            Ok(mut history) => {
                admission.release(Outcome::Success);
                tracing::debug!("name history @{}: {} entries", uuid, history.len());
                if history.is_empty() {
                    return Err(LookupError::Empty);
                }
                data::sort_newest_first(&mut history);
                Ok(history)
            }
            Err(e) => {
                admission.release(Outcome::Failure);
                tracing::warn!("name history @{} failed: {}", uuid, e);
                Err(LookupError::Request(e))
            }
        }
    }
}
