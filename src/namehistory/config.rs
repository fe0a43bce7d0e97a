use std::time::Duration;

use serde::Serialize;
use serde::Deserialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameHistoryConfig {
    /// Root of a service answering `/user/profiles/{uuid}/names`.
    pub base_url: String,
    /// Hold time after a successful lookup; failures hold three times as long.
    /// Zero turns the gate off.
    #[serde(with = "crate::utils::duration_fmt")]
    pub ratelimit: Duration,
}

impl Default for NameHistoryConfig {

    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:6080"),
            ratelimit: Duration::from_secs(1),
        }
    }
}
