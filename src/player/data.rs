use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::namehistory::data::NameHistory;
use crate::stats::CanonicalStats;


/// Everything a display needs about one player; also the cache file payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {

    pub uuid: Uuid,

    pub playername: String,

    /// Newest first.
    pub names: NameHistory,

    /// Epoch milliseconds.
    pub time_start: i64,

    /// Epoch milliseconds.
    pub time_last: i64,

    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_lived: Option<i64>,

    pub banned: bool,

    /// Epoch milliseconds of the build that produced this snapshot.
    #[serde(rename = "lastUpdate")]
    pub last_update: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CanonicalStats>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_source: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advancements: Option<Value>,
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
