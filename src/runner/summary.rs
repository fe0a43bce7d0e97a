use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Index written next to the player directories after each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSummary {

    /// Seconds of world time, when `level.dat` was readable.
    #[serde(rename = "worldTime")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_time: Option<i64>,

    /// Players with an up to date snapshot, sorted.
    pub players: Vec<Uuid>,

    #[serde(rename = "lastUpdate")]
    pub last_update: i64,
}
