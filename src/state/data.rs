use serde::Deserialize;

pub const TICKS_PER_SECOND: i64 = 20;

pub fn ticks_to_seconds(ticks: i64) -> i64 {
    ticks / TICKS_PER_SECOND
}


/// Fields taken from `playerdata/<uuid>.dat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// Epoch milliseconds.
    pub first_played: i64,
    /// Epoch milliseconds.
    pub last_played: i64,
    /// Seconds; `None` when the server never wrote the tick counter.
    pub time_lived: Option<i64>,
}

/// Fields taken from `level.dat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldState {
    /// Seconds of world time.
    pub time: i64,
}


#[derive(Debug, Deserialize)]
pub(super) struct PlayerDat {
    pub bukkit: Option<BukkitCompound>,
    #[serde(rename = "Spigot.ticksLived")]
    pub ticks_lived: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BukkitCompound {
    #[serde(rename = "firstPlayed")]
    pub first_played: Option<i64>,
    #[serde(rename = "lastPlayed")]
    pub last_played: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LevelDat {
    #[serde(rename = "Data")]
    pub data: Option<LevelData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LevelData {
    #[serde(rename = "Time")]
    pub time: Option<i64>,
}
