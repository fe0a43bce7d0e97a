use std::path::PathBuf;

use serde::Serialize;
use serde::Deserialize;
use uuid::Uuid;

pub const CACHE_FILE: &str = "player.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// `level.dat` of the main world.
    pub world: PathBuf,
    pub player_data: PathBuf,
    pub stats: PathBuf,
    pub advancements: PathBuf,
    pub whitelist: PathBuf,
    pub banlist: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {

    fn default() -> Self {
        Self {
            world: PathBuf::from("world/level.dat"),
            player_data: PathBuf::from("world/playerdata"),
            stats: PathBuf::from("world/stats"),
            advancements: PathBuf::from("world/advancements"),
            whitelist: PathBuf::from("whitelist.json"),
            banlist: PathBuf::from("banned-players.json"),
            output: PathBuf::from("data"),
        }
    }
}

impl PathsConfig {

    pub fn player_dat(&self, uuid: &Uuid) -> PathBuf {
        self.player_data.join(format!("{}.dat", uuid.hyphenated()))
    }

    pub fn stats_file(&self, uuid: &Uuid) -> PathBuf {
        self.stats.join(format!("{}.json", uuid.hyphenated()))
    }

    pub fn advancements_file(&self, uuid: &Uuid) -> PathBuf {
        self.advancements.join(format!("{}.json", uuid.hyphenated()))
    }

    /// Holds the cache file and the images of one player.
    pub fn player_dir(&self, uuid: &Uuid) -> PathBuf {
        self.output.join(uuid.simple().to_string())
    }

    pub fn cache_file(&self, uuid: &Uuid) -> PathBuf {
        self.player_dir(uuid).join(CACHE_FILE)
    }
}
