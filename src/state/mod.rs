use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;

use self::data::LevelDat;
use self::data::PlayerDat;
use self::data::PlayerState;
use self::data::WorldState;

pub mod data;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];


#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no save file at {0:?}")]
    NotFound(PathBuf),
    #[error("cannot read {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot decompress {path:?}: {source}")]
    Decompress { path: PathBuf, source: io::Error },
    #[error("cannot decode {path:?}: {source}")]
    Decode { path: PathBuf, source: fastnbt::error::Error },
    #[error("{path:?} has no {field}")]
    MissingField { path: PathBuf, field: &'static str },
}


async fn read_nbt<T: DeserializeOwned>(path: &Path) -> Result<T, StateError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StateError::NotFound(path.to_path_buf())),
        Err(source) => return Err(StateError::Io { path: path.to_path_buf(), source }),
    };
    let bytes = if raw.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut out)
            .map_err(|source| StateError::Decompress { path: path.to_path_buf(), source })?;
        out
    } else {
        raw
    };
    fastnbt::from_bytes(&bytes).map_err(|source| StateError::Decode { path: path.to_path_buf(), source })
}

pub async fn read_player(path: &Path) -> Result<PlayerState, StateError> {
    let dat: PlayerDat = read_nbt(path).await?;
    let missing = |field| StateError::MissingField { path: path.to_path_buf(), field };
    let bukkit = dat.bukkit.ok_or_else(|| missing("bukkit"))?;
    Ok(PlayerState {
        first_played: bukkit.first_played.ok_or_else(|| missing("bukkit.firstPlayed"))?,
        last_played: bukkit.last_played.ok_or_else(|| missing("bukkit.lastPlayed"))?,
        time_lived: dat.ticks_lived.map(data::ticks_to_seconds),
    })
}

pub async fn read_world(path: &Path) -> Result<WorldState, StateError> {
    let dat: LevelDat = read_nbt(path).await?;
    let ticks = dat.data
        .and_then(|d| d.time)
        .ok_or_else(|| StateError::MissingField { path: path.to_path_buf(), field: "Data.Time" })?;
    Ok(WorldState { time: data::ticks_to_seconds(ticks) })
}
