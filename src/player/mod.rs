use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Value;
use uuid::Uuid;

use crate::assets;
use crate::assets::AssetFetcher;
use crate::namehistory::LookupError;
use crate::namehistory::NameHistoryClient;
use crate::state;
use crate::state::StateError;
use crate::stats;
use crate::utils::uuid_fmt;

use self::config::PathsConfig;
use self::data::PlayerSnapshot;

pub mod config;
pub mod data;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Identity,
    PlayerState,
    NameHistory,
    Persist,
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("not a version 1-5 RFC 4122 uuid")]
    InvalidUuid,
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// A player whose required data could not be obtained. Other players are unaffected.
#[derive(Debug, thiserror::Error)]
#[error("player {uuid} failed at {stage:?}: {source}")]
pub struct AggregationError {
    pub uuid: Uuid,
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

fn failed_at<E: Into<StageError>>(uuid: &Uuid, stage: Stage) -> impl FnOnce(E) -> AggregationError {
    let uuid = *uuid;
    move |e| AggregationError { uuid, stage, source: e.into() }
}


#[derive(Clone)]
pub struct PlayerAggregator {
    paths: Arc<PathsConfig>,
    names: NameHistoryClient,
    assets: AssetFetcher,
}

impl PlayerAggregator {

    pub fn new(paths: &PathsConfig, names: NameHistoryClient, assets: AssetFetcher) -> Self {
        Self { paths: Arc::new(paths.clone()), names, assets }
    }

    /// Cached snapshot of `uuid` if there is one, a fresh build otherwise.
    /// `banned` always overrides the cached flag.
    pub async fn create_player_data(&self, uuid: &Uuid, banned: bool) -> Result<PlayerSnapshot, AggregationError> {
        if !uuid_fmt::is_canonical(uuid) {
            return Err(AggregationError { uuid: *uuid, stage: Stage::Identity, source: StageError::InvalidUuid });
        }
        let dir = self.paths.player_dir(uuid);
        let cache_file = self.paths.cache_file(uuid);

        let mut snapshot = match load_cache(uuid, &cache_file).await {
            Some(snapshot) => {
                tracing::debug!("cache hit @{}", uuid);
                snapshot
            }
            None => {
                tracing::debug!("cache miss @{}", uuid);
                self.build(uuid).await?
            }
        };

        if assets::assets_present(&dir).await {
            tracing::trace!("assets present @{}", uuid);
        } else {
            self.assets.fetch_assets(uuid, &dir).await;
        }

        snapshot.banned = banned;
        persist(&dir, &cache_file, &snapshot).await.map_err(failed_at(uuid, Stage::Persist))?;
        Ok(snapshot)
    }

    async fn build(&self, uuid: &Uuid) -> Result<PlayerSnapshot, AggregationError> {
        let stats_source = read_optional_json(&self.paths.stats_file(uuid)).await;
        let advancements = read_optional_json(&self.paths.advancements_file(uuid)).await;
        let player_state = state::read_player(&self.paths.player_dat(uuid))
            .await
            .map_err(failed_at(uuid, Stage::PlayerState))?;
        let names = self.names.fetch_name_history(uuid)
            .await
            .map_err(failed_at(uuid, Stage::NameHistory))?;
        let playername = names.first()
            .map(|e| e.name.clone())
            .ok_or(LookupError::Empty)
            .map_err(failed_at(uuid, Stage::NameHistory))?;
        let stats = stats_source.as_ref().map(stats::merge);
        tracing::info!("built @{} ({})", uuid, playername);
        Ok(PlayerSnapshot {
            uuid: *uuid,
            playername,
            names,
            time_start: player_state.first_played,
            time_last: player_state.last_played,
            time_lived: player_state.time_lived,
            banned: false,
            last_update: data::now_millis(),
            stats,
            stats_source,
            advancements,
        })
    }
}


/// `None` on a missing or unusable cache; the caller rebuilds.
async fn load_cache(uuid: &Uuid, path: &Path) -> Option<PlayerSnapshot> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("cache @{} unreadable, rebuilding: {}", uuid, e);
            return None;
        }
    };
    match serde_json::from_slice::<PlayerSnapshot>(&raw) {
        Ok(snapshot) if snapshot.uuid == *uuid => Some(snapshot),
        Ok(snapshot) => {
            tracing::warn!("cache @{} belongs to {}, rebuilding", uuid, snapshot.uuid);
            None
        }
        Err(e) => {
            tracing::warn!("cache @{} malformed, rebuilding: {}", uuid, e);
            None
        }
    }
}

/// Missing or malformed optional documents become absent fields.
async fn read_optional_json(path: &Path) -> Option<Value> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("skip {:?}: {}", path, e);
            }
            return None;
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("skip malformed {:?}: {}", path, e);
            None
        }
    }
}

static PERSIST_SEQ: AtomicU64 = AtomicU64::new(0);

/// Each write goes through its own temp file, so overlapping runs for one
/// uuid end with one of the complete snapshots rather than a failed rename.
async fn persist(dir: &Path, cache_file: &Path, snapshot: &PlayerSnapshot) -> Result<(), StageError> {
    tokio::fs::create_dir_all(dir).await?;
    let body = serde_json::to_vec_pretty(snapshot)?;
    let seq = PERSIST_SEQ.fetch_add(1, Ordering::Relaxed);
    let tmp = cache_file.with_extension(format!("json.{}.{}.tmp", std::process::id(), seq));
    tokio::fs::write(&tmp, &body).await?;
    tokio::fs::rename(&tmp, cache_file).await?;
    Ok(())
}


#[cfg(test)]
mod test {

    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use hyper::StatusCode;
    use tempfile::TempDir;

    use crate::assets::config::AssetConfig;
    use crate::client::fake::FakeClient;
    use crate::namehistory::config::NameHistoryConfig;
    use crate::namehistory::ratelimit::RateLimiter;
    use crate::state::fixture::write_player_dat;

    use super::*;

    const NAMES: &str = r#"[{"name":"Original"},{"name":"Latest","changedToAt":1600000000000},{"name":"Middle","changedToAt":1500000000000}]"#;

    struct Fixture {
        _dir: TempDir,
        paths: PathsConfig,
        fake: Arc<FakeClient>,
        aggregator: PlayerAggregator,
        uuid: Uuid,
    }

    fn fixture_with(handler: impl Fn(&str) -> (StatusCode, Vec<u8>) + Send + Sync + 'static) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let paths = PathsConfig {
            world: root.join("world/level.dat"),
            player_data: root.join("world/playerdata"),
            stats: root.join("world/stats"),
            advancements: root.join("world/advancements"),
            whitelist: root.join("whitelist.json"),
            banlist: root.join("banned-players.json"),
            output: root.join("data"),
        };
        let fake = Arc::new(FakeClient::new(handler));
        let name_config = NameHistoryConfig { base_url: "http://names.test".to_string(), ratelimit: Duration::ZERO };
        let names = NameHistoryClient::new(fake.clone(), &name_config, RateLimiter::new(Duration::ZERO));
        let assets = AssetFetcher::new(fake.clone(), &AssetConfig { base_url: "http://render.test".to_string(), ..Default::default() });
        let aggregator = PlayerAggregator::new(&paths, names, assets);
        let uuid = Uuid::parse_str("4566e69f-c907-48ee-8d71-d7ba5aa00d20").unwrap();
        Fixture { _dir: dir, paths, fake, aggregator, uuid }
    }

    fn fixture() -> Fixture {
        fixture_with(|uri| {
            if uri.contains("/names") {
                (StatusCode::OK, NAMES.as_bytes().to_vec())
            } else {
                (StatusCode::OK, b"\x89PNG".to_vec())
            }
        })
    }

    fn write(path: PathBuf, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    impl Fixture {

        fn seed_save(&self) {
            write_player_dat(&self.paths.player_dat(&self.uuid), 1_500_000_000_000, 1_650_000_000_000, Some(72000));
        }

        fn seed_json(&self) {
            write(self.paths.stats_file(&self.uuid), r#"{"stats":{"minecraft:custom":{"minecraft:jump":7}},"DataVersion":3465}"#);
            write(self.paths.advancements_file(&self.uuid), r#"{"minecraft:story/root":{"done":true},"DataVersion":3465}"#);
        }

        fn cache_bytes(&self) -> Vec<u8> {
            std::fs::read(self.paths.cache_file(&self.uuid)).unwrap()
        }
    }

    #[tokio::test]
    async fn full_build() {
        let f = fixture();
        f.seed_save();
        f.seed_json();
        let s = f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert_eq!(s.playername, "Latest");
        assert_eq!(s.names.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["Latest", "Middle", "Original"]);
        assert_eq!(s.time_start, 1_500_000_000_000);
        assert_eq!(s.time_last, 1_650_000_000_000);
        assert_eq!(s.time_lived, Some(3600));
        assert!(!s.banned);
        assert!(s.last_update > 0);
        assert_eq!(s.stats.as_ref().unwrap()["custom"]["jump"], 7);
        assert_eq!(s.stats_source.as_ref().unwrap()["DataVersion"], 3465);
        assert_eq!(s.advancements.as_ref().unwrap()["minecraft:story/root"]["done"], true);

        let dir = f.paths.player_dir(&f.uuid);
        assert!(dir.ends_with("4566e69fc90748ee8d71d7ba5aa00d20"));
        for file in ["avatar.png", "body.png", "skin.png", "player.json"] {
            assert!(dir.join(file).exists(), "{}", file);
        }
        let cached: PlayerSnapshot = serde_json::from_slice(&f.cache_bytes()).unwrap();
        assert_eq!(cached, s);
    }

    #[tokio::test]
    async fn cache_hit_is_identical_and_offline() {
        let f = fixture();
        f.seed_save();
        f.seed_json();
        let first = f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        let first_bytes = f.cache_bytes();
        let calls = f.fake.uris().len();
        assert_eq!(calls, 4);

        let second = f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert_eq!(f.fake.uris().len(), calls);
        assert_eq!(f.cache_bytes(), first_bytes);
        assert_eq!(serde_json::to_vec(&second).unwrap(), serde_json::to_vec(&first).unwrap());
    }

    #[tokio::test]
    async fn ban_flag_overrides_cache() {
        let f = fixture();
        f.seed_save();
        let s = f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert!(!s.banned);
        let s = f.aggregator.create_player_data(&f.uuid, true).await.unwrap();
        assert!(s.banned);
        let cached: PlayerSnapshot = serde_json::from_slice(&f.cache_bytes()).unwrap();
        assert!(cached.banned);
        let s = f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert!(!s.banned);
        assert_eq!(f.fake.calls_matching("/names"), 1);
    }

    #[tokio::test]
    async fn present_assets_are_not_downloaded() {
        let f = fixture();
        f.seed_save();
        let dir = f.paths.player_dir(&f.uuid);
        write(dir.join("avatar.png"), "a");
        write(dir.join("body.png"), "b");
        f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert_eq!(f.fake.uris().len(), 1);
        assert_eq!(f.fake.calls_matching("/names"), 1);
    }

    #[tokio::test]
    async fn one_missing_asset_refetches_all_three() {
        let f = fixture();
        f.seed_save();
        f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        std::fs::remove_file(f.paths.player_dir(&f.uuid).join("body.png")).unwrap();

        f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert_eq!(f.fake.calls_matching("/avatars/"), 2);
        assert_eq!(f.fake.calls_matching("/renders/body/"), 2);
        assert_eq!(f.fake.calls_matching("/skins/"), 2);
        // still served from cache
        assert_eq!(f.fake.calls_matching("/names"), 1);
    }

    #[tokio::test]
    async fn optional_documents_may_be_absent() {
        let f = fixture();
        f.seed_save();
        let s = f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert!(s.stats.is_none());
        assert!(s.stats_source.is_none());
        assert!(s.advancements.is_none());
        let text = String::from_utf8(f.cache_bytes()).unwrap();
        assert!(!text.contains("stats"));
    }

    #[tokio::test]
    async fn missing_save_fails_before_lookup() {
        let f = fixture();
        let e = f.aggregator.create_player_data(&f.uuid, false).await.unwrap_err();
        assert_eq!(e.uuid, f.uuid);
        assert_eq!(e.stage, Stage::PlayerState);
        assert!(matches!(e.source, StageError::State(StateError::NotFound(_))));
        assert!(f.fake.uris().is_empty());
        assert!(!f.paths.cache_file(&f.uuid).exists());
    }

    #[tokio::test]
    async fn lookup_failure_fails_player() {
        let f = fixture_with(|_| (StatusCode::TOO_MANY_REQUESTS, Vec::new()));
        f.seed_save();
        let e = f.aggregator.create_player_data(&f.uuid, false).await.unwrap_err();
        assert_eq!(e.stage, Stage::NameHistory);
        assert!(matches!(e.source, StageError::Lookup(_)));
        assert!(!f.paths.cache_file(&f.uuid).exists());
        // assets are never reached
        assert_eq!(f.fake.uris().len(), 1);
    }

    #[tokio::test]
    async fn asset_failure_is_not_fatal() {
        let f = fixture_with(|uri| {
            if uri.contains("/names") {
                (StatusCode::OK, NAMES.as_bytes().to_vec())
            } else {
                (StatusCode::BAD_GATEWAY, Vec::new())
            }
        });
        f.seed_save();
        let s = f.aggregator.create_player_data(&f.uuid, true).await.unwrap();
        assert!(s.banned);
        assert!(f.paths.cache_file(&f.uuid).exists());
    }

    #[tokio::test]
    async fn non_canonical_uuid_is_refused() {
        let f = fixture();
        for uuid in [Uuid::nil(), Uuid::parse_str("4566e69f-c907-68ee-8d71-d7ba5aa00d20").unwrap()] {
            write_player_dat(&f.paths.player_dat(&uuid), 1, 2, None);
            let e = f.aggregator.create_player_data(&uuid, false).await.unwrap_err();
            assert_eq!(e.uuid, uuid);
            assert_eq!(e.stage, Stage::Identity);
            assert!(matches!(e.source, StageError::InvalidUuid));
            assert!(!f.paths.player_dir(&uuid).exists());
        }
        assert!(f.fake.uris().is_empty());
    }

    #[tokio::test]
    async fn overlapping_runs_for_one_player_both_persist() {
        let f = fixture();
        f.seed_save();
        let (a, b) = tokio::join!(
            f.aggregator.create_player_data(&f.uuid, false),
            f.aggregator.create_player_data(&f.uuid, true),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        let cached: PlayerSnapshot = serde_json::from_slice(&f.cache_bytes()).unwrap();
        assert_eq!(cached.uuid, f.uuid);
        let leftovers = std::fs::read_dir(f.paths.player_dir(&f.uuid)).unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn malformed_cache_is_rebuilt() {
        let f = fixture();
        f.seed_save();
        write(f.paths.cache_file(&f.uuid), "{ truncated");
        let s = f.aggregator.create_player_data(&f.uuid, false).await.unwrap();
        assert_eq!(s.playername, "Latest");
        assert_eq!(f.fake.calls_matching("/names"), 1);
        let cached: PlayerSnapshot = serde_json::from_slice(&f.cache_bytes()).unwrap();
        assert_eq!(cached, s);
    }
}
