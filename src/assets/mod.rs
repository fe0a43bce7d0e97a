use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::join_all;
use uuid::Uuid;

use crate::client;
use crate::client::HttpClient;
use crate::client::RequestError;

use self::config::AssetConfig;

pub mod config;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Avatar,
    Body,
    Skin,
}

impl Asset {

    pub const ALL: [Asset; 3] = [Asset::Avatar, Asset::Body, Asset::Skin];

    /// The two images a display needs; their presence means the set was fetched.
    pub const REQUIRED: [Asset; 2] = [Asset::Avatar, Asset::Body];

    pub fn file_name(&self) -> &'static str {
        match self {
            Asset::Avatar => "avatar.png",
            Asset::Body => "body.png",
            Asset::Skin => "skin.png",
        }
    }
}


/// Skin used by the renderer when the player never uploaded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultModel {
    Steve,
    Alex,
}

impl DefaultModel {

    /// Same parity rule as the game client: the low bit of Java's `UUID.hashCode()`.
    pub fn for_uuid(uuid: &Uuid) -> Self {
        let (most, least) = uuid.as_u64_pair();
        let hilo = most ^ least;
        let hash = ((hilo >> 32) as u32) ^ (hilo as u32);
        if hash & 1 == 1 {
            DefaultModel::Alex
        } else {
            DefaultModel::Steve
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            DefaultModel::Steve => "MHF_Steve",
            DefaultModel::Alex => "MHF_Alex",
        }
    }
}


#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("download of {asset:?} failed: {source}")]
    Request { asset: Asset, source: RequestError },
    #[error("cannot write {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}


#[derive(Clone)]
pub struct AssetFetcher {
    client: Arc<dyn HttpClient>,
    config: Arc<AssetConfig>,
}

impl AssetFetcher {

    pub fn new(client: Arc<dyn HttpClient>, config: &AssetConfig) -> Self {
        let mut config = config.clone();
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self { client, config: Arc::new(config) }
    }

    fn uri(&self, uuid: &Uuid, asset: Asset, model: DefaultModel) -> String {
        let base = self.config.base_url.as_str();
        let id = uuid.simple();
        let overlay = if self.config.overlay { "&overlay" } else { "" };
        match asset {
            Asset::Avatar => format!("{}/avatars/{}?size={}&default={}{}", base, id, self.config.avatar_size, model.as_param(), overlay),
            Asset::Body => format!("{}/renders/body/{}?scale={}&default={}{}", base, id, self.config.render_scale, model.as_param(), overlay),
            Asset::Skin => format!("{}/skins/{}?default={}", base, id, model.as_param()),
        }
    }

    async fn fetch_one(&self, uuid: &Uuid, asset: Asset, model: DefaultModel, dir: &Path) -> Result<(), AssetError> {
        let data = client::get_bytes(self.client.as_ref(), self.uri(uuid, asset, model).as_str())
            .await
            .map_err(|source| AssetError::Request { asset, source })?;
        let path = dir.join(asset.file_name());
        tokio::fs::write(&path, &data)
            .await
            .map_err(|source| AssetError::Io { path, source })
    }

    /// Downloads every image into `dir`. Failures are logged and skipped;
    /// returns how many files were written.
    pub async fn fetch_assets(&self, uuid: &Uuid, dir: &Path) -> usize {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::warn!("assets @{}: cannot create {:?}: {}", uuid, dir, e);
            return 0;
        }
        let model = DefaultModel::for_uuid(uuid);
        let results = join_all(Asset::ALL.iter().map(|a| self.fetch_one(uuid, *a, model, dir))).await;
        let mut written = 0;
        for r in results {
            match r {
                Ok(()) => written += 1,
                Err(e) => tracing::warn!("assets @{}: {}", uuid, e),
            }
        }
        tracing::debug!("assets @{}: {}/{} written", uuid, written, Asset::ALL.len());
        written
    }
}

pub async fn assets_present(dir: &Path) -> bool {
    for asset in Asset::REQUIRED {
        if tokio::fs::metadata(dir.join(asset.file_name())).await.is_err() {
            return false;
        }
    }
    true
}
