use std::io;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use uuid::Uuid;

use crate::assets::AssetFetcher;
use crate::client;
use crate::client::HttpClient;
use crate::config::Config;
use crate::lists;
use crate::lists::ListError;
use crate::namehistory::NameHistoryClient;
use crate::namehistory::ratelimit::RateLimiter;
use crate::player::PlayerAggregator;
use crate::player::data::now_millis;
use crate::state;

use self::summary::ServerSummary;

pub mod summary;

pub const SUMMARY_FILE: &str = "server.json";


#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    List(#[from] ListError),
    #[error("cannot write summary: {0}")]
    Io(#[from] io::Error),
    #[error("cannot encode summary: {0}")]
    Serialize(#[from] serde_json::Error),
}


async fn ctrl_c_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to register CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}

pub async fn run(config: &Config) {
    let http = client::build(&config.client);
    tokio::select! {
        r = run_with(config, http) => match r {
            Ok(summary) => tracing::info!("run finished: {} players", summary.players.len()),
            Err(e) => tracing::error!("run failed: {}", e),
        },
        _ = ctrl_c_signal() => tracing::warn!("interrupted, snapshots in flight are dropped"),
    }
}

/// Aggregates every whitelisted or banned player and writes the summary file.
pub async fn run_with(config: &Config, http: Arc<dyn HttpClient>) -> Result<ServerSummary, RunError> {
    let paths = &config.paths;
    let limiter = RateLimiter::new(config.name_history.ratelimit);
    if !limiter.is_enabled() {
        tracing::warn!("name history rate limit disabled");
    }
    let names = NameHistoryClient::new(http.clone(), &config.name_history, limiter);
    let assets = AssetFetcher::new(http, &config.assets);
    let aggregator = PlayerAggregator::new(paths, names, assets);

    let whitelist = lists::read_uuid_list(&paths.whitelist).await?;
    let banlist = lists::read_uuid_list(&paths.banlist).await?;
    let players = whitelist.union(&banlist).copied().collect::<Vec<Uuid>>();
    tracing::info!("aggregating {} players ({} banned)", players.len(), banlist.len());

    let world_time = match state::read_world(&paths.world).await {
        Ok(world) => Some(world.time),
        Err(e) => {
            tracing::warn!("world time unavailable: {}", e);
            None
        }
    };

    let results = stream::iter(players)
        .map(|uuid| {
            let aggregator = aggregator.clone();
            let banned = banlist.contains(&uuid);
            async move { aggregator.create_player_data(&uuid, banned).await }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    let mut done = Vec::with_capacity(results.len());
    for r in results {
        match r {
            Ok(snapshot) => done.push(snapshot.uuid),
            Err(e) => tracing::error!("{}", e),
        }
    }
    done.sort();

    let summary = ServerSummary { world_time, players: done, last_update: now_millis() };
    tokio::fs::create_dir_all(&paths.output).await?;
    tokio::fs::write(paths.output.join(SUMMARY_FILE), serde_json::to_vec_pretty(&summary)?).await?;
    Ok(summary)
}
