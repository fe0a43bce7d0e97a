use crate::utils::configfile::ConfigFile;

mod assets;
mod client;
mod config;
mod lists;
mod namehistory;
mod player;
mod runner;
mod state;
mod stats;
mod utils;

fn main() {

    let level = if let Ok(s) = std::env::var("LOG_LEVEL") {
        match s.as_str() {
            "TRACE" | "trace" => tracing::Level::TRACE,
            "DEBUG" | "debug" => tracing::Level::DEBUG,
            "INFO" | "info" => tracing::Level::INFO,
            "WARN" | "warn" => tracing::Level::WARN,
            "ERROR" | "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO
        }
    } else {
        tracing::Level::INFO
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let loaded = match std::env::var("CONFIG") {
        Ok(path) => ConfigFile::<config::Config>::new(path),
        Err(_) => ConfigFile::<config::Config>::new_nearby("config.json"),
    };
    let (cfg, created) = match loaded {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    if created {
        tracing::info!("default config written to {:?}, edit it and run again", cfg.path());
        return;
    }
    tracing::debug!("{:?}", cfg.data());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("building tokio runtime failed");
    rt.block_on(runner::run(cfg.data()));
}
