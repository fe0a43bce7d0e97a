use serde::Serialize;
use serde::Deserialize;

use crate::assets::config::AssetConfig;
use crate::client::config::ClientConfig;
use crate::namehistory::config::NameHistoryConfig;
use crate::player::config::PathsConfig;


#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub client: ClientConfig,
    pub name_history: NameHistoryConfig,
    pub assets: AssetConfig,
    /// Players aggregated at the same time.
    pub concurrency: usize,
}

impl Default for Config {

    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            client: ClientConfig::default(),
            name_history: NameHistoryConfig::default(),
            assets: AssetConfig::default(),
            concurrency: 4,
        }
    }
}


#[cfg(test)]
mod test {

    use std::time::Duration;

    use super::*;

    #[test]
    fn default_round_trips_through_file_format() {
        let text = serde_json::to_string_pretty(&Config::default()).unwrap();
        assert!(text.contains(r#""ratelimit": "1s""#));
        let back: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(back.name_history.ratelimit, Duration::from_secs(1));
        assert_eq!(back.concurrency, 4);
    }

    #[test]
    fn zero_ratelimit_accepted() {
        let mut v = serde_json::to_value(Config::default()).unwrap();
        v["name_history"]["ratelimit"] = serde_json::json!(0);
        let c: Config = serde_json::from_value(v).unwrap();
        assert!(c.name_history.ratelimit.is_zero());
    }
}
