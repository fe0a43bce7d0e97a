use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;
use serde::Deserialize;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub pool_size: usize,
    #[serde(with = "crate::utils::duration_fmt")]
    pub pool_idle_timeout: Duration,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub proxies: Vec<ProxyConfig>,
}

impl Default for ClientConfig {

    fn default() -> Self {
        Self {
            pool_size: 8,
            pool_idle_timeout: Duration::from_secs(30),
            user_agent: Some(format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))),
            proxies: Vec::new(),
        }
    }
}


#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub address: SocketAddr,
    pub authorization: Option<ProxyAuthorizationConfig>,
}

#[derive(Serialize, Deserialize)]
pub struct ProxyAuthorizationConfig {
    pub user_name: String,
    pub password: String,
}

impl fmt::Debug for ProxyAuthorizationConfig {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyAuthorizationConfig")
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .finish()
    }
}


#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn debug_hides_proxy_password() {
        let mut config = ClientConfig::default();
        config.proxies.push(ProxyConfig {
            address: SocketAddr::from(([127, 0, 0, 1], 3128)),
            authorization: Some(ProxyAuthorizationConfig {
                user_name: "relay".to_string(),
                password: "hunter2".to_string(),
            }),
        });
        let shown = format!("{:?}", config);
        assert!(shown.contains("relay"));
        assert!(!shown.contains("hunter2"));
        // the file still carries the real value
        let saved = serde_json::to_string(&config).unwrap();
        assert!(saved.contains("hunter2"));
    }
}
