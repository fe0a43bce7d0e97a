use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use headers::Authorization;
use hyper::Body;
use hyper::Client;
use hyper::Method;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body;
use hyper::body::Bytes;
use hyper::client::connect::Connect;
use hyper::header;
use hyper::http::HeaderValue;
use hyper_proxy::Intercept;
use hyper_proxy::Proxy;
use hyper_proxy::ProxyConnector;
use hyper_tls::HttpsConnector;
use serde::de::DeserializeOwned;

use self::config::ClientConfig;
use self::config::ProxyConfig;

pub mod config;

/// Every outbound call, name history or asset, is bounded by this.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub trait HttpClient: Send + Sync {
    fn request(&self, req: Request<Body>) -> BoxFuture<'static, Result<Response<Body>, hyper::Error>>;
}


struct ClientWrapper<C> {
    inner: Client<C, Body>,
    user_agent: Option<HeaderValue>,
}

impl<C: Connect + Clone + Send + Sync + 'static> HttpClient for ClientWrapper<C> {

    fn request(&self, mut req: Request<Body>) -> BoxFuture<'static, Result<Response<Body>, hyper::Error>> {
        if let Some(ref user_agent) = self.user_agent {
            req.headers_mut().insert(header::USER_AGENT, user_agent.clone());
        }
        Box::pin(self.inner.request(req))
    }
}


#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("transport error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("unexpected status {0}")]
    StatusCode(StatusCode),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("malformed body: {0}")]
    Deserialize(#[from] serde_json::Error),
}


pub fn build(config: &ClientConfig) -> Arc<dyn HttpClient> {
    let mut builder = Client::builder();
    builder.pool_idle_timeout(config.pool_idle_timeout);
    builder.pool_max_idle_per_host(config.pool_size);
    let connector = HttpsConnector::new();
    let user_agent = config.user_agent.as_ref().and_then(|s| HeaderValue::from_str(s).ok());
    let proxies = config.proxies.iter()
        .filter_map(build_proxy)
        .collect::<Vec<_>>();
    if !proxies.is_empty() {
        let mut proxy_connector = ProxyConnector::unsecured(connector);
        for proxy in proxies {
            proxy_connector.add_proxy(proxy);
        }
        let inner = builder.build(proxy_connector);
        Arc::new(ClientWrapper { inner, user_agent }) as Arc<dyn HttpClient>
    } else {
        let inner = builder.build(connector);
        Arc::new(ClientWrapper { inner, user_agent }) as Arc<dyn HttpClient>
    }
}

/// GET `uri` and collect the body; anything but 2xx is an error.
pub async fn get_bytes(client: &dyn HttpClient, uri: &str) -> Result<Bytes, RequestError> {
    let req = Request::builder()
        .uri(uri)
        .method(Method::GET)
        .body(Body::empty())?;
    let exchange = async {
        let resp = client.request(req).await?;
        let status_code = resp.status();
        if !status_code.is_success() {
            return Err(RequestError::StatusCode(status_code));
        }
        Ok(body::to_bytes(resp.into_body()).await?)
    };
    match tokio::time::timeout(REQUEST_TIMEOUT, exchange).await {
        Ok(r) => r,
        Err(_) => Err(RequestError::Timeout(REQUEST_TIMEOUT)),
    }
}

pub async fn get_json<T: DeserializeOwned>(client: &dyn HttpClient, uri: &str) -> Result<T, RequestError> {
    let data = get_bytes(client, uri).await?;
    Ok(serde_json::from_slice(&data)?)
}


fn build_proxy(proxy_cfg: &ProxyConfig) -> Option<Proxy> {
    let url_str = format!("http://{}", proxy_cfg.address);
    match url_str.parse() {
        Ok(url) => {
            let mut proxy = Proxy::new(Intercept::All, url);
            if let Some(auth) = &proxy_cfg.authorization {
                proxy.set_authorization(Authorization::basic(auth.user_name.as_str(), auth.password.as_str()));
            }
            Some(proxy)
        }
        Err(e) => {
            tracing::warn!("ignore invalid proxy {:?}: {}", url_str, e);
            None
        }
    }
}
