#![allow(dead_code)]

use platitude_relay::client::ResourceClient;
use platitude_relay::config::Config;
use serde_json::Value;
use std::time::Duration;
use url::Url;
use wiremock::MockServer;

/// Nothing listens on port 1, so connecting is refused straight away.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub fn client_for(server: &MockServer) -> ResourceClient {
    client_with_timeout(&server.uri(), Duration::from_secs(10))
}

pub fn client_with_timeout(base: &str, timeout: Duration) -> ResourceClient {
    let mut config = Config::new(Url::parse(base).unwrap());
    config.timeout = timeout;
    ResourceClient::new(&config).unwrap()
}

pub fn unreachable_client() -> ResourceClient {
    client_with_timeout(UNREACHABLE, Duration::from_secs(2))
}

/// JSON bodies of every request the server saw at `path`, in arrival order.
pub async fn bodies_at(server: &MockServer, path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == path)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
