//! Mock booth backend for integration tests.

use std::sync::Arc;

use booth_client::BoothClient;
use booth_core::BoothConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock backend and a client pointed at it.
pub struct MockBackend {
    pub server: MockServer,
    pub client: BoothClient,
}

impl MockBackend {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let client =
            BoothClient::new(server.uri(), Arc::new(BoothConfig::default())).expect("client");
        Self { server, client }
    }

    /// Serve `body` for the next `times` GETs of `route`.
    pub async fn serve_get(&self, route: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }
}

pub fn gallery_body(names: &[&str]) -> Value {
    Value::Array(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "name": name,
                    "url": format!("/static/{name}.jpg"),
                    "modified_at": i as f64
                })
            })
            .collect(),
    )
}
