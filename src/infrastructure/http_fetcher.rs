// HTTP fetcher implementation over reqwest
use crate::application::series_fetcher::{FetchError, FetchRequest, RawBatch, SeriesFetcher};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSeriesFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSeriesFetcher {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn build_url(&self, request: &FetchRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if error.is_decode() {
            FetchError::Decode(error.to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl SeriesFetcher for HttpSeriesFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<RawBatch, FetchError> {
        if request.is_empty() {
            return Err(FetchError::EmptySelection);
        }

        let url = self.build_url(request);
        tracing::trace!(%url, "Fetching telemetry batch");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Network(format!("HTTP {}: {}", status, body)));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::num::NonZeroUsize;

    async fn serve() -> String {
        let router = Router::new()
            .route(
                "/temp/:limit",
                get(|Path(limit): Path<usize>| async move {
                    Json(json!({"data": [{"usec": 1, "payload": format!("{{\"usec\":1,\"temp\":{}}}", limit)}]}))
                }),
            )
            .route(
                "/latest/:limit",
                get(|Path(limit): Path<usize>, Query(q): Query<HashMap<String, String>>| async move {
                    let mut body = serde_json::Map::new();
                    for field in q.get("fields").map(String::as_str).unwrap_or("").split(',') {
                        body.insert(field.to_string(), json!([{"usec": limit, "value": 1.0}]));
                    }
                    Json(Value::Object(body))
                }),
            )
            .route(
                "/broken/:limit",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/text/:limit", get(|| async { "definitely not json" }))
            .route(
                "/slow/:limit",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "{}"
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn topic(name: &str) -> FetchRequest {
        FetchRequest::Topic {
            topic: name.to_string(),
            limit: NonZeroUsize::new(7).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_fetch_legacy_topic() {
        let fetcher = HttpSeriesFetcher::new(serve().await, Duration::from_millis(500)).unwrap();

        let body = fetcher.fetch(&topic("temp")).await.unwrap();

        assert_eq!(body["data"][0]["payload"], "{\"usec\":1,\"temp\":7}");
    }

    #[tokio::test]
    async fn test_fetch_fields_round_trips_ids() {
        let fetcher = HttpSeriesFetcher::new(serve().await, Duration::from_millis(500)).unwrap();
        let request = FetchRequest::Fields {
            fields: vec!["ecu/tps".to_string(), "acc/gyro_x".to_string()],
            limit: NonZeroUsize::new(3).unwrap(),
        };

        let body = fetcher.fetch(&request).await.unwrap();

        assert_eq!(body["ecu/tps"][0]["usec"], 3);
        assert!(body.get("acc/gyro_x").is_some());
    }

    #[tokio::test]
    async fn test_empty_request_skips_network() {
        // Nothing listens here; any network call would fail with `Network`
        let fetcher =
            HttpSeriesFetcher::new("http://127.0.0.1:9".to_string(), Duration::from_millis(500)).unwrap();
        let request = FetchRequest::Fields {
            fields: vec![],
            limit: NonZeroUsize::new(3).unwrap(),
        };

        assert_eq!(fetcher.fetch(&request).await, Err(FetchError::EmptySelection));
    }

    #[tokio::test]
    async fn test_error_kinds() {
        let fetcher = HttpSeriesFetcher::new(serve().await, Duration::from_millis(200)).unwrap();

        assert!(matches!(
            fetcher.fetch(&topic("broken")).await,
            Err(FetchError::Network(msg)) if msg.contains("500")
        ));
        assert!(matches!(
            fetcher.fetch(&topic("text")).await,
            Err(FetchError::Decode(_))
        ));
        assert_eq!(
            fetcher.fetch(&topic("slow")).await,
            Err(FetchError::Timeout(Duration::from_millis(200)))
        );
    }
}
