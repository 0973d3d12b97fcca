// Fetcher trait for telemetry batches
use async_trait::async_trait;
use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;

/// Undecoded response body of one fetch.
pub type RawBatch = serde_json::Value;

/// What one tick asks the data source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// Legacy single-topic endpoint, `GET /<topic>/<limit>`
    Topic { topic: String, limit: NonZeroUsize },
    /// Multi-field endpoint, `GET /latest/<limit>?fields=a,b,c`
    Fields { fields: Vec<String>, limit: NonZeroUsize },
}

impl FetchRequest {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Topic { topic, .. } => topic.is_empty(),
            Self::Fields { fields, .. } => fields.is_empty(),
        }
    }

    pub fn limit(&self) -> NonZeroUsize {
        match self {
            Self::Topic { limit, .. } | Self::Fields { limit, .. } => *limit,
        }
    }

    /// Path and query relative to the data source base URL.
    pub fn path(&self) -> String {
        match self {
            Self::Topic { topic, limit } => format!("/{}/{}", topic, limit),
            Self::Fields { fields, limit } => {
                let encoded: Vec<String> = fields
                    .iter()
                    .map(|f| urlencoding::encode(f).into_owned())
                    .collect();
                format!("/latest/{}?fields={}", limit, encoded.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("no fields selected")]
    EmptySelection,
}

impl FetchError {
    /// Benign errors are expected idle states, not failures worth a warning.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::EmptySelection)
    }
}

#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    /// Fetch one batch. An empty request must return `EmptySelection`
    /// without touching the network. No retries.
    async fn fetch(&self, request: &FetchRequest) -> Result<RawBatch, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_topic_path() {
        let request = FetchRequest::Topic {
            topic: "temp".to_string(),
            limit: limit(100),
        };
        assert_eq!(request.path(), "/temp/100");
    }

    #[test]
    fn test_fields_path_encodes_ids() {
        let request = FetchRequest::Fields {
            fields: vec!["ecu/tps".to_string(), "rpm/rpm".to_string()],
            limit: limit(50),
        };
        assert_eq!(request.path(), "/latest/50?fields=ecu%2Ftps,rpm%2Frpm");
        assert_eq!(request.limit().get(), 50);
    }

    #[test]
    fn test_empty_requests() {
        let fields = FetchRequest::Fields {
            fields: vec![],
            limit: limit(1),
        };
        assert!(fields.is_empty());
        assert!(FetchError::EmptySelection.is_benign());
        assert!(!FetchError::Timeout(Duration::from_secs(1)).is_benign());
    }
}
