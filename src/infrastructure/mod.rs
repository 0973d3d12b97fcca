// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_fetcher;
pub mod tracing_renderer;
