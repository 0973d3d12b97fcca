// Application state for HTTP handlers
use crate::application::poll_loop::PollLoop;
use crate::domain::topic::Catalog;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub poll_loop: Arc<PollLoop>,
}
