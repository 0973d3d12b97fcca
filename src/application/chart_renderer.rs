// Renderer trait - external collaborator notified after every applied tick
use crate::domain::dashboard::RenderConfig;

pub trait ChartRenderer: Send + Sync {
    fn render(&self, config: &RenderConfig);
}

/// Renderer for setups where the chart is only pulled over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl ChartRenderer for NoopRenderer {
    fn render(&self, _config: &RenderConfig) {}
}
