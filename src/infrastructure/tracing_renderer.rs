// Renderer adapter that reports every chart refresh to the log
use crate::application::chart_renderer::ChartRenderer;
use crate::domain::dashboard::RenderConfig;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl ChartRenderer for TracingRenderer {
    fn render(&self, config: &RenderConfig) {
        let points: Vec<usize> = config.datasets.iter().map(|d| d.points.len()).collect();
        let labels: Vec<&str> = config.datasets.iter().map(|d| d.label.as_str()).collect();

        tracing::debug!(
            ?labels,
            ?points,
            aligned = config.axes_aligned,
            last_update = config.last_update.as_deref().unwrap_or("-"),
            "Chart rendered"
        );
    }
}
