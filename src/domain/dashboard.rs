// Dashboard domain model - shared chart state and the renderer view of it
use super::telemetry::Series;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::num::NonZeroUsize;

/// Number of dataset/axis slots the chart always carries.
pub const SLOT_COUNT: usize = 3;

/// Default bound the renderer uses for an inactive axis.
pub const INACTIVE_BOUND: AxisBound = AxisBound { min: 0.0, max: 1.0 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBound {
    pub min: f64,
    pub max: f64,
}

impl AxisBound {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Flat series produce a zero-height range; the renderer decides how to show it.
    pub fn is_collapsed(&self) -> bool {
        self.min == self.max
    }
}

/// Scale of one y-axis after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisScale {
    /// Slot has no selected channel.
    #[default]
    Inactive,
    /// Slot is active but no finite value was seen; the renderer must not clamp.
    Unbounded,
    Bounded(AxisBound),
}

impl AxisScale {
    pub fn bound(&self) -> Option<AxisBound> {
        match self {
            Self::Bounded(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    pub label: String,
    pub series: Series,
    pub scale: AxisScale,
}

impl SlotState {
    pub fn inactive(index: usize) -> Self {
        Self {
            label: format!("y{}", index),
            series: Series::default(),
            scale: AxisScale::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.scale, AxisScale::Inactive)
    }
}

/// Everything one successful tick produces; applied to `ChartState` in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartUpdate {
    pub slots: [SlotState; SLOT_COUNT],
    pub axes_aligned: bool,
    pub limit: NonZeroUsize,
}

/// Shared view model written by the poll loop and read by renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartState {
    pub slots: [SlotState; SLOT_COUNT],
    pub last_update: Option<DateTime<Utc>>,
    /// Generation of the tick that produced the current content (0 = none yet)
    pub generation: u64,
    pub stopped: bool,
    pub axes_aligned: bool,
    pub limit: NonZeroUsize,
}

impl ChartState {
    pub fn new(limit: NonZeroUsize, axes_aligned: bool, stopped: bool) -> Self {
        Self {
            slots: std::array::from_fn(SlotState::inactive),
            last_update: None,
            generation: 0,
            stopped,
            axes_aligned,
            limit,
        }
    }

    pub fn apply(&mut self, update: ChartUpdate, generation: u64, at: DateTime<Utc>) {
        self.slots = update.slots;
        self.axes_aligned = update.axes_aligned;
        self.limit = update.limit;
        self.generation = generation;
        self.last_update = Some(at);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub y_axis_id: String,
    pub points: Series,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    pub title: String,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Declarative config handed to the external charting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderConfig {
    pub datasets: Vec<Dataset>,
    pub y_axes: Vec<YAxis>,
    pub x_axis: XAxis,
    pub last_update: Option<String>,
    pub stopped: bool,
    pub axes_aligned: bool,
    pub limit: usize,
}

impl RenderConfig {
    pub fn from_state(state: &ChartState) -> Self {
        let mut datasets = Vec::with_capacity(SLOT_COUNT);
        let mut y_axes = Vec::with_capacity(SLOT_COUNT);

        for (index, slot) in state.slots.iter().enumerate() {
            let id = format!("y{}", index);
            let (min, max) = match slot.scale {
                AxisScale::Inactive => (Some(INACTIVE_BOUND.min), Some(INACTIVE_BOUND.max)),
                AxisScale::Unbounded => (None, None),
                AxisScale::Bounded(b) => (Some(b.min), Some(b.max)),
            };

            datasets.push(Dataset {
                label: slot.label.clone(),
                y_axis_id: id.clone(),
                points: slot.series.clone(),
            });
            y_axes.push(YAxis {
                id,
                title: slot.label.clone(),
                active: slot.is_active(),
                min,
                max,
            });
        }

        let extent = state
            .slots
            .iter()
            .filter_map(|s| s.series.x_extent())
            .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max)));

        Self {
            datasets,
            y_axes,
            x_axis: XAxis {
                title: "usec".to_string(),
                min: extent.map(|(lo, _)| lo),
                max: extent.map(|(_, hi)| hi),
            },
            last_update: state.last_update.map(|t| t.to_rfc3339()),
            stopped: state.stopped,
            axes_aligned: state.axes_aligned,
            limit: state.limit.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit() -> NonZeroUsize {
        NonZeroUsize::new(100).unwrap()
    }

    #[test]
    fn test_new_state_has_three_inactive_slots() {
        let state = ChartState::new(limit(), false, false);
        let labels: Vec<&str> = state.slots.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["y0", "y1", "y2"]);
        assert!(state.slots.iter().all(|s| !s.is_active()));
        assert!(state.last_update.is_none());
    }

    #[test]
    fn test_render_config_axis_mapping() {
        let mut state = ChartState::new(limit(), false, false);
        state.slots[0] = SlotState {
            label: "TPS (V)".to_string(),
            series: Series::from(vec![(10, 1.0), (30, 2.0)]),
            scale: AxisScale::Bounded(AxisBound::new(0.9, 2.1)),
        };
        state.slots[1] = SlotState {
            label: "IAP (V)".to_string(),
            series: Series::from(vec![(5, f64::NAN)]),
            scale: AxisScale::Unbounded,
        };

        let config = RenderConfig::from_state(&state);

        assert_eq!(config.datasets.len(), SLOT_COUNT);
        assert_eq!(config.y_axes.len(), SLOT_COUNT);
        assert_eq!(config.y_axes[0].min, Some(0.9));
        assert_eq!(config.y_axes[0].max, Some(2.1));
        assert!(config.y_axes[1].active);
        assert_eq!(config.y_axes[1].min, None);
        assert!(!config.y_axes[2].active);
        assert_eq!((config.y_axes[2].min, config.y_axes[2].max), (Some(0.0), Some(1.0)));
        assert_eq!((config.x_axis.min, config.x_axis.max), (Some(5), Some(30)));
        assert_eq!(config.datasets[0].y_axis_id, "y0");
    }

    #[test]
    fn test_render_config_without_points_has_open_x_axis() {
        let config = RenderConfig::from_state(&ChartState::new(limit(), true, true));
        assert_eq!(config.x_axis.min, None);
        assert!(config.stopped);
        assert!(config.axes_aligned);
        assert_eq!(config.limit, 100);
    }

    #[test]
    fn test_render_config_serializes_non_finite_points_as_null() {
        let mut state = ChartState::new(limit(), false, false);
        state.slots[0].series = Series::from(vec![(1, f64::INFINITY)]);
        let json = serde_json::to_value(RenderConfig::from_state(&state)).unwrap();
        assert_eq!(json["datasets"][0]["points"][0]["y"], serde_json::Value::Null);
    }
}
