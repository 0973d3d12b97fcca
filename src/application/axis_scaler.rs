// Axis scaler - Padded min/max bounds per series or per aligned group
use crate::domain::dashboard::{AxisBound, AxisScale};
use crate::domain::telemetry::Series;
use serde::{Deserialize, Serialize};

/// Fraction of the value range added below the minimum and above the maximum.
pub const MARGIN_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Each series gets its own bound.
    #[default]
    Independent,
    /// All active series share one bound computed over their union.
    Aligned,
}

impl ScaleMode {
    pub fn from_aligned(aligned: bool) -> Self {
        if aligned { Self::Aligned } else { Self::Independent }
    }
}

/// Bound over the finite values only. No finite value means `Unbounded`.
pub fn bound_of(values: impl IntoIterator<Item = f64>) -> AxisScale {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return AxisScale::Unbounded;
    }

    let margin = (max - min) * MARGIN_RATIO;
    AxisScale::Bounded(AxisBound::new(min - margin, max + margin))
}

/// One scale per slot. `None` slots are inactive and excluded from both modes.
pub fn compute_bounds(series: &[Option<&Series>], mode: ScaleMode) -> Vec<AxisScale> {
    match mode {
        ScaleMode::Independent => series
            .iter()
            .map(|s| match s {
                Some(s) => bound_of(s.values()),
                None => AxisScale::Inactive,
            })
            .collect(),
        ScaleMode::Aligned => {
            let shared = bound_of(series.iter().flatten().copied().flat_map(Series::values));
            series
                .iter()
                .map(|s| if s.is_some() { shared } else { AxisScale::Inactive })
                .collect()
        }
    }
}
