// Telemetry data domain models
use serde::Serialize;

/// One chart point: `x` is the sample timestamp in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: f64,
}

impl Point {
    pub fn new(x: i64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Points for one channel in arrival order. Not re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.y)
    }

    /// Smallest and largest timestamp, if any.
    pub fn x_extent(&self) -> Option<(i64, i64)> {
        let min = self.points.iter().map(|p| p.x).min()?;
        let max = self.points.iter().map(|p| p.x).max()?;
        Some((min, max))
    }
}

impl From<Vec<(i64, f64)>> for Series {
    fn from(points: Vec<(i64, f64)>) -> Self {
        Self::new(points.into_iter().map(|(x, y)| Point::new(x, y)).collect())
    }
}
