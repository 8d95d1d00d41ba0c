//! Speed profiles along a route and their baseline/traffic comparison.
//!
//! Each route is flattened into [`SpeedSample`]s at the finest detail level
//! its legs offer. Two such series rarely share sample positions, so both
//! are resampled by linear interpolation onto one distance grid before they
//! are compared or scrubbed together.

use serde::Serialize;
use tracing::debug;

use crate::response::{Geometry, LegDetail, RouteResult};

/// Grid spacing never drops below this many meters.
pub const MIN_GRID_INTERVAL_M: f64 = 50.0;

/// Upper bound on grid intervals; the grid has at most this many points plus one.
pub const GRID_DIVISIONS: f64 = 100.0;

const MS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedSample {
    /// Cumulative distance, in meters, at which this segment starts.
    pub distance_from_start: f64,
    pub speed_kmh: f64,
    /// Position of the source segment within the whole route.
    pub step_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

/// One point of the shared comparison grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    pub distance: f64,
    pub speed: Option<f64>,
    pub traffic_speed: Option<f64>,
}

fn speed_kmh(distance: f64, duration: f64) -> Option<f64> {
    (duration > 0.0 && duration.is_finite() && distance.is_finite())
        .then(|| distance / duration * MS_TO_KMH)
}

/// Flattens a route into speed samples, leg by leg.
///
/// Segments without a usable duration produce no sample but still advance
/// the running distance, so series built from differently detailed routes
/// stay aligned.
pub fn extract(route: &RouteResult, label: &str) -> Vec<SpeedSample> {
    let mut samples = Vec::new();
    let mut cumulative = 0.0;
    let mut step_index = 0;

    let mut push = |distance: f64, duration: f64, geometry: Option<&Geometry>| {
        if let Some(speed_kmh) = speed_kmh(distance, duration) {
            samples.push(SpeedSample {
                distance_from_start: cumulative,
                speed_kmh,
                step_index,
                geometry: geometry.cloned(),
            });
        }
        if distance.is_finite() {
            cumulative += distance.max(0.0);
        }
        step_index += 1;
    };

    for leg in &route.legs {
        match leg.detail() {
            LegDetail::Steps(steps) => {
                for step in steps {
                    push(step.distance, step.duration, step.geometry.as_ref());
                }
            }
            LegDetail::Annotation(annotation) => {
                for (distance, duration) in annotation.segments() {
                    push(distance, duration, None);
                }
            }
            LegDetail::Whole { distance, duration } => push(distance, duration, None),
        }
    }

    debug!("Extracted {} speed samples from {} route", samples.len(), label);

    samples
}

fn final_distance(samples: &[SpeedSample]) -> f64 {
    samples.last().map_or(0.0, |sample| sample.distance_from_start)
}

/// Builds the shared distance grid for two series.
///
/// Spacing is `max(50 m, longest / 100)`; the grid runs from zero up to and
/// including the longer series' final sample distance.
pub fn build_grid(baseline: &[SpeedSample], traffic: &[SpeedSample]) -> Vec<f64> {
    let max_distance = final_distance(baseline).max(final_distance(traffic));
    let interval = MIN_GRID_INTERVAL_M.max(max_distance / GRID_DIVISIONS);

    // Counting intervals instead of accumulating keeps float drift from
    // dropping the final point.
    let intervals = (max_distance / interval + 1e-9).floor() as usize;

    (0..=intervals)
        .map(|i| {
            let distance = i as f64 * interval;
            if (max_distance - distance).abs() < 1e-6 {
                max_distance
            } else {
                distance.min(max_distance)
            }
        })
        .collect()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Speed at `target` meters, linearly interpolated between the samples
/// around it and clamped to the first/last sample outside the series.
///
/// `series` must be ordered by distance. Returns `None` when it is empty.
pub fn interpolate_at(series: &[SpeedSample], target: f64) -> Option<f64> {
    let after_index = series.partition_point(|sample| sample.distance_from_start < target);
    let before_count = series.partition_point(|sample| sample.distance_from_start <= target);

    let before = before_count.checked_sub(1).and_then(|index| series.get(index));
    let after = series.get(after_index);

    match (before, after) {
        (None, None) => None,
        (None, Some(after)) => Some(after.speed_kmh),
        (Some(before), None) => Some(before.speed_kmh),
        (Some(before), Some(after)) => {
            let span = after.distance_from_start - before.distance_from_start;
            if span <= 0.0 {
                return Some(before.speed_kmh);
            }
            let ratio = (target - before.distance_from_start) / span;
            Some(round_tenth(
                before.speed_kmh + (after.speed_kmh - before.speed_kmh) * ratio,
            ))
        }
    }
}

/// Resamples both series onto their shared grid.
pub fn compare(baseline: &[SpeedSample], traffic: &[SpeedSample]) -> Vec<ComparisonPoint> {
    build_grid(baseline, traffic)
        .into_iter()
        .map(|distance| ComparisonPoint {
            distance,
            speed: interpolate_at(baseline, distance),
            traffic_speed: interpolate_at(traffic, distance),
        })
        .collect()
}

/// Average speed over the whole route, km/h.
pub fn average_speed_kmh(route: &RouteResult) -> Option<f64> {
    speed_kmh(route.distance, route.duration)
}

/// Comparison series plus the headline numbers shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    pub series: Vec<ComparisonPoint>,
    pub baseline_average_kmh: Option<f64>,
    pub traffic_average_kmh: Option<f64>,
    /// Traffic duration minus baseline duration, seconds.
    pub traffic_delay_s: Option<f64>,
}

impl RouteComparison {
    pub fn from_routes(baseline: Option<&RouteResult>, traffic: Option<&RouteResult>) -> Self {
        let baseline_samples = baseline.map(|route| extract(route, "baseline")).unwrap_or_default();
        let traffic_samples = traffic.map(|route| extract(route, "traffic")).unwrap_or_default();

        let traffic_delay_s = match (baseline, traffic) {
            (Some(baseline), Some(traffic)) => Some(traffic.duration - baseline.duration),
            _ => None,
        };

        Self {
            series: compare(&baseline_samples, &traffic_samples),
            baseline_average_kmh: baseline.and_then(average_speed_kmh),
            traffic_average_kmh: traffic.and_then(average_speed_kmh),
            traffic_delay_s,
        }
    }

    /// False when no traffic series exists and that view should be omitted.
    pub fn has_traffic(&self) -> bool {
        self.series.iter().any(|point| point.traffic_speed.is_some())
    }
}
