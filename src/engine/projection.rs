//! Projection Generator Module
//!
//! Synthesizes a yearly series with a central estimate and an uncertainty band
//! from a [`Parameters`] set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::noise::NoiseSource;
use crate::engine::params::{confidence_width, Category, ClimateModel, Parameters, Scenario};
use crate::error::{ProjectionError, Result};

// == Projection Point ==
/// One projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year: i32,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Values of the other categories for the same year, keyed by category name
    pub secondary_metrics: BTreeMap<String, f64>,
}

impl ProjectionPoint {
    pub fn band_width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}

// == Projection Series ==
/// A complete, immutable projection for one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub parameters: Parameters,
    points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    pub fn points(&self) -> &[ProjectionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keeps every `step`-th point, starting with the first. A step of zero
    /// is treated as one.
    pub fn downsample(&self, step: usize) -> Vec<ProjectionPoint> {
        self.points
            .iter()
            .step_by(step.max(1))
            .cloned()
            .collect()
    }
}

// == Pure Components ==
/// Accelerating warming after `t` years, in °C. Depends on nothing else.
pub fn anomaly_trend(t: u32, scenario: Scenario) -> f64 {
    let t = f64::from(t);
    t * scenario.anomaly_rate() * (1.0 + t / 100.0)
}

/// Half-width of the uncertainty band after `t` years.
pub fn uncertainty_range(
    model: ClimateModel,
    category: Category,
    t: u32,
    confidence_level: u8,
) -> Result<f64> {
    let width = confidence_width(confidence_level)?;
    let t = f64::from(t);
    Ok(model.noise_amplitude() * category.noise_scale() * (1.0 + t / 30.0) * width)
}

// == Projection Engine ==
/// Stateless generator configured with a base year and default horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionEngine {
    base_year: i32,
    horizon_points: u32,
}

impl ProjectionEngine {
    pub fn new(base_year: i32, horizon_points: u32) -> Self {
        Self {
            base_year,
            horizon_points,
        }
    }

    pub fn base_year(&self) -> i32 {
        self.base_year
    }

    /// Number of points a series for `params` will contain.
    pub fn series_len(&self, params: &Parameters) -> u32 {
        params
            .time_range
            .map(|range| range.years() + 1)
            .unwrap_or(self.horizon_points)
    }

    /// Generates the full series for `params`.
    ///
    /// Noise is clamped inside the uncertainty band so the central estimate
    /// always lies between the bounds.
    pub fn generate(
        &self,
        params: &Parameters,
        noise: &mut dyn NoiseSource,
    ) -> Result<ProjectionSeries> {
        params.validate()?;

        let region_factor = params.effective_region().warming_factor();
        let amplitude = params.model.noise_amplitude();
        let len = self.series_len(params);
        if len == 0 {
            return Err(ProjectionError::Generation(
                "projection horizon has no points".to_string(),
            ));
        }

        let mut points = Vec::with_capacity(len as usize);
        for t in 0..len {
            let trend = anomaly_trend(t, params.scenario) * region_factor;
            let range =
                uncertainty_range(params.model, params.category, t, params.confidence_level)?;

            let category = params.category;
            let central = category.baseline() + category.trend_scale() * trend;
            let jitter = noise
                .jitter(amplitude * category.noise_scale())
                .clamp(-range, range);

            let secondary_metrics = Category::ALL
                .iter()
                .filter(|other| **other != category)
                .map(|other| {
                    let value = other.baseline()
                        + other.trend_scale() * trend
                        + noise.jitter(amplitude * other.noise_scale());
                    (other.as_str().to_string(), value)
                })
                .collect();

            let year = i32::try_from(t)
                .ok()
                .and_then(|t| self.base_year.checked_add(t))
                .ok_or_else(|| {
                    ProjectionError::Generation(format!(
                        "year {} + {} is out of range",
                        self.base_year, t
                    ))
                })?;

            points.push(ProjectionPoint {
                year,
                predicted: central + jitter,
                lower_bound: central - range,
                upper_bound: central + range,
                secondary_metrics,
            });
        }

        check_series(&points)?;

        Ok(ProjectionSeries {
            parameters: *params,
            points,
        })
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(2024, 76)
    }
}

/// Rejects output that breaks the series invariants.
fn check_series(points: &[ProjectionPoint]) -> Result<()> {
    for (i, point) in points.iter().enumerate() {
        let finite = point.predicted.is_finite()
            && point.lower_bound.is_finite()
            && point.upper_bound.is_finite()
            && point.secondary_metrics.values().all(|v| v.is_finite());
        if !finite {
            return Err(ProjectionError::Generation(format!(
                "non-finite value in year {}",
                point.year
            )));
        }
        if !(point.lower_bound <= point.predicted && point.predicted <= point.upper_bound) {
            return Err(ProjectionError::Generation(format!(
                "central estimate outside band in year {}",
                point.year
            )));
        }
        if i > 0 && points[i - 1].year >= point.year {
            return Err(ProjectionError::Generation(format!(
                "years out of order at {}",
                point.year
            )));
        }
    }
    Ok(())
}
