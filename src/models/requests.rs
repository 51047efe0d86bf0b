//! Request DTOs for the projection API
//!
//! Query strings arrive as raw strings, mirroring the dashboard's select and
//! slider controls, and are parsed into engine types here.

use std::str::FromStr;

use serde::Deserialize;

use crate::engine::{HistoryParams, Parameters, Region, TimeRange};
use crate::error::{ProjectionError, Result};

/// Query string of `GET /projections` and `DELETE /projections`
///
/// Missing fields fall back to the dashboard defaults
/// (ensemble, rcp4.5, 80, temperature).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectionQuery {
    pub model: Option<String>,
    pub scenario: Option<String>,
    pub confidence: Option<String>,
    pub region: Option<String>,
    pub time_range: Option<String>,
    pub category: Option<String>,
    /// Wait for the query to settle before responding
    #[serde(default)]
    pub wait: bool,
}

impl ProjectionQuery {
    /// Parses and validates the raw values.
    pub fn to_parameters(&self) -> Result<Parameters> {
        let defaults = Parameters::default();
        let params = Parameters {
            model: parse_or(self.model.as_deref(), defaults.model)?,
            scenario: parse_or(self.scenario.as_deref(), defaults.scenario)?,
            confidence_level: parse_or(self.confidence.as_deref(), defaults.confidence_level)?,
            region: parse_opt(self.region.as_deref())?,
            time_range: parse_opt(self.time_range.as_deref())?,
            category: parse_or(self.category.as_deref(), defaults.category)?,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Query string of `GET /history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub region: Option<String>,
    pub time_range: Option<String>,
    #[serde(default)]
    pub wait: bool,
}

impl HistoryQuery {
    pub fn to_params(&self) -> Result<HistoryParams> {
        let defaults = HistoryParams::default();
        Ok(HistoryParams {
            region: parse_or::<Region>(self.region.as_deref(), defaults.region)?,
            time_range: parse_or::<TimeRange>(self.time_range.as_deref(), defaults.time_range)?,
        })
    }
}

/// Query string of endpoints that only support waiting
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaitQuery {
    #[serde(default)]
    pub wait: bool,
}

fn parse_or<T>(raw: Option<&str>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Into<ProjectionError>,
{
    match raw {
        Some(raw) => parse(raw),
        None => Ok(default),
    }
}

fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Into<ProjectionError>,
{
    raw.map(parse::<T>).transpose()
}

fn parse<T>(raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Into<ProjectionError>,
{
    raw.trim().parse::<T>().map_err(Into::into)
}
