//! Climate History Module
//!
//! Monthly observed-style records for the dashboard overview charts.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::engine::noise::NoiseSource;
use crate::engine::params::{Region, TimeRange};
use crate::error::Result;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Last complete year of the record.
pub const HISTORY_END_YEAR: i32 = 2023;

const MEAN_TEMPERATURE: f64 = 15.0;
const SEASONAL_TEMPERATURE: f64 = 10.0;
const MEAN_PRECIPITATION: f64 = 50.0;
const SEASONAL_PRECIPITATION: f64 = 30.0;
const WARMING_PER_YEAR: f64 = 0.2;
const ANOMALY_PER_YEAR: f64 = 0.15;

// == History Parameters ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub region: Region,
    pub time_range: TimeRange,
}

impl HistoryParams {
    pub const QUERY: &'static str = "climate";

    pub fn new(region: Region, time_range: TimeRange) -> Self {
        Self { region, time_range }
    }

    pub fn cache_key(&self) -> Result<String> {
        Ok(serde_json::to_string(&(
            Self::QUERY,
            self.region,
            self.time_range,
        ))?)
    }
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self::new(Region::Global, TimeRange::FiveYears)
    }
}

// == Monthly Record ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// Chart label, e.g. "Jan 2019"
    pub date: String,
    pub year: i32,
    /// 1-based month
    pub month: u8,
    pub temperature: f64,
    pub precipitation: f64,
    pub anomaly: f64,
}

/// Monthly records for one region and time range, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateHistory {
    pub params: HistoryParams,
    pub records: Vec<MonthlyRecord>,
}

// == Generator ==
/// Generates `time_range.years()` years of monthly records ending at
/// [`HISTORY_END_YEAR`].
pub fn generate_history(params: &HistoryParams, noise: &mut dyn NoiseSource) -> ClimateHistory {
    let years = params.time_range.years() as i32;
    let start = HISTORY_END_YEAR - years + 1;
    let offset = params.region.temperature_offset();

    let mut records = Vec::with_capacity((years * 12) as usize);
    for year in start..=HISTORY_END_YEAR {
        let elapsed = f64::from(year - start);
        for (i, month) in MONTHS.iter().enumerate() {
            let season = (i as f64 / 12.0 * PI * 2.0).sin();
            records.push(MonthlyRecord {
                date: format!("{} {}", month, year),
                year,
                month: i as u8 + 1,
                temperature: MEAN_TEMPERATURE
                    + offset
                    + SEASONAL_TEMPERATURE * season
                    + noise.jitter(3.0)
                    + elapsed * WARMING_PER_YEAR,
                precipitation: MEAN_PRECIPITATION
                    + SEASONAL_PRECIPITATION * season
                    + noise.jitter(20.0),
                anomaly: noise.jitter(2.0) + elapsed * ANOMALY_PER_YEAR,
            });
        }
    }

    ClimateHistory {
        params: *params,
        records,
    }
}
