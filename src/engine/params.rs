//! Projection Parameters Module
//!
//! Recognized enumerations and the parameter set that identifies a projection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

// == Climate Model ==
/// Climate model whose output is being emulated.
///
/// Models differ only in noise amplitude, never in trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateModel {
    Ensemble,
    Gfdl,
    Hadley,
    Nasa,
}

impl ClimateModel {
    pub const ALL: [ClimateModel; 4] = [
        ClimateModel::Ensemble,
        ClimateModel::Gfdl,
        ClimateModel::Hadley,
        ClimateModel::Nasa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateModel::Ensemble => "ensemble",
            ClimateModel::Gfdl => "gfdl",
            ClimateModel::Hadley => "hadley",
            ClimateModel::Nasa => "nasa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClimateModel::Ensemble => "Ensemble Average",
            ClimateModel::Gfdl => "GFDL-CM4",
            ClimateModel::Hadley => "HadGEM3-GC3.1",
            ClimateModel::Nasa => "NASA GISS-E2.1",
        }
    }

    /// Inter-annual fluctuation of the model, in temperature units.
    pub fn noise_amplitude(&self) -> f64 {
        match self {
            ClimateModel::Ensemble => 0.08,
            ClimateModel::Gfdl => 0.15,
            ClimateModel::Hadley => 0.20,
            ClimateModel::Nasa => 0.12,
        }
    }
}

// == Scenario ==
/// Emissions scenario. Declaration order is severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scenario {
    #[serde(rename = "rcp2.6")]
    Rcp26,
    #[serde(rename = "rcp4.5")]
    Rcp45,
    #[serde(rename = "rcp6.0")]
    Rcp60,
    #[serde(rename = "rcp8.5")]
    Rcp85,
}

impl Scenario {
    /// All scenarios, lowest forcing first.
    pub const ALL: [Scenario; 4] = [
        Scenario::Rcp26,
        Scenario::Rcp45,
        Scenario::Rcp60,
        Scenario::Rcp85,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Rcp26 => "rcp2.6",
            Scenario::Rcp45 => "rcp4.5",
            Scenario::Rcp60 => "rcp6.0",
            Scenario::Rcp85 => "rcp8.5",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Rcp26 => "RCP 2.6 (Low Emissions)",
            Scenario::Rcp45 => "RCP 4.5 (Moderate Mitigation)",
            Scenario::Rcp60 => "RCP 6.0 (Moderate Emissions)",
            Scenario::Rcp85 => "RCP 8.5 (High Emissions)",
        }
    }

    /// Ordinal severity, 0 for the lowest-forcing scenario.
    pub fn severity(&self) -> usize {
        *self as usize
    }

    /// Warming per year before acceleration, in °C.
    pub fn anomaly_rate(&self) -> f64 {
        match self {
            Scenario::Rcp26 => 0.015,
            Scenario::Rcp45 => 0.025,
            Scenario::Rcp60 => 0.035,
            Scenario::Rcp85 => 0.055,
        }
    }
}

// == Category ==
/// Quantity plotted as the central estimate of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Temperature,
    Precipitation,
    #[serde(rename = "sealevel")]
    SeaLevel,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Temperature,
        Category::Precipitation,
        Category::SeaLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Temperature => "temperature",
            Category::Precipitation => "precipitation",
            Category::SeaLevel => "sealevel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Temperature => "Temperature (°C)",
            Category::Precipitation => "Precipitation (mm/year)",
            Category::SeaLevel => "Sea Level Rise (cm)",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Category::Temperature => "°C",
            Category::Precipitation => "mm/year",
            Category::SeaLevel => "cm",
        }
    }

    /// Value of the quantity at the base year.
    pub fn baseline(&self) -> f64 {
        match self {
            Category::Temperature => 14.8,
            Category::Precipitation => 900.0,
            Category::SeaLevel => 0.0,
        }
    }

    /// Units of this quantity per °C of trend.
    pub fn trend_scale(&self) -> f64 {
        match self {
            Category::Temperature => 1.0,
            Category::Precipitation => 18.0,
            Category::SeaLevel => 8.0,
        }
    }

    /// Units of this quantity per unit of model noise amplitude.
    pub fn noise_scale(&self) -> f64 {
        match self {
            Category::Temperature => 1.0,
            Category::Precipitation => 150.0,
            Category::SeaLevel => 5.0,
        }
    }
}

// == Region ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Global,
    NorthAmerica,
    Europe,
    Asia,
    Africa,
    SouthAmerica,
    Oceania,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Global,
        Region::NorthAmerica,
        Region::Europe,
        Region::Asia,
        Region::Africa,
        Region::SouthAmerica,
        Region::Oceania,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Global => "global",
            Region::NorthAmerica => "north-america",
            Region::Europe => "europe",
            Region::Asia => "asia",
            Region::Africa => "africa",
            Region::SouthAmerica => "south-america",
            Region::Oceania => "oceania",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Global => "Global",
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::Asia => "Asia",
            Region::Africa => "Africa",
            Region::SouthAmerica => "South America",
            Region::Oceania => "Oceania",
        }
    }

    /// Regional amplification of the global trend. Always positive.
    pub fn warming_factor(&self) -> f64 {
        match self {
            Region::Global => 1.0,
            Region::NorthAmerica => 1.1,
            Region::Europe => 1.15,
            Region::Asia => 1.1,
            Region::Africa => 1.05,
            Region::SouthAmerica => 1.0,
            Region::Oceania => 0.95,
        }
    }

    /// Mean surface temperature relative to the global mean, in °C.
    pub fn temperature_offset(&self) -> f64 {
        match self {
            Region::Global => 0.0,
            Region::NorthAmerica => -2.5,
            Region::Europe => -4.0,
            Region::Asia => 1.5,
            Region::Africa => 9.0,
            Region::SouthAmerica => 6.5,
            Region::Oceania => 7.0,
        }
    }
}

// == Time Range ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "30y")]
    ThirtyYears,
    #[serde(rename = "100y")]
    Century,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::OneYear,
        TimeRange::FiveYears,
        TimeRange::TenYears,
        TimeRange::ThirtyYears,
        TimeRange::Century,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneYear => "1y",
            TimeRange::FiveYears => "5y",
            TimeRange::TenYears => "10y",
            TimeRange::ThirtyYears => "30y",
            TimeRange::Century => "100y",
        }
    }

    pub fn years(&self) -> u32 {
        match self {
            TimeRange::OneYear => 1,
            TimeRange::FiveYears => 5,
            TimeRange::TenYears => 10,
            TimeRange::ThirtyYears => 30,
            TimeRange::Century => 100,
        }
    }
}

// == String Conversions ==
// Raw UI values are parsed through FromStr so that out-of-set values surface
// as InvalidParameter rather than a generic deserialization failure.
macro_rules! str_enum {
    ($ty:ident, $what:literal) => {
        impl FromStr for $ty {
            type Err = ProjectionError;

            fn from_str(s: &str) -> Result<Self> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        ProjectionError::InvalidParameter(format!(
                            "unknown {} '{}'",
                            $what, s
                        ))
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ClimateModel, "model");
str_enum!(Scenario, "scenario");
str_enum!(Category, "category");
str_enum!(Region, "region");
str_enum!(TimeRange, "time range");

// == Confidence Policy ==
/// Band-width multiplier per confidence level.
///
/// A policy table, not a statistical model: it only has to shrink as the
/// confidence level rises.
const CONFIDENCE_WIDTH: [(u8, f64); 10] = [
    (50, 0.50),
    (55, 0.45),
    (60, 0.40),
    (65, 0.35),
    (70, 0.30),
    (75, 0.25),
    (80, 0.20),
    (85, 0.15),
    (90, 0.10),
    (95, 0.05),
];

pub const MIN_CONFIDENCE: u8 = 50;
pub const MAX_CONFIDENCE: u8 = 95;
pub const CONFIDENCE_STEP: u8 = 5;

/// Looks up the band-width multiplier for a confidence level.
pub fn confidence_width(level: u8) -> Result<f64> {
    CONFIDENCE_WIDTH
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, w)| *w)
        .ok_or_else(|| {
            ProjectionError::InvalidParameter(format!(
                "confidence level {} is not in [{}, {}] with step {}",
                level, MIN_CONFIDENCE, MAX_CONFIDENCE, CONFIDENCE_STEP
            ))
        })
}

// == Parameters ==
/// Inputs of one projection. Every field is part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub model: ClimateModel,
    pub scenario: Scenario,
    pub confidence_level: u8,
    pub region: Option<Region>,
    pub time_range: Option<TimeRange>,
    pub category: Category,
}

impl Parameters {
    /// Query name prefixed to every projection key.
    pub const QUERY: &'static str = "predictions";

    pub fn new(
        model: ClimateModel,
        scenario: Scenario,
        confidence_level: u8,
        category: Category,
    ) -> Self {
        Self {
            model,
            scenario,
            confidence_level,
            region: None,
            time_range: None,
            category,
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    pub fn with_confidence(mut self, confidence_level: u8) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    /// Checks the numeric fields; enum fields are valid by construction.
    pub fn validate(&self) -> Result<()> {
        confidence_width(self.confidence_level).map(|_| ())
    }

    /// Canonical form: an explicit global region is the same as none.
    pub fn normalized(mut self) -> Self {
        if self.region == Some(Region::Global) {
            self.region = None;
        }
        self
    }

    /// Serialized identity of this parameter set, taken from its normalized form.
    pub fn cache_key(&self) -> Result<String> {
        Ok(serde_json::to_string(&(Self::QUERY, self.normalized()))?)
    }

    /// Region used for trend scaling, global when unset.
    pub fn effective_region(&self) -> Region {
        self.region.unwrap_or(Region::Global)
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new(
            ClimateModel::Ensemble,
            Scenario::Rcp45,
            80,
            Category::Temperature,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_values() {
        assert_eq!("hadley".parse::<ClimateModel>().unwrap(), ClimateModel::Hadley);
        assert_eq!("rcp6.0".parse::<Scenario>().unwrap(), Scenario::Rcp60);
        assert_eq!("sealevel".parse::<Category>().unwrap(), Category::SeaLevel);
        assert_eq!("south-america".parse::<Region>().unwrap(), Region::SouthAmerica);
        assert_eq!("30y".parse::<TimeRange>().unwrap(), TimeRange::ThirtyYears);
    }

    #[test]
    fn test_parse_unknown_value_is_invalid_parameter() {
        let err = "cmip7".parse::<ClimateModel>().unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidParameter(_)));

        let err = "rcp9.9".parse::<Scenario>().unwrap_err();
        assert!(err.to_string().contains("rcp9.9"));
    }

    #[test]
    fn test_serde_names_match_display() {
        for scenario in Scenario::ALL {
            let json = serde_json::to_string(&scenario).unwrap();
            assert_eq!(json, format!("\"{}\"", scenario));
        }
        for region in Region::ALL {
            let json = serde_json::to_string(&region).unwrap();
            assert_eq!(json, format!("\"{}\"", region));
        }
        let json = serde_json::to_string(&Category::SeaLevel).unwrap();
        assert_eq!(json, "\"sealevel\"");
    }

    #[test]
    fn test_labels() {
        assert_eq!(ClimateModel::Ensemble.label(), "Ensemble Average");
        assert_eq!(Category::SeaLevel.unit(), "cm");
        for category in Category::ALL {
            assert!(category.label().contains(category.unit()));
        }
        for region in Region::ALL {
            assert!(!region.label().is_empty());
        }
    }

    #[test]
    fn test_scenario_rates_increase_with_severity() {
        for pair in Scenario::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].severity() < pair[1].severity());
            assert!(pair[0].anomaly_rate() < pair[1].anomaly_rate());
        }
    }

    #[test]
    fn test_confidence_width_table() {
        assert_eq!(confidence_width(50).unwrap(), 0.50);
        assert_eq!(confidence_width(95).unwrap(), 0.05);
        assert!(confidence_width(45).is_err());
        assert!(confidence_width(100).is_err());
        assert!(confidence_width(82).is_err());

        let mut previous = f64::MAX;
        for level in (MIN_CONFIDENCE..=MAX_CONFIDENCE).step_by(CONFIDENCE_STEP as usize) {
            let width = confidence_width(level).unwrap();
            assert!(width < previous);
            previous = width;
        }
    }

    #[test]
    fn test_validate() {
        assert!(Parameters::default().validate().is_ok());
        let bad = Parameters::default().with_confidence(99);
        assert!(matches!(
            bad.validate(),
            Err(ProjectionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_cache_key_changes_with_every_field() {
        let base = Parameters::default();
        let variants = [
            Parameters { model: ClimateModel::Nasa, ..base },
            Parameters { scenario: Scenario::Rcp85, ..base },
            base.with_confidence(50),
            base.with_region(Region::Europe),
            base.with_time_range(TimeRange::TenYears),
            Parameters { category: Category::Precipitation, ..base },
        ];

        let base_key = base.cache_key().unwrap();
        assert!(base_key.starts_with("[\"predictions\""));
        for variant in variants {
            assert_ne!(variant.cache_key().unwrap(), base_key);
        }
        assert_eq!(base.cache_key().unwrap(), Parameters::default().cache_key().unwrap());
    }

    #[test]
    fn test_global_region_shares_key_with_unset_region() {
        let base = Parameters::default();
        let global = base.with_region(Region::Global);

        assert_eq!(global.normalized(), base);
        assert_eq!(global.cache_key().unwrap(), base.cache_key().unwrap());
        assert_ne!(
            base.with_region(Region::Asia).cache_key().unwrap(),
            base.cache_key().unwrap()
        );
    }
}
