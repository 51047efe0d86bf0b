//! Global Statistics Module
//!
//! Headline indicators shown above the dashboard charts.

use serde::{Deserialize, Serialize};

use crate::engine::noise::NoiseSource;

pub const GLOBAL_STATS_KEY: &str = "[\"globalStats\"]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    /// Global mean surface temperature, °C
    pub global_temp: f64,
    /// Anomaly against the 1951-1980 mean, °C
    pub temp_anomaly: f64,
    /// Atmospheric CO2, ppm
    pub co2_level: u32,
    /// Sea level rise rate, mm/year
    pub sea_level_rise: f64,
    /// September Arctic sea ice extent, million km²
    pub arctic_ice: f64,
}

pub fn generate_global_stats(noise: &mut dyn NoiseSource) -> GlobalStats {
    // offset lies in [0, 4.999], so the floor is one of 0..=4
    let co2_offset = (noise.jitter(4.999) + 2.4995).floor() as u32;
    GlobalStats {
        global_temp: 14.9 + noise.jitter(0.2),
        temp_anomaly: 1.1 + noise.jitter(0.3),
        co2_level: 415 + co2_offset,
        sea_level_rise: 3.4 + noise.jitter(0.2),
        arctic_ice: 4.1 + noise.jitter(0.3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::noise::{NoNoise, SeededNoise};

    #[test]
    fn test_stats_without_noise() {
        let stats = generate_global_stats(&mut NoNoise);
        assert_eq!(stats.global_temp, 14.9);
        assert_eq!(stats.co2_level, 417);
        assert_eq!(stats.arctic_ice, 4.1);
    }

    #[test]
    fn test_stats_stay_in_range() {
        let mut noise = SeededNoise::new(11);
        for _ in 0..200 {
            let stats = generate_global_stats(&mut noise);
            assert!((415..=419).contains(&stats.co2_level));
            assert!((14.79..=15.01).contains(&stats.global_temp));
        }
    }
}
