// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::err::{ConfigError, InvalidParameterError};
use serde::{Deserialize, Serialize};

/// Which scoring strategy decides the winners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Per-group winners verified with the three-point check.
    #[default]
    Strict,
    /// One global winner by capacity-weighted centroid score.
    Gravity,
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringMode::Strict => write!(f, "Strict"),
            ScoringMode::Gravity => write!(f, "Gravity"),
        }
    }
}

/// Empirical bands of the strict coverage check, expressed as multiples of the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageBands {
    pub fast_accept_ratio: f64,
    pub prefilter_ratio: f64,
    pub detour_factor: f64,
    pub min_verified_points: usize,
}

impl Default for CoverageBands {
    fn default() -> Self {
        Self {
            fast_accept_ratio: 0.5,
            prefilter_ratio: 1.5,
            detour_factor: 1.3,
            min_verified_points: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    /// A facility is overloaded above `average load * overload_ratio`.
    pub overload_ratio: f64,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            overload_ratio: 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Destinations per matrix request.
    pub chunk_size: usize,
    /// Requests issued concurrently; `1` is strictly sequential.
    pub max_in_flight: usize,
    /// Consecutive chunk failures after which the remaining chunks are skipped.
    pub max_consecutive_failures: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            chunk_size: 25,
            max_in_flight: 1,
            max_consecutive_failures: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub distance_threshold_km: f64,
    pub duration_threshold_min: Option<f64>,
    pub rebalance: bool,
    pub scoring: ScoringMode,
    pub bands: CoverageBands,
    pub fairness: FairnessConfig,
    pub oracle: OracleConfig,
    /// When set, only zones whose layer is listed take part.
    pub layers: Option<Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distance_threshold_km: 5.0,
            duration_threshold_min: None,
            rebalance: false,
            scoring: ScoringMode::Strict,
            bands: CoverageBands::default(),
            fairness: FairnessConfig::default(),
            oracle: OracleConfig::default(),
            layers: None,
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_distance_threshold_km(mut self, km: f64) -> Self {
        self.distance_threshold_km = km;
        self
    }

    #[inline]
    pub fn with_duration_threshold_min(mut self, minutes: Option<f64>) -> Self {
        self.duration_threshold_min = minutes;
        self
    }

    #[inline]
    pub fn with_rebalance(mut self, yes: bool) -> Self {
        self.rebalance = yes;
        self
    }

    #[inline]
    pub fn with_scoring(mut self, scoring: ScoringMode) -> Self {
        self.scoring = scoring;
        self
    }

    #[inline]
    pub fn with_bands(mut self, bands: CoverageBands) -> Self {
        self.bands = bands;
        self
    }

    #[inline]
    pub fn with_fairness(mut self, fairness: FairnessConfig) -> Self {
        self.fairness = fairness;
        self
    }

    #[inline]
    pub fn with_oracle(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }

    #[inline]
    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = Some(layers.into_iter().map(Into::into).collect());
        self
    }

    #[inline]
    pub fn includes_layer(&self, layer: &str) -> bool {
        match &self.layers {
            Some(layers) => layers.iter().any(|l| l == layer),
            None => true,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("distance_threshold_km", self.distance_threshold_km)?;
        if let Some(d) = self.duration_threshold_min {
            positive("duration_threshold_min", d)?;
        }
        positive("bands.fast_accept_ratio", self.bands.fast_accept_ratio)?;
        positive("bands.prefilter_ratio", self.bands.prefilter_ratio)?;
        positive("bands.detour_factor", self.bands.detour_factor)?;
        if self.bands.fast_accept_ratio > self.bands.prefilter_ratio {
            return Err(ConfigError::InvertedBands {
                fast_accept: self.bands.fast_accept_ratio,
                prefilter: self.bands.prefilter_ratio,
            });
        }
        if self.bands.min_verified_points == 0 || self.bands.min_verified_points > 3 {
            return Err(InvalidParameterError::new(
                "bands.min_verified_points",
                self.bands.min_verified_points as f64,
            ))?;
        }
        positive("fairness.overload_ratio", self.fairness.overload_ratio)?;
        for (name, v) in [
            ("oracle.chunk_size", self.oracle.chunk_size),
            ("oracle.max_in_flight", self.oracle.max_in_flight),
            (
                "oracle.max_consecutive_failures",
                self.oracle.max_consecutive_failures,
            ),
        ] {
            if v == 0 {
                return Err(InvalidParameterError::new(name, 0.0))?;
            }
        }
        Ok(())
    }
}

fn positive(name: &'static str, v: f64) -> Result<(), InvalidParameterError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(InvalidParameterError::new(name, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let err = EngineConfig::new()
            .with_distance_threshold_km(0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter(e) if e.name() == "distance_threshold_km"));
        assert!(
            EngineConfig::new()
                .with_distance_threshold_km(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_rejects_inverted_bands() {
        let cfg = EngineConfig::new().with_bands(CoverageBands {
            fast_accept_ratio: 2.0,
            prefilter_ratio: 1.5,
            ..CoverageBands::default()
        });
        assert!(matches!(cfg.validate(), Err(ConfigError::InvertedBands { .. })));
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let cfg = EngineConfig::new().with_oracle(OracleConfig {
            chunk_size: 0,
            ..OracleConfig::default()
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{ "distance_threshold_km": 8, "scoring": "gravity", "bands": { "detour_factor": 1.4 } }"#)
                .unwrap();
        assert_eq!(cfg.distance_threshold_km, 8.0);
        assert_eq!(cfg.scoring, ScoringMode::Gravity);
        assert_eq!(cfg.bands.detour_factor, 1.4);
        assert_eq!(cfg.bands.prefilter_ratio, 1.5);
        assert_eq!(cfg.oracle.chunk_size, 25);
        assert!(!cfg.rebalance);
    }

    #[test]
    fn test_layer_filter() {
        let cfg = EngineConfig::new();
        assert!(cfg.includes_layer("anything"));
        let cfg = cfg.with_layers(["primary"]);
        assert!(cfg.includes_layer("primary"));
        assert!(!cfg.includes_layer("secondary"));
    }
}
