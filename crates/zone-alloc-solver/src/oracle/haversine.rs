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

use crate::oracle::{DistanceOracle, MatrixBlock, OracleError};
use zone_alloc_core::prelude::GeoPoint;

/// Offline oracle: great-circle distance scaled by a detour factor, and a
/// duration derived from a constant travel speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaversineOracle {
    detour_factor: f64,
    speed_kmh: f64,
}

impl Default for HaversineOracle {
    fn default() -> Self {
        Self {
            detour_factor: 1.0,
            speed_kmh: 30.0,
        }
    }
}

impl HaversineOracle {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_detour_factor(mut self, factor: f64) -> Self {
        self.detour_factor = factor;
        self
    }

    #[inline]
    pub fn with_speed_kmh(mut self, speed: f64) -> Self {
        self.speed_kmh = speed;
        self
    }
}

impl DistanceOracle for HaversineOracle {
    fn table(
        &self,
        sources: &[GeoPoint<f64>],
        destinations: &[GeoPoint<f64>],
        with_durations: bool,
    ) -> Result<MatrixBlock, OracleError> {
        let km: Vec<Vec<f64>> = sources
            .iter()
            .map(|s| {
                destinations
                    .iter()
                    .map(|d| s.haversine_km(d) * self.detour_factor)
                    .collect()
            })
            .collect();
        let distances = km
            .iter()
            .map(|row| row.iter().map(|k| Some(k * 1000.0)).collect())
            .collect();
        let block = MatrixBlock::new(distances);
        if !with_durations {
            return Ok(block);
        }
        let durations = km
            .iter()
            .map(|row| row.iter().map(|k| Some(k / self.speed_kmh * 3600.0)).collect())
            .collect();
        Ok(block.with_durations(durations))
    }
}
