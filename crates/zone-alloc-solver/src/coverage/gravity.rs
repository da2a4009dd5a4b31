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

use crate::coverage::{
    Candidate, CandidateStatus, CoverageEvaluator, EvaluationContext, duration_within,
};
use zone_alloc_model::prelude::{CoverageTier, Zone};

pub const GRAVITY_BASE: f64 = 100.0;

/// Flat capacity-weighted scoring on the centroid distance alone:
/// `100 - distance / capacity`. A pair qualifies when it is within the
/// distance threshold and, if configured, the duration threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct GravityEvaluator;

#[inline]
pub fn gravity_score(distance_km: f64, capacity: f64) -> f64 {
    GRAVITY_BASE - distance_km / capacity
}

impl CoverageEvaluator for GravityEvaluator {
    fn name(&self) -> &str {
        "GravityEvaluator"
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>, zone_idx: usize, zone: &Zone) -> Vec<Candidate> {
        let t = ctx.config.distance_threshold_km;
        let limit = ctx.config.duration_threshold_min;
        ctx.reachable(zone_idx)
            .map(|(facility, d, dur)| {
                if d <= t && duration_within(dur, limit) {
                    let score = gravity_score(d, facility.capacity());
                    Candidate::covered(zone, facility, d, dur, CoverageTier::Gravity, score, d)
                } else {
                    Candidate::failing(zone, facility, d, dur, CandidateStatus::NotCovered)
                }
            })
            .collect()
    }
}
