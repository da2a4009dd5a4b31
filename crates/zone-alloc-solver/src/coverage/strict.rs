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
use smallvec::SmallVec;
use zone_alloc_core::prelude::GeoPoint;
use zone_alloc_model::prelude::{CoverageTier, Facility, Zone};

pub const COVERED_SCORE: f64 = 3.0;

/// Multi-point strict coverage.
///
/// Pairs beyond the prefilter band are kept as out-of-range fallbacks, pairs
/// inside the fast-accept band are covered outright, and everything in between
/// is checked at three sample points: the ring vertex nearest to the facility,
/// the farthest vertex and the centroid. Each sample's road distance is
/// estimated as straight-line distance times the detour factor.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictEvaluator;

impl StrictEvaluator {
    /// Returns how many samples are within `threshold_km` and the centroid
    /// estimate.
    fn verify(
        zone: &Zone,
        facility: &Facility,
        detour_factor: f64,
        threshold_km: f64,
    ) -> (usize, f64) {
        let origin = facility.location();
        let centroid = zone.centroid();
        let samples: SmallVec<[GeoPoint<f64>; 3]> = SmallVec::from_buf([
            zone.ring().nearest_vertex(&origin).0,
            zone.ring().farthest_vertex(&origin).0,
            centroid,
        ]);
        let within = samples
            .iter()
            .filter(|p| origin.haversine_km(p) * detour_factor <= threshold_km)
            .count();
        (within, origin.haversine_km(&centroid) * detour_factor)
    }
}

impl CoverageEvaluator for StrictEvaluator {
    fn name(&self) -> &str {
        "StrictEvaluator"
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>, zone_idx: usize, zone: &Zone) -> Vec<Candidate> {
        let cfg = ctx.config;
        let bands = &cfg.bands;
        let t = cfg.distance_threshold_km;
        let prefilter_km = t * bands.prefilter_ratio;
        let prefilter_min = cfg.duration_threshold_min.map(|m| m * bands.prefilter_ratio);
        let fast_km = t * bands.fast_accept_ratio;

        let mut out = Vec::with_capacity(ctx.facilities.len());
        for (facility, d, dur) in ctx.reachable(zone_idx) {
            if d > prefilter_km || !duration_within(dur, prefilter_min) {
                tracing::trace!("{} prefiltered for zone {} at {:.2}km", facility.id(), zone.id(), d);
                out.push(Candidate::failing(zone, facility, d, dur, CandidateStatus::OutOfRange));
                continue;
            }

            if d < fast_km {
                out.push(Candidate::covered(
                    zone,
                    facility,
                    d,
                    dur,
                    CoverageTier::FastAccept,
                    COVERED_SCORE,
                    d,
                ));
                continue;
            }

            let (within, centroid_est) = Self::verify(zone, facility, bands.detour_factor, t);
            tracing::trace!(
                "{} verified zone {}: {}/3 samples within {:.2}km",
                facility.id(),
                zone.id(),
                within,
                t
            );
            if within >= bands.min_verified_points {
                out.push(Candidate::covered(
                    zone,
                    facility,
                    d,
                    dur,
                    CoverageTier::Verified,
                    COVERED_SCORE,
                    centroid_est,
                ));
            } else {
                out.push(Candidate::failing(zone, facility, d, dur, CandidateStatus::NotCovered));
            }
        }
        out
    }
}
