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

//! Per (zone, facility) coverage evaluation. An evaluator turns one resolved
//! matrix column into a candidate list; selection happens in the resolver.

pub mod gravity;
pub mod strict;

use crate::{
    config::{EngineConfig, ScoringMode},
    oracle::matrix::DistanceMatrix,
};
use zone_alloc_model::prelude::{
    CoverageTier, Facility, FacilityIdentifier, GroupKey, Zone, ZoneIdentifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateStatus {
    Covered,
    NotCovered,
    /// Dropped by the prefilter band; kept only as a fallback.
    OutOfRange,
}

/// One evaluated (zone, facility) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub zone: ZoneIdentifier,
    pub facility: FacilityIdentifier,
    pub group: GroupKey,
    /// Oracle road distance from the facility to the zone centroid.
    pub distance_km: f64,
    pub duration_min: Option<f64>,
    pub status: CandidateStatus,
    pub tier: Option<CoverageTier>,
    pub score: f64,
    pub tie_break_km: f64,
    pub reason: Option<String>,
}

impl Candidate {
    #[inline]
    pub fn is_covered(&self) -> bool {
        self.status == CandidateStatus::Covered
    }

    pub(crate) fn covered(
        zone: &Zone,
        facility: &Facility,
        distance_km: f64,
        duration_min: Option<f64>,
        tier: CoverageTier,
        score: f64,
        tie_break_km: f64,
    ) -> Self {
        Self {
            zone: zone.id(),
            facility: facility.id(),
            group: facility.group(),
            distance_km,
            duration_min,
            status: CandidateStatus::Covered,
            tier: Some(tier),
            score,
            tie_break_km,
            reason: None,
        }
    }

    pub(crate) fn failing(
        zone: &Zone,
        facility: &Facility,
        distance_km: f64,
        duration_min: Option<f64>,
        status: CandidateStatus,
    ) -> Self {
        Self {
            zone: zone.id(),
            facility: facility.id(),
            group: facility.group(),
            distance_km,
            duration_min,
            status,
            tier: None,
            score: 0.0,
            tie_break_km: distance_km,
            reason: Some(best_option_reason(facility, distance_km)),
        }
    }
}

#[inline]
pub fn best_option_reason(facility: &Facility, distance_km: f64) -> String {
    format!("Best option: {} at {:.1}km", facility.name(), distance_km)
}

/// Everything an evaluator reads. `facilities[i]` is row `i` of `matrix`.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub matrix: &'a DistanceMatrix,
    pub facilities: &'a [&'a Facility],
    pub config: &'a EngineConfig,
}

impl<'a> EvaluationContext<'a> {
    #[inline]
    pub fn new(
        matrix: &'a DistanceMatrix,
        facilities: &'a [&'a Facility],
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            matrix,
            facilities,
            config,
        }
    }

    /// Facilities with a known distance to the zone at column `zone_idx`.
    /// Null cells are skipped.
    pub(crate) fn reachable(
        &self,
        zone_idx: usize,
    ) -> impl Iterator<Item = (&'a Facility, f64, Option<f64>)> + '_ {
        self.facilities
            .iter()
            .enumerate()
            .filter_map(move |(f_idx, facility)| {
                match self.matrix.distance_km(f_idx, zone_idx) {
                    Some(d) => Some((*facility, d, self.matrix.duration_min(f_idx, zone_idx))),
                    None => {
                        tracing::trace!(
                            "No route between {} and zone column {}",
                            facility.id(),
                            zone_idx
                        );
                        None
                    }
                }
            })
    }
}

/// An unknown duration never disqualifies a pair.
#[inline]
pub(crate) fn duration_within(duration_min: Option<f64>, limit_min: Option<f64>) -> bool {
    match (duration_min, limit_min) {
        (Some(d), Some(limit)) => d <= limit,
        _ => true,
    }
}

pub trait CoverageEvaluator: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, ctx: &EvaluationContext<'_>, zone_idx: usize, zone: &Zone) -> Vec<Candidate>;
}

impl std::fmt::Display for dyn CoverageEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub fn evaluator_for(mode: ScoringMode) -> Box<dyn CoverageEvaluator> {
    match mode {
        ScoringMode::Strict => Box::new(strict::StrictEvaluator),
        ScoringMode::Gravity => Box::new(gravity::GravityEvaluator),
    }
}
