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

use crate::{
    cancel::CancellationToken,
    config::{EngineConfig, ScoringMode},
    coverage::{EvaluationContext, evaluator_for},
    err::EngineError,
    fairness::{FairnessRebalancer, RebalanceMove},
    oracle::{
        DistanceOracle,
        client::{ChunkedMatrixClient, FetchStatus},
    },
    resolve::{resolve_flat, resolve_strict},
};
use fxhash::FxHashMap;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use zone_alloc_core::prelude::GeoPoint;
use zone_alloc_model::prelude::{
    Assignment, AssignmentSet, Facility, FacilityIdentifier, GroupKey, OverrideSet, Problem, Zone,
    ZoneIdentifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    /// Some zones could not be scored and are listed as unresolved.
    Partial,
    Cancelled,
}

impl From<FetchStatus> for RunStatus {
    fn from(s: FetchStatus) -> Self {
        match s {
            FetchStatus::Complete => RunStatus::Complete,
            FetchStatus::Partial => RunStatus::Partial,
            FetchStatus::Cancelled => RunStatus::Cancelled,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Complete => write!(f, "complete"),
            RunStatus::Partial => write!(f, "partial"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Covered zones and their summed demand for one active facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityLoad {
    pub facility: FacilityIdentifier,
    pub group: GroupKey,
    pub zones: usize,
    pub demand: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    pub assignments: AssignmentSet,
    pub unresolved: Vec<ZoneIdentifier>,
    pub status: RunStatus,
    pub moves: Vec<RebalanceMove>,
    pub loads: Vec<FacilityLoad>,
}

impl RunOutcome {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    /// Computed assignments with `overrides` laid over them. The outcome
    /// itself is left untouched so overrides can be re-applied on every read.
    pub fn merged(&self, overrides: &OverrideSet, problem: &Problem) -> AssignmentSet {
        for ov in overrides.iter() {
            if problem.facility(ov.facility).is_none() {
                tracing::warn!(
                    "Override for zone {} in {} names unknown facility {}",
                    ov.zone,
                    ov.group,
                    ov.facility
                );
            }
        }
        overrides.merge(&self.assignments)
    }
}

/// Runs the whole pipeline: matrix fetch, coverage evaluation, resolution
/// and the optional fairness pass. Holds no state between runs.
#[derive(Debug, Clone)]
pub struct AssignmentEngine<O: DistanceOracle> {
    config: EngineConfig,
    oracle: O,
}

impl<O: DistanceOracle> AssignmentEngine<O> {
    #[inline]
    pub fn new(config: EngineConfig, oracle: O) -> Self {
        Self { config, oracle }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    #[tracing::instrument(
        level = "info",
        name = "Assignment Run",
        skip_all,
        fields(zones = problem.zones().len(), facilities = problem.facilities().len(), scoring = ?self.config.scoring)
    )]
    pub fn run(
        &self,
        problem: &Problem,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, EngineError> {
        self.config.validate()?;
        let cfg = &self.config;

        let zones: Vec<&Zone> = problem
            .zones()
            .iter()
            .filter(|z| cfg.includes_layer(z.layer()))
            .collect();
        let facilities: Vec<&Facility> = problem.iter_active_facilities().collect();
        let groups = problem.active_groups();
        tracing::debug!(
            "{} zones in scope, {} active facilities in {} groups",
            zones.len(),
            facilities.len(),
            groups.len()
        );

        let sources: Vec<(FacilityIdentifier, GeoPoint<f64>)> =
            facilities.iter().map(|f| (f.id(), f.location())).collect();
        let destinations: Vec<(ZoneIdentifier, GeoPoint<f64>)> =
            zones.iter().map(|z| (z.id(), z.centroid())).collect();
        let fetch = ChunkedMatrixClient::new(&self.oracle, cfg.oracle)
            .with_durations(cfg.duration_threshold_min.is_some())
            .fetch(&sources, &destinations, cancel)?;
        let matrix = &fetch.matrix;

        let evaluator = evaluator_for(cfg.scoring);
        let ctx = EvaluationContext::new(matrix, &facilities, cfg);
        let resolved: Vec<Vec<Assignment>> = zones
            .par_iter()
            .enumerate()
            .filter(|(z_idx, _)| matrix.is_resolved(*z_idx))
            .map(|(z_idx, zone)| {
                let candidates = evaluator.evaluate(&ctx, z_idx, zone);
                match cfg.scoring {
                    ScoringMode::Strict => resolve_strict(zone.id(), &candidates, &groups),
                    ScoringMode::Gravity => vec![resolve_flat(zone.id(), &candidates)],
                }
            })
            .collect();
        let mut assignments: AssignmentSet = resolved.into_iter().flatten().collect();

        let mut moves = Vec::new();
        if cfg.rebalance {
            match cfg.scoring {
                ScoringMode::Strict => {
                    let mut members: BTreeMap<GroupKey, Vec<FacilityIdentifier>> = BTreeMap::new();
                    for f in &facilities {
                        members.entry(f.group()).or_default().push(f.id());
                    }
                    moves = FairnessRebalancer::new(cfg.fairness).rebalance(
                        &mut assignments,
                        &members,
                        |z| problem.zone(z).map_or(1.0, |z| z.demand()),
                        |f, z| matrix.distance_between(f, z),
                    );
                }
                ScoringMode::Gravity => {
                    tracing::debug!("Rebalancing only applies to strict scoring; skipped")
                }
            }
        }

        let unresolved = matrix.unresolved_zones();
        if !unresolved.is_empty() {
            tracing::warn!("{} zones left unresolved", unresolved.len());
        }
        let loads = facility_loads(&facilities, &assignments, problem);
        let status = RunStatus::from(fetch.status);
        tracing::info!(
            "Run {}: {} covered, {} uncovered, {} unresolved, {} rebalancing moves",
            status,
            assignments.covered_count(),
            assignments.uncovered_count(),
            unresolved.len(),
            moves.len()
        );

        Ok(RunOutcome {
            assignments,
            unresolved,
            status,
            moves,
            loads,
        })
    }
}

fn facility_loads(
    facilities: &[&Facility],
    assignments: &AssignmentSet,
    problem: &Problem,
) -> Vec<FacilityLoad> {
    let mut acc: FxHashMap<FacilityIdentifier, (usize, f64)> = FxHashMap::default();
    for a in assignments.iter().filter(|a| a.is_covered()) {
        if let Some(f) = a.facility() {
            let e = acc.entry(f).or_default();
            e.0 += 1;
            e.1 += problem.zone(a.zone()).map_or(1.0, |z| z.demand());
        }
    }
    facilities
        .iter()
        .map(|f| {
            let (zones, demand) = acc.get(&f.id()).copied().unwrap_or_default();
            FacilityLoad {
                facility: f.id(),
                group: f.group(),
                zones,
                demand,
            }
        })
        .collect()
}
