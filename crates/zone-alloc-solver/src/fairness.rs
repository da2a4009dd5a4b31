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

use crate::config::FairnessConfig;
use fxhash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;
use zone_alloc_model::prelude::{AssignmentKey, AssignmentSet, FacilityIdentifier, GroupKey, ZoneIdentifier};

/// A zone handed from an overloaded facility to an underloaded one of the
/// same group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceMove {
    pub zone: ZoneIdentifier,
    pub group: GroupKey,
    pub from: FacilityIdentifier,
    pub to: FacilityIdentifier,
    pub demand: f64,
}

/// Single greedy pass per group that drains facilities above
/// `average * overload_ratio` into facilities below the average, moving the
/// most distant zones first. Distances are not re-checked after a move.
#[derive(Debug, Clone, Copy)]
pub struct FairnessRebalancer {
    overload_ratio: f64,
}

impl Default for FairnessRebalancer {
    fn default() -> Self {
        Self::new(FairnessConfig::default())
    }
}

impl FairnessRebalancer {
    #[inline]
    pub fn new(config: FairnessConfig) -> Self {
        Self {
            overload_ratio: config.overload_ratio,
        }
    }

    #[inline]
    pub fn overload_ratio(&self) -> f64 {
        self.overload_ratio
    }

    /// Rebalances every group in `groups` (group -> member facilities) and
    /// returns the moves in the order they were applied. Manual and uncovered
    /// assignments are left alone.
    #[tracing::instrument(level = "debug", name = "Fairness Rebalance", skip_all, fields(groups = groups.len()))]
    pub fn rebalance<D, M>(
        &self,
        assignments: &mut AssignmentSet,
        groups: &BTreeMap<GroupKey, Vec<FacilityIdentifier>>,
        demand: D,
        distance: M,
    ) -> Vec<RebalanceMove>
    where
        D: Fn(ZoneIdentifier) -> f64,
        M: Fn(FacilityIdentifier, ZoneIdentifier) -> Option<f64>,
    {
        let mut moves = Vec::new();
        for (&group, members) in groups {
            if members.len() < 2 {
                tracing::trace!("Skipping {}: fewer than two facilities", group);
                continue;
            }
            self.rebalance_group(assignments, group, members, &demand, &distance, &mut moves);
        }
        moves
    }

    fn rebalance_group<D, M>(
        &self,
        assignments: &mut AssignmentSet,
        group: GroupKey,
        members: &[FacilityIdentifier],
        demand: &D,
        distance: &M,
        moves: &mut Vec<RebalanceMove>,
    ) where
        D: Fn(ZoneIdentifier) -> f64,
        M: Fn(FacilityIdentifier, ZoneIdentifier) -> Option<f64>,
    {
        let mut loads: FxHashMap<FacilityIdentifier, f64> =
            members.iter().map(|f| (*f, 0.0)).collect();

        // (key, facility, distance, demand) of every movable assignment.
        let mut movable: Vec<(AssignmentKey, FacilityIdentifier, f64, f64)> = Vec::new();
        for a in assignments.iter_group(group) {
            if !a.is_covered() || a.is_manual() {
                continue;
            }
            let Some(f) = a.facility() else { continue };
            let Some(load) = loads.get_mut(&f) else { continue };
            let w = demand(a.zone());
            *load += w;
            movable.push((a.key(), f, a.distance_km().unwrap_or(0.0), w));
        }

        let total: f64 = loads.values().sum();
        let average = total / members.len() as f64;
        let threshold = average * self.overload_ratio;

        let overloaded: FxHashSet<FacilityIdentifier> = loads
            .iter()
            .filter(|(_, l)| **l > threshold)
            .map(|(f, _)| *f)
            .collect();
        let underloaded: Vec<FacilityIdentifier> = {
            let mut u: Vec<_> = loads.iter().filter(|(_, l)| **l < average).map(|(f, _)| *f).collect();
            u.sort();
            u
        };
        if overloaded.is_empty() || underloaded.is_empty() {
            tracing::trace!("{} is balanced (average {:.2})", group, average);
            return;
        }
        tracing::debug!(
            "{}: average load {:.2}, threshold {:.2}, {} overloaded, {} underloaded",
            group,
            average,
            threshold,
            overloaded.len(),
            underloaded.len()
        );

        movable.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.zone.cmp(&b.0.zone)));

        for (key, from, _, w) in movable {
            if !overloaded.contains(&from) || loads[&from] <= threshold {
                continue;
            }
            let target = underloaded
                .iter()
                .copied()
                .filter(|f| loads[f] < average)
                .min_by(|a, b| loads[a].total_cmp(&loads[b]).then_with(|| a.cmp(b)));
            let Some(to) = target else {
                tracing::trace!("{}: no underloaded facility left", group);
                break;
            };

            if let Some(a) = assignments.get_mut(&key) {
                a.reassign(to, distance(to, key.zone));
            }
            if let Some(l) = loads.get_mut(&from) {
                *l -= w;
            }
            if let Some(l) = loads.get_mut(&to) {
                *l += w;
            }
            tracing::debug!("Moved zone {} from {} to {} ({:.2})", key.zone, from, to, w);
            moves.push(RebalanceMove {
                zone: key.zone,
                group,
                from,
                to,
                demand: w,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use zone_alloc_model::prelude::{Assignment, CoverageTier, GroupIdentifier};

    #[inline]
    fn zid(n: u64) -> ZoneIdentifier {
        ZoneIdentifier::new(n)
    }

    #[inline]
    fn fid(n: u64) -> FacilityIdentifier {
        FacilityIdentifier::new(n)
    }

    #[inline]
    fn grp(n: u64) -> GroupKey {
        GroupKey::Group(GroupIdentifier::new(n))
    }

    fn asg(z: u64, g: GroupKey, f: u64, d: f64) -> Assignment {
        Assignment::covered(zid(z), g, fid(f), d, CoverageTier::Verified, 3.0)
    }

    fn loads(set: &AssignmentSet, demand: &BTreeMap<ZoneIdentifier, f64>) -> BTreeMap<FacilityIdentifier, f64> {
        let mut out = BTreeMap::new();
        for a in set.iter().filter(|a| a.is_covered()) {
            if let Some(f) = a.facility() {
                *out.entry(f).or_insert(0.0) += demand[&a.zone()];
            }
        }
        out
    }

    #[test]
    fn test_overloaded_facility_sheds_most_distant_zone() {
        let g = grp(1);
        let mut set: AssignmentSet = [asg(1, g, 1, 4.5), asg(2, g, 1, 1.0), asg(3, g, 2, 2.0)]
            .into_iter()
            .collect();
        let demand = BTreeMap::from([(zid(1), 40.0), (zid(2), 90.0), (zid(3), 20.0)]);
        let groups = BTreeMap::from([(g, vec![fid(1), fid(2)])]);

        let moves = FairnessRebalancer::default().rebalance(
            &mut set,
            &groups,
            |z| demand[&z],
            |f, _| (f == fid(2)).then_some(3.3),
        );

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].zone, zid(1));
        assert_eq!((moves[0].from, moves[0].to), (fid(1), fid(2)));
        let moved = set.get(&AssignmentKey::new(zid(1), g)).unwrap();
        assert_eq!(moved.facility(), Some(fid(2)));
        assert!(moved.is_rebalanced());
        assert_eq!(moved.distance_km(), Some(3.3));
        assert!(!set.get(&AssignmentKey::new(zid(2), g)).unwrap().is_rebalanced());

        let after = loads(&set, &demand);
        assert_eq!(after[&fid(1)], 90.0);
        assert_eq!(after[&fid(2)], 60.0);
    }

    #[test]
    fn test_single_facility_group_is_skipped() {
        let g = grp(1);
        let mut set: AssignmentSet = [asg(1, g, 1, 1.0), asg(2, g, 1, 2.0)].into_iter().collect();
        let groups = BTreeMap::from([(g, vec![fid(1)])]);
        let moves = FairnessRebalancer::default().rebalance(&mut set, &groups, |_| 10.0, |_, _| None);
        assert!(moves.is_empty());
    }

    #[test]
    fn test_balanced_group_is_untouched() {
        let g = grp(1);
        let mut set: AssignmentSet = [asg(1, g, 1, 1.0), asg(2, g, 2, 2.0)].into_iter().collect();
        let groups = BTreeMap::from([(g, vec![fid(1), fid(2)])]);
        let before = set.clone();
        let moves = FairnessRebalancer::default().rebalance(&mut set, &groups, |_| 5.0, |_, _| None);
        assert!(moves.is_empty());
        assert_eq!(set, before);
    }

    #[test]
    fn test_never_moves_across_groups_or_touches_manual() {
        let (g1, g2) = (grp(1), grp(2));
        let mut set: AssignmentSet = [
            asg(1, g1, 1, 5.0),
            asg(2, g1, 1, 4.0),
            asg(3, g2, 3, 1.0),
            Assignment::manual(zid(4), g1, fid(1)),
        ]
        .into_iter()
        .collect();
        let groups = BTreeMap::from([(g1, vec![fid(1), fid(2)]), (g2, vec![fid(3), fid(4)])]);
        let moves = FairnessRebalancer::default().rebalance(&mut set, &groups, |_| 10.0, |_, _| None);

        for m in &moves {
            assert_eq!(set.get(&AssignmentKey::new(m.zone, m.group)).unwrap().group(), m.group);
        }
        assert!(moves.iter().all(|m| m.zone != zid(4)));
        assert!(moves.iter().all(|m| [fid(1), fid(2)].contains(&m.to) || [fid(3), fid(4)].contains(&m.to)));
        assert!(moves.iter().filter(|m| m.group == g1).all(|m| m.to == fid(2)));
        assert!(moves.iter().filter(|m| m.group == g2).all(|m| m.to == fid(4)));
        assert_eq!(set.get(&AssignmentKey::new(zid(4), g1)).unwrap().facility(), Some(fid(1)));
    }

    #[test]
    fn test_overshoot_is_bounded_by_one_zone() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let g = grp(1);
            let n_fac = rng.gen_range(2..5u64);
            let mut set = AssignmentSet::new();
            let mut demand = BTreeMap::new();
            for z in 0..rng.gen_range(3..30u64) {
                let f = if rng.gen_bool(0.6) { 0 } else { rng.gen_range(0..n_fac) };
                set.insert(asg(z, g, f, rng.gen_range(0.1..10.0)));
                demand.insert(zid(z), rng.gen_range(1.0..50.0));
            }
            let groups = BTreeMap::from([(g, (0..n_fac).map(fid).collect::<Vec<_>>())]);
            let before = loads(&set, &demand);
            let total: f64 = before.values().sum();
            let threshold = total / n_fac as f64 * 1.3;
            let max_w = demand.values().copied().fold(0.0, f64::max);

            FairnessRebalancer::default().rebalance(&mut set, &groups, |z| demand[&z], |_, _| None);

            // Receivers only take zones while below the average, senders only shed.
            for (f, load) in loads(&set, &demand) {
                let pre = before.get(&f).copied().unwrap_or(0.0);
                assert!(
                    load <= pre.max(threshold + max_w) + 1e-9,
                    "{f} went from {pre} to {load}, threshold {threshold}"
                );
            }
            let after_total: f64 = loads(&set, &demand).values().sum();
            assert!((after_total - total).abs() < 1e-6);
        }
    }
}
