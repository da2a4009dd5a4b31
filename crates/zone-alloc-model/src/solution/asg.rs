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

use crate::problem::{
    facility::FacilityIdentifier,
    group::GroupKey,
    zone::ZoneIdentifier,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageStatus {
    Covered,
    Uncovered,
}

impl std::fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageStatus::Covered => write!(f, "Covered"),
            CoverageStatus::Uncovered => write!(f, "Uncovered"),
        }
    }
}

/// How an assignment was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageTier {
    /// Centroid well inside the safe radius.
    FastAccept,
    /// Enough of the nearest/farthest/centroid samples within threshold.
    Verified,
    /// Capacity-weighted centroid score.
    Gravity,
    /// No facility qualified.
    NoCoverage,
    /// Forced by an override.
    Manual,
}

impl std::fmt::Display for CoverageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CoverageTier::FastAccept => "FastAccept",
            CoverageTier::Verified => "Verified",
            CoverageTier::Gravity => "Gravity",
            CoverageTier::NoCoverage => "NoCoverage",
            CoverageTier::Manual => "Manual",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub zone: ZoneIdentifier,
    pub group: GroupKey,
}

impl AssignmentKey {
    #[inline]
    pub fn new(zone: ZoneIdentifier, group: GroupKey) -> Self {
        Self { zone, group }
    }
}

impl std::fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.zone, self.group)
    }
}

/// The outcome for one zone within one group (or for one zone overall in
/// flat scoring). Uncovered assignments carry no facility; the nearest
/// failing option is kept in `best_option` for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    zone: ZoneIdentifier,
    group: GroupKey,
    facility: Option<FacilityIdentifier>,
    best_option: Option<FacilityIdentifier>,
    distance_km: Option<f64>,
    status: CoverageStatus,
    tier: CoverageTier,
    score: f64,
    rebalanced: bool,
    reason: Option<String>,
}

impl Assignment {
    #[inline]
    pub fn covered(
        zone: ZoneIdentifier,
        group: GroupKey,
        facility: FacilityIdentifier,
        distance_km: f64,
        tier: CoverageTier,
        score: f64,
    ) -> Self {
        Self {
            zone,
            group,
            facility: Some(facility),
            best_option: Some(facility),
            distance_km: Some(distance_km),
            status: CoverageStatus::Covered,
            tier,
            score,
            rebalanced: false,
            reason: None,
        }
    }

    #[inline]
    pub fn uncovered(
        zone: ZoneIdentifier,
        group: GroupKey,
        best_option: Option<FacilityIdentifier>,
        distance_km: Option<f64>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            zone,
            group,
            facility: None,
            best_option,
            distance_km,
            status: CoverageStatus::Uncovered,
            tier: CoverageTier::NoCoverage,
            score: 0.0,
            rebalanced: false,
            reason: Some(reason.into()),
        }
    }

    #[inline]
    pub fn manual(zone: ZoneIdentifier, group: GroupKey, facility: FacilityIdentifier) -> Self {
        Self {
            zone,
            group,
            facility: Some(facility),
            best_option: Some(facility),
            distance_km: None,
            status: CoverageStatus::Covered,
            tier: CoverageTier::Manual,
            score: 0.0,
            rebalanced: false,
            reason: None,
        }
    }

    #[inline]
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey::new(self.zone, self.group)
    }

    #[inline]
    pub fn zone(&self) -> ZoneIdentifier {
        self.zone
    }

    #[inline]
    pub fn group(&self) -> GroupKey {
        self.group
    }

    #[inline]
    pub fn facility(&self) -> Option<FacilityIdentifier> {
        self.facility
    }

    #[inline]
    pub fn best_option(&self) -> Option<FacilityIdentifier> {
        self.best_option
    }

    #[inline]
    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    #[inline]
    pub fn status(&self) -> CoverageStatus {
        self.status
    }

    #[inline]
    pub fn is_covered(&self) -> bool {
        self.status == CoverageStatus::Covered
    }

    #[inline]
    pub fn tier(&self) -> CoverageTier {
        self.tier
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn is_rebalanced(&self) -> bool {
        self.rebalanced
    }

    #[inline]
    pub fn is_manual(&self) -> bool {
        self.tier == CoverageTier::Manual
    }

    #[inline]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Moves a covered assignment to another facility of the same group.
    /// The distance is replaced when known, otherwise the previous value stays.
    #[inline]
    pub fn reassign(&mut self, facility: FacilityIdentifier, distance_km: Option<f64>) {
        self.facility = Some(facility);
        self.best_option = Some(facility);
        if distance_km.is_some() {
            self.distance_km = distance_km;
        }
        self.rebalanced = true;
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.facility {
            Some(fac) => write!(
                f,
                "Assignment: {} -> {} [{} / {}]",
                self.key(),
                fac,
                self.status,
                self.tier
            ),
            None => write!(
                f,
                "Assignment: {} -> none [{}] {}",
                self.key(),
                self.status,
                self.reason.as_deref().unwrap_or("")
            ),
        }
    }
}

/// Assignments keyed by `(zone, group)`; at most one per key.
#[repr(transparent)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Assignment>", into = "Vec<Assignment>")]
pub struct AssignmentSet(BTreeMap<AssignmentKey, Assignment>);

impl AssignmentSet {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts, replacing any assignment with the same key.
    #[inline]
    pub fn insert(&mut self, assignment: Assignment) -> Option<Assignment> {
        self.0.insert(assignment.key(), assignment)
    }

    #[inline]
    pub fn remove(&mut self, key: &AssignmentKey) -> Option<Assignment> {
        self.0.remove(key)
    }

    #[inline]
    pub fn get(&self, key: &AssignmentKey) -> Option<&Assignment> {
        self.0.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &AssignmentKey) -> Option<&mut Assignment> {
        self.0.get_mut(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Assignments ordered by zone, then group.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.0.values()
    }

    #[inline]
    pub fn iter_zone(&self, zone: ZoneIdentifier) -> impl Iterator<Item = &Assignment> {
        self.0.values().filter(move |a| a.zone() == zone)
    }

    #[inline]
    pub fn iter_group(&self, group: GroupKey) -> impl Iterator<Item = &Assignment> {
        self.0.values().filter(move |a| a.group() == group)
    }

    #[inline]
    pub fn covered_count(&self) -> usize {
        self.0.values().filter(|a| a.is_covered()).count()
    }

    #[inline]
    pub fn uncovered_count(&self) -> usize {
        self.len() - self.covered_count()
    }
}

impl FromIterator<Assignment> for AssignmentSet {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        let mut s = Self::new();
        for a in iter {
            s.insert(a);
        }
        s
    }
}

impl Extend<Assignment> for AssignmentSet {
    fn extend<I: IntoIterator<Item = Assignment>>(&mut self, iter: I) {
        for a in iter {
            self.insert(a);
        }
    }
}

impl From<Vec<Assignment>> for AssignmentSet {
    fn from(value: Vec<Assignment>) -> Self {
        value.into_iter().collect()
    }
}

impl From<AssignmentSet> for Vec<Assignment> {
    fn from(value: AssignmentSet) -> Self {
        value.0.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::group::GroupIdentifier;

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

    #[test]
    fn test_one_assignment_per_zone_and_group() {
        let mut set = AssignmentSet::new();
        set.insert(Assignment::covered(zid(1), grp(1), fid(1), 1.0, CoverageTier::FastAccept, 3.0));
        let prev = set.insert(Assignment::covered(
            zid(1),
            grp(1),
            fid(2),
            2.0,
            CoverageTier::Verified,
            3.0,
        ));
        assert!(prev.is_some());
        set.insert(Assignment::uncovered(zid(1), grp(2), Some(fid(3)), Some(9.0), "far"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.covered_count(), 1);
        assert_eq!(set.uncovered_count(), 1);
        assert_eq!(
            set.get(&AssignmentKey::new(zid(1), grp(1))).unwrap().facility(),
            Some(fid(2))
        );
    }

    #[test]
    fn test_uncovered_has_no_facility() {
        let a = Assignment::uncovered(zid(1), grp(1), Some(fid(5)), Some(7.5), "Best option: x");
        assert_eq!(a.facility(), None);
        assert_eq!(a.best_option(), Some(fid(5)));
        assert_eq!(a.reason(), Some("Best option: x"));
        assert!(!a.is_covered());
    }

    #[test]
    fn test_reassign_marks_rebalanced() {
        let mut a = Assignment::covered(zid(1), grp(1), fid(1), 4.0, CoverageTier::Verified, 3.0);
        a.reassign(fid(2), None);
        assert_eq!(a.facility(), Some(fid(2)));
        assert_eq!(a.distance_km(), Some(4.0));
        assert!(a.is_rebalanced());
        a.reassign(fid(3), Some(6.0));
        assert_eq!(a.distance_km(), Some(6.0));
    }

    #[test]
    fn test_iteration_order_and_filters() {
        let set: AssignmentSet = vec![
            Assignment::covered(zid(2), grp(1), fid(1), 1.0, CoverageTier::FastAccept, 3.0),
            Assignment::covered(zid(1), grp(2), fid(2), 1.0, CoverageTier::FastAccept, 3.0),
            Assignment::covered(zid(1), GroupKey::Unassigned, fid(3), 1.0, CoverageTier::FastAccept, 3.0),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = set.iter().map(|a| a.key()).collect();
        assert_eq!(
            keys,
            vec![
                AssignmentKey::new(zid(1), GroupKey::Unassigned),
                AssignmentKey::new(zid(1), grp(2)),
                AssignmentKey::new(zid(2), grp(1)),
            ]
        );
        assert_eq!(set.iter_zone(zid(1)).count(), 2);
        assert_eq!(set.iter_group(grp(1)).count(), 1);
    }

    #[test]
    fn test_serializes_as_list() {
        let set: AssignmentSet = std::iter::once(Assignment::manual(zid(1), grp(1), fid(1))).collect();
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.starts_with('['));
        let back: AssignmentSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
