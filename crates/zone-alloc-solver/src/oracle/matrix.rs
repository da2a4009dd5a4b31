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

use crate::oracle::MatrixBlock;
use fixedbitset::FixedBitSet;
use fxhash::FxHashMap;
use zone_alloc_model::prelude::{FacilityIdentifier, ZoneIdentifier};

/// Dense facility x zone matrix in kilometers (and minutes). Zones whose
/// chunk never arrived stay unresolved and yield no distances at all.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    facilities: Vec<FacilityIdentifier>,
    zones: Vec<ZoneIdentifier>,
    facility_index: FxHashMap<FacilityIdentifier, usize>,
    zone_index: FxHashMap<ZoneIdentifier, usize>,
    distances_km: Vec<Option<f64>>,
    durations_min: Option<Vec<Option<f64>>>,
    resolved: FixedBitSet,
}

impl DistanceMatrix {
    pub fn new(
        facilities: Vec<FacilityIdentifier>,
        zones: Vec<ZoneIdentifier>,
        with_durations: bool,
    ) -> Self {
        let cells = facilities.len() * zones.len();
        let facility_index = facilities
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        let zone_index = zones.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let resolved = FixedBitSet::with_capacity(zones.len());
        Self {
            facilities,
            zones,
            facility_index,
            zone_index,
            distances_km: vec![None; cells],
            durations_min: with_durations.then(|| vec![None; cells]),
            resolved,
        }
    }

    #[inline]
    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }

    #[inline]
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    #[inline]
    pub fn facility_ids(&self) -> &[FacilityIdentifier] {
        &self.facilities
    }

    #[inline]
    pub fn zone_ids(&self) -> &[ZoneIdentifier] {
        &self.zones
    }

    #[inline]
    pub fn facility_index(&self, id: FacilityIdentifier) -> Option<usize> {
        self.facility_index.get(&id).copied()
    }

    #[inline]
    pub fn zone_index(&self, id: ZoneIdentifier) -> Option<usize> {
        self.zone_index.get(&id).copied()
    }

    #[inline]
    fn cell(&self, facility: usize, zone: usize) -> usize {
        facility * self.zones.len() + zone
    }

    /// Copies a validated block covering zones `zone_offset..zone_offset + width`
    /// and marks those zones resolved.
    pub fn fill_block(&mut self, zone_offset: usize, block: &MatrixBlock) {
        for (f, row) in block.distances_m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                let c = self.cell(f, zone_offset + j);
                self.distances_km[c] = v.map(|m| m / 1000.0);
            }
        }
        if let (Some(out), Some(rows)) = (self.durations_min.as_mut(), block.durations_s.as_ref()) {
            let width = self.zones.len();
            for (f, row) in rows.iter().enumerate() {
                for (j, v) in row.iter().enumerate() {
                    out[f * width + zone_offset + j] = v.map(|s| s / 60.0);
                }
            }
        }
        let width = block.distances_m.first().map_or(0, Vec::len);
        self.resolved
            .insert_range(zone_offset..(zone_offset + width).min(self.zones.len()));
    }

    /// Used when there is nothing to request, e.g. no active facilities.
    #[inline]
    pub fn mark_all_resolved(&mut self) {
        self.resolved.insert_range(..);
    }

    #[inline]
    pub fn is_resolved(&self, zone: usize) -> bool {
        self.resolved.contains(zone)
    }

    #[inline]
    pub fn resolved_count(&self) -> usize {
        self.resolved.count_ones(..)
    }

    pub fn unresolved_zones(&self) -> Vec<ZoneIdentifier> {
        (0..self.zones.len())
            .filter(|z| !self.resolved.contains(*z))
            .map(|z| self.zones[z])
            .collect()
    }

    #[inline]
    pub fn distance_km(&self, facility: usize, zone: usize) -> Option<f64> {
        if !self.is_resolved(zone) {
            return None;
        }
        self.distances_km[self.cell(facility, zone)]
    }

    #[inline]
    pub fn duration_min(&self, facility: usize, zone: usize) -> Option<f64> {
        if !self.is_resolved(zone) {
            return None;
        }
        let c = self.cell(facility, zone);
        self.durations_min.as_ref().and_then(|d| d[c])
    }

    #[inline]
    pub fn distance_between(
        &self,
        facility: FacilityIdentifier,
        zone: ZoneIdentifier,
    ) -> Option<f64> {
        self.distance_km(self.facility_index(facility)?, self.zone_index(zone)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn zid(n: u64) -> ZoneIdentifier {
        ZoneIdentifier::new(n)
    }
    #[inline]
    fn fid(n: u64) -> FacilityIdentifier {
        FacilityIdentifier::new(n)
    }

    fn matrix() -> DistanceMatrix {
        DistanceMatrix::new(vec![fid(1), fid(2)], vec![zid(10), zid(11), zid(12)], true)
    }

    #[test]
    fn test_unfilled_zones_are_unresolved() {
        let m = matrix();
        assert_eq!(m.resolved_count(), 0);
        assert_eq!(m.unresolved_zones(), vec![zid(10), zid(11), zid(12)]);
        assert_eq!(m.distance_km(0, 0), None);
    }

    #[test]
    fn test_fill_block_converts_units_and_marks_resolved() {
        let mut m = matrix();
        let block = MatrixBlock::new(vec![vec![Some(1500.0), None], vec![Some(0.0), Some(2000.0)]])
            .with_durations(vec![vec![Some(120.0), Some(60.0)], vec![Some(30.0), None]]);
        m.fill_block(1, &block);

        assert!(!m.is_resolved(0));
        assert!(m.is_resolved(1));
        assert!(m.is_resolved(2));
        assert_eq!(m.distance_km(0, 1), Some(1.5));
        assert_eq!(m.distance_km(0, 2), None);
        assert_eq!(m.distance_km(1, 1), Some(0.0));
        assert_eq!(m.duration_min(0, 1), Some(2.0));
        assert_eq!(m.duration_min(1, 2), None);
        assert_eq!(m.distance_between(fid(2), zid(12)), Some(2.0));
        assert_eq!(m.distance_between(fid(9), zid(12)), None);
        assert_eq!(m.unresolved_zones(), vec![zid(10)]);
    }

    #[test]
    fn test_durations_absent_when_not_requested() {
        let mut m = DistanceMatrix::new(vec![fid(1)], vec![zid(1)], false);
        m.fill_block(
            0,
            &MatrixBlock::new(vec![vec![Some(1000.0)]]).with_durations(vec![vec![Some(60.0)]]),
        );
        assert_eq!(m.distance_km(0, 0), Some(1.0));
        assert_eq!(m.duration_min(0, 0), None);
    }
}
