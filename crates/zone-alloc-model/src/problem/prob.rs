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
    facility::{Facility, FacilityContainer, FacilityIdentifier},
    group::GroupKey,
    zone::{Zone, ZoneContainer, ZoneIdentifier},
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct Problem {
    zones: ZoneContainer,
    facilities: FacilityContainer,
}

impl Problem {
    /// Containers are assumed to be validated; use [`crate::problem::builder::ProblemBuilder`]
    /// to construct a problem from untrusted records.
    #[inline]
    pub fn new(zones: ZoneContainer, facilities: FacilityContainer) -> Self {
        Self { zones, facilities }
    }

    #[inline]
    pub fn zones(&self) -> &ZoneContainer {
        &self.zones
    }

    #[inline]
    pub fn zones_mut(&mut self) -> &mut ZoneContainer {
        &mut self.zones
    }

    #[inline]
    pub fn facilities(&self) -> &FacilityContainer {
        &self.facilities
    }

    #[inline]
    pub fn facilities_mut(&mut self) -> &mut FacilityContainer {
        &mut self.facilities
    }

    #[inline]
    pub fn zone(&self, id: ZoneIdentifier) -> Option<&Zone> {
        self.zones.get(id)
    }

    #[inline]
    pub fn facility(&self, id: FacilityIdentifier) -> Option<&Facility> {
        self.facilities.get(id)
    }

    #[inline]
    pub fn iter_active_facilities(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.iter_active()
    }

    #[inline]
    pub fn active_facility_count(&self) -> usize {
        self.facilities.iter_active().count()
    }

    /// Groups that own at least one active facility.
    pub fn active_groups(&self) -> BTreeSet<GroupKey> {
        self.facilities.iter_active().map(|f| f.group()).collect()
    }

    /// Active facilities of one group, in id order.
    #[inline]
    pub fn iter_group_facilities(&self, group: GroupKey) -> impl Iterator<Item = &Facility> {
        self.facilities
            .iter_active()
            .filter(move |f| f.group() == group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::group::GroupIdentifier;
    use zone_alloc_core::prelude::GeoPoint;

    #[inline]
    fn fid(n: u64) -> FacilityIdentifier {
        FacilityIdentifier::new(n)
    }

    #[test]
    fn test_active_groups_ignore_inactive_facilities() {
        let g1 = GroupKey::from(GroupIdentifier::new(1));
        let g2 = GroupKey::from(GroupIdentifier::new(2));
        let facilities: FacilityContainer = vec![
            Facility::new(fid(1), "a", GeoPoint::new(0.0, 0.0)).with_group(g1),
            Facility::new(fid(2), "b", GeoPoint::new(0.0, 0.0)).with_group(g2).with_active(false),
            Facility::new(fid(3), "c", GeoPoint::new(0.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let p = Problem::new(ZoneContainer::new(), facilities);

        let groups: Vec<_> = p.active_groups().into_iter().collect();
        assert_eq!(groups, vec![GroupKey::Unassigned, g1]);
        assert_eq!(p.iter_group_facilities(g2).count(), 0);
        assert_eq!(p.active_facility_count(), 2);
    }
}
