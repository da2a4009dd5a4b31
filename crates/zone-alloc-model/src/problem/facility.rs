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
    common::{Identifier, IdentifierMarkerName},
    problem::group::GroupKey,
};
use std::collections::BTreeMap;
use zone_alloc_core::prelude::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityIdentifierMarker;

impl IdentifierMarkerName for FacilityIdentifierMarker {
    const NAME: &'static str = "FacilityId";
}

pub type FacilityIdentifier = Identifier<u64, FacilityIdentifierMarker>;

/// A store or hub that can serve zones. Inactive facilities stay in the
/// problem for display but never take part in matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    id: FacilityIdentifier,
    name: String,
    location: GeoPoint<f64>,
    capacity: f64,
    group: GroupKey,
    active: bool,
}

impl Facility {
    #[inline]
    pub fn new(id: FacilityIdentifier, name: impl Into<String>, location: GeoPoint<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            capacity: 1.0,
            group: GroupKey::Unassigned,
            active: true,
        }
    }

    #[inline]
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    #[inline]
    pub fn with_group(mut self, group: impl Into<GroupKey>) -> Self {
        self.group = group.into();
        self
    }

    #[inline]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[inline]
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[inline]
    pub fn id(&self) -> FacilityIdentifier {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn location(&self) -> GeoPoint<f64> {
        self.location
    }

    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    #[inline]
    pub fn group(&self) -> GroupKey {
        self.group
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Facility: Id: {}, Name: {}, Location: {}, Capacity: {}, Group: {}, Active: {}",
            self.id, self.name, self.location, self.capacity, self.group, self.active
        )
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Default)]
pub struct FacilityContainer(BTreeMap<FacilityIdentifier, Facility>);

impl FacilityContainer {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, facility: Facility) -> Option<Facility> {
        self.0.insert(facility.id(), facility)
    }

    #[inline]
    pub fn remove(&mut self, id: FacilityIdentifier) -> Option<Facility> {
        self.0.remove(&id)
    }

    #[inline]
    pub fn contains_id(&self, id: FacilityIdentifier) -> bool {
        self.0.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: FacilityIdentifier) -> Option<&Facility> {
        self.0.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: FacilityIdentifier) -> Option<&mut Facility> {
        self.0.get_mut(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Facilities in ascending id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Facility> {
        self.0.values()
    }

    #[inline]
    pub fn iter_active(&self) -> impl Iterator<Item = &Facility> {
        self.0.values().filter(|f| f.is_active())
    }
}

impl FromIterator<Facility> for FacilityContainer {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Facility>>(iter: I) -> Self {
        let mut c = Self::new();
        for f in iter {
            c.insert(f);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::group::GroupIdentifier;

    #[inline]
    fn fid(n: u64) -> FacilityIdentifier {
        FacilityIdentifier::new(n)
    }

    #[test]
    fn test_defaults() {
        let f = Facility::new(fid(1), "Hub", GeoPoint::from_lat_lng(48.0, 11.0));
        assert_eq!(f.capacity(), 1.0);
        assert_eq!(f.group(), GroupKey::Unassigned);
        assert!(f.is_active());
        assert_eq!(f.location().lon(), 11.0);
    }

    #[test]
    fn test_iter_active_skips_inactive() {
        let c: FacilityContainer = vec![
            Facility::new(fid(2), "b", GeoPoint::new(0.0, 0.0)),
            Facility::new(fid(1), "a", GeoPoint::new(0.0, 0.0)).with_active(false),
            Facility::new(fid(3), "c", GeoPoint::new(0.0, 0.0))
                .with_group(GroupIdentifier::new(9)),
        ]
        .into_iter()
        .collect();
        let active: Vec<_> = c.iter_active().map(|f| f.id()).collect();
        assert_eq!(active, vec![fid(2), fid(3)]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_toggle_active() {
        let mut c: FacilityContainer =
            std::iter::once(Facility::new(fid(1), "a", GeoPoint::new(0.0, 0.0))).collect();
        c.get_mut(fid(1)).unwrap().set_active(false);
        assert_eq!(c.iter_active().count(), 0);
    }
}
