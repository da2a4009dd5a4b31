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

use crate::common::{Identifier, IdentifierMarkerName};
use std::collections::BTreeMap;
use zone_alloc_core::prelude::{GeoPoint, Ring};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneIdentifierMarker;

impl IdentifierMarkerName for ZoneIdentifierMarker {
    const NAME: &'static str = "ZoneId";
}

pub type ZoneIdentifier = Identifier<u64, ZoneIdentifierMarker>;

pub const DEFAULT_LAYER: &str = "primary";

/// A delivery territory. Geometry is fixed at construction; the demand
/// weight may be edited before a re-run.
#[derive(Debug, Clone)]
pub struct Zone {
    id: ZoneIdentifier,
    name: String,
    ring: Ring<f64>,
    centroid: GeoPoint<f64>,
    demand: f64,
    layer: String,
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Zone {}

impl std::hash::Hash for Zone {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl Zone {
    #[inline]
    pub fn new(id: ZoneIdentifier, name: impl Into<String>, ring: Ring<f64>) -> Self {
        let centroid = ring.centroid();
        Self {
            id,
            name: name.into(),
            ring,
            centroid,
            demand: 1.0,
            layer: DEFAULT_LAYER.to_string(),
        }
    }

    /// Non-positive or non-finite weights fall back to `1.0`.
    #[inline]
    pub fn with_demand(mut self, demand: f64) -> Self {
        self.set_demand(demand);
        self
    }

    #[inline]
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    #[inline]
    pub fn set_demand(&mut self, demand: f64) {
        self.demand = if demand.is_finite() && demand > 0.0 {
            demand
        } else {
            1.0
        };
    }

    #[inline]
    pub fn id(&self) -> ZoneIdentifier {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ring(&self) -> &Ring<f64> {
        &self.ring
    }

    #[inline]
    pub fn centroid(&self) -> GeoPoint<f64> {
        self.centroid
    }

    #[inline]
    pub fn demand(&self) -> f64 {
        self.demand
    }

    #[inline]
    pub fn layer(&self) -> &str {
        &self.layer
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Zone: Id: {}, Name: {}, Centroid: {}, Demand: {}, Layer: {}",
            self.id, self.name, self.centroid, self.demand, self.layer
        )
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Default)]
pub struct ZoneContainer(BTreeMap<ZoneIdentifier, Zone>);

impl ZoneContainer {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, zone: Zone) -> Option<Zone> {
        self.0.insert(zone.id(), zone)
    }

    #[inline]
    pub fn remove(&mut self, id: ZoneIdentifier) -> Option<Zone> {
        self.0.remove(&id)
    }

    #[inline]
    pub fn contains_id(&self, id: ZoneIdentifier) -> bool {
        self.0.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: ZoneIdentifier) -> Option<&Zone> {
        self.0.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ZoneIdentifier) -> Option<&mut Zone> {
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

    /// Zones in ascending id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.0.values()
    }
}

impl FromIterator<Zone> for ZoneContainer {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Zone>>(iter: I) -> Self {
        let mut c = Self::new();
        for z in iter {
            c.insert(z);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn zid(n: u64) -> ZoneIdentifier {
        ZoneIdentifier::new(n)
    }

    fn unit_square() -> Ring<f64> {
        Ring::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.01, 0.0),
            GeoPoint::new(0.01, 0.01),
            GeoPoint::new(0.0, 0.01),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_computes_centroid_and_defaults() {
        let z = Zone::new(zid(1), "North", unit_square());
        assert!((z.centroid().lon() - 0.005).abs() < 1e-12);
        assert!((z.centroid().lat() - 0.005).abs() < 1e-12);
        assert_eq!(z.demand(), 1.0);
        assert_eq!(z.layer(), DEFAULT_LAYER);
    }

    #[test]
    fn test_invalid_demand_falls_back_to_one() {
        let z = Zone::new(zid(1), "a", unit_square()).with_demand(-3.0);
        assert_eq!(z.demand(), 1.0);
        let z = Zone::new(zid(1), "a", unit_square()).with_demand(f64::NAN);
        assert_eq!(z.demand(), 1.0);
        let mut z = Zone::new(zid(1), "a", unit_square()).with_demand(2.5);
        assert_eq!(z.demand(), 2.5);
        z.set_demand(7.0);
        assert_eq!(z.demand(), 7.0);
    }

    #[test]
    fn test_container_iterates_in_id_order() {
        let c: ZoneContainer = [3, 1, 2]
            .into_iter()
            .map(|n| Zone::new(zid(n), format!("z{n}"), unit_square()))
            .collect();
        let ids: Vec<_> = c.iter().map(|z| z.id()).collect();
        assert_eq!(ids, vec![zid(1), zid(2), zid(3)]);
        assert!(c.contains_id(zid(2)));
        assert_eq!(c.len(), 3);
    }
}
