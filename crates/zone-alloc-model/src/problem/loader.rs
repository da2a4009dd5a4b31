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
    problem::{
        builder::ProblemBuilder,
        err::{ProblemLoaderError, ZoneParseError},
        facility::{Facility, FacilityIdentifier},
        geometry::{parse_boundary, try_parse_demand},
        group::GroupIdentifier,
        prob::Problem,
        zone::{DEFAULT_LAYER, Zone, ZoneIdentifier},
    },
    solution::overrides::{Override, OverrideSet},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use zone_alloc_core::prelude::GeoPoint;

/// Demand cells arrive either as numbers or as text such as `"12%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDemand {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: ZoneIdentifier,
    #[serde(default)]
    pub name: String,
    pub boundary: String,
    #[serde(default)]
    pub demand: Option<RawDemand>,
    #[serde(default)]
    pub layer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub id: FacilityIdentifier,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub group: Option<GroupIdentifier>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub zones: Vec<ZoneRecord>,
    #[serde(default)]
    pub facilities: Vec<FacilityRecord>,
    #[serde(default)]
    pub overrides: Vec<Override>,
}

/// A zone that could not be preprocessed and was left out of the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedZone {
    id: ZoneIdentifier,
    name: String,
    error: ZoneParseError,
}

impl RejectedZone {
    pub fn new(id: ZoneIdentifier, name: impl Into<String>, error: ZoneParseError) -> Self {
        Self {
            id,
            name: name.into(),
            error,
        }
    }

    pub fn id(&self) -> ZoneIdentifier {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error(&self) -> &ZoneParseError {
        &self.error
    }
}

/// Result of an import: the validated problem, the manual overrides that
/// travelled with it and the zones that were dropped.
#[derive(Debug, Clone)]
pub struct Import {
    pub problem: Problem,
    pub overrides: OverrideSet,
    pub rejected: Vec<RejectedZone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemLoader {
    fail_on_rejected_zone: bool,
}

impl Default for ProblemLoader {
    fn default() -> Self {
        Self {
            fail_on_rejected_zone: false,
        }
    }
}

impl ProblemLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, the first malformed zone aborts the import instead of being skipped.
    #[inline]
    pub fn fail_on_rejected_zone(mut self, yes: bool) -> Self {
        self.fail_on_rejected_zone = yes;
        self
    }

    pub fn from_document(&self, doc: ImportDocument) -> Result<Import, ProblemLoaderError> {
        let mut builder =
            ProblemBuilder::with_capacities(doc.zones.len(), doc.facilities.len());
        let mut rejected = Vec::new();

        for rec in doc.zones {
            match zone_from_record(&rec) {
                Ok(zone) => {
                    builder.add_zone(zone);
                }
                Err(error) => {
                    let rz = RejectedZone::new(rec.id, rec.name, error);
                    if self.fail_on_rejected_zone {
                        return Err(ProblemLoaderError::RejectedZone(rz));
                    }
                    tracing::warn!("Dropping zone {}: {}", rz.id(), rz.error());
                    rejected.push(rz);
                }
            }
        }

        for rec in doc.facilities {
            builder.add_facility(facility_from_record(&rec));
        }

        let problem = builder.build()?;
        let overrides = doc.overrides.into_iter().collect::<OverrideSet>();

        tracing::debug!(
            "Imported {} zones ({} rejected), {} facilities, {} overrides",
            problem.zones().len(),
            rejected.len(),
            problem.facilities().len(),
            overrides.len()
        );

        Ok(Import {
            problem,
            overrides,
            rejected,
        })
    }

    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Import, ProblemLoaderError> {
        let doc: ImportDocument = serde_json::from_reader(BufReader::new(r))?;
        self.from_document(doc)
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<Import, ProblemLoaderError> {
        let file = File::open(path).map_err(ProblemLoaderError::Io)?;
        self.from_reader(file)
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Import, ProblemLoaderError> {
        let doc: ImportDocument = serde_json::from_str(s)?;
        self.from_document(doc)
    }
}

fn zone_from_record(rec: &ZoneRecord) -> Result<Zone, ZoneParseError> {
    let ring = parse_boundary(&rec.boundary)?;
    let demand = match &rec.demand {
        None => 1.0,
        Some(RawDemand::Number(v)) if v.is_finite() && *v > 0.0 => *v,
        Some(RawDemand::Number(v)) => {
            tracing::debug!("Zone {}: demand {} is not positive, using 1", rec.id, v);
            1.0
        }
        Some(RawDemand::Text(s)) => try_parse_demand(s).unwrap_or_else(|| {
            if !s.trim().is_empty() {
                tracing::debug!("Zone {}: unparsable demand '{}', using 1", rec.id, s);
            }
            1.0
        }),
    };
    let layer = rec
        .layer
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(DEFAULT_LAYER);

    Ok(Zone::new(rec.id, rec.name.clone(), ring)
        .with_demand(demand)
        .with_layer(layer))
}

fn facility_from_record(rec: &FacilityRecord) -> Facility {
    Facility::new(rec.id, rec.name.clone(), GeoPoint::from_lat_lng(rec.lat, rec.lng))
        .with_capacity(rec.capacity.unwrap_or(1.0))
        .with_group(rec.group)
        .with_active(rec.active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{err::ProblemError, group::GroupKey};

    const SMALL_OK: &str = r#"
    {
        "zones": [
            { "id": 1, "name": "Center", "boundary": "POLYGON((0 0, 0.01 0, 0.01 0.01, 0 0.01))", "demand": "25%" },
            { "id": 2, "name": "Broken", "boundary": "POLYGON((0 0, 1 1))" },
            { "id": 3, "name": "East", "boundary": "0.02 0, 0.03 0, 0.03 0.01", "demand": 4, "layer": "secondary" },
            { "id": 4, "name": "Blank", "boundary": "0 0, 1 0, 1 1", "demand": "" }
        ],
        "facilities": [
            { "id": 10, "name": "Hub A", "lat": 0.005, "lng": 0.0, "group": 7 },
            { "id": 11, "name": "Hub B", "lat": 0.0, "lng": 0.04, "capacity": 2.5, "active": false }
        ],
        "overrides": [
            { "zone": 1, "group": 7, "facility": 11 }
        ]
    }
    "#;

    #[test]
    fn test_loads_and_drops_malformed_zone() {
        let import = ProblemLoader::new().from_str(SMALL_OK).unwrap();
        let p = &import.problem;
        assert_eq!(p.zones().len(), 3);
        assert_eq!(import.rejected.len(), 1);
        assert_eq!(import.rejected[0].id(), ZoneIdentifier::new(2));
        assert_eq!(import.rejected[0].name(), "Broken");
        assert_eq!(import.overrides.len(), 1);
    }

    #[test]
    fn test_demand_and_layer_mapping() {
        let import = ProblemLoader::new().from_str(SMALL_OK).unwrap();
        let zones = import.problem.zones();
        assert_eq!(zones.get(ZoneIdentifier::new(1)).unwrap().demand(), 25.0);
        assert_eq!(zones.get(ZoneIdentifier::new(3)).unwrap().demand(), 4.0);
        assert_eq!(zones.get(ZoneIdentifier::new(3)).unwrap().layer(), "secondary");
        assert_eq!(zones.get(ZoneIdentifier::new(4)).unwrap().demand(), 1.0);
        assert_eq!(zones.get(ZoneIdentifier::new(4)).unwrap().layer(), DEFAULT_LAYER);
    }

    #[test]
    fn test_facility_mapping() {
        let import = ProblemLoader::new().from_str(SMALL_OK).unwrap();
        let facilities = import.problem.facilities();
        let a = facilities.get(FacilityIdentifier::new(10)).unwrap();
        assert_eq!(a.group(), GroupKey::Group(GroupIdentifier::new(7)));
        assert!(a.is_active());
        assert_eq!(a.location().lat(), 0.005);
        let b = facilities.get(FacilityIdentifier::new(11)).unwrap();
        assert_eq!(b.group(), GroupKey::Unassigned);
        assert_eq!(b.capacity(), 2.5);
        assert!(!b.is_active());
    }

    #[test]
    fn test_fail_on_rejected_zone() {
        let err = ProblemLoader::new()
            .fail_on_rejected_zone(true)
            .from_str(SMALL_OK)
            .unwrap_err();
        assert!(matches!(err, ProblemLoaderError::RejectedZone(ref r) if r.id() == ZoneIdentifier::new(2)));
    }

    #[test]
    fn test_zone_with_hole_is_rejected() {
        let doc = r#"{ "zones": [
            { "id": 1, "name": "Ok", "boundary": "0 0, 1 0, 1 1" },
            { "id": 2, "name": "Donut", "boundary": "POLYGON((0 0, 4 0, 4 4, 0 4, 0 0),(1 1, 2 1, 2 2, 1 1))" }
        ] }"#;
        let import = ProblemLoader::new().from_str(doc).unwrap();
        assert_eq!(import.problem.zones().len(), 1);
        assert_eq!(import.rejected.len(), 1);
        assert_eq!(import.rejected[0].id(), ZoneIdentifier::new(2));
        assert!(matches!(import.rejected[0].error(), ZoneParseError::MultipleRings(e) if e.rings() == 2));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = ProblemLoader::new().from_str("{ not json").unwrap_err();
        assert!(matches!(err, ProblemLoaderError::Json(_)));
    }

    #[test]
    fn test_invalid_capacity_is_a_problem_error() {
        let doc = r#"{ "facilities": [ { "id": 1, "lat": 0, "lng": 0, "capacity": -1 } ] }"#;
        let err = ProblemLoader::new().from_str(doc).unwrap_err();
        assert!(matches!(
            err,
            ProblemLoaderError::Problem(ProblemError::InvalidCapacity(_))
        ));
    }
}
