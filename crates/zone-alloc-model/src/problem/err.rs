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

use crate::problem::{facility::FacilityIdentifier, loader::RejectedZone, zone::ZoneIdentifier};
use zone_alloc_core::prelude::RingError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MalformedCoordinateError {
    index: usize,
    token: String,
}

impl MalformedCoordinateError {
    pub fn new(index: usize, token: impl Into<String>) -> Self {
        Self {
            index,
            token: token.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Display for MalformedCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Coordinate pair {} is malformed: '{}'",
            self.index, self.token
        )
    }
}

impl std::error::Error for MalformedCoordinateError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultipleRingsError {
    rings: usize,
}

impl MultipleRingsError {
    pub fn new(rings: usize) -> Self {
        Self { rings }
    }

    pub fn rings(&self) -> usize {
        self.rings
    }
}

impl std::fmt::Display for MultipleRingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The boundary holds {} rings; only single-ring polygons are supported",
            self.rings
        )
    }
}

impl std::error::Error for MultipleRingsError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneParseError {
    EmptyBoundary,
    MalformedCoordinate(MalformedCoordinateError),
    MultipleRings(MultipleRingsError),
    Ring(RingError),
}

impl std::fmt::Display for ZoneParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneParseError::EmptyBoundary => write!(f, "The boundary text contains no coordinates"),
            ZoneParseError::MalformedCoordinate(e) => write!(f, "{}", e),
            ZoneParseError::MultipleRings(e) => write!(f, "{}", e),
            ZoneParseError::Ring(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ZoneParseError {}

impl From<MalformedCoordinateError> for ZoneParseError {
    fn from(err: MalformedCoordinateError) -> Self {
        ZoneParseError::MalformedCoordinate(err)
    }
}

impl From<MultipleRingsError> for ZoneParseError {
    fn from(err: MultipleRingsError) -> Self {
        ZoneParseError::MultipleRings(err)
    }
}

impl From<RingError> for ZoneParseError {
    fn from(err: RingError) -> Self {
        ZoneParseError::Ring(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateZoneError {
    id: ZoneIdentifier,
}

impl DuplicateZoneError {
    pub fn new(id: ZoneIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ZoneIdentifier {
        self.id
    }
}

impl std::fmt::Display for DuplicateZoneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zone {} is defined more than once", self.id)
    }
}

impl std::error::Error for DuplicateZoneError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateFacilityError {
    id: FacilityIdentifier,
}

impl DuplicateFacilityError {
    pub fn new(id: FacilityIdentifier) -> Self {
        Self { id }
    }

    pub fn id(&self) -> FacilityIdentifier {
        self.id
    }
}

impl std::fmt::Display for DuplicateFacilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Facility {} is defined more than once", self.id)
    }
}

impl std::error::Error for DuplicateFacilityError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCapacityError {
    id: FacilityIdentifier,
    capacity: f64,
}

impl InvalidCapacityError {
    pub fn new(id: FacilityIdentifier, capacity: f64) -> Self {
        Self { id, capacity }
    }

    pub fn id(&self) -> FacilityIdentifier {
        self.id
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

impl std::fmt::Display for InvalidCapacityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Facility {} has capacity weight {}, expected a positive finite value",
            self.id, self.capacity
        )
    }
}

impl std::error::Error for InvalidCapacityError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ProblemError {
    DuplicateZone(DuplicateZoneError),
    DuplicateFacility(DuplicateFacilityError),
    InvalidCapacity(InvalidCapacityError),
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::DuplicateZone(e) => write!(f, "{}", e),
            ProblemError::DuplicateFacility(e) => write!(f, "{}", e),
            ProblemError::InvalidCapacity(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProblemError {}

impl From<DuplicateZoneError> for ProblemError {
    fn from(err: DuplicateZoneError) -> Self {
        ProblemError::DuplicateZone(err)
    }
}

impl From<DuplicateFacilityError> for ProblemError {
    fn from(err: DuplicateFacilityError) -> Self {
        ProblemError::DuplicateFacility(err)
    }
}

impl From<InvalidCapacityError> for ProblemError {
    fn from(err: InvalidCapacityError) -> Self {
        ProblemError::InvalidCapacity(err)
    }
}

#[derive(Debug)]
pub enum ProblemLoaderError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Problem(ProblemError),
    RejectedZone(RejectedZone),
}

impl From<std::io::Error> for ProblemLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ProblemLoaderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ProblemError> for ProblemLoaderError {
    fn from(e: ProblemError) -> Self {
        Self::Problem(e)
    }
}

impl std::fmt::Display for ProblemLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ProblemLoaderError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            Json(e) => write!(f, "malformed import document: {e}"),
            Problem(e) => write!(f, "problem error: {e}"),
            RejectedZone(r) => write!(f, "zone {} rejected: {}", r.id(), r.error()),
        }
    }
}

impl std::error::Error for ProblemLoaderError {}
