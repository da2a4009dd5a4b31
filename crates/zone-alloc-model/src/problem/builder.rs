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
    err::{DuplicateFacilityError, DuplicateZoneError, InvalidCapacityError, ProblemError},
    facility::{Facility, FacilityContainer},
    prob::Problem,
    zone::{Zone, ZoneContainer},
};

#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    zones: Vec<Zone>,
    facilities: Vec<Facility>,
}

impl ProblemBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacities(zones: usize, facilities: usize) -> Self {
        Self {
            zones: Vec::with_capacity(zones),
            facilities: Vec::with_capacity(facilities),
        }
    }

    #[inline]
    pub fn with_zones<I>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = Zone>,
    {
        self.zones.clear();
        self.zones.extend(zones);
        self
    }

    #[inline]
    pub fn with_facilities<I>(mut self, facilities: I) -> Self
    where
        I: IntoIterator<Item = Facility>,
    {
        self.facilities.clear();
        self.facilities.extend(facilities);
        self
    }

    #[inline]
    pub fn add_zone(&mut self, zone: Zone) -> &mut Self {
        self.zones.push(zone);
        self
    }

    #[inline]
    pub fn extend_zones<I>(&mut self, zones: I) -> &mut Self
    where
        I: IntoIterator<Item = Zone>,
    {
        self.zones.extend(zones);
        self
    }

    #[inline]
    pub fn add_facility(&mut self, facility: Facility) -> &mut Self {
        self.facilities.push(facility);
        self
    }

    #[inline]
    pub fn extend_facilities<I>(&mut self, facilities: I) -> &mut Self
    where
        I: IntoIterator<Item = Facility>,
    {
        self.facilities.extend(facilities);
        self
    }

    pub fn build(self) -> Result<Problem, ProblemError> {
        let mut zones = ZoneContainer::new();
        for z in self.zones {
            let id = z.id();
            if zones.insert(z).is_some() {
                return Err(DuplicateZoneError::new(id))?;
            }
        }

        let mut facilities = FacilityContainer::new();
        for f in self.facilities {
            let id = f.id();
            let capacity = f.capacity();
            if !capacity.is_finite() || capacity <= 0.0 {
                return Err(InvalidCapacityError::new(id, capacity))?;
            }
            if facilities.insert(f).is_some() {
                return Err(DuplicateFacilityError::new(id))?;
            }
        }

        Ok(Problem::new(zones, facilities))
    }
}
