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

pub mod err;
pub mod ring;

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 position stored in `(lon, lat)` order, matching the order of
/// boundary rings. Facilities are usually specified as `(lat, lng)`, use
/// [`GeoPoint::from_lat_lng`] for those.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct GeoPoint<F> {
    lon: F,
    lat: F,
}

impl<F: Float> GeoPoint<F> {
    #[inline]
    pub fn new(lon: F, lat: F) -> Self {
        Self { lon, lat }
    }

    #[inline]
    pub fn from_lat_lng(lat: F, lng: F) -> Self {
        Self { lon: lng, lat }
    }

    #[inline]
    pub fn lon(&self) -> F {
        self.lon
    }

    #[inline]
    pub fn lat(&self) -> F {
        self.lat
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Great-circle distance in kilometers.
    #[inline]
    pub fn haversine_km(&self, other: &Self) -> F {
        let radius = F::from(EARTH_RADIUS_KM).unwrap_or_else(F::one);
        let two = F::one() + F::one();

        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / two).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / two).sin().powi(2);
        let c = two * a.sqrt().atan2((F::one() - a).max(F::zero()).sqrt());
        radius * c
    }
}

impl<F: std::fmt::Display> std::fmt::Display for GeoPoint<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}
