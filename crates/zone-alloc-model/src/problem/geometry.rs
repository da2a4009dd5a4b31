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

use crate::problem::err::{MalformedCoordinateError, MultipleRingsError, ZoneParseError};
use zone_alloc_core::prelude::{GeoPoint, Ring};

/// Parses boundary text such as `POLYGON((11.5 48.1, 11.6 48.1, 11.6 48.2))`
/// into a closed ring. Pairs are comma separated and in `lon lat` order; the
/// geometry-type wrapper and any parentheses are ignored. Open rings are closed.
///
/// Polygons with holes and multi-part polygons are rejected with
/// [`ZoneParseError::MultipleRings`].
pub fn parse_boundary(text: &str) -> Result<Ring<f64>, ZoneParseError> {
    let rings = ring_count(text);
    if rings > 1 {
        return Err(MultipleRingsError::new(rings))?;
    }
    let body: String = text
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect();

    let mut vertices = Vec::new();
    for (index, token) in body
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .enumerate()
    {
        vertices.push(parse_pair(index, token)?);
    }

    if vertices.is_empty() {
        return Err(ZoneParseError::EmptyBoundary);
    }

    Ok(Ring::new(vertices)?)
}

fn parse_pair(index: usize, token: &str) -> Result<GeoPoint<f64>, MalformedCoordinateError> {
    let malformed = || MalformedCoordinateError::new(index, token);
    let mut parts = token.split_whitespace();
    let lon = parts.next().ok_or_else(malformed)?;
    let lat = parts.next().ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }
    let lon: f64 = lon.parse().map_err(|_| malformed())?;
    let lat: f64 = lat.parse().map_err(|_| malformed())?;
    Ok(GeoPoint::new(lon, lat))
}

/// Parses a raw demand cell. A trailing `%` is stripped; the result must be a
/// positive finite number, otherwise `None`.
pub fn try_parse_demand(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let numeric = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    numeric
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Like [`try_parse_demand`] but blank or unparsable input yields the default weight `1.0`.
#[inline]
pub fn parse_demand(raw: &str) -> f64 {
    try_parse_demand(raw).unwrap_or(1.0)
}

/// Rings are separated by `),(`, whatever whitespace sits between them.
fn ring_count(text: &str) -> usize {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.matches("),(").count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_alloc_core::prelude::{RingError, TooFewPointsError};

    #[test]
    fn test_parses_wkt_polygon_and_closes_ring() {
        let r = parse_boundary("POLYGON((0 0, 1 0, 1 1, 0 1))").unwrap();
        assert!(r.is_closed());
        assert_eq!(r.len(), 5);
        assert_eq!(r.vertices()[1], GeoPoint::new(1.0, 0.0));
    }

    #[test]
    fn test_parses_bare_pairs_with_spacing_noise() {
        let r = parse_boundary("  11.5 48.1 ,11.6   48.1, 11.6 48.2 , 11.5 48.1,").unwrap();
        assert_eq!(r.len(), 4);
        assert_eq!(r.vertices()[0], GeoPoint::new(11.5, 48.1));
    }

    #[test]
    fn test_multipolygon_wrapper_is_stripped() {
        let r = parse_boundary("MULTIPOLYGON (((0 0, 2 0, 2 2, 0 2, 0 0)))").unwrap();
        assert_eq!(r.len(), 5);
        let c = r.centroid();
        assert!((c.lon() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_with_hole_is_rejected() {
        let err = parse_boundary("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 2 1, 2 2, 1 1))").unwrap_err();
        assert_eq!(err, ZoneParseError::MultipleRings(MultipleRingsError::new(2)));
    }

    #[test]
    fn test_multipart_multipolygon_is_rejected() {
        let err = parse_boundary(
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)), ((8 8, 9 8, 9 9, 8 8)))",
        )
        .unwrap_err();
        assert_eq!(err, ZoneParseError::MultipleRings(MultipleRingsError::new(3)));
    }

    #[test]
    fn test_malformed_number_reports_pair_index() {
        let err = parse_boundary("POLYGON((0 0, 1 x, 1 1))").unwrap_err();
        assert_eq!(
            err,
            ZoneParseError::MalformedCoordinate(MalformedCoordinateError::new(1, "1 x"))
        );
    }

    #[test]
    fn test_pair_with_three_numbers_is_malformed() {
        assert!(matches!(
            parse_boundary("0 0 5, 1 0, 1 1"),
            Err(ZoneParseError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn test_empty_boundary() {
        assert_eq!(parse_boundary("POLYGON(())"), Err(ZoneParseError::EmptyBoundary));
        assert_eq!(parse_boundary(""), Err(ZoneParseError::EmptyBoundary));
    }

    #[test]
    fn test_too_few_distinct_points() {
        let err = parse_boundary("0 0, 1 1, 0 0").unwrap_err();
        assert_eq!(
            err,
            ZoneParseError::Ring(RingError::TooFewPoints(TooFewPointsError::new(2)))
        );
    }

    #[test]
    fn test_demand_parsing() {
        assert_eq!(parse_demand("12"), 12.0);
        assert_eq!(parse_demand("12.5%"), 12.5);
        assert_eq!(parse_demand(" 40 % "), 40.0);
        assert_eq!(parse_demand(""), 1.0);
        assert_eq!(parse_demand("n/a"), 1.0);
        assert_eq!(parse_demand("0"), 1.0);
        assert_eq!(parse_demand("-5"), 1.0);
        assert_eq!(try_parse_demand("abc"), None);
    }
}
