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

use crate::geo::{
    GeoPoint,
    err::{NonFiniteCoordinateError, RingError, TooFewPointsError},
};
use num_traits::Float;

/// A closed polygon ring. The first vertex is always repeated as the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring<F> {
    vertices: Vec<GeoPoint<F>>,
}

impl<F: Float> Ring<F> {
    /// Builds a ring from an ordered vertex list, appending the first vertex
    /// when the input is open.
    pub fn new(mut vertices: Vec<GeoPoint<F>>) -> Result<Self, RingError> {
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(NonFiniteCoordinateError::new(index))?;
        }

        let distinct = count_distinct_up_to(&vertices, 3);
        if distinct < 3 {
            return Err(TooFewPointsError::new(distinct))?;
        }

        if vertices.first() != vertices.last() {
            let first = vertices[0];
            vertices.push(first);
        }

        Ok(Self { vertices })
    }

    /// All vertices including the closing one.
    #[inline]
    pub fn vertices(&self) -> &[GeoPoint<F>] {
        &self.vertices
    }

    /// Vertices without the closing duplicate.
    #[inline]
    pub fn open_vertices(&self) -> &[GeoPoint<F>] {
        &self.vertices[..self.vertices.len() - 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.vertices.first() == self.vertices.last()
    }

    /// Planar shoelace area in squared degrees. Positive for counter-clockwise rings.
    pub fn signed_area(&self) -> F {
        let origin = self.vertices[0];
        let two = F::one() + F::one();
        let mut acc = F::zero();
        for w in self.vertices.windows(2) {
            let (x0, y0) = (w[0].lon() - origin.lon(), w[0].lat() - origin.lat());
            let (x1, y1) = (w[1].lon() - origin.lon(), w[1].lat() - origin.lat());
            acc = acc + (x0 * y1 - x1 * y0);
        }
        acc / two
    }

    /// Area-weighted centroid. Degenerate (zero-area) rings fall back to the
    /// mean of their distinct vertices, which still lies on the ring.
    pub fn centroid(&self) -> GeoPoint<F> {
        let origin = self.vertices[0];
        let mut twice_area = F::zero();
        let mut cx = F::zero();
        let mut cy = F::zero();

        for w in self.vertices.windows(2) {
            let (x0, y0) = (w[0].lon() - origin.lon(), w[0].lat() - origin.lat());
            let (x1, y1) = (w[1].lon() - origin.lon(), w[1].lat() - origin.lat());
            let cross = x0 * y1 - x1 * y0;
            twice_area = twice_area + cross;
            cx = cx + (x0 + x1) * cross;
            cy = cy + (y0 + y1) * cross;
        }

        if twice_area.abs() <= F::epsilon() * self.extent_sq() {
            return self.vertex_mean();
        }

        let three = F::one() + F::one() + F::one();
        let denom = three * twice_area;
        GeoPoint::new(origin.lon() + cx / denom, origin.lat() + cy / denom)
    }

    /// The ring vertex closest to `p` by great-circle distance, with that distance in km.
    pub fn nearest_vertex(&self, p: &GeoPoint<F>) -> (GeoPoint<F>, F) {
        self.extreme_vertex(p, |candidate, best| candidate < best)
    }

    /// The ring vertex farthest from `p` by great-circle distance, with that distance in km.
    pub fn farthest_vertex(&self, p: &GeoPoint<F>) -> (GeoPoint<F>, F) {
        self.extreme_vertex(p, |candidate, best| candidate > best)
    }

    fn extreme_vertex<C>(&self, p: &GeoPoint<F>, better: C) -> (GeoPoint<F>, F)
    where
        C: Fn(F, F) -> bool,
    {
        let verts = self.open_vertices();
        let mut best = verts[0];
        let mut best_d = p.haversine_km(&best);
        for v in &verts[1..] {
            let d = p.haversine_km(v);
            if better(d, best_d) {
                best = *v;
                best_d = d;
            }
        }
        (best, best_d)
    }

    fn vertex_mean(&self) -> GeoPoint<F> {
        let verts = self.open_vertices();
        let n = F::from(verts.len()).unwrap_or_else(F::one);
        let (sx, sy) = verts.iter().fold((F::zero(), F::zero()), |(sx, sy), v| {
            (sx + v.lon(), sy + v.lat())
        });
        GeoPoint::new(sx / n, sy / n)
    }

    fn extent_sq(&self) -> F {
        let (mut min_x, mut max_x) = (F::infinity(), F::neg_infinity());
        let (mut min_y, mut max_y) = (F::infinity(), F::neg_infinity());
        for v in &self.vertices {
            min_x = min_x.min(v.lon());
            max_x = max_x.max(v.lon());
            min_y = min_y.min(v.lat());
            max_y = max_y.max(v.lat());
        }
        let dx = max_x - min_x;
        let dy = max_y - min_y;
        dx * dx + dy * dy
    }
}

fn count_distinct_up_to<F: Float>(vertices: &[GeoPoint<F>], limit: usize) -> usize {
    let mut seen: Vec<GeoPoint<F>> = Vec::with_capacity(limit);
    for v in vertices {
        if !seen.contains(v) {
            seen.push(*v);
            if seen.len() >= limit {
                break;
            }
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn pt(lon: f64, lat: f64) -> GeoPoint<f64> {
        GeoPoint::new(lon, lat)
    }

    fn square(side: f64) -> Vec<GeoPoint<f64>> {
        vec![pt(0.0, 0.0), pt(side, 0.0), pt(side, side), pt(0.0, side)]
    }

    #[test]
    fn test_open_ring_gets_closed() {
        let r = Ring::new(square(1.0)).unwrap();
        assert!(r.is_closed());
        assert_eq!(r.len(), 5);
        assert_eq!(r.open_vertices().len(), 4);
    }

    #[test]
    fn test_closed_ring_is_kept_as_is() {
        let mut v = square(1.0);
        v.push(pt(0.0, 0.0));
        let r = Ring::new(v).unwrap();
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn test_too_few_distinct_points_rejected() {
        let err = Ring::new(vec![pt(0.0, 0.0), pt(1.0, 1.0), pt(0.0, 0.0)]).unwrap_err();
        assert_eq!(err, RingError::TooFewPoints(TooFewPointsError::new(2)));
    }

    #[test]
    fn test_non_finite_vertex_rejected() {
        let err = Ring::new(vec![pt(0.0, 0.0), pt(f64::NAN, 1.0), pt(1.0, 0.0)]).unwrap_err();
        assert_eq!(
            err,
            RingError::NonFiniteCoordinate(NonFiniteCoordinateError::new(1))
        );
    }

    #[test]
    fn test_square_centroid_and_area() {
        let r = Ring::new(square(2.0)).unwrap();
        assert!((r.signed_area() - 4.0).abs() < 1e-12);
        let c = r.centroid();
        assert!((c.lon() - 1.0).abs() < 1e-12);
        assert!((c.lat() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clockwise_ring_has_same_centroid() {
        let mut v = square(2.0);
        v.reverse();
        let r = Ring::new(v).unwrap();
        assert!(r.signed_area() < 0.0);
        let c = r.centroid();
        assert!((c.lon() - 1.0).abs() < 1e-12);
        assert!((c.lat() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_is_area_weighted_not_vertex_mean() {
        // An L-shape with many vertices bunched on one arm.
        let v = vec![
            pt(0.0, 0.0),
            pt(4.0, 0.0),
            pt(4.0, 1.0),
            pt(1.0, 1.0),
            pt(1.0, 4.0),
            pt(0.9, 4.0),
            pt(0.5, 4.0),
            pt(0.0, 4.0),
        ];
        let r = Ring::new(v.clone()).unwrap();
        let c = r.centroid();
        // Two rectangles of area 4 and 3: centroid at ((2*4 + 0.5*3)/7, (0.5*4 + 2.5*3)/7).
        assert!((c.lon() - 9.5 / 7.0).abs() < 1e-9);
        assert!((c.lat() - 9.5 / 7.0).abs() < 1e-9);

        let mean_lat = v.iter().map(|p| p.lat()).sum::<f64>() / v.len() as f64;
        assert!((mean_lat - c.lat()).abs() > 0.5);
    }

    #[test]
    fn test_degenerate_ring_falls_back_to_vertex_mean() {
        let r = Ring::new(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(2.0, 0.0)]).unwrap();
        let c = r.centroid();
        assert!((c.lon() - 1.0).abs() < 1e-12);
        assert!(c.lat().abs() < 1e-12);
    }

    #[test]
    fn test_nearest_and_farthest_vertex() {
        let r = Ring::new(square(0.01)).unwrap();
        let p = pt(-0.01, 0.0);
        let (near, dn) = r.nearest_vertex(&p);
        let (far, df) = r.farthest_vertex(&p);
        assert_eq!(near, pt(0.0, 0.0));
        assert_eq!(far, pt(0.01, 0.01));
        assert!(dn < df);
    }
}
