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

//! Distance oracle boundary: the trait an external routing service is
//! reached through, the dense matrix it is assembled into and the chunked
//! client that bounds request size.

pub mod client;
pub mod haversine;
pub mod matrix;
pub mod osrm;

use zone_alloc_core::prelude::GeoPoint;

/// One matrix response in the oracle's native units: meters and seconds,
/// indexed `[source][destination]`. `None` marks an unroutable pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixBlock {
    pub distances_m: Vec<Vec<Option<f64>>>,
    pub durations_s: Option<Vec<Vec<Option<f64>>>>,
}

impl MatrixBlock {
    #[inline]
    pub fn new(distances_m: Vec<Vec<Option<f64>>>) -> Self {
        Self {
            distances_m,
            durations_s: None,
        }
    }

    #[inline]
    pub fn with_durations(mut self, durations_s: Vec<Vec<Option<f64>>>) -> Self {
        self.durations_s = Some(durations_s);
        self
    }

    /// Checks that the block is `sources x destinations` and holds no
    /// negative or non-finite values.
    pub fn validate(&self, sources: usize, destinations: usize) -> Result<(), OracleError> {
        check_shape("distances", &self.distances_m, sources, destinations)?;
        if let Some(d) = &self.durations_s {
            check_shape("durations", d, sources, destinations)?;
        }
        Ok(())
    }
}

fn check_shape(
    what: &'static str,
    rows: &[Vec<Option<f64>>],
    sources: usize,
    destinations: usize,
) -> Result<(), OracleError> {
    if rows.len() != sources || rows.iter().any(|r| r.len() != destinations) {
        return Err(OracleError::Malformed(format!(
            "{what} matrix is not {sources}x{destinations}"
        )));
    }
    if rows
        .iter()
        .flatten()
        .flatten()
        .any(|v| !v.is_finite() || *v < 0.0)
    {
        return Err(OracleError::Malformed(format!(
            "{what} matrix holds a negative or non-finite value"
        )));
    }
    Ok(())
}

/// External routing service returning a distance (and optionally duration)
/// matrix between two coordinate lists.
pub trait DistanceOracle: Sync {
    fn table(
        &self,
        sources: &[GeoPoint<f64>],
        destinations: &[GeoPoint<f64>],
        with_durations: bool,
    ) -> Result<MatrixBlock, OracleError>;
}

impl<O: DistanceOracle + ?Sized> DistanceOracle for &O {
    fn table(
        &self,
        sources: &[GeoPoint<f64>],
        destinations: &[GeoPoint<f64>],
        with_durations: bool,
    ) -> Result<MatrixBlock, OracleError> {
        (**self).table(sources, destinations, with_durations)
    }
}

#[derive(Debug)]
pub enum OracleError {
    Transport(String),
    Status(u16),
    Code { code: String, message: Option<String> },
    Malformed(String),
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleError::Transport(e) => write!(f, "request error: {e}"),
            OracleError::Status(s) => write!(f, "oracle responded with status {s}"),
            OracleError::Code { code, message } => match message {
                Some(m) => write!(f, "oracle returned code {code}: {m}"),
                None => write!(f, "oracle returned code {code}"),
            },
            OracleError::Malformed(e) => write!(f, "malformed oracle payload: {e}"),
        }
    }
}

impl std::error::Error for OracleError {}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => OracleError::Status(status.as_u16()),
            None => OracleError::Transport(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(e: serde_json::Error) -> Self {
        OracleError::Malformed(e.to_string())
    }
}
