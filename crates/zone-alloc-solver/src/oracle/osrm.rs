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

use crate::oracle::{DistanceOracle, MatrixBlock, OracleError};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use zone_alloc_core::prelude::GeoPoint;

/// Distance oracle backed by an OSRM-compatible `table` service.
#[derive(Debug, Clone)]
pub struct OsrmOracle {
    client: Client,
    base_url: String,
    profile: String,
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: Option<String>,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

impl OsrmOracle {
    pub fn new(base_url: impl Into<String>, profile: impl Into<String>) -> Result<Self, OracleError> {
        Self::with_timeout(base_url, profile, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        profile: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            profile: profile.into(),
        })
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sources come first in the coordinate list, destinations follow.
    pub fn table_url(
        &self,
        sources: &[GeoPoint<f64>],
        destinations: &[GeoPoint<f64>],
        with_durations: bool,
    ) -> String {
        let coords = sources
            .iter()
            .chain(destinations)
            .map(|p| format!("{:.6},{:.6}", p.lon(), p.lat()))
            .collect::<Vec<_>>()
            .join(";");
        let src = (0..sources.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";");
        let dst = (sources.len()..sources.len() + destinations.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";");
        let annotations = if with_durations {
            "distance,duration"
        } else {
            "distance"
        };
        format!(
            "{}/table/v1/{}/{}?sources={}&destinations={}&annotations={}",
            self.base_url, self.profile, coords, src, dst, annotations
        )
    }
}

/// Decodes a `table` payload. A missing or non-`Ok` code is a failure, as is
/// a missing distance matrix.
pub fn parse_table_response(body: &str, with_durations: bool) -> Result<MatrixBlock, OracleError> {
    let resp: TableResponse = serde_json::from_str(body)?;
    match resp.code.as_deref() {
        Some("Ok") => {}
        Some(code) => {
            return Err(OracleError::Code {
                code: code.to_string(),
                message: resp.message,
            });
        }
        None => return Err(OracleError::Malformed("missing code field".to_string())),
    }
    let distances = resp
        .distances
        .ok_or_else(|| OracleError::Malformed("missing distances".to_string()))?;
    let block = MatrixBlock::new(distances);
    match (with_durations, resp.durations) {
        (true, Some(d)) => Ok(block.with_durations(d)),
        (true, None) => Err(OracleError::Malformed("missing durations".to_string())),
        (false, _) => Ok(block),
    }
}

impl DistanceOracle for OsrmOracle {
    fn table(
        &self,
        sources: &[GeoPoint<f64>],
        destinations: &[GeoPoint<f64>],
        with_durations: bool,
    ) -> Result<MatrixBlock, OracleError> {
        let url = self.table_url(sources, destinations, with_durations);
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(OracleError::Status(response.status().as_u16()));
        }
        let body = response.text()?;
        parse_table_response(&body, with_durations)
    }
}
