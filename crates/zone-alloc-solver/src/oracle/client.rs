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
    cancel::CancellationToken,
    config::OracleConfig,
    err::OracleUnavailableError,
    oracle::{DistanceOracle, MatrixBlock, OracleError, matrix::DistanceMatrix},
};
use rayon::prelude::*;
use zone_alloc_core::prelude::GeoPoint;
use zone_alloc_model::prelude::{FacilityIdentifier, ZoneIdentifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// Every chunk arrived.
    Complete,
    /// Some chunks failed or were skipped after repeated failures.
    Partial,
    /// The caller stopped the fetch at a chunk boundary.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MatrixFetch {
    pub matrix: DistanceMatrix,
    pub status: FetchStatus,
    pub failed_chunks: usize,
    pub skipped_chunks: usize,
}

/// Splits the destinations into bounded chunks, one matrix request each,
/// with every facility as a source.
pub struct ChunkedMatrixClient<'o, O: DistanceOracle> {
    oracle: &'o O,
    config: OracleConfig,
    with_durations: bool,
}

impl<'o, O: DistanceOracle> ChunkedMatrixClient<'o, O> {
    #[inline]
    pub fn new(oracle: &'o O, config: OracleConfig) -> Self {
        Self {
            oracle,
            config,
            with_durations: false,
        }
    }

    #[inline]
    pub fn with_durations(mut self, yes: bool) -> Self {
        self.with_durations = yes;
        self
    }

    #[tracing::instrument(level = "debug", name = "Matrix Fetch", skip_all, fields(sources = facilities.len(), destinations = zones.len()))]
    pub fn fetch(
        &self,
        facilities: &[(FacilityIdentifier, GeoPoint<f64>)],
        zones: &[(ZoneIdentifier, GeoPoint<f64>)],
        cancel: &CancellationToken,
    ) -> Result<MatrixFetch, OracleUnavailableError> {
        let mut matrix = DistanceMatrix::new(
            facilities.iter().map(|(id, _)| *id).collect(),
            zones.iter().map(|(id, _)| *id).collect(),
            self.with_durations,
        );

        if facilities.is_empty() || zones.is_empty() {
            matrix.mark_all_resolved();
            return Ok(MatrixFetch {
                matrix,
                status: FetchStatus::Complete,
                failed_chunks: 0,
                skipped_chunks: 0,
            });
        }

        let sources: Vec<GeoPoint<f64>> = facilities.iter().map(|(_, p)| *p).collect();
        let chunk_size = self.config.chunk_size.max(1);
        let chunks: Vec<(usize, Vec<GeoPoint<f64>>)> = zones
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, c)| (i * chunk_size, c.iter().map(|(_, p)| *p).collect()))
            .collect();

        let pool = self.build_pool();

        let mut status = FetchStatus::Complete;
        let mut attempted = 0usize;
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut consecutive = 0usize;
        let mut last_error: Option<OracleError> = None;
        let wave_size = self.config.max_in_flight.max(1);

        for wave in chunks.chunks(wave_size) {
            if cancel.is_cancelled() {
                tracing::debug!("Matrix fetch cancelled after {} chunks", attempted);
                status = FetchStatus::Cancelled;
                break;
            }
            if consecutive >= self.config.max_consecutive_failures {
                tracing::warn!(
                    "{} consecutive chunk failures; skipping the remaining {} chunks",
                    consecutive,
                    chunks.len() - attempted
                );
                status = FetchStatus::Partial;
                break;
            }

            let request = |(offset, dests): &(usize, Vec<GeoPoint<f64>>)| {
                let res = self
                    .oracle
                    .table(&sources, dests, self.with_durations)
                    .and_then(|block| block.validate(sources.len(), dests.len()).map(|_| block));
                (*offset, res)
            };

            let results: Vec<(usize, Result<MatrixBlock, OracleError>)> = match &pool {
                Some(pool) if wave.len() > 1 => pool.install(|| wave.par_iter().map(request).collect()),
                _ => wave.iter().map(request).collect(),
            };

            for (offset, res) in results {
                attempted += 1;
                match res {
                    Ok(block) => {
                        matrix.fill_block(offset, &block);
                        succeeded += 1;
                        consecutive = 0;
                        tracing::trace!("Chunk at zone offset {} resolved", offset);
                    }
                    Err(e) => {
                        tracing::warn!("Matrix chunk at zone offset {} failed: {}", offset, e);
                        failed += 1;
                        consecutive += 1;
                        last_error = Some(e);
                    }
                }
            }
        }

        // A cancelled fetch reports its untouched zones as unresolved, even
        // when every chunk it did attempt failed.
        if succeeded == 0 && status != FetchStatus::Cancelled {
            if let Some(last_error) = last_error {
                return Err(OracleUnavailableError::new(attempted, last_error));
            }
        }

        if failed > 0 && status == FetchStatus::Complete {
            status = FetchStatus::Partial;
        }

        tracing::debug!(
            "Matrix fetch finished: {}/{} chunks resolved, {} failed, status {:?}",
            succeeded,
            chunks.len(),
            failed,
            status
        );

        Ok(MatrixFetch {
            matrix,
            status,
            failed_chunks: failed,
            skipped_chunks: chunks.len() - attempted,
        })
    }

    fn build_pool(&self) -> Option<rayon::ThreadPool> {
        if self.config.max_in_flight <= 1 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_in_flight)
            .thread_name(|i| format!("zone-alloc-oracle-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!("Falling back to sequential matrix requests: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[inline]
    fn zid(n: u64) -> ZoneIdentifier {
        ZoneIdentifier::new(n)
    }
    #[inline]
    fn fid(n: u64) -> FacilityIdentifier {
        FacilityIdentifier::new(n)
    }

    /// Encodes the destination longitude as the distance in meters, and fails
    /// on the call numbers listed in `fail_calls`.
    struct ScriptedOracle {
        calls: AtomicUsize,
        fail_calls: Vec<usize>,
        seen_sizes: Mutex<Vec<usize>>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl ScriptedOracle {
        fn new(fail_calls: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_calls,
                seen_sizes: Mutex::new(Vec::new()),
                cancel_after: None,
            }
        }
    }

    impl DistanceOracle for ScriptedOracle {
        fn table(
            &self,
            sources: &[GeoPoint<f64>],
            destinations: &[GeoPoint<f64>],
            _with_durations: bool,
        ) -> Result<MatrixBlock, OracleError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_sizes.lock().unwrap().push(destinations.len());
            if let Some((n, token)) = &self.cancel_after {
                if call + 1 >= *n {
                    token.cancel();
                }
            }
            if self.fail_calls.contains(&call) {
                return Err(OracleError::Status(503));
            }
            Ok(MatrixBlock::new(
                sources
                    .iter()
                    .map(|_| destinations.iter().map(|d| Some(d.lon())).collect())
                    .collect(),
            ))
        }
    }

    fn inputs(n_zones: u64) -> (Vec<(FacilityIdentifier, GeoPoint<f64>)>, Vec<(ZoneIdentifier, GeoPoint<f64>)>) {
        let facilities = vec![(fid(1), GeoPoint::new(0.0, 0.0)), (fid(2), GeoPoint::new(0.0, 0.0))];
        let zones = (0..n_zones)
            .map(|i| (zid(i), GeoPoint::new(1000.0 * (i as f64 + 1.0), 0.0)))
            .collect();
        (facilities, zones)
    }

    fn config(chunk_size: usize) -> OracleConfig {
        OracleConfig {
            chunk_size,
            ..OracleConfig::default()
        }
    }

    #[test]
    fn test_chunks_are_bounded_and_assembled() {
        let oracle = ScriptedOracle::new(vec![]);
        let (f, z) = inputs(7);
        let fetch = ChunkedMatrixClient::new(&oracle, config(3))
            .fetch(&f, &z, &CancellationToken::new())
            .unwrap();

        assert_eq!(*oracle.seen_sizes.lock().unwrap(), vec![3, 3, 1]);
        assert_eq!(fetch.status, FetchStatus::Complete);
        assert_eq!(fetch.matrix.resolved_count(), 7);
        for i in 0..7 {
            assert_eq!(fetch.matrix.distance_km(1, i), Some(i as f64 + 1.0));
        }
    }

    #[test]
    fn test_failed_chunk_leaves_only_its_zones_unresolved() {
        let oracle = ScriptedOracle::new(vec![1]);
        let (f, z) = inputs(7);
        let fetch = ChunkedMatrixClient::new(&oracle, config(3))
            .fetch(&f, &z, &CancellationToken::new())
            .unwrap();

        assert_eq!(fetch.status, FetchStatus::Partial);
        assert_eq!(fetch.failed_chunks, 1);
        assert_eq!(fetch.matrix.unresolved_zones(), vec![zid(3), zid(4), zid(5)]);
        assert_eq!(fetch.matrix.distance_km(0, 6), Some(7.0));
    }

    #[test]
    fn test_all_chunks_failing_is_a_hard_error() {
        let oracle = ScriptedOracle::new(vec![0, 1, 2]);
        let (f, z) = inputs(7);
        let err = ChunkedMatrixClient::new(&oracle, config(3))
            .fetch(&f, &z, &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.attempted_chunks(), 3);
        assert!(matches!(err.last_error(), OracleError::Status(503)));
    }

    #[test]
    fn test_repeated_failures_abort_remaining_chunks() {
        let oracle = ScriptedOracle::new(vec![1, 2]);
        let (f, z) = inputs(10);
        let cfg = OracleConfig {
            chunk_size: 2,
            max_consecutive_failures: 2,
            ..OracleConfig::default()
        };
        let fetch = ChunkedMatrixClient::new(&oracle, cfg)
            .fetch(&f, &z, &CancellationToken::new())
            .unwrap();
        assert_eq!(fetch.status, FetchStatus::Partial);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 3);
        assert_eq!(fetch.skipped_chunks, 2);
        assert_eq!(fetch.matrix.resolved_count(), 2);
    }

    #[test]
    fn test_cancellation_stops_at_chunk_boundary() {
        let token = CancellationToken::new();
        let mut oracle = ScriptedOracle::new(vec![]);
        oracle.cancel_after = Some((2, token.clone()));
        let (f, z) = inputs(9);
        let fetch = ChunkedMatrixClient::new(&oracle, config(3))
            .fetch(&f, &z, &token)
            .unwrap();
        assert_eq!(fetch.status, FetchStatus::Cancelled);
        assert_eq!(fetch.matrix.resolved_count(), 6);
        assert_eq!(fetch.matrix.unresolved_zones(), vec![zid(6), zid(7), zid(8)]);
    }

    #[test]
    fn test_cancel_after_failed_chunk_is_not_an_error() {
        let token = CancellationToken::new();
        let mut oracle = ScriptedOracle::new(vec![0]);
        oracle.cancel_after = Some((1, token.clone()));
        let (f, z) = inputs(2);
        let fetch = ChunkedMatrixClient::new(&oracle, config(1))
            .fetch(&f, &z, &token)
            .unwrap();
        assert_eq!(fetch.status, FetchStatus::Cancelled);
        assert_eq!(fetch.failed_chunks, 1);
        assert_eq!(fetch.skipped_chunks, 1);
        assert_eq!(fetch.matrix.unresolved_zones(), vec![zid(0), zid(1)]);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_malformed_block_counts_as_failed_chunk() {
        struct ShortOracle;
        impl DistanceOracle for ShortOracle {
            fn table(
                &self,
                _sources: &[GeoPoint<f64>],
                destinations: &[GeoPoint<f64>],
                _with_durations: bool,
            ) -> Result<MatrixBlock, OracleError> {
                if destinations.len() == 1 {
                    return Ok(MatrixBlock::new(vec![vec![Some(1.0)]]));
                }
                Ok(MatrixBlock::new(vec![vec![Some(1.0); destinations.len()]; 2]))
            }
        }
        let (f, z) = inputs(3);
        let fetch = ChunkedMatrixClient::new(&ShortOracle, config(2))
            .fetch(&f, &z, &CancellationToken::new())
            .unwrap();
        assert_eq!(fetch.status, FetchStatus::Partial);
        assert_eq!(fetch.matrix.unresolved_zones(), vec![zid(2)]);
    }

    #[test]
    fn test_concurrent_waves_merge_deterministically() {
        let (f, z) = inputs(50);
        let cfg = OracleConfig {
            chunk_size: 4,
            max_in_flight: 4,
            ..OracleConfig::default()
        };
        let seq = ChunkedMatrixClient::new(&ScriptedOracle::new(vec![]), config(4))
            .fetch(&f, &z, &CancellationToken::new())
            .unwrap();
        let par = ChunkedMatrixClient::new(&ScriptedOracle::new(vec![]), cfg)
            .fetch(&f, &z, &CancellationToken::new())
            .unwrap();
        assert_eq!(par.status, FetchStatus::Complete);
        for fi in 0..2 {
            for zi in 0..50 {
                assert_eq!(seq.matrix.distance_km(fi, zi), par.matrix.distance_km(fi, zi));
            }
        }
    }

    #[test]
    fn test_empty_inputs_issue_no_requests() {
        let oracle = ScriptedOracle::new(vec![]);
        let (f, _) = inputs(0);
        let fetch = ChunkedMatrixClient::new(&oracle, config(3))
            .fetch(&f, &[], &CancellationToken::new())
            .unwrap();
        assert_eq!(fetch.status, FetchStatus::Complete);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_facilities_resolves_every_zone() {
        let oracle = ScriptedOracle::new(vec![]);
        let (_, z) = inputs(4);
        let fetch = ChunkedMatrixClient::new(&oracle, config(3))
            .fetch(&[], &z, &CancellationToken::new())
            .unwrap();
        assert_eq!(fetch.matrix.resolved_count(), 4);
        assert!(fetch.matrix.unresolved_zones().is_empty());
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }
}
