//! Tile scheduling and cooperative cancellation.
//!
//! Output planes are cut into bands of `tile_rows` rows; each band is a
//! disjoint slice of the output buffer and is processed by one worker,
//! `tile_cols` columns at a time. The cancellation flag is checked before
//! every tile.

use geo_common::{GeoError, GeoResult};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::ResampleConfig;

/// Shared flag that asks a running operation to stop between tiles.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tiling of a band-sequential output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlan {
    pub bands: usize,
    pub n_rows: usize,
    pub n_cols: usize,
    pub tile_rows: usize,
    pub tile_cols: usize,
}

impl TilePlan {
    pub fn new(bands: usize, n_rows: usize, n_cols: usize, config: &ResampleConfig) -> Self {
        Self {
            bands,
            n_rows,
            n_cols,
            tile_rows: config.tile_rows.max(1),
            tile_cols: config.tile_cols.max(1),
        }
    }

    /// Number of tiles across all bands.
    pub fn total_tiles(&self) -> usize {
        self.bands * self.n_rows.div_ceil(self.tile_rows) * self.n_cols.div_ceil(self.tile_cols)
    }

    /// Fill `output` with `pixel(band, row, col)` tile by tile.
    ///
    /// Stops at the first error. When the token is cancelled the function
    /// returns `Cancelled` with the number of tiles that completed; the
    /// buffer contents are then unspecified.
    pub fn run<T, F>(
        &self,
        output: &mut [T],
        parallel: bool,
        cancel: &CancellationToken,
        pixel: F,
    ) -> GeoResult<()>
    where
        T: Send,
        F: Fn(usize, usize, usize) -> GeoResult<T> + Sync,
    {
        let plane = self.n_rows * self.n_cols;
        if output.len() != self.bands * plane {
            return Err(GeoError::shape_mismatch(
                "tiled output buffer",
                (self.bands * self.n_rows, self.n_cols),
                (1, output.len()),
            ));
        }
        if plane == 0 {
            return Ok(());
        }

        let total = self.total_tiles();
        let completed = AtomicUsize::new(0);
        let n_cols = self.n_cols;
        let tile_rows = self.tile_rows;
        let tile_cols = self.tile_cols;

        let jobs: Vec<(usize, usize, &mut [T])> = output
            .chunks_mut(plane)
            .enumerate()
            .flat_map(|(band, plane)| {
                plane
                    .chunks_mut(tile_rows * n_cols)
                    .enumerate()
                    .map(move |(i, chunk)| (band, i * tile_rows, chunk))
            })
            .collect();

        let process = |(band, row_start, chunk): (usize, usize, &mut [T])| -> GeoResult<()> {
            let rows = chunk.len() / n_cols;
            for col_start in (0..n_cols).step_by(tile_cols) {
                if cancel.is_cancelled() {
                    return Err(GeoError::Cancelled {
                        completed_tiles: 0,
                        total_tiles: total,
                    });
                }
                let col_end = (col_start + tile_cols).min(n_cols);
                for r in 0..rows {
                    for c in col_start..col_end {
                        chunk[r * n_cols + c] = pixel(band, row_start + r, c)?;
                    }
                }
                completed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        };

        let result = if parallel {
            jobs.into_par_iter().try_for_each(process)
        } else {
            jobs.into_iter().try_for_each(process)
        };

        match result {
            Err(GeoError::Cancelled { .. }) => Err(GeoError::Cancelled {
                completed_tiles: completed.load(Ordering::Relaxed),
                total_tiles: total,
            }),
            other => other,
        }
    }
}
