//! Block reduction shared by native downsampling and aggregation.
//!
//! Reductions run in `f64` over the valid (non-missing, finite) values of a
//! rectangular block and convert back to the element type at the end.

use geo_common::{GeoError, GeoResult, RasterValue};
use std::ops::Range;

use crate::types::Reducer;

/// Reduce `plane[rows × cols]` (row-major with `n_cols` columns).
///
/// Returns `fill` when the block has no valid value, and `NumericOverflow`
/// when the result is not finite or does not fit `T`.
///
/// The result is not adjusted when it happens to equal `fill` (the mean of
/// `[0, -2]` with fill `-1`); such a pixel reads as missing downstream.
/// Choose a fill value outside the data range to avoid it.
pub(crate) fn reduce_block<T: RasterValue>(
    plane: &[T],
    n_cols: usize,
    rows: Range<usize>,
    cols: Range<usize>,
    reducer: &Reducer,
    fill: T,
) -> GeoResult<T> {
    let mut valid = rows
        .flat_map(|r| {
            let start = r * n_cols;
            plane[start + cols.start..start + cols.end].iter().copied()
        })
        .filter(|v| !v.is_missing(fill) && v.to_f64_lossy().is_finite());

    let Some(first) = valid.next() else {
        return Ok(fill);
    };

    match reducer {
        Reducer::Max => Ok(valid.fold(first, |best, v| if v > best { v } else { best })),
        Reducer::Min => Ok(valid.fold(first, |best, v| if v < best { v } else { best })),
        Reducer::Mean => {
            let mut sum = first.to_f64_lossy();
            let mut count = 1usize;
            let mut uniform = true;
            for v in valid {
                uniform &= v == first;
                sum += v.to_f64_lossy();
                count += 1;
            }
            // A uniform block keeps its value bit for bit
            if uniform {
                return Ok(first);
            }
            narrow(sum / count as f64)
        }
        Reducer::Sum => {
            let sum = valid.fold(first.to_f64_lossy(), |acc, v| acc + v.to_f64_lossy());
            narrow(sum)
        }
        Reducer::Custom(f) => {
            let folded = valid.fold(first.to_f64_lossy(), |acc, v| f(acc, v.to_f64_lossy()));
            narrow(folded)
        }
    }
}

/// Convert a reduction result back to the element type.
pub(crate) fn narrow<T: RasterValue>(value: f64) -> GeoResult<T> {
    if !value.is_finite() {
        return Err(GeoError::NumericOverflow { value });
    }
    match T::from_f64(value) {
        Some(v) if v.to_f64_lossy().is_finite() => Ok(v),
        _ => Err(GeoError::NumericOverflow { value }),
    }
}
