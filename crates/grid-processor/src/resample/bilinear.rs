//! Bilinear interpolation for grid sources.

use geo_common::{GeoError, GeoGrid, GeoResult, Geometry, Raster, RasterValue};
use projection::Transformer;

use super::{Resampler, RunContext};
use crate::block::narrow;
use crate::tiling::TilePlan;
use crate::types::ResampleMethod;

/// Snap distance for fractional indices that land on the outermost centres.
const EDGE_EPSILON: f64 = 1e-9;

/// Four source pixels and their weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub indices: [usize; 4],
    pub weights: [f64; 4],
}

/// Bilinear stencil at fractional position `(x, y)` (column, row) of a
/// `width × height` plane, where integers are pixel centres.
///
/// Points outside the hull of pixel centres have no stencil.
pub fn bilinear_stencil(width: usize, height: usize, x: f64, y: f64) -> Option<Stencil> {
    let x = snap(x, width)?;
    let y = snap(y, height)?;

    let x0 = (x.floor() as usize).min(width - 1);
    let y0 = (y.floor() as usize).min(height - 1);
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = x - x0 as f64;
    let yf = y - y0 as f64;

    Some(Stencil {
        indices: [
            y0 * width + x0,
            y0 * width + x1,
            y1 * width + x0,
            y1 * width + x1,
        ],
        weights: [
            (1.0 - xf) * (1.0 - yf),
            xf * (1.0 - yf),
            (1.0 - xf) * yf,
            xf * yf,
        ],
    })
}

fn snap(v: f64, len: usize) -> Option<f64> {
    let max = (len - 1) as f64;
    if !(v >= -EDGE_EPSILON && v <= max + EDGE_EPSILON) {
        return None;
    }
    Some(v.clamp(0.0, max))
}

/// Apply a stencil to one band.
///
/// Any missing neighbour that carries weight makes the result fill. As with
/// block reduction, an interpolated value equal to `fill` is returned as is
/// and reads as missing.
pub fn bilinear_interpolate<T: RasterValue>(plane: &[T], stencil: &Stencil, fill: T) -> GeoResult<T> {
    let mut value = 0.0;
    for (&i, &w) in stencil.indices.iter().zip(&stencil.weights) {
        if w == 0.0 {
            continue;
        }
        let v = plane[i];
        if v.is_missing(fill) {
            return Ok(fill);
        }
        let v = v.to_f64_lossy();
        if !v.is_finite() {
            return Ok(fill);
        }
        value += v * w;
    }
    narrow(value)
}

/// Bilinear resampler; requires a grid source.
#[derive(Debug, Clone, Copy, Default)]
pub struct BilinearResampler;

impl BilinearResampler {
    /// Stencil for every target pixel.
    pub fn stencil_map(
        &self,
        source: &GeoGrid,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Vec<Option<Stencil>>> {
        let transformer = Transformer::new(target.projection(), source.projection())?;
        let (src_rows, src_cols) = source.shape();

        let plan = TilePlan::new(1, target.n_rows(), target.n_cols(), ctx.config);
        let mut map = vec![None; target.len()];
        plan.run(&mut map, ctx.config.parallel, ctx.cancel, |_, row, col| {
            let (x, y) = target.pixel_center(row, col);
            Ok(transformer.transform(x, y).and_then(|(sx, sy)| {
                let (row_f, col_f) = source.fractional_index(sx, sy);
                bilinear_stencil(src_cols, src_rows, col_f, row_f)
            }))
        })?;
        Ok(map)
    }
}

impl Resampler for BilinearResampler {
    fn method(&self) -> ResampleMethod {
        ResampleMethod::Bilinear
    }

    fn check(&self, source: &Geometry, _target: &GeoGrid) -> GeoResult<()> {
        match source {
            Geometry::Grid(_) => Ok(()),
            Geometry::Swath(_) => Err(GeoError::unsupported_pair("bilinear", "swath", "grid")),
        }
    }

    fn resample<T: RasterValue>(
        &self,
        source: &Raster<T>,
        target: &GeoGrid,
        ctx: &RunContext<'_>,
    ) -> GeoResult<Raster<T>> {
        self.check(source.geometry(), target)?;
        let Geometry::Grid(grid) = source.geometry() else {
            return Err(GeoError::unsupported_pair("bilinear", "swath", "grid"));
        };

        let stencils = self.stencil_map(grid, target, ctx)?;
        let fill = source.fill_value();
        let mut values = Vec::with_capacity(source.bands() * stencils.len());
        for plane in source.band_planes() {
            for stencil in &stencils {
                values.push(match stencil {
                    Some(s) => bilinear_interpolate(plane, s, fill)?,
                    None => fill,
                });
            }
        }
        Raster::with_bands(values, source.bands(), target.clone(), fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
        let stencil = bilinear_stencil(width, height, x, y).unwrap();
        bilinear_interpolate(data, &stencil, f32::NAN).unwrap()
    }

    #[test]
    fn test_bilinear_interpolate() {
        let data: Vec<f32> = vec![
            1.0, 2.0,
            3.0, 4.0,
        ];

        // Corners
        assert_eq!(interpolate(&data, 2, 2, 0.0, 0.0), 1.0);
        assert_eq!(interpolate(&data, 2, 2, 1.0, 0.0), 2.0);
        assert_eq!(interpolate(&data, 2, 2, 0.0, 1.0), 3.0);
        assert_eq!(interpolate(&data, 2, 2, 1.0, 1.0), 4.0);

        // Center
        let center = interpolate(&data, 2, 2, 0.5, 0.5);
        assert!((center - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_bilinear_with_missing() {
        let data: Vec<f32> = vec![
            1.0, -999.0,
            3.0, 4.0,
        ];

        // Missing neighbour with weight makes the result fill
        let stencil = bilinear_stencil(2, 2, 0.5, 0.5).unwrap();
        assert_eq!(bilinear_interpolate(&data, &stencil, -999.0).unwrap(), -999.0);

        // On the left column the missing pixel has zero weight
        let stencil = bilinear_stencil(2, 2, 0.0, 0.5).unwrap();
        assert_eq!(bilinear_interpolate(&data, &stencil, -999.0).unwrap(), 2.0);
    }

    #[test]
    fn test_interpolated_value_equal_to_fill() {
        let data: Vec<f32> = vec![0.0, -2.0];
        let stencil = bilinear_stencil(2, 1, 0.5, 0.0).unwrap();
        assert_eq!(bilinear_interpolate(&data, &stencil, -1.0).unwrap(), -1.0);
    }

    #[test]
    fn test_outside_hull() {
        assert!(bilinear_stencil(3, 3, -0.1, 1.0).is_none());
        assert!(bilinear_stencil(3, 3, 1.0, 2.5).is_none());
        assert!(bilinear_stencil(3, 3, 2.0 + 1e-12, 2.0).is_some());
    }

    #[test]
    fn test_integer_rounding() {
        let data = [10u16, 11, 10, 11];
        let stencil = bilinear_stencil(2, 2, 0.5, 0.0).unwrap();
        assert_eq!(bilinear_interpolate(&data, &stencil, 0).unwrap(), 11);
    }
}
