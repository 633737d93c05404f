//! Numeric element types a raster can hold.

use num_traits::{NumCast, ToPrimitive};
use std::fmt::Debug;

/// Numeric raster element.
///
/// Reductions run in `f64`; [`RasterValue::from_f64`] converts the result
/// back, rounding to nearest for integer types and failing when the value
/// does not fit.
pub trait RasterValue:
    Copy + PartialEq + PartialOrd + Debug + Default + NumCast + Send + Sync + 'static
{
    /// Whether the type is an integer type.
    const IS_INTEGER: bool;

    /// Widen to `f64`.
    #[inline]
    fn to_f64_lossy(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }

    /// Narrow from `f64`; `None` when out of range or NaN for integers.
    #[inline]
    fn from_f64(value: f64) -> Option<Self> {
        if Self::IS_INTEGER {
            <Self as NumCast>::from(value.round())
        } else {
            <Self as NumCast>::from(value)
        }
    }

    /// Missing-data test: equal to the fill value, or NaN.
    #[inline]
    #[allow(clippy::eq_op)]
    fn is_missing(self, fill_value: Self) -> bool {
        self == fill_value || self != self
    }
}

macro_rules! impl_raster_value {
    ($($t:ty => $int:expr),+ $(,)?) => {
        $(
            impl RasterValue for $t {
                const IS_INTEGER: bool = $int;
            }
        )+
    };
}

impl_raster_value!(
    f32 => false,
    f64 => false,
    i8 => true,
    i16 => true,
    i32 => true,
    i64 => true,
    u8 => true,
    u16 => true,
    u32 => true,
    u64 => true,
);
