//! Circle geometry, generic over the floating point representation.

use std::ops::Mul;

use crate::consts;

/// Floating point types that carry the constants needed for circle math.
pub trait Float: Copy + Mul<Output = Self> {
    /// π at the precision of the implementing type.
    const PI: Self;
}

impl Float for f32 {
    const PI: Self = consts::f32::PI;
}

impl Float for f64 {
    const PI: Self = consts::f64::PI;
}

/// Area of the circle with the given radius.
///
/// The sign of the radius doesn't matter because it gets squared.  A NaN or
/// infinite radius propagates through the arithmetic, it is not an error.
pub fn area<T: Float>(radius: T) -> T {
    T::PI * radius * radius
}
