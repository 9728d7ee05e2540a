// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dimension-size conversion between the 64-bit API domain and the native
//! 32-bit form the storage layer records.
//!
//! Exactly one value is non-integral in the narrowing direction: the
//! 64-bit "unlimited" sentinel, which maps to `-1` in native form and
//! back. Every other dimension must fit the signed 32-bit range or the
//! conversion fails; sizes are never clamped.
use crate::error::TreeError;

/// 64-bit sentinel for an unbounded dimension.
pub const UNLIMITED: i64 = i64::MAX;

/// Native 32-bit marker for an unbounded dimension.
pub const UNLIMITED_NATIVE: i32 = -1;

/// Narrows one dimension size to native form.
///
/// # Errors
///
/// [`TreeError::DimensionOverflow`] when `dim` is negative or exceeds the
/// signed 32-bit range and is not the [`UNLIMITED`] sentinel.
pub fn dim_to_native(dim: i64) -> Result<i32, TreeError> {
    if dim == UNLIMITED {
        return Ok(UNLIMITED_NATIVE);
    }
    if dim < 0 {
        return Err(TreeError::DimensionOverflow { value: dim });
    }
    i32::try_from(dim).map_err(|_| TreeError::DimensionOverflow { value: dim })
}

/// Widens one native dimension size back into the 64-bit domain.
///
/// The native unlimited marker maps back to [`UNLIMITED`]; every other
/// value widens unchanged.
#[must_use]
pub fn dim_from_native(dim: i32) -> i64 {
    if dim == UNLIMITED_NATIVE {
        UNLIMITED
    } else {
        i64::from(dim)
    }
}

/// Narrows a whole shape to native form.
///
/// # Errors
///
/// [`TreeError::DimensionOverflow`] on the first dimension that fails
/// [`dim_to_native`]; no partial result is produced.
pub fn to_native(shape: &[i64]) -> Result<Vec<i32>, TreeError> {
    shape.iter().map(|&d| dim_to_native(d)).collect()
}

/// Widens a whole native shape back into the 64-bit domain.
#[must_use]
pub fn from_native(shape: &[i32]) -> Vec<i64> {
    shape.iter().map(|&d| dim_from_native(d)).collect()
}
