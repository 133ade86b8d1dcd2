use crate::{error::Result, fields::Fields};

/// Default `[height, width, channels, batch]` of the training data.
pub const DATA_SHAPE: [usize; 4] = [64, 64, 3, 1];

/// Default for every per-layer window: kernel, stride, padding and pooling.
pub const WINDOW: [usize; 2] = [1, 1];

/// Resolves a declared shape to exactly `N` dimensions.
///
/// An absent or empty shape resolves to `default`. Otherwise values are copied
/// positionally and missing dimensions are filled in: the first two slots take
/// the first declared value, so `[3]` becomes a square `[3, 3]` window, and any
/// further slot takes `1`. Extra values beyond `N` are dropped.
pub fn normalize<const N: usize>(values: Option<&[usize]>, default: [usize; N]) -> [usize; N] {
    let values = match values {
        Some(values) if !values.is_empty() => values,
        _ => return default,
    };

    std::array::from_fn(|i| match values.get(i) {
        Some(&v) => v,
        None if i < 2 => values[0],
        None => 1,
    })
}

/// Reads `key` from `fields` and normalizes it against `default`.
///
/// # Errors
/// Returns `InvalidFieldType` if the value is not an array of non-negative integers.
pub fn read<const N: usize>(fields: &Fields, key: &str, default: [usize; N]) -> Result<[usize; N]> {
    let values = fields.opt_shape(key)?;
    Ok(normalize(values.as_deref(), default))
}
