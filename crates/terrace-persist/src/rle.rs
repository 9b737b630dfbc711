//! Run-length codec for flat per-chunk integer layers.
//!
//! Input to [`extract`] is expected to come from [`compress`]; it is not
//! validated beyond what the types guarantee.

use serde::{Deserialize, Serialize};

/// Runs of `(value, count)`. Serializes as `[[value, count], ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rle {
    pub runs: Vec<(i32, u32)>,
}

impl Rle {
    /// Number of values the encoding expands to.
    pub fn decoded_len(&self) -> usize {
        self.runs.iter().map(|&(_, n)| n as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Collapse runs of equal consecutive values.
pub fn compress(values: &[i32]) -> Rle {
    let mut runs: Vec<(i32, u32)> = Vec::new();
    for &v in values {
        match runs.last_mut() {
            Some((last, count)) if *last == v && *count < u32::MAX => *count += 1,
            _ => runs.push((v, 1)),
        }
    }
    Rle { runs }
}

/// Expand an encoding produced by [`compress`].
pub fn extract(rle: &Rle) -> Vec<i32> {
    let mut out = Vec::with_capacity(rle.decoded_len());
    for &(v, n) in &rle.runs {
        out.extend(std::iter::repeat(v).take(n as usize));
    }
    out
}
