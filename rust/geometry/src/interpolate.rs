// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute transfer onto output points and cells
//!
//! Target sets are created with [`allocate_like`] before the first write, so
//! source and target arrays pair up positionally. Every write appends exactly
//! one tuple to every target array.

use xfem_clip_core::{ArrayData, AttributeSet};

/// Empty target set with the schema of `source`
pub fn allocate_like(source: &AttributeSet, tuple_capacity: usize) -> AttributeSet {
    source.empty_like(tuple_capacity)
}

/// Append tuple `index` of every source array to the matching target array
pub fn copy_tuple(source: &AttributeSet, index: usize, target: &mut AttributeSet) {
    for (src, dst) in source.iter().zip(target.iter_mut()) {
        let n = src.components();
        let range = index * n..(index + 1) * n;
        match (src.data(), dst.data_mut()) {
            (ArrayData::Float(values), ArrayData::Float(out)) => {
                out.extend_from_slice(&values[range])
            }
            (ArrayData::Int(values), ArrayData::Int(out)) => out.extend_from_slice(&values[range]),
            (_, out) => {
                for c in 0..n {
                    push_value(out, src.component(index, c));
                }
            }
        }
    }
}

/// Append `(1 - t) * v0 + t * v1` for tuples `p0` and `p1` of every source
/// array; integer arrays are rounded to the nearest integer
pub fn interpolate_tuple(
    source: &AttributeSet,
    p0: usize,
    p1: usize,
    t: f64,
    target: &mut AttributeSet,
) {
    for (src, dst) in source.iter().zip(target.iter_mut()) {
        let n = src.components();
        match (src.data(), dst.data_mut()) {
            (ArrayData::Float(values), ArrayData::Float(out)) => {
                let (a, b) = (p0 * n, p1 * n);
                out.extend((0..n).map(|c| lerp(values[a + c], values[b + c], t)));
            }
            (_, out) => {
                for c in 0..n {
                    push_value(out, lerp(src.component(p0, c), src.component(p1, c), t));
                }
            }
        }
    }
}

#[inline]
fn lerp(v0: f64, v1: f64, t: f64) -> f64 {
    (1.0 - t) * v0 + t * v1
}

#[inline]
fn push_value(out: &mut ArrayData, value: f64) {
    match out {
        ArrayData::Float(values) => values.push(value),
        ArrayData::Int(values) => values.push(value.round() as i64),
    }
}
