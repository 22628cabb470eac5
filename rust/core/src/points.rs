// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point coordinate storage in single or double precision

use crate::bounds::Bounds;

/// Storage precision of point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    Single,
    Double,
}

/// Point coordinates, stored as f32 or f64 triples
///
/// All accessors work in f64; values pushed into a single-precision buffer
/// are rounded on insertion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointBuffer {
    F32(Vec<[f32; 3]>),
    F64(Vec<[f64; 3]>),
}

impl PointBuffer {
    /// Create an empty buffer
    pub fn new(precision: Precision) -> Self {
        Self::with_capacity(precision, 0)
    }

    /// Create a buffer with capacity
    pub fn with_capacity(precision: Precision, capacity: usize) -> Self {
        match precision {
            Precision::Single => PointBuffer::F32(Vec::with_capacity(capacity)),
            Precision::Double => PointBuffer::F64(Vec::with_capacity(capacity)),
        }
    }

    /// Storage precision
    #[inline]
    pub fn precision(&self) -> Precision {
        match self {
            PointBuffer::F32(_) => Precision::Single,
            PointBuffer::F64(_) => Precision::Double,
        }
    }

    /// Number of points
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            PointBuffer::F32(v) => v.len(),
            PointBuffer::F64(v) => v.len(),
        }
    }

    /// Check if the buffer holds no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates of point `index`
    #[inline]
    pub fn get(&self, index: usize) -> [f64; 3] {
        match self {
            PointBuffer::F32(v) => {
                let p = v[index];
                [p[0] as f64, p[1] as f64, p[2] as f64]
            }
            PointBuffer::F64(v) => v[index],
        }
    }

    /// Append a point
    #[inline]
    pub fn push(&mut self, p: [f64; 3]) {
        match self {
            PointBuffer::F32(v) => v.push([p[0] as f32, p[1] as f32, p[2] as f32]),
            PointBuffer::F64(v) => v.push(p),
        }
    }

    /// Iterate over all points as f64 triples
    pub fn iter(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Bounding box of all points
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.iter())
    }

    /// Release over-allocated capacity
    pub fn shrink_to_fit(&mut self) {
        match self {
            PointBuffer::F32(v) => v.shrink_to_fit(),
            PointBuffer::F64(v) => v.shrink_to_fit(),
        }
    }
}

/// Round a coordinate triple to the given storage precision
#[inline]
pub fn round_to_precision(p: [f64; 3], precision: Precision) -> [f64; 3] {
    match precision {
        Precision::Single => [
            p[0] as f32 as f64,
            p[1] as f32 as f64,
            p[2] as f32 as f64,
        ],
        Precision::Double => p,
    }
}
