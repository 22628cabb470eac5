// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element clip scalars
//!
//! An input mesh describes its cuts with one of two cell-array encodings:
//!
//! - four signed nodal distances per tetrahedron (`xfem_signed_dist0..3`)
//! - a cutting plane per element (`xfem_cut_origin_`, `xfem_cut_normal_`)
//!
//! [`ClipDescriptor::from_cell_data`] decides once per run which encoding is
//! present, and [`ClipDescriptor::scalars`] evaluates it for one element.
//! Every negative scalar is scaled by [`NEGATIVE_SCALE`] so that two cut
//! surfaces touching the same edge never produce coincident crossings.

use crate::error::{Error, Result};
use crate::plane::Plane;
use nalgebra::Point3;
use smallvec::SmallVec;
use std::fmt;
use xfem_clip_core::{AttributeSet, DataArray};

/// Cell arrays holding the nodal signed distances
pub const SIGNED_DISTANCE_ARRAYS: [&str; 4] = [
    "xfem_signed_dist0",
    "xfem_signed_dist1",
    "xfem_signed_dist2",
    "xfem_signed_dist3",
];

/// Cell array holding the cut plane origin
pub const CUT_ORIGIN_ARRAY: &str = "xfem_cut_origin_";

/// Cell array holding the cut plane normal
pub const CUT_NORMAL_ARRAY: &str = "xfem_cut_normal_";

/// Factor applied to every negative scalar
pub const NEGATIVE_SCALE: f64 = 1.0001;

/// Per-element scalars, inline for elements of up to eight points
pub type Scalars = SmallVec<[f64; 8]>;

/// Which encoding a run is cut by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorMode {
    SignedDistance,
    Plane,
}

impl DescriptorMode {
    pub const fn name(self) -> &'static str {
        match self {
            DescriptorMode::SignedDistance => "signed_distance",
            DescriptorMode::Plane => "plane",
        }
    }
}

impl fmt::Display for DescriptorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an element was retained without evaluating its cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UncutReason {
    /// Plane normal shorter than [`crate::plane::NORMAL_TOLERANCE`]
    DegenerateNormal,
    /// Signed distances given for an element that does not have 4 points
    ArityMismatch,
}

/// Outcome of evaluating one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Evaluated,
    Uncut(UncutReason),
}

/// Borrowed view of the cut description carried by a mesh
#[derive(Debug, Clone, Copy)]
pub enum ClipDescriptor<'a> {
    SignedDistance([&'a DataArray; 4]),
    Plane {
        origin: &'a DataArray,
        normal: &'a DataArray,
    },
}

impl<'a> ClipDescriptor<'a> {
    /// Resolve the cut encoding from a mesh's cell arrays
    ///
    /// Exactly one encoding must be complete. The signed distance encoding
    /// counts as present only when all four arrays are.
    pub fn from_cell_data(cell_data: &'a AttributeSet, cell_count: usize) -> Result<Self> {
        let distances = SIGNED_DISTANCE_ARRAYS.map(|name| cell_data.get(name));
        let origin = cell_data.get(CUT_ORIGIN_ARRAY);
        let normal = cell_data.get(CUT_NORMAL_ARRAY);

        match (distances, origin, normal) {
            ([Some(_), Some(_), Some(_), Some(_)], Some(_), Some(_)) => {
                Err(Error::ConflictingDescriptors)
            }
            ([Some(d0), Some(d1), Some(d2), Some(d3)], _, _) => {
                let arrays = [d0, d1, d2, d3];
                for array in arrays {
                    check_array(array, 1, cell_count)?;
                }
                Ok(ClipDescriptor::SignedDistance(arrays))
            }
            (_, Some(origin), Some(normal)) => {
                check_array(origin, 3, cell_count)?;
                check_array(normal, 3, cell_count)?;
                Ok(ClipDescriptor::Plane { origin, normal })
            }
            _ => Err(Error::MissingDescriptor),
        }
    }

    /// Encoding in use
    pub fn mode(&self) -> DescriptorMode {
        match self {
            ClipDescriptor::SignedDistance(_) => DescriptorMode::SignedDistance,
            ClipDescriptor::Plane { .. } => DescriptorMode::Plane,
        }
    }

    /// Evaluate the clip scalars of element `cell` into `out`, one per point
    /// in element order
    ///
    /// Elements that cannot be evaluated get 1.0 everywhere, which retains
    /// them whole.
    pub fn scalars(&self, cell: usize, points: &[[f64; 3]], out: &mut Scalars) -> FieldStatus {
        out.clear();
        match self {
            ClipDescriptor::SignedDistance(arrays) => {
                if points.len() != arrays.len() {
                    out.resize(points.len(), 1.0);
                    return FieldStatus::Uncut(UncutReason::ArityMismatch);
                }
                out.extend(arrays.iter().map(|a| separate(a.component(cell, 0))));
            }
            ClipDescriptor::Plane { origin, normal } => {
                let Some(plane) = Plane::from_cut(origin.tuple3(cell), normal.tuple3(cell)) else {
                    out.resize(points.len(), 1.0);
                    return FieldStatus::Uncut(UncutReason::DegenerateNormal);
                };
                out.extend(
                    points
                        .iter()
                        .map(|&p| separate(plane.signed_distance(&Point3::from(p)))),
                );
            }
        }
        FieldStatus::Evaluated
    }
}

#[inline]
fn separate(s: f64) -> f64 {
    if s < 0.0 {
        s * NEGATIVE_SCALE
    } else {
        s
    }
}

fn check_array(array: &DataArray, components: usize, cell_count: usize) -> Result<()> {
    if array.components() < components {
        return Err(Error::MalformedDescriptor {
            name: array.name().to_string(),
            reason: format!(
                "expected {} components, found {}",
                components,
                array.components()
            ),
        });
    }
    if array.tuple_count() < cell_count {
        return Err(Error::MalformedDescriptor {
            name: array.name().to_string(),
            reason: format!(
                "expected {} tuples, found {}",
                cell_count,
                array.tuple_count()
            ),
        });
    }
    Ok(())
}
