// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XFEM-Clip Geometry
//!
//! Per-element building blocks of the clip: clip scalars from the cut
//! description carried by the mesh, case-table clipping of single elements,
//! attribute transfer and the point merger that keeps the output conforming.
//!
//! ```rust
//! use xfem_clip_core::{CellKind, Mesh};
//! use xfem_clip_geometry::{ElementClipper, PointMerger};
//!
//! let mut mesh = Mesh::default();
//! mesh.add_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
//! mesh.add_cell(CellKind::Tetra, &[0, 1, 2, 3]);
//!
//! let mut clipper = ElementClipper::new();
//! let output = clipper.clip(mesh.cell(0), &[1.0, -1.0, -1.0, -1.0]);
//! assert_eq!(output.cells()[0].kind, CellKind::Tetra);
//!
//! let mut merger = PointMerger::default();
//! merger.initialize(&mesh.bounds(), &mesh.point_data, mesh.points.precision(), 1e-12, 4);
//! let ids: Vec<usize> = output.points().iter().map(|p| merger.insert(p, &mesh)).collect();
//! assert_eq!(ids, vec![0, 1, 2, 3]);
//! ```

pub mod clip;
pub mod error;
pub mod interpolate;
pub mod locator;
pub mod merger;
pub mod plane;
pub mod scalar_field;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use clip::{is_inside, CellPoints, ClipOutput, ClippedCell, CutPoint, Disposition, ElementClipper};
pub use error::{Error, Result};
pub use locator::{ExactLocator, GridLocator, PointLocator};
pub use merger::PointMerger;
pub use plane::Plane;
pub use scalar_field::{
    ClipDescriptor, DescriptorMode, FieldStatus, Scalars, UncutReason, CUT_NORMAL_ARRAY,
    CUT_ORIGIN_ARRAY, NEGATIVE_SCALE, SIGNED_DISTANCE_ARRAYS,
};
