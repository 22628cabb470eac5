// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # XFEM-Clip Core
//!
//! Unstructured mesh data model shared by the clipping and processing crates.
//!
//! ## Overview
//!
//! - **Points**: [`PointBuffer`] in single or double precision
//! - **Cells**: [`CellArray`] with a closed set of [`CellKind`]s, a flat
//!   connectivity buffer, an offset table and polyhedron face loops
//! - **Attributes**: named point and cell arrays ([`AttributeSet`],
//!   [`DataArray`]) holding float or integer tuples
//!
//! ## Quick Start
//!
//! ```rust
//! use xfem_clip_core::{CellKind, DataArray, Mesh, Precision};
//!
//! let mut mesh = Mesh::new(Precision::Double);
//! mesh.add_points(&[
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//! ]);
//! mesh.add_cell(CellKind::Tetra, &[0, 1, 2, 3]);
//! mesh.cell_data.add(DataArray::scalars("xfem_signed_dist0", vec![1.0]));
//! assert!(mesh.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Derive `Serialize`/`Deserialize` for `Mesh` and everything it holds

pub mod attributes;
pub mod bounds;
pub mod cell;
pub mod error;
pub mod mesh;
pub mod points;

pub use attributes::{ArrayData, AttributeSet, DataArray};
pub use bounds::Bounds;
pub use cell::{CellArray, CellKind, CellRef};
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use points::{round_to_precision, PointBuffer, Precision};
