// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # XFEM-Clip Processing
//!
//! The clip stage: walks every element of an input mesh, clips it against
//! the cut carried in its cell data, merges the resulting points and
//! assembles a conforming output mesh.
//!
//! ## Quick Start
//!
//! ```rust
//! use xfem_clip_core::{CellKind, DataArray, Mesh};
//! use xfem_clip_processing::{ClipStage, StageState};
//!
//! let mut mesh = Mesh::default();
//! mesh.add_points(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
//! mesh.add_cell(CellKind::Triangle, &[0, 1, 2]);
//! // Keep x <= 1; the stored normal faces the removed side
//! mesh.cell_data.add(DataArray::vectors("xfem_cut_origin_", &[[1.0, 0.0, 0.0]]));
//! mesh.cell_data.add(DataArray::vectors("xfem_cut_normal_", &[[1.0, 0.0, 0.0]]));
//!
//! let outcome = ClipStage::default().run(&mesh);
//! assert_eq!(outcome.state, StageState::Done);
//! assert_eq!(outcome.mesh.cells.kind(0), CellKind::Quad);
//! assert_eq!(outcome.report.clipped_cells, 1);
//! ```
//!
//! ## Cancellation and progress
//!
//! ```rust
//! use xfem_clip_processing::{CancellationToken, RunControl};
//!
//! let token = CancellationToken::new();
//! let control = RunControl::new()
//!     .with_cancellation(token.clone())
//!     .with_progress(|fraction| println!("{:.0}%", fraction * 100.0));
//! token.cancel();
//! assert!(control.is_cancelled());
//! ```

pub mod assembler;
pub mod config;
pub mod control;
pub mod error;
pub mod report;
pub mod stage;

pub use assembler::{estimated_capacity, MeshAssembler};
pub use config::{ClipConfig, MergeTolerance, OutputPrecision};
pub use control::{CancellationToken, RunControl};
pub use error::{Error, Result};
pub use report::ClipReport;
pub use stage::{ClipOutcome, ClipStage, StageState};
