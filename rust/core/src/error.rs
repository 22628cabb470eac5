// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh construction and validation.

use crate::cell::CellKind;
use thiserror::Error;

/// Result type for mesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or validating a mesh
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("cell {cell} references point {point}, but the mesh has {count} points")]
    PointIndexOutOfRange {
        cell: usize,
        point: usize,
        count: usize,
    },

    #[error("attribute array '{name}' has {found} tuples, expected {expected}")]
    AttributeLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("attribute array '{name}' has {found} components, expected {expected}")]
    ComponentMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("attribute array '{name}' holds {values} values, not a multiple of {components} components")]
    RaggedArray {
        name: String,
        values: usize,
        components: usize,
    },

    #[error("unknown cell type code: {0}")]
    UnknownCellKind(u8),

    #[error("polyhedron cell {0} has no face description")]
    MissingPolyhedronFaces(usize),

    #[error("{kind} cell {cell} has {count} points")]
    CellArity {
        cell: usize,
        kind: CellKind,
        count: usize,
    },
}
