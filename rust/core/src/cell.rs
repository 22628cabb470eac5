// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cell kinds and the flat cell array
//!
//! Cells are stored the way unstructured grids usually store them: one
//! growable connectivity buffer, a parallel kind tag per cell and an offset
//! table with `len + 1` entries. Polyhedra additionally carry their face
//! loops in a sparse side table keyed by cell index.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::fmt;

/// Supported element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Vertex,
    PolyVertex,
    Line,
    PolyLine,
    Triangle,
    Quad,
    Polygon,
    Tetra,
    Wedge,
    Pyramid,
    Hexahedron,
    Polyhedron,
}

impl CellKind {
    /// Topological dimension of the cell
    #[inline]
    pub const fn dimension(self) -> u8 {
        match self {
            CellKind::Vertex | CellKind::PolyVertex => 0,
            CellKind::Line | CellKind::PolyLine => 1,
            CellKind::Triangle | CellKind::Quad | CellKind::Polygon => 2,
            CellKind::Tetra
            | CellKind::Wedge
            | CellKind::Pyramid
            | CellKind::Hexahedron
            | CellKind::Polyhedron => 3,
        }
    }

    /// Kind of a freshly emitted cell, derived from its dimension and the
    /// number of points it ended up with.
    ///
    /// Clipping only ever emits tetrahedra and wedges as volumetric cells,
    /// and dimensions above 3 are treated as volumetric.
    pub fn from_dimension_and_count(dimension: u8, count: usize) -> Self {
        match dimension {
            0 => {
                if count > 1 {
                    CellKind::PolyVertex
                } else {
                    CellKind::Vertex
                }
            }
            1 => {
                if count > 2 {
                    CellKind::PolyLine
                } else {
                    CellKind::Line
                }
            }
            2 => match count {
                3 => CellKind::Triangle,
                4 => CellKind::Quad,
                _ => CellKind::Polygon,
            },
            _ => {
                if count == 4 {
                    CellKind::Tetra
                } else {
                    CellKind::Wedge
                }
            }
        }
    }

    /// Check if a cell of this kind may have `count` points
    pub const fn accepts_point_count(self, count: usize) -> bool {
        match self {
            CellKind::Vertex => count == 1,
            CellKind::PolyVertex => count >= 1,
            CellKind::Line => count == 2,
            CellKind::PolyLine => count >= 2,
            CellKind::Triangle => count == 3,
            CellKind::Quad | CellKind::Tetra => count == 4,
            CellKind::Polygon => count >= 3,
            CellKind::Pyramid => count == 5,
            CellKind::Wedge => count == 6,
            CellKind::Hexahedron => count == 8,
            CellKind::Polyhedron => count >= 4,
        }
    }

    /// Numeric cell type code used by VTK-style interchange formats
    pub const fn vtk_type(self) -> u8 {
        match self {
            CellKind::Vertex => 1,
            CellKind::PolyVertex => 2,
            CellKind::Line => 3,
            CellKind::PolyLine => 4,
            CellKind::Triangle => 5,
            CellKind::Polygon => 7,
            CellKind::Quad => 9,
            CellKind::Tetra => 10,
            CellKind::Hexahedron => 12,
            CellKind::Wedge => 13,
            CellKind::Pyramid => 14,
            CellKind::Polyhedron => 42,
        }
    }

    /// Inverse of [`CellKind::vtk_type`]
    pub fn from_vtk_type(code: u8) -> Result<Self> {
        match code {
            1 => Ok(CellKind::Vertex),
            2 => Ok(CellKind::PolyVertex),
            3 => Ok(CellKind::Line),
            4 => Ok(CellKind::PolyLine),
            5 => Ok(CellKind::Triangle),
            7 => Ok(CellKind::Polygon),
            9 => Ok(CellKind::Quad),
            10 => Ok(CellKind::Tetra),
            12 => Ok(CellKind::Hexahedron),
            13 => Ok(CellKind::Wedge),
            14 => Ok(CellKind::Pyramid),
            42 => Ok(CellKind::Polyhedron),
            other => Err(Error::UnknownCellKind(other)),
        }
    }

    /// Short lowercase name, used in logs
    pub const fn name(self) -> &'static str {
        match self {
            CellKind::Vertex => "vertex",
            CellKind::PolyVertex => "poly_vertex",
            CellKind::Line => "line",
            CellKind::PolyLine => "poly_line",
            CellKind::Triangle => "triangle",
            CellKind::Quad => "quad",
            CellKind::Polygon => "polygon",
            CellKind::Tetra => "tetra",
            CellKind::Wedge => "wedge",
            CellKind::Pyramid => "pyramid",
            CellKind::Hexahedron => "hexahedron",
            CellKind::Polyhedron => "polyhedron",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed view of one cell
#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
    pub kind: CellKind,
    pub point_ids: &'a [usize],
    /// Face loops, present only for polyhedra
    pub faces: Option<&'a [Vec<usize>]>,
}

/// Flat storage for a sequence of cells
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellArray {
    kinds: Vec<CellKind>,
    offsets: Vec<usize>,
    connectivity: Vec<usize>,
    faces: FxHashMap<usize, Vec<Vec<usize>>>,
}

impl CellArray {
    /// Create an empty cell array
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a cell array with capacity
    pub fn with_capacity(cell_count: usize, connectivity_len: usize) -> Self {
        let mut offsets = Vec::with_capacity(cell_count + 1);
        offsets.push(0);
        Self {
            kinds: Vec::with_capacity(cell_count),
            offsets,
            connectivity: Vec::with_capacity(connectivity_len),
            faces: FxHashMap::default(),
        }
    }

    /// Append a cell and return its index
    pub fn push(&mut self, kind: CellKind, point_ids: &[usize]) -> usize {
        let index = self.kinds.len();
        self.kinds.push(kind);
        self.connectivity.extend_from_slice(point_ids);
        self.offsets.push(self.connectivity.len());
        index
    }

    /// Append a polyhedron given its unique point ids and outward face loops
    pub fn push_polyhedron(&mut self, point_ids: &[usize], faces: Vec<Vec<usize>>) -> usize {
        let index = self.push(CellKind::Polyhedron, point_ids);
        self.faces.insert(index, faces);
        index
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if there are no cells
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kind of cell `index`
    #[inline]
    pub fn kind(&self, index: usize) -> CellKind {
        self.kinds[index]
    }

    /// Point ids of cell `index`
    #[inline]
    pub fn point_ids(&self, index: usize) -> &[usize] {
        &self.connectivity[self.offsets[index]..self.offsets[index + 1]]
    }

    /// Face loops of cell `index`, if it is a polyhedron
    #[inline]
    pub fn faces(&self, index: usize) -> Option<&[Vec<usize>]> {
        self.faces.get(&index).map(|f| f.as_slice())
    }

    /// Borrowed view of cell `index`
    pub fn cell(&self, index: usize) -> CellRef<'_> {
        CellRef {
            kind: self.kind(index),
            point_ids: self.point_ids(index),
            faces: self.faces(index),
        }
    }

    /// Iterate over all cells in order
    pub fn iter(&self) -> impl Iterator<Item = CellRef<'_>> {
        (0..self.len()).map(move |i| self.cell(i))
    }

    /// Per-cell kind tags
    pub fn kinds(&self) -> &[CellKind] {
        &self.kinds
    }

    /// Offset table (`len + 1` entries)
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Concatenated point ids of all cells
    pub fn connectivity(&self) -> &[usize] {
        &self.connectivity
    }

    /// Check every referenced point id against `point_count`, and every
    /// cell's point count against its kind
    pub fn validate(&self, point_count: usize) -> Result<()> {
        for (cell, cell_ref) in self.iter().enumerate() {
            if !cell_ref.kind.accepts_point_count(cell_ref.point_ids.len()) {
                return Err(Error::CellArity {
                    cell,
                    kind: cell_ref.kind,
                    count: cell_ref.point_ids.len(),
                });
            }
            let faces = cell_ref.faces.unwrap_or(&[]).iter().flatten();
            for &point in cell_ref.point_ids.iter().chain(faces) {
                if point >= point_count {
                    return Err(Error::PointIndexOutOfRange {
                        cell,
                        point,
                        count: point_count,
                    });
                }
            }
            if cell_ref.kind == CellKind::Polyhedron && cell_ref.faces.is_none() {
                return Err(Error::MissingPolyhedronFaces(cell));
            }
        }
        Ok(())
    }

    /// Release over-allocated capacity
    pub fn shrink_to_fit(&mut self) {
        self.kinds.shrink_to_fit();
        self.offsets.shrink_to_fit();
        self.connectivity.shrink_to_fit();
        self.faces.shrink_to_fit();
    }
}

impl Default for CellArray {
    fn default() -> Self {
        Self::new()
    }
}
