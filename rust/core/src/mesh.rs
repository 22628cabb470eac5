// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unstructured mesh: points, cells and their attribute arrays

use crate::attributes::AttributeSet;
use crate::bounds::Bounds;
use crate::cell::{CellArray, CellKind, CellRef};
use crate::error::Result;
use crate::points::{PointBuffer, Precision};
use smallvec::SmallVec;

/// Unstructured mesh
///
/// Invariants (checked by [`Mesh::validate`]): every point id referenced by
/// a cell is below [`Mesh::point_count`], every point array has one tuple per
/// point and every cell array one tuple per cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    /// Point coordinates
    pub points: PointBuffer,
    /// Cell kinds and connectivity
    pub cells: CellArray,
    /// Per-point attribute arrays
    pub point_data: AttributeSet,
    /// Per-cell attribute arrays
    pub cell_data: AttributeSet,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(precision: Precision) -> Self {
        Self {
            points: PointBuffer::new(precision),
            cells: CellArray::new(),
            point_data: AttributeSet::new(),
            cell_data: AttributeSet::new(),
        }
    }

    /// Add a point and return its id
    #[inline]
    pub fn add_point(&mut self, p: [f64; 3]) -> usize {
        self.points.push(p);
        self.points.len() - 1
    }

    /// Add several points, returning the id of the first
    pub fn add_points(&mut self, points: &[[f64; 3]]) -> usize {
        let first = self.points.len();
        for &p in points {
            self.points.push(p);
        }
        first
    }

    /// Add a cell and return its id
    #[inline]
    pub fn add_cell(&mut self, kind: CellKind, point_ids: &[usize]) -> usize {
        self.cells.push(kind, point_ids)
    }

    /// Add a polyhedron described only by its outward face loops
    ///
    /// The cell's point list is the set of face points in order of first
    /// appearance.
    pub fn add_polyhedron(&mut self, faces: Vec<Vec<usize>>) -> usize {
        let mut point_ids: SmallVec<[usize; 16]> = SmallVec::new();
        for &id in faces.iter().flatten() {
            if !point_ids.contains(&id) {
                point_ids.push(id);
            }
        }
        self.cells.push_polyhedron(&point_ids, faces)
    }

    /// Number of points
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the mesh has neither points nor cells
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.cells.is_empty()
    }

    /// Borrowed view of cell `index`
    #[inline]
    pub fn cell(&self, index: usize) -> CellRef<'_> {
        self.cells.cell(index)
    }

    /// Coordinates of the points of cell `index`, in cell order
    pub fn cell_points(&self, index: usize) -> SmallVec<[[f64; 3]; 8]> {
        self.cells
            .point_ids(index)
            .iter()
            .map(|&id| self.points.get(id))
            .collect()
    }

    /// Bounding box of all points
    pub fn bounds(&self) -> Bounds {
        self.points.bounds()
    }

    /// Check the mesh invariants
    pub fn validate(&self) -> Result<()> {
        self.cells.validate(self.point_count())?;
        self.point_data.validate(self.point_count())?;
        self.cell_data.validate(self.cell_count())?;
        Ok(())
    }

    /// Release over-allocated capacity in every buffer
    pub fn shrink_to_fit(&mut self) {
        self.points.shrink_to_fit();
        self.cells.shrink_to_fit();
        self.point_data.shrink_to_fit();
        self.cell_data.shrink_to_fit();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(Precision::Double)
    }
}
