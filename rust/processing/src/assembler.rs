// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output cell assembly.
//!
//! Clipped sub-cells arrive with merged point ids, so a sub-cell whose
//! crossings landed on the same output point may have collapsed. Those are
//! cleaned up here: repeated ids are removed, the kind is re-derived from
//! what is left, and cells that no longer span their dimension are dropped.
//! A wedge left with four distinct points is emitted as the tetrahedron it
//! has become.

use smallvec::SmallVec;
use xfem_clip_core::{AttributeSet, CellArray, CellKind, Mesh, PointBuffer};
use xfem_clip_geometry::interpolate::{allocate_like, copy_tuple};

/// Output capacity reserved for `cells` input elements: rounded down to a
/// multiple of 1024, never below 1024
pub fn estimated_capacity(cells: usize) -> usize {
    (cells / 1024 * 1024).max(1024)
}

type Ids = SmallVec<[usize; 8]>;

/// Split of a wedge into tetrahedra of the same orientation
const WEDGE_PIECES: [[usize; 4]; 3] = [[0, 1, 2, 5], [0, 1, 5, 4], [0, 4, 5, 3]];

/// Collects output cells and their attribute tuples
#[derive(Debug, Default)]
pub struct MeshAssembler {
    cells: CellArray,
    cell_data: AttributeSet,
    dropped: usize,
}

impl MeshAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a run whose cell arrays follow `cell_schema`
    pub fn initialize(&mut self, cell_schema: &AttributeSet, capacity: usize) {
        self.cells = CellArray::with_capacity(capacity, capacity * 4);
        self.cell_data = allocate_like(cell_schema, capacity);
        self.dropped = 0;
    }

    /// Append one cell built from input element `parent`.
    ///
    /// With `clean` set, collapsed ids are removed first and the cell is
    /// dropped when it degenerated. Returns whether the cell was emitted.
    pub fn push(
        &mut self,
        kind: CellKind,
        ids: &[usize],
        faces: Option<Vec<Vec<usize>>>,
        parent: usize,
        input_cell_data: &AttributeSet,
        clean: bool,
    ) -> bool {
        let emitted = if !clean {
            match faces {
                Some(faces) if kind == CellKind::Polyhedron => {
                    self.cells.push_polyhedron(ids, faces);
                }
                _ => {
                    self.cells.push(kind, ids);
                }
            }
            true
        } else {
            self.push_cleaned(kind, ids, faces)
        };

        if emitted {
            copy_tuple(input_cell_data, parent, &mut self.cell_data);
        } else {
            self.dropped += 1;
        }
        emitted
    }

    fn push_cleaned(&mut self, kind: CellKind, ids: &[usize], faces: Option<Vec<Vec<usize>>>) -> bool {
        match kind.dimension() {
            dimension @ 0..=2 => {
                let cleaned = dedup_consecutive(ids, dimension == 2);
                let minimum = usize::from(dimension) + 1;
                if cleaned.len() < minimum {
                    return false;
                }
                let kind = CellKind::from_dimension_and_count(dimension, cleaned.len());
                self.cells.push(kind, &cleaned);
                true
            }
            _ => match kind {
                CellKind::Wedge => match distinct_count(ids) {
                    0..=3 => false,
                    4 => match collapsed_wedge(ids) {
                        Some(tetra) => {
                            self.cells.push(CellKind::Tetra, &tetra);
                            true
                        }
                        None => false,
                    },
                    _ => {
                        self.cells.push(kind, ids);
                        true
                    }
                },
                CellKind::Tetra | CellKind::Pyramid | CellKind::Hexahedron => {
                    if distinct_count(ids) < 4 {
                        return false;
                    }
                    self.cells.push(kind, ids);
                    true
                }
                _ => {
                    let Some(faces) = faces else {
                        return false;
                    };
                    let faces: Vec<Vec<usize>> = faces
                        .into_iter()
                        .map(|face| dedup_consecutive(&face, true))
                        .filter(|face| face.len() >= 3)
                        .map(|face| face.to_vec())
                        .collect();
                    if faces.len() < 4 {
                        return false;
                    }
                    let mut points = Ids::new();
                    for &p in faces.iter().flatten() {
                        if !points.contains(&p) {
                            points.push(p);
                        }
                    }
                    if points.len() < 4 {
                        return false;
                    }
                    self.cells.push_polyhedron(&points, faces);
                    true
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sub-cells dropped as degenerate since [`MeshAssembler::initialize`]
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Combine the assembled cells with the merged points into the output mesh
    pub fn finish(&mut self, points: PointBuffer, point_data: AttributeSet) -> Mesh {
        let mut mesh = Mesh {
            points,
            cells: std::mem::take(&mut self.cells),
            point_data,
            cell_data: std::mem::take(&mut self.cell_data),
        };
        mesh.shrink_to_fit();
        mesh
    }
}

/// Remove consecutive repeats; with `closed`, the last id is also compared
/// with the first
fn dedup_consecutive(ids: &[usize], closed: bool) -> Ids {
    let mut out = Ids::new();
    for &id in ids {
        if out.last() != Some(&id) {
            out.push(id);
        }
    }
    if closed {
        while out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
    }
    out
}

fn distinct_count(ids: &[usize]) -> usize {
    ids.iter()
        .enumerate()
        .filter(|&(i, id)| !ids[..i].contains(id))
        .count()
}

/// The tetrahedron left of a wedge whose six ids name four points, or
/// `None` when the wedge flattened instead
fn collapsed_wedge(ids: &[usize]) -> Option<[usize; 4]> {
    if ids.len() != 6 {
        return None;
    }
    WEDGE_PIECES
        .iter()
        .map(|piece| piece.map(|i| ids[i]))
        .find(|tetra| distinct_count(tetra) == 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfem_clip_core::{DataArray, Precision};

    fn schema() -> AttributeSet {
        let mut data = AttributeSet::new();
        data.add(DataArray::scalars("material", vec![7.0, 8.0]));
        data
    }

    #[test]
    fn test_estimated_capacity() {
        assert_eq!(estimated_capacity(0), 1024);
        assert_eq!(estimated_capacity(1500), 1024);
        assert_eq!(estimated_capacity(5000), 4096);
    }

    #[test]
    fn test_dedup_consecutive() {
        assert_eq!(dedup_consecutive(&[1, 1, 2, 3, 3], false).as_slice(), &[1, 2, 3]);
        assert_eq!(dedup_consecutive(&[1, 2, 3, 1], true).as_slice(), &[1, 2, 3]);
        assert_eq!(dedup_consecutive(&[1, 2, 3, 1], false).as_slice(), &[1, 2, 3, 1]);
    }

    #[test]
    fn test_collapsed_quad_becomes_triangle() {
        let input = schema();
        let mut assembler = MeshAssembler::new();
        assembler.initialize(&input, 16);

        assert!(assembler.push(CellKind::Quad, &[0, 1, 1, 2], None, 1, &input, true));
        assert_eq!(assembler.cells.kind(0), CellKind::Triangle);
        assert_eq!(assembler.cells.point_ids(0), &[0, 1, 2]);
        assert_eq!(assembler.cell_data.get("material").unwrap().component(0, 0), 8.0);
    }

    #[test]
    fn test_degenerate_cells_dropped() {
        let input = schema();
        let mut assembler = MeshAssembler::new();
        assembler.initialize(&input, 16);

        assert!(!assembler.push(CellKind::Line, &[4, 4], None, 0, &input, true));
        assert!(!assembler.push(CellKind::Triangle, &[1, 2, 1], None, 0, &input, true));
        assert!(!assembler.push(CellKind::Tetra, &[0, 1, 2, 2], None, 0, &input, true));
        assert!(!assembler.push(CellKind::Wedge, &[0, 1, 2, 0, 1, 2], None, 0, &input, true));
        // Two side edges collapsed, flat between two segments
        assert!(!assembler.push(CellKind::Wedge, &[0, 0, 1, 2, 2, 3], None, 0, &input, true));

        assert!(assembler.is_empty());
        assert_eq!(assembler.dropped_count(), 5);
        assert_eq!(assembler.cell_data.get("material").unwrap().tuple_count(), 0);
    }

    #[test]
    fn test_collapsed_wedge_becomes_tetra() {
        let input = schema();
        let mut assembler = MeshAssembler::new();
        assembler.initialize(&input, 16);

        // Two side edges welded shut
        assert!(assembler.push(CellKind::Wedge, &[0, 1, 2, 3, 1, 2], None, 1, &input, true));
        assert_eq!(assembler.cells.kind(0), CellKind::Tetra);
        assert_eq!(assembler.cells.point_ids(0), &[0, 1, 2, 3]);

        // Bottom triangle shrunk to a point
        assert!(assembler.push(CellKind::Wedge, &[0, 0, 0, 1, 2, 3], None, 1, &input, true));
        assert_eq!(assembler.cells.kind(1), CellKind::Tetra);
        assert_eq!(assembler.cells.point_ids(1), &[0, 2, 3, 1]);

        // One welded side edge leaves a wedge with five points
        assert!(assembler.push(CellKind::Wedge, &[0, 1, 2, 3, 1, 5], None, 1, &input, true));
        assert_eq!(assembler.cells.kind(2), CellKind::Wedge);

        assert_eq!(assembler.dropped_count(), 0);
        assert_eq!(assembler.cell_data.get("material").unwrap().component(1, 0), 8.0);
    }

    #[test]
    fn test_unclean_cells_kept_verbatim() {
        let input = schema();
        let mut assembler = MeshAssembler::new();
        assembler.initialize(&input, 16);

        assert!(assembler.push(CellKind::Tetra, &[0, 1, 2, 2], None, 0, &input, false));
        assert_eq!(assembler.cells.point_ids(0), &[0, 1, 2, 2]);
        assert_eq!(assembler.dropped_count(), 0);
    }

    #[test]
    fn test_polyhedron_faces_cleaned() {
        let input = schema();
        let mut assembler = MeshAssembler::new();
        assembler.initialize(&input, 16);

        // Tetrahedron faces, one with a repeated id
        let faces = vec![vec![0, 2, 1, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]];
        assert!(assembler.push(CellKind::Polyhedron, &[0, 1, 2, 3], Some(faces), 0, &input, true));
        assert_eq!(assembler.cells.faces(0).unwrap()[0], vec![0, 2, 1]);

        // Collapsed to a flat pair of faces
        let flat = vec![vec![0, 1, 2], vec![0, 2, 1], vec![0, 0, 1], vec![2, 2, 2]];
        assert!(!assembler.push(CellKind::Polyhedron, &[0, 1, 2], Some(flat), 0, &input, true));
    }

    #[test]
    fn test_finish_builds_mesh() {
        let input = schema();
        let mut assembler = MeshAssembler::new();
        assembler.initialize(&input, 16);
        assembler.push(CellKind::Triangle, &[0, 1, 2], None, 0, &input, false);

        let mut points = PointBuffer::new(Precision::Single);
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            points.push(p);
        }
        let mesh = assembler.finish(points, AttributeSet::new());
        assert_eq!(mesh.cell_count(), 1);
        assert_eq!(mesh.points.precision(), Precision::Single);
        assert!(mesh.validate().is_ok());
        assert!(assembler.is_empty());
    }
}
