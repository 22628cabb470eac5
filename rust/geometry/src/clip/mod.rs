// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element clipping against the zero level of a scalar field
//!
//! [`ElementClipper::clip`] keeps the part of an element where the scalar is
//! `>= 0`. The emitted sub-cells reference [`CutPoint`]s collected per
//! element: original input points, or crossings on edges whose end points
//! lie on opposite sides. Resolving those to output ids is left to the
//! caller, usually through [`crate::PointMerger`].

mod polyhedron;
mod tables;


use self::tables::{
    hexahedron_tetras, pyramid_tetras, wedge_tetras, Case, Token, LINE_CASES, QUAD_CASES,
    QUAD_SEPARATED_10, QUAD_SEPARATED_5, TETRA_CASES, TRIANGLE_CASES,
};
use nalgebra::Point3;
use smallvec::SmallVec;
use xfem_clip_core::{CellKind, CellRef, PointBuffer};

/// Point ids of one emitted sub-cell
pub type CellPoints = SmallVec<[usize; 8]>;

/// Inside test shared by every case table; zero counts as inside
#[inline]
pub fn is_inside(s: f64) -> bool {
    s >= 0.0
}

/// A point of a clipped element, before merging
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutPoint {
    /// Input point, reused as is
    Original(usize),
    /// Point at parameter `t` from input point `p0` towards `p1`, `p0 < p1`
    Edge { p0: usize, p1: usize, t: f64 },
}

impl CutPoint {
    /// Crossing of the zero level on the edge between input points `a` and
    /// `b`, whose scalars `sa` and `sb` lie on opposite sides
    ///
    /// Always parameterized from the lower id, so elements sharing the edge
    /// compute the same point.
    pub fn crossing(a: usize, sa: f64, b: usize, sb: f64) -> Self {
        if a <= b {
            CutPoint::Edge {
                p0: a,
                p1: b,
                t: sa / (sa - sb),
            }
        } else {
            CutPoint::Edge {
                p0: b,
                p1: a,
                t: sb / (sb - sa),
            }
        }
    }

    /// Coordinates, computed from the input points
    pub fn position(&self, points: &PointBuffer) -> Point3<f64> {
        match *self {
            CutPoint::Original(id) => Point3::from(points.get(id)),
            CutPoint::Edge { p0, p1, t } => {
                let a = Point3::from(points.get(p0));
                let b = Point3::from(points.get(p1));
                Point3::from(a.coords * (1.0 - t) + b.coords * t)
            }
        }
    }

    fn same_location(&self, other: &CutPoint) -> bool {
        match (self, other) {
            (CutPoint::Original(a), CutPoint::Original(b)) => a == b,
            (CutPoint::Edge { p0, p1, .. }, CutPoint::Edge { p0: q0, p1: q1, .. }) => {
                p0 == q0 && p1 == q1
            }
            _ => false,
        }
    }
}

/// What happened to an element as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Fully outside, nothing emitted
    #[default]
    Discarded,
    /// Fully inside, emitted unchanged
    Retained,
    /// Cut by the zero level
    Clipped,
}

/// Sub-cell emitted by the clipper
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedCell {
    pub kind: CellKind,
    /// Indices into [`ClipOutput::points`]
    pub points: CellPoints,
    /// Face loops of a polyhedron, indexed like `points`
    pub faces: Option<Vec<Vec<usize>>>,
}

/// Result of clipping one element
///
/// Points are deduplicated within the element.
#[derive(Debug, Default)]
pub struct ClipOutput {
    points: Vec<CutPoint>,
    cells: Vec<ClippedCell>,
    disposition: Disposition,
}

impl ClipOutput {
    pub fn points(&self) -> &[CutPoint] {
        &self.points
    }

    pub fn cells(&self) -> &[ClippedCell] {
        &self.cells
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    fn clear(&mut self) {
        self.points.clear();
        self.cells.clear();
        self.disposition = Disposition::Discarded;
    }

    fn add_point(&mut self, point: CutPoint) -> usize {
        match self.points.iter().position(|p| p.same_location(&point)) {
            Some(index) => index,
            None => {
                self.points.push(point);
                self.points.len() - 1
            }
        }
    }

    fn original(&mut self, id: usize) -> usize {
        self.add_point(CutPoint::Original(id))
    }

    fn crossing(&mut self, a: usize, sa: f64, b: usize, sb: f64) -> usize {
        self.add_point(CutPoint::crossing(a, sa, b, sb))
    }

    /// Resolve a table token against the local vertices `verts` of the
    /// element
    fn resolve(&mut self, token: Token, verts: &[usize], ids: &[usize], scalars: &[f64]) -> usize {
        match token {
            Token::Vertex(i) => self.original(ids[verts[i as usize]]),
            Token::Edge(i, j) => {
                let (a, b) = (verts[i as usize], verts[j as usize]);
                self.crossing(ids[a], scalars[a], ids[b], scalars[b])
            }
        }
    }

    fn push(&mut self, kind: CellKind, points: CellPoints) {
        self.cells.push(ClippedCell {
            kind,
            points,
            faces: None,
        });
    }
}

/// Clips elements one at a time, reusing its output buffers
#[derive(Debug, Default)]
pub struct ElementClipper {
    output: ClipOutput,
}

impl ElementClipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clip `cell`, given one scalar per point in element order
    pub fn clip(&mut self, cell: CellRef<'_>, scalars: &[f64]) -> &ClipOutput {
        debug_assert_eq!(cell.point_ids.len(), scalars.len());
        self.output.clear();

        let inside = scalars.iter().filter(|&&s| is_inside(s)).count();
        if inside == scalars.len() {
            self.retain(cell);
            self.output.disposition = Disposition::Retained;
        } else if inside > 0 {
            self.cut(cell, scalars);
            self.output.disposition = Disposition::Clipped;
        }
        &self.output
    }

    fn retain(&mut self, cell: CellRef<'_>) {
        let out = &mut self.output;
        let points: CellPoints = cell.point_ids.iter().map(|&id| out.original(id)).collect();
        let faces = cell.faces.map(|faces| {
            faces
                .iter()
                .map(|face| face.iter().map(|&id| out.original(id)).collect())
                .collect()
        });
        out.cells.push(ClippedCell {
            kind: cell.kind,
            points,
            faces,
        });
    }

    fn cut(&mut self, cell: CellRef<'_>, scalars: &[f64]) {
        let ids = cell.point_ids;
        match cell.kind {
            CellKind::Vertex | CellKind::PolyVertex => {
                for (&id, &s) in ids.iter().zip(scalars) {
                    if is_inside(s) {
                        let point = self.output.original(id);
                        self.output.push(CellKind::Vertex, smallvec::smallvec![point]);
                    }
                }
            }
            CellKind::Line | CellKind::PolyLine => {
                for k in 1..ids.len() {
                    self.apply(&LINE_CASES, &[k - 1, k], ids, scalars, 1);
                }
            }
            CellKind::Triangle => self.apply(&TRIANGLE_CASES, &[0, 1, 2], ids, scalars, 2),
            CellKind::Quad => self.cut_quad(ids, scalars),
            CellKind::Polygon => {
                let verts: CellPoints = (0..ids.len()).collect();
                let loop_ = self.clip_loop(&verts, ids, scalars);
                if loop_.len() >= 3 {
                    let points: CellPoints = loop_.iter().map(|&(p, _)| p).collect();
                    let kind = CellKind::from_dimension_and_count(2, points.len());
                    self.output.push(kind, points);
                }
            }
            CellKind::Tetra => self.apply(&TETRA_CASES, &[0, 1, 2, 3], ids, scalars, 3),
            CellKind::Wedge => self.apply_tetras(&wedge_tetras(ids), ids, scalars),
            CellKind::Pyramid => self.apply_tetras(&pyramid_tetras(ids), ids, scalars),
            CellKind::Hexahedron => self.apply_tetras(&hexahedron_tetras(ids), ids, scalars),
            CellKind::Polyhedron => {
                if let Some(faces) = cell.faces {
                    self.cut_polyhedron(ids, faces, scalars);
                }
            }
        }
    }

    fn cut_quad(&mut self, ids: &[usize], scalars: &[f64]) {
        let mask = inside_mask(&[0, 1, 2, 3], scalars);
        // Saddles stay connected when the cell center is inside
        let center = scalars.iter().sum::<f64>() / 4.0;
        let case = match mask {
            5 if !is_inside(center) => QUAD_SEPARATED_5,
            10 if !is_inside(center) => QUAD_SEPARATED_10,
            _ => QUAD_CASES[mask],
        };
        self.emit(case, &[0, 1, 2, 3], ids, scalars, 2);
    }

    fn apply(
        &mut self,
        table: &[Case],
        verts: &[usize],
        ids: &[usize],
        scalars: &[f64],
        dimension: u8,
    ) {
        let mask = inside_mask(verts, scalars);
        self.emit(table[mask], verts, ids, scalars, dimension);
    }

    /// Clip each tetrahedron of a split volumetric element on its own
    fn apply_tetras(&mut self, tetras: &[[usize; 4]], ids: &[usize], scalars: &[f64]) {
        for tetra in tetras {
            self.apply(&TETRA_CASES, tetra, ids, scalars, 3);
        }
    }

    fn emit(&mut self, case: Case, verts: &[usize], ids: &[usize], scalars: &[f64], dimension: u8) {
        for shape in case {
            let points: CellPoints = shape
                .iter()
                .map(|&token| self.output.resolve(token, verts, ids, scalars))
                .collect();
            let kind = CellKind::from_dimension_and_count(dimension, points.len());
            self.output.push(kind, points);
        }
    }

    /// Sutherland-Hodgman walk over one closed loop of local vertices
    ///
    /// Returns the kept loop, each entry flagged when it is a crossing.
    fn clip_loop(
        &mut self,
        verts: &[usize],
        ids: &[usize],
        scalars: &[f64],
    ) -> SmallVec<[(usize, bool); 8]> {
        let mut kept = SmallVec::new();
        for (k, &a) in verts.iter().enumerate() {
            let b = verts[(k + 1) % verts.len()];
            let (sa, sb) = (scalars[a], scalars[b]);
            if is_inside(sa) {
                kept.push((self.output.original(ids[a]), false));
            }
            if is_inside(sa) != is_inside(sb) {
                kept.push((self.output.crossing(ids[a], sa, ids[b], sb), true));
            }
        }
        kept
    }
}

fn inside_mask(verts: &[usize], scalars: &[f64]) -> usize {
    verts
        .iter()
        .enumerate()
        .filter(|&(_, &v)| is_inside(scalars[v]))
        .fold(0, |mask, (bit, _)| mask | 1 << bit)
}
