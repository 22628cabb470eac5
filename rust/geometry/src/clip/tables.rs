// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clip-case tables
//!
//! Tables are indexed by the inside mask of an element, bit `i` set when
//! local vertex `i` is inside. Each entry lists the sub-cells to emit, each
//! sub-cell a list of tokens naming either a kept vertex or the crossing on
//! an edge. Sub-cells keep the orientation of their parent: volumetric
//! entries have the same handedness as the input tetrahedron, wedges are
//! listed bottom triangle first.

/// One point of an emitted sub-cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    /// Local vertex, kept as is
    Vertex(u8),
    /// Crossing on the edge between two local vertices
    Edge(u8, u8),
}

use self::Token::{Edge as E, Vertex as V};

/// Sub-cells emitted for one inside mask
pub(crate) type Case = &'static [&'static [Token]];

pub(crate) const LINE_CASES: [Case; 4] = [
    &[],
    &[&[V(0), E(0, 1)]],
    &[&[E(0, 1), V(1)]],
    &[&[V(0), V(1)]],
];

pub(crate) const TRIANGLE_CASES: [Case; 8] = [
    &[],
    &[&[V(0), E(0, 1), E(0, 2)]],
    &[&[E(0, 1), V(1), E(1, 2)]],
    &[&[V(0), V(1), E(1, 2), E(0, 2)]],
    &[&[E(1, 2), V(2), E(0, 2)]],
    &[&[V(0), E(0, 1), E(1, 2), V(2)]],
    &[&[E(0, 1), V(1), V(2), E(0, 2)]],
    &[&[V(0), V(1), V(2)]],
];

/// Quad cases; the saddle masks 5 and 10 hold the connected variant
pub(crate) const QUAD_CASES: [Case; 16] = [
    &[],
    &[&[V(0), E(0, 1), E(3, 0)]],
    &[&[E(0, 1), V(1), E(1, 2)]],
    &[&[V(0), V(1), E(1, 2), E(3, 0)]],
    &[&[E(1, 2), V(2), E(2, 3)]],
    &[&[V(0), E(0, 1), E(1, 2), V(2), E(2, 3), E(3, 0)]],
    &[&[E(0, 1), V(1), V(2), E(2, 3)]],
    &[&[V(0), V(1), V(2), E(2, 3), E(3, 0)]],
    &[&[E(2, 3), V(3), E(3, 0)]],
    &[&[V(0), E(0, 1), E(2, 3), V(3)]],
    &[&[E(0, 1), V(1), E(1, 2), E(2, 3), V(3), E(3, 0)]],
    &[&[V(0), V(1), E(1, 2), E(2, 3), V(3)]],
    &[&[E(1, 2), V(2), V(3), E(3, 0)]],
    &[&[V(0), E(0, 1), E(1, 2), V(2), V(3)]],
    &[&[E(0, 1), V(1), V(2), V(3), E(3, 0)]],
    &[&[V(0), V(1), V(2), V(3)]],
];

/// Saddle mask 5 with the two inside corners kept apart
pub(crate) const QUAD_SEPARATED_5: Case = &[
    &[V(0), E(0, 1), E(3, 0)],
    &[E(1, 2), V(2), E(2, 3)],
];

/// Saddle mask 10 with the two inside corners kept apart
pub(crate) const QUAD_SEPARATED_10: Case = &[
    &[E(0, 1), V(1), E(1, 2)],
    &[E(2, 3), V(3), E(3, 0)],
];

/// Tetrahedron cases: one inside vertex gives a tetrahedron, two or three
/// give a wedge
pub(crate) const TETRA_CASES: [Case; 16] = [
    &[],
    &[&[V(0), E(0, 1), E(0, 2), E(0, 3)]],
    &[&[E(0, 1), V(1), E(1, 2), E(1, 3)]],
    &[&[V(0), E(0, 2), E(0, 3), V(1), E(1, 2), E(1, 3)]],
    &[&[E(0, 2), E(1, 2), V(2), E(2, 3)]],
    &[&[V(0), E(0, 3), E(0, 1), V(2), E(2, 3), E(1, 2)]],
    &[&[V(1), E(0, 1), E(1, 3), V(2), E(0, 2), E(2, 3)]],
    &[&[V(0), V(1), V(2), E(0, 3), E(1, 3), E(2, 3)]],
    &[&[E(0, 3), E(1, 3), E(2, 3), V(3)]],
    &[&[V(0), E(0, 1), E(0, 2), V(3), E(1, 3), E(2, 3)]],
    &[&[V(1), E(1, 2), E(0, 1), V(3), E(2, 3), E(0, 3)]],
    &[&[V(0), V(3), V(1), E(0, 2), E(2, 3), E(1, 2)]],
    &[&[V(2), E(0, 2), E(1, 2), V(3), E(0, 3), E(1, 3)]],
    &[&[V(0), V(2), V(3), E(0, 1), E(1, 2), E(1, 3)]],
    &[&[V(1), V(3), V(2), E(0, 1), E(0, 3), E(0, 2)]],
    &[&[V(0), V(1), V(2), V(3)]],
];

/// Wedge vertex permutations bringing local vertex `i` to position 0 while
/// preserving orientation
const WEDGE_ROTATIONS: [[usize; 6]; 6] = [
    [0, 1, 2, 3, 4, 5],
    [1, 2, 0, 4, 5, 3],
    [2, 0, 1, 5, 3, 4],
    [3, 5, 4, 0, 2, 1],
    [4, 3, 5, 1, 0, 2],
    [5, 4, 3, 2, 1, 0],
];

/// Split a wedge into three positively oriented tetrahedra
///
/// Each quad face is cut along the diagonal through its lowest global point
/// id, so two wedges sharing a quad face split it the same way.
pub(crate) fn wedge_tetras(ids: &[usize]) -> [[usize; 4]; 3] {
    let lowest = (0..6).min_by_key(|&i| ids[i]).unwrap_or(0);
    let r = WEDGE_ROTATIONS[lowest];
    if ids[r[1]].min(ids[r[5]]) < ids[r[2]].min(ids[r[4]]) {
        [
            [r[0], r[1], r[2], r[5]],
            [r[0], r[1], r[5], r[4]],
            [r[0], r[4], r[5], r[3]],
        ]
    } else {
        [
            [r[0], r[1], r[2], r[4]],
            [r[0], r[4], r[2], r[5]],
            [r[0], r[4], r[5], r[3]],
        ]
    }
}

/// Hexahedron faces as outward loops of local vertices
const HEXAHEDRON_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// Outward base loop of a pyramid; the apex is local vertex 4
const PYRAMID_BASE: [usize; 4] = [0, 3, 2, 1];

/// Triangles of an outward quad face, cut along the diagonal through its
/// lowest global point id
fn split_quad(face: [usize; 4], ids: &[usize]) -> [[usize; 3]; 2] {
    let [a, b, c, d] = face;
    if ids[a].min(ids[c]) < ids[b].min(ids[d]) {
        [[a, b, c], [a, c, d]]
    } else {
        [[a, b, d], [b, c, d]]
    }
}

/// Split a hexahedron into six positively oriented tetrahedra
///
/// The tetrahedra fan out from the vertex with the lowest global id over the
/// three faces away from it. The faces around that vertex are cut through
/// it, which is their lowest id as well, so every face follows the same
/// diagonal rule as [`wedge_tetras`].
pub(crate) fn hexahedron_tetras(ids: &[usize]) -> [[usize; 4]; 6] {
    let apex = (0..8).min_by_key(|&i| ids[i]).unwrap_or(0);
    let mut tetras = [[apex; 4]; 6];
    let triangles = HEXAHEDRON_FACES
        .into_iter()
        .filter(|face| !face.contains(&apex))
        .flat_map(|face| split_quad(face, ids));
    for (tetra, [a, b, c]) in tetras.iter_mut().zip(triangles) {
        *tetra = [a, c, b, apex];
    }
    tetras
}

/// Split a pyramid into two positively oriented tetrahedra over its base
pub(crate) fn pyramid_tetras(ids: &[usize]) -> [[usize; 4]; 2] {
    split_quad(PYRAMID_BASE, ids).map(|[a, b, c]| [a, c, b, 4])
}
