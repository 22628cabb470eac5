// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyhedron clipping: each face is clipped as a polygon, then the cut
//! segments are chained into cap faces closing the kept part.

use super::{ClippedCell, ElementClipper};
use smallvec::SmallVec;
use xfem_clip_core::CellKind;

impl ElementClipper {
    pub(super) fn cut_polyhedron(&mut self, ids: &[usize], faces: &[Vec<usize>], scalars: &[f64]) {
        let mut kept_faces: Vec<Vec<usize>> = Vec::with_capacity(faces.len() + 1);
        // Directed cap edges (from, to): the reverse of each face's exit to
        // entry crossing pair
        let mut cap_edges: SmallVec<[(usize, usize); 16]> = SmallVec::new();

        for face in faces {
            let verts: SmallVec<[usize; 8]> = face
                .iter()
                .filter_map(|id| ids.iter().position(|x| x == id))
                .collect();
            if verts.len() < 3 {
                continue;
            }
            let kept = self.clip_loop(&verts, ids, scalars);
            if kept.len() < 3 {
                continue;
            }
            for (k, &(exit, exit_is_cut)) in kept.iter().enumerate() {
                let (entry, entry_is_cut) = kept[(k + 1) % kept.len()];
                if exit_is_cut && entry_is_cut {
                    cap_edges.push((entry, exit));
                }
            }
            kept_faces.push(kept.iter().map(|&(p, _)| p).collect());
        }

        chain_caps(&cap_edges, &mut kept_faces);
        if kept_faces.len() < 4 {
            return;
        }

        let mut points: SmallVec<[usize; 8]> = SmallVec::new();
        for &p in kept_faces.iter().flatten() {
            if !points.contains(&p) {
                points.push(p);
            }
        }
        self.output.cells.push(ClippedCell {
            kind: CellKind::Polyhedron,
            points,
            faces: Some(kept_faces),
        });
    }
}

/// Follow directed cap edges into closed loops, in the order the edges were
/// found; open chains left by non-manifold input are kept when they still
/// form a polygon
fn chain_caps(edges: &[(usize, usize)], faces: &mut Vec<Vec<usize>>) {
    let mut used: SmallVec<[bool; 16]> = smallvec::smallvec![false; edges.len()];
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        let first = edges[start].0;
        let mut loop_ = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            loop_.push(edges[current].0);
            let next = edges[current].1;
            if next == first {
                break;
            }
            match (0..edges.len()).find(|&k| !used[k] && edges[k].0 == next) {
                Some(k) => current = k,
                None => break,
            }
        }
        if loop_.len() >= 3 {
            faces.push(loop_);
        }
    }
}
