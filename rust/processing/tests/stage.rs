// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end runs of the clip stage

use approx::assert_relative_eq;
use xfem_clip_core::{CellKind, DataArray, Mesh, Precision};
use xfem_clip_geometry::{ExactLocator, Point3, CUT_NORMAL_ARRAY, CUT_ORIGIN_ARRAY};
use xfem_clip_processing::{
    CancellationToken, ClipConfig, ClipStage, MergeTolerance, OutputPrecision, RunControl,
    StageState,
};

const UNIT_TETRA: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

fn tetra() -> Mesh {
    let mut mesh = Mesh::default();
    mesh.add_points(&UNIT_TETRA);
    mesh.add_cell(CellKind::Tetra, &[0, 1, 2, 3]);
    mesh.point_data
        .add(DataArray::scalars("temperature", vec![0.0, 10.0, 20.0, 30.0]));
    mesh.cell_data.add(DataArray::int("material", 1, vec![7]));
    mesh
}

/// Same cut plane on every element; the stored normal faces the removed side
fn with_plane(mut mesh: Mesh, origin: [f64; 3], normal: [f64; 3]) -> Mesh {
    let n = mesh.cell_count();
    mesh.cell_data
        .add(DataArray::vectors(CUT_ORIGIN_ARRAY, &vec![origin; n]));
    mesh.cell_data
        .add(DataArray::vectors(CUT_NORMAL_ARRAY, &vec![normal; n]));
    mesh
}

fn with_signed_distances(mut mesh: Mesh, values: [f64; 4]) -> Mesh {
    let n = mesh.cell_count();
    for (k, value) in values.iter().enumerate() {
        mesh.cell_data.add(DataArray::scalars(
            format!("xfem_signed_dist{}", k),
            vec![*value; n],
        ));
    }
    mesh
}

/// `n`^3 unit cubes, each split into six tetrahedra around its main diagonal
fn kuhn_grid(n: usize) -> Mesh {
    let mut mesh = Mesh::default();
    let side = n + 1;
    let mut temperature = Vec::new();
    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                let p = [i as f64 * 0.5, j as f64 * 0.5, k as f64 * 0.5];
                mesh.add_point(p);
                temperature.push(p[0] + 2.0 * p[1] + 3.0 * p[2]);
            }
        }
    }
    let id = |i: usize, j: usize, k: usize| i + side * (j + side * k);
    let paths = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                for path in paths {
                    let mut corner = [i, j, k];
                    let mut ids = vec![id(i, j, k)];
                    for axis in path {
                        corner[axis] += 1;
                        ids.push(id(corner[0], corner[1], corner[2]));
                    }
                    mesh.add_cell(CellKind::Tetra, &ids);
                }
            }
        }
    }
    mesh.point_data.add(DataArray::scalars("temperature", temperature));
    let cells = mesh.cell_count();
    mesh.cell_data
        .add(DataArray::scalars("element", (0..cells).map(|c| c as f64).collect()));
    with_plane(mesh, [0.37, 0.41, 0.53], [1.0, 1.0, 1.0])
}

/// Two unit cubes sharing the face x = 1, with scrambled point ids
fn hexahedron_pair() -> Mesh {
    const IDS: [usize; 12] = [7, 2, 10, 4, 11, 0, 9, 5, 1, 8, 3, 6];
    let grid = |i: usize, j: usize, k: usize| IDS[i + 3 * (j + 2 * k)];

    let mut coordinates = [[0.0; 3]; 12];
    for k in 0..2 {
        for j in 0..2 {
            for i in 0..3 {
                coordinates[grid(i, j, k)] = [i as f64, j as f64, k as f64];
            }
        }
    }
    let mut mesh = Mesh::default();
    mesh.add_points(&coordinates);
    for i in 0..2 {
        let corners = [
            grid(i, 0, 0),
            grid(i + 1, 0, 0),
            grid(i + 1, 1, 0),
            grid(i, 1, 0),
            grid(i, 0, 1),
            grid(i + 1, 0, 1),
            grid(i + 1, 1, 1),
            grid(i, 1, 1),
        ];
        mesh.add_cell(CellKind::Hexahedron, &corners);
    }
    mesh.cell_data
        .add(DataArray::scalars("element", vec![0.0, 1.0]));
    mesh
}

/// Faces of an emitted tetra or wedge, as sorted point ids
fn boundary_faces(mesh: &Mesh, cell: usize) -> Vec<Vec<usize>> {
    let ids = mesh.cells.point_ids(cell);
    const TETRA: &[&[usize]] = &[&[0, 1, 2], &[0, 1, 3], &[0, 2, 3], &[1, 2, 3]];
    const WEDGE: &[&[usize]] = &[&[0, 1, 2], &[3, 4, 5], &[0, 1, 4, 3], &[1, 2, 5, 4], &[2, 0, 3, 5]];
    let local = match mesh.cells.kind(cell) {
        CellKind::Tetra => TETRA,
        CellKind::Wedge => WEDGE,
        other => panic!("unexpected {other}"),
    };
    local
        .iter()
        .map(|face| {
            let mut face: Vec<usize> = face.iter().map(|&k| ids[k]).collect();
            face.sort_unstable();
            face.dedup();
            face
        })
        .collect()
}

fn cell_volume(mesh: &Mesh, cell: usize) -> f64 {
    let ids = mesh.cells.point_ids(cell);
    let p: Vec<Point3<f64>> = ids.iter().map(|&id| point(mesh, id)).collect();
    match mesh.cells.kind(cell) {
        CellKind::Tetra => tetra_volume(&p[0], &p[1], &p[2], &p[3]),
        CellKind::Wedge => {
            tetra_volume(&p[0], &p[1], &p[2], &p[5])
                + tetra_volume(&p[0], &p[1], &p[5], &p[4])
                + tetra_volume(&p[0], &p[4], &p[5], &p[3])
        }
        other => panic!("unexpected {other}"),
    }
}

fn point(mesh: &Mesh, id: usize) -> Point3<f64> {
    Point3::from(mesh.points.get(id))
}

fn tetra_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    (b - a).cross(&(c - a)).dot(&(d - a)) / 6.0
}

#[test]
fn test_all_inside_element_is_unchanged() {
    let mesh = with_plane(tetra(), [5.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
    let outcome = ClipStage::default().run(&mesh);

    assert_eq!(outcome.state, StageState::Done);
    assert_eq!(outcome.mesh, mesh);
    assert_eq!(outcome.report.retained_cells, 1);
    assert_eq!(outcome.report.clipped_cells, 0);
    assert!(outcome.report.diagnostics.is_empty());
}

#[test]
fn test_all_outside_element_is_removed() {
    let mesh = with_plane(tetra(), [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
    let outcome = ClipStage::default().run(&mesh);

    assert_eq!(outcome.mesh.cell_count(), 0);
    assert_eq!(outcome.mesh.point_count(), 0);
    assert_eq!(outcome.report.discarded_cells, 1);
    // Schema survives even when nothing is emitted
    assert!(outcome.mesh.point_data.contains("temperature"));
    assert!(outcome.mesh.cell_data.contains("material"));
}

#[test]
fn test_half_space_volume() {
    let mesh = with_signed_distances(tetra(), [1.0, 1.0, -1.0, -1.0]);
    let outcome = ClipStage::default().run(&mesh);

    assert_eq!(outcome.mesh.cell_count(), 1);
    assert_eq!(outcome.mesh.cells.kind(0), CellKind::Wedge);
    let ids = outcome.mesh.cells.point_ids(0);
    let p = |i: usize| point(&outcome.mesh, ids[i]);
    let volume = tetra_volume(&p(0), &p(1), &p(2), &p(5))
        + tetra_volume(&p(0), &p(1), &p(5), &p(4))
        + tetra_volume(&p(0), &p(4), &p(5), &p(3));

    // The cut plane sits at barycentric depth t on every crossed edge; the
    // kept share of the tetrahedron is then 3t^2 - 2t^3
    let t = 1.0 / (1.0 + 1.0001);
    let expected = (3.0 * t * t - 2.0 * t * t * t) / 6.0;
    assert_relative_eq!(volume, expected, epsilon = 1e-12);
    assert_eq!(outcome.report.descriptor.as_deref(), Some("signed_distance"));
}

#[test]
fn test_crossing_attributes_follow_position() {
    let mesh = with_plane(tetra(), [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]);
    let outcome = ClipStage::default().run(&mesh);

    let out = &outcome.mesh;
    let temperature = out.point_data.get("temperature").unwrap();
    assert_eq!(temperature.tuple_count(), out.point_count());
    // Crossing on edge 0-1 blends 0 and 10 at its parameter
    let crossing = (0..out.point_count())
        .find(|&id| {
            let p = out.points.get(id);
            p[0] > 0.0 && p[1] == 0.0 && p[2] == 0.0
        })
        .unwrap();
    let x = out.points.get(crossing)[0];
    assert!(x < 0.5 && x > 0.4999);
    assert_relative_eq!(temperature.component(crossing, 0), 10.0 * x, epsilon = 1e-12);

    let material = out.cell_data.get("material").unwrap();
    assert_eq!(material.tuple_count(), out.cell_count());
    assert_eq!(material.component(0, 0), 7.0);
}

#[test]
fn test_zero_normal_passes_through() {
    let mesh = with_plane(tetra(), [0.5, 0.0, 0.0], [0.0, 0.0, 0.0]);
    let outcome = ClipStage::default().run(&mesh);

    assert_eq!(outcome.mesh, mesh);
    assert_eq!(outcome.report.uncut_degenerate_normal, 1);
    assert_eq!(outcome.report.diagnostics.len(), 1);
}

#[test]
fn test_signed_distance_on_wedge_passes_through() {
    let mut mesh = Mesh::default();
    mesh.add_points(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
    ]);
    mesh.add_cell(CellKind::Wedge, &[0, 1, 2, 3, 4, 5]);
    let mesh = with_signed_distances(mesh, [1.0, -1.0, -1.0, -1.0]);

    let outcome = ClipStage::default().run(&mesh);
    assert_eq!(outcome.mesh, mesh);
    assert_eq!(outcome.report.uncut_arity_mismatch, 1);
}

#[test]
fn test_conflicting_descriptors_rejected() {
    let mesh = with_signed_distances(
        with_plane(tetra(), [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]),
        [1.0, -1.0, -1.0, -1.0],
    );
    let mut stage = ClipStage::default();
    let outcome = stage.run(&mesh);

    assert_eq!(outcome.state, StageState::Done);
    assert_eq!(stage.state(), StageState::Done);
    assert_eq!(outcome.mesh.cell_count(), 0);
    assert_eq!(outcome.mesh.point_count(), 0);
    assert_eq!(
        outcome.report.diagnostics,
        vec!["Cannot cut by both signed distance and plane".to_string()]
    );
    assert!(outcome.report.descriptor.is_none());
    let origin = outcome.mesh.cell_data.get(CUT_ORIGIN_ARRAY).unwrap();
    assert_eq!(origin.tuple_count(), 0);
}

#[test]
fn test_missing_descriptor_rejected() {
    let outcome = ClipStage::default().run(&tetra());

    assert_eq!(outcome.mesh.cell_count(), 0);
    assert_eq!(
        outcome.report.diagnostics,
        vec!["Must provide either data to cut by signed distance or plane".to_string()]
    );
}

#[test]
fn test_invalid_config_rejected() {
    let mesh = with_plane(tetra(), [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]);
    let config = ClipConfig::default().with_progress_steps(0);
    let outcome = ClipStage::new(config).run(&mesh);

    assert_eq!(outcome.state, StageState::Done);
    assert_eq!(outcome.mesh.cell_count(), 0);
    assert_eq!(outcome.report.diagnostics.len(), 1);
    assert!(outcome.report.diagnostics[0].starts_with("Invalid configuration"));
}

#[test]
fn test_empty_input() {
    let mesh = with_plane(Mesh::default(), [0.0; 3], [1.0, 0.0, 0.0]);
    let mut progress = Vec::new();
    let outcome = {
        let mut control = RunControl::new().with_progress(|f| progress.push(f));
        ClipStage::default().execute(&mesh, &mut control)
    };

    assert_eq!(outcome.state, StageState::Done);
    assert!(outcome.mesh.is_empty());
    assert!(outcome.report.diagnostics.is_empty());
    assert_eq!(outcome.report.descriptor.as_deref(), Some("plane"));
    assert!(progress.is_empty());
}

#[test]
fn test_collapsed_tetra_dropped() {
    // Only vertex 0 is on the kept side, and exactly on the plane
    let mut mesh = Mesh::default();
    mesh.add_points(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [1.0, 0.0, 1.0],
    ]);
    mesh.add_cell(CellKind::Tetra, &[0, 1, 2, 3]);
    let mesh = with_plane(mesh, [0.0; 3], [1.0, 0.0, 0.0]);

    let outcome = ClipStage::default().run(&mesh);
    assert_eq!(outcome.report.clipped_cells, 1);
    assert_eq!(outcome.report.dropped_degenerate, 1);
    assert_eq!(outcome.report.merged_points, 3);
    assert_eq!(outcome.mesh.cell_count(), 0);
    assert!(outcome.mesh.validate().is_ok());
}

#[test]
fn test_welded_wedge_becomes_tetra() {
    // Two kept vertices sit on the cut, so the wedge welds shut along two edges
    let mesh = with_signed_distances(tetra(), [1.0, 0.0, 0.0, -1.0]);

    let outcome = ClipStage::default().run(&mesh);
    let out = &outcome.mesh;
    assert_eq!(outcome.report.clipped_cells, 1);
    assert_eq!(outcome.report.dropped_degenerate, 0);
    assert_eq!(out.cell_count(), 1);
    assert_eq!(out.cells.kind(0), CellKind::Tetra);
    assert_eq!(out.point_count(), 4);
    assert!(out.validate().is_ok());

    let ids = out.cells.point_ids(0);
    for (k, a) in ids.iter().enumerate() {
        assert!(!ids[k + 1..].contains(a));
    }
    let corners: Vec<Point3<f64>> = ids.iter().map(|&id| point(out, id)).collect();
    let volume = tetra_volume(&corners[0], &corners[1], &corners[2], &corners[3]);
    assert!(volume > 0.49 / 6.0 && volume < 0.51 / 6.0);
}

#[test]
fn test_polyhedron_cube_half() {
    let mut mesh = Mesh::default();
    mesh.add_points(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ]);
    mesh.add_polyhedron(vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![3, 7, 6, 2],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
    ]);
    let mesh = with_plane(mesh, [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]);

    let outcome = ClipStage::default().run(&mesh);
    let out = &outcome.mesh;
    assert_eq!(out.cell_count(), 1);
    assert_eq!(out.cells.kind(0), CellKind::Polyhedron);
    assert_eq!(out.cells.faces(0).unwrap().len(), 6);
    assert_eq!(out.point_count(), 8);
    assert!((0..out.point_count()).all(|id| out.points.get(id)[0] <= 0.5));
    assert!(out.validate().is_ok());
}

#[test]
fn test_grid_output_is_conforming() {
    let mesh = kuhn_grid(2);
    let outcome = ClipStage::default().run(&mesh);
    let out = &outcome.mesh;

    assert!(out.validate().is_ok());
    assert!(outcome.report.clipped_cells > 0);
    assert!(outcome.report.merged_points > 0);

    // No two output points closer than the grid resolution allows
    for a in 0..out.point_count() {
        for b in a + 1..out.point_count() {
            let d = (point(out, a) - point(out, b)).norm();
            assert!(d > 1e-9, "points {} and {} coincide", a, b);
        }
    }

    // Linear point data is reproduced exactly at crossings
    let temperature = out.point_data.get("temperature").unwrap();
    for id in 0..out.point_count() {
        let p = out.points.get(id);
        assert_relative_eq!(
            temperature.component(id, 0),
            p[0] + 2.0 * p[1] + 3.0 * p[2],
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_hexahedra_shared_face_is_conforming() {
    // The cut crosses the shared face, whose lowest id is the lowest of the
    // left element but not of the right one
    let mesh = with_plane(hexahedron_pair(), [1.0, 0.45, 0.4], [0.3, 1.0, 0.7]);
    let outcome = ClipStage::default().run(&mesh);
    let out = &outcome.mesh;

    assert_eq!(outcome.state, StageState::Done);
    assert_eq!(outcome.report.clipped_cells, 2);
    assert_eq!(outcome.report.dropped_degenerate, 0);
    assert!(outcome.report.merged_points > 0);
    assert!(out.validate().is_ok());

    let element = out.cell_data.get("element").unwrap();
    let mut shared = [Vec::new(), Vec::new()];
    for cell in 0..out.cell_count() {
        assert!(cell_volume(out, cell) > 0.0);
        let side = element.component(cell, 0) as usize;
        for face in boundary_faces(out, cell) {
            let on_shared = face.len() >= 3
                && face.iter().all(|&id| (point(out, id).x - 1.0).abs() < 1e-12);
            if on_shared {
                shared[side].push(face);
            }
        }
    }
    shared[0].sort();
    shared[1].sort();
    assert!(!shared[0].is_empty());
    assert_eq!(shared[0], shared[1]);
}

#[test]
fn test_hexahedra_halves_fill_both_cubes() {
    let origin = [1.0, 0.45, 0.4];
    let normal = [0.3, 1.0, 0.7];
    let flipped = normal.map(|v: f64| -v);

    let mut total = 0.0;
    for n in [normal, flipped] {
        let outcome = ClipStage::default().run(&with_plane(hexahedron_pair(), origin, n));
        let out = &outcome.mesh;
        total += (0..out.cell_count()).map(|c| cell_volume(out, c)).sum::<f64>();
    }
    // Scaled negatives pull each half back slightly from the cut
    assert!(total < 2.0);
    assert_relative_eq!(total, 2.0, epsilon = 1e-3);
}

#[test]
fn test_runs_are_deterministic() {
    let mesh = kuhn_grid(2);
    let first = ClipStage::default().run(&mesh);
    let second = ClipStage::default().run(&mesh);

    assert_eq!(first.mesh, second.mesh);
    assert_eq!(first.report.merged_points, second.report.merged_points);
    assert_eq!(first.report.clipped_cells, second.report.clipped_cells);
}

#[test]
fn test_exact_locator_matches_grid() {
    let mesh = kuhn_grid(2);
    let grid = ClipStage::default().run(&mesh);
    let exact = ClipStage::new(ClipConfig::default().with_merge_tolerance(MergeTolerance::Exact))
        .with_locator(Box::new(ExactLocator::new()))
        .run(&mesh);

    assert_eq!(grid.mesh, exact.mesh);
}

#[test]
fn test_single_precision_output() {
    let mesh = kuhn_grid(1);
    let config = ClipConfig::default().with_precision(OutputPrecision::Single);
    let outcome = ClipStage::new(config).run(&mesh);

    assert_eq!(outcome.mesh.points.precision(), Precision::Single);
    assert!(outcome.mesh.validate().is_ok());
}

#[test]
fn test_progress_is_monotonic() {
    let mesh = kuhn_grid(2);
    let mut progress = Vec::new();
    let outcome = {
        let mut control = RunControl::new().with_progress(|f| progress.push(f));
        ClipStage::default().execute(&mesh, &mut control)
    };

    assert_eq!(outcome.state, StageState::Done);
    assert_eq!(progress.first(), Some(&0.0));
    assert_eq!(progress.last(), Some(&1.0));
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    // 48 elements polled every 3
    assert_eq!(progress.len(), 17);
}

#[test]
fn test_cancelled_before_start() {
    let mesh = kuhn_grid(2);
    let token = CancellationToken::new();
    token.cancel();
    let mut control = RunControl::new().with_cancellation(token);
    let mut stage = ClipStage::default();
    let outcome = stage.execute(&mesh, &mut control);

    assert_eq!(outcome.state, StageState::Aborted);
    assert_eq!(stage.state(), StageState::Aborted);
    assert_eq!(outcome.mesh.cell_count(), 0);
    assert_eq!(outcome.report.processed_cells(), 0);
    assert!(outcome.mesh.validate().is_ok());
}

#[test]
fn test_cancelled_midway_keeps_partial_output() {
    let mesh = kuhn_grid(2);
    let token = CancellationToken::new();
    let trigger = token.clone();
    let mut progress = Vec::new();
    let outcome = {
        let mut control = RunControl::new()
            .with_cancellation(token)
            .with_progress(|f| {
                progress.push(f);
                if f >= 0.5 {
                    trigger.cancel();
                }
            });
        ClipStage::default().execute(&mesh, &mut control)
    };

    assert_eq!(outcome.state, StageState::Aborted);
    assert_eq!(outcome.report.processed_cells(), 24);
    assert_eq!(progress.last(), Some(&0.5));
    assert!(outcome.mesh.cell_count() > 0);
    assert!(outcome.mesh.validate().is_ok());

    let element = outcome.mesh.cell_data.get("element").unwrap();
    assert_eq!(element.tuple_count(), outcome.mesh.cell_count());
    assert!((0..element.tuple_count()).all(|c| element.component(c, 0) < 24.0));
}
