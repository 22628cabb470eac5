// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clip stage orchestration.
//!
//! One run walks `Idle -> Validating -> Processing -> Finalizing -> Done`.
//! A rejected configuration goes straight from `Validating` to `Done` with
//! an empty mesh; a cancelled run ends in `Aborted` with whatever was
//! assembled so far.

use crate::assembler::{estimated_capacity, MeshAssembler};
use crate::config::ClipConfig;
use crate::control::RunControl;
use crate::error::Result;
use crate::report::ClipReport;
use smallvec::SmallVec;
use std::fmt;
use std::time::Instant;
use xfem_clip_core::Mesh;
use xfem_clip_geometry::{
    CellPoints, ClipDescriptor, Disposition, ElementClipper, FieldStatus, PointLocator,
    PointMerger, Scalars, UncutReason,
};

/// Run state of a [`ClipStage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageState {
    #[default]
    Idle,
    Validating,
    Processing,
    Finalizing,
    Done,
    /// Cancelled during processing; the partial output was still finalized
    Aborted,
}

impl StageState {
    pub const fn name(self) -> &'static str {
        match self {
            StageState::Idle => "idle",
            StageState::Validating => "validating",
            StageState::Processing => "processing",
            StageState::Finalizing => "finalizing",
            StageState::Done => "done",
            StageState::Aborted => "aborted",
        }
    }

    /// Whether a run has finished, normally or not
    pub const fn is_terminal(self) -> bool {
        matches!(self, StageState::Done | StageState::Aborted)
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub mesh: Mesh,
    /// `Done` or `Aborted`
    pub state: StageState,
    pub report: ClipReport,
}

/// Clips every element of a mesh against its embedded cut description.
///
/// The stage owns the point merger and the assembler for the length of a
/// run, and may be reused for further runs afterwards.
#[derive(Debug)]
pub struct ClipStage {
    config: ClipConfig,
    state: StageState,
    merger: PointMerger,
    assembler: MeshAssembler,
    clipper: ElementClipper,
}

impl Default for ClipStage {
    fn default() -> Self {
        Self::new(ClipConfig::default())
    }
}

impl ClipStage {
    pub fn new(config: ClipConfig) -> Self {
        Self {
            config,
            state: StageState::Idle,
            merger: PointMerger::default(),
            assembler: MeshAssembler::new(),
            clipper: ElementClipper::new(),
        }
    }

    /// Use `locator` for point merging instead of the default grid
    #[must_use]
    pub fn with_locator(mut self, locator: Box<dyn PointLocator>) -> Self {
        self.merger.set_locator(locator);
        self
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Check the configuration, the cut description and the input mesh
    pub fn validate<'a>(&self, input: &'a Mesh) -> Result<ClipDescriptor<'a>> {
        self.config.validate()?;
        let descriptor = ClipDescriptor::from_cell_data(&input.cell_data, input.cell_count())?;
        input.validate().map_err(xfem_clip_geometry::Error::from)?;
        Ok(descriptor)
    }

    /// Run with default controls
    pub fn run(&mut self, input: &Mesh) -> ClipOutcome {
        self.execute(input, &mut RunControl::new())
    }

    /// Clip `input`. Never fails: configuration problems are reported in
    /// [`ClipOutcome::report`] alongside an empty mesh.
    pub fn execute(&mut self, input: &Mesh, control: &mut RunControl<'_>) -> ClipOutcome {
        let start = Instant::now();
        let mut report = ClipReport {
            input_points: input.point_count(),
            input_cells: input.cell_count(),
            ..Default::default()
        };
        self.state = StageState::Idle;

        tracing::info!(
            points = input.point_count(),
            cells = input.cell_count(),
            locator = self.merger.locator().name(),
            "Starting XFEM clip"
        );

        self.transition(StageState::Validating);
        let descriptor = match self.validate(input) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::error!(error = %e, "Clip configuration rejected");
                report.diagnostics.push(e.to_string());
                return self.finish_empty(input, report, start);
            }
        };
        report.descriptor = Some(descriptor.mode().name().to_string());
        tracing::debug!(mode = %descriptor.mode(), "Selected cut descriptor");

        if input.point_count() == 0 {
            tracing::debug!("Input has no points");
            return self.finish_empty(input, report, start);
        }

        self.transition(StageState::Processing);
        let cancelled = self.process(input, &descriptor, control, &mut report);

        self.transition(if cancelled {
            StageState::Aborted
        } else {
            StageState::Finalizing
        });
        let (points, point_data) = self.merger.finish();
        let mesh = self.assembler.finish(points, point_data);
        report.merged_points = self.merger.merged_count();
        report.dropped_degenerate = self.assembler.dropped_count();
        report.output_points = mesh.point_count();
        report.output_cells = mesh.cell_count();
        Self::summarize(&mut report);

        if !cancelled {
            self.transition(StageState::Done);
            control.report_progress(1.0);
        }
        report.elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            output_points = report.output_points,
            output_cells = report.output_cells,
            clipped = report.clipped_cells,
            discarded = report.discarded_cells,
            merged_points = report.merged_points,
            elapsed_ms = report.elapsed_ms,
            state = %self.state,
            "XFEM clip complete"
        );

        ClipOutcome {
            mesh,
            state: self.state,
            report,
        }
    }

    /// Element loop. Returns whether the run was cancelled.
    fn process(
        &mut self,
        input: &Mesh,
        descriptor: &ClipDescriptor<'_>,
        control: &mut RunControl<'_>,
        report: &mut ClipReport,
    ) -> bool {
        let cell_count = input.cell_count();
        let bounds = input.bounds();
        let precision = self.config.precision.resolve(input.points.precision());
        let tolerance = self.config.merge_tolerance.resolve(&bounds);
        tracing::debug!(
            tolerance = tolerance,
            precision = ?precision,
            "Initialized point merger"
        );

        self.merger.initialize(
            &bounds,
            &input.point_data,
            precision,
            tolerance,
            input.point_count(),
        );
        self.assembler
            .initialize(&input.cell_data, estimated_capacity(cell_count));

        let poll_every = cell_count / self.config.progress_steps.max(1) + 1;
        let mut scalars = Scalars::new();
        let mut resolved: SmallVec<[usize; 16]> = SmallVec::new();

        for cell_id in 0..cell_count {
            if cell_id % poll_every == 0 {
                control.report_progress(cell_id as f64 / cell_count as f64);
                if control.is_cancelled() {
                    tracing::warn!(
                        processed = cell_id,
                        total = cell_count,
                        "XFEM clip cancelled"
                    );
                    return true;
                }
            }

            match descriptor.scalars(cell_id, &input.cell_points(cell_id), &mut scalars) {
                FieldStatus::Evaluated => {}
                FieldStatus::Uncut(UncutReason::DegenerateNormal) => {
                    report.uncut_degenerate_normal += 1
                }
                FieldStatus::Uncut(UncutReason::ArityMismatch) => report.uncut_arity_mismatch += 1,
            }

            let output = self.clipper.clip(input.cell(cell_id), &scalars);
            let clean = match output.disposition() {
                Disposition::Discarded => {
                    report.discarded_cells += 1;
                    continue;
                }
                Disposition::Retained => {
                    report.retained_cells += 1;
                    false
                }
                Disposition::Clipped => {
                    report.clipped_cells += 1;
                    true
                }
            };

            resolved.clear();
            for point in output.points() {
                resolved.push(self.merger.insert(point, input));
            }
            for cell in output.cells() {
                let ids: CellPoints = cell.points.iter().map(|&p| resolved[p]).collect();
                let faces = cell.faces.as_ref().map(|faces| {
                    faces
                        .iter()
                        .map(|face| face.iter().map(|&p| resolved[p]).collect())
                        .collect()
                });
                self.assembler
                    .push(cell.kind, &ids, faces, cell_id, &input.cell_data, clean);
            }
        }
        false
    }

    /// Log per-element degradations once per run
    fn summarize(report: &mut ClipReport) {
        if report.uncut_degenerate_normal > 0 {
            tracing::warn!(
                count = report.uncut_degenerate_normal,
                "Elements with a zero-length cut normal passed through uncut"
            );
            report.diagnostics.push(format!(
                "{} element(s) with a zero-length cut normal passed through uncut",
                report.uncut_degenerate_normal
            ));
        }
        if report.uncut_arity_mismatch > 0 {
            tracing::warn!(
                count = report.uncut_arity_mismatch,
                "Elements without four points passed through uncut in signed distance mode"
            );
            report.diagnostics.push(format!(
                "{} element(s) without four points passed through uncut in signed distance mode",
                report.uncut_arity_mismatch
            ));
        }
        if report.dropped_degenerate > 0 {
            tracing::debug!(
                count = report.dropped_degenerate,
                "Dropped sub-cells collapsed by point merging"
            );
        }
    }

    /// End the run with an empty mesh carrying the input schema
    fn finish_empty(&mut self, input: &Mesh, mut report: ClipReport, start: Instant) -> ClipOutcome {
        let mut mesh = Mesh::new(self.config.precision.resolve(input.points.precision()));
        mesh.point_data = input.point_data.empty_like(0);
        mesh.cell_data = input.cell_data.empty_like(0);

        self.transition(StageState::Done);
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            diagnostics = report.diagnostics.len(),
            elapsed_ms = report.elapsed_ms,
            "XFEM clip produced no output"
        );
        ClipOutcome {
            mesh,
            state: self.state,
            report,
        }
    }

    fn transition(&mut self, next: StageState) {
        tracing::debug!(from = %self.state, to = %next, "Clip stage transition");
        self.state = next;
    }
}
