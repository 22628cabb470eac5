// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

/// Counters and diagnostics collected over one clip run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipReport {
    /// Descriptor mode that was used, if validation got that far
    pub descriptor: Option<String>,
    pub input_points: usize,
    pub input_cells: usize,
    pub output_points: usize,
    pub output_cells: usize,
    /// Elements emitted unchanged
    pub retained_cells: usize,
    /// Elements cut by the zero level
    pub clipped_cells: usize,
    /// Elements entirely on the removed side
    pub discarded_cells: usize,
    /// Elements passed through because their cut plane had no normal
    pub uncut_degenerate_normal: usize,
    /// Elements passed through because signed distances need four points
    pub uncut_arity_mismatch: usize,
    /// Sub-cells dropped after point merging collapsed them
    pub dropped_degenerate: usize,
    /// Output points that reused an earlier point
    pub merged_points: usize,
    pub elapsed_ms: u64,
    /// Errors and warnings, in the order they were raised
    pub diagnostics: Vec<String>,
}

impl ClipReport {
    /// Elements that went through the clipper, whatever the outcome
    pub fn processed_cells(&self) -> usize {
        self.retained_cells + self.clipped_cells + self.discarded_cells
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
