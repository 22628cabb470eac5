// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for clipping operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing a clip
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Cannot cut by both signed distance and plane")]
    ConflictingDescriptors,

    #[error("Must provide either data to cut by signed distance or plane")]
    MissingDescriptor,

    #[error("Cell array '{name}' is malformed: {reason}")]
    MalformedDescriptor { name: String, reason: String },

    #[error("Mesh error: {0}")]
    Mesh(#[from] xfem_clip_core::Error),
}
