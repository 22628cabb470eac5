// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for stage configuration and validation
pub type Result<T> = std::result::Result<T, Error>;

/// Errors detected before any element is processed
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Clip(#[from] xfem_clip_geometry::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}
