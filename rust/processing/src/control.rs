// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progress reporting and cooperative cancellation for a clip run

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag.
///
/// Clones observe the same flag, so a token handed to another thread can
/// stop a run in progress. The stage polls it at progress checkpoints.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-run hooks: an optional progress callback receiving fractions in
/// `[0, 1]` and an optional cancellation token
#[derive(Default)]
pub struct RunControl<'a> {
    cancel: Option<CancellationToken>,
    progress: Option<Box<dyn FnMut(f64) + 'a>>,
}

impl<'a> RunControl<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, callback: impl FnMut(f64) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Forward a progress fraction to the callback, if any
    pub fn report_progress(&mut self, fraction: f64) {
        if let Some(callback) = self.progress.as_mut() {
            callback(fraction.clamp(0.0, 1.0));
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

impl fmt::Debug for RunControl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunControl")
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.as_ref().map(|_| "FnMut(f64)"))
            .finish()
    }
}
