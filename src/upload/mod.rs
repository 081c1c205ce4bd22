// ABOUTME: Upload orchestration: drives per-file uploads through the bounded runner.
// ABOUTME: Absorbs single-file failures and retries the remaining files a fixed number of times.

mod slots;

pub use slots::{PendingFile, UploadSlots, remote_key};

use futures::FutureExt;
use serde::Deserialize;
use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::runner::{self, TaskFn};
use crate::service::{DeploymentService, ServiceError};

/// Number of passes over the remaining files before giving up.
pub const MAX_ATTEMPTS: NonZeroUsize = nonzero(3);

/// Uploads in flight at once.
pub const MAX_CONCURRENT_UPLOADS: NonZeroUsize = nonzero(10);

const fn nonzero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => panic!("zero is not a valid limit"),
    }
}

/// Tuning for the upload phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: NonZeroUsize,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: NonZeroUsize,

    /// Limit for connecting and for each wait on the partner. Not a total deadline.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_max_concurrency() -> NonZeroUsize {
    MAX_CONCURRENT_UPLOADS
}

fn default_max_attempts() -> NonZeroUsize {
    MAX_ATTEMPTS
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_attempts: default_max_attempts(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Result of uploading one file.
#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded,
    Failed(ServiceError),
}

/// Totals after the retry loop settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    pub total: usize,
    pub attempts: usize,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.uploaded == self.total
    }

    /// Anything short of every file uploaded is a hard failure.
    pub fn into_result(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else if self.uploaded == 0 {
            Err(Error::NoFilesUploaded)
        } else {
            Err(Error::PartialUpload {
                uploaded: self.uploaded,
                total: self.total,
            })
        }
    }
}

/// Upload every pending slot, retrying failures up to `settings.max_attempts` times.
///
/// Each attempt only dispatches slots that are still pending, so a file that
/// already made it is never sent twice. Slots are marked done in place; the
/// returned count includes slots that were done before this call.
pub async fn upload_all(
    service: Arc<dyn DeploymentService>,
    version: &str,
    slots: &mut UploadSlots,
    settings: &UploadSettings,
    diag: &mut Diagnostics,
) -> UploadReport {
    let total = slots.total();
    let max_attempts = settings.max_attempts.get();
    let mut uploaded = slots.done_count();
    let mut attempts = 0;

    while uploaded < total && attempts < max_attempts {
        attempts += 1;
        if attempts > 1 {
            diag.warn(Warning::upload_retry(format!(
                "Retrying after failed uploads... ({attempts}/{max_attempts})"
            )));
        }

        let tasks = upload_tasks(&service, version, slots);
        match runner::run_with_max_concurrency(tasks, settings.max_concurrency).await {
            Ok(outcomes) => uploaded = apply_outcomes(slots, outcomes, uploaded, diag),
            Err(e) => tracing::error!("Unexpected error while uploading files: {e}."),
        }
    }

    UploadReport {
        uploaded,
        total,
        attempts,
    }
}

fn upload_tasks(
    service: &Arc<dyn DeploymentService>,
    version: &str,
    slots: &UploadSlots,
) -> Vec<TaskFn<(usize, UploadOutcome), Infallible>> {
    slots
        .pending()
        .map(|(index, file)| {
            let service = Arc::clone(service);
            let version = version.to_string();
            let file = file.clone();
            runner::task(move || async move {
                tracing::debug!("upload {}", file.local_path.display());
                let upload = service.put_file(&version, &file.key, &file.local_path);
                // A panicking upload still yields an outcome, so sibling results are kept.
                let outcome = match AssertUnwindSafe(upload).catch_unwind().await {
                    Ok(Ok(())) => UploadOutcome::Uploaded,
                    Ok(Err(e)) => {
                        tracing::debug!(status = ?e.status(), "upload of {} failed", file.key);
                        UploadOutcome::Failed(e)
                    }
                    Err(panic) => {
                        UploadOutcome::Failed(ServiceError::Panicked(panic_message(&*panic)))
                    }
                };
                Ok::<_, Infallible>((index, outcome))
            })
        })
        .collect()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Fold one attempt's outcomes into the slots, returning the new uploaded count.
pub fn apply_outcomes(
    slots: &mut UploadSlots,
    outcomes: Vec<(usize, UploadOutcome)>,
    uploaded: usize,
    diag: &mut Diagnostics,
) -> usize {
    outcomes
        .into_iter()
        .fold(uploaded, |count, (index, outcome)| match outcome {
            UploadOutcome::Uploaded => count + usize::from(slots.mark_done(index)),
            UploadOutcome::Failed(e) => {
                let path = slots
                    .get(index)
                    .map(|f| f.local_path.display().to_string())
                    .unwrap_or_else(|| format!("#{index}"));
                diag.warn(Warning::upload_failed(format!(
                    "Failed to upload file {path}: {e}."
                )));
                count
            }
        })
}
