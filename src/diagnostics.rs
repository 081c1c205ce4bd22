// ABOUTME: Diagnostics accumulator for non-fatal warnings during a deploy.
// ABOUTME: Collects warnings that shouldn't fail the deploy but should reach the operator.

/// Collects non-fatal warnings during deploy operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning. The operator sees it when the command replays
    /// collected warnings, so it is only traced at debug level here.
    pub fn warn(&mut self, warning: Warning) {
        tracing::debug!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Count warnings of one kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning collected during a deploy.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// One file failed to upload on this attempt.
    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::UploadFailed,
            message: message.into(),
        }
    }

    /// Another upload attempt is starting.
    pub fn upload_retry(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::UploadRetry,
            message: message.into(),
        }
    }

    /// A published stage index exists but could not be interpreted.
    pub fn stage_index_unreadable(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StageIndexUnreadable,
            message: message.into(),
        }
    }

    /// The dist directory held nothing but the version file.
    pub fn dist_only_version_file(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DistOnlyVersionFile,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A single file upload failed; it stays eligible for retry.
    UploadFailed,
    /// A retry attempt over the remaining files began.
    UploadRetry,
    /// Previous app versions could not be read; treated as a first publish.
    StageIndexUnreadable,
    /// Nothing was built into the dist directory.
    DistOnlyVersionFile,
}
