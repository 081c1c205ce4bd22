// ABOUTME: Stage index error types with SNAFU pattern.
// ABOUTME: Distinguishes a missing format tag from an unsupported format version.

use snafu::Snafu;

/// Reasons a stage index document cannot be interpreted.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum StageIndexError {
    #[snafu(display("failed to parse stage index format version"))]
    MissingFormatTag,

    #[snafu(display("unsupported stage index format version {version}"))]
    UnsupportedFormat { version: String },
}
