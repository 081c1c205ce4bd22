// ABOUTME: Stage index format versions and their per-version field parsers.
// ABOUTME: Unknown versions have no parser, so callers treat them as absent.

use super::AppVersions;

/// Literal that introduces the format tag inside the document.
pub const FORMAT_MARKER: &str = "<!-- v";

/// Known stage index formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V1_0,
}

type FieldParser = fn(&str) -> AppVersions;

/// Tag lookup table. A new format gets a row here and a parser below.
const FORMATS: &[(&str, FormatVersion)] = &[("1.0", FormatVersion::V1_0)];

impl FormatVersion {
    /// The format written by this build.
    pub const CURRENT: FormatVersion = FormatVersion::V1_0;

    pub fn tag(self) -> &'static str {
        match self {
            FormatVersion::V1_0 => "1.0",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        FORMATS
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, version)| *version)
    }

    pub(super) fn parser(self) -> FieldParser {
        match self {
            FormatVersion::V1_0 => parse_v1_fields,
        }
    }
}

/// Extract the format tag: the token after [`FORMAT_MARKER`] up to the next space.
pub fn read_format_tag(document: &str) -> Option<&str> {
    let start = document.find(FORMAT_MARKER)? + FORMAT_MARKER.len();
    let rest = &document[start..];
    let end = rest.find(' ')?;
    Some(&rest[..end])
}

/// Read `<name>='<value>'` preceded by a space. Field order does not matter.
fn read_variable<'a>(document: &'a str, name: &str) -> Option<&'a str> {
    let prefix = format!(" {name}='");
    let start = document.find(&prefix)? + prefix.len();
    let rest = &document[start..];
    let end = rest.find('\'')?;
    Some(&rest[..end])
}

fn parse_v1_fields(document: &str) -> AppVersions {
    let field = |name| read_variable(document, name).unwrap_or_default().to_string();
    AppVersions {
        stage_version: field("stageVersion"),
        production_version: field("productionVersion"),
        rollback_version: field("rollbackVersion"),
    }
}
