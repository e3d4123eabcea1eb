// Error and warning taxonomy for index builds
//
// Three bands: fatal errors abort the build before any artifact is renamed
// in, warnings are recorded in `meta` and flip its status to `partial`, and
// recovered conditions are logged but never surfaced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable codes for fatal build failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildErrorCode {
    TooManyFiles,
    RipgrepMissing,
    NotGitRepo,
    GitError,
    WriteError,
    ReadError,
    EncodingError,
}

impl BuildErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildErrorCode::TooManyFiles => "ARK_INDEX_TOO_MANY_FILES",
            BuildErrorCode::RipgrepMissing => "ARK_INDEX_RIPGREP_MISSING",
            BuildErrorCode::NotGitRepo => "ARK_INDEX_NOT_GIT_REPO",
            BuildErrorCode::GitError => "ARK_INDEX_GIT_ERROR",
            BuildErrorCode::WriteError => "ARK_INDEX_WRITE_ERROR",
            BuildErrorCode::ReadError => "ARK_INDEX_READ_ERROR",
            BuildErrorCode::EncodingError => "ARK_INDEX_ENCODING_ERROR",
        }
    }
}

impl fmt::Display for BuildErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal build failure. When one of these is returned, no artifact was
/// renamed into place and the previous artifact set (if any) is still valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    pub code: BuildErrorCode,
    pub message: String,
}

impl BuildError {
    pub fn new(code: BuildErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for BuildError {}

/// Machine-readable codes for per-file warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningCode {
    FileSkipped,
    ExtractionError,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::FileSkipped => "ARK_INDEX_FILE_SKIPPED",
            WarningCode::ExtractionError => "ARK_INDEX_EXTRACTION_ERROR",
        }
    }
}

/// A non-fatal condition recorded in `meta.warnings`. Any warning downgrades
/// `meta.status` from `success` to `partial`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexWarning {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub message: String,
}

impl IndexWarning {
    pub fn file_skipped(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: WarningCode::FileSkipped.as_str().to_string(),
            file: Some(file.into()),
            message: reason.into(),
        }
    }

    pub fn extraction_error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: WarningCode::ExtractionError.as_str().to_string(),
            file: Some(file.into()),
            message: message.into(),
        }
    }
}
