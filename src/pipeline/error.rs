//! Pipeline-level errors with stage attribution.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ExtractError;
use crate::download::DownloadError;
use crate::manifest::ManifestError;
use crate::store::StoreError;

/// Pipeline stage, used for cancellation points and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading the API credential.
    Credential,
    /// Calling the manifest endpoint.
    Resolve,
    /// Downloading the archive.
    Fetch,
    /// Unpacking the archive.
    Extract,
    /// Reading store schema and counts.
    Inspect,
    /// Scanning records and building the category index.
    Analyze,
    /// Reading or writing the run record and index files.
    Record,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credential => "credential",
            Self::Resolve => "resolve",
            Self::Fetch => "fetch",
            Self::Extract => "extract",
            Self::Inspect => "inspect",
            Self::Analyze => "analyze",
            Self::Record => "record",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The credential variable is unset or blank.
    #[error("environment variable {variable} is not set; it must hold a provider API key")]
    MissingCredential {
        /// Name of the variable that was read.
        variable: String,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The manifest has no archive for the configured language.
    #[error("manifest {version} has no archive for language '{language}' (available: {available})")]
    LanguageUnavailable {
        language: String,
        version: String,
        /// Comma-separated languages the manifest does list.
        available: String,
    },

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The run record could not be read, parsed or written.
    #[error("run record {path}: {detail}")]
    RunRecord { path: PathBuf, detail: String },

    /// Explore was started before any download.
    #[error("no run record at {path}; run the download step first")]
    MissingRunRecord { path: PathBuf },

    /// A file or directory the pipeline produces could not be written.
    #[error("cannot write {path}: {source}")]
    Output {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking worker died before returning.
    #[error("{stage} worker failed: {detail}")]
    Worker { stage: Stage, detail: String },

    /// The cancellation flag was set before `stage` started.
    #[error("cancelled before the {stage} stage")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    /// The stage this failure belongs to.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::MissingCredential { .. } => Stage::Credential,
            Self::Manifest(_) | Self::LanguageUnavailable { .. } => Stage::Resolve,
            Self::Download(_) => Stage::Fetch,
            Self::Extract(_) => Stage::Extract,
            Self::Store(_) => Stage::Inspect,
            Self::RunRecord { .. } | Self::MissingRunRecord { .. } => Stage::Record,
            Self::Output { stage, .. }
            | Self::Worker { stage, .. }
            | Self::Cancelled { stage } => *stage,
        }
    }

    /// Whether this is a cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub(crate) fn output(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            stage,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn run_record(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::RunRecord {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_attribution() {
        let cases = [
            (
                PipelineError::MissingCredential {
                    variable: "BUNGIE_API_KEY".to_string(),
                },
                Stage::Credential,
            ),
            (
                ManifestError::remote_rejected(2101, "ApiInvalidOrExpiredKey", "bad key").into(),
                Stage::Resolve,
            ),
            (
                DownloadError::unexpected_status("http://x/y.zip", 404).into(),
                Stage::Fetch,
            ),
            (ExtractError::empty("/tmp/a.zip").into(), Stage::Extract),
            (StoreError::unknown_table("Items").into(), Stage::Inspect),
            (
                PipelineError::MissingRunRecord {
                    path: PathBuf::from("manifest-info.json"),
                },
                Stage::Record,
            ),
            (
                PipelineError::Cancelled {
                    stage: Stage::Extract,
                },
                Stage::Extract,
            ),
        ];

        for (error, stage) in cases {
            assert_eq!(error.stage(), stage, "{error}");
        }
    }

    #[test]
    fn test_transparent_display_keeps_stage_message() {
        let err: PipelineError =
            ManifestError::remote_rejected(2101, "ApiInvalidOrExpiredKey", "Invalid API key")
                .into();
        assert!(err.to_string().contains("Invalid API key"));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = PipelineError::MissingCredential {
            variable: "BUNGIE_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("BUNGIE_API_KEY"));
    }
}
