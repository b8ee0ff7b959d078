//! Maps step failures to the process exit outcome.

use manifest_core::PipelineError;

use crate::ProcessExit;

/// Cancellation exits like an interrupted shell command; any other failure exits 1.
pub(crate) fn determine_exit_outcome(error: &PipelineError) -> ProcessExit {
    if error.is_cancelled() {
        ProcessExit::Interrupted
    } else {
        ProcessExit::Failure
    }
}
