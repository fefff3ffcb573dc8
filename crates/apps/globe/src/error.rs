use std::time::Duration;

use runtime::Stage;
use streaming::BackendError;
use thiserror::Error;

/// Terminal failure of one submit/poll/fetch run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The initial POST failed; no job was created.
    #[error("job submission failed: {0}")]
    Submission(#[source] BackendError),

    /// Progress polling failed `attempts` times in a row.
    #[error("progress polling failed after {attempts} attempts: {source}")]
    Polling {
        attempts: u32,
        #[source]
        source: BackendError,
    },

    /// The job did not complete within the configured maximum wait.
    #[error("job still running after {waited:?}")]
    Stalled { waited: Duration },

    /// Fetching the final tiles failed; the previous heatmap stays.
    #[error("fetching results failed: {0}")]
    ResultFetch(#[source] BackendError),

    /// A newer submission took over; this run's outcome is irrelevant.
    #[error("superseded by a newer submission")]
    Superseded,
}

impl PipelineError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Submission(_) => Some(Stage::Submission),
            PipelineError::Polling { .. } | PipelineError::Stalled { .. } => Some(Stage::Polling),
            PipelineError::ResultFetch(_) => Some(Stage::ResultFetch),
            PipelineError::Superseded => None,
        }
    }
}
