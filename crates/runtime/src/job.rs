use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one confirmed submission. Later submissions get larger ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

/// Backend job progress. `total` is never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    /// Progress before the first real update arrives.
    pub fn initial() -> Self {
        Self {
            completed: 0,
            total: 1,
        }
    }

    /// A zero `total` from the wire is raised to 1.
    pub fn new(completed: u64, total: u64) -> Self {
        Self {
            completed,
            total: total.max(1),
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }

    /// `completed / total`, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        (self.completed as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round() as u8
    }

    pub fn label(&self) -> String {
        format!("{} of {}", self.completed, self.total)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::initial()
    }
}

/// A backend-side scoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub session_id: String,
    pub progress: Progress,
}

impl Job {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            progress: Progress::initial(),
        }
    }
}

/// Pipeline stage a job failed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Submission,
    Polling,
    ResultFetch,
}

/// What the presentation layer shows for the active job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Submitting,
    Running(Job),
    Fetching(Job),
    Completed { tiles: usize },
    Failed { stage: Stage, message: String },
}

impl JobStatus {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            JobStatus::Submitting | JobStatus::Running(_) | JobStatus::Fetching(_)
        )
    }

    pub fn progress(&self) -> Option<Progress> {
        match self {
            JobStatus::Submitting => Some(Progress::initial()),
            JobStatus::Running(job) | JobStatus::Fetching(job) => Some(job.progress),
            _ => None,
        }
    }
}

/// Issues job tickets. Issuing a ticket supersedes every earlier one.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    current: Arc<AtomicU64>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> JobTicket {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        JobTicket {
            id: JobId(id),
            current: Arc::clone(&self.current),
        }
    }

    /// Supersedes the outstanding ticket without issuing a new one.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> JobId {
        JobId(self.current.load(Ordering::SeqCst))
    }
}

/// Cooperative cancellation handle for one job.
#[derive(Debug, Clone)]
pub struct JobTicket {
    id: JobId,
    current: Arc<AtomicU64>,
}

impl JobTicket {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id.0
    }
}
