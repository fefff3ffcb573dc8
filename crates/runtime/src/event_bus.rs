use crate::job::{JobId, Progress};

/// Observable step of a submit/poll/fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Submitted { session_id: String },
    Progress(Progress),
    /// A progress poll failed and will be retried.
    PollRetry { failures: u32, max_failures: u32, message: String },
    FetchingResults,
    Completed { tiles: usize },
}

/// Receives pipeline events while a job runs.
pub trait EventSink {
    fn emit(&mut self, job: JobId, event: PipelineEvent);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub job: JobId,
    pub event: PipelineEvent,
}

/// Records events in arrival order.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Progress updates observed so far, in order.
    pub fn progress_history(&self) -> Vec<Progress> {
        self.events
            .iter()
            .filter_map(|e| match e.event {
                PipelineEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventBus {
    fn emit(&mut self, job: JobId, event: PipelineEvent) {
        self.events.push(Event { job, event });
    }
}
