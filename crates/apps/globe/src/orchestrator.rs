//! Submit → poll → fetch pipeline for one confirmed region.

use foundation::{DEFAULT_TILE_WIDTH_DEG, Region, ScoredTile};
use runtime::{EventSink, Job, JobTicket, PipelineEvent, PollSchedule, Progress};
use streaming::{PredictRequest, PredictResponse, ScoringBackend, tiles_from_records};
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;

pub struct Orchestrator<B> {
    backend: B,
    schedule: PollSchedule,
    default_tile_width_deg: f64,
}

impl<B: ScoringBackend> Orchestrator<B> {
    pub fn new(backend: B, schedule: PollSchedule) -> Self {
        Self {
            backend,
            schedule,
            default_tile_width_deg: DEFAULT_TILE_WIDTH_DEG,
        }
    }

    /// Footprint width for result records that omit `tile_width_deg`.
    pub fn with_default_tile_width(mut self, width_deg: f64) -> Self {
        self.default_tile_width_deg = width_deg;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs one job to completion.
    ///
    /// The ticket is checked after every suspension point; once a newer
    /// ticket has been issued the run stops with [`PipelineError::Superseded`]
    /// and emits nothing further. Results are fetched exactly once.
    pub async fn run<E>(
        &self,
        region: &Region,
        ticket: &JobTicket,
        sink: &mut E,
    ) -> Result<Vec<ScoredTile>, PipelineError>
    where
        E: EventSink + ?Sized,
    {
        let job_id = ticket.id();
        ensure_current(ticket)?;

        let request = PredictRequest::from(region);
        info!(
            "job {}: submitting region ({:.4}, {:.4}) radius {} km",
            job_id.0, request.latitude, request.longitude, request.radius_km
        );
        let response = self.backend.submit(&request).await.map_err(|err| {
            error!("job {}: submission failed: {err}", job_id.0);
            PipelineError::Submission(err)
        })?;
        ensure_current(ticket)?;

        let session_id = match response {
            PredictResponse::Session { session_id } => session_id,
            PredictResponse::Immediate { tiles } => {
                let tiles = tiles_from_records(tiles, self.default_tile_width_deg);
                info!("job {}: backend answered synchronously with {} tiles", job_id.0, tiles.len());
                sink.emit(job_id, PipelineEvent::Completed { tiles: tiles.len() });
                return Ok(tiles);
            }
        };

        let mut job = Job::new(session_id.clone());
        info!("job {}: accepted as session {session_id}", job_id.0);
        sink.emit(job_id, PipelineEvent::Submitted { session_id });

        self.poll_until_done(&mut job, ticket, sink).await?;

        sink.emit(job_id, PipelineEvent::FetchingResults);
        let results = self.backend.results(&job.session_id).await.map_err(|err| {
            error!("job {}: fetching results failed: {err}", job_id.0);
            PipelineError::ResultFetch(err)
        })?;
        ensure_current(ticket)?;

        let tiles = results.into_tiles_with_width(self.default_tile_width_deg);
        info!("job {}: received {} tiles", job_id.0, tiles.len());
        sink.emit(job_id, PipelineEvent::Completed { tiles: tiles.len() });
        Ok(tiles)
    }

    async fn poll_until_done<E>(
        &self,
        job: &mut Job,
        ticket: &JobTicket,
        sink: &mut E,
    ) -> Result<(), PipelineError>
    where
        E: EventSink + ?Sized,
    {
        let job_id = ticket.id();
        let started = Instant::now();
        let mut failures = 0u32;

        loop {
            let polled = self.backend.progress(&job.session_id).await;
            ensure_current(ticket)?;

            match polled {
                Ok(response) => {
                    failures = 0;
                    job.progress = Progress::new(response.completed, response.total);
                    debug!("job {}: progress {}", job_id.0, job.progress.label());
                    sink.emit(job_id, PipelineEvent::Progress(job.progress));
                    if response.completed >= response.total {
                        return Ok(());
                    }
                }
                Err(err) => {
                    failures += 1;
                    if !self.schedule.allows_retry(failures) {
                        error!("job {}: giving up after {failures} failed polls: {err}", job_id.0);
                        return Err(PipelineError::Polling {
                            attempts: failures,
                            source: err,
                        });
                    }
                    warn!(
                        "job {}: poll failed ({failures}/{}): {err}",
                        job_id.0, self.schedule.max_consecutive_failures
                    );
                    sink.emit(
                        job_id,
                        PipelineEvent::PollRetry {
                            failures,
                            max_failures: self.schedule.max_consecutive_failures,
                            message: err.to_string(),
                        },
                    );
                }
            }

            let waited = started.elapsed();
            if self.schedule.exceeded(waited) {
                warn!("job {}: still running after {waited:?}, giving up", job_id.0);
                return Err(PipelineError::Stalled { waited });
            }

            sleep(self.schedule.interval).await;
            ensure_current(ticket)?;
        }
    }
}

fn ensure_current(ticket: &JobTicket) -> Result<(), PipelineError> {
    if ticket.is_current() {
        Ok(())
    } else {
        debug!("job {}: superseded", ticket.id().0);
        Err(PipelineError::Superseded)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use foundation::GeoPoint;
    use pretty_assertions::assert_eq;
    use runtime::{EventBus, JobRegistry};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use streaming::{
        BackendError, BoxFuture, ProgressResponse, ResultsResponse, TileRecord,
    };

    fn unavailable(message: &str) -> BackendError {
        BackendError::Status {
            status: 503,
            body: message.to_string(),
        }
    }

    /// Backend that plays back a fixed script.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        pub submit: Mutex<Option<Result<PredictResponse, String>>>,
        pub progress: Mutex<VecDeque<Result<ProgressResponse, String>>>,
        pub results: Mutex<Option<Result<ResultsResponse, String>>>,
        pub requests: Mutex<Vec<PredictRequest>>,
        pub progress_calls: Mutex<Vec<Instant>>,
        pub results_calls: Mutex<u32>,
    }

    impl ScriptedBackend {
        pub(crate) fn session(id: &str) -> Self {
            let backend = Self::default();
            *backend.submit.lock().unwrap() = Some(Ok(PredictResponse::Session {
                session_id: id.to_string(),
            }));
            backend
        }

        pub(crate) fn with_progress(self, steps: Vec<Result<(u64, u64), &str>>) -> Self {
            *self.progress.lock().unwrap() = steps
                .into_iter()
                .map(|step| {
                    step.map(|(completed, total)| ProgressResponse { completed, total })
                        .map_err(str::to_string)
                })
                .collect();
            self
        }

        pub(crate) fn with_results(self, tiles: Vec<TileRecord>) -> Self {
            *self.results.lock().unwrap() = Some(Ok(ResultsResponse { tiles }));
            self
        }

        pub(crate) fn failing_results(self, message: &str) -> Self {
            *self.results.lock().unwrap() = Some(Err(message.to_string()));
            self
        }
    }

    impl ScoringBackend for ScriptedBackend {
        fn submit<'a>(
            &'a self,
            request: &'a PredictRequest,
        ) -> BoxFuture<'a, Result<PredictResponse, BackendError>> {
            Box::pin(async move {
                self.requests.lock().unwrap().push(request.clone());
                match self.submit.lock().unwrap().take() {
                    Some(Ok(response)) => Ok(response),
                    Some(Err(message)) => Err(unavailable(&message)),
                    None => Err(unavailable("no submit scripted")),
                }
            })
        }

        fn progress<'a>(
            &'a self,
            _session_id: &'a str,
        ) -> BoxFuture<'a, Result<ProgressResponse, BackendError>> {
            Box::pin(async move {
                self.progress_calls.lock().unwrap().push(Instant::now());
                match self.progress.lock().unwrap().pop_front() {
                    Some(Ok(response)) => Ok(response),
                    Some(Err(message)) => Err(unavailable(&message)),
                    None => Ok(ProgressResponse {
                        completed: 0,
                        total: 1,
                    }),
                }
            })
        }

        fn results<'a>(
            &'a self,
            _session_id: &'a str,
        ) -> BoxFuture<'a, Result<ResultsResponse, BackendError>> {
            Box::pin(async move {
                *self.results_calls.lock().unwrap() += 1;
                match self.results.lock().unwrap().take() {
                    Some(Ok(response)) => Ok(response),
                    Some(Err(message)) => Err(unavailable(&message)),
                    None => Err(unavailable("results already taken")),
                }
            })
        }
    }

    fn region() -> Region {
        Region::new(GeoPoint::new(40.0, -75.0).expect("valid point"), 5.0)
    }

    fn tile(id: &str, score: f64) -> TileRecord {
        TileRecord::new(id, 40.0, -75.0, score, 0.022)
    }

    #[tokio::test(start_paused = true)]
    async fn polls_at_fixed_interval_and_fetches_once() {
        let backend = ScriptedBackend::session("abc")
            .with_progress(vec![Ok((0, 4)), Ok((4, 4))])
            .with_results(vec![tile("t1", 0.72), tile("t2", 0.2)]);
        let orchestrator = Orchestrator::new(backend, PollSchedule::default());
        let registry = JobRegistry::new();
        let ticket = registry.issue();
        let mut bus = EventBus::new();

        let tiles = orchestrator
            .run(&region(), &ticket, &mut bus)
            .await
            .expect("run succeeds");

        assert_eq!(
            tiles.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["t1", "t2"]
        );

        let backend = orchestrator.backend();
        let request = backend.requests.lock().unwrap()[0].clone();
        assert_eq!(request, PredictRequest::from(&region()));

        let labels: Vec<String> = bus.progress_history().iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["0 of 4".to_string(), "4 of 4".to_string()]);

        let polls = backend.progress_calls.lock().unwrap().clone();
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[1] - polls[0], Duration::from_secs(1));
        assert_eq!(*backend.results_calls.lock().unwrap(), 1);

        let events: Vec<PipelineEvent> = bus.drain().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                PipelineEvent::Submitted {
                    session_id: "abc".to_string()
                },
                PipelineEvent::Progress(Progress::new(0, 4)),
                PipelineEvent::Progress(Progress::new(4, 4)),
                PipelineEvent::FetchingResults,
                PipelineEvent::Completed { tiles: 2 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn submission_failure_skips_polling() {
        let backend = ScriptedBackend::default();
        *backend.submit.lock().unwrap() = Some(Err("down".to_string()));
        let orchestrator = Orchestrator::new(backend, PollSchedule::default());
        let ticket = JobRegistry::new().issue();
        let mut bus = EventBus::new();

        let err = orchestrator
            .run(&region(), &ticket, &mut bus)
            .await
            .expect_err("submission fails");
        assert!(matches!(err, PipelineError::Submission(_)), "{err:?}");
        assert!(orchestrator.backend().progress_calls.lock().unwrap().is_empty());
        assert!(bus.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_poll_failures_are_retried() {
        let backend = ScriptedBackend::session("abc")
            .with_progress(vec![Ok((1, 3)), Err("blip"), Err("blip"), Ok((3, 3))])
            .with_results(vec![tile("t1", 0.5)]);
        let orchestrator = Orchestrator::new(backend, PollSchedule::default());
        let ticket = JobRegistry::new().issue();
        let mut bus = EventBus::new();

        let tiles = orchestrator
            .run(&region(), &ticket, &mut bus)
            .await
            .expect("recovers");
        assert_eq!(tiles.len(), 1);

        let retries = bus
            .events()
            .iter()
            .filter(|e| matches!(e.event, PipelineEvent::PollRetry { .. }))
            .count();
        assert_eq!(retries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_poll_failure_surfaces() {
        let backend = ScriptedBackend::session("abc")
            .with_progress(vec![Ok((0, 4)), Err("gone"), Err("gone"), Err("gone")])
            .with_results(vec![tile("t1", 0.5)]);
        let orchestrator = Orchestrator::new(backend, PollSchedule::default());
        let ticket = JobRegistry::new().issue();
        let mut bus = EventBus::new();

        let err = orchestrator
            .run(&region(), &ticket, &mut bus)
            .await
            .expect_err("polling gives up");
        match err {
            PipelineError::Polling { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(*orchestrator.backend().results_calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn max_wait_bounds_a_stalled_job() {
        let backend = ScriptedBackend::session("abc");
        let schedule = PollSchedule {
            max_wait: Some(Duration::from_secs(5)),
            ..PollSchedule::default()
        };
        let orchestrator = Orchestrator::new(backend, schedule);
        let ticket = JobRegistry::new().issue();
        let mut bus = EventBus::new();

        let err = orchestrator
            .run(&region(), &ticket, &mut bus)
            .await
            .expect_err("stalls");
        match err {
            PipelineError::Stalled { waited } => assert_eq!(waited, Duration::from_secs(5)),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(orchestrator.backend().progress_calls.lock().unwrap().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn synchronous_response_skips_polling() {
        let backend = ScriptedBackend::default();
        *backend.submit.lock().unwrap() = Some(Ok(PredictResponse::Immediate {
            tiles: vec![tile("now", 0.95)],
        }));
        let orchestrator = Orchestrator::new(backend, PollSchedule::default());
        let ticket = JobRegistry::new().issue();
        let mut bus = EventBus::new();

        let tiles = orchestrator
            .run(&region(), &ticket, &mut bus)
            .await
            .expect("immediate tiles");
        assert_eq!(tiles[0].id, "now");
        assert!(orchestrator.backend().progress_calls.lock().unwrap().is_empty());
        assert_eq!(*orchestrator.backend().results_calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn result_fetch_failure_is_reported() {
        let backend = ScriptedBackend::session("abc")
            .with_progress(vec![Ok((2, 2))])
            .failing_results("boom");
        let orchestrator = Orchestrator::new(backend, PollSchedule::default());
        let ticket = JobRegistry::new().issue();
        let mut bus = EventBus::new();

        let err = orchestrator
            .run(&region(), &ticket, &mut bus)
            .await
            .expect_err("fetch fails");
        assert!(matches!(err, PipelineError::ResultFetch(_)), "{err:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_ticket_stops_before_submitting() {
        let backend = ScriptedBackend::session("abc");
        let orchestrator = Orchestrator::new(backend, PollSchedule::default());
        let registry = JobRegistry::new();
        let stale = registry.issue();
        let _newer = registry.issue();
        let mut bus = EventBus::new();

        let err = orchestrator
            .run(&region(), &stale, &mut bus)
            .await
            .expect_err("superseded");
        assert!(matches!(err, PipelineError::Superseded));
        assert!(orchestrator.backend().requests.lock().unwrap().is_empty());
    }

    #[test]
    fn error_stages() {
        use runtime::Stage;
        assert_eq!(
            PipelineError::Submission(unavailable("x")).stage(),
            Some(Stage::Submission)
        );
        assert_eq!(
            PipelineError::Stalled {
                waited: Duration::from_secs(1)
            }
            .stage(),
            Some(Stage::Polling)
        );
        assert_eq!(PipelineError::Superseded.stage(), None);
    }
}
