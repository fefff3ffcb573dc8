//! The owning state object for one globe view.
//!
//! [`GlobeController`] holds the surface together with everything drawn on
//! it: the selection preview, the heatmap overlay set and the hover state.
//! The async pipeline never holds a borrow of it across a suspension point;
//! [`run_confirmed`] borrows it briefly to confirm, to apply each event and to
//! finish.

use std::cell::RefCell;

use foundation::{Region, ScoredTile};
use layers::{HeatmapRenderer, HoverTracker, RenderSummary};
use runtime::{EventSink, Job, JobId, JobRegistry, JobStatus, JobTicket, PipelineEvent};
use scene::{GlobeSurface, OverlayHandle, ScreenPos};
use streaming::{ScoringBackend, Url};
use tracing::{debug, error, info, warn};

use crate::config::GlobeConfig;
use crate::error::PipelineError;
use crate::orchestrator::Orchestrator;
use crate::selection::{RegionSelector, SelectionState, SideLengthLimits};

/// What happened to a finished run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    Rendered(RenderSummary),
    Failed,
    /// A newer job owns the view; the outcome was dropped.
    Discarded,
}

pub struct GlobeController<S> {
    surface: S,
    selector: RegionSelector,
    heatmap: HeatmapRenderer,
    hover: HoverTracker,
    jobs: JobRegistry,
    status: JobStatus,
    tiles: Vec<ScoredTile>,
}

impl<S: GlobeSurface> GlobeController<S> {
    pub fn new(surface: S, config: &GlobeConfig) -> Self {
        let imagery_base_url = match Url::parse(&config.base_url) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!("tile popups without imagery links, bad base url {}: {err}", config.base_url);
                None
            }
        };
        Self::with_parts(
            surface,
            config.side_length,
            config.hover_extrusion_m,
            imagery_base_url,
        )
    }

    pub fn with_parts(
        surface: S,
        limits: SideLengthLimits,
        hover_extrusion_m: f64,
        imagery_base_url: Option<Url>,
    ) -> Self {
        let heatmap = match imagery_base_url {
            Some(base) => HeatmapRenderer::new().with_imagery_base_url(base),
            None => HeatmapRenderer::new(),
        };
        Self {
            surface,
            selector: RegionSelector::new(limits),
            heatmap,
            hover: HoverTracker::new(hover_extrusion_m),
            jobs: JobRegistry::new(),
            status: JobStatus::Idle,
            tiles: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selector.state()
    }

    pub fn side_length_km(&self) -> f64 {
        self.selector.side_length_km()
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// `"{completed} of {total}"` while a job is in flight.
    pub fn progress_text(&self) -> Option<String> {
        self.status.progress().map(|p| p.label())
    }

    /// Tiles behind the current heatmap, in backend order.
    pub fn tiles(&self) -> &[ScoredTile] {
        &self.tiles
    }

    pub fn heatmap(&self) -> &HeatmapRenderer {
        &self.heatmap
    }

    pub fn hovered(&self) -> Option<OverlayHandle> {
        self.hover.elevated()
    }

    pub fn toggle_selection(&mut self) -> SelectionState {
        self.selector.toggle(&mut self.surface)
    }

    pub fn on_click(&mut self, pos: ScreenPos) -> bool {
        self.selector.on_click(&mut self.surface, pos)
    }

    pub fn on_cursor_move(&mut self, pos: ScreenPos) -> Option<OverlayHandle> {
        self.hover.on_cursor_move(&mut self.surface, pos)
    }

    pub fn set_side_length(&mut self, km: f64) -> f64 {
        self.selector.set_side_length(&mut self.surface, km)
    }

    /// Popup text of the topmost described overlay under `pos`.
    pub fn describe_at(&self, pos: ScreenPos) -> Option<&str> {
        let handle = self.surface.pick_overlay(pos)?;
        self.surface.overlay(handle)?.description.as_deref()
    }

    /// Takes the previewed region and issues a ticket for it. Any job still
    /// in flight is superseded.
    pub fn confirm(&mut self) -> Option<(Region, JobTicket)> {
        let region = self.selector.confirm(&mut self.surface)?;
        let ticket = self.jobs.issue();
        self.status = JobStatus::Submitting;
        info!("job {}: confirmed", ticket.id().0);
        Some((region, ticket))
    }

    /// Updates the visible status from a pipeline event. Events of a
    /// superseded job are ignored.
    pub fn apply_event(&mut self, ticket: &JobTicket, event: &PipelineEvent) {
        if !ticket.is_current() {
            debug!("job {}: ignoring stale event {event:?}", ticket.id().0);
            return;
        }
        match event {
            PipelineEvent::Submitted { session_id } => {
                self.status = JobStatus::Running(Job::new(session_id.clone()));
            }
            PipelineEvent::Progress(progress) => match &mut self.status {
                JobStatus::Running(job) => job.progress = *progress,
                other => debug!("progress {} while {other:?}", progress.label()),
            },
            PipelineEvent::PollRetry {
                failures,
                max_failures,
                message,
            } => {
                warn!(
                    "job {}: retrying progress poll ({failures}/{max_failures}): {message}",
                    ticket.id().0
                );
            }
            PipelineEvent::FetchingResults => {
                if let JobStatus::Running(job) = &self.status {
                    self.status = JobStatus::Fetching(job.clone());
                }
            }
            PipelineEvent::Completed { .. } => {}
        }
    }

    /// Applies the outcome of a run. Only the current ticket may touch the
    /// heatmap; a failed run leaves the previous heatmap in place.
    pub fn finish(
        &mut self,
        ticket: &JobTicket,
        result: Result<Vec<ScoredTile>, PipelineError>,
    ) -> FinishOutcome {
        if !ticket.is_current() {
            info!("job {}: discarding outcome of superseded job", ticket.id().0);
            return FinishOutcome::Discarded;
        }
        match result {
            Ok(tiles) => {
                self.hover.forget();
                let summary = self.heatmap.render(&mut self.surface, &tiles);
                self.tiles = tiles;
                self.status = JobStatus::Completed {
                    tiles: summary.placed,
                };
                FinishOutcome::Rendered(summary)
            }
            Err(PipelineError::Superseded) => FinishOutcome::Discarded,
            Err(err) => {
                error!("job {}: {err}", ticket.id().0);
                let stage = err.stage().unwrap_or(runtime::Stage::Submission);
                self.status = JobStatus::Failed {
                    stage,
                    message: err.to_string(),
                };
                FinishOutcome::Failed
            }
        }
    }

    /// Detaches from the surface: supersedes any running job, stops hover
    /// handling and removes every overlay this controller placed.
    pub fn teardown(&mut self) {
        self.jobs.invalidate();
        self.hover.detach();
        self.selector.reset(&mut self.surface);
        let removed = self.heatmap.clear(&mut self.surface);
        self.tiles.clear();
        self.status = JobStatus::Idle;
        info!("controller torn down, removed {removed} heatmap overlays");
    }
}

/// Forwards pipeline events into a shared controller.
struct ControllerSink<'a, S> {
    controller: &'a RefCell<GlobeController<S>>,
    ticket: JobTicket,
}

impl<S: GlobeSurface> EventSink for ControllerSink<'_, S> {
    fn emit(&mut self, _job: JobId, event: PipelineEvent) {
        self.controller
            .borrow_mut()
            .apply_event(&self.ticket, &event);
    }
}

/// Confirms the previewed region and drives its job to the end.
/// Returns `None` when nothing was previewed.
pub async fn run_confirmed<S, B>(
    controller: &RefCell<GlobeController<S>>,
    orchestrator: &Orchestrator<B>,
) -> Option<FinishOutcome>
where
    S: GlobeSurface,
    B: ScoringBackend,
{
    let (region, ticket) = controller.borrow_mut().confirm()?;
    let mut sink = ControllerSink {
        controller,
        ticket: ticket.clone(),
    };
    let result = orchestrator.run(&region, &ticket, &mut sink).await;
    Some(controller.borrow_mut().finish(&ticket, result))
}
