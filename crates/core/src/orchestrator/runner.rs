//! Job orchestrator implementation.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::TranscodeEngine;
use crate::metrics;
use crate::progress::{ProgressDisplay, ProgressReporter};
use crate::runner::JobRunner;
use crate::sink::{DisplayHandle, ResultSink};
use crate::source::{MediaFetcher, Selection, SourceResolver};

use super::config::OrchestratorConfig;
use super::types::{JobEvent, JobState, OrchestratorError};

const EVENT_CAPACITY: usize = 256;

/// Sequences resolve, convert and publish for one request at a time.
///
/// Create one per process around the shared engine and wrap it in an `Arc`
/// to submit from several tasks.
pub struct Orchestrator<E, F>
where
    E: TranscodeEngine,
    F: MediaFetcher,
{
    resolver: SourceResolver<F>,
    runner: JobRunner<E>,
    sink: ResultSink,
    config: OrchestratorConfig,
    state_tx: watch::Sender<JobState>,
    events_tx: broadcast::Sender<JobEvent>,
    progress: RwLock<ProgressReporter>,
}

impl<E, F> Orchestrator<E, F>
where
    E: TranscodeEngine,
    F: MediaFetcher,
{
    /// Create a new orchestrator around the shared engine.
    pub fn new(engine: Arc<E>, fetcher: Arc<F>, config: OrchestratorConfig) -> Self {
        let (state_tx, _) = watch::channel(JobState::Idle);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            resolver: SourceResolver::from_shared(fetcher),
            runner: JobRunner::new(engine),
            sink: ResultSink::new(),
            config,
            state_tx,
            events_tx,
            progress: RwLock::new(ProgressReporter::new()),
        }
    }

    /// Current job state.
    pub fn state(&self) -> JobState {
        *self.state_tx.borrow()
    }

    /// Watch the job state.
    pub fn subscribe_state(&self) -> watch::Receiver<JobState> {
        self.state_tx.subscribe()
    }

    /// Receive UI notifications. Events sent before subscribing are not replayed.
    pub fn subscribe_events(&self) -> broadcast::Receiver<JobEvent> {
        self.events_tx.subscribe()
    }

    /// The progress indicator, or `None` while it is hidden.
    pub async fn progress(&self) -> Option<ProgressDisplay> {
        let reporter = self.progress.read().await;
        reporter.is_visible().then(|| reporter.display())
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    pub fn runner(&self) -> &JobRunner<E> {
        &self.runner
    }

    /// Runs one job for `selection` and returns the published handle.
    ///
    /// Returns once the job has settled back to Idle. An empty selection or
    /// a submit while another job holds the slot is rejected without
    /// touching the state. Every other failure ends in Failed, then Idle.
    pub async fn submit(&self, selection: Selection) -> Result<DisplayHandle, OrchestratorError> {
        if selection.is_empty() {
            return Err(self.reject(OrchestratorError::NoInput));
        }
        if !self.try_begin() {
            return Err(self.reject(OrchestratorError::Busy));
        }

        let _guard = IdleGuard {
            state_tx: &self.state_tx,
            events_tx: &self.events_tx,
        };
        let job_id = Uuid::new_v4();
        let start = Instant::now();
        self.notify(JobEvent::StateChanged(JobState::Acquiring));
        info!(%job_id, "Job started");

        let outcome = self.run_job(job_id, selection).await;

        let label = match &outcome {
            Ok(handle) => {
                self.set_state(JobState::Done);
                info!(%job_id, locator = %handle, "Job done");
                "done"
            }
            Err(e) => {
                self.set_state(JobState::Failed);
                warn!(%job_id, error = %e, "Job failed");
                self.notify(JobEvent::Notice(e.remediation().to_string()));
                e.metric_label()
            }
        };
        metrics::JOBS_TOTAL.with_label_values(&[label]).inc();
        metrics::JOB_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        tokio::time::sleep(self.config.settle_delay()).await;
        self.progress.write().await.hide();
        self.notify(JobEvent::ProgressHidden);
        self.set_state(JobState::Idle);
        debug!(%job_id, "Job settled");

        outcome
    }

    async fn run_job(
        &self,
        job_id: Uuid,
        selection: Selection,
    ) -> Result<DisplayHandle, OrchestratorError> {
        let input = self.resolver.resolve(selection).await?;
        debug!(%job_id, name = %input.name(), bytes = input.len(), "Input resolved");

        self.set_state(JobState::Converting);
        let shown = self.progress.write().await.start();
        self.notify(JobEvent::Progress(shown));

        let (progress_tx, mut progress_rx) = mpsc::channel(self.config.progress_buffer);
        let conversion = self.runner.run_conversion(input, progress_tx);
        let forward = async {
            while let Some(sample) = progress_rx.recv().await {
                let shown = self.progress.write().await.on_sample(sample.ratio);
                self.notify(JobEvent::Progress(shown));
            }
        };
        let (result, ()) = tokio::join!(conversion, forward);
        let output = result?;

        debug!(%job_id, bytes = output.bytes.len(), elapsed_ms = output.elapsed_ms, "Publishing result");
        let handle = self.sink.publish(output.bytes).await?;
        self.notify(JobEvent::Published(handle.clone()));
        Ok(handle)
    }

    /// Atomically claims the slot: Idle becomes Acquiring, anything else stays.
    fn try_begin(&self) -> bool {
        self.state_tx.send_if_modified(|state| {
            if state.accepts_submit() {
                *state = JobState::Acquiring;
                true
            } else {
                false
            }
        })
    }

    fn reject(&self, err: OrchestratorError) -> OrchestratorError {
        debug!(reason = err.metric_label(), "Submit rejected");
        metrics::SUBMITS_REJECTED
            .with_label_values(&[err.metric_label()])
            .inc();
        self.notify(JobEvent::Notice(err.remediation().to_string()));
        err
    }

    fn set_state(&self, state: JobState) {
        self.state_tx.send_replace(state);
        self.notify(JobEvent::StateChanged(state));
    }

    fn notify(&self, event: JobEvent) {
        // No subscribers is fine
        let _ = self.events_tx.send(event);
    }
}

/// Puts the slot back to Idle if a job ends without settling, e.g. when the
/// submit future is dropped mid-job.
struct IdleGuard<'a> {
    state_tx: &'a watch::Sender<JobState>,
    events_tx: &'a broadcast::Sender<JobEvent>,
}

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        let reset = self.state_tx.send_if_modified(|state| {
            if *state == JobState::Idle {
                false
            } else {
                *state = JobState::Idle;
                true
            }
        });
        if reset {
            warn!("Job abandoned before settling, slot released");
            let _ = self.events_tx.send(JobEvent::ProgressHidden);
            let _ = self.events_tx.send(JobEvent::StateChanged(JobState::Idle));
        }
    }
}
