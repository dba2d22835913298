//! AutonomicManager: single control-loop driver with an AtomicBool guard.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use autonomic_context::ContextManager;
use autonomic_core::config::AutonomicConfig;
use autonomic_core::errors::{AutonomicError, AutonomicResult, SynthesisError};
use autonomic_core::pattern::{CanonicalEquivalence, StructuralEquivalence};
use autonomic_core::traits::{ActionApplier, ActionDescriber, IPatternStore, RenderedDescriber};
use autonomic_core::{Context, Observation, Pattern, PatternId};
use autonomic_learning::PatternLearner;
use autonomic_observability::tracing_setup::events;
use autonomic_observability::{LoopMetrics, MetricsSnapshot};
use autonomic_storage::StorageEngine;
use autonomic_synthesis::PatternSynthesizer;
use autonomic_validation::PatternValidator;

use crate::acting;
use crate::backoff::{self, TickBackoff};
use crate::lifecycle::LoopStage;
use crate::novelty;
use crate::report::{IterationOutcome, IterationReport, ReportHistory, SkipReason};

/// Requests cancellation of the in-flight (or next) iteration. The iteration
/// stops at the next stage boundary or between two candidates.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Releases the single-execution guard even if a stage panics.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Composition root of the pipeline and the only component that proposes
/// actions to the outside world.
pub struct AutonomicManager {
    config: AutonomicConfig,
    contexts: ContextManager,
    learner: PatternLearner,
    synthesizer: PatternSynthesizer,
    validator: PatternValidator,
    store: Arc<dyn IPatternStore>,
    applier: Arc<dyn ActionApplier>,
    describer: Arc<dyn ActionDescriber>,
    metrics: Arc<LoopMetrics>,
    /// Guard: only one iteration runs at a time.
    is_running: AtomicBool,
    cancel: Arc<AtomicBool>,
    stage: AtomicU8,
    iterations: AtomicU64,
    backoff: Mutex<TickBackoff>,
    history: Mutex<ReportHistory>,
    trigger: Notify,
}

impl AutonomicManager {
    /// Build every component from `config` around an existing store.
    pub fn new(
        config: AutonomicConfig,
        store: Arc<dyn IPatternStore>,
        applier: Arc<dyn ActionApplier>,
    ) -> AutonomicResult<Self> {
        let equivalence: Arc<dyn StructuralEquivalence> =
            Arc::new(CanonicalEquivalence::from_config(&config.equivalence));
        Self::build(config, store, applier, equivalence)
    }

    /// Open the SQLite store named in `config.storage` and build on top of it.
    pub fn open(config: AutonomicConfig, applier: Arc<dyn ActionApplier>) -> AutonomicResult<Self> {
        let equivalence: Arc<dyn StructuralEquivalence> =
            Arc::new(CanonicalEquivalence::from_config(&config.equivalence));
        let store = StorageEngine::from_config(&config.storage, Arc::clone(&equivalence))?;
        Self::build(config, Arc::new(store), applier, equivalence)
    }

    fn build(
        config: AutonomicConfig,
        store: Arc<dyn IPatternStore>,
        applier: Arc<dyn ActionApplier>,
        equivalence: Arc<dyn StructuralEquivalence>,
    ) -> AutonomicResult<Self> {
        config.validate()?;
        Ok(Self {
            contexts: ContextManager::new(config.context.clone()),
            learner: PatternLearner::new(config.learning.clone(), equivalence),
            synthesizer: PatternSynthesizer::new(config.synthesis.clone()),
            validator: PatternValidator::new(Arc::clone(&store)),
            store,
            applier,
            describer: Arc::new(RenderedDescriber),
            metrics: Arc::new(LoopMetrics::new()),
            is_running: AtomicBool::new(false),
            cancel: Arc::new(AtomicBool::new(false)),
            stage: AtomicU8::new(LoopStage::Idle as u8),
            iterations: AtomicU64::new(0),
            backoff: Mutex::new(TickBackoff::new()),
            history: Mutex::new(ReportHistory::new(config.manager.history_len)),
            trigger: Notify::new(),
            config,
        })
    }

    /// Replace the default describer used to fill `action_description`.
    pub fn with_describer(mut self, describer: Arc<dyn ActionDescriber>) -> Self {
        self.describer = describer;
        self
    }

    pub fn config(&self) -> &AutonomicConfig {
        &self.config
    }

    pub fn contexts(&self) -> &ContextManager {
        &self.contexts
    }

    pub fn store(&self) -> &Arc<dyn IPatternStore> {
        &self.store
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn stage(&self) -> LoopStage {
        LoopStage::from_u8(self.stage.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Retained iteration reports, oldest first.
    pub fn history(&self) -> Vec<IterationReport> {
        lock(&self.history).to_vec()
    }

    pub fn last_report(&self) -> Option<IterationReport> {
        lock(&self.history).last()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Ask [`Self::run`] for an iteration now, outside the cadence.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    // --- Ingestion ---

    /// Sole inbound entry point: merge one observation into the subject's context.
    pub fn observe(&self, subject_id: &str, observation: Observation) -> AutonomicResult<Context> {
        self.observe_at(subject_id, observation, Utc::now())
    }

    pub fn observe_at(
        &self,
        subject_id: &str,
        observation: Observation,
        at: DateTime<Utc>,
    ) -> AutonomicResult<Context> {
        self.contexts
            .open_or_update_at(subject_id, observation, at)
            .inspect_err(|e| events::observation_rejected(subject_id, &e.to_string()))
    }

    /// Close a subject's context; its final snapshot feeds the next iteration.
    pub fn close(&self, subject_id: &str) -> AutonomicResult<Option<Context>> {
        let closed = self.contexts.close(subject_id)?;
        if let Some(ctx) = &closed {
            events::context_closed(subject_id, ctx.id(), ctx.observation_count, false);
        }
        Ok(closed)
    }

    // --- Control loop ---

    /// Scheduled tick: honors the post-failure backoff, then runs an iteration.
    pub fn tick(&self) -> IterationReport {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&self, now: DateTime<Utc>) -> IterationReport {
        let skip = lock(&self.backoff).take_skip();
        if let Some(remaining_ticks) = skip {
            self.metrics.iteration_skipped();
            info!(remaining_ticks, "tick skipped after store failure");
            let report = IterationReport::skipped(now, SkipReason::Backoff { remaining_ticks });
            lock(&self.history).push(report.clone());
            return report;
        }
        self.run_iteration_at(now)
    }

    /// Run one iteration now. A concurrent call is refused and reported as skipped.
    pub fn run_iteration(&self) -> IterationReport {
        self.run_iteration_at(Utc::now())
    }

    pub fn run_iteration_at(&self, now: DateTime<Utc>) -> IterationReport {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.metrics.iteration_skipped();
            debug!("iteration already in progress");
            return IterationReport::skipped(now, SkipReason::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.is_running);

        let report = self.execute(now);
        self.stage.store(LoopStage::Idle as u8, Ordering::SeqCst);
        report
    }

    /// Drive iterations on the configured cadence and on [`Self::trigger`]
    /// until `shutdown` changes. Shutdown during an iteration cancels it at
    /// the next stage boundary.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        if *shutdown.borrow() {
            return;
        }
        let mut ticker = tokio::time::interval(self.config.manager.cadence());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            cadence_secs = self.config.manager.cadence_secs,
            "control loop started"
        );

        loop {
            let triggered = tokio::select! {
                _ = ticker.tick() => false,
                _ = self.trigger.notified() => true,
                _ = shutdown.changed() => break,
            };

            let manager = Arc::clone(&self);
            let mut iteration = tokio::task::spawn_blocking(move || {
                if triggered {
                    manager.run_iteration()
                } else {
                    manager.tick()
                }
            });

            let mut stopping = false;
            let joined = tokio::select! {
                joined = &mut iteration => joined,
                _ = shutdown.changed() => {
                    stopping = true;
                    self.cancel();
                    iteration.await
                }
            };
            if let Err(e) = joined {
                error!(error = %e, "control loop iteration aborted");
            }
            if stopping {
                break;
            }
        }
        info!("control loop stopped");
    }

    fn execute(&self, now: DateTime<Utc>) -> IterationReport {
        let iteration = self.iterations.fetch_add(1, Ordering::SeqCst) + 1;
        let span = autonomic_observability::iteration_span!(iteration);
        let _entered = span.enter();
        let started = Instant::now();
        self.metrics.iteration_started();

        let mut report = IterationReport::new(iteration, now);
        let result = self.run_stages(&mut report, now);
        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(()) => {
                report.outcome = IterationOutcome::Completed;
                self.metrics.iteration_completed();
                lock(&self.backoff).record_success();
            }
            Err(AutonomicError::Cancelled { .. }) => {
                info!(stage = %report.stage_reached, "iteration cancelled");
                report.outcome = IterationOutcome::Cancelled {
                    stage: report.stage_reached,
                };
                self.metrics.iteration_cancelled();
            }
            Err(e) => {
                error!(
                    stage = %report.stage_reached,
                    error = %e,
                    "iteration failed, in-flight candidates discarded"
                );
                if e.is_store_unavailable() {
                    lock(&self.backoff).record_failure(self.config.manager.max_backoff_ticks);
                }
                report.outcome = IterationOutcome::Failed {
                    stage: report.stage_reached,
                    error: e.to_string(),
                };
                self.metrics.iteration_failed();
            }
        }
        self.cancel.store(false, Ordering::SeqCst);

        events::iteration_completed(
            iteration,
            report.outcome.label(),
            report.candidates_learned + report.candidates_synthesized,
            report.accepted,
            report.duration_ms,
        );
        lock(&self.history).push(report.clone());
        report
    }

    fn run_stages(&self, report: &mut IterationReport, now: DateTime<Utc>) -> AutonomicResult<()> {
        let window = self.observing(report, now)?;
        let learned = self.learning(report, &window, now)?;
        let synthesized = self.synthesizing(report, now)?;
        let mut candidates = learned;
        candidates.extend(synthesized);
        self.validating(report, candidates, now)?;
        self.storing(report)?;
        self.acting(report, now)
    }

    fn enter(&self, report: &mut IterationReport, stage: LoopStage) -> AutonomicResult<()> {
        report.stage_reached = stage;
        self.stage.store(stage as u8, Ordering::SeqCst);
        self.check_cancelled(stage)
    }

    fn check_cancelled(&self, stage: LoopStage) -> AutonomicResult<()> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(AutonomicError::Cancelled {
                stage: stage.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Sweep idle contexts, then take live snapshots plus queued final snapshots.
    fn observing(&self, report: &mut IterationReport, now: DateTime<Utc>) -> AutonomicResult<Vec<Context>> {
        self.enter(report, LoopStage::Observing)?;
        let _span = autonomic_observability::stage_span!(LoopStage::Observing).entered();

        let swept = self.contexts.sweep_idle(now)?;
        for ctx in &swept.closed {
            events::context_closed(ctx.subject_id(), ctx.id(), ctx.observation_count, true);
        }

        let mut window: Vec<Context> = self.contexts.snapshot_stream().collect();
        let finals = self.contexts.drain_closed();
        report.contexts_closed = finals.len();
        window.extend(finals);
        report.contexts_observed = window.len();
        Ok(window)
    }

    fn learning(
        &self,
        report: &mut IterationReport,
        window: &[Context],
        now: DateTime<Utc>,
    ) -> AutonomicResult<Vec<Pattern>> {
        self.enter(report, LoopStage::Learning)?;
        let _span = autonomic_observability::stage_span!(LoopStage::Learning).entered();

        let candidates = self.learner.observe_at(window, now)?;
        report.candidates_learned = candidates.len();
        self.metrics.record_learned(candidates.len());
        Ok(candidates)
    }

    /// One synthesis pass per enabled tier over the accepted lower tiers.
    fn synthesizing(&self, report: &mut IterationReport, now: DateTime<Utc>) -> AutonomicResult<Vec<Pattern>> {
        self.enter(report, LoopStage::Synthesizing)?;
        let _span = autonomic_observability::stage_span!(LoopStage::Synthesizing).entered();

        let mut candidates = Vec::new();
        for tier in self.config.synthesis.tiers() {
            self.check_cancelled(LoopStage::Synthesizing)?;
            let sources = self.with_store_retry(LoopStage::Synthesizing, || {
                self.store.list_accepted(0, tier - 1)
            })?;
            let outcome = self.synthesizer.synthesize_at(&sources, tier, now)?;
            for discarded in &outcome.discarded {
                events::data_integrity_warning(discarded_id(discarded), &discarded.to_string());
            }
            report.candidates_discarded += outcome.discarded.len();
            candidates.extend(outcome.candidates);
        }
        report.candidates_synthesized = candidates.len();
        self.metrics.record_synthesized(candidates.len());
        Ok(candidates)
    }

    /// Judge each candidate on its uncredited evidence.
    fn validating(
        &self,
        report: &mut IterationReport,
        candidates: Vec<Pattern>,
        now: DateTime<Utc>,
    ) -> AutonomicResult<()> {
        self.enter(report, LoopStage::Validating)?;
        let _span = autonomic_observability::stage_span!(LoopStage::Validating).entered();

        let policy = &self.config.validation;
        for candidate in candidates {
            self.check_cancelled(LoopStage::Validating)?;

            let stored =
                self.with_store_retry(LoopStage::Validating, || self.store.get(&candidate.id))?;
            let Some(credited) = novelty::credit_new_evidence(&candidate, stored.as_ref()) else {
                report.candidates_unchanged += 1;
                continue;
            };
            let outcome = self.with_store_retry(LoopStage::Validating, || {
                self.validator.assess(&credited, policy, now)
            })?;

            if outcome.reinforced {
                report.reinforced += 1;
                continue;
            }
            let pattern = outcome.pattern;
            if let Some(reason) = &outcome.rejection {
                report.rejected += 1;
                self.metrics.record_rejected(1);
                events::pattern_rejected(pattern.id.as_str(), pattern.tier, &reason.to_string());
            }
            for old in &outcome.superseded {
                events::pattern_superseded(old.as_str(), pattern.id.as_str());
            }
            report.superseded += outcome.superseded.len();
            self.metrics.record_superseded(outcome.superseded.len());
            if outcome.newly_accepted {
                report.accepted += 1;
                self.metrics.record_accepted(1);
                events::pattern_accepted(
                    pattern.id.as_str(),
                    pattern.tier,
                    pattern.confidence.value(),
                    pattern.evidence_count,
                );
            }
        }
        Ok(())
    }

    fn storing(&self, report: &mut IterationReport) -> AutonomicResult<()> {
        self.enter(report, LoopStage::Storing)?;
        let _span = autonomic_observability::stage_span!(LoopStage::Storing).entered();

        let stats = self.with_store_retry(LoopStage::Storing, || self.store.stats())?;
        debug!(
            pending = stats.pending,
            accepted = stats.accepted,
            rejected = stats.rejected,
            superseded = stats.superseded,
            "pattern store state"
        );
        report.store = Some(stats);
        Ok(())
    }

    /// Hand every accepted, never-proposed pattern that meets the application
    /// thresholds to the applier, then mark it proposed. A failed hand-off
    /// leaves the patterns unmarked, so the next iteration offers them again.
    fn acting(&self, report: &mut IterationReport, now: DateTime<Utc>) -> AutonomicResult<()> {
        self.enter(report, LoopStage::Acting)?;
        let _span = autonomic_observability::stage_span!(LoopStage::Acting).entered();

        let policy = &self.config.application;
        let eligible = self.with_store_retry(LoopStage::Acting, || {
            self.store
                .list_unproposed(policy.min_confidence, policy.min_evidence)
        })?;
        let actions = acting::select_actions(&eligible, policy, self.describer.as_ref());
        if actions.is_empty() {
            return Ok(());
        }
        self.applier.propose(&actions)?;

        let ids: Vec<PatternId> = actions.iter().map(|a| a.pattern_id.clone()).collect();
        self.with_store_retry(LoopStage::Acting, || self.store.mark_proposed(&ids, now))?;
        events::actions_proposed(actions.len());
        self.metrics.record_actions(actions.len());
        report.actions = actions;
        Ok(())
    }

    /// Retry `op` while the store is unavailable, sleeping
    /// `backoff_base_ms * 2^attempt` between attempts.
    fn with_store_retry<T>(
        &self,
        stage: LoopStage,
        mut op: impl FnMut() -> AutonomicResult<T>,
    ) -> AutonomicResult<T> {
        let max_retries = self.config.manager.max_store_retries;
        let mut attempt = 0u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_store_unavailable() && attempt < max_retries => {
                    events::stage_failed(stage.as_str(), &e.to_string(), attempt + 1);
                    self.metrics.store_retry();
                    std::thread::sleep(backoff::retry_delay(&self.config.manager, attempt));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn discarded_id(error: &SynthesisError) -> &str {
    match error {
        SynthesisError::ProvenanceCycle { pattern_id, .. }
        | SynthesisError::TierViolation { pattern_id, .. }
        | SynthesisError::EmptyProvenance { pattern_id } => pattern_id,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
