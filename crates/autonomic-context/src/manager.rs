//! ContextManager: concurrent per-subject access via DashMap.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use autonomic_core::config::ContextConfig;
use autonomic_core::context::observation::check_well_formed;
use autonomic_core::errors::{AutonomicError, AutonomicResult};
use autonomic_core::{Context, Observation};

use crate::snapshot::SnapshotStream;

pub(crate) type Slot = Arc<Mutex<Context>>;

/// Thread-safe owner of every live context.
pub struct ContextManager {
    config: ContextConfig,
    pub(crate) contexts: DashMap<String, Slot>,
    /// Final snapshots of closed contexts, oldest first, awaiting the learner.
    pub(crate) closed: Mutex<VecDeque<Context>>,
}

impl ContextManager {
    pub fn new(config: ContextConfig) -> Self {
        Self {
            config,
            contexts: DashMap::new(),
            closed: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Create the subject's context if absent, else merge the observation.
    /// Returns the context after the merge.
    pub fn open_or_update(
        &self,
        subject_id: &str,
        observation: Observation,
    ) -> AutonomicResult<Context> {
        self.open_or_update_at(subject_id, observation, Utc::now())
    }

    /// [`Self::open_or_update`] with an explicit observation time.
    pub fn open_or_update_at(
        &self,
        subject_id: &str,
        observation: Observation,
        at: DateTime<Utc>,
    ) -> AutonomicResult<Context> {
        check_well_formed(&observation)
            .map_err(|reason| AutonomicError::invalid_observation(subject_id, reason))?;

        loop {
            let slot = self.slot(subject_id, at);
            let mut ctx = lock_context(&slot, subject_id)?;
            if ctx.is_closed() {
                // Closed between lookup and lock: drop the stale slot and start fresh.
                drop(ctx);
                self.remove_slot(subject_id, &slot);
                continue;
            }
            ctx.apply(
                observation,
                at,
                self.config.strict_types,
                self.config.max_transitions,
            )?;
            return Ok(ctx.clone());
        }
    }

    /// Apply several observations in order under one lock. The batch is
    /// all-or-nothing: if any observation is rejected the context is unchanged.
    pub fn open_or_update_batch(
        &self,
        subject_id: &str,
        observations: Vec<Observation>,
        at: DateTime<Utc>,
    ) -> AutonomicResult<Context> {
        for observation in &observations {
            check_well_formed(observation)
                .map_err(|reason| AutonomicError::invalid_observation(subject_id, reason))?;
        }

        loop {
            let slot = self.slot(subject_id, at);
            let mut ctx = lock_context(&slot, subject_id)?;
            if ctx.is_closed() {
                drop(ctx);
                self.remove_slot(subject_id, &slot);
                continue;
            }
            let mut staged = ctx.clone();
            for observation in observations {
                staged.apply(
                    observation,
                    at,
                    self.config.strict_types,
                    self.config.max_transitions,
                )?;
            }
            *ctx = staged;
            return Ok(ctx.clone());
        }
    }

    /// Close the subject's context, queue its final snapshot, and remove it
    /// from the live set. `None` if the subject is unknown.
    pub fn close(&self, subject_id: &str) -> AutonomicResult<Option<Context>> {
        let Some(slot) = self.contexts.get(subject_id).map(|r| Arc::clone(r.value())) else {
            return Ok(None);
        };
        let final_snapshot = {
            let mut ctx = lock_context(&slot, subject_id)?;
            if !ctx.close() {
                None
            } else {
                Some(ctx.clone())
            }
        };
        self.remove_slot(subject_id, &slot);

        if let Some(snapshot) = &final_snapshot {
            debug!(
                subject_id = %subject_id,
                context_id = %snapshot.id(),
                observation_count = snapshot.observation_count,
                "context closed"
            );
            self.enqueue_closed(snapshot.clone())?;
        }
        Ok(final_snapshot)
    }

    /// Point-in-time view over the live (non-closed) contexts. Membership is
    /// fixed now; each context is copied when the iterator reaches it.
    pub fn snapshot_stream(&self) -> SnapshotStream {
        let mut slots: Vec<(String, Slot)> = self
            .contexts
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));
        SnapshotStream::new(slots.into_iter().map(|(_, slot)| slot).collect())
    }

    /// Copy of one subject's live context.
    pub fn get(&self, subject_id: &str) -> AutonomicResult<Option<Context>> {
        let Some(slot) = self.contexts.get(subject_id).map(|r| Arc::clone(r.value())) else {
            return Ok(None);
        };
        let ctx = lock_context(&slot, subject_id)?;
        Ok((!ctx.is_closed()).then(|| ctx.clone()))
    }

    /// Take every queued final snapshot, oldest first.
    pub fn drain_closed(&self) -> Vec<Context> {
        match self.closed.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    /// Number of final snapshots waiting to be drained.
    pub fn pending_closed(&self) -> usize {
        match self.closed.lock() {
            Ok(queue) => queue.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.contexts.len()
    }

    /// Existing slot for the subject, or a fresh context inserted atomically.
    fn slot(&self, subject_id: &str, at: DateTime<Utc>) -> Slot {
        let entry = self
            .contexts
            .entry(subject_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Context::new(subject_id, at))));
        Arc::clone(entry.value())
    }

    /// Remove the subject's entry only if it is still this slot.
    pub(crate) fn remove_slot(&self, subject_id: &str, slot: &Slot) {
        self.contexts
            .remove_if(subject_id, |_, current| Arc::ptr_eq(current, slot));
    }

    pub(crate) fn enqueue_closed(&self, snapshot: Context) -> AutonomicResult<()> {
        let mut queue = self.closed.lock().map_err(|_| {
            AutonomicError::invalid_observation(snapshot.subject_id(), "closed-context queue poisoned")
        })?;
        if queue.len() >= self.config.max_pending_final_snapshots.max(1) {
            if let Some(dropped) = queue.pop_front() {
                warn!(
                    subject_id = %dropped.subject_id(),
                    context_id = %dropped.id(),
                    "final snapshot queue full, dropping oldest"
                );
            }
        }
        queue.push_back(snapshot);
        Ok(())
    }
}

pub(crate) fn lock_context<'a>(
    slot: &'a Slot,
    subject_id: &str,
) -> AutonomicResult<MutexGuard<'a, Context>> {
    slot.lock()
        .map_err(|_| AutonomicError::invalid_observation(subject_id, "context lock poisoned"))
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}
