//! Idle sweep: the only mutation the manager performs on its own.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use autonomic_core::errors::AutonomicResult;
use autonomic_core::{Context, ContextStatus};

use crate::manager::{lock_context, ContextManager, Slot};

/// What one sweep did.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// Contexts newly marked idle.
    pub marked_idle: usize,
    /// Final snapshots of contexts closed by this sweep, ordered by subject.
    pub closed: Vec<Context>,
}

impl ContextManager {
    /// Mark contexts idle after `idle_after_secs` without updates and close
    /// those idle for longer than `idle_timeout_secs`. Closed contexts'
    /// final snapshots are queued for [`ContextManager::drain_closed`] and
    /// also returned.
    pub fn sweep_idle(&self, now: DateTime<Utc>) -> AutonomicResult<SweepOutcome> {
        let idle_after = self.config().idle_after();
        let timeout = self.config().idle_timeout();

        let mut slots: Vec<(String, Slot)> = self
            .contexts
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));

        let mut outcome = SweepOutcome::default();
        for (subject_id, slot) in slots {
            let closed = {
                let mut ctx = lock_context(&slot, &subject_id)?;
                if ctx.is_closed() {
                    continue;
                }
                let idle_for = ctx.idle_for(now);
                if idle_for > timeout {
                    ctx.close();
                    Some(ctx.clone())
                } else {
                    if idle_for >= idle_after && ctx.status == ContextStatus::Active {
                        ctx.mark_idle();
                        outcome.marked_idle += 1;
                    }
                    None
                }
            };

            if let Some(snapshot) = closed {
                self.remove_slot(&subject_id, &slot);
                info!(
                    subject_id = %subject_id,
                    context_id = %snapshot.id(),
                    idle_secs = snapshot.idle_for(now).num_seconds(),
                    "idle context closed"
                );
                self.enqueue_closed(snapshot.clone())?;
                outcome.closed.push(snapshot);
            }
        }
        Ok(outcome)
    }
}
