//! Lazy, restartable iteration over live contexts.

use autonomic_core::Context;
use tracing::warn;

use crate::manager::Slot;

/// Point-in-time sequence of context copies.
///
/// The set of contexts is fixed when the stream is created; each context is
/// copied under its own lock when reached, so it reflects every observation
/// completed before that moment. Contexts closed in the meantime are skipped.
/// Creating the stream never blocks writers.
#[derive(Clone)]
pub struct SnapshotStream {
    slots: Vec<Slot>,
    position: usize,
}

impl SnapshotStream {
    pub(crate) fn new(slots: Vec<Slot>) -> Self {
        Self { slots, position: 0 }
    }

    /// Rewind to the first context.
    pub fn restart(&mut self) {
        self.position = 0;
    }

    /// Number of contexts captured when the stream was created.
    pub fn captured(&self) -> usize {
        self.slots.len()
    }
}

impl Iterator for SnapshotStream {
    type Item = Context;

    fn next(&mut self) -> Option<Context> {
        while let Some(slot) = self.slots.get(self.position) {
            self.position += 1;
            let ctx = match slot.lock() {
                Ok(ctx) => ctx,
                Err(_) => {
                    warn!("skipping context with poisoned lock");
                    continue;
                }
            };
            if !ctx.is_closed() {
                return Some(ctx.clone());
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len().saturating_sub(self.position)))
    }
}
