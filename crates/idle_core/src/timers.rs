//! Deadline queue for the recurring and one-shot jobs of the simulation
//! (factory production cycles, planet respawn). Only the frame loop pops it.

use crate::{ScheduledTimer, TimerKind, TimerQueue};

impl TimerQueue {
    pub fn schedule(&mut self, due_ms: u64, kind: TimerKind) {
        self.entries.push(ScheduledTimer { due_ms, kind });
    }

    /// Removes every pending timer of `kind`. Returns how many were dropped.
    pub fn cancel(&mut self, kind: TimerKind) -> usize {
        let before = self.entries.len();
        self.entries.retain(|timer| timer.kind != kind);
        before - self.entries.len()
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|timer| timer.kind == kind)
    }

    #[cfg(test)]
    pub fn due_at(&self, kind: TimerKind) -> Option<u64> {
        self.entries
            .iter()
            .filter(|timer| timer.kind == kind)
            .map(|timer| timer.due_ms)
            .min()
    }

    /// Pops the earliest timer due at or before `now_ms` whose kind matches
    /// `filter`. Ties resolve in scheduling order.
    pub fn pop_due(
        &mut self,
        now_ms: u64,
        filter: impl Fn(&TimerKind) -> bool,
    ) -> Option<ScheduledTimer> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= now_ms && filter(&timer.kind))
            .min_by_key(|(index, timer)| (timer.due_ms, *index))
            .map(|(index, _)| index)?;
        Some(self.entries.remove(index))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
