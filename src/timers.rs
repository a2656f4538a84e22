//! Scheduled reverts processed once per frame.
//!
//! Every delayed effect in the game (decoy flash, transient status text, glow
//! spike) is an event with a due time on the session clock and a generation
//! stamp.  The handler compares the stamp against current state before
//! applying, so a revert that outlived its purpose is dropped rather than
//! undoing newer state.

/// A delayed effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedEvent {
    /// Put a flashed decoy back to its original colour.
    RestoreDecoyColor { index: usize, generation: u64 },
    /// Replace a transient status message with the resting text.
    RestoreStatus { generation: u64 },
    /// Drop the glow back to its resting intensity.
    RestoreGlow { generation: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    /// `(due_at, sequence, event)`; sequence keeps equal due times in schedule order.
    pending: Vec<(f32, u64, TimedEvent)>,
    next_sequence: u64,
}

impl TimerQueue {
    pub fn schedule(&mut self, due_at: f32, event: TimedEvent) {
        self.pending.push((due_at, self.next_sequence, event));
        self.next_sequence += 1;
    }

    /// Remove every event due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: f32) -> Vec<TimedEvent> {
        let mut due: Vec<(f32, u64, TimedEvent)> = Vec::new();
        self.pending.retain(|entry| {
            if entry.0 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, event)| event).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_due_before_time() {
        let mut queue = TimerQueue::default();
        queue.schedule(1.0, TimedEvent::RestoreGlow { generation: 1 });
        assert!(queue.drain_due(0.99).is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn due_events_come_out_earliest_first() {
        let mut queue = TimerQueue::default();
        queue.schedule(2.0, TimedEvent::RestoreStatus { generation: 1 });
        queue.schedule(0.5, TimedEvent::RestoreDecoyColor { index: 3, generation: 1 });
        queue.schedule(0.5, TimedEvent::RestoreGlow { generation: 2 });
        let due = queue.drain_due(2.0);
        assert_eq!(
            due,
            vec![
                TimedEvent::RestoreDecoyColor { index: 3, generation: 1 },
                TimedEvent::RestoreGlow { generation: 2 },
                TimedEvent::RestoreStatus { generation: 1 },
            ]
        );
        assert!(queue.is_empty());
    }
}
