//! Deadline timers.
//!
//! The engine never sleeps. Each delayed action is a named deadline; the
//! host asks for [`Timers::next_deadline`], wakes up at or after it, and
//! drives `tick(now)`. Re-arming a timer replaces its deadline.

use std::collections::HashMap;
use ve_core::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Scrolling is considered stopped.
    ScrollSettle,
    /// Re-focus the persisted element after mount.
    RestoreFocus,
    /// Deferred image flush after a click.
    PostClickFlush,
    /// A style-update font pin expires.
    FontPin(ElementId),
}

#[derive(Debug, Default)]
pub struct Timers {
    deadlines: HashMap<TimerKind, f64>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, kind: TimerKind, at_ms: f64) {
        self.deadlines.insert(kind, at_ms);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.deadlines.remove(&kind);
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.deadlines.values().copied().reduce(f64::min)
    }

    /// Remove and return every timer due at `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimerKind> {
        let mut due: Vec<(TimerKind, f64)> = self
            .deadlines
            .iter()
            .filter(|&(_, &at)| at <= now_ms)
            .map(|(&kind, &at)| (kind, at))
            .collect();
        due.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (kind, _) in &due {
            self.deadlines.remove(kind);
        }
        due.into_iter().map(|(kind, _)| kind).collect()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_timers_fire_in_deadline_order() {
        let mut timers = Timers::new();
        timers.arm(TimerKind::RestoreFocus, 500.0);
        timers.arm(TimerKind::ScrollSettle, 16.0);
        timers.arm(TimerKind::PostClickFlush, 0.0);
        assert_eq!(timers.next_deadline(), Some(0.0));
        assert_eq!(
            timers.take_due(100.0),
            vec![TimerKind::PostClickFlush, TimerKind::ScrollSettle]
        );
        assert_eq!(timers.next_deadline(), Some(500.0));
        assert!(timers.take_due(499.0).is_empty());
    }

    #[test]
    fn rearming_replaces_the_deadline() {
        let mut timers = Timers::new();
        timers.arm(TimerKind::ScrollSettle, 16.0);
        timers.arm(TimerKind::ScrollSettle, 40.0);
        assert!(timers.take_due(20.0).is_empty());
        assert_eq!(timers.take_due(40.0), vec![TimerKind::ScrollSettle]);
        assert!(!timers.is_armed(TimerKind::ScrollSettle));
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = Timers::new();
        timers.arm(TimerKind::FontPin(ElementId::intern("t.tsx:1:1")), 10.0);
        timers.cancel(TimerKind::FontPin(ElementId::intern("t.tsx:1:1")));
        assert_eq!(timers.next_deadline(), None);
        assert!(timers.take_due(1000.0).is_empty());
    }
}
