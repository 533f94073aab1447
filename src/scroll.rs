//! Timing helpers for the presentation layer: when to fetch the next page, and
//! when a burst of keystrokes has settled enough to ask for suggestions.

use std::time::{Duration, Instant};

/// Decides when the next page should be requested while the user scrolls.
#[derive(Debug, Clone)]
pub struct ProximityTrigger {
  threshold: usize,
  last_fired_frame: Option<u64>,
}

impl ProximityTrigger {
  pub fn new(threshold: usize) -> Self {
    Self { threshold, last_fired_frame: None }
  }

  /// `remaining` is the number of rows left below the visible window.
  /// Fires at most once per `frame`, and never while a fetch is pending or no
  /// further page exists.
  pub fn should_fire(&mut self, frame: u64, remaining: usize, pending: bool, has_more: bool) -> bool {
    if pending || !has_more || remaining >= self.threshold {
      return false;
    }
    if self.last_fired_frame == Some(frame) {
      return false;
    }
    self.last_fired_frame = Some(frame);
    true
  }
}

/// Trailing-edge debounce: `ready` turns true once, `delay` after the last `poke`.
#[derive(Debug, Clone)]
pub struct Debounce {
  delay: Duration,
  deadline: Option<Instant>,
}

impl Debounce {
  pub fn new(delay: Duration) -> Self {
    Self { delay, deadline: None }
  }

  /// Record activity at `now`, pushing the deadline back.
  pub fn poke(&mut self, now: Instant) {
    self.deadline = Some(now + self.delay);
  }

  pub fn cancel(&mut self) {
    self.deadline = None;
  }

  /// True exactly once after the deadline passes.
  pub fn ready(&mut self, now: Instant) -> bool {
    match self.deadline {
      Some(deadline) if now >= deadline => {
        self.deadline = None;
        true
      }
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- ProximityTrigger ---

  #[test]
  fn fires_inside_threshold() {
    let mut t = ProximityTrigger::new(4);
    assert!(!t.should_fire(1, 10, false, true));
    assert!(!t.should_fire(2, 4, false, true));
    assert!(t.should_fire(3, 3, false, true));
  }

  #[test]
  fn once_per_frame() {
    let mut t = ProximityTrigger::new(4);
    assert!(t.should_fire(7, 0, false, true));
    assert!(!t.should_fire(7, 0, false, true));
    assert!(t.should_fire(8, 0, false, true));
  }

  #[test]
  fn suppressed_while_pending_or_exhausted() {
    let mut t = ProximityTrigger::new(4);
    assert!(!t.should_fire(1, 0, true, true));
    assert!(!t.should_fire(2, 0, false, false));
  }

  // --- Debounce ---

  #[test]
  fn debounce_waits_for_quiet_period() {
    let start = Instant::now();
    let mut d = Debounce::new(Duration::from_millis(300));
    assert!(!d.ready(start));

    d.poke(start);
    d.poke(start + Duration::from_millis(200));
    assert!(!d.ready(start + Duration::from_millis(400)));
    assert!(d.ready(start + Duration::from_millis(500)));
    assert!(!d.ready(start + Duration::from_millis(600)));
  }

  #[test]
  fn debounce_cancel() {
    let start = Instant::now();
    let mut d = Debounce::new(Duration::from_millis(10));
    d.poke(start);
    d.cancel();
    assert!(!d.ready(start + Duration::from_secs(1)));
  }
}
