//! Timing controller: the two deferred-action slots.
//!
//! Timers are plain data. The classifier asks for expired slots whenever the
//! host hands it a timestamp, so no background thread is involved.

/// A scheduled deferred action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSlot<P> {
    /// Absolute deadline in milliseconds.
    pub fire_at: u64,
    /// Arming order, breaks ties between equal deadlines.
    seq: u64,
    pub payload: P,
}

/// A slot that reached its deadline and was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expired<E> {
    /// Long-press deadline; carries the contact-start payload.
    LongPress { fire_at: u64, payload: E },
    /// Double-tap window ran out without being consumed.
    DoubleTapWindow { fire_at: u64 },
}

#[derive(Debug)]
pub struct TimingController<E> {
    long_press: Option<TimerSlot<E>>,
    double_tap_window: Option<TimerSlot<()>>,
    next_seq: u64,
}

impl<E> TimingController<E> {
    pub fn new() -> Self {
        Self {
            long_press: None,
            double_tap_window: None,
            next_seq: 0,
        }
    }

    fn seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Arm the long-press slot, replacing any pending one.
    pub fn arm_long_press(&mut self, now: u64, delay_ms: u64, payload: E) {
        let seq = self.seq();
        self.long_press = Some(TimerSlot {
            fire_at: now.saturating_add(delay_ms),
            seq,
            payload,
        });
    }

    /// Clear the long-press slot. Returns whether something was pending.
    pub fn cancel_long_press(&mut self) -> bool {
        self.long_press.take().is_some()
    }

    pub fn long_press_pending(&self) -> bool {
        self.long_press.is_some()
    }

    pub fn long_press_deadline(&self) -> Option<u64> {
        self.long_press.as_ref().map(|slot| slot.fire_at)
    }

    /// Arm the double-tap window, replacing any pending one.
    pub fn arm_double_tap_window(&mut self, now: u64, window_ms: u64) {
        let seq = self.seq();
        self.double_tap_window = Some(TimerSlot {
            fire_at: now.saturating_add(window_ms),
            seq,
            payload: (),
        });
    }

    /// Take the double-tap window if it is still open.
    pub fn consume_double_tap_window(&mut self) -> bool {
        self.double_tap_window.take().is_some()
    }

    pub fn double_tap_window_pending(&self) -> bool {
        self.double_tap_window.is_some()
    }

    pub fn double_tap_window_deadline(&self) -> Option<u64> {
        self.double_tap_window.as_ref().map(|slot| slot.fire_at)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.long_press_deadline(), self.double_tap_window_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Remove and return the earliest slot whose deadline is `<= now`.
    pub fn pop_expired(&mut self, now: u64) -> Option<Expired<E>> {
        let long_press = self
            .long_press
            .as_ref()
            .filter(|slot| slot.fire_at <= now)
            .map(|slot| (slot.fire_at, slot.seq));
        let window = self
            .double_tap_window
            .as_ref()
            .filter(|slot| slot.fire_at <= now)
            .map(|slot| (slot.fire_at, slot.seq));

        let take_long_press = match (long_press, window) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a <= b,
        };

        if take_long_press {
            self.long_press.take().map(|slot| Expired::LongPress {
                fire_at: slot.fire_at,
                payload: slot.payload,
            })
        } else {
            self.double_tap_window
                .take()
                .map(|slot| Expired::DoubleTapWindow {
                    fire_at: slot.fire_at,
                })
        }
    }
}

impl<E> Default for TimingController<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_replaces_pending_slot() {
        let mut timers = TimingController::new();
        timers.arm_long_press(0, 800, "first");
        timers.arm_long_press(100, 800, "second");
        assert_eq!(timers.next_deadline(), Some(900));
        assert_eq!(timers.pop_expired(850), None);
        assert_eq!(
            timers.pop_expired(900),
            Some(Expired::LongPress {
                fire_at: 900,
                payload: "second"
            })
        );
        assert!(!timers.long_press_pending());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = TimingController::<()>::new();
        assert!(!timers.cancel_long_press());
        timers.arm_long_press(0, 10, ());
        assert!(timers.cancel_long_press());
        assert!(!timers.cancel_long_press());
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn test_window_consumed_once() {
        let mut timers = TimingController::<()>::new();
        timers.arm_double_tap_window(100, 300);
        assert!(timers.double_tap_window_pending());
        assert!(timers.consume_double_tap_window());
        assert!(!timers.consume_double_tap_window());
    }

    #[test]
    fn test_expired_in_deadline_order() {
        let mut timers = TimingController::new();
        timers.arm_double_tap_window(0, 300);
        timers.arm_long_press(100, 100, 1u8);

        assert_eq!(
            timers.pop_expired(1_000),
            Some(Expired::LongPress {
                fire_at: 200,
                payload: 1
            })
        );
        assert_eq!(
            timers.pop_expired(1_000),
            Some(Expired::DoubleTapWindow { fire_at: 300 })
        );
        assert_eq!(timers.pop_expired(1_000), None);
    }

    #[test]
    fn test_equal_deadlines_fire_in_arming_order() {
        let mut timers = TimingController::new();
        timers.arm_double_tap_window(0, 300);
        timers.arm_long_press(0, 300, ());
        assert_eq!(
            timers.pop_expired(300),
            Some(Expired::DoubleTapWindow { fire_at: 300 })
        );
    }
}
