//! Session win state
//!
//! A game reports its win predicate every tick. The session wins only after
//! the predicate has held continuously for the confirmation delay, and wins
//! exactly once until reset.

use serde::{Deserialize, Serialize};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    /// Predicate true since `since_tick`, waiting out the confirmation delay
    WinPending { since_tick: u64 },
    /// Terminal until reset
    Won,
}

/// Transitions reported by [`Session::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    WinPending,
    WinCancelled,
    Won,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    phase: SessionPhase,
    confirm_ticks: u64,
    /// Win modal dismissed, continue/explanation action unlocked
    acknowledged: bool,
}

impl Session {
    pub fn new(confirm_ticks: u64) -> Self {
        Self {
            phase: SessionPhase::Playing,
            confirm_ticks,
            acknowledged: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_won(&self) -> bool {
        self.phase == SessionPhase::Won
    }

    pub fn confirm_ticks(&self) -> u64 {
        self.confirm_ticks
    }

    /// Feed the current win predicate
    pub fn update(&mut self, predicate: bool, tick: u64) -> Option<SessionEvent> {
        match self.phase {
            SessionPhase::Won => None,
            SessionPhase::Playing => {
                if !predicate {
                    return None;
                }
                if self.confirm_ticks == 0 {
                    self.phase = SessionPhase::Won;
                    log::info!("Session won");
                    return Some(SessionEvent::Won);
                }
                self.phase = SessionPhase::WinPending { since_tick: tick };
                Some(SessionEvent::WinPending)
            }
            SessionPhase::WinPending { since_tick } => {
                if !predicate {
                    self.phase = SessionPhase::Playing;
                    log::debug!(
                        "Pending win cancelled after {} ticks",
                        tick.saturating_sub(since_tick)
                    );
                    return Some(SessionEvent::WinCancelled);
                }
                if tick.saturating_sub(since_tick) >= self.confirm_ticks {
                    self.phase = SessionPhase::Won;
                    log::info!("Session won");
                    return Some(SessionEvent::Won);
                }
                None
            }
        }
    }

    /// Dismiss the win modal; unlocks the continue action
    pub fn acknowledge(&mut self) {
        if self.is_won() {
            self.acknowledged = true;
        }
    }

    pub fn modal_open(&self) -> bool {
        self.is_won() && !self.acknowledged
    }

    pub fn can_continue(&self) -> bool {
        self.is_won() && self.acknowledged
    }

    pub fn reset(&mut self) {
        self.phase = SessionPhase::Playing;
        self.acknowledged = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_after_delay() {
        let mut s = Session::new(3);
        assert_eq!(s.update(true, 10), Some(SessionEvent::WinPending));
        assert_eq!(s.update(true, 11), None);
        assert_eq!(s.update(true, 12), None);
        assert_eq!(s.update(true, 13), Some(SessionEvent::Won));
        assert!(s.is_won());
        assert_eq!(s.update(true, 14), None);
        assert_eq!(s.update(false, 15), None);
        assert!(s.is_won());
    }

    #[test]
    fn test_interruption_cancels() {
        let mut s = Session::new(3);
        s.update(true, 0);
        s.update(true, 1);
        assert_eq!(s.update(false, 2), Some(SessionEvent::WinCancelled));
        assert_eq!(s.phase(), SessionPhase::Playing);
        // Timer restarts from scratch
        s.update(true, 3);
        assert_eq!(s.update(true, 5), None);
        assert_eq!(s.update(true, 6), Some(SessionEvent::Won));
    }

    #[test]
    fn test_tick_going_backwards_is_harmless() {
        let mut s = Session::new(3);
        s.update(true, 10);
        // A reset game clock restarts ticks below `since_tick`
        assert_eq!(s.update(true, 2), None);
        assert_eq!(s.update(false, 1), Some(SessionEvent::WinCancelled));
        assert_eq!(s.phase(), SessionPhase::Playing);
    }

    #[test]
    fn test_zero_delay_wins_immediately() {
        let mut s = Session::new(0);
        assert_eq!(s.update(true, 0), Some(SessionEvent::Won));
    }

    #[test]
    fn test_acknowledge_and_reset() {
        let mut s = Session::new(0);
        s.acknowledge();
        assert!(!s.can_continue());
        s.update(true, 0);
        assert!(s.modal_open());
        s.acknowledge();
        assert!(!s.modal_open());
        assert!(s.can_continue());
        s.reset();
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert!(!s.can_continue());
    }
}
