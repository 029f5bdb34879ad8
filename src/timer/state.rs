use chrono::{DateTime, Local};
use tracing::debug;

use crate::time_source::{diff_seconds, offset};
use crate::timer::model::{ChronoPreset, DisplayMode};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Phase {
    Clock,
    Stopwatch { started: DateTime<Local> },
    Countdown { target: DateTime<Local> },
}

/// What the display should show for one frame.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Readout {
    Clock(DateTime<Local>),
    Remaining { seconds: i64, expired: bool },
    Elapsed { seconds: i64 },
}

/// Display-mode state machine. A countdown target is fixed when its preset is
/// selected and stays put until the next selection; reaching zero does not
/// leave countdown mode.
#[derive(Debug, Clone)]
pub struct ChronoState {
    phase: Phase,
}

impl Default for ChronoState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChronoState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Clock,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        match self.phase {
            Phase::Clock => DisplayMode::Clock,
            Phase::Stopwatch { .. } => DisplayMode::Timer,
            Phase::Countdown { .. } => DisplayMode::Countdown,
        }
    }

    pub fn countdown_target(&self) -> Option<DateTime<Local>> {
        match self.phase {
            Phase::Countdown { target } => Some(target),
            _ => None,
        }
    }

    pub fn select_clock(&mut self) {
        if self.phase != Phase::Clock {
            debug!("returning to clock mode");
        }
        self.phase = Phase::Clock;
    }

    /// Starts (or restarts) a countdown relative to `now`.
    pub fn start_countdown(&mut self, preset: ChronoPreset, now: DateTime<Local>) {
        let target = offset(now, preset.seconds());
        debug!(preset = preset.label(), %target, "countdown started");
        self.phase = Phase::Countdown { target };
    }

    pub fn start_stopwatch(&mut self, now: DateTime<Local>) {
        debug!(%now, "stopwatch started");
        self.phase = Phase::Stopwatch { started: now };
    }

    pub fn readout(&self, now: DateTime<Local>) -> Readout {
        match self.phase {
            Phase::Clock => Readout::Clock(now),
            Phase::Stopwatch { started } => Readout::Elapsed {
                seconds: (diff_seconds(&started, &now) as i64).max(0),
            },
            Phase::Countdown { target } => {
                let remaining = diff_seconds(&now, &target);
                if remaining <= 0.0 {
                    Readout::Remaining {
                        seconds: 0,
                        expired: true,
                    }
                } else {
                    Readout::Remaining {
                        seconds: remaining as i64,
                        expired: false,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::{ManualClock, TimeSource};

    fn clock() -> ManualClock {
        ManualClock::new(Local::now())
    }

    #[test]
    fn starts_in_clock_mode() {
        let state = ChronoState::new();
        assert_eq!(state.mode(), DisplayMode::Clock);
        assert_eq!(state.countdown_target(), None);
        let now = Local::now();
        assert_eq!(state.readout(now), Readout::Clock(now));
    }

    #[test]
    fn selecting_clock_in_clock_mode_is_a_no_op() {
        let mut state = ChronoState::new();
        state.select_clock();
        assert_eq!(state.mode(), DisplayMode::Clock);
        assert_eq!(state.countdown_target(), None);
    }

    #[test]
    fn ten_second_countdown_expires_and_stays_in_countdown() {
        let clock = clock();
        let mut state = ChronoState::new();
        state.start_countdown(ChronoPreset::TenSeconds, clock.now());

        assert_eq!(
            state.readout(clock.now()),
            Readout::Remaining {
                seconds: 10,
                expired: false
            }
        );

        clock.advance(11);
        assert_eq!(
            state.readout(clock.now()),
            Readout::Remaining {
                seconds: 0,
                expired: true
            }
        );
        assert_eq!(state.mode(), DisplayMode::Countdown);

        for _ in 0..5 {
            clock.advance(60);
            assert_eq!(
                state.readout(clock.now()),
                Readout::Remaining {
                    seconds: 0,
                    expired: true
                }
            );
        }
    }

    #[test]
    fn countdown_reaching_exactly_zero_counts_as_expired() {
        let clock = clock();
        let mut state = ChronoState::new();
        state.start_countdown(ChronoPreset::TenSeconds, clock.now());
        clock.advance(10);
        assert_eq!(
            state.readout(clock.now()),
            Readout::Remaining {
                seconds: 0,
                expired: true
            }
        );
    }

    #[test]
    fn reselecting_a_preset_resets_relative_to_now() {
        let clock = clock();
        let mut state = ChronoState::new();
        state.start_countdown(ChronoPreset::TenMinutes, clock.now());
        clock.advance(120);
        state.start_countdown(ChronoPreset::TenMinutes, clock.now());

        let target = state.countdown_target().expect("target");
        assert_eq!(diff_seconds(&clock.now(), &target), 600.0);
        assert_eq!(
            state.readout(clock.now()),
            Readout::Remaining {
                seconds: 600,
                expired: false
            }
        );
    }

    #[test]
    fn target_does_not_move_while_counting_down() {
        let clock = clock();
        let mut state = ChronoState::new();
        state.start_countdown(ChronoPreset::OneHour, clock.now());
        let target = state.countdown_target();
        clock.advance(1_234);
        let _ = state.readout(clock.now());
        assert_eq!(state.countdown_target(), target);
        assert_eq!(
            state.readout(clock.now()),
            Readout::Remaining {
                seconds: 3_600 - 1_234,
                expired: false
            }
        );
    }

    #[test]
    fn returning_to_clock_clears_the_target() {
        let clock = clock();
        let mut state = ChronoState::new();
        state.start_countdown(ChronoPreset::FiveHours, clock.now());
        state.select_clock();
        assert_eq!(state.mode(), DisplayMode::Clock);
        assert_eq!(state.countdown_target(), None);
    }

    #[test]
    fn stopwatch_counts_up_from_start() {
        let clock = clock();
        let mut state = ChronoState::new();
        state.start_stopwatch(clock.now());
        assert_eq!(state.mode(), DisplayMode::Timer);
        assert_eq!(state.readout(clock.now()), Readout::Elapsed { seconds: 0 });
        clock.advance(3_725);
        assert_eq!(
            state.readout(clock.now()),
            Readout::Elapsed { seconds: 3_725 }
        );
    }
}
