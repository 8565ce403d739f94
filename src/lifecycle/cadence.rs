//! Countdown warning cadence.
//!
//! # Escalation
//! ```text
//! remaining > 1 min   → tick every coarse interval, "{minutes} minutes."
//! remaining <= 1 min  → tick every fine interval,   "{seconds} seconds."
//! remaining == 0      → expired, hand over to the executor
//! ```
//!
//! Evaluation is pure so the policy can be exercised without a clock.

use std::time::Duration;

use crate::config::ShutdownConfig;

const ONE_MINUTE: Duration = Duration::from_secs(60);

/// What a countdown tick should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Target reached: stop ticking and disconnect.
    Expired,
    /// Broadcast a warning, then sleep `interval` before the next tick.
    Warn {
        interval: Duration,
        /// The interval differs from the one the ticker was running on.
        rearm: bool,
        phrase: String,
    },
}

/// Decide the next step given the time left and the interval currently armed.
pub fn evaluate(remaining: Duration, current_interval: Duration, timings: &ShutdownConfig) -> Tick {
    if remaining.is_zero() {
        return Tick::Expired;
    }

    let (interval, phrase) = if remaining > ONE_MINUTE {
        (timings.coarse_tick(), minutes_phrase(remaining))
    } else {
        (timings.fine_tick(), seconds_phrase(remaining))
    };

    Tick::Warn {
        interval,
        rearm: interval != current_interval,
        phrase,
    }
}

/// Full broadcast text for a countdown phrase.
pub fn warning_text(phrase: &str) -> String {
    format!("Realm is shutting down in {phrase}")
}

fn minutes_phrase(remaining: Duration) -> String {
    format!("{} minutes.", remaining.as_secs() / 60)
}

fn seconds_phrase(remaining: Duration) -> String {
    format!("{} seconds.", round_half_up(remaining))
}

/// Whole seconds, halves rounded up.
pub fn round_half_up(duration: Duration) -> u64 {
    ((duration.as_millis() + 500) / 1000) as u64
}
