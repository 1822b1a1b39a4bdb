//! # Randomized retry delays.
//!
//! Several operations failing against the same backend at the same moment
//! will otherwise retry in lockstep. [`JitterPolicy`] spreads them out.
//!
//! - [`JitterPolicy::None`] — exact delay
//! - [`JitterPolicy::Full`] — uniform in `[0, delay]`
//! - [`JitterPolicy::Equal`] — `delay/2` plus uniform in `[0, delay/2]`
//! - [`JitterPolicy::Decorrelated`] — uniform in `[floor, min(3 × delay, max)]`

use rand::Rng;
use std::time::Duration;

/// Randomization strategy for retry delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the computed delay as is.
    #[default]
    None,
    /// Anywhere between zero and the computed delay.
    Full,
    /// Keep half the delay, randomize the other half.
    Equal,
    /// Range widens with the delay itself; needs the floor and cap, see
    /// [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    ///
    /// `Decorrelated` needs extra context and returns `delay` unchanged here.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = millis(delay);
        if ms == 0 {
            return delay;
        }
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + extra)
            }
        }
    }

    /// Decorrelated jitter: uniform in `[floor, min(3 × delay, max)]`.
    ///
    /// Other policies fall back to [`apply`](Self::apply)`(delay)`.
    pub fn apply_decorrelated(&self, floor: Duration, delay: Duration, max: Duration) -> Duration {
        if !matches!(self, JitterPolicy::Decorrelated) {
            return self.apply(delay);
        }
        let lo = millis(floor);
        let hi = millis(delay).saturating_mul(3).min(millis(max)).max(lo);
        if lo >= hi {
            return floor;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}
