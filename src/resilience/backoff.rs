//! Delay strategies between poll attempts.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How long to wait after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum DelayStrategy {
    /// Always wait the same duration.
    Fixed {
        #[serde(with = "millis")]
        delay: Duration,
    },
    /// Wait `base * 2^(attempt-1)`, optionally capped.
    Exponential {
        #[serde(with = "millis")]
        base: Duration,
        #[serde(default, with = "opt_millis")]
        cap: Option<Duration>,
    },
}

impl DelayStrategy {
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    pub fn exponential(base: Duration) -> Self {
        Self::Exponential { base, cap: None }
    }

    /// Delay to wait after attempt number `attempt` (1-based) failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            DelayStrategy::Fixed { delay } => delay,
            DelayStrategy::Exponential { base, cap } => exponential_delay(attempt, base, cap),
        }
    }
}

/// Calculate `base * 2^(attempt-1)` with saturation, capped at `cap` when set.
pub fn exponential_delay(attempt: u32, base: Duration, cap: Option<Duration>) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.saturating_pow(attempt - 1);
    let delay = base.checked_mul(factor).unwrap_or(Duration::MAX);
    match cap {
        Some(cap) => delay.min(cap),
        None => delay,
    }
}

/// Add 0 to 10% random jitter on top of a delay.
pub fn with_jitter(delay: Duration) -> Duration {
    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    delay.saturating_add(Duration::from_millis(jitter))
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod opt_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|v| v.map(Duration::from_millis))
    }
}
