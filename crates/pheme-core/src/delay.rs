//! Production delay provider: randomized pacing between browser actions.

use std::time::Duration;

use crate::traits::DelayProvider;

/// Uniformly random delays in `[min, max)`.
///
/// Randomises action timing to appear more human-like. Pacing only — the
/// scrape outcome must not depend on these pauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl DelayProvider for RandomJitter {
    async fn jitter(&self, min_ms: u64, max_ms: u64) {
        let span = max_ms.saturating_sub(min_ms);
        let ms = min_ms + rand_ms(span);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

// Deterministic jitter based on std — avoids pulling in the `rand` crate.
// Uses a simple xorshift seeded from the current time.
fn rand_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    // Seed from high-resolution clock — good enough for jitter, not crypto.
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    // xorshift64
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand_ms_is_bounded() {
        for _ in 0..100 {
            assert!(rand_ms(1000) < 1000);
        }
    }

    #[test]
    fn rand_ms_zero_span_is_zero() {
        assert_eq!(rand_ms(0), 0);
    }
}
