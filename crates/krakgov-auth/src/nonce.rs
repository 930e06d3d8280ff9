//! Strictly increasing nonces for private requests

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Millisecond-clock nonce source
///
/// Each value is `max(now_ms, previous + 1)`, so nonces never repeat or go
/// backwards even when several requests are signed within one millisecond or
/// the wall clock steps back. One source belongs to one credential set.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    /// Create a fresh nonce source
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next nonce
    pub fn next(&self) -> u64 {
        let now = now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        now.max(previous + 1)
    }

    /// Last nonce handed out, or 0 if none yet
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonces_strictly_increase() {
        let source = NonceSource::new();
        let mut previous = source.next();
        for _ in 0..10_000 {
            let nonce = source.next();
            assert!(nonce > previous, "{} <= {}", nonce, previous);
            previous = nonce;
        }
        assert_eq!(source.last(), previous);
    }

    #[test]
    fn test_nonce_tracks_wall_clock() {
        let source = NonceSource::new();
        let nonce = source.next();
        let now = now_millis();
        assert!(nonce <= now + 1);
        assert!(nonce + 1_000 > now);
    }
}
