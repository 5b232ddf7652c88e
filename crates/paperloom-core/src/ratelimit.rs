//! Minimum-delay gate for upstream requests
//!
//! Constructed once per run and passed to whoever talks to the API; tests
//! inject a zero-delay instance.

use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct RateLimiter {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    /// A limiter that never waits, for tests.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Block until at least `delay` has passed since the previous `wait()`
    /// returned. The first call never waits. The last-request instant is
    /// stamped when this returns, so a slow request does not add its own
    /// duration on top of the delay.
    pub fn wait(&self) {
        let mut last = self.last.lock().expect("rate limiter lock poisoned");
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}
