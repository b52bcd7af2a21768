use std::time::Instant;

/// A classic token bucket: tokens refill continuously at `rate` per
/// second up to `capacity`, and each admitted unit of work spends one.
/// No crate in the surrounding stack provides this, so it is hand-rolled
/// here rather than pulled in from elsewhere.
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    rate_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(rate_per_sec: u32) -> Self {
        let rate_per_sec = rate_per_sec as f64;
        Self {
            capacity: rate_per_sec,
            tokens: rate_per_sec,
            rate_per_sec,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Spends one token if available, returning whether the caller may
    /// proceed.
    pub fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn denies_once_capacity_is_exhausted() {
        let mut bucket = TokenBucket::new(2);
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }

    #[test]
    fn refills_over_time() {
        let mut bucket = TokenBucket::new(100);
        for _ in 0..100 {
            assert!(bucket.try_acquire());
        }
        assert!(!bucket.try_acquire());

        sleep(Duration::from_millis(20));
        assert!(bucket.try_acquire());
    }
}
