//! Token bucket bounding external generation calls.
//!
//! One bucket is shared across the whole run. Callers that exceed it block
//! on the async clock (no busy-spin) until a token frees up or their wait
//! ceiling expires. Accounting happens under a single mutex.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Fixed-capacity bucket refilled to capacity once per interval.
pub struct TokenBucket {
    capacity: u32,
    refill_interval: Duration,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: u32,
    window_start: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self {
            capacity,
            refill_interval,
            state: Mutex::new(BucketState {
                tokens: capacity,
                window_start: Instant::now(),
            }),
        }
    }

    /// Takes a token if one is available right now. Never sleeps.
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        if state.tokens > 0 {
            state.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Takes a token, sleeping until the next refill when the bucket is
    /// empty. Returns `false` when acquiring would exceed `wait_ceiling`,
    /// without consuming anything.
    pub async fn acquire(&self, wait_ceiling: Duration) -> bool {
        let deadline = Instant::now() + wait_ceiling;
        loop {
            let wake_at = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);
                if state.tokens > 0 {
                    state.tokens -= 1;
                    return true;
                }
                state.window_start + self.refill_interval
            };
            if wake_at > deadline {
                return false;
            }
            tokio::time::sleep_until(wake_at).await;
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        if now.duration_since(state.window_start) >= self.refill_interval {
            state.window_start = now;
            state.tokens = self.capacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_capacity_available_immediately() {
        let bucket = TokenBucket::new(2, Duration::from_secs(60));
        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(!bucket.try_acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_caller_waits_a_full_interval() {
        let interval = Duration::from_secs(60);
        let bucket = TokenBucket::new(1, interval);

        let start = Instant::now();
        assert!(bucket.acquire(Duration::from_secs(300)).await);
        assert_eq!(start.elapsed(), Duration::ZERO);

        // Bucket empty: the second acquire must block for the refill.
        assert!(bucket.acquire(Duration::from_secs(300)).await);
        assert!(
            start.elapsed() >= interval,
            "second token arrived after {:?}, expected ≥ {:?}",
            start.elapsed(),
            interval
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_ceiling_exceeded_returns_false() {
        let bucket = TokenBucket::new(1, Duration::from_secs(60));
        assert!(bucket.try_acquire().await);

        // Next token is a full minute away; a 5s ceiling cannot cover it.
        let start = Instant::now();
        assert!(!bucket.acquire(Duration::from_secs(5)).await);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_share_a_token() {
        let interval = Duration::from_secs(60);
        let bucket = std::sync::Arc::new(TokenBucket::new(1, interval));
        let start = Instant::now();

        let a = tokio::spawn({
            let bucket = bucket.clone();
            async move { (bucket.acquire(Duration::from_secs(600)).await, Instant::now()) }
        });
        let b = tokio::spawn({
            let bucket = bucket.clone();
            async move { (bucket.acquire(Duration::from_secs(600)).await, Instant::now()) }
        });

        let (a_ok, a_at) = a.await.unwrap();
        let (b_ok, b_at) = b.await.unwrap();
        assert!(a_ok && b_ok);

        // Exactly one caller got the initial token; the other waited ≥ one
        // full interval for the refill.
        let (first, second) = if a_at <= b_at { (a_at, b_at) } else { (b_at, a_at) };
        assert!(first.duration_since(start) < interval);
        assert!(second.duration_since(start) >= interval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_restores_full_capacity() {
        let bucket = TokenBucket::new(3, Duration::from_secs(10));
        for _ in 0..3 {
            assert!(bucket.try_acquire().await);
        }
        assert!(!bucket.try_acquire().await);

        tokio::time::advance(Duration::from_secs(10)).await;
        for _ in 0..3 {
            assert!(bucket.try_acquire().await);
        }
        assert!(!bucket.try_acquire().await);
    }
}
