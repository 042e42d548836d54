use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_CALLS_PER_WINDOW: u32 = 80;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-log limiter shared by every outbound call
///
/// At most `calls` admissions happen in any `window`-long interval. Clones
/// share one budget.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    calls: usize,
    window: Duration,
    admitted: Arc<Mutex<VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(calls: u32, window: Duration) -> Self {
        let calls = calls.max(1) as usize;

        RateLimiter {
            calls,
            window,
            admitted: Arc::new(Mutex::new(VecDeque::with_capacity(calls))),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls as u32
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait until one more call fits in the budget and record it
    ///
    /// The lock is held while sleeping: tokio's mutex queues waiters in
    /// arrival order, so callers are admitted first come, first served.
    pub async fn acquire(&self) {
        let mut admitted = self.admitted.lock().await;

        loop {
            let now = Instant::now();

            while let Some(&oldest) = admitted.front() {
                if now.duration_since(oldest) >= self.window {
                    admitted.pop_front();
                } else {
                    break;
                }
            }

            if admitted.len() < self.calls {
                admitted.push_back(now);
                return;
            }

            if let Some(&oldest) = admitted.front() {
                log::debug!("Rate limit reached, waiting for the window to open");
                tokio::time::sleep_until(oldest + self.window).await;
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new(DEFAULT_CALLS_PER_WINDOW, DEFAULT_WINDOW)
    }
}
