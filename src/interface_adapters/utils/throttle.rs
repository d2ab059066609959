use std::time::Duration;
use tokio::time::Instant;

pub const LOG_THROTTLE: Duration = Duration::from_secs(2);

/// Rate limiter for repetitive warnings on hot paths.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    window: Duration,
    last: Option<Instant>,
}

impl LogThrottle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true at most once per window; the first call always passes.
    pub fn should_log(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(LOG_THROTTLE)
    }
}
