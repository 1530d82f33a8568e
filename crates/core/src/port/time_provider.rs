// Wall clock used to time job execution

/// Clock behind the executor's duration logs; swap it to control time in tests
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Real clock backed by chrono
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
