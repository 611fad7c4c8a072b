//! Build session context
//!
//! A session is created once per command invocation and handed to the
//! environment mapper and every task runner call. It carries the session
//! identifier used in log records and the cancellation token that runners
//! are expected to honor.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

/// Per-invocation build context.
///
/// Cloning a session shares its cancellation token.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    started: Instant,
    cancellation_token: CancellationToken,
}

impl Session {
    /// Create a session with a generated identifier
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::with_id(format!("{:x}-{:x}", nanos, std::process::id()))
    }

    /// Create a session with a fixed identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            started: Instant::now(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Time since the session was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Request cancellation of all work running under this session
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Completes when cancellation is requested
    pub async fn cancelled(&self) {
        self.cancellation_token.cancelled().await;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
