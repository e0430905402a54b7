use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::StorageError;

/// Caller-supplied cancellation and deadline signal for a single store call.
///
/// Cloning shares the cancellation token, so cancelling a clone cancels the
/// original as well.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    #[must_use]
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Keep the cancellation token and bound the context by `deadline` too.
    #[must_use]
    pub fn and_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first.
    ///
    /// A context that is already cancelled or expired never polls `fut`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Cancelled` or `StorageError::DeadlineExceeded`
    /// when the signal wins, otherwise whatever `fut` resolves to.
    pub async fn run<T, E, F>(&self, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<StorageError>,
    {
        if self.cancel.is_cancelled() {
            return Err(StorageError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(StorageError::DeadlineExceeded);
        }

        let guarded = async {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(StorageError::Cancelled),
                res = fut => res.map_err(Into::into),
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(StorageError::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}
