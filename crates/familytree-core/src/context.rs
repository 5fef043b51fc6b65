//! [`OpContext`]: cancellation and deadline for a single repository call.

use std::{future::Future, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Bounds a unit of work: it can be cancelled through its token and may carry
/// a deadline. Every repository operation takes one.
///
/// Cloning shares the token, so cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
  cancel:   CancellationToken,
  deadline: Option<Instant>,
}

impl OpContext {
  /// A context that is never cancelled and has no deadline.
  pub fn new() -> Self { Self::default() }

  pub fn with_timeout(timeout: Duration) -> Self {
    Self::new().deadline(Instant::now() + timeout)
  }

  /// Replace the deadline, keeping the token.
  pub fn deadline(mut self, deadline: Instant) -> Self {
    self.deadline = Some(deadline);
    self
  }

  pub fn cancel(&self) { self.cancel.cancel(); }

  pub fn is_cancelled(&self) -> bool { self.cancel.is_cancelled() }

  /// Drive `work` to completion unless the context is cancelled or its
  /// deadline passes first. The store call is dropped in either case.
  pub async fn run<T, F>(&self, work: F) -> Result<T>
  where
    F: Future<Output = Result<T>>,
  {
    if self.is_cancelled() {
      return Err(Error::Cancelled);
    }
    if let Some(deadline) = self.deadline
      && deadline <= Instant::now()
    {
      return Err(Error::DeadlineExceeded);
    }

    let expiry = async {
      match self.deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
      }
    };

    tokio::select! {
      biased;
      _ = self.cancel.cancelled() => Err(Error::Cancelled),
      _ = expiry => Err(Error::DeadlineExceeded),
      out = work => out,
    }
  }
}
