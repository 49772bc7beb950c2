//! Set-once stop signal shared by a session and its sweep.

use tokio_util::sync::CancellationToken;

/// Cooperative "stop requested" flag.
///
/// Clones observe the same flag. Once set it stays set; a session that was
/// cancelled hands out a fresh signal only by being replaced.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Repeated calls are no-ops.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// A signal that is cancelled along with `self` but can also be
    /// cancelled on its own without affecting `self`.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
