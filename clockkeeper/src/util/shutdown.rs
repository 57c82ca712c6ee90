//! Shutdown coordination.
//!
//! The restart loop never ends by itself; the only way out is a signal
//! delivered to the supervisor. The coordinator records which signal asked
//! for shutdown so the supervisor can exit with the matching status.

use clockkeeper_proc::Signal;
use tokio::sync::watch;

/// Shutdown signal that can be cloned and awaited.
///
/// Once shutdown has been requested it stays requested: waiting after the
/// fact returns immediately.
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<Option<Signal>>,
}

impl ShutdownSignal {
    /// Wait for shutdown and return the signal that triggered it.
    pub async fn recv(&mut self) -> Signal {
        loop {
            if let Some(sig) = *self.receiver.borrow_and_update() {
                return sig;
            }
            if self.receiver.changed().await.is_err() {
                // Coordinator dropped without a shutdown: wait forever
                std::future::pending::<()>().await;
            }
        }
    }

    /// The triggering signal, if shutdown has already been requested.
    pub fn requested(&self) -> Option<Signal> {
        *self.receiver.borrow()
    }
}

/// Shutdown coordinator that can send shutdown signals.
pub struct ShutdownCoordinator {
    sender: watch::Sender<Option<Signal>>,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Get a signal receiver.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Trigger shutdown. Only the first trigger is recorded.
    pub fn shutdown(&self, sig: Signal) {
        self.sender.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(sig);
                true
            } else {
                false
            }
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve when SIGINT or SIGTERM is delivered to this process.
pub async fn wait_for_termination() -> Signal {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install SIGINT handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
            Signal::Int
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
            Signal::Term
        }
    }
}
