//! Shutdown coordination and the drain state machine.
//!
//! ```text
//! Starting → Listening → Draining → Stopped
//! ```
//!
//! On the termination signal the listener stops accepting, in-flight requests
//! get `grace` to finish, and anything still running after that is abandoned.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};

use crate::http::server::{HttpServer, ServerError};
use crate::lifecycle::startup::announce_ready;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Process lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Listening,
    Draining,
    Stopped,
}

/// How the drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// All in-flight requests finished within the grace period.
    Drained,
    /// The grace period elapsed with requests still running.
    TimedOut,
}

/// Drives an [`HttpServer`] through its lifecycle.
pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
    shutdown: Shutdown,
    grace: Duration,
}

impl Lifecycle {
    pub fn new(grace: Duration) -> Self {
        let (state, _) = watch::channel(LifecycleState::Starting);
        Self {
            state,
            shutdown: Shutdown::new(),
            grace,
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Observe state transitions.
    pub fn watch(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    fn transition(&self, next: LifecycleState) {
        tracing::debug!(from = ?self.state(), to = ?next, "Lifecycle transition");
        self.state.send_replace(next);
    }

    /// Serve until `signal` resolves, then drain for at most the grace period.
    ///
    /// A server task that fails or panics before the signal is returned as an
    /// error; callers treat it as fatal.
    pub async fn run<F>(
        &self,
        server: HttpServer,
        listener: TcpListener,
        signal: F,
    ) -> Result<ShutdownOutcome, ServerError>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        let info = server.state().info.clone();
        let mut task = tokio::spawn(server.run(listener, self.shutdown.subscribe()));

        self.transition(LifecycleState::Listening);
        announce_ready(&info, addr);

        tokio::select! {
            result = &mut task => {
                self.transition(LifecycleState::Stopped);
                result??;
                tracing::warn!("HTTP server exited before a shutdown signal");
                return Ok(ShutdownOutcome::Drained);
            }
            _ = signal => {}
        }

        self.transition(LifecycleState::Draining);
        tracing::info!(grace_secs = self.grace.as_secs_f64(), "Draining in-flight requests");
        self.shutdown.trigger();

        let outcome = match tokio::time::timeout(self.grace, &mut task).await {
            Ok(result) => {
                result??;
                tracing::info!("All connections drained");
                ShutdownOutcome::Drained
            }
            Err(_) => {
                tracing::error!(
                    grace_secs = self.grace.as_secs_f64(),
                    "Grace period elapsed with requests in flight, forcing shutdown"
                );
                task.abort();
                ShutdownOutcome::TimedOut
            }
        };

        self.transition(LifecycleState::Stopped);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    #[test]
    fn shutdown_reaches_all_subscribers() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        shutdown.trigger();
        assert!(a.try_recv().is_ok());
        assert!(b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn idle_server_drains_immediately() {
        let lifecycle = Lifecycle::new(Duration::from_secs(5));
        assert_eq!(lifecycle.state(), LifecycleState::Starting);

        let server = HttpServer::new(ServiceConfig::default()).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut states = lifecycle.watch();

        let outcome = lifecycle
            .run(server, listener, async {
                tokio::time::sleep(Duration::from_millis(50)).await;
            })
            .await
            .unwrap();

        assert_eq!(outcome, ShutdownOutcome::Drained);
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), LifecycleState::Stopped);
    }
}
