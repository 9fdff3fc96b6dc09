//! Shutdown coordination
//!
//! One `ShutdownController` is shared by the signal listener, the server
//! loop and the in-flight tracking middleware. The stop flag lives in a
//! `watch` channel, so late waiters still observe a shutdown that already
//! happened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared stop flag plus a count of requests still being served.
#[derive(Clone)]
pub struct ShutdownController {
    stopping: Arc<watch::Sender<bool>>,
    in_flight: Arc<AtomicUsize>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (stopping, _) = watch::channel(false);
        Self {
            stopping: Arc::new(stopping),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Flip the stop flag. Only the first call has any effect.
    pub fn shutdown(&self) {
        let first = self
            .stopping
            .send_if_modified(|stopping| !std::mem::replace(stopping, true));
        if first {
            tracing::info!(in_flight = self.in_flight(), "shutdown requested");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.stopping.borrow()
    }

    /// Resolve once the stop flag is set.
    pub async fn wait(&self) {
        let mut rx = self.stopping.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|stopping| *stopping).await;
    }

    /// Requests currently inside the router.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Count one request as in flight until the returned guard drops.
    pub fn track_request(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            in_flight: self.in_flight.clone(),
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by the middleware for the lifetime of one request.
pub struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Wait for SIGINT or SIGTERM, then trigger `controller`.
///
/// A handler that cannot be installed is logged and never fires; the
/// other one still does.
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn shutdown_signal(controller: ShutdownController) {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::error!(error = %e, "could not listen for SIGINT");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::error!(error = %e, "could not listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!(signal = received, "stopping geolocation API");
    controller.shutdown();
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_starts_running_with_nothing_in_flight() {
        let controller = ShutdownController::default();
        assert!(!controller.is_shutdown());
        assert_eq!(controller.in_flight(), 0);
    }

    #[test]
    fn test_shutdown_without_waiters_is_sticky() {
        let controller = ShutdownController::new();
        controller.shutdown();
        controller.shutdown();
        assert!(controller.is_shutdown());
        assert!(controller.clone().is_shutdown());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_shutdown_logs_in_flight_count() {
        let controller = ShutdownController::new();
        let _request = controller.track_request();

        controller.shutdown();

        assert!(logs_contain("shutdown requested"));
        assert!(logs_contain("in_flight=1"));
    }

    #[tokio::test]
    async fn test_wait_wakes_every_waiter() {
        let controller = ShutdownController::new();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let c = controller.clone();
                tokio::spawn(async move { c.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(waiters.iter().all(|w| !w.is_finished()));

        controller.shutdown();

        for waiter in waiters {
            tokio::time::timeout(Duration::from_millis(500), waiter)
                .await
                .expect("waiter not woken")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_wait_after_shutdown_returns_immediately() {
        let controller = ShutdownController::new();
        controller.shutdown();

        tokio::time::timeout(Duration::from_millis(50), controller.wait())
            .await
            .expect("wait should see the earlier shutdown");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_tracks_concurrent_requests() {
        let controller = ShutdownController::new();

        let requests: Vec<_> = (0..8)
            .map(|_| {
                let guard = controller.track_request();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    drop(guard);
                })
            })
            .collect();

        assert_eq!(controller.in_flight(), 8);
        futures::future::join_all(requests).await;
        assert_eq!(controller.in_flight(), 0);
    }
}
