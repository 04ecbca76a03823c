//! Signals that end the process.
//!
//! There is no graceful drain: in-flight requests are abandoned and the
//! supervisor is expected to restart the service.

use std::io;

#[cfg(unix)]
pub struct FatalSignals {
    interrupt: tokio::signal::unix::Signal,
    user1: tokio::signal::unix::Signal,
    alarm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl FatalSignals {
    /// Registers SIGINT, SIGUSR1 and SIGALRM. Must be called from within a
    /// tokio runtime.
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(FatalSignals {
            interrupt: signal(SignalKind::interrupt())?,
            user1: signal(SignalKind::user_defined1())?,
            alarm: signal(SignalKind::alarm())?,
        })
    }

    /// Resolves with the name of the first signal received.
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.user1.recv() => "SIGUSR1",
            _ = self.alarm.recv() => "SIGALRM",
        }
    }
}

#[cfg(not(unix))]
pub struct FatalSignals {}

#[cfg(not(unix))]
impl FatalSignals {
    pub fn register() -> io::Result<Self> {
        Ok(FatalSignals {})
    }

    pub async fn recv(&mut self) -> &'static str {
        let _ = tokio::signal::ctrl_c().await;
        "CTRL-C"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::Duration;

    // A single test, so no other test in this process races on the same signal.
    #[tokio::test]
    async fn test_fatal_signal_is_reported() {
        let mut signals = FatalSignals::register().unwrap();

        let pending = tokio::time::timeout(Duration::from_millis(50), signals.recv()).await;
        assert!(pending.is_err());

        let status = Command::new("kill")
            .args(["-USR1", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let received = tokio::time::timeout(Duration::from_secs(5), signals.recv())
            .await
            .expect("signal should arrive");
        assert_eq!(received, "SIGUSR1");
    }
}
