//! Termination signals that end a batch early.

use std::io;

/// Which signal stopped the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl Shutdown {
    /// Conventional `128 + signo` exit status.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Interrupt => 130,
            Self::Terminate => 143,
        }
    }
}

/// Signal handlers, installed up front so a signal arriving before the
/// first poll is not lost to the default action.
pub struct ShutdownListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownListener {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for shutdown signal (Ctrl+C or SIGTERM)
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Shutdown {
        tokio::select! {
            _ = self.interrupt.recv() => Shutdown::Interrupt,
            _ = self.terminate.recv() => Shutdown::Terminate,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> Shutdown {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Shutdown::Interrupt,
            Err(_) => std::future::pending().await,
        }
    }
}
