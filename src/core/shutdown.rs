//! # Termination signals.
//!
//! [`terminated`] resolves with the signal that asked the process to stop.
//!
//! **Unix:** `SIGINT`, `SIGTERM` (systemd stop), `SIGQUIT`.
//! **Elsewhere:** `Ctrl-C` only.

/// Signal that requested shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Signal {
    Interrupt,
    Terminate,
    Quit,
}

impl Signal {
    pub(super) fn as_label(&self) -> &'static str {
        match self {
            Signal::Interrupt => "sigint",
            Signal::Terminate => "sigterm",
            Signal::Quit => "sigquit",
        }
    }
}

/// Waits for the first termination signal.
///
/// If the handlers cannot be installed this never resolves, leaving the
/// runtime token as the only way to stop.
#[cfg(unix)]
pub(super) async fn terminated() -> Signal {
    use tokio::signal::unix::{SignalKind, signal};

    let (Ok(mut sigint), Ok(mut sigterm), Ok(mut sigquit)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::quit()),
    ) else {
        return std::future::pending().await;
    };

    tokio::select! {
        _ = sigint.recv()  => Signal::Interrupt,
        _ = sigterm.recv() => Signal::Terminate,
        _ = sigquit.recv() => Signal::Quit,
    }
}

/// Waits for the first termination signal.
#[cfg(not(unix))]
pub(super) async fn terminated() -> Signal {
    match tokio::signal::ctrl_c().await {
        Ok(()) => Signal::Interrupt,
        Err(_) => std::future::pending().await,
    }
}
