//! Termination signal forwarding
//!
//! SIGINT and SIGTERM become [`LifecycleEvent::Signal`] messages so the
//! controller decides how to shut down.

use tracing::debug;

use crate::application::{LifecycleEvent, LifecycleSender, TerminationSignal};

/// Forward termination signals to the lifecycle controller
#[cfg(unix)]
pub fn forward_signals(sender: LifecycleSender) -> Result<(), std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let tx_int = sender.clone();
    tokio::spawn(async move {
        if sigint.recv().await.is_some() {
            debug!("Received SIGINT");
            let _ = tx_int
                .send(LifecycleEvent::Signal(TerminationSignal::Interrupt))
                .await;
        }
    });

    tokio::spawn(async move {
        if sigterm.recv().await.is_some() {
            debug!("Received SIGTERM");
            let _ = sender
                .send(LifecycleEvent::Signal(TerminationSignal::Terminate))
                .await;
        }
    });

    Ok(())
}

/// Forward Ctrl+C to the lifecycle controller
#[cfg(not(unix))]
pub fn forward_signals(sender: LifecycleSender) -> Result<(), std::io::Error> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Received Ctrl+C");
            let _ = sender
                .send(LifecycleEvent::Signal(TerminationSignal::Interrupt))
                .await;
        }
    });
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn sigterm_becomes_lifecycle_event() {
        let (tx, mut rx) = mpsc::channel(4);
        forward_signals(tx).unwrap();

        nix::sys::signal::raise(nix::sys::signal::Signal::SIGTERM).unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert!(matches!(
            event,
            Some(LifecycleEvent::Signal(TerminationSignal::Terminate))
        ));
    }
}
