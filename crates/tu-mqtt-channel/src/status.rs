//! Connection status shared between a transport handle and its driver.

use std::sync::Arc;

use tokio::sync::watch;

/// Lifecycle of one broker connection.
///
/// `Unconnected → Connecting → Connected → Closed`, with `Disconnected`
/// while the underlying client is between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Unconnected,
    Connecting,
    Connected,
    Disconnected,
    Closed,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unconnected => "unconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Cloneable handle over a `watch` channel holding the current status.
///
/// `Closed` is terminal: once set, later updates are ignored.
#[derive(Debug, Clone)]
pub struct StatusHandle {
    tx: Arc<watch::Sender<ConnectionStatus>>,
}

impl StatusHandle {
    pub fn new(initial: ConnectionStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> ConnectionStatus {
        *self.tx.borrow()
    }

    /// Update the status unless the connection is already closed.
    pub fn set(&self, status: ConnectionStatus) {
        self.tx.send_if_modified(|current| {
            if *current == ConnectionStatus::Closed || *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    /// Mark the connection closed, returning the status it had before.
    pub fn close(&self) -> ConnectionStatus {
        self.tx.send_replace(ConnectionStatus::Closed)
    }
}
