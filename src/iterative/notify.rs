//! Rendezvous notification channels between actors and their driver.
//!
//! Every event an actor produces travels over its own single-purpose channel.
//! [`Emitter::emit`] does not complete until a [`Listener`] has taken the value,
//! so an actor can never run ahead of the driver relaying its events. A driver
//! that stops listening stalls the emitting call; a driver that drops the
//! listener makes the call fail with [`Error::ChannelClosed`].

use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::{Error, Result};

type Envelope<T> = (T, oneshot::Sender<()>);

/// Creates a named rendezvous channel.
pub fn handoff<T>(name: &'static str) -> (Emitter<T>, Listener<T>) {
    let (tx, rx) = mpsc::channel(1);
    (Emitter { name, tx }, Listener { name, rx })
}

/// Sending half, owned by an actor.
pub struct Emitter<T> {
    name: &'static str,
    tx: mpsc::Sender<Envelope<T>>,
}

impl<T> Emitter<T> {
    /// Hands `value` to the listener, waiting until it has been received.
    pub async fn emit(&self, value: T) -> Result<()> {
        let (ack, accepted) = oneshot::channel();
        self.tx
            .send((value, ack))
            .await
            .map_err(|_| Error::ChannelClosed(self.name))?;
        accepted.await.map_err(|_| Error::ChannelClosed(self.name))
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").field("name", &self.name).finish()
    }
}

/// Receiving half, owned by the driver.
pub struct Listener<T> {
    name: &'static str,
    rx: mpsc::Receiver<Envelope<T>>,
}

impl<T> Listener<T> {
    /// Receives the next event, releasing the emitter that sent it.
    ///
    /// Returns `None` once the emitting actor has been dropped. Cancel safe: a
    /// `recv` abandoned inside `tokio::select!` loses no event.
    pub async fn recv(&mut self) -> Option<T> {
        let (value, ack) = self.rx.recv().await?;
        // The emitter may have given up waiting; the value is still delivered.
        let _ = ack.send(());
        Some(value)
    }

    /// Receives the next event or fails after `timeout`.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<T> {
        match tokio::time::timeout(timeout, self.recv()).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(Error::ChannelClosed(self.name)),
            Err(_) => Err(Error::Timeout(self.name)),
        }
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("name", &self.name).finish()
    }
}
