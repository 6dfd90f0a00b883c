//! Outbound replies with a per-send timeout and best-effort presence.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::conversation::ChatRef;
use crate::domain::dispatch::Attachment;
use crate::ports::{Messenger, MessengerError, OutboundImage, Presence};

/// Default bound on a single outbound send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Wraps the messenger so every send is bounded and failures are absorbed.
#[derive(Clone)]
pub struct ReplySender {
    messenger: Arc<dyn Messenger>,
    send_timeout: Duration,
}

impl ReplySender {
    pub fn new(messenger: Arc<dyn Messenger>, send_timeout: Duration) -> Self {
        Self {
            messenger,
            send_timeout,
        }
    }

    /// Sends a text reply. Returns whether it was delivered.
    pub async fn text(&self, chat: &ChatRef, text: &str) -> bool {
        let result = self.bounded(self.messenger.send_text(chat, text)).await;
        self.settle("text", chat, result)
    }

    /// Sends an image reply. Returns whether it was delivered.
    pub async fn image(&self, chat: &ChatRef, image: OutboundImage) -> bool {
        let result = self.bounded(self.messenger.send_image(chat, image)).await;
        self.settle("image", chat, result)
    }

    /// Sends a location pin. Returns whether it was delivered.
    pub async fn location(&self, chat: &ChatRef, latitude: f64, longitude: f64) -> bool {
        let result = self
            .bounded(self.messenger.send_location(chat, latitude, longitude))
            .await;
        self.settle("location", chat, result)
    }

    /// Fetches attachment bytes.
    pub async fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, MessengerError> {
        self.messenger.download(attachment).await
    }

    /// Runs `work` between a composing and a paused presence update.
    ///
    /// Paused is sent once `work` completes, whatever it returned.
    pub async fn while_composing<F>(&self, chat: &ChatRef, work: F) -> F::Output
    where
        F: Future,
    {
        self.presence(chat, Presence::Composing).await;
        let output = work.await;
        self.presence(chat, Presence::Paused).await;
        output
    }

    async fn presence(&self, chat: &ChatRef, presence: Presence) {
        if let Err(err) = self
            .bounded(self.messenger.set_presence(chat, presence))
            .await
        {
            debug!(chat = %chat.id, ?presence, error = %err, "Presence update failed");
        }
    }

    async fn bounded<F>(&self, send: F) -> Result<(), MessengerError>
    where
        F: Future<Output = Result<(), MessengerError>>,
    {
        match timeout(self.send_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(MessengerError::Timeout {
                timeout_secs: self.send_timeout.as_secs(),
            }),
        }
    }

    fn settle(&self, what: &'static str, chat: &ChatRef, result: Result<(), MessengerError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(chat = %chat.id, reply = what, error = %err, "Reply not delivered");
                false
            }
        }
    }
}
