//! Per-event relay orchestration.
//!
//! The dispatcher walks an [`InboundEvent`] strictly sequentially: one fetch
//! per message record, then per recipient resolve, rewrite and send. There
//! is no shared mutable state and no internal retry; transport failures
//! propagate to the caller, which is the invoking platform's retry boundary.

use std::{error::Error, fmt::Display, future::Future, pin::Pin, sync::Arc};

use tracing::{debug, info};

use crate::{event::InboundEvent, rewrite::rewrite_message, router::ForwardingTable};

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Boxed future type for message fetches, enabling object safety.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = RelayResult<String>> + Send + 'a>>;

/// Boxed future type for outbound sends, enabling object safety.
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = RelayResult<()>> + Send + 'a>>;

/// Errors that can occur while relaying an event.
#[derive(Debug)]
pub enum RelayError {
    /// Fetching the raw message from the store failed.
    Fetch(String),
    /// Handing the rewritten message to the outbound sender failed.
    Send(String),
}

impl Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Fetch(msg) => write!(f, "Fetch error: {msg}"),
            RelayError::Send(msg) => write!(f, "Send error: {msg}"),
        }
    }
}

impl Error for RelayError {}

/// Trait for stores holding previously-received raw messages.
pub trait MessageStore: Send + Sync {
    /// Fetches the raw message stored under `key`.
    fn fetch<'a>(&'a self, key: &'a str) -> FetchFuture<'a>;

    /// Returns the name of this store.
    fn name(&self) -> &str;
}

/// Trait for outbound senders that submit complete, well-formed messages.
pub trait OutboundSender: Send + Sync {
    /// Sends `raw` from `source` to every address in `destinations`.
    fn send<'a>(&'a self, source: &'a str, destinations: &'a [String], raw: &'a str)
        -> SendFuture<'a>;

    /// Returns the name of this sender.
    fn name(&self) -> &str;
}

/// Orchestrates per-event processing: fetch, resolve, rewrite, send.
pub struct RelayDispatcher {
    table: ForwardingTable,
    domain: String,
    key_prefix: String,
    store: Arc<dyn MessageStore>,
    sender: Arc<dyn OutboundSender>,
}

impl std::fmt::Debug for RelayDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayDispatcher")
            .field("domain", &self.domain)
            .field("store", &self.store.name())
            .field("sender", &self.sender.name())
            .finish()
    }
}

impl RelayDispatcher {
    /// Creates a new [`RelayDispatcher`] with the given forwarding table,
    /// display-name domain, store key prefix, and transport seams.
    pub fn new(
        table: ForwardingTable,
        domain: String,
        key_prefix: String,
        store: Arc<dyn MessageStore>,
        sender: Arc<dyn OutboundSender>,
    ) -> Self {
        info!(
            entries = table.len(),
            domain = %domain,
            store = store.name(),
            sender = sender.name(),
            "Relay dispatcher initialized"
        );
        Self {
            table,
            domain,
            key_prefix,
            store,
            sender,
        }
    }

    /// Processes one inbound event, record by record, recipient by recipient.
    ///
    /// Each record's raw message is fetched once, regardless of how many
    /// recipients it carries. Unmapped recipients are skipped with a log
    /// line; fetch and send failures propagate immediately.
    pub async fn process(&self, event: &InboundEvent) -> RelayResult<()> {
        for record in &event.records {
            let key = format!("{}{}", self.key_prefix, record.message_id);
            debug!(
                message_id = %record.message_id,
                key = %key,
                "Fetching raw message"
            );
            let raw = self.store.fetch(&key).await?;

            for recipient in &record.recipients {
                let recipient = recipient.to_ascii_lowercase();
                let Some(destination) = self.table.resolve(&recipient) else {
                    info!(
                        message_id = %record.message_id,
                        recipient = %recipient,
                        "No forwarding entry for recipient, skipping"
                    );
                    continue;
                };

                let rewritten = rewrite_message(&raw, &recipient, &self.domain);
                let destinations = [destination.to_string()];
                self.sender.send(&recipient, &destinations, &rewritten).await?;
                info!(
                    message_id = %record.message_id,
                    recipient = %recipient,
                    destination = %destinations[0],
                    "Forwarded message"
                );
            }
        }
        Ok(())
    }
}
