//! Filesystem-backed message store.
//!
//! Serves previously-received raw messages as `.eml` files under a base
//! directory, keyed by the event's message identifier. Fetch-only: the
//! relay never writes to the spool.

use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use crate::dispatch::{FetchFuture, MessageStore, RelayError};

/// File-backed [`MessageStore`] reading `{base_path}/{key}.eml`.
#[derive(Debug, Clone)]
pub struct SpoolStore {
    /// Base path of the spool directory.
    base_path: PathBuf,
}

impl SpoolStore {
    /// Creates a new [`SpoolStore`] rooted at the given base path.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Returns the path of the spool file for a message key.
    fn message_path(&self, key: &str) -> PathBuf {
        let safe_key = key.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_',
            "_",
        );
        self.base_path.join(format!("{safe_key}.eml"))
    }
}

impl MessageStore for SpoolStore {
    fn fetch<'a>(&'a self, key: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let path = self.message_path(key);
            debug!(key = %key, path = %path.display(), "Reading spooled message");
            let bytes = fs::read(&path)
                .await
                .map_err(|e| RelayError::Fetch(format!("{}: {e}", path.display())))?;
            // Invalid UTF-8 is a transport failure, never lossy-converted:
            // the rewriter must see the exact bytes the body will carry.
            String::from_utf8(bytes)
                .map_err(|_| RelayError::Fetch(format!("{}: not valid UTF-8", path.display())))
        })
    }

    fn name(&self) -> &str {
        "spool"
    }
}
