//! Recipient resolution against the configured forwarding table.

use std::collections::HashMap;

/// Immutable recipient-to-destination forwarding table.
///
/// Keys are normalized to lower case at construction; lookups lower-case
/// the recipient before matching, so resolution is case-insensitive per
/// mail convention. Only exact-address keys are supported.
pub struct ForwardingTable {
    entries: HashMap<String, String>,
}

impl std::fmt::Debug for ForwardingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardingTable")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ForwardingTable {
    /// Creates a new [`ForwardingTable`], lower-casing all recipient keys.
    pub fn new(entries: HashMap<String, String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(recipient, destination)| (recipient.to_ascii_lowercase(), destination))
            .collect();
        Self { entries }
    }

    /// Resolves the forwarding destination for a recipient address.
    ///
    /// Returns `None` when no mapping entry exists; this signals "do not
    /// forward" and is not an error.
    pub fn resolve(&self, recipient: &str) -> Option<&str> {
        self.entries
            .get(&recipient.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the number of configured forwarding entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for ForwardingTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
