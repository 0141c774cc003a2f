//! Per-call context: metadata headers and deadline.
//!
//! The same type describes an inbound call (headers injected by the upstream
//! token validator) and an outbound one (bearer token attached by the client).

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Header carrying the caller's remaining budget in milliseconds.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Multi-valued call metadata with lower-cased keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    entries: BTreeMap<String, Vec<String>>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key` (keys are case-insensitive).
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .entry(key.as_ref().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for CallMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut md = CallMetadata::new();
        for (k, v) in iter {
            md.insert(k, v);
        }
        md
    }
}

/// Context of a single call.
///
/// `metadata` is `None` when the transport delivered no header set at all,
/// which is distinct from an empty header set.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    metadata: Option<CallMetadata>,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn new(metadata: Option<CallMetadata>) -> Self {
        Self {
            metadata,
            deadline: None,
            timeout: None,
        }
    }

    pub fn with_metadata(metadata: CallMetadata) -> Self {
        Self::new(Some(metadata))
    }

    /// Impose an absolute deadline `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self.timeout = Some(timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.timeout = Some(deadline.saturating_duration_since(Instant::now()));
        self.deadline = Some(deadline);
        self
    }

    pub fn metadata(&self) -> Option<&CallMetadata> {
        self.metadata.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The budget the deadline was derived from.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Time left before the deadline (zero once it has passed).
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|r| r.is_zero())
    }
}
