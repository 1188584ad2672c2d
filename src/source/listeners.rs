//! Typed callback registry, keyed by notification type like `addEventListener` on the web

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use crate::{errors::ConnectError, message::Message};

/// Something application code gets told about
#[derive(Debug, Clone, Copy)]
pub enum Notification<'a> {
    Open,
    Error(&'a ConnectError),
    Message(&'a Message),
}

impl Notification<'_> {
    /// Type tag listeners are registered under, a message uses its event type
    pub fn kind(&self) -> &str {
        match self {
            Notification::Open => "open",
            Notification::Error(_) => "error",
            Notification::Message(message) => &*message.event,
        }
    }
}

/// Shared callback handle, registration and removal match on the pointer
pub type Listener = Arc<dyn Fn(&Notification<'_>) + Send + Sync>;

/// Called with the new delay whenever the server sends a `retry` field
pub type RetryHook = Arc<dyn Fn(Duration) + Send + Sync>;

/// Wraps a closure into a [Listener]
pub fn listener(f: impl Fn(&Notification<'_>) + Send + Sync + 'static) -> Listener {
    Arc::new(f)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    Capture,
    #[default]
    Bubble,
}

#[derive(Default)]
pub(crate) struct Registry {
    by_type: HashMap<String, Vec<(Listener, Phase)>>,
}

impl Registry {
    /// Returns false if the exact (type, listener, phase) triple is already registered
    pub(crate) fn add(&mut self, kind: &str, listener: Listener, phase: Phase) -> bool {
        let entries = self.by_type.entry(kind.to_owned()).or_default();
        if entries
            .iter()
            .any(|(existing, existing_phase)| Arc::ptr_eq(existing, &listener) && *existing_phase == phase)
        {
            return false;
        }
        entries.push((listener, phase));
        true
    }

    pub(crate) fn remove(&mut self, kind: &str, listener: &Listener, phase: Phase) -> bool {
        let Some(entries) = self.by_type.get_mut(kind) else {
            return false;
        };
        let Some(pos) = entries
            .iter()
            .position(|(existing, existing_phase)| Arc::ptr_eq(existing, listener) && *existing_phase == phase)
        else {
            return false;
        };
        entries.remove(pos);
        if entries.is_empty() {
            self.by_type.remove(kind);
        }
        true
    }

    /// Snapshot in registration order, so callbacks can run without holding the lock
    pub(crate) fn listeners_for(&self, kind: &str) -> Vec<Listener> {
        self.by_type
            .get(kind)
            .map(|entries| entries.iter().map(|(listener, _)| listener.clone()).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_type.iter().map(|(kind, entries)| (kind, entries.len())))
            .finish()
    }
}

/// The single-slot `on*` handlers
#[derive(Default)]
pub(crate) struct Handlers {
    pub(crate) on_open: Option<Listener>,
    pub(crate) on_message: Option<Listener>,
    pub(crate) on_error: Option<Listener>,
    pub(crate) on_retry_change: Option<RetryHook>,
}
