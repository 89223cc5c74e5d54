//! Listener registration and failure-isolated delivery.

use std::panic::{self, AssertUnwindSafe};

use crate::error::{ListenerError, Result};

/// A change listener. Called with no arguments after every mutation; the
/// listener reads whatever state it needs from its own collection handle.
pub type Listener = Box<dyn FnMut() -> Result<()> + Send>;

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Outcome of one notification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PassReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Ordered listener storage.
///
/// While a pass is running the listeners are checked out of the registry so
/// that callbacks can read the collection, register listeners, or mutate it
/// without deadlocking. Requests made in the meantime are reconciled when the
/// listeners are checked back in.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
    in_pass: bool,
    /// Passes requested by mutations made while a pass was running.
    owed_passes: usize,
    /// Ids of the listeners checked out for the running pass.
    checked_out: Vec<ListenerId>,
    removed_during_pass: Vec<ListenerId>,
}

impl ListenerRegistry {
    pub fn allocate_id(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    pub fn push(&mut self, id: ListenerId, listener: Listener) {
        self.entries.push((id, listener));
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        if let Some(index) = self.entries.iter().position(|(entry, _)| *entry == id) {
            self.entries.remove(index);
            return true;
        }
        if self.checked_out.contains(&id) && !self.removed_during_pass.contains(&id) {
            self.removed_during_pass.push(id);
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.checked_out.len() - self.removed_during_pass.len()
    }

    /// Starts a pass and hands out the listeners, or records that one more
    /// pass is owed if a pass is already running.
    pub fn begin_pass(&mut self) -> Option<Vec<(ListenerId, Listener)>> {
        if self.in_pass {
            self.owed_passes += 1;
            return None;
        }
        self.in_pass = true;
        let listeners = std::mem::take(&mut self.entries);
        self.checked_out = listeners.iter().map(|(id, _)| *id).collect();
        Some(listeners)
    }

    /// Returns the listeners after a pass. Listeners registered during the
    /// pass keep their place after the existing ones. Returns true, and
    /// claims it, when a mutation during some pass still owes one.
    pub fn end_pass(&mut self, mut listeners: Vec<(ListenerId, Listener)>) -> bool {
        listeners.append(&mut self.entries);
        if !self.removed_during_pass.is_empty() {
            let removed = std::mem::take(&mut self.removed_during_pass);
            listeners.retain(|(id, _)| !removed.contains(id));
        }
        self.entries = listeners;
        self.checked_out.clear();
        self.in_pass = false;

        if self.owed_passes > 0 {
            self.owed_passes -= 1;
            true
        } else {
            false
        }
    }

    /// Forgets every owed pass, returning how many there were.
    pub fn drop_owed_passes(&mut self) -> usize {
        std::mem::take(&mut self.owed_passes)
    }
}

/// Runs every listener once, in order, isolating failures.
pub(crate) fn deliver_all(listeners: &mut [(ListenerId, Listener)]) -> PassReport {
    let mut report = PassReport::default();
    for (id, listener) in listeners.iter_mut() {
        match deliver(*id, listener) {
            Ok(()) => report.delivered += 1,
            Err(_) => report.failed += 1,
        }
    }
    report
}

/// Runs one listener, converting a panic into [`ListenerError::Panicked`].
/// Failures are logged here; the caller only counts them.
pub(crate) fn deliver(id: ListenerId, listener: &mut Listener) -> Result<()> {
    let result = match panic::catch_unwind(AssertUnwindSafe(|| listener())) {
        Ok(result) => result,
        Err(payload) => Err(ListenerError::Panicked(panic_message(payload.as_ref()))),
    };

    if let Err(ref err) = result {
        match err {
            ListenerError::Panicked(_) => {
                tracing::error!(listener = %id, error = %err, "listener panicked during notification");
            }
            _ => tracing::warn!(listener = %id, error = %err, "listener failed during notification"),
        }
        metrics::counter!("collection_listener_failures").increment(1);
    }

    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
