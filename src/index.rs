use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::declare::OwnerId;
use crate::error::SignalError;
use crate::listener::{IntoListener, Listener, ListenerKey};
use crate::signal::{Signal, SignalId};

/// Per-owner listener bookkeeping for bulk teardown.
///
/// Registrations made through [`connect`](ListenerIndex::connect) are
/// recorded against the owning object, so that
/// [`remove_all`](ListenerIndex::remove_all) can later disconnect everything
/// that object ever connected in one call. The index never scans signals,
/// it operates purely off its own records. Tracking is opt-in: listeners
/// connected directly on a signal are invisible to the index.
///
/// One index can span signals of different argument types; the stored
/// disconnect actions are type-erased.
#[derive(Default)]
pub struct ListenerIndex {
    entries: RwLock<HashMap<OwnerId, Vec<IndexEntry>>>,
}

struct IndexEntry {
    signal: SignalId,
    listener: ListenerKey,
    disconnect: Box<dyn Fn() -> Result<(), SignalError> + Send + Sync>,
    // Holds a `Weak` to the owner: pins the allocation so the OwnerId key
    // stays unambiguous, and answers whether the owner is still alive.
    owner_alive: Box<dyn Fn() -> bool + Send + Sync>,
}

impl std::fmt::Debug for ListenerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read().unwrap();
        f.debug_struct("ListenerIndex")
            .field("owners", &entries.len())
            .field("registrations", &entries.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl ListenerIndex {
    pub fn new() -> Self { Self::default() }

    /// Connects `listener` to `signal` and records the registration against
    /// `owner`. Returns the stored record, exactly like
    /// [`Signal::connect`].
    pub fn connect<O, T>(&self, signal: &Signal<T>, owner: &Arc<O>, listener: impl IntoListener<T>) -> Listener<T>
    where
        O: Send + Sync + 'static,
        T: 'static,
    {
        let listener = signal.connect(listener);
        let entry = IndexEntry {
            signal: signal.id(),
            listener: listener.key(),
            disconnect: {
                let signal = signal.clone();
                let listener = listener.clone();
                Box::new(move || signal.disconnect(&listener))
            },
            owner_alive: {
                let owner = Arc::downgrade(owner);
                Box::new(move || owner.strong_count() > 0)
            },
        };
        let mut entries = self.entries.write().unwrap();
        // Owners dropped without teardown left their listeners connected and
        // no longer pin their address; disconnect those leftovers before the
        // id can be handed to a new allocation.
        entries.retain(|_, records| {
            if records.first().is_some_and(|record| (record.owner_alive)()) {
                return true;
            }
            for record in records.drain(..) {
                let _ = (record.disconnect)();
            }
            false
        });
        entries.entry(OwnerId::of(owner)).or_default().push(entry);
        listener
    }

    /// Disconnects a registration made through
    /// [`connect`](ListenerIndex::connect) and prunes its record. When the
    /// owner's last record goes, the owner itself is dropped from the index.
    pub fn disconnect<O, T>(&self, signal: &Signal<T>, owner: &Arc<O>, listener: &Listener<T>) -> Result<(), SignalError>
    where
        O: Send + Sync + 'static,
        T: 'static,
    {
        signal.disconnect(listener)?;

        let id = OwnerId::of(owner);
        let mut entries = self.entries.write().unwrap();
        let now_empty = match entries.get_mut(&id) {
            Some(records) => {
                let key = listener.key();
                if let Some(index) = records.iter().position(|r| r.signal == signal.id() && r.listener == key) {
                    records.remove(index);
                }
                records.is_empty()
            }
            None => false,
        };
        if now_empty {
            entries.remove(&id);
        }
        Ok(())
    }

    /// Disconnects every registration recorded for `owner`, across all
    /// signals, and returns how many were removed. Registrations belonging
    /// to other owners are untouched.
    ///
    /// A record that was already disconnected directly on the signal
    /// (bypassing the index) surfaces as
    /// [`SignalError::NotConnected`]. Every record is still processed:
    /// the remaining registrations are disconnected and the first error is
    /// reported once the owner's records are fully consumed.
    pub fn remove_all<O>(&self, owner: &Arc<O>) -> Result<usize, SignalError>
    where O: Send + Sync + 'static {
        let records = self.entries.write().unwrap().remove(&OwnerId::of(owner)).unwrap_or_default();
        let mut removed = 0;
        let mut stale = None;
        for record in records {
            match (record.disconnect)() {
                Ok(()) => removed += 1,
                Err(err) => {
                    if stale.is_none() {
                        stale = Some(err);
                    }
                }
            }
        }
        match stale {
            Some(err) => Err(err),
            None => Ok(removed),
        }
    }

    /// Number of live registrations recorded for `owner`.
    pub fn tracked<O>(&self, owner: &Arc<O>) -> usize {
        self.entries.read().unwrap().get(&OwnerId::of(owner)).map_or(0, Vec::len)
    }
}
