use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::SignalError;
use crate::listener::{IntoListener, Listener};

/// A unique identifier for a signal that cannot be forged or extracted.
/// Derived from the address of the shared allocation, so it is stable for
/// the lifetime of the signal and usable as a map key.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SignalId(usize);

impl From<SignalId> for usize {
    fn from(id: SignalId) -> usize { id.0 }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// A named event source holding an ordered list of listener registrations.
///
/// `Signal` is a cheap handle over shared state: cloning it yields another
/// handle to the *same* signal, and equality is handle identity, never
/// structural. The name is purely informational (diagnostics and `Debug`),
/// it is not a lookup key and need not be unique.
///
/// Dispatch is synchronous: [`fire`](Signal::fire) invokes every listener in
/// registration order on the calling thread and returns once the last one
/// has returned. Listeners run without any lock held, over a snapshot of the
/// registration list, so connecting or disconnecting mid-fire never alters
/// the in-flight pass.
pub struct Signal<T = ()>(Arc<Inner<T>>);

struct Inner<T> {
    name: String,
    listeners: RwLock<Vec<Listener<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl<T> Eq for Signal<T> {}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.0.name)
            .field("listeners", &self.0.listeners.read().unwrap().len())
            .finish()
    }
}

impl<T> Signal<T> {
    /// Creates a signal with the given name and no listeners.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(Inner { name: name.into(), listeners: RwLock::new(Vec::new()) }))
    }

    /// Creates a signal whose listener list is seeded with a single
    /// listener. Used when a signal is defined *by* a callable rather than
    /// declared empty; the callable becomes the first to run on every fire.
    pub fn with_first_responder(name: impl Into<String>, listener: impl IntoListener<T>) -> Self {
        let signal = Self::new(name);
        signal.connect(listener);
        signal
    }

    /// Identity of this signal, shared by all clones of the handle.
    pub fn id(&self) -> SignalId { SignalId(Arc::as_ptr(&self.0) as usize) }

    /// Name of the signal, as given at construction.
    pub fn name(&self) -> &str { &self.0.name }

    /// Snapshot of the current listener records, in dispatch order.
    pub fn listeners(&self) -> Vec<Listener<T>> { self.0.listeners.read().unwrap().clone() }

    /// Number of currently connected listener records.
    pub fn listener_count(&self) -> usize { self.0.listeners.read().unwrap().len() }

    /// Connects a listener to this signal and returns the stored record.
    ///
    /// The record is appended, so listeners run in connection order.
    /// Duplicates are not checked: connecting an equal record twice yields
    /// two entries and two invocations per fire. Keep the returned record
    /// (or a clone) around if you intend to [`disconnect`](Signal::disconnect)
    /// later; it is the only value that compares equal to the stored entry.
    pub fn connect(&self, listener: impl IntoListener<T>) -> Listener<T> {
        let listener = listener.into_listener();
        self.0.listeners.write().unwrap().push(listener.clone());
        debug!(signal = %self.0.name, listener = ?listener, "connect");
        listener
    }

    /// Disconnects a previously connected listener record.
    ///
    /// Exactly one record is removed: the first one equal to `listener`
    /// (same callable, same pass-signal form). Disconnecting a record that
    /// is not present is a usage error, reported as
    /// [`SignalError::NotConnected`] rather than silently ignored.
    pub fn disconnect(&self, listener: &Listener<T>) -> Result<(), SignalError> {
        let mut listeners = self.0.listeners.write().unwrap();
        match listeners.iter().position(|candidate| candidate == listener) {
            Some(index) => {
                listeners.remove(index);
                debug!(signal = %self.0.name, listener = ?listener, "disconnect");
                Ok(())
            }
            None => Err(SignalError::NotConnected { signal: self.0.name.clone() }),
        }
    }

    /// Fires the signal, synchronously invoking every listener in
    /// registration order with a borrow of `args`.
    ///
    /// Dispatch runs over a snapshot of the listener list taken at the start
    /// of the call; connects and disconnects performed by listeners (or by
    /// other threads) take effect from the next fire onwards. A panicking
    /// listener aborts the pass: it propagates to the caller and the
    /// remaining listeners do not run.
    pub fn fire(&self, args: &T) {
        let snapshot = { self.0.listeners.read().unwrap().clone() };
        for listener in &snapshot {
            match listener {
                Listener::Args(f) => f(args),
                Listener::WithSignal(f) => f(self, args),
            }
        }
    }

    /// Invocation sugar: packs owned arguments and forwards to
    /// [`fire`](Signal::fire). In a tight loop, building the arguments once
    /// and calling `fire` directly avoids the move per call.
    pub fn call(&self, args: T) { self.fire(&args) }
}
