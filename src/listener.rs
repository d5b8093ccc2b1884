use std::sync::Arc;

use crate::signal::Signal;

/// A single listener registration on a [`Signal`].
///
/// The record is immutable once connected: the variant encodes whether the
/// firing signal is handed to the callable as an extra leading argument, and
/// the callable itself is shared (`Arc`), so cloning a record is cheap and
/// yields an equal record.
pub enum Listener<T = ()> {
    /// Plain listener, receives only the fire arguments.
    Args(Arc<dyn Fn(&T) + Send + Sync>),
    /// Listener that also receives the signal that fired it, so generically
    /// written handlers can identify the emitter.
    WithSignal(Arc<dyn Fn(&Signal<T>, &T) + Send + Sync>),
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        match self {
            Listener::Args(f) => Listener::Args(f.clone()),
            Listener::WithSignal(f) => Listener::WithSignal(f.clone()),
        }
    }
}

/// Two records are equal when they hold the same callable registered the
/// same way. This is what `disconnect` matches on.
impl<T> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Listener::Args(a), Listener::Args(b)) => Arc::ptr_eq(a, b),
            (Listener::WithSignal(a), Listener::WithSignal(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> Eq for Listener<T> {}

impl<T> std::fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ListenerKey { addr, passes_signal } = self.key();
        f.debug_struct("Listener").field("addr", &(addr as *const ())).field("passes_signal", &passes_signal).finish()
    }
}

impl<T> Listener<T> {
    /// Build a record that receives the firing signal along with the
    /// arguments. There is no blanket conversion for this closure shape
    /// (it would overlap with the plain one), so it is spelled explicitly.
    pub fn with_signal<F>(f: F) -> Self
    where F: Fn(&Signal<T>, &T) + Send + Sync + 'static {
        Listener::WithSignal(Arc::new(f))
    }

    /// Whether the firing signal is passed to the callable.
    pub fn passes_signal(&self) -> bool { matches!(self, Listener::WithSignal(_)) }

    pub(crate) fn key(&self) -> ListenerKey {
        match self {
            Listener::Args(f) => ListenerKey { addr: Arc::as_ptr(f) as *const () as usize, passes_signal: false },
            Listener::WithSignal(f) => ListenerKey { addr: Arc::as_ptr(f) as *const () as usize, passes_signal: true },
        }
    }
}

/// Identity of a listener record, usable as a lookup key by the
/// [`ListenerIndex`](crate::ListenerIndex) bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListenerKey {
    addr: usize,
    passes_signal: bool,
}

/// Conversion into a listener record, implemented for closures, records
/// themselves, shared callables and channel senders.
pub trait IntoListener<T> {
    fn into_listener(self) -> Listener<T>;
}

impl<F, T> IntoListener<T> for F
where F: Fn(&T) + Send + Sync + 'static
{
    fn into_listener(self) -> Listener<T> { Listener::Args(Arc::new(self)) }
}

impl<T> IntoListener<T> for Listener<T> {
    fn into_listener(self) -> Listener<T> { self }
}

impl<T> IntoListener<T> for Arc<dyn Fn(&T) + Send + Sync> {
    fn into_listener(self) -> Listener<T> { Listener::Args(self) }
}

// Channel senders make useful listeners for handing events to another
// thread; each fire clones the arguments into the channel and send errors
// (receiver gone) are ignored.
impl<T> IntoListener<T> for std::sync::mpsc::Sender<T>
where T: Clone + Send + 'static
{
    fn into_listener(self) -> Listener<T> {
        Listener::Args(Arc::new(move |args: &T| {
            let _ = self.send(args.clone());
        }))
    }
}

#[cfg(feature = "tokio")]
impl<T> IntoListener<T> for tokio::sync::mpsc::UnboundedSender<T>
where T: Clone + Send + 'static
{
    fn into_listener(self) -> Listener<T> {
        Listener::Args(Arc::new(move |args: &T| {
            let _ = self.send(args.clone());
        }))
    }
}
