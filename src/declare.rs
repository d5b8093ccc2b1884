use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use crate::listener::{IntoListener, Listener};
use crate::signal::Signal;

/// Identity of an owning object, derived from the address of its `Arc`
/// allocation. Can only be compared, never dereferenced.
///
/// An `OwnerId` is only meaningful while something still pins the
/// allocation: every holder in this crate keeps a `Weak` to the owner
/// alongside the id, which reserves the address until the entry itself is
/// dropped, so two live owners can never share an id.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OwnerId(usize);

impl OwnerId {
    pub fn of<O>(owner: &Arc<O>) -> Self { Self(Arc::as_ptr(owner) as usize) }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Adapter that lets a free function over `(&O, &T)` act as an ordinary
/// listener bound to one particular owner.
///
/// The responder of a [`SignalDef`] is captured before any owner exists;
/// this pairs it with a weak reference to the owner so that invoking the
/// adapter supplies the owner as the implicit first argument. Once the
/// owner is gone the adapter is a no-op.
pub struct BoundResponder<O, T = ()> {
    owner: Weak<O>,
    func: Arc<dyn Fn(&O, &T) + Send + Sync>,
}

impl<O, T> Clone for BoundResponder<O, T> {
    fn clone(&self) -> Self { Self { owner: self.owner.clone(), func: self.func.clone() } }
}

impl<O, T> BoundResponder<O, T> {
    pub fn new(owner: &Arc<O>, func: Arc<dyn Fn(&O, &T) + Send + Sync>) -> Self {
        Self { owner: Arc::downgrade(owner), func }
    }

    /// The owner this responder is bound to, if still alive.
    pub fn owner(&self) -> Option<Arc<O>> { self.owner.upgrade() }

    pub fn call(&self, args: &T) {
        if let Some(owner) = self.owner.upgrade() {
            (self.func)(&owner, args)
        }
    }
}

impl<O, T> IntoListener<T> for BoundResponder<O, T>
where
    O: Send + Sync + 'static,
    T: 'static,
{
    fn into_listener(self) -> Listener<T> { Listener::Args(Arc::new(move |args: &T| self.call(args))) }
}

/// A per-owner signal declaration.
///
/// Where a [`Signal`] is a concrete event source, a `SignalDef` is the
/// declaration one of them is built from: a name plus a *first responder*
/// function over `(&O, &T)`. Each owner that accesses the declaration gets
/// its own signal, created on first access with a [`BoundResponder`] for
/// that owner connected as the first listener, then memoized: every later
/// access by the same owner returns the identical handle.
///
/// The declaration itself carries no per-owner state visible to callers and
/// cannot be reassigned or cleared; reading [`name`](SignalDef::name) or
/// [`first_responder`](SignalDef::first_responder) never realizes anything.
///
/// Declarations are typically stored in statics, one per declared signal:
///
/// ```
/// use chappe::SignalDef;
/// use std::sync::{Arc, LazyLock};
///
/// struct App {
///     motd: String,
/// }
///
/// static ON_LOGIN: LazyLock<SignalDef<App, String>> = LazyLock::new(|| {
///     SignalDef::new("App::on_login", |app: &App, user: &String| {
///         println!("{}, {user}", app.motd);
///     })
/// });
///
/// let app = Arc::new(App { motd: "welcome".into() });
/// ON_LOGIN.of(&app).connect(|user: &String| println!("audit: {user} logged in"));
/// ON_LOGIN.of(&app).call("alice".into());
/// ```
pub struct SignalDef<O, T = ()> {
    name: String,
    first_responder: Arc<dyn Fn(&O, &T) + Send + Sync>,
    realized: RwLock<HashMap<OwnerId, RealizedEntry<O, T>>>,
}

struct RealizedEntry<O, T> {
    // Pins the owner allocation so the OwnerId key stays unambiguous
    owner: Weak<O>,
    signal: Signal<T>,
}

impl<O, T> std::fmt::Debug for SignalDef<O, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalDef")
            .field("name", &self.name)
            .field("realized", &self.realized.read().unwrap().len())
            .finish()
    }
}

impl<O, T> SignalDef<O, T>
where
    O: Send + Sync + 'static,
    T: 'static,
{
    /// Declares a signal with the given name and first responder.
    pub fn new<F>(name: impl Into<String>, first_responder: F) -> Self
    where F: Fn(&O, &T) + Send + Sync + 'static {
        Self { name: name.into(), first_responder: Arc::new(first_responder), realized: RwLock::new(HashMap::new()) }
    }

    /// Name of the declaration; realized signals inherit it.
    pub fn name(&self) -> &str { &self.name }

    /// The responder this declaration was defined with, unbound.
    pub fn first_responder(&self) -> Arc<dyn Fn(&O, &T) + Send + Sync> { self.first_responder.clone() }

    /// Number of owners that currently have a realized signal.
    pub fn realized_count(&self) -> usize { self.realized.read().unwrap().len() }

    /// The signal belonging to `owner`, realizing it on first access.
    ///
    /// Realization creates a fresh signal named after the declaration and
    /// connects a [`BoundResponder`] for this owner as its first listener.
    /// The signal is then cached: further calls for the same owner return
    /// the same handle, with no re-realization and no duplicate responder.
    pub fn of(&self, owner: &Arc<O>) -> Signal<T> {
        let id = OwnerId::of(owner);
        if let Some(entry) = self.realized.read().unwrap().get(&id) {
            return entry.signal.clone();
        }

        let mut realized = self.realized.write().unwrap();
        // Entries for dropped owners no longer pin their address; discard
        // them before the id can be handed to a new allocation.
        realized.retain(|_, entry| entry.owner.strong_count() > 0);
        realized
            .entry(id)
            .or_insert_with(|| {
                let signal = Signal::new(self.name.clone());
                signal.connect(BoundResponder::new(owner, self.first_responder.clone()));
                RealizedEntry { owner: Arc::downgrade(owner), signal }
            })
            .signal
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Owner {
        tag: &'static str,
        log: Mutex<Vec<String>>,
    }

    fn def() -> SignalDef<Owner, String> {
        SignalDef::new("Owner::on_event", |owner: &Owner, args: &String| {
            owner.log.lock().unwrap().push(format!("{}:{}", owner.tag, args));
        })
    }

    #[test]
    fn realizes_once_per_owner() {
        let def = def();
        let a = Arc::new(Owner { tag: "a", log: Mutex::new(Vec::new()) });
        let b = Arc::new(Owner { tag: "b", log: Mutex::new(Vec::new()) });

        let sig_a = def.of(&a);
        let sig_b = def.of(&b);
        assert_ne!(sig_a, sig_b);
        assert_eq!(def.of(&a), sig_a);
        assert_eq!(def.of(&a).id(), sig_a.id());
        assert_eq!(def.realized_count(), 2);

        // Each realized signal is seeded with exactly one listener
        assert_eq!(sig_a.listener_count(), 1);
        assert_eq!(sig_b.listener_count(), 1);
    }

    #[test]
    fn responder_receives_its_own_owner() {
        let def = def();
        let a = Arc::new(Owner { tag: "a", log: Mutex::new(Vec::new()) });
        let b = Arc::new(Owner { tag: "b", log: Mutex::new(Vec::new()) });

        def.of(&a).call("x".into());
        def.of(&b).call("y".into());

        assert_eq!(*a.log.lock().unwrap(), ["a:x"]);
        assert_eq!(*b.log.lock().unwrap(), ["b:y"]);
    }

    #[test]
    fn template_access_does_not_realize() {
        let def = def();
        assert_eq!(def.name(), "Owner::on_event");
        let _responder = def.first_responder();
        assert_eq!(def.realized_count(), 0);
    }

    #[test]
    fn dead_owner_entries_are_pruned() {
        let def = def();
        let a = Arc::new(Owner { tag: "a", log: Mutex::new(Vec::new()) });
        def.of(&a);
        assert_eq!(def.realized_count(), 1);
        drop(a);

        // Realizing for another owner sweeps the dead entry
        let b = Arc::new(Owner { tag: "b", log: Mutex::new(Vec::new()) });
        def.of(&b);
        assert_eq!(def.realized_count(), 1);
    }

    #[test]
    fn responder_is_inert_after_owner_drop() {
        let def = def();
        let a = Arc::new(Owner { tag: "a", log: Mutex::new(Vec::new()) });
        let signal = def.of(&a);
        drop(a);

        // The realized signal still dispatches; the bound responder just
        // has nothing left to call.
        let fired = Arc::new(Mutex::new(0));
        let fired_clone = fired.clone();
        signal.connect(move |_: &String| *fired_clone.lock().unwrap() += 1);
        signal.call("ignored".into());
        assert_eq!(*fired.lock().unwrap(), 1);
    }
}
