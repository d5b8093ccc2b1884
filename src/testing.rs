//! Test-support helpers for asserting on signal activity.
//!
//! A [`SignalWatcher`] connects recorder listeners to the signals under
//! test, keeps an ordered log of every fire it observes, and offers
//! fired / not-fired / ordering assertions over that log. Recorders
//! disconnect themselves when the watcher is dropped, so a watcher owned by
//! a test body cleans up with the test.
//!
//! Assertion failures panic with a description of the expected event and
//! the observed log, which is how failures surface in the Rust test
//! harness.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::listener::Listener;
use crate::signal::Signal;

/// One observed fire: the emitting signal and the arguments it carried.
///
/// Equality is emitter identity plus argument equality, which is what the
/// watcher's assertions match on.
pub struct SignalEvent<T> {
    signal: Signal<T>,
    args: T,
}

impl<T> SignalEvent<T> {
    pub fn signal(&self) -> &Signal<T> { &self.signal }

    pub fn args(&self) -> &T { &self.args }
}

impl<T: Clone> Clone for SignalEvent<T> {
    fn clone(&self) -> Self { Self { signal: self.signal.clone(), args: self.args.clone() } }
}

impl<T: PartialEq> PartialEq for SignalEvent<T> {
    fn eq(&self, other: &Self) -> bool { self.signal == other.signal && self.args == other.args }
}

impl<T: PartialEq> Eq for SignalEvent<T> {}

impl<T: fmt::Debug> fmt::Debug for SignalEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEvent").field("signal", &self.signal.name()).field("args", &self.args).finish()
    }
}

/// Keeps a recorder connected for the lifetime of the guard and
/// disconnects it on drop.
struct WatchGuard<T> {
    signal: Signal<T>,
    listener: Listener<T>,
}

impl<T> Drop for WatchGuard<T> {
    fn drop(&mut self) {
        // The signal may have been torn down independently; a missing
        // recorder is not a failure during cleanup.
        let _ = self.signal.disconnect(&self.listener);
    }
}

/// Records fires of watched signals and asserts over the recorded log.
///
/// ```
/// use chappe::Signal;
/// use chappe::testing::SignalWatcher;
///
/// let on_save = Signal::<String>::new("on_save");
/// let mut watcher = SignalWatcher::new();
/// watcher.watch(&on_save);
///
/// on_save.call("draft".into());
/// on_save.call("final".into());
///
/// let draft = watcher.assert_fired(&on_save, &"draft".into());
/// let final_ = watcher.assert_fired(&on_save, &"final".into());
/// watcher.assert_ordering(&[&draft, &final_]);
/// watcher.assert_not_fired(&on_save, &"never".into());
/// ```
pub struct SignalWatcher<T> {
    events: Arc<Mutex<Vec<SignalEvent<T>>>>,
    guards: Vec<WatchGuard<T>>,
}

impl<T> Default for SignalWatcher<T> {
    fn default() -> Self { Self::new() }
}

impl<T> SignalWatcher<T> {
    pub fn new() -> Self { Self { events: Arc::new(Mutex::new(Vec::new())), guards: Vec::new() } }
}

impl<T> SignalWatcher<T>
where T: Clone + Send + 'static
{
    /// Starts recording fires of `signal`. The recorder is an ordinary
    /// listener, so it observes fires in dispatch order relative to the
    /// listeners connected after it; it stays connected until the watcher
    /// is dropped.
    pub fn watch(&mut self, signal: &Signal<T>) {
        let events = self.events.clone();
        let emitter = signal.clone();
        let listener = signal.connect(move |args: &T| {
            events.lock().unwrap().push(SignalEvent { signal: emitter.clone(), args: args.clone() });
        });
        self.guards.push(WatchGuard { signal: signal.clone(), listener });
    }

    /// Snapshot of everything observed so far, in firing order.
    pub fn events(&self) -> Vec<SignalEvent<T>> { self.events.lock().unwrap().clone() }
}

impl<T> SignalWatcher<T>
where T: Clone + PartialEq + fmt::Debug
{
    /// Asserts that `signal` fired with exactly `args` at some point.
    ///
    /// Returns the observed event so it can be fed to
    /// [`assert_ordering`](SignalWatcher::assert_ordering).
    ///
    /// # Panics
    ///
    /// If no such event was observed.
    #[track_caller]
    pub fn assert_fired(&self, signal: &Signal<T>, args: &T) -> SignalEvent<T> {
        let events = self.events.lock().unwrap();
        match events.iter().find(|event| event.signal == *signal && event.args == *args) {
            Some(event) => event.clone(),
            None => panic!(
                "signal unexpectedly not fired: {} with {:?}\nobserved events:\n{}",
                signal.name(),
                args,
                render(&events)
            ),
        }
    }

    /// Asserts that `signal` never fired with exactly `args`.
    ///
    /// # Panics
    ///
    /// If such an event was observed.
    #[track_caller]
    pub fn assert_not_fired(&self, signal: &Signal<T>, args: &T) {
        let events = self.events.lock().unwrap();
        if events.iter().any(|event| event.signal == *signal && event.args == *args) {
            panic!("signal unexpectedly fired: {} with {:?}\nobserved events:\n{}", signal.name(), args, render(&events));
        }
    }

    /// Asserts that the given previously observed events appear in the log
    /// in the given relative order.
    ///
    /// Each event is resolved to its first position in the log; the
    /// resulting positions must be non-decreasing across the argument list
    /// (so repeating the same event is allowed).
    ///
    /// # Panics
    ///
    /// If an event was never observed, or the positions are out of order.
    #[track_caller]
    pub fn assert_ordering(&self, expected: &[&SignalEvent<T>]) {
        let events = self.events.lock().unwrap();
        let positions: Vec<usize> = expected
            .iter()
            .map(|event| {
                events
                    .iter()
                    .position(|observed| observed == *event)
                    .unwrap_or_else(|| panic!("event was never observed: {event:?}\nobserved events:\n{}", render(&events)))
            })
            .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        if positions != sorted {
            panic!(
                "expected order of fired signals:\n{}\nactual positions in the observed log: {:?}",
                expected.iter().enumerate().map(|(i, e)| format!("\t{}: {:?}", i + 1, e)).collect::<Vec<_>>().join("\n"),
                positions
            );
        }
    }
}

fn render<T: fmt::Debug>(events: &[SignalEvent<T>]) -> String {
    if events.is_empty() {
        return "\t(none)".to_string();
    }
    events.iter().enumerate().map(|(i, event)| format!("\t{i}: {event:?}")).collect::<Vec<_>>().join("\n")
}
