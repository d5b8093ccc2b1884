use chappe::Signal;
use chappe::testing::SignalWatcher;

mod common;
use common::init_tracing;

#[test]
fn watch_connects_a_recorder() {
    let signal = Signal::<String>::new("watched");
    assert_eq!(signal.listener_count(), 0);

    let mut watcher = SignalWatcher::new();
    watcher.watch(&signal);
    assert_eq!(signal.listener_count(), 1);

    // Dropping the watcher disconnects the recorder again
    drop(watcher);
    assert_eq!(signal.listener_count(), 0);
}

#[test]
fn fired_and_not_fired() {
    init_tracing();
    let on_login = Signal::<String>::new("on_login");
    let mut watcher = SignalWatcher::new();
    watcher.watch(&on_login);

    on_login.call("bob".into());
    on_login.call("bob".into());

    let event = watcher.assert_fired(&on_login, &"bob".into());
    assert_eq!(event.signal(), &on_login);
    assert_eq!(event.args(), "bob");
    watcher.assert_not_fired(&on_login, &"carol".into());
    assert_eq!(watcher.events().len(), 2);
}

#[test]
fn events_are_matched_per_signal() {
    let first = Signal::<String>::new("same_name");
    let second = Signal::<String>::new("same_name");
    let mut watcher = SignalWatcher::new();
    watcher.watch(&first);
    watcher.watch(&second);

    first.call("hello".into());

    // The name is informational; matching is by signal identity
    watcher.assert_fired(&first, &"hello".into());
    watcher.assert_not_fired(&second, &"hello".into());
}

#[test]
fn ordering_follows_the_observed_log() {
    let signal = Signal::<String>::new("ordered");
    let mut watcher = SignalWatcher::new();
    watcher.watch(&signal);

    signal.call("first".into());
    signal.call("second".into());
    signal.call("third".into());

    let first = watcher.assert_fired(&signal, &"first".into());
    let second = watcher.assert_fired(&signal, &"second".into());
    let third = watcher.assert_fired(&signal, &"third".into());

    watcher.assert_ordering(&[&first, &second, &third]);
    // Repeating an event resolves to the same position, which is allowed
    watcher.assert_ordering(&[&first, &first, &third]);
}

#[test]
#[should_panic(expected = "signal unexpectedly not fired")]
fn assert_fired_panics_when_absent() {
    let signal = Signal::<String>::new("silent");
    let mut watcher = SignalWatcher::new();
    watcher.watch(&signal);

    watcher.assert_fired(&signal, &"never".into());
}

#[test]
#[should_panic(expected = "signal unexpectedly fired")]
fn assert_not_fired_panics_when_present() {
    let signal = Signal::<String>::new("noisy");
    let mut watcher = SignalWatcher::new();
    watcher.watch(&signal);

    signal.call("oops".into());
    watcher.assert_not_fired(&signal, &"oops".into());
}

#[test]
#[should_panic(expected = "expected order of fired signals")]
fn assert_ordering_panics_on_inversion() {
    let signal = Signal::<String>::new("scrambled");
    let mut watcher = SignalWatcher::new();
    watcher.watch(&signal);

    signal.call("first".into());
    signal.call("second".into());

    let first = watcher.assert_fired(&signal, &"first".into());
    let second = watcher.assert_fired(&signal, &"second".into());
    watcher.assert_ordering(&[&second, &first]);
}

#[test]
#[should_panic(expected = "event was never observed")]
fn assert_ordering_rejects_unobserved_events() {
    let watched = Signal::<String>::new("watched");
    let unwatched = Signal::<String>::new("unwatched");
    let mut watcher = SignalWatcher::new();
    watcher.watch(&watched);

    watched.call("seen".into());
    unwatched.call("missed".into());

    let seen = watcher.assert_fired(&watched, &"seen".into());
    // Fabricate an event the watcher never recorded by watching late
    let mut late = SignalWatcher::new();
    late.watch(&unwatched);
    unwatched.call("missed".into());
    let missed = late.assert_fired(&unwatched, &"missed".into());

    watcher.assert_ordering(&[&seen, &missed]);
}
