/*!
Synchronous in-process signals (events) for Rust.

A [`Signal`] is a named event source with an ordered list of listeners.
Firing it invokes every listener, in connection order, on the calling
thread; nothing is queued, scheduled or retried. On top of that sit
[`SignalDef`] (declare a signal per owning object, seeded with a first
responder bound to that owner), [`ListenerIndex`] (record what an object
connected so it can be mass-unsubscribed later) and
[`testing::SignalWatcher`] (assert in tests that signals fired, with what,
and in what order).

# Basic usage

```rust
use chappe::Signal;

let on_save = Signal::<String>::new("on_save");

// Connecting returns the stored record; keep it if you plan to disconnect.
let audit = on_save.connect(|path: &String| println!("saved {path}"));

on_save.call("notes.txt".into()); // saved notes.txt
on_save.disconnect(&audit).unwrap();
on_save.call("ignored.txt".into()); // nothing
```

In a tight loop it is slightly cheaper to build the arguments once and call
[`Signal::fire`] with a borrow instead of moving them through
[`Signal::call`] each time.

# Per-owner signals

A [`SignalDef`] declares a signal once, at the type level; each owner that
accesses it gets its own lazily created, memoized [`Signal`], with the
declaration's first responder connected bound to that owner:

```rust
use chappe::SignalDef;
use std::sync::{Arc, LazyLock};

struct App {
    name: String,
}

static ON_LOGIN: LazyLock<SignalDef<App, String>> = LazyLock::new(|| {
    SignalDef::new("App::on_login", |app: &App, user: &String| {
        println!("[{}] {user} logged in", app.name);
    })
});

let app = Arc::new(App { name: "prod".into() });
ON_LOGIN.of(&app).connect(|user: &String| println!("audit: {user}"));
ON_LOGIN.of(&app).call("alice".into());
```

# Threading

Listeners run on whatever thread calls [`Signal::fire`], with no lock held.
Dispatch iterates a snapshot of the listener list taken at the start of the
call, so connecting or disconnecting concurrently (or from inside a
listener) never corrupts or alters an in-flight pass; it takes effect from
the next fire. A panicking listener propagates to the caller of `fire` and
the rest of that pass is skipped; there is no isolation between listeners.

`connect` and `disconnect` emit `tracing` debug events; install a
subscriber to see them, none is required.
*/

mod declare;
mod error;
mod index;
mod listener;
mod signal;

pub mod testing;

pub use declare::*;
pub use error::*;
pub use index::*;
pub use listener::*;
pub use signal::*;
