use std::sync::{Arc, Mutex};

#[allow(unused)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).with_test_writer().try_init();
}

/// Returns a listener that clones every payload it observes into a log, plus
/// a drain closure over that log. The listener borrows its argument, so it
/// connects to a signal directly.
#[allow(unused)]
pub fn recording_listener<T>() -> (Box<dyn Fn(&T) + Send + Sync>, Box<dyn Fn() -> Vec<T> + Send + Sync>)
where
    T: Clone + Send + Sync + 'static,
{
    let observed = Arc::new(Mutex::new(Vec::new()));
    let listener = {
        let observed = observed.clone();
        Box::new(move |args: &T| {
            observed.lock().unwrap().push(args.clone());
        })
    };

    let drain = Box::new(move || observed.lock().unwrap().drain(..).collect::<Vec<T>>());

    (listener, drain)
}
