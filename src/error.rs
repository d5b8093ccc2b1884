use thiserror::Error;

/// Usage errors reported by the library.
///
/// Listener panics are never caught or wrapped; they propagate to the caller
/// of [`Signal::fire`](crate::Signal::fire) unchanged.
#[derive(Error, Debug)]
pub enum SignalError {
    /// The given listener record is not present on the signal. Raised by
    /// `disconnect` instead of silently ignoring the mismatch, since it
    /// nearly always indicates a bookkeeping bug in the caller.
    #[error("listener is not connected to signal {signal:?}")]
    NotConnected { signal: String },
}
