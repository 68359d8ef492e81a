//! A single logging sink for human-readable shrink progress, instead of a
//! boolean flag threaded through every call.

/// Receives diagnostic events during shrinking. Implementations decide
/// whether and where to render them; the engine never branches on a
/// verbosity flag itself.
pub trait DebugSink {
    fn event(&mut self, message: &str);
}

/// Discards every event. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn event(&mut self, _message: &str) {}
}

/// Writes every event to stderr, one line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DebugSink for StderrSink {
    fn event(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
