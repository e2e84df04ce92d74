use crate::sync::*;
use once_cell::sync::Lazy;

/// Sink for failures the best-effort API swallows.
pub trait Logger: Send + Sync {
    fn log_error(&self, message: &str);
}

/// Forwards to the `log` facade under the `sanfig` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl Logger for LogSink {
    fn log_error(&self, message: &str) {
        log::error!(target: "sanfig", "{}", message);
    }
}

static DEFAULT_SINK: Lazy<Arc<dyn Logger>> = Lazy::new(|| Arc::new(LogSink));

impl LogSink {
    /// The process-wide default logger shared by stores built without one.
    pub fn shared() -> Arc<dyn Logger> {
        DEFAULT_SINK.clone()
    }
}

/// Keeps every message in memory, mostly for assertions.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    messages: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    pub fn clear(&self) {
        self.messages.lock().clear()
    }
}

impl Logger for MemoryLogger {
    fn log_error(&self, message: &str) {
        self.messages.lock().push(message.to_owned());
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log_error(&self, message: &str) {
        (**self).log_error(message)
    }
}
