use std::sync::{Arc, Mutex};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::MutationKind;

/// Event name used by [`EmitterNotifier`].
pub const NOTICE_EVENT: &str = "mutation_failed";

/// User-visible error notification for a rolled-back mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: MutationKind,
    pub message: String,
}

impl Notice {
    pub fn failure(kind: MutationKind) -> Self {
        Self {
            kind,
            message: kind.failure_message().to_string(),
        }
    }
}

/// Side channel that surfaces failed mutations to the user (toasts,
/// banners).
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: &Notice) {
        (**self).notify(notice)
    }
}

/// Notifier that logs notices and optionally records them in a buffer.
#[derive(Default)]
pub struct LogNotifier {
    buffer: Option<Arc<Mutex<Vec<Notice>>>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<Notice>>>) -> Self {
        LogNotifier {
            buffer: Some(buffer),
        }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        error!(kind = %notice.kind, "{}", notice.message);
        if let Some(buffer) = &self.buffer {
            match buffer.lock() {
                Ok(mut buffer) => buffer.push(notice.clone()),
                Err(poisoned) => poisoned.into_inner().push(notice.clone()),
            }
        }
    }
}

/// Notifier that emits notices through an [`EventEmitter`] for in-process
/// listeners.
///
/// Listeners receive the notice message on [`NOTICE_EVENT`]. Delivery is
/// asynchronous.
#[cfg(feature = "emitter")]
pub struct EmitterNotifier {
    emitter: Mutex<EventEmitter>,
}

#[cfg(feature = "emitter")]
impl EmitterNotifier {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterNotifier {
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener for notice messages. Returns the listener id.
    pub fn on_notice<F>(&self, listener: F) -> Option<String>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut emitter = self.emitter.lock().ok()?;
        Some(emitter.on(NOTICE_EVENT, listener))
    }
}

#[cfg(feature = "emitter")]
impl Default for EmitterNotifier {
    fn default() -> Self {
        Self::new(EventEmitter::new())
    }
}

#[cfg(feature = "emitter")]
impl Notifier for EmitterNotifier {
    fn notify(&self, notice: &Notice) {
        match self.emitter.lock() {
            Ok(mut emitter) => {
                emitter.emit(NOTICE_EVENT, notice.message.clone());
            }
            Err(_) => {
                error!(kind = %notice.kind, "notice emitter poisoned, dropping notice");
            }
        }
    }
}
