//! Event hooks for the recognition lifecycle.
//!
//! Optional and non-intrusive: implement [`EventHandler`] to observe
//! recognitions for progress displays or audit trails. Logging goes through
//! `tracing` regardless.

use std::sync::Arc;

use crate::pipeline::Warning;

/// Events emitted while recognizing one image.
#[derive(Debug, Clone)]
pub enum Event {
    /// An image was accepted and is about to be sent.
    RecognitionStart {
        /// File name or caller-supplied label.
        source: String,
        /// Raw image size in bytes.
        bytes: usize,
    },
    /// A transport-level retry due to an HTTP error.
    TransportRetry {
        source: String,
        /// The retry attempt number (1-indexed).
        attempt: u32,
        delay_ms: u64,
        reason: String,
    },
    /// The strict parser rejected the reply and the fallback parser ran.
    FallbackUsed {
        source: String,
        /// Why strict parsing was abandoned.
        reason: String,
    },
    /// Recognition finished.
    RecognitionEnd {
        source: String,
        records: usize,
        warning: Option<Warning>,
        /// False when the model call failed or nothing could be parsed.
        ok: bool,
    },
}

/// Handler for recognition events.
///
/// # Example
///
/// ```
/// use shipdoc_recognizer::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         if let Event::RecognitionEnd { source, records, .. } = event {
///             println!("{source}: {records} record(s)");
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
