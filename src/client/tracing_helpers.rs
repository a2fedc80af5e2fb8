//! Span and timing helpers for session operations.
//!
//! Span creation with a runtime-selected level lives here so the session
//! methods only deal with I/O.

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;

/// Create a tracing span at a dynamically selected level.
///
/// Each branch calls the matching `tracing::<level>_span!` macro so span
/// metadata stays static per branch while the branch choice is dynamic.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

/// Span for the `connect` operation.
pub(crate) fn connect_span(config: &TracingConfig, peer_addr: &str) -> Span {
    dynamic_span!(
        config.connect_level,
        "session.connect",
        peer.addr = peer_addr
    )
}

/// Span for the `send` operation.
pub(crate) fn send_span(config: &TracingConfig, frame_bytes: usize) -> Span {
    dynamic_span!(config.send_level, "session.send", frame.bytes = frame_bytes)
}

/// Span for the `receive` operation.
///
/// `frame.bytes` and `result` are recorded once the frame arrives.
pub(crate) fn receive_span(config: &TracingConfig) -> Span {
    dynamic_span!(
        config.receive_level,
        "session.receive",
        frame.bytes = tracing::field::Empty,
        result = tracing::field::Empty
    )
}

/// Span for the `close` operation.
pub(crate) fn close_span(config: &TracingConfig) -> Span {
    dynamic_span!(config.close_level, "session.close")
}

/// Start a timer if timing is enabled for the operation.
pub(crate) fn start_timer(enabled: bool) -> Option<Instant> { enabled.then(Instant::now) }

/// Record elapsed time if a timer was started.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        let elapsed_us = start.elapsed().as_micros();
        tracing::debug!(elapsed_us = elapsed_us, "operation.timing");
    }
}
