//! Structured logging helpers.
//!
//! Every event carries a `component` field naming the part of the tool that
//! emitted it (`clock`, `fetch`, `display`, ...), so JSON output can be
//! filtered without parsing messages.

/// Log an event with a `component` field.
///
/// ```rust,ignore
/// log_event!(info, "fetch", "Backend reachable", base_url = %url);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a fetch-cycle event with its sequence token.
#[macro_export]
macro_rules! log_cycle_event {
    ($level:ident, $msg:expr, $sequence:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            component = "fetch",
            sequence = $sequence,
            $($($field)*,)?
            $msg
        )
    };
}
