//! Feature-gated logging.
//!
//! Call sites use `hub_log!(level, ...)` with `tracing` field syntax. Without
//! the `tracing` feature the macro expands to nothing.

macro_rules! hub_log {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::$level!($($arg)+);
        }
    };
}
