//! Internal trace macro (spec §6, §10.1).
//!
//! Mirrors the teacher's `__fsm_log!`: with the `logging` feature off,
//! this expands to nothing (zero-cost); with it on, it forwards to
//! `log::trace!`.

#[cfg(feature = "logging")]
#[macro_export]
#[doc(hidden)]
macro_rules! __port_fsm_log {
    ($($arg:tt)*) => {
        log::trace!($($arg)*);
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __port_fsm_log {
    ($($arg:tt)*) => {
        // logging feature disabled: no code generated
    };
}
