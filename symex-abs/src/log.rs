/*!

Leveled logging macros over a pluggable backing implementation.

The public interface is the threshold functions and the macros `error!`, `warning!`, `info!`,
`debug!`, and `trace!`. Each macro takes a numeric verbosity as its first argument; the message is
emitted only when the verbosity is at or below the global threshold. The backing implementation is
currently the [`tracing`](https://crates.io/crates/tracing) crate and is encapsulated here.

*/

use std::sync::atomic::{AtomicU8, Ordering};

static LOGGING_THRESHOLD: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity threshold. Messages with verbosity above the threshold are dropped.
pub fn set_global_logging_threshold(threshold: u8) {
  LOGGING_THRESHOLD.store(threshold, Ordering::Relaxed);
}

pub fn get_global_logging_threshold() -> u8 {
  LOGGING_THRESHOLD.load(Ordering::Relaxed)
}

/// Installs a `tracing-subscriber` formatting subscriber. Intended for binaries and tests;
/// calling it more than once is harmless (later calls are ignored).
pub fn init_logging() {
  let _ = tracing_subscriber::fmt().with_target(false).try_init();
}

#[macro_export]
macro_rules! error {
  ($verbosity:expr, $($arg:tt)+) => {
    if ($verbosity) <= $crate::log::get_global_logging_threshold() {
      $crate::tracing::error!($($arg)+);
    }
  };
}

#[macro_export]
macro_rules! warning {
  ($verbosity:expr, $($arg:tt)+) => {
    if ($verbosity) <= $crate::log::get_global_logging_threshold() {
      $crate::tracing::warn!($($arg)+);
    }
  };
}

#[macro_export]
macro_rules! info {
  ($verbosity:expr, $($arg:tt)+) => {
    if ($verbosity) <= $crate::log::get_global_logging_threshold() {
      $crate::tracing::info!($($arg)+);
    }
  };
}

#[macro_export]
macro_rules! debug {
  ($verbosity:expr, $($arg:tt)+) => {
    if ($verbosity) <= $crate::log::get_global_logging_threshold() {
      $crate::tracing::debug!($($arg)+);
    }
  };
}

#[macro_export]
macro_rules! trace {
  ($verbosity:expr, $($arg:tt)+) => {
    if ($verbosity) <= $crate::log::get_global_logging_threshold() {
      $crate::tracing::trace!($($arg)+);
    }
  };
}

pub use crate::{debug, error, info, trace, warning};
