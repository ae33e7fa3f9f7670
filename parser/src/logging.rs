//! FILENAME: parser/src/logging.rs
// PURPOSE: Category-tagged logging for the tokenizer and parser.
// CONTEXT: Lines are formatted as `seq|CATEGORY|message` and handed to the `log`
// facade. The host application installs the logger and picks the level.

pub use log::Level;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// SEQUENCED LOG LINES
// ============================================================================

/// Global sequence counter so interleaved lines from separate parses can be ordered.
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::Relaxed) + 1
}

/// Write a log line in unified format. Nothing is formatted when the level is disabled.
pub fn write_log(level: Level, category: &str, message: std::fmt::Arguments<'_>) {
    if !log::log_enabled!(target: "formula_parser", level) {
        return;
    }
    let seq = next_seq();
    log::log!(target: "formula_parser", level, "{}|{}|{}", seq, category, message);
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(category: &str, func_name: &str, params: std::fmt::Arguments<'_>) {
    if params.as_str() == Some("") {
        write_log(Level::Debug, category, format_args!("ENTER {}", func_name));
    } else {
        write_log(Level::Debug, category, format_args!("ENTER {} {}", func_name, params));
    }
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(category: &str, func_name: &str, result: std::fmt::Arguments<'_>) {
    if result.as_str() == Some("") {
        write_log(Level::Debug, category, format_args!("EXIT {}", func_name));
    } else {
        write_log(Level::Debug, category, format_args!("EXIT {} {}", func_name, result));
    }
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_trace {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log($crate::logging::Level::Trace, $cat, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log($crate::logging::Level::Debug, $cat, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter($cat, $func, format_args!(""))
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter($cat, $func, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit($cat, $func, format_args!(""))
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit($cat, $func, format_args!($($arg)*))
    };
}
