//! Logging macros for the search engines with verbosity level control.
//!
//! Provides zero-cost logging when disabled (verbosity=0).
//! Verbosity levels:
//! - 0: SILENT (only errors)
//! - 1: PROGRESS (search start/finish, bound improvements, inconsistencies)
//! - 2: PRUNING (duplicate, equivalence and bound pruning decisions)
//! - 3: TRACE (every popped schedule)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_PROGRESS: u8 = 1;
pub const VERBOSITY_PRUNING: u8 = 2;
pub const VERBOSITY_TRACE: u8 = 3;

/// Log at PROGRESS level (verbosity >= 1).
///
/// Used for: search start and result, new best schedules, reopened states.
#[macro_export]
macro_rules! log_progress {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PROGRESS {
            eprintln!($($arg)*);
        }
    };
}

/// Log at PRUNING level (verbosity >= 2).
///
/// Used for: why a schedule was discarded without expansion.
#[macro_export]
macro_rules! log_pruning {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PRUNING {
            eprintln!($($arg)*);
        }
    };
}

/// Log at TRACE level (verbosity >= 3).
///
/// Used for: every pop with its cost and frontier size.
#[macro_export]
macro_rules! log_trace {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_TRACE {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn touch(calls: &Cell<u32>) -> u32 {
        calls.set(calls.get() + 1);
        calls.get()
    }

    #[test]
    fn test_messages_only_formatted_at_their_level() {
        let calls = Cell::new(0);

        log_progress!(VERBOSITY_SILENT, "{}", touch(&calls));
        log_pruning!(VERBOSITY_PROGRESS, "{}", touch(&calls));
        log_trace!(VERBOSITY_PRUNING, "{}", touch(&calls));
        assert_eq!(calls.get(), 0);

        log_progress!(VERBOSITY_PROGRESS, "{}", touch(&calls));
        log_pruning!(VERBOSITY_TRACE, "{}", touch(&calls));
        log_trace!(VERBOSITY_TRACE, "{}", touch(&calls));
        assert_eq!(calls.get(), 3);
    }
}
