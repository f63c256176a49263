//! Deduplicated diagnostics with colored terminal output.
//!
//! Parsing never fails, so anything worth telling a human about (recorded
//! parse errors in verbose mode, tolerated oddities) is routed through here.
//! Each distinct `(component, message)` pair is printed once per process
//! until [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while holding the lock leaves the set intact; keep using it.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Print a warning once per unique `(component, message)` pair.
///
/// # Example
/// ```ignore
/// warn_once("HTML Parser", "unexpected end tag </p> at 42");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = warned().get_or_insert_with(HashSet::new).insert(key);

    if should_print {
        eprintln!("{YELLOW}[sift {component}] ⚠ {message}{RESET}");
    }
}

/// Forget every recorded warning so they can be printed again.
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}

/// Number of distinct warnings printed since the last [`clear_warnings`].
#[must_use]
pub fn warning_count() -> usize {
    warned().as_ref().map_or(0, HashSet::len)
}
