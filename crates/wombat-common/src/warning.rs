//! Parser notices with colored terminal output.
//!
//! Provides deduplication so a notice about an approximated feature is
//! printed once per process, however many documents trigger it. Parse errors
//! are not routed through here; they are collected as data by the parser.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of notices we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Whether notices reach stderr at all.
static ENABLED: AtomicBool = AtomicBool::new(true);

/// Report an approximated or unsupported parser feature (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Tree Builder", "foster parenting is not implemented; inserting in place");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print && ENABLED.load(Ordering::Relaxed) {
        eprintln!("{}", format!("[Wombat {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded notices so they can be printed again.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Turn stderr output of notices on or off. Deduplication still applies
/// while output is off.
pub fn set_warnings_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns true if `message` from `component` has already been reported.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}
