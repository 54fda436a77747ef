//! Small shared helpers: elapsed-time formatting and filesystem utilities.

use std::path::Path;
use std::time::Duration;

/// Formats an elapsed duration as a compact `XdYhZmWs` string.
///
/// Units are emitted only once elapsed time reaches them (inclusive
/// boundaries), each larger unit reducing the remainder before the next
/// is computed. Seconds are always present.
///
/// # Examples
///
/// ```
/// use mtforge::utils::format_elapsed;
/// use std::time::Duration;
///
/// assert_eq!(format_elapsed(Duration::from_secs(45)), "45s");
/// assert_eq!(format_elapsed(Duration::from_secs(3725)), "1h 2m 5s");
/// ```
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let mut remaining = elapsed.as_secs();
    let mut parts = Vec::with_capacity(4);

    if remaining >= 86_400 {
        parts.push(format!("{}d", remaining / 86_400));
        remaining %= 86_400;
    }
    if !parts.is_empty() || remaining >= 3_600 {
        parts.push(format!("{}h", remaining / 3_600));
        remaining %= 3_600;
    }
    if !parts.is_empty() || remaining >= 60 {
        parts.push(format!("{}m", remaining / 60));
        remaining %= 60;
    }
    parts.push(format!("{remaining}s"));

    parts.join(" ")
}

/// Removes a directory tree if it exists, then recreates it empty.
pub fn recreate_dir(path: &Path) -> std::io::Result<()> {
    remove_dir_best_effort(path);
    std::fs::create_dir_all(path)
}

/// Removes a directory tree, ignoring all errors (missing path included).
pub fn remove_dir_best_effort(path: &Path) {
    let _ = std::fs::remove_dir_all(path);
}
