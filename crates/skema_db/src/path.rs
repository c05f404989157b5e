//! Library-path arithmetic.
//!
//! Library paths are `/`-separated, rooted at the database root. A leading
//! `/` makes a path absolute; `.` keeps the current scope and `..` ascends
//! one library. This module holds the pure string operations; resolving a
//! path to an actual library happens in [`crate::database`].

/// Splits a path expression at its first `/`.
///
/// Returns the first segment and the remainder. A path without a separator
/// yields `(path, "")`; a leading separator yields an empty first segment.
pub fn split_path(path: &str) -> (&str, &str) {
    match path.find('/') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => (path, ""),
    }
}

/// Concatenates a relative path expression onto a base path.
///
/// `.` segments are elided and `..` segments consume the last component of
/// the base, one at a time, so any number of leading `./`/`../` segments
/// reduces correctly. An absolute `relative` overrides the base entirely;
/// an empty `relative` returns the base unchanged. Ascending past a base
/// with no removable component leaves the remaining expression rooted at
/// `/` instead.
pub fn concat_paths(base: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return relative.to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }
    let (first, rest) = split_path(relative);
    match first {
        "." => concat_paths(base, rest),
        ".." => match base.rfind('/') {
            Some(pos) => concat_paths(&base[..pos], rest),
            None => format!("/{relative}"),
        },
        _ => format!("{base}/{relative}"),
    }
}
