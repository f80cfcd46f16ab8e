//! Entry paths addressing values inside nested structures.
//!
//! A path is built from the keys walked from the root, joined with `.`, and
//! list positions appended as `[index]`: `key`, `key[0]`, `parent.key[0]`.

/// Builds the entry path of `key` (optionally at list `index`) under `parent`.
pub fn entry_path(parent: Option<&str>, key: &str, index: Option<usize>) -> String {
    let mut path = match parent {
        Some(parent) => format!("{}.{}", parent, key),
        None => key.to_string(),
    };
    if let Some(index) = index {
        path.push_str(&format!("[{}]", index));
    }
    path
}

/// Builds the path of the `inner`-th element of the `outer`-th list of `key`.
pub(crate) fn grid_entry_path(parent: Option<&str>, key: &str, outer: usize, inner: usize) -> String {
    format!("{}[{}]", entry_path(parent, key, Some(outer)), inner)
}
