//! Canonical package name folding.
//!
//! Two names refer to the same package iff their canonical forms match:
//! lowercase, with runs of `-`, `_`, and `.` collapsed to a single `-`.

/// Fold a package name to its canonical form.
#[must_use]
pub fn canonicalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.chars() {
        if c == '-' || c == '_' || c == '.' {
            if !last_was_sep && !out.is_empty() {
                out.push('-');
            }
            last_was_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_was_sep = false;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// `true` if two package names are the same package under canonicalization.
#[must_use]
pub fn same_package(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}
