// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reserved path syntax tokens and canonicalization.
//!
//! Node names must not contain the separator or the attribute marker;
//! this module does not validate name legality, it only defines the
//! tokens and the pure canonicalization transform used by tree-level
//! lookups.

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Marker introducing an attribute name at the end of a path.
pub const ATTRIBUTE_MARKER: char = '@';

/// Reserved name of the synthetic root link.
pub const ROOT_NAME: &str = "/";

/// Splits an attribute suffix off a path.
///
/// Returns the path body and, when the path carries an attribute marker,
/// the attribute name that followed it. The body may be empty.
#[must_use]
pub fn split_attribute(path: &str) -> (&str, Option<&str>) {
    match path.split_once(ATTRIBUTE_MARKER) {
        Some((body, attr)) => (body, Some(attr)),
        None => (path, None),
    }
}

/// Canonicalizes a path: collapses repeated separators and resolves
/// `.`/`..` segments.
///
/// Absolute paths stay absolute and `..` at the root is dropped; relative
/// paths keep leading `..` segments. A trailing attribute suffix is
/// preserved verbatim. An empty absolute result canonicalizes to the root
/// name, an empty relative result to `.`.
#[must_use]
pub fn canonicalize_path(path: &str) -> String {
    let (body, attr) = split_attribute(path);
    let absolute = body.starts_with(SEPARATOR);
    let mut segments: Vec<&str> = Vec::new();
    for segment in body.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), None | Some(&"..")) {
                    if !absolute {
                        segments.push("..");
                    }
                } else {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    let mut canonical = if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    };
    if let Some(attr) = attr {
        canonical.push(ATTRIBUTE_MARKER);
        canonical.push_str(attr);
    }
    canonical
}
