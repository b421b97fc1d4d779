//! Deterministic backend key naming.
//!
//! - `keyspace::id`        membership marker of one live entity
//! - `keyspace:id`         entity record
//! - `keyspace:id:idx`     index back-reference set
//!
//! Ids, field paths and index values are escaped so that a literal `:` never
//! reads as a segment separator. Every structure that grows with the number of
//! entities stores one key per entity and is read back with a prefix scan.

use crate::KEY_SEPARATOR;
use std::borrow::Cow;

const ESCAPE: char = '\\';

/// Escape one key segment (`\` → `\\`, `:` → `\:`).
#[must_use]
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains([ESCAPE, KEY_SEPARATOR]) {
        return Cow::Borrowed(segment);
    }

    let mut out = String::with_capacity(segment.len() + 2);
    for c in segment.chars() {
        if c == ESCAPE || c == KEY_SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }

    Cow::Owned(out)
}

/// Inverse of [`escape_segment`].
///
/// `None` when `segment` holds an unescaped separator or a dangling escape,
/// i.e. it is not exactly one escaped segment.
#[must_use]
pub fn unescape_segment(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => out.push(chars.next()?),
            KEY_SEPARATOR => return None,
            c => out.push(c),
        }
    }

    Some(out)
}

/// The id encoded after `prefix` in a per-entity key, if `key` is one.
#[must_use]
pub fn trailing_id(prefix: &str, key: &str) -> Option<String> {
    key.strip_prefix(prefix)
        .and_then(unescape_segment)
        .filter(|id| !id.is_empty())
}

/// Prefix of every membership marker of the keyspace.
#[must_use]
pub fn members_prefix(keyspace: &str) -> String {
    format!("{keyspace}{KEY_SEPARATOR}{KEY_SEPARATOR}")
}

#[must_use]
pub fn member_key(keyspace: &str, id: &str) -> String {
    format!("{}{}", members_prefix(keyspace), escape_segment(id))
}

/// Prefix shared by every key of the keyspace.
#[must_use]
pub fn keyspace_prefix(keyspace: &str) -> String {
    format!("{keyspace}{KEY_SEPARATOR}")
}

#[must_use]
pub fn record_key(keyspace: &str, id: &str) -> String {
    format!("{keyspace}{KEY_SEPARATOR}{}", escape_segment(id))
}

#[must_use]
pub fn backref_key(keyspace: &str, id: &str) -> String {
    format!(
        "{keyspace}{KEY_SEPARATOR}{}{KEY_SEPARATOR}idx",
        escape_segment(id)
    )
}
