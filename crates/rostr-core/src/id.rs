//! Identifier generation for rostr
//!
//! Member records carry two identifiers: a UUID v4 primary id assigned by the
//! facade on first save, and an optional MEM-NNN display id assigned by the
//! UI shell.

use crate::Member;
use uuid::Uuid;

/// Generate a unique member identifier (UUID v4, hyphenated)
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Next sequential display id for the given collection.
///
/// Scans existing `MEM-NNN` short ids and returns max + 1, zero-padded to
/// three digits. Malformed short ids are ignored.
pub fn next_short_id(members: &[Member]) -> String {
    let max = members
        .iter()
        .filter_map(|m| m.short_id.as_deref())
        .filter_map(|s| s.strip_prefix("MEM-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("MEM-{:03}", max + 1)
}
