//! Hierarchical deck names.
//!
//! A deck name is a path of segments joined by [`SEPARATOR`]. Normalization
//! only trims whitespace around each segment; empty segments produced by
//! leading, trailing, or doubled separators (`"::foobar"`, `"A::"`) are kept
//! as-is so that legacy catalogs stay navigable.
//!
//! Lookups compare names through [`name_key`], which is the normalized name
//! lowercased. Display always uses the stored, case-preserving name.

/// Separator between path segments.
pub const SEPARATOR: &str = "::";

/// Trims whitespace around every segment of `name` and rejoins the segments.
///
/// Whitespace inside a segment is preserved.
///
/// ```rust
/// use deckcat_core::strip;
///
/// assert_eq!(strip("Z::\n A\n\t::Y"), "Z::A::Y");
/// assert_eq!(strip("A\nB C\t D"), "A\nB C\t D");
/// assert_eq!(strip("::foobar"), "::foobar");
/// ```
#[must_use]
pub fn strip(name: &str) -> String {
    name.split(SEPARATOR)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Splits `name` into its segments without normalizing them.
#[must_use]
pub fn segments(name: &str) -> Vec<&str> {
    name.split(SEPARATOR).collect()
}

/// Returns every proper ancestor path of `name`, root-most first.
///
/// The name itself is not included; a single-segment name has no ancestors.
#[must_use]
pub fn ancestors(name: &str) -> Vec<String> {
    let parts = segments(name);
    (1..parts.len())
        .map(|depth| parts[..depth].join(SEPARATOR))
        .collect()
}

/// Returns the immediate parent path of `name`, or `None` for a top-level name.
#[must_use]
pub fn immediate_parent(name: &str) -> Option<String> {
    let parts = segments(name);
    if parts.len() < 2 {
        return None;
    }
    Some(parts[..parts.len() - 1].join(SEPARATOR))
}

/// Returns the last segment of `name`.
#[must_use]
pub fn basename(name: &str) -> &str {
    name.split(SEPARATOR).last().unwrap_or(name)
}

/// Case-insensitive lookup key for `name`: normalized, then lowercased.
#[must_use]
pub fn name_key(name: &str) -> String {
    strip(name).to_lowercase()
}

/// Returns `true` if `candidate` lies strictly below `ancestor`.
///
/// Both arguments are expected to be keys (see [`name_key`]). The match is on
/// whole segments: `"ab::c"` is not below `"a"`.
#[must_use]
pub fn is_descendant_key(candidate: &str, ancestor: &str) -> bool {
    let above = segments(ancestor);
    let below = segments(candidate);
    below.len() > above.len() && below[..above.len()] == above[..]
}

/// Returns `true` if one name is the other or lies below it, comparing case-insensitively.
#[must_use]
pub fn same_branch(a: &str, b: &str) -> bool {
    let (a, b) = (name_key(a), name_key(b));
    a == b || is_descendant_key(&a, &b) || is_descendant_key(&b, &a)
}

/// Rewrites `name` so that its `old_prefix` is replaced by `new_prefix`.
///
/// `old_prefix` is matched case-insensitively on whole segments; the trailing
/// segments of `name` keep their original spelling. Returns `None` when `name`
/// is not `old_prefix` itself or below it.
#[must_use]
pub fn reparent(name: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    let old_count = segments(old_prefix).len();
    let parts = segments(name);
    if parts.len() < old_count {
        return None;
    }
    let head = parts[..old_count].join(SEPARATOR);
    if head.to_lowercase() != old_prefix.to_lowercase() {
        return None;
    }
    let mut renamed = new_prefix.to_string();
    for tail in &parts[old_count..] {
        renamed.push_str(SEPARATOR);
        renamed.push_str(tail);
    }
    Some(renamed)
}
