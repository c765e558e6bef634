//! Small helpers shared by every layer: identifiers, lenient serde fields,
//! dedup, avatars and merge-field token scanning. Nothing here touches the
//! catalog state.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use uuid::Uuid;

/// Matches `{{ Token Name }}` merge fields. Nested braces are not supported.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("token regex is valid"));

const AVATAR_COLORS: [&str; 8] = [
    "#4f46e5", "#0891b2", "#059669", "#d97706", "#dc2626", "#7c3aed", "#db2777", "#475569",
];

/// Generate a fresh identifier such as `app_3f2a9c1e0b7d`.
pub fn new_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &raw[..12])
}

/// Read a JSON `null` as the field's default. Older stores wrote `null` for
/// cleared text fields.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Remove duplicates while keeping the first occurrence of each item.
pub fn dedupe<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Deterministic stand-in for apps without an icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetterAvatar {
    pub letter: char,
    pub color: &'static str,
}

pub fn letter_avatar(name: &str) -> LetterAvatar {
    let letter = name
        .trim()
        .chars()
        .find(|c| c.is_alphanumeric())
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('?');

    // djb2 keeps the colour stable across runs and platforms
    let hash = name
        .trim()
        .bytes()
        .fold(5381u32, |h, b| h.wrapping_mul(33).wrapping_add(b as u32));

    LetterAvatar {
        letter,
        color: AVATAR_COLORS[(hash as usize) % AVATAR_COLORS.len()],
    }
}

/// Merge-field token names found in `text`, in order of first appearance.
pub fn merge_field_tokens(text: &str) -> Vec<String> {
    dedupe(
        TOKEN_RE
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect(),
    )
}
