//! # Command Layer
//!
//! The only sanctioned way to change a
//! [`CatalogState`](crate::state::CatalogState). Each submodule holds plain
//! functions over `&mut CatalogState` that leave every invariant intact when
//! they return:
//!
//! - an app never pairs with itself, and pairs are stored in canonical order
//! - at most one assignment per `(app, function)`
//! - function lookup by name is exact and case-sensitive
//!
//! ## What Commands Do NOT Do
//!
//! - **Persistence**: the API facade writes the snapshot and rebuilds indexes
//! - **Notification**: listeners are fired by the facade
//! - **User interaction**: inputs arrive as parameters, never from prompts
//!
//! ## Rejection, not errors
//!
//! Invalid input (self-pairing, blank required names, duplicates, unknown ids)
//! is a normal outcome. Commands report it as `None` or `false` and leave the
//! state untouched. Only the two user-visible failures, a malformed import and
//! an assignment with no eligible apps left, are `Err` values.
//!
//! ## Command Modules
//!
//! - [`apps`]: create, rename, annotate, delete (with pair cascade)
//! - [`functions`]: get-or-create by name, edit, delete, stub healing
//! - [`assignments`]: assign, cycle level, remove, bulk assign
//! - [`pairs`]: canonical get-or-create, flags, notes, directional actions
//! - [`datapoints`]: master datapoints and per-app mappings
//! - [`workflows`]: workflows, steps, resource citations
//! - [`library`]: resources, team, templates, icons, patterns, org settings
//! - [`transfer`]: bulk export/import documents

pub mod apps;
pub mod assignments;
pub mod datapoints;
pub mod functions;
pub mod library;
pub mod pairs;
pub mod transfer;
pub mod workflows;

/// Remove every item matching `pred`. Returns whether anything was removed.
pub(crate) fn remove_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() != before
}

/// Trimmed copy of `input`, or `None` when nothing is left.
pub(crate) fn required(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
