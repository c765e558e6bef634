use super::{remove_where, required};
use crate::model::{Function, DEFAULT_CATEGORY, UNNAMED_FUNCTION};
use crate::state::CatalogState;
use crate::util::new_id;

/// Find a function by exact name, creating it in category "Other" if absent.
///
/// Returns `None` for blank names.
pub fn get_or_create_by_name(state: &mut CatalogState, name: &str) -> Option<Function> {
    let name = required(name)?;
    if let Some(existing) = state.function_by_name(&name) {
        return Some(existing.clone());
    }
    let function = Function::new(new_id("fn"), name);
    state.functions.push(function.clone());
    Some(function)
}

pub fn rename(state: &mut CatalogState, function_id: &str, name: &str) -> bool {
    let Some(name) = required(name) else {
        return false;
    };
    match state.function_mut(function_id) {
        Some(function) => {
            function.name = name;
            true
        }
        None => false,
    }
}

pub fn set_notes(state: &mut CatalogState, function_id: &str, notes: &str) -> bool {
    match state.function_mut(function_id) {
        Some(function) => {
            function.notes = notes.to_string();
            true
        }
        None => false,
    }
}

/// Blank categories fall back to "Other".
pub fn set_category(state: &mut CatalogState, function_id: &str, category: &str) -> bool {
    let category = required(category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    match state.function_mut(function_id) {
        Some(function) => {
            function.category = category;
            true
        }
        None => false,
    }
}

/// Delete a function and every assignment that points at it.
pub fn delete(state: &mut CatalogState, function_id: &str) -> bool {
    if !remove_where(&mut state.functions, |f| f.id == function_id) {
        return false;
    }
    for app in &mut state.apps {
        app.functions.retain(|a| a.function_id != function_id);
    }
    true
}

/// Materialize a placeholder for an assignment whose function is missing.
pub fn ensure_stub(state: &mut CatalogState, function_id: &str) -> bool {
    if function_id.is_empty() || state.function(function_id).is_some() {
        return false;
    }
    state.functions.push(Function::new(
        function_id.to_string(),
        UNNAMED_FUNCTION.to_string(),
    ));
    true
}
