use crate::error::{Result, StackError};
use crate::model::{Assignment, Level};
use crate::state::CatalogState;

/// Record that `app_id` serves `function_id`.
///
/// No-op (false) when the pair is already assigned or either side is unknown.
pub fn assign(state: &mut CatalogState, app_id: &str, function_id: &str, level: Level) -> bool {
    if state.function(function_id).is_none() {
        return false;
    }
    let Some(app) = state.app_mut(app_id) else {
        return false;
    };
    if app.assignment(function_id).is_some() {
        return false;
    }
    app.functions.push(Assignment {
        function_id: function_id.to_string(),
        status: level,
    });
    true
}

/// Advance along `available → primary → evaluating → available`.
pub fn cycle_level(state: &mut CatalogState, app_id: &str, function_id: &str) -> Option<Level> {
    let assignment = state.app_mut(app_id)?.assignment_mut(function_id)?;
    assignment.status = assignment.status.next();
    Some(assignment.status)
}

pub fn set_level(state: &mut CatalogState, app_id: &str, function_id: &str, level: Level) -> bool {
    match state
        .app_mut(app_id)
        .and_then(|app| app.assignment_mut(function_id))
    {
        Some(assignment) => {
            assignment.status = level;
            true
        }
        None => false,
    }
}

pub fn remove(state: &mut CatalogState, app_id: &str, function_id: &str) -> bool {
    let Some(app) = state.app_mut(app_id) else {
        return false;
    };
    let before = app.functions.len();
    app.functions.retain(|a| a.function_id != function_id);
    app.functions.len() != before
}

/// Ids of apps not yet assigned to `function_id`, in catalog order.
pub fn eligible_apps(state: &CatalogState, function_id: &str) -> Vec<String> {
    state
        .apps
        .iter()
        .filter(|app| app.assignment(function_id).is_none())
        .map(|app| app.id.clone())
        .collect()
}

/// Assign several apps to one function at once.
///
/// Fails with [`StackError::NoEligibleApps`] when every app is already
/// assigned. Ineligible or unknown ids in `app_ids` are skipped. Returns the
/// ids that were actually assigned.
pub fn assign_many(
    state: &mut CatalogState,
    function_id: &str,
    app_ids: &[String],
    level: Level,
) -> Result<Vec<String>> {
    let function_name = state
        .function(function_id)
        .map(|f| f.name.clone())
        .ok_or_else(|| StackError::NotFound(format!("function {}", function_id)))?;

    let eligible = eligible_apps(state, function_id);
    if eligible.is_empty() {
        return Err(StackError::NoEligibleApps(function_name));
    }

    let mut assigned = Vec::new();
    for app_id in app_ids {
        if eligible.contains(app_id) && assign(state, app_id, function_id, level) {
            assigned.push(app_id.clone());
        }
    }
    Ok(assigned)
}
