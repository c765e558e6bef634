use super::remove_where;
use crate::model::{App, Icon};
use crate::state::CatalogState;
use crate::util::new_id;

/// What [`delete`] took with it.
#[derive(Debug, Clone)]
pub struct DeletedApp {
    pub app: App,
    pub removed_pairs: Vec<String>,
}

/// Insert an empty app and return it for immediate editing.
pub fn create(state: &mut CatalogState) -> App {
    let app = App::new(new_id("app"));
    state.apps.push(app.clone());
    app
}

/// Blank names are stored as-is; display falls back to "(unnamed)".
pub fn rename(state: &mut CatalogState, app_id: &str, name: &str) -> bool {
    match state.app_mut(app_id) {
        Some(app) => {
            app.name = name.trim().to_string();
            true
        }
        None => false,
    }
}

pub fn set_notes(state: &mut CatalogState, app_id: &str, notes: &str) -> bool {
    match state.app_mut(app_id) {
        Some(app) => {
            app.notes = notes.to_string();
            true
        }
        None => false,
    }
}

pub fn set_icon(state: &mut CatalogState, app_id: &str, icon: Icon) -> bool {
    match state.app_mut(app_id) {
        Some(app) => {
            app.icon = icon;
            true
        }
        None => false,
    }
}

/// Remove an app together with its assignments and every pair it belongs to.
///
/// Workflow steps citing the app keep their reference; the cross-reference
/// index reports it until the step is edited.
pub fn delete(state: &mut CatalogState, app_id: &str) -> Option<DeletedApp> {
    let position = state.apps.iter().position(|a| a.id == app_id)?;
    let app = state.apps.remove(position);

    let removed_pairs: Vec<String> = state
        .integration_pairs
        .iter()
        .filter(|p| p.involves(app_id))
        .map(|p| p.id.clone())
        .collect();
    remove_where(&mut state.integration_pairs, |p| p.involves(app_id));

    Some(DeletedApp { app, removed_pairs })
}
