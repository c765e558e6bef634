//! # Query Layer
//!
//! Read-only projections over a [`CatalogState`]. Nothing here takes `&mut`.
//!
//! Assignments are stored on apps; [`functions_with_apps`] and
//! [`apps_for_function`] give the other direction. An assignment whose
//! function is missing shows up under a transient "(unnamed function)"
//! placeholder (borrowed vs. owned via [`Cow`]) so it is never dropped from
//! results; the placeholder is only materialized in state by migration.

use serde::Serialize;
use std::borrow::Cow;

use crate::model::{
    App, FlowType, Function, IntegrationPair, Level, PairColor, UNNAMED_APP, UNNAMED_FUNCTION,
};
use crate::state::CatalogState;
use crate::util::dedupe;

#[derive(Debug, Clone, Serialize)]
pub struct AppLevel<'a> {
    pub app: &'a App,
    pub level: Level,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionGroup<'a> {
    pub function: Cow<'a, Function>,
    pub assignments: Vec<AppLevel<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionLevel<'a> {
    pub function: Cow<'a, Function>,
    pub level: Level,
}

/// An app's integration with one other app, derived from their pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationLink {
    pub other_app_id: String,
    #[serde(rename = "type")]
    pub link_type: FlowType,
}

/// Every function with the apps assigned to it, including empty ones.
///
/// Functions come in catalog order, followed by placeholders for missing
/// function ids in order of first reference. Within a group, apps are in
/// catalog order.
pub fn functions_with_apps(state: &CatalogState) -> Vec<FunctionGroup<'_>> {
    let mut groups: Vec<FunctionGroup<'_>> = state
        .functions
        .iter()
        .map(|function| FunctionGroup {
            function: Cow::Borrowed(function),
            assignments: apps_for_function(state, &function.id),
        })
        .collect();

    for function_id in dangling_function_ids(state) {
        groups.push(FunctionGroup {
            assignments: apps_for_function(state, &function_id),
            function: Cow::Owned(placeholder(function_id)),
        });
    }
    groups
}

pub fn apps_for_function<'a>(state: &'a CatalogState, function_id: &str) -> Vec<AppLevel<'a>> {
    state
        .apps
        .iter()
        .filter_map(|app| {
            app.assignment(function_id)
                .map(|a| AppLevel { app, level: a.status })
        })
        .collect()
}

pub fn assignments_for_app<'a>(state: &'a CatalogState, app_id: &str) -> Vec<FunctionLevel<'a>> {
    let Some(app) = state.app(app_id) else {
        return Vec::new();
    };
    app.functions
        .iter()
        .map(|a| FunctionLevel {
            function: match state.function(&a.function_id) {
                Some(function) => Cow::Borrowed(function),
                None => Cow::Owned(placeholder(a.function_id.clone())),
            },
            level: a.status,
        })
        .collect()
}

/// Apps assigned to the function named exactly `function_name`.
pub fn apps_filtered_by_function<'a>(state: &'a CatalogState, function_name: &str) -> Vec<&'a App> {
    let ids: Vec<&str> = state
        .functions
        .iter()
        .filter(|f| f.name == function_name)
        .map(|f| f.id.as_str())
        .collect();
    state
        .apps
        .iter()
        .filter(|app| app.functions.iter().any(|a| ids.contains(&a.function_id.as_str())))
        .collect()
}

/// Apps that could still be assigned to `function_id`.
pub fn assignable_apps<'a>(state: &'a CatalogState, function_id: &str) -> Vec<&'a App> {
    state
        .apps
        .iter()
        .filter(|app| app.assignment(function_id).is_none())
        .collect()
}

/// Functions no app is assigned to.
pub fn unused_functions(state: &CatalogState) -> Vec<&Function> {
    state
        .functions
        .iter()
        .filter(|f| !state.apps.iter().any(|app| app.assignment(&f.id).is_some()))
        .collect()
}

/// Every pair with `app_id` on either side. Pairs whose other side no
/// longer exists are left out.
pub fn pairs_for_app<'a>(state: &'a CatalogState, app_id: &str) -> Vec<&'a IntegrationPair> {
    state
        .integration_pairs
        .iter()
        .filter(|p| {
            p.other(app_id)
                .is_some_and(|other| state.app(other).is_some())
        })
        .collect()
}

pub fn pair_between<'a>(state: &'a CatalogState, app_a: &str, app_b: &str) -> Option<&'a IntegrationPair> {
    let (low, high) = crate::model::canonical_pair(app_a, app_b)?;
    crate::commands::pairs::find(state, low, high)
}

/// Pairs that record at least one relationship.
pub fn active_pairs(state: &CatalogState) -> Vec<&IntegrationPair> {
    state
        .integration_pairs
        .iter()
        .filter(|p| p.is_active())
        .collect()
}

pub fn pair_color(pair: &IntegrationPair) -> PairColor {
    PairColor::from_flags(pair.has_direct, pair.has_zapier)
}

/// `{otherAppId, type}` for each flagged pair of `app_id`.
pub fn integration_links(state: &CatalogState, app_id: &str) -> Vec<IntegrationLink> {
    pairs_for_app(state, app_id)
        .into_iter()
        .filter_map(|pair| {
            let link_type = FlowType::from_color(pair_color(pair))?;
            Some(IntegrationLink {
                other_app_id: pair.other(app_id)?.to_string(),
                link_type,
            })
        })
        .collect()
}

pub fn app_display_name(app: &App) -> &str {
    if app.name.trim().is_empty() {
        UNNAMED_APP
    } else {
        &app.name
    }
}

pub fn function_display_name(function: &Function) -> &str {
    if function.name.trim().is_empty() {
        UNNAMED_FUNCTION
    } else {
        &function.name
    }
}

/// Resolve an app by id, then by exact name.
pub fn find_app<'a>(state: &'a CatalogState, id_or_name: &str) -> Option<&'a App> {
    state
        .app(id_or_name)
        .or_else(|| state.apps.iter().find(|a| a.name == id_or_name))
}

/// Resolve a function by id, then by exact name.
pub fn find_function<'a>(state: &'a CatalogState, id_or_name: &str) -> Option<&'a Function> {
    state
        .function(id_or_name)
        .or_else(|| state.function_by_name(id_or_name))
}

fn dangling_function_ids(state: &CatalogState) -> Vec<String> {
    dedupe(
        state
            .apps
            .iter()
            .flat_map(|app| app.functions.iter())
            .filter(|a| state.function(&a.function_id).is_none())
            .map(|a| a.function_id.clone())
            .collect(),
    )
}

fn placeholder(function_id: String) -> Function {
    Function::new(function_id, UNNAMED_FUNCTION.to_string())
}
