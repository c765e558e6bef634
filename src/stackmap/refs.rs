//! # Cross-reference Index
//!
//! Answers "where is this used?" for resources and merge-field tokens.
//!
//! - **Resources**: keyed `kind:id` (e.g. `app:app_seed_1`), listing every
//!   workflow step that cites it.
//! - **Tokens**: keyed by token name (`Client Email`), listing every step
//!   body, naming template, folder template and app datapoint mapping that
//!   uses it.
//!
//! The index is derived, never authoritative, and never edited in place:
//! [`RefIndex::build`] recomputes it from a [`CatalogState`]. Keys are kept in
//! `BTreeMap`s and locations in catalog order, so building twice from the same
//! state yields identical output, down to the serialized bytes.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{RefKind, ResourceRef};
use crate::state::CatalogState;
use crate::util::merge_field_tokens;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RefLocation {
    #[serde(rename_all = "camelCase")]
    Step { workflow_id: String, step_id: String },
    #[serde(rename_all = "camelCase")]
    NamingTemplate { template_id: String },
    #[serde(rename_all = "camelCase")]
    FolderTemplate { template_id: String },
    #[serde(rename_all = "camelCase")]
    AppMapping { app_id: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefIndex {
    pub resources: BTreeMap<String, Vec<RefLocation>>,
    pub tokens: BTreeMap<String, Vec<RefLocation>>,
}

impl RefIndex {
    pub fn build(state: &CatalogState) -> Self {
        let mut index = RefIndex::default();

        for workflow in &state.workflows {
            for step in &workflow.steps {
                let location = RefLocation::Step {
                    workflow_id: workflow.id.clone(),
                    step_id: step.id.clone(),
                };
                for reference in &step.resources {
                    push_unique(&mut index.resources, reference.key(), &location);
                }
                for token in merge_field_tokens(&step.body) {
                    push_unique(&mut index.tokens, token, &location);
                }
            }
        }

        for template in &state.naming_templates {
            let location = RefLocation::NamingTemplate {
                template_id: template.id.clone(),
            };
            for token in merge_field_tokens(&template.pattern) {
                push_unique(&mut index.tokens, token, &location);
            }
        }

        for template in &state.folder_templates {
            let location = RefLocation::FolderTemplate {
                template_id: template.id.clone(),
            };
            for folder in &template.folders {
                for token in merge_field_tokens(folder) {
                    push_unique(&mut index.tokens, token, &location);
                }
            }
        }

        for app in &state.apps {
            let location = RefLocation::AppMapping {
                app_id: app.id.clone(),
            };
            for mapping in &app.datapoints {
                push_unique(
                    &mut index.tokens,
                    mapping.master_datapoint_name.clone(),
                    &location,
                );
            }
        }

        index
    }

    pub fn resource_usage(&self, reference: &ResourceRef) -> &[RefLocation] {
        self.resources
            .get(&reference.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn token_usage(&self, token: &str) -> &[RefLocation] {
        self.tokens.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cited `kind:id` keys whose target no longer exists.
    pub fn dangling_resources(&self, state: &CatalogState) -> Vec<String> {
        self.resources
            .keys()
            .filter(|key| !target_exists(state, key))
            .cloned()
            .collect()
    }

    /// Tokens in use that are not master datapoints.
    pub fn unknown_tokens(&self, state: &CatalogState) -> Vec<String> {
        self.tokens
            .keys()
            .filter(|token| !state.datapoints.iter().any(|d| &d.name == *token))
            .cloned()
            .collect()
    }
}

fn push_unique(map: &mut BTreeMap<String, Vec<RefLocation>>, key: String, location: &RefLocation) {
    let locations = map.entry(key).or_default();
    if !locations.contains(location) {
        locations.push(location.clone());
    }
}

fn target_exists(state: &CatalogState, key: &str) -> bool {
    let Some((kind, id)) = key.split_once(':') else {
        return false;
    };
    match kind {
        k if k == RefKind::App.as_str() => state.app(id).is_some(),
        k if k == RefKind::Resource.as_str() => state.resources.iter().any(|r| r.id == id),
        k if k == RefKind::Member.as_str() => state.team.iter().any(|m| m.id == id),
        k if k == RefKind::Template.as_str() => {
            state.naming_templates.iter().any(|t| t.id == id)
                || state.folder_templates.iter().any(|t| t.id == id)
        }
        _ => false,
    }
}
