//! Bulk export and import of the whole catalog as one JSON document.
//!
//! Import is a shallow, field-by-field merge: every top-level collection
//! present in the document replaces the current one, absent ones are kept.
//! The merged tree goes through migration, so older exports load too.
//! Nothing is applied unless the whole document parses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StackError};
use crate::migrate::{
    migrate, LegacyAssignment, MigrationReport, RawApp, RawState, RawWorkflowEntry,
};
use crate::model::{
    Datapoint, FolderTemplate, Function, IntegrationPair, IntegrationPattern, LibraryIcon,
    NamingTemplate, OrgSettings, Resource, TeamMember,
};
use crate::state::CatalogState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    exported_at: DateTime<Utc>,
    #[serde(flatten)]
    state: &'a CatalogState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    apps: Option<Vec<RawApp>>,
    functions: Option<Vec<Function>>,
    function_assignments: Option<Vec<LegacyAssignment>>,
    integration_pairs: Option<Vec<IntegrationPair>>,
    integration_patterns: Option<Vec<IntegrationPattern>>,
    resources: Option<Vec<Resource>>,
    team: Option<Vec<TeamMember>>,
    settings: Option<OrgSettings>,
    naming_templates: Option<Vec<NamingTemplate>>,
    folder_templates: Option<Vec<FolderTemplate>>,
    icon_library: Option<Vec<LibraryIcon>>,
    workflows: Option<Vec<RawWorkflowEntry>>,
    datapoints: Option<Vec<Datapoint>>,
}

impl ImportDocument {
    fn field_count(&self) -> usize {
        [
            self.apps.is_some(),
            self.functions.is_some(),
            self.function_assignments.is_some(),
            self.integration_pairs.is_some(),
            self.integration_patterns.is_some(),
            self.resources.is_some(),
            self.team.is_some(),
            self.settings.is_some(),
            self.naming_templates.is_some(),
            self.folder_templates.is_some(),
            self.icon_library.is_some(),
            self.workflows.is_some(),
            self.datapoints.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Top-level collections the document replaced.
    pub replaced_fields: usize,
    pub migration: MigrationReport,
}

/// Pretty-printed (or compact) document holding the entire state tree.
pub fn export_document(state: &CatalogState, pretty: bool) -> Result<String> {
    let document = ExportDocument {
        exported_at: Utc::now(),
        state,
    };
    let text = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(text)
}

/// Merge `text` onto `current`, returning the new state.
///
/// `current` is only read; the caller swaps the result in on success.
pub fn import_document(current: &CatalogState, text: &str) -> Result<(CatalogState, ImportReport)> {
    let document: ImportDocument =
        serde_json::from_str(text).map_err(|e| StackError::Import(e.to_string()))?;

    let replaced_fields = document.field_count();
    let mut merged = RawState::from(current.clone());
    if let Some(apps) = document.apps {
        merged.apps = apps;
    }
    if let Some(functions) = document.functions {
        merged.functions = functions;
    }
    if let Some(rows) = document.function_assignments {
        merged.function_assignments = rows;
    }
    if let Some(pairs) = document.integration_pairs {
        merged.integration_pairs = pairs;
    }
    if let Some(patterns) = document.integration_patterns {
        merged.integration_patterns = patterns;
    }
    if let Some(resources) = document.resources {
        merged.resources = resources;
    }
    if let Some(team) = document.team {
        merged.team = team;
    }
    if let Some(settings) = document.settings {
        merged.settings = settings;
    }
    if let Some(templates) = document.naming_templates {
        merged.naming_templates = templates;
    }
    if let Some(templates) = document.folder_templates {
        merged.folder_templates = templates;
    }
    if let Some(icons) = document.icon_library {
        merged.icon_library = icons;
    }
    if let Some(workflows) = document.workflows {
        merged.workflows = workflows;
    }
    if let Some(datapoints) = document.datapoints {
        merged.datapoints = datapoints;
    }

    let (state, migration) = migrate(merged);
    Ok((
        state,
        ImportReport {
            replaced_fields,
            migration,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::small_catalog;
    use crate::model::Level;

    #[test]
    fn test_export_contains_every_collection() {
        let state = small_catalog();
        let text = export_document(&state, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("exportedAt").is_some());
        assert_eq!(value["apps"].as_array().unwrap().len(), 2);
        assert!(value.get("integrationPairs").is_some());
        assert!(value.get("iconLibrary").is_some());
    }

    #[test]
    fn test_export_then_import_restores_state() {
        let state = small_catalog();
        let text = export_document(&state, false).unwrap();
        let (imported, report) = import_document(&CatalogState::default(), &text).unwrap();
        assert_eq!(imported, state);
        assert!(report.migration.is_noop());
    }

    #[test]
    fn test_import_malformed_is_rejected() {
        let state = small_catalog();
        let err = import_document(&state, "{not valid json").unwrap_err();
        assert!(matches!(err, StackError::Import(_)));
        let err = import_document(&state, "[1, 2]").unwrap_err();
        assert!(matches!(err, StackError::Import(_)));
    }

    #[test]
    fn test_import_merges_field_by_field() {
        let state = small_catalog();
        let (merged, report) = import_document(
            &state,
            r#"{"functions":[{"id":"fn_plan","name":"Financial Planning"}],
                "settings":{"firmName":"Acme"}}"#,
        )
        .unwrap();
        assert_eq!(report.replaced_fields, 2);
        assert_eq!(merged.apps, state.apps);
        assert_eq!(merged.functions.len(), 1);
        assert_eq!(merged.settings.firm_name, "Acme");
    }

    #[test]
    fn test_import_runs_migration() {
        let (merged, report) = import_document(
            &CatalogState::default(),
            r#"{"apps":[{"id":"a1","name":"Wealthbox","functions":["CRM"]}]}"#,
        )
        .unwrap();
        assert_eq!(report.migration.bootstrapped_assignments, 1);
        assert_eq!(merged.app("a1").unwrap().functions[0].status, Level::Available);
    }
}
