//! The catalog state tree: every authoritative collection in one owned value.
//!
//! Nothing in here is global. [`crate::api::CatalogApi`] owns a
//! `CatalogState` and hands references to commands and queries.

use serde::{Deserialize, Serialize};

use crate::model::{
    App, Datapoint, FolderTemplate, Function, IntegrationPair, IntegrationPattern, LibraryIcon,
    NamingTemplate, OrgSettings, Resource, TeamMember, Workflow,
};

/// Storage keys, one per collection.
pub mod keys {
    pub const APPS: &str = "apps";
    pub const FUNCTIONS: &str = "functions";
    pub const INTEGRATION_PAIRS: &str = "integrationPairs";
    pub const INTEGRATION_PATTERNS: &str = "integrationPatterns";
    pub const RESOURCES: &str = "resources";
    pub const TEAM: &str = "team";
    pub const SETTINGS: &str = "settings";
    pub const NAMING_TEMPLATES: &str = "namingTemplates";
    pub const FOLDER_TEMPLATES: &str = "folderTemplates";
    pub const ICON_LIBRARY: &str = "iconLibrary";
    pub const WORKFLOWS: &str = "workflows";
    pub const DATAPOINTS: &str = "datapoints";

    /// Flat assignment list from before assignments moved into apps.
    pub const LEGACY_ASSIGNMENTS: &str = "functionAssignments";
    /// Written once first-run seeding has happened.
    pub const SEEDED: &str = "seeded";

    pub const ALL: [&str; 12] = [
        APPS,
        FUNCTIONS,
        INTEGRATION_PAIRS,
        INTEGRATION_PATTERNS,
        RESOURCES,
        TEAM,
        SETTINGS,
        NAMING_TEMPLATES,
        FOLDER_TEMPLATES,
        ICON_LIBRARY,
        WORKFLOWS,
        DATAPOINTS,
    ];
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogState {
    pub apps: Vec<App>,
    pub functions: Vec<Function>,
    pub integration_pairs: Vec<IntegrationPair>,
    pub integration_patterns: Vec<IntegrationPattern>,
    pub resources: Vec<Resource>,
    pub team: Vec<TeamMember>,
    pub settings: OrgSettings,
    pub naming_templates: Vec<NamingTemplate>,
    pub folder_templates: Vec<FolderTemplate>,
    pub icon_library: Vec<LibraryIcon>,
    pub workflows: Vec<Workflow>,
    pub datapoints: Vec<Datapoint>,
}

impl CatalogState {
    pub fn app(&self, id: &str) -> Option<&App> {
        self.apps.iter().find(|a| a.id == id)
    }

    pub fn app_mut(&mut self, id: &str) -> Option<&mut App> {
        self.apps.iter_mut().find(|a| a.id == id)
    }

    pub fn function(&self, id: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.id == id)
    }

    pub fn function_mut(&mut self, id: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.id == id)
    }

    /// Exact, case-sensitive name match.
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn pair(&self, id: &str) -> Option<&IntegrationPair> {
        self.integration_pairs.iter().find(|p| p.id == id)
    }

    pub fn pair_mut(&mut self, id: &str) -> Option<&mut IntegrationPair> {
        self.integration_pairs.iter_mut().find(|p| p.id == id)
    }

    pub fn workflow_mut(&mut self, id: &str) -> Option<&mut Workflow> {
        self.workflows.iter_mut().find(|w| w.id == id)
    }

    pub fn assignment_count(&self) -> usize {
        self.apps.iter().map(|a| a.functions.len()).sum()
    }

    /// The JSON value persisted under `key`, or `None` for unknown keys.
    pub fn collection_json(&self, key: &str) -> Option<serde_json::Value> {
        let value = match key {
            keys::APPS => serde_json::to_value(&self.apps),
            keys::FUNCTIONS => serde_json::to_value(&self.functions),
            keys::INTEGRATION_PAIRS => serde_json::to_value(&self.integration_pairs),
            keys::INTEGRATION_PATTERNS => serde_json::to_value(&self.integration_patterns),
            keys::RESOURCES => serde_json::to_value(&self.resources),
            keys::TEAM => serde_json::to_value(&self.team),
            keys::SETTINGS => serde_json::to_value(&self.settings),
            keys::NAMING_TEMPLATES => serde_json::to_value(&self.naming_templates),
            keys::FOLDER_TEMPLATES => serde_json::to_value(&self.folder_templates),
            keys::ICON_LIBRARY => serde_json::to_value(&self.icon_library),
            keys::WORKFLOWS => serde_json::to_value(&self.workflows),
            keys::DATAPOINTS => serde_json::to_value(&self.datapoints),
            _ => return None,
        };
        value.ok()
    }
}
