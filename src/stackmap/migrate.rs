//! # Load-time Migration
//!
//! Persisted data has drifted through several shapes. Rather than branching on
//! shape at every read site, everything is read into the permissive `Raw*`
//! types below and normalized once by [`migrate`]:
//!
//! | Legacy shape                                   | Normalized into                |
//! |------------------------------------------------|--------------------------------|
//! | `app.functions: ["CRM", ...]` (names)          | assignments, functions created by name |
//! | top-level `functionAssignments: [{functionId, appId, level}]` | `app.functions` |
//! | `app.integrations: [{otherAppId, type}]`       | canonical [`IntegrationPair`]s |
//! | `app.icon: "📇"` (bare string)                 | [`Icon::Emoji`] / [`Icon::Image`] |
//! | `workflows: [step, step, ...]` (no wrapper)    | one [`Workflow`] holding the steps |
//! | pairs stored high/low, or duplicated           | one canonical pair per app pair |
//!
//! Name lists are only turned into assignments when no assignment exists in
//! any other form (the bootstrap guard). Assignments that reference a missing
//! function get a placeholder function instead of being dropped.
//!
//! Migration is idempotent: feeding its output back in changes nothing and
//! reports no work.

use serde::{Deserialize, Serialize};

use crate::commands::{assignments, functions};
use crate::model::{
    canonical_pair, App, Assignment, DatapointMapping, Datapoint, FlowType, FolderTemplate,
    Function, Icon, IntegrationPair, IntegrationPattern, Level, LibraryIcon, NamingTemplate,
    OrgSettings, Resource, TeamMember, Workflow, WorkflowStep,
};
use crate::state::CatalogState;
use crate::util::{dedupe, new_id, null_as_default};

/// An entry of `app.functions` in any shape it has been stored in.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawFunctionRef {
    Assigned(Assignment),
    Named(String),
    Unknown(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawIcon {
    Tagged(Icon),
    Bare(String),
    Unknown(serde_json::Value),
}

impl Default for RawIcon {
    fn default() -> Self {
        RawIcon::Tagged(Icon::None)
    }
}

impl RawIcon {
    fn normalize(self) -> Icon {
        match self {
            RawIcon::Tagged(icon) => icon,
            RawIcon::Unknown(_) => Icon::None,
            RawIcon::Bare(value) => {
                let value = value.trim().to_string();
                if value.is_empty() {
                    Icon::None
                } else if value.starts_with("data:") || value.starts_with("http") {
                    Icon::Image { src: value }
                } else {
                    Icon::Emoji { value }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLink {
    pub other_app_id: String,
    #[serde(rename = "type")]
    pub link_type: FlowType,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawApp {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    pub icon: RawIcon,
    #[serde(deserialize_with = "null_as_default")]
    pub functions: Vec<RawFunctionRef>,
    #[serde(deserialize_with = "null_as_default")]
    pub datapoints: Vec<DatapointMapping>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub integrations: Vec<LegacyLink>,
}

impl From<App> for RawApp {
    fn from(app: App) -> Self {
        Self {
            id: app.id,
            name: app.name,
            notes: app.notes,
            icon: RawIcon::Tagged(app.icon),
            functions: app
                .functions
                .into_iter()
                .map(RawFunctionRef::Assigned)
                .collect(),
            datapoints: app.datapoints,
            integrations: Vec::new(),
        }
    }
}

/// Row of the old top-level assignment list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAssignment {
    #[serde(default)]
    pub id: String,
    pub function_id: String,
    pub app_id: String,
    #[serde(default, alias = "status")]
    pub level: Level,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawWorkflowEntry {
    Wrapped(Workflow),
    Step(WorkflowStep),
}

/// Every collection in its most permissive shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawState {
    pub apps: Vec<RawApp>,
    pub functions: Vec<Function>,
    pub function_assignments: Vec<LegacyAssignment>,
    pub integration_pairs: Vec<IntegrationPair>,
    pub integration_patterns: Vec<IntegrationPattern>,
    pub resources: Vec<Resource>,
    pub team: Vec<TeamMember>,
    pub settings: OrgSettings,
    pub naming_templates: Vec<NamingTemplate>,
    pub folder_templates: Vec<FolderTemplate>,
    pub icon_library: Vec<LibraryIcon>,
    pub workflows: Vec<RawWorkflowEntry>,
    pub datapoints: Vec<Datapoint>,
}

impl From<CatalogState> for RawState {
    fn from(state: CatalogState) -> Self {
        Self {
            apps: state.apps.into_iter().map(RawApp::from).collect(),
            functions: state.functions,
            function_assignments: Vec::new(),
            integration_pairs: state.integration_pairs,
            integration_patterns: state.integration_patterns,
            resources: state.resources,
            team: state.team,
            settings: state.settings,
            naming_templates: state.naming_templates,
            folder_templates: state.folder_templates,
            icon_library: state.icon_library,
            workflows: state
                .workflows
                .into_iter()
                .map(RawWorkflowEntry::Wrapped)
                .collect(),
            datapoints: state.datapoints,
        }
    }
}

/// What [`migrate`] had to change.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub assigned_ids: usize,
    pub bootstrapped_assignments: usize,
    pub folded_assignments: usize,
    pub ignored_name_refs: usize,
    pub dropped_function_refs: usize,
    pub healed_functions: usize,
    pub canonicalized_pairs: usize,
    pub merged_pairs: usize,
    pub folded_links: usize,
    pub wrapped_steps: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

pub fn migrate(raw: RawState) -> (CatalogState, MigrationReport) {
    let mut report = MigrationReport::default();
    let mut state = CatalogState {
        functions: raw.functions,
        integration_patterns: raw.integration_patterns,
        resources: raw.resources,
        team: raw.team,
        settings: raw.settings,
        naming_templates: raw.naming_templates,
        folder_templates: raw.folder_templates,
        icon_library: raw.icon_library,
        datapoints: raw.datapoints,
        ..Default::default()
    };

    for function in &mut state.functions {
        if function.id.is_empty() {
            function.id = new_id("fn");
            report.assigned_ids += 1;
        }
    }

    let mut name_refs: Vec<(String, String)> = Vec::new();
    let mut links: Vec<(String, LegacyLink)> = Vec::new();
    for raw_app in raw.apps {
        let app = normalize_app(raw_app, &mut name_refs, &mut links, &mut report);
        state.apps.push(app);
    }

    fold_legacy_assignments(&mut state, raw.function_assignments, &mut report);
    bootstrap_from_names(&mut state, name_refs, &mut report);
    heal_dangling_functions(&mut state, &mut report);

    state.integration_pairs = canonicalize_pairs(raw.integration_pairs, &state, &mut report);
    fold_links(&mut state, links, &mut report);

    state.workflows = wrap_workflows(raw.workflows, &mut report);

    if !report.is_noop() {
        tracing::info!(?report, "migrated stored catalog");
    }
    (state, report)
}

fn normalize_app(
    raw: RawApp,
    name_refs: &mut Vec<(String, String)>,
    links: &mut Vec<(String, LegacyLink)>,
    report: &mut MigrationReport,
) -> App {
    let id = if raw.id.is_empty() {
        report.assigned_ids += 1;
        new_id("app")
    } else {
        raw.id
    };

    let mut app = App {
        id,
        name: raw.name,
        notes: raw.notes,
        icon: raw.icon.normalize(),
        functions: Vec::new(),
        datapoints: raw.datapoints,
    };

    for entry in raw.functions {
        match entry {
            RawFunctionRef::Assigned(assignment) => {
                if app.assignment(&assignment.function_id).is_none() {
                    app.functions.push(assignment);
                }
            }
            RawFunctionRef::Named(name) => name_refs.push((app.id.clone(), name)),
            RawFunctionRef::Unknown(value) => {
                tracing::warn!(
                    app_id = %app.id,
                    entry = %value,
                    "dropping unreadable function entry"
                );
                report.dropped_function_refs += 1;
            }
        }
    }

    links.extend(raw.integrations.into_iter().map(|l| (app.id.clone(), l)));
    app
}

fn fold_legacy_assignments(
    state: &mut CatalogState,
    rows: Vec<LegacyAssignment>,
    report: &mut MigrationReport,
) {
    for row in rows {
        let Some(app) = state.app_mut(&row.app_id) else {
            tracing::warn!(app_id = %row.app_id, "dropping assignment for unknown app");
            continue;
        };
        if app.assignment(&row.function_id).is_none() {
            app.functions.push(Assignment {
                function_id: row.function_id,
                status: row.level,
            });
            report.folded_assignments += 1;
        }
    }
}

fn bootstrap_from_names(
    state: &mut CatalogState,
    name_refs: Vec<(String, String)>,
    report: &mut MigrationReport,
) {
    if name_refs.is_empty() {
        return;
    }
    if state.assignment_count() > 0 {
        tracing::warn!(
            count = name_refs.len(),
            "ignoring function name lists, assignments already exist"
        );
        report.ignored_name_refs += name_refs.len();
        return;
    }
    for (app_id, name) in name_refs {
        let Some(function) = functions::get_or_create_by_name(state, &name) else {
            continue;
        };
        if assignments::assign(state, &app_id, &function.id, Level::Available) {
            report.bootstrapped_assignments += 1;
        }
    }
}

fn heal_dangling_functions(state: &mut CatalogState, report: &mut MigrationReport) {
    let referenced: Vec<String> = dedupe(
        state
            .apps
            .iter()
            .flat_map(|app| app.functions.iter().map(|a| a.function_id.clone()))
            .collect(),
    );
    for function_id in referenced {
        if functions::ensure_stub(state, &function_id) {
            tracing::warn!(function_id = %function_id, "created placeholder for missing function");
            report.healed_functions += 1;
        }
    }
}

fn canonicalize_pairs(
    pairs: Vec<IntegrationPair>,
    state: &CatalogState,
    report: &mut MigrationReport,
) -> Vec<IntegrationPair> {
    let mut out: Vec<IntegrationPair> = Vec::new();
    for mut pair in pairs {
        let Some((low, high)) = canonical_pair(&pair.app_low_id, &pair.app_high_id)
            .map(|(l, h)| (l.to_string(), h.to_string()))
        else {
            tracing::warn!(pair_id = %pair.id, "dropping pair without two distinct apps");
            continue;
        };
        if state.app(&low).is_none() || state.app(&high).is_none() {
            tracing::warn!(pair_id = %pair.id, "dropping pair that references a missing app");
            continue;
        }
        if pair.app_low_id != low {
            std::mem::swap(&mut pair.a_to_b, &mut pair.b_to_a);
            pair.app_low_id = low;
            pair.app_high_id = high;
            report.canonicalized_pairs += 1;
        }
        if pair.id.is_empty() {
            pair.id = new_id("pair");
            report.assigned_ids += 1;
        }

        match out
            .iter_mut()
            .find(|p| p.app_low_id == pair.app_low_id && p.app_high_id == pair.app_high_id)
        {
            Some(existing) => {
                merge_pair(existing, pair);
                report.merged_pairs += 1;
            }
            None => out.push(pair),
        }
    }
    out
}

fn merge_pair(into: &mut IntegrationPair, from: IntegrationPair) {
    into.has_direct |= from.has_direct;
    into.has_zapier |= from.has_zapier;
    into.direct_notes = dedupe([into.direct_notes.clone(), from.direct_notes].concat());
    into.zapier_notes = dedupe([into.zapier_notes.clone(), from.zapier_notes].concat());
    into.a_to_b.actions.extend(from.a_to_b.actions);
    into.b_to_a.actions.extend(from.b_to_a.actions);
}

fn fold_links(state: &mut CatalogState, links: Vec<(String, LegacyLink)>, report: &mut MigrationReport) {
    for (app_id, link) in links {
        let Some((low, high)) = canonical_pair(&app_id, &link.other_app_id)
            .map(|(l, h)| (l.to_string(), h.to_string()))
        else {
            continue;
        };
        if state.app(&low).is_none() || state.app(&high).is_none() {
            tracing::warn!(app_id = %app_id, other = %link.other_app_id, "dropping link to missing app");
            continue;
        }
        let index = match state
            .integration_pairs
            .iter()
            .position(|p| p.app_low_id == low && p.app_high_id == high)
        {
            Some(index) => index,
            None => {
                state.integration_pairs.push(IntegrationPair {
                    id: new_id("pair"),
                    app_low_id: low,
                    app_high_id: high,
                    ..Default::default()
                });
                state.integration_pairs.len() - 1
            }
        };
        let pair = &mut state.integration_pairs[index];
        match link.link_type {
            FlowType::Direct => pair.has_direct = true,
            FlowType::Zapier => pair.has_zapier = true,
            FlowType::Both => {
                pair.has_direct = true;
                pair.has_zapier = true;
            }
        }
        report.folded_links += 1;
    }
}

fn wrap_workflows(entries: Vec<RawWorkflowEntry>, report: &mut MigrationReport) -> Vec<Workflow> {
    let mut workflows: Vec<Workflow> = Vec::new();
    let mut loose: Vec<WorkflowStep> = Vec::new();

    for entry in entries {
        match entry {
            RawWorkflowEntry::Wrapped(workflow) => {
                flush_loose(&mut loose, &mut workflows);
                workflows.push(workflow);
            }
            RawWorkflowEntry::Step(step) => {
                report.wrapped_steps += 1;
                loose.push(step);
            }
        }
    }
    flush_loose(&mut loose, &mut workflows);

    for workflow in &mut workflows {
        if workflow.id.is_empty() {
            workflow.id = new_id("wf");
            report.assigned_ids += 1;
        }
        for step in &mut workflow.steps {
            if step.id.is_empty() {
                step.id = new_id("step");
                report.assigned_ids += 1;
            }
        }
    }
    workflows
}

fn flush_loose(loose: &mut Vec<WorkflowStep>, workflows: &mut Vec<Workflow>) {
    if loose.is_empty() {
        return;
    }
    workflows.push(Workflow {
        id: new_id("wf"),
        name: "Workflow".to_string(),
        steps: std::mem::take(loose),
    });
}
