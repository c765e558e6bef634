//! # API Facade
//!
//! [`CatalogApi`] is the single entry point for every client. It owns the
//! catalog explicitly (no ambient global) and sequences each mutation:
//!
//! ```text
//! command (commands/*) → persist snapshot → rebuild indexes → notify listeners
//! ```
//!
//! ## Generic Over KvBackend
//!
//! - Production: `CatalogApi<FsBackend>`
//! - Testing: `CatalogApi<MemBackend>`
//!
//! ## Immediate vs. coalesced writes
//!
//! Structural mutations write every collection before returning. Free-text
//! edits (`rename_app`, `set_app_notes`, `rename_function`,
//! `set_function_notes`, `set_org_settings`) update memory at once and only
//! schedule the write; call [`CatalogApi::flush_due`] from the event loop and
//! [`CatalogApi::flush`] before shutdown. Any structural write in between
//! carries the edit along, since it writes the current snapshot.
//!
//! ## Rejections
//!
//! Mutations mirror the command layer: invalid input yields `None`/`false`
//! and nothing is persisted or notified. Only [`CatalogApi::import_document`]
//! and [`CatalogApi::assign_apps`] return user-facing errors.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::commands::transfer::ImportReport;
use crate::commands::{
    apps, assignments, datapoints, functions, library, pairs, transfer, workflows,
};
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::migrate::{migrate, RawState};
use crate::model::{
    App, Function, Icon, IntegrationAction, IntegrationPair, Level, OrgSettings, PairColor,
    PairKind, ResourceKind, ResourceRef, Workflow, WorkflowStep,
};
use crate::query::{self, FunctionGroup};
use crate::refs::{RefIndex, RefLocation};
use crate::seed::seed_state;
use crate::state::{keys, CatalogState};
use crate::store::debounce::Debouncer;
use crate::store::{KvBackend, Store};
use crate::util::LetterAvatar;

/// Presentation hooks, fired after each successful mutation.
pub trait ChangeListener {
    fn on_app_changed(&self, _app_id: &str) {}
    fn on_function_changed(&self, _function_id: &str) {}
    fn on_pair_changed(&self, _pair_id: &str) {}
}

pub struct CatalogApi<B: KvBackend> {
    state: CatalogState,
    store: Store<B>,
    refs: RefIndex,
    debouncer: Debouncer,
    listeners: Vec<Box<dyn ChangeListener>>,
    config: CatalogConfig,
}

impl<B: KvBackend> CatalogApi<B> {
    /// Load the catalog from `backend`, migrating legacy shapes and seeding
    /// an empty medium when the config allows it.
    pub fn open(backend: B, config: CatalogConfig) -> Self {
        let store = Store::new(backend);
        let mut api = Self {
            state: CatalogState::default(),
            store,
            refs: RefIndex::default(),
            debouncer: Debouncer::new(config.debounce()),
            listeners: Vec::new(),
            config,
        };

        let has_data = api.store.contains(keys::SEEDED)
            || api.store.contains(keys::LEGACY_ASSIGNMENTS)
            || keys::ALL.iter().any(|key| api.store.contains(key));

        if !has_data && api.config.seed_on_first_run {
            tracing::info!("seeding empty catalog");
            api.state = seed_state();
            api.persist_all();
            api.store.save(keys::SEEDED, &true);
        } else {
            let had_legacy = api.store.contains(keys::LEGACY_ASSIGNMENTS);
            let (state, report) = migrate(load_raw(&api.store));
            api.state = state;
            if had_legacy || !report.is_noop() {
                api.persist_all();
                api.store.remove(keys::LEGACY_ASSIGNMENTS);
            }
        }
        api.rebuild_indexes();
        api
    }

    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    // --- Apps ---

    pub fn create_app(&mut self) -> App {
        let app = apps::create(&mut self.state);
        self.commit();
        self.notify(|l| l.on_app_changed(&app.id));
        app
    }

    /// Coalesced write.
    pub fn rename_app(&mut self, app_id: &str, name: &str) -> bool {
        if !apps::rename(&mut self.state, app_id, name) {
            return false;
        }
        self.commit_deferred(keys::APPS);
        self.notify(|l| l.on_app_changed(app_id));
        true
    }

    /// Coalesced write.
    pub fn set_app_notes(&mut self, app_id: &str, notes: &str) -> bool {
        if !apps::set_notes(&mut self.state, app_id, notes) {
            return false;
        }
        self.commit_deferred(keys::APPS);
        self.notify(|l| l.on_app_changed(app_id));
        true
    }

    pub fn set_app_icon(&mut self, app_id: &str, icon: Icon) -> bool {
        if !apps::set_icon(&mut self.state, app_id, icon) {
            return false;
        }
        self.commit();
        self.notify(|l| l.on_app_changed(app_id));
        true
    }

    /// Delete an app and the pairs it belongs to.
    pub fn delete_app(&mut self, app_id: &str) -> bool {
        let Some(deleted) = apps::delete(&mut self.state, app_id) else {
            return false;
        };
        self.commit();
        self.notify(|l| l.on_app_changed(app_id));
        for pair_id in &deleted.removed_pairs {
            self.notify(|l| l.on_pair_changed(pair_id));
        }
        true
    }

    // --- Functions ---

    pub fn get_or_create_function_by_name(&mut self, name: &str) -> Option<Function> {
        let before = self.state.functions.len();
        let function = functions::get_or_create_by_name(&mut self.state, name)?;
        if self.state.functions.len() != before {
            self.commit();
            self.notify(|l| l.on_function_changed(&function.id));
        }
        Some(function)
    }

    /// Coalesced write.
    pub fn rename_function(&mut self, function_id: &str, name: &str) -> bool {
        if !functions::rename(&mut self.state, function_id, name) {
            return false;
        }
        self.commit_deferred(keys::FUNCTIONS);
        self.notify(|l| l.on_function_changed(function_id));
        true
    }

    /// Coalesced write.
    pub fn set_function_notes(&mut self, function_id: &str, notes: &str) -> bool {
        if !functions::set_notes(&mut self.state, function_id, notes) {
            return false;
        }
        self.commit_deferred(keys::FUNCTIONS);
        self.notify(|l| l.on_function_changed(function_id));
        true
    }

    pub fn set_function_category(&mut self, function_id: &str, category: &str) -> bool {
        if !functions::set_category(&mut self.state, function_id, category) {
            return false;
        }
        self.commit();
        self.notify(|l| l.on_function_changed(function_id));
        true
    }

    /// Delete a function and every assignment to it.
    pub fn delete_function(&mut self, function_id: &str) -> bool {
        let affected: Vec<String> = query::apps_for_function(&self.state, function_id)
            .iter()
            .map(|a| a.app.id.clone())
            .collect();
        if !functions::delete(&mut self.state, function_id) {
            return false;
        }
        self.commit();
        self.notify(|l| l.on_function_changed(function_id));
        for app_id in &affected {
            self.notify(|l| l.on_app_changed(app_id));
        }
        true
    }

    // --- Assignments ---

    /// Assign at the default level, `available`.
    pub fn assign_function(&mut self, app_id: &str, function_id: &str) -> bool {
        self.assign_function_at(app_id, function_id, Level::Available)
    }

    pub fn assign_function_at(&mut self, app_id: &str, function_id: &str, level: Level) -> bool {
        if !assignments::assign(&mut self.state, app_id, function_id, level) {
            return false;
        }
        self.commit_assignment(app_id, function_id);
        true
    }

    pub fn cycle_assignment_level(&mut self, app_id: &str, function_id: &str) -> Option<Level> {
        let level = assignments::cycle_level(&mut self.state, app_id, function_id)?;
        self.commit_assignment(app_id, function_id);
        Some(level)
    }

    pub fn set_assignment_level(&mut self, app_id: &str, function_id: &str, level: Level) -> bool {
        if !assignments::set_level(&mut self.state, app_id, function_id, level) {
            return false;
        }
        self.commit_assignment(app_id, function_id);
        true
    }

    pub fn remove_assignment(&mut self, app_id: &str, function_id: &str) -> bool {
        if !assignments::remove(&mut self.state, app_id, function_id) {
            return false;
        }
        self.commit_assignment(app_id, function_id);
        true
    }

    /// Assign several apps at `available`; errors when none are eligible.
    pub fn assign_apps(&mut self, function_id: &str, app_ids: &[String]) -> Result<Vec<String>> {
        let assigned =
            assignments::assign_many(&mut self.state, function_id, app_ids, Level::Available)?;
        if !assigned.is_empty() {
            self.commit();
            self.notify(|l| l.on_function_changed(function_id));
            for app_id in &assigned {
                self.notify(|l| l.on_app_changed(app_id));
            }
        }
        Ok(assigned)
    }

    // --- Pairs ---

    pub fn get_or_create_pair(&mut self, app_a: &str, app_b: &str) -> Option<IntegrationPair> {
        let before = self.state.integration_pairs.len();
        let pair = pairs::get_or_create(&mut self.state, app_a, app_b)?;
        if self.state.integration_pairs.len() != before {
            self.commit();
            self.notify(|l| l.on_pair_changed(&pair.id));
        }
        Some(pair)
    }

    pub fn set_pair_flag(&mut self, pair_id: &str, kind: PairKind, note: &str) -> bool {
        let changed = pairs::set_flag(&mut self.state, pair_id, kind, note);
        self.commit_pair(changed, pair_id)
    }

    pub fn clear_pair_flag(&mut self, pair_id: &str, kind: PairKind) -> bool {
        let changed = pairs::clear_flag(&mut self.state, pair_id, kind);
        self.commit_pair(changed, pair_id)
    }

    pub fn remove_pair_note(&mut self, pair_id: &str, kind: PairKind, index: usize) -> bool {
        let changed = pairs::remove_note(&mut self.state, pair_id, kind, index);
        self.commit_pair(changed, pair_id)
    }

    pub fn add_pair_action(&mut self, pair_id: &str, from_app: &str, action: IntegrationAction) -> bool {
        let changed = pairs::add_action(&mut self.state, pair_id, from_app, action);
        self.commit_pair(changed, pair_id)
    }

    pub fn remove_pair_action(&mut self, pair_id: &str, from_app: &str, index: usize) -> bool {
        let changed = pairs::remove_action(&mut self.state, pair_id, from_app, index);
        self.commit_pair(changed, pair_id)
    }

    pub fn delete_pair(&mut self, pair_id: &str) -> bool {
        let changed = pairs::delete(&mut self.state, pair_id);
        self.commit_pair(changed, pair_id)
    }

    // --- Datapoints ---

    pub fn add_datapoint(&mut self, name: &str, description: &str) -> bool {
        let changed = datapoints::add_datapoint(&mut self.state, name, description);
        self.commit_if(changed)
    }

    pub fn remove_datapoint(&mut self, name: &str) -> bool {
        let changed = datapoints::remove_datapoint(&mut self.state, name);
        self.commit_if(changed)
    }

    pub fn set_datapoint_mapping(
        &mut self,
        app_id: &str,
        master_name: &str,
        inbound_tag: &str,
        outbound_tag: &str,
    ) -> bool {
        if !datapoints::set_mapping(&mut self.state, app_id, master_name, inbound_tag, outbound_tag)
        {
            return false;
        }
        self.commit();
        self.notify(|l| l.on_app_changed(app_id));
        true
    }

    pub fn remove_datapoint_mapping(&mut self, app_id: &str, master_name: &str) -> bool {
        if !datapoints::remove_mapping(&mut self.state, app_id, master_name) {
            return false;
        }
        self.commit();
        self.notify(|l| l.on_app_changed(app_id));
        true
    }

    // --- Workflows ---

    pub fn create_workflow(&mut self, name: &str) -> Option<Workflow> {
        let workflow = workflows::create(&mut self.state, name)?;
        self.commit();
        Some(workflow)
    }

    pub fn delete_workflow(&mut self, workflow_id: &str) -> bool {
        let changed = workflows::delete(&mut self.state, workflow_id);
        self.commit_if(changed)
    }

    pub fn add_step(&mut self, workflow_id: &str, title: &str, body: &str) -> Option<WorkflowStep> {
        let step = workflows::add_step(&mut self.state, workflow_id, title, body)?;
        self.commit();
        Some(step)
    }

    pub fn set_step_body(&mut self, workflow_id: &str, step_id: &str, body: &str) -> bool {
        let changed = workflows::set_step_body(&mut self.state, workflow_id, step_id, body);
        self.commit_if(changed)
    }

    pub fn remove_step(&mut self, workflow_id: &str, step_id: &str) -> bool {
        let changed = workflows::remove_step(&mut self.state, workflow_id, step_id);
        self.commit_if(changed)
    }

    pub fn cite_resource(&mut self, workflow_id: &str, step_id: &str, reference: ResourceRef) -> bool {
        let changed = workflows::cite(&mut self.state, workflow_id, step_id, reference);
        self.commit_if(changed)
    }

    pub fn uncite_resource(&mut self, workflow_id: &str, step_id: &str, reference: &ResourceRef) -> bool {
        let changed = workflows::uncite(&mut self.state, workflow_id, step_id, reference);
        self.commit_if(changed)
    }

    // --- Reference lists ---

    pub fn add_resource(&mut self, name: &str, kind: ResourceKind, url: &str) -> Option<String> {
        let resource = library::add_resource(&mut self.state, name, kind, url)?;
        self.commit();
        Some(resource.id)
    }

    pub fn remove_resource(&mut self, resource_id: &str) -> bool {
        let changed = library::remove_resource(&mut self.state, resource_id);
        self.commit_if(changed)
    }

    pub fn add_team_member(&mut self, name: &str, role: &str) -> Option<String> {
        let member = library::add_team_member(&mut self.state, name, role)?;
        self.commit();
        Some(member.id)
    }

    pub fn remove_team_member(&mut self, member_id: &str) -> bool {
        let changed = library::remove_team_member(&mut self.state, member_id);
        self.commit_if(changed)
    }

    pub fn add_naming_template(&mut self, name: &str, pattern: &str) -> Option<String> {
        let template = library::add_naming_template(&mut self.state, name, pattern)?;
        self.commit();
        Some(template.id)
    }

    pub fn add_folder_template(&mut self, name: &str, folders: &[String]) -> Option<String> {
        let template = library::add_folder_template(&mut self.state, name, folders)?;
        self.commit();
        Some(template.id)
    }

    pub fn remove_template(&mut self, template_id: &str) -> bool {
        let changed = library::remove_template(&mut self.state, template_id);
        self.commit_if(changed)
    }

    pub fn add_icon(&mut self, name: &str, data: &str) -> Option<String> {
        let icon = library::add_icon(&mut self.state, name, data)?;
        self.commit();
        Some(icon.id)
    }

    pub fn remove_icon(&mut self, icon_id: &str) -> bool {
        let affected: Vec<String> = self
            .state
            .apps
            .iter()
            .filter(|a| matches!(&a.icon, Icon::Library { id } if id == icon_id))
            .map(|a| a.id.clone())
            .collect();
        if !library::remove_icon(&mut self.state, icon_id) {
            return false;
        }
        self.commit();
        for app_id in &affected {
            self.notify(|l| l.on_app_changed(app_id));
        }
        true
    }

    pub fn add_integration_pattern(&mut self, name: &str, description: &str) -> Option<String> {
        let pattern = library::add_pattern(&mut self.state, name, description)?;
        self.commit();
        Some(pattern.id)
    }

    pub fn remove_integration_pattern(&mut self, pattern_id: &str) -> bool {
        let changed = library::remove_pattern(&mut self.state, pattern_id);
        self.commit_if(changed)
    }

    /// Coalesced write.
    pub fn set_org_settings(&mut self, settings: OrgSettings) {
        library::set_settings(&mut self.state, settings);
        self.commit_deferred(keys::SETTINGS);
    }

    // --- Queries ---

    pub fn functions_with_apps(&self) -> Vec<FunctionGroup<'_>> {
        query::functions_with_apps(&self.state)
    }

    pub fn pairs_for_app(&self, app_id: &str) -> Vec<&IntegrationPair> {
        query::pairs_for_app(&self.state, app_id)
    }

    pub fn pair_color(pair: &IntegrationPair) -> PairColor {
        query::pair_color(pair)
    }

    pub fn apps_filtered_by_function(&self, function_name: &str) -> Vec<&App> {
        query::apps_filtered_by_function(&self.state, function_name)
    }

    /// Letter avatar for an app without an icon.
    pub fn avatar_for(&self, app_id: &str) -> Option<LetterAvatar> {
        self.state.app(app_id).and_then(App::avatar)
    }

    pub fn refs(&self) -> &RefIndex {
        &self.refs
    }

    /// Rebuild, then return `kind:id` → citing locations.
    pub fn resource_usage_index(&mut self) -> &BTreeMap<String, Vec<RefLocation>> {
        self.rebuild_indexes();
        &self.refs.resources
    }

    /// Rebuild, then return token name → locations using it.
    pub fn datapoint_token_index(&mut self) -> &BTreeMap<String, Vec<RefLocation>> {
        self.rebuild_indexes();
        &self.refs.tokens
    }

    /// Recompute every derived index from the current state.
    pub fn rebuild_indexes(&mut self) {
        self.refs = RefIndex::build(&self.state);
    }

    // --- Bulk transfer ---

    pub fn export_document(&self) -> Result<String> {
        transfer::export_document(&self.state, self.config.pretty_export)
    }

    /// All-or-nothing merge of an exported document onto the catalog.
    pub fn import_document(&mut self, text: &str) -> Result<ImportReport> {
        let (state, report) = match transfer::import_document(&self.state, text) {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(error = %error, "import rejected, catalog unchanged");
                return Err(error);
            }
        };
        self.state = state;
        self.commit();
        self.notify_everything();
        tracing::info!(fields = report.replaced_fields, "imported document");
        Ok(report)
    }

    /// Discard every stored collection and restore the seed catalog.
    pub fn reset(&mut self) {
        let removed = self.store.clear();
        tracing::info!(removed, "reset catalog");
        self.state = seed_state();
        self.commit();
        self.store.save(keys::SEEDED, &true);
        self.notify_everything();
    }

    // --- Persistence ---

    pub fn has_pending_writes(&self) -> bool {
        !self.debouncer.is_empty()
    }

    /// Write coalesced edits whose delay has elapsed. Returns how many keys.
    pub fn flush_due(&mut self, now: Instant) -> usize {
        let due = self.debouncer.take_due(now);
        for key in &due {
            self.write_key(key);
        }
        due.len()
    }

    /// Write every pending coalesced edit now.
    pub fn flush(&mut self) -> usize {
        let pending = self.debouncer.take_all();
        for key in &pending {
            self.write_key(key);
        }
        pending.len()
    }

    fn write_key(&self, key: &str) {
        if let Some(value) = self.state.collection_json(key) {
            self.store.save(key, &value);
        }
    }

    fn persist_all(&mut self) {
        for key in keys::ALL {
            self.write_key(key);
        }
        self.debouncer.cancel_all();
    }

    fn commit(&mut self) {
        self.persist_all();
        self.rebuild_indexes();
    }

    fn commit_if(&mut self, changed: bool) -> bool {
        if changed {
            self.commit();
        }
        changed
    }

    fn commit_deferred(&mut self, key: &str) {
        self.debouncer.schedule(key, Instant::now());
        self.rebuild_indexes();
    }

    fn commit_assignment(&mut self, app_id: &str, function_id: &str) {
        self.commit();
        self.notify(|l| l.on_app_changed(app_id));
        self.notify(|l| l.on_function_changed(function_id));
    }

    fn commit_pair(&mut self, changed: bool, pair_id: &str) -> bool {
        if changed {
            self.commit();
            self.notify(|l| l.on_pair_changed(pair_id));
        }
        changed
    }

    fn notify(&self, event: impl Fn(&dyn ChangeListener)) {
        for listener in &self.listeners {
            event(listener.as_ref());
        }
    }

    fn notify_everything(&self) {
        for app in &self.state.apps {
            self.notify(|l| l.on_app_changed(&app.id));
        }
        for function in &self.state.functions {
            self.notify(|l| l.on_function_changed(&function.id));
        }
        for pair in &self.state.integration_pairs {
            self.notify(|l| l.on_pair_changed(&pair.id));
        }
    }
}

fn load_raw<B: KvBackend>(store: &Store<B>) -> RawState {
    RawState {
        apps: store.load_records(keys::APPS),
        functions: store.load_records(keys::FUNCTIONS),
        function_assignments: store.load_records(keys::LEGACY_ASSIGNMENTS),
        integration_pairs: store.load_records(keys::INTEGRATION_PAIRS),
        integration_patterns: store.load_records(keys::INTEGRATION_PATTERNS),
        resources: store.load_records(keys::RESOURCES),
        team: store.load_records(keys::TEAM),
        settings: store.load(keys::SETTINGS, OrgSettings::default()),
        naming_templates: store.load_records(keys::NAMING_TEMPLATES),
        folder_templates: store.load_records(keys::FOLDER_TEMPLATES),
        icon_library: store.load_records(keys::ICON_LIBRARY),
        workflows: store.load_records(keys::WORKFLOWS),
        datapoints: store.load_records(keys::DATAPOINTS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn empty_api() -> CatalogApi<MemBackend> {
        let config = CatalogConfig {
            seed_on_first_run: false,
            ..Default::default()
        };
        CatalogApi::open(MemBackend::new(), config)
    }

    #[derive(Default, Clone)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl ChangeListener for Recorder {
        fn on_app_changed(&self, app_id: &str) {
            self.events.borrow_mut().push(format!("app:{}", app_id));
        }
        fn on_function_changed(&self, function_id: &str) {
            self.events.borrow_mut().push(format!("fn:{}", function_id));
        }
        fn on_pair_changed(&self, pair_id: &str) {
            self.events.borrow_mut().push(format!("pair:{}", pair_id));
        }
    }

    #[test]
    fn test_open_seeds_empty_backend() {
        let api = CatalogApi::open(MemBackend::new(), CatalogConfig::default());
        assert!(!api.state().apps.is_empty());
        assert!(api.store().contains(keys::SEEDED));
        assert!(api.store().contains(keys::APPS));
    }

    #[test]
    fn test_open_without_seeding() {
        let api = empty_api();
        assert!(api.state().apps.is_empty());
        assert!(!api.store().contains(keys::APPS));
    }

    #[test]
    fn test_mutation_persists_immediately() {
        let mut api = empty_api();
        let app = api.create_app();
        let raw = api.store().backend().raw(keys::APPS).unwrap();
        assert!(raw.contains(&app.id));
    }

    #[test]
    fn test_rejected_mutation_does_not_persist() {
        let mut api = empty_api();
        assert!(api.get_or_create_pair("x", "x").is_none());
        assert!(!api.store().contains(keys::INTEGRATION_PAIRS));
    }

    #[test]
    fn test_rename_is_coalesced_until_flush() {
        let mut api = empty_api();
        let app = api.create_app();
        api.rename_app(&app.id, "Wealth");
        api.rename_app(&app.id, "Wealthbox");

        // memory is current right away
        assert_eq!(api.state().app(&app.id).unwrap().name, "Wealthbox");
        assert!(api.has_pending_writes());
        let stored = api.store().backend().raw(keys::APPS).unwrap();
        assert!(!stored.contains("Wealthbox"));

        assert_eq!(api.flush_due(Instant::now()), 0);
        assert_eq!(
            api.flush_due(Instant::now() + Duration::from_secs(5)),
            1
        );
        let stored = api.store().backend().raw(keys::APPS).unwrap();
        assert!(stored.contains("Wealthbox"));
        assert!(!api.has_pending_writes());
    }

    #[test]
    fn test_structural_write_carries_pending_edit() {
        let mut api = empty_api();
        let app = api.create_app();
        api.set_app_notes(&app.id, "Primary CRM since 2019");
        api.create_app();
        assert!(!api.has_pending_writes());
        let stored = api.store().backend().raw(keys::APPS).unwrap();
        assert!(stored.contains("Primary CRM since 2019"));
    }

    #[test]
    fn test_listeners_fire_after_mutation() {
        let mut api = empty_api();
        let recorder = Recorder::default();
        api.add_listener(Box::new(recorder.clone()));

        let a = api.create_app();
        let b = api.create_app();
        let function = api.get_or_create_function_by_name("CRM").unwrap();
        api.assign_function(&a.id, &function.id);
        let pair = api.get_or_create_pair(&a.id, &b.id).unwrap();
        api.set_pair_flag(&pair.id, PairKind::Direct, "sync");

        let events = recorder.events.borrow();
        assert!(events.contains(&format!("app:{}", a.id)));
        assert!(events.contains(&format!("fn:{}", function.id)));
        assert_eq!(
            events.iter().filter(|e| **e == format!("pair:{}", pair.id)).count(),
            2
        );
    }

    #[test]
    fn test_listeners_not_fired_on_rejection() {
        let mut api = empty_api();
        let recorder = Recorder::default();
        api.add_listener(Box::new(recorder.clone()));
        api.cycle_assignment_level("nope", "nope");
        api.set_pair_flag("nope", PairKind::Zapier, "x");
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_delete_function_notifies_apps() {
        let mut api = empty_api();
        let recorder = Recorder::default();
        let app = api.create_app();
        let function = api.get_or_create_function_by_name("CRM").unwrap();
        api.assign_function(&app.id, &function.id);
        api.add_listener(Box::new(recorder.clone()));

        assert!(api.delete_function(&function.id));
        assert!(api.state().app(&app.id).unwrap().functions.is_empty());
        assert!(recorder
            .events
            .borrow()
            .contains(&format!("app:{}", app.id)));
    }

    #[test]
    fn test_indexes_follow_mutations() {
        let mut api = empty_api();
        let workflow = api.create_workflow("Onboarding").unwrap();
        let step = api
            .add_step(&workflow.id, "Welcome", "Hello {{Client First Name}}")
            .unwrap();
        assert_eq!(api.refs().token_usage("Client First Name").len(), 1);
        api.set_step_body(&workflow.id, &step.id, "Hello");
        assert!(api.refs().token_usage("Client First Name").is_empty());
    }

    #[test]
    fn test_reopen_reads_persisted_state() {
        let mut api = empty_api();
        let app = api.create_app();
        api.rename_app(&app.id, "Orion");
        api.flush();

        let backend = MemBackend::new()
            .with_value(keys::APPS, &api.store().backend().raw(keys::APPS).unwrap());
        let reopened = CatalogApi::open(backend, CatalogConfig::default());
        assert_eq!(reopened.state().apps.len(), 1);
        assert_eq!(reopened.state().apps[0].name, "Orion");
    }

    #[test]
    fn test_open_folds_legacy_assignment_key() {
        let backend = MemBackend::new()
            .with_value(keys::APPS, r#"[{"id":"a1","name":"Redtail"}]"#)
            .with_value(keys::FUNCTIONS, r#"[{"id":"f1","name":"CRM"}]"#)
            .with_value(
                keys::LEGACY_ASSIGNMENTS,
                r#"[{"id":"x","functionId":"f1","appId":"a1","level":"primary"}]"#,
            );
        let api = CatalogApi::open(backend, CatalogConfig::default());
        assert_eq!(
            api.state().app("a1").unwrap().functions[0].status,
            Level::Primary
        );
        assert!(!api.store().contains(keys::LEGACY_ASSIGNMENTS));
        assert!(api.store().backend().raw(keys::APPS).unwrap().contains("primary"));
    }

    #[test]
    fn test_corrupt_collection_falls_back_to_default() {
        let backend = MemBackend::new()
            .with_value(keys::APPS, "{oops")
            .with_value(keys::FUNCTIONS, r#"[{"id":"f1","name":"CRM"}]"#);
        let api = CatalogApi::open(backend, CatalogConfig::default());
        assert!(api.state().apps.is_empty());
        assert_eq!(api.state().functions.len(), 1);
    }

    #[test]
    fn test_null_field_does_not_drop_sibling_apps() {
        let backend = MemBackend::new().with_value(
            keys::APPS,
            r#"[{"id":"a1","name":"Wealthbox","notes":null},{"id":"a2","name":"Orion"}]"#,
        );
        let mut api = CatalogApi::open(backend, CatalogConfig::default());
        assert_eq!(api.state().apps.len(), 2);
        assert_eq!(api.state().app("a1").unwrap().notes, "");

        api.get_or_create_function_by_name("CRM").unwrap();
        assert_eq!(api.state().apps.len(), 2);
        let stored = api.store().backend().raw(keys::APPS).unwrap();
        assert!(stored.contains("Wealthbox"));
        assert!(stored.contains("Orion"));
    }

    #[test]
    fn test_capitalized_level_is_read_not_dropped() {
        let backend = MemBackend::new().with_value(
            keys::APPS,
            r#"[{"id":"a1","name":"Wealthbox","functions":[{"id":"f1","status":"Primary"}]},
                {"id":"a2","name":"Orion","functions":[{"id":"f1","status":"someday"}]}]"#,
        );
        let mut api = CatalogApi::open(backend, CatalogConfig::default());
        assert_eq!(api.state().apps.len(), 2);
        assert_eq!(
            api.state().app("a1").unwrap().assignment("f1").unwrap().status,
            Level::Primary
        );
        assert_eq!(
            api.state().app("a2").unwrap().assignment("f1").unwrap().status,
            Level::Available
        );

        api.get_or_create_function_by_name("CRM").unwrap();
        let stored = api.store().backend().raw(keys::APPS).unwrap();
        assert!(stored.contains(r#""status":"primary""#));
        assert!(stored.contains("Orion"));
    }

    #[test]
    fn test_unreadable_app_is_dropped_alone() {
        let backend = MemBackend::new().with_value(
            keys::APPS,
            r#"[{"id":"a1","name":"Wealthbox"},"not an app",{"id":"a2","name":"Orion"}]"#,
        );
        let api = CatalogApi::open(backend, CatalogConfig::default());
        let ids: Vec<&str> = api.state().apps.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut api = empty_api();
        api.store().backend().set_simulate_write_error(true);
        let app = api.create_app();
        assert!(api.state().app(&app.id).is_some());
        assert!(!api.store().contains(keys::APPS));
    }

    #[test]
    fn test_avatar_only_without_icon() {
        let mut api = CatalogApi::open(MemBackend::new(), CatalogConfig::default());
        assert_eq!(api.avatar_for("app_seed_1").unwrap().letter, 'W');
        api.set_app_icon(
            "app_seed_1",
            Icon::Emoji {
                value: "📇".to_string(),
            },
        );
        assert!(api.avatar_for("app_seed_1").is_none());
        assert!(api.avatar_for("missing").is_none());
    }

    #[test]
    fn test_reset_restores_seed() {
        let mut api = empty_api();
        api.create_app();
        api.add_datapoint("Custom", "");
        api.reset();
        assert_eq!(api.state(), &seed_state());
        assert!(api.store().contains(keys::SEEDED));
    }
}
