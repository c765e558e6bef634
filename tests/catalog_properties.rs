use stackmap::api::CatalogApi;
use stackmap::config::CatalogConfig;
use stackmap::model::{
    App, Assignment, Level, PairKind, RefKind, ResourceRef, UNNAMED_FUNCTION,
};
use stackmap::query;
use stackmap::state::{keys, CatalogState};
use stackmap::store::fs_backend::FsBackend;
use stackmap::store::mem_backend::MemBackend;

fn empty_catalog() -> CatalogApi<MemBackend> {
    let config = CatalogConfig {
        seed_on_first_run: false,
        ..Default::default()
    };
    CatalogApi::open(MemBackend::new(), config)
}

fn named_app(api: &mut CatalogApi<MemBackend>, name: &str) -> String {
    let app = api.create_app();
    api.rename_app(&app.id, name);
    app.id
}

#[test]
fn test_pair_is_shared_by_both_orders() {
    let mut api = empty_catalog();
    let x = named_app(&mut api, "Orion");
    let y = named_app(&mut api, "eMoney");

    let first = api.get_or_create_pair(&x, &y).unwrap();
    let second = api.get_or_create_pair(&y, &x).unwrap();
    let third = api.get_or_create_pair(&x, &y).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.id, third.id);
    assert_eq!(api.state().integration_pairs.len(), 1);
}

#[test]
fn test_self_pair_is_rejected() {
    let mut api = empty_catalog();
    let x = named_app(&mut api, "Orion");
    assert!(api.get_or_create_pair(&x, &x).is_none());
    assert!(api.state().integration_pairs.is_empty());
}

#[test]
fn test_assigning_twice_keeps_one_record() {
    let mut api = empty_catalog();
    let app = named_app(&mut api, "Wealthbox");
    let function = api.get_or_create_function_by_name("CRM").unwrap();

    assert!(api.assign_function(&app, &function.id));
    assert!(!api.assign_function(&app, &function.id));
    assert_eq!(api.state().app(&app).unwrap().functions.len(), 1);
    assert_eq!(
        api.state().app(&app).unwrap().functions[0].status,
        Level::Available
    );
}

#[test]
fn test_three_cycles_return_to_start() {
    let mut api = empty_catalog();
    let app = named_app(&mut api, "Wealthbox");
    let function = api.get_or_create_function_by_name("CRM").unwrap();

    for start in [Level::Available, Level::Primary, Level::Evaluating] {
        api.remove_assignment(&app, &function.id);
        api.assign_function_at(&app, &function.id, start);
        let mut last = start;
        for _ in 0..3 {
            last = api.cycle_assignment_level(&app, &function.id).unwrap();
        }
        assert_eq!(last, start);
    }
}

#[test]
fn test_function_by_name_is_idempotent() {
    let mut api = empty_catalog();
    let before = api.state().functions.len();
    let first = api.get_or_create_function_by_name("CRM").unwrap();
    let second = api.get_or_create_function_by_name("CRM").unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(api.state().functions.len(), before + 1);
}

#[test]
fn test_rebuilding_twice_is_byte_identical() {
    let mut api = CatalogApi::open(MemBackend::new(), CatalogConfig::default());
    let workflow = api.create_workflow("Onboarding").unwrap();
    let step = api
        .add_step(&workflow.id, "Welcome", "Hi {{Client First Name}}")
        .unwrap();
    api.cite_resource(
        &workflow.id,
        &step.id,
        ResourceRef {
            kind: RefKind::App,
            id: "app_seed_1".to_string(),
        },
    );

    api.rebuild_indexes();
    let first = serde_json::to_string(api.refs()).unwrap();
    api.rebuild_indexes();
    let second = serde_json::to_string(api.refs()).unwrap();
    assert_eq!(first, second);
    assert_eq!(api.resource_usage_index().len(), 1);
    assert_eq!(api.datapoint_token_index()["Client First Name"].len(), 1);
}

#[test]
fn test_bootstrap_from_function_names() {
    let backend = MemBackend::new().with_value(
        keys::APPS,
        r#"[{"id":"app_wb","name":"Wealthbox","functions":["CRM","Task Management"]}]"#,
    );
    let api = CatalogApi::open(backend, CatalogConfig::default());

    let app = api.state().app("app_wb").unwrap();
    assert_eq!(app.functions.len(), 2);
    assert!(app.functions.iter().all(|a| a.status == Level::Available));

    let names: Vec<&str> = api
        .state()
        .functions
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["CRM", "Task Management"]);
    for assignment in &app.functions {
        assert!(api.state().function(&assignment.function_id).is_some());
    }
}

#[test]
fn test_direct_flag_with_note() {
    let mut api = empty_catalog();
    let a = named_app(&mut api, "Wealthbox");
    let b = named_app(&mut api, "Calendly");
    let pair = api.get_or_create_pair(&a, &b).unwrap();

    assert!(api.set_pair_flag(&pair.id, PairKind::Direct, "Syncs contacts"));
    let pair = api.state().pair(&pair.id).unwrap();
    assert!(pair.has_direct);
    assert!(!pair.has_zapier);
    assert_eq!(pair.direct_notes, vec!["Syncs contacts".to_string()]);
}

#[test]
fn test_malformed_import_changes_nothing() {
    let mut api = CatalogApi::open(MemBackend::new(), CatalogConfig::default());
    let before = api.state().clone();
    let stored_before = api.store().backend().raw(keys::APPS);

    let result = api.import_document("{not valid json");
    assert!(result.is_err());
    assert_eq!(api.state(), &before);
    assert_eq!(api.store().backend().raw(keys::APPS), stored_before);
}

#[test]
fn test_dangling_assignment_is_listed_under_placeholder() {
    let mut state = CatalogState::default();
    let mut app = App::new("app_1".to_string());
    app.name = "Orion".to_string();
    app.functions.push(Assignment {
        function_id: "fn_missing".to_string(),
        status: Level::Primary,
    });
    state.apps.push(app);

    let groups = query::functions_with_apps(&state);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].function.name, UNNAMED_FUNCTION);
    assert_eq!(groups[0].assignments[0].app.id, "app_1");
}

#[test]
fn test_dangling_assignment_is_healed_on_load() {
    let backend = MemBackend::new().with_value(
        keys::APPS,
        r#"[{"id":"app_1","name":"Orion","functions":[{"id":"fn_missing","status":"primary"}]}]"#,
    );
    let api = CatalogApi::open(backend, CatalogConfig::default());
    let function = api.state().function("fn_missing").unwrap();
    assert_eq!(function.name, UNNAMED_FUNCTION);
}

#[test]
fn test_deleting_app_cascades_to_pairs() {
    let mut api = empty_catalog();
    let a = named_app(&mut api, "Wealthbox");
    let b = named_app(&mut api, "Calendly");
    let c = named_app(&mut api, "Orion");
    api.get_or_create_pair(&a, &b).unwrap();
    api.get_or_create_pair(&b, &c).unwrap();

    assert!(api.delete_app(&a));
    assert_eq!(api.state().integration_pairs.len(), 1);
    assert!(api.pairs_for_app(&a).is_empty());
}

#[test]
fn test_file_backend_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path().join("data");
    let config = CatalogConfig {
        seed_on_first_run: false,
        ..Default::default()
    };

    let (app_id, function_id) = {
        let mut api = CatalogApi::open(FsBackend::new(&data_dir), config.clone());
        let app = api.create_app();
        api.rename_app(&app.id, "Redtail");
        let function = api.get_or_create_function_by_name("CRM").unwrap();
        api.assign_function_at(&app.id, &function.id, Level::Primary);
        api.flush();
        (app.id, function.id)
    };

    let api = CatalogApi::open(FsBackend::new(&data_dir), config);
    let app = api.state().app(&app_id).unwrap();
    assert_eq!(app.name, "Redtail");
    assert_eq!(app.assignment(&function_id).unwrap().status, Level::Primary);
    assert!(data_dir.join("apps.json").exists());
}

#[test]
fn test_export_then_import_into_fresh_catalog() {
    let source = CatalogApi::open(MemBackend::new(), CatalogConfig::default());
    let document = source.export_document().unwrap();

    let mut target = empty_catalog();
    target.import_document(&document).unwrap();
    assert_eq!(target.state(), source.state());
}
