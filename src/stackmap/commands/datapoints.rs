use super::{remove_where, required};
use crate::model::{Datapoint, DatapointMapping};
use crate::state::CatalogState;

/// Add a master datapoint. Names are unique and trimmed.
pub fn add_datapoint(state: &mut CatalogState, name: &str, description: &str) -> bool {
    let Some(name) = required(name) else {
        return false;
    };
    if state.datapoints.iter().any(|d| d.name == name) {
        return false;
    }
    state.datapoints.push(Datapoint {
        name,
        description: description.trim().to_string(),
    });
    true
}

/// Remove a master datapoint. App mappings that use the name are kept.
pub fn remove_datapoint(state: &mut CatalogState, name: &str) -> bool {
    remove_where(&mut state.datapoints, |d| d.name == name)
}

/// Insert or replace the mapping for `master_name` on one app.
pub fn set_mapping(
    state: &mut CatalogState,
    app_id: &str,
    master_name: &str,
    inbound_tag: &str,
    outbound_tag: &str,
) -> bool {
    let Some(master_name) = required(master_name) else {
        return false;
    };
    let Some(app) = state.app_mut(app_id) else {
        return false;
    };
    let mapping = DatapointMapping {
        master_datapoint_name: master_name,
        inbound_tag: inbound_tag.trim().to_string(),
        outbound_tag: outbound_tag.trim().to_string(),
    };
    match app
        .datapoints
        .iter_mut()
        .find(|m| m.master_datapoint_name == mapping.master_datapoint_name)
    {
        Some(existing) => *existing = mapping,
        None => app.datapoints.push(mapping),
    }
    true
}

pub fn remove_mapping(state: &mut CatalogState, app_id: &str, master_name: &str) -> bool {
    match state.app_mut(app_id) {
        Some(app) => remove_where(&mut app.datapoints, |m| {
            m.master_datapoint_name == master_name
        }),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::small_catalog;

    #[test]
    fn test_add_datapoint_unique() {
        let mut state = small_catalog();
        assert!(add_datapoint(&mut state, " Client Email ", "Primary email"));
        assert!(!add_datapoint(&mut state, "Client Email", ""));
        assert!(!add_datapoint(&mut state, "  ", ""));
        assert_eq!(state.datapoints.len(), 1);
        assert_eq!(state.datapoints[0].name, "Client Email");
        assert!(remove_datapoint(&mut state, "Client Email"));
        assert!(state.datapoints.is_empty());
    }

    #[test]
    fn test_set_mapping_upserts() {
        let mut state = small_catalog();
        assert!(set_mapping(&mut state, "app_a", "Client Email", "email", ""));
        assert!(set_mapping(
            &mut state,
            "app_a",
            "Client Email",
            "email_address",
            "primaryEmail"
        ));
        let app = state.app("app_a").unwrap();
        assert_eq!(app.datapoints.len(), 1);
        assert_eq!(app.datapoints[0].inbound_tag, "email_address");
        assert_eq!(app.datapoints[0].outbound_tag, "primaryEmail");
    }

    #[test]
    fn test_set_mapping_rejects_blank_or_unknown() {
        let mut state = small_catalog();
        assert!(!set_mapping(&mut state, "app_a", " ", "x", "y"));
        assert!(!set_mapping(&mut state, "app_x", "Client Email", "x", "y"));
    }

    #[test]
    fn test_remove_mapping() {
        let mut state = small_catalog();
        set_mapping(&mut state, "app_a", "Client Email", "email", "");
        assert!(remove_mapping(&mut state, "app_a", "Client Email"));
        assert!(!remove_mapping(&mut state, "app_a", "Client Email"));
        assert!(state.app("app_a").unwrap().datapoints.is_empty());
    }
}
