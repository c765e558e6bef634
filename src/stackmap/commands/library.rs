//! Supporting reference lists: resources, team, templates, icons, patterns.

use super::{remove_where, required};
use crate::model::{
    FolderTemplate, Icon, IntegrationPattern, LibraryIcon, NamingTemplate, OrgSettings, Resource,
    ResourceKind, TeamMember,
};
use crate::state::CatalogState;
use crate::util::{dedupe, new_id};

pub fn add_resource(
    state: &mut CatalogState,
    name: &str,
    kind: ResourceKind,
    url: &str,
) -> Option<Resource> {
    let resource = Resource {
        id: new_id("res"),
        name: required(name)?,
        kind,
        url: url.trim().to_string(),
    };
    state.resources.push(resource.clone());
    Some(resource)
}

pub fn remove_resource(state: &mut CatalogState, resource_id: &str) -> bool {
    remove_where(&mut state.resources, |r| r.id == resource_id)
}

pub fn add_team_member(state: &mut CatalogState, name: &str, role: &str) -> Option<TeamMember> {
    let member = TeamMember {
        id: new_id("member"),
        name: required(name)?,
        role: role.trim().to_string(),
    };
    state.team.push(member.clone());
    Some(member)
}

pub fn remove_team_member(state: &mut CatalogState, member_id: &str) -> bool {
    remove_where(&mut state.team, |m| m.id == member_id)
}

/// `pattern` may contain `{{Token}}` merge fields.
pub fn add_naming_template(
    state: &mut CatalogState,
    name: &str,
    pattern: &str,
) -> Option<NamingTemplate> {
    let template = NamingTemplate {
        id: new_id("tpl"),
        name: required(name)?,
        pattern: required(pattern)?,
    };
    state.naming_templates.push(template.clone());
    Some(template)
}

/// Blank folder names are dropped and duplicates collapsed.
pub fn add_folder_template(
    state: &mut CatalogState,
    name: &str,
    folders: &[String],
) -> Option<FolderTemplate> {
    let folders = dedupe(folders.iter().filter_map(|f| required(f)).collect());
    let template = FolderTemplate {
        id: new_id("tpl"),
        name: required(name)?,
        folders,
    };
    state.folder_templates.push(template.clone());
    Some(template)
}

/// Removes a naming or folder template.
pub fn remove_template(state: &mut CatalogState, template_id: &str) -> bool {
    let naming = remove_where(&mut state.naming_templates, |t| t.id == template_id);
    let folder = remove_where(&mut state.folder_templates, |t| t.id == template_id);
    naming || folder
}

pub fn add_icon(state: &mut CatalogState, name: &str, data: &str) -> Option<LibraryIcon> {
    let icon = LibraryIcon {
        id: new_id("icon"),
        name: required(name)?,
        data: required(data)?,
    };
    state.icon_library.push(icon.clone());
    Some(icon)
}

/// Remove a library icon; apps that used it fall back to their letter avatar.
pub fn remove_icon(state: &mut CatalogState, icon_id: &str) -> bool {
    if !remove_where(&mut state.icon_library, |i| i.id == icon_id) {
        return false;
    }
    for app in &mut state.apps {
        if matches!(&app.icon, Icon::Library { id } if id == icon_id) {
            app.icon = Icon::None;
        }
    }
    true
}

pub fn add_pattern(
    state: &mut CatalogState,
    name: &str,
    description: &str,
) -> Option<IntegrationPattern> {
    let pattern = IntegrationPattern {
        id: new_id("pattern"),
        name: required(name)?,
        description: description.trim().to_string(),
    };
    state.integration_patterns.push(pattern.clone());
    Some(pattern)
}

pub fn remove_pattern(state: &mut CatalogState, pattern_id: &str) -> bool {
    remove_where(&mut state.integration_patterns, |p| p.id == pattern_id)
}

pub fn set_settings(state: &mut CatalogState, settings: OrgSettings) {
    state.settings = OrgSettings {
        firm_name: settings.firm_name.trim().to_string(),
        custodian: settings.custodian.trim().to_string(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::small_catalog;

    #[test]
    fn test_add_and_remove_resource() {
        let mut state = CatalogState::default();
        assert!(add_resource(&mut state, " ", ResourceKind::Link, "").is_none());
        let res = add_resource(&mut state, "ADV Part 2", ResourceKind::Document, " https://x ").unwrap();
        assert_eq!(res.url, "https://x");
        assert!(remove_resource(&mut state, &res.id));
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_folder_template_cleans_folders() {
        let mut state = CatalogState::default();
        let folders = vec![
            "Statements".to_string(),
            " ".to_string(),
            "Statements".to_string(),
            " Tax ".to_string(),
        ];
        let tpl = add_folder_template(&mut state, "Client folders", &folders).unwrap();
        assert_eq!(tpl.folders, vec!["Statements".to_string(), "Tax".to_string()]);
        assert!(remove_template(&mut state, &tpl.id));
        assert!(!remove_template(&mut state, &tpl.id));
    }

    #[test]
    fn test_naming_template_requires_pattern() {
        let mut state = CatalogState::default();
        assert!(add_naming_template(&mut state, "Household", "").is_none());
        let tpl = add_naming_template(&mut state, "Household", "{{Last Name}} Household").unwrap();
        assert_eq!(state.naming_templates[0].id, tpl.id);
    }

    #[test]
    fn test_remove_icon_resets_apps() {
        let mut state = small_catalog();
        let icon = add_icon(&mut state, "Logo", "data:image/png;base64,AAAA").unwrap();
        state.app_mut("app_a").unwrap().icon = Icon::Library {
            id: icon.id.clone(),
        };
        assert!(remove_icon(&mut state, &icon.id));
        assert_eq!(state.app("app_a").unwrap().icon, Icon::None);
        assert!(!remove_icon(&mut state, &icon.id));
    }

    #[test]
    fn test_team_and_patterns() {
        let mut state = CatalogState::default();
        let member = add_team_member(&mut state, "Dana", " Ops ").unwrap();
        assert_eq!(member.role, "Ops");
        let pattern = add_pattern(&mut state, "Webhook", "Push on change").unwrap();
        assert!(remove_team_member(&mut state, &member.id));
        assert!(remove_pattern(&mut state, &pattern.id));
    }

    #[test]
    fn test_set_settings_trims() {
        let mut state = CatalogState::default();
        set_settings(
            &mut state,
            OrgSettings {
                firm_name: " Acme Wealth ".to_string(),
                custodian: "Schwab".to_string(),
            },
        );
        assert_eq!(state.settings.firm_name, "Acme Wealth");
    }
}
