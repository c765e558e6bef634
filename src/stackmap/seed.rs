//! First-run defaults.
//!
//! Seeds go through the same migration as stored data, written in the
//! function-name shape, so the bootstrap path builds their assignments.

use crate::migrate::{migrate, RawApp, RawFunctionRef, RawState};
use crate::model::{Datapoint, Function, IntegrationPattern};
use crate::state::CatalogState;

const SEED_FUNCTIONS: [(&str, &str); 8] = [
    ("CRM", "Client Service"),
    ("Task Management", "Operations"),
    ("Scheduler", "Client Service"),
    ("Financial Planning", "Planning"),
    ("Portfolio Management", "Investments"),
    ("Document Storage", "Operations"),
    ("E-Signature", "Operations"),
    ("Email Marketing", "Marketing"),
];

const SEED_APPS: [(&str, &[&str]); 6] = [
    ("Wealthbox", &["CRM", "Task Management"]),
    ("Calendly", &["Scheduler"]),
    ("eMoney", &["Financial Planning"]),
    ("Orion", &["Portfolio Management"]),
    ("ShareFile", &["Document Storage"]),
    ("DocuSign", &["E-Signature"]),
];

const SEED_DATAPOINTS: [&str; 4] = [
    "Client First Name",
    "Client Last Name",
    "Client Email",
    "Household Name",
];

pub fn seed_state() -> CatalogState {
    let raw = RawState {
        functions: SEED_FUNCTIONS
            .iter()
            .enumerate()
            .map(|(i, (name, category))| Function {
                id: format!("fn_seed_{}", i + 1),
                name: name.to_string(),
                category: category.to_string(),
                notes: String::new(),
            })
            .collect(),
        apps: SEED_APPS
            .iter()
            .enumerate()
            .map(|(i, (name, functions))| RawApp {
                id: format!("app_seed_{}", i + 1),
                name: name.to_string(),
                functions: functions
                    .iter()
                    .map(|f| RawFunctionRef::Named(f.to_string()))
                    .collect(),
                ..Default::default()
            })
            .collect(),
        integration_patterns: vec![
            IntegrationPattern {
                id: "pattern_native".to_string(),
                name: "Native integration".to_string(),
                description: "Built-in sync maintained by one of the vendors".to_string(),
            },
            IntegrationPattern {
                id: "pattern_zapier".to_string(),
                name: "Zapier".to_string(),
                description: "Trigger/action automation through Zapier".to_string(),
            },
        ],
        datapoints: SEED_DATAPOINTS
            .iter()
            .map(|name| Datapoint {
                name: name.to_string(),
                description: String::new(),
            })
            .collect(),
        ..Default::default()
    };
    let (state, _) = migrate(raw);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;

    #[test]
    fn test_seed_assigns_every_named_function() {
        let state = seed_state();
        assert_eq!(state.apps.len(), SEED_APPS.len());
        assert_eq!(state.functions.len(), SEED_FUNCTIONS.len());
        let wealthbox = state.apps.iter().find(|a| a.name == "Wealthbox").unwrap();
        assert_eq!(wealthbox.functions.len(), 2);
        assert!(wealthbox
            .functions
            .iter()
            .all(|a| a.status == Level::Available));
    }

    #[test]
    fn test_seed_is_stable() {
        assert_eq!(seed_state(), seed_state());
    }
}
