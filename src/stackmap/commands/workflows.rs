use super::{remove_where, required};
use crate::model::{ResourceRef, Workflow, WorkflowStep};
use crate::state::CatalogState;
use crate::util::new_id;

pub fn create(state: &mut CatalogState, name: &str) -> Option<Workflow> {
    let workflow = Workflow {
        id: new_id("wf"),
        name: required(name)?,
        steps: Vec::new(),
    };
    state.workflows.push(workflow.clone());
    Some(workflow)
}

pub fn delete(state: &mut CatalogState, workflow_id: &str) -> bool {
    remove_where(&mut state.workflows, |w| w.id == workflow_id)
}

/// Append a step. The body may contain `{{Token}}` merge fields.
pub fn add_step(
    state: &mut CatalogState,
    workflow_id: &str,
    title: &str,
    body: &str,
) -> Option<WorkflowStep> {
    let title = required(title)?;
    let workflow = state.workflow_mut(workflow_id)?;
    let step = WorkflowStep {
        id: new_id("step"),
        title,
        body: body.to_string(),
        resources: Vec::new(),
    };
    workflow.steps.push(step.clone());
    Some(step)
}

pub fn set_step_body(state: &mut CatalogState, workflow_id: &str, step_id: &str, body: &str) -> bool {
    match step_mut(state, workflow_id, step_id) {
        Some(step) => {
            step.body = body.to_string();
            true
        }
        None => false,
    }
}

pub fn remove_step(state: &mut CatalogState, workflow_id: &str, step_id: &str) -> bool {
    match state.workflow_mut(workflow_id) {
        Some(workflow) => remove_where(&mut workflow.steps, |s| s.id == step_id),
        None => false,
    }
}

/// Cite a resource from a step. Citing the same resource twice is a no-op.
pub fn cite(state: &mut CatalogState, workflow_id: &str, step_id: &str, reference: ResourceRef) -> bool {
    if reference.id.trim().is_empty() {
        return false;
    }
    let Some(step) = step_mut(state, workflow_id, step_id) else {
        return false;
    };
    if step.resources.contains(&reference) {
        return false;
    }
    step.resources.push(reference);
    true
}

pub fn uncite(state: &mut CatalogState, workflow_id: &str, step_id: &str, reference: &ResourceRef) -> bool {
    match step_mut(state, workflow_id, step_id) {
        Some(step) => remove_where(&mut step.resources, |r| r == reference),
        None => false,
    }
}

fn step_mut<'a>(
    state: &'a mut CatalogState,
    workflow_id: &str,
    step_id: &str,
) -> Option<&'a mut WorkflowStep> {
    state
        .workflow_mut(workflow_id)?
        .steps
        .iter_mut()
        .find(|s| s.id == step_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RefKind;

    #[test]
    fn test_create_requires_name() {
        let mut state = CatalogState::default();
        assert!(create(&mut state, " ").is_none());
        let wf = create(&mut state, "Client onboarding").unwrap();
        assert_eq!(state.workflows[0].id, wf.id);
    }

    #[test]
    fn test_add_and_remove_step() {
        let mut state = CatalogState::default();
        let wf = create(&mut state, "Onboarding").unwrap();
        let step = add_step(&mut state, &wf.id, "Welcome email", "Hi {{Client First Name}}").unwrap();
        assert!(add_step(&mut state, "wf_missing", "x", "").is_none());
        assert!(add_step(&mut state, &wf.id, "  ", "").is_none());
        assert_eq!(state.workflows[0].steps.len(), 1);

        assert!(set_step_body(&mut state, &wf.id, &step.id, "Hello"));
        assert_eq!(state.workflows[0].steps[0].body, "Hello");

        assert!(remove_step(&mut state, &wf.id, &step.id));
        assert!(state.workflows[0].steps.is_empty());
    }

    #[test]
    fn test_cite_dedupes() {
        let mut state = CatalogState::default();
        let wf = create(&mut state, "Onboarding").unwrap();
        let step = add_step(&mut state, &wf.id, "Open account", "").unwrap();
        let reference = ResourceRef {
            kind: RefKind::App,
            id: "app_a".to_string(),
        };
        assert!(cite(&mut state, &wf.id, &step.id, reference.clone()));
        assert!(!cite(&mut state, &wf.id, &step.id, reference.clone()));
        assert_eq!(state.workflows[0].steps[0].resources.len(), 1);
        assert!(uncite(&mut state, &wf.id, &step.id, &reference));
        assert!(state.workflows[0].steps[0].resources.is_empty());
    }

    #[test]
    fn test_delete_workflow() {
        let mut state = CatalogState::default();
        let wf = create(&mut state, "Onboarding").unwrap();
        assert!(delete(&mut state, &wf.id));
        assert!(!delete(&mut state, &wf.id));
    }
}
