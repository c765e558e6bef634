//! Integration pairs.
//!
//! Every entry point canonicalizes app ids through [`canonical_pair`], so a
//! pair created from either side is the same record. Note lists only grow
//! through [`set_flag`] and shrink through [`remove_note`]; they are never
//! replaced wholesale.
//!
//! A pair that no longer records anything (no flags, notes or actions) after
//! a removal is dropped, so callers must not hold on to its id.

use super::{remove_where, required};
use crate::model::{canonical_pair, IntegrationAction, IntegrationPair, PairKind};
use crate::state::CatalogState;
use crate::util::new_id;

/// Find the pair for two apps, creating an empty one if needed.
///
/// `None` when the ids are equal, empty, or not both known apps.
pub fn get_or_create(state: &mut CatalogState, app_a: &str, app_b: &str) -> Option<IntegrationPair> {
    let (low, high) = canonical_pair(app_a, app_b)?;
    if state.app(low).is_none() || state.app(high).is_none() {
        return None;
    }
    if let Some(existing) = find(state, low, high) {
        return Some(existing.clone());
    }
    let pair = IntegrationPair {
        id: new_id("pair"),
        app_low_id: low.to_string(),
        app_high_id: high.to_string(),
        ..Default::default()
    };
    state.integration_pairs.push(pair.clone());
    Some(pair)
}

/// Lookup by already-canonical ids.
pub(crate) fn find<'a>(state: &'a CatalogState, low: &str, high: &str) -> Option<&'a IntegrationPair> {
    state
        .integration_pairs
        .iter()
        .find(|p| p.app_low_id == low && p.app_high_id == high)
}

/// Raise a flag and append `note` to its list. Blank notes only raise the flag.
pub fn set_flag(state: &mut CatalogState, pair_id: &str, kind: PairKind, note: &str) -> bool {
    let Some(pair) = state.pair_mut(pair_id) else {
        return false;
    };
    let note = required(note);
    match kind {
        PairKind::Direct => {
            pair.has_direct = true;
            pair.direct_notes.extend(note);
        }
        PairKind::Zapier => {
            pair.has_zapier = true;
            pair.zapier_notes.extend(note);
        }
    }
    true
}

/// Lower a flag. Its notes stay.
pub fn clear_flag(state: &mut CatalogState, pair_id: &str, kind: PairKind) -> bool {
    let Some(pair) = state.pair_mut(pair_id) else {
        return false;
    };
    match kind {
        PairKind::Direct => pair.has_direct = false,
        PairKind::Zapier => pair.has_zapier = false,
    }
    prune_if_inactive(state, pair_id);
    true
}

pub fn remove_note(state: &mut CatalogState, pair_id: &str, kind: PairKind, index: usize) -> bool {
    let Some(pair) = state.pair_mut(pair_id) else {
        return false;
    };
    let notes = match kind {
        PairKind::Direct => &mut pair.direct_notes,
        PairKind::Zapier => &mut pair.zapier_notes,
    };
    if index >= notes.len() {
        return false;
    }
    notes.remove(index);
    prune_if_inactive(state, pair_id);
    true
}

/// Record an action flowing out of `from_app`. Blank labels are rejected.
pub fn add_action(
    state: &mut CatalogState,
    pair_id: &str,
    from_app: &str,
    action: IntegrationAction,
) -> bool {
    let Some(label) = required(&action.label) else {
        return false;
    };
    let Some(flow) = state
        .pair_mut(pair_id)
        .and_then(|pair| pair.flow_from_mut(from_app))
    else {
        return false;
    };
    flow.actions.push(IntegrationAction {
        label,
        category: action.category.trim().to_string(),
        integration_type: action.integration_type,
    });
    true
}

pub fn remove_action(state: &mut CatalogState, pair_id: &str, from_app: &str, index: usize) -> bool {
    let Some(flow) = state
        .pair_mut(pair_id)
        .and_then(|pair| pair.flow_from_mut(from_app))
    else {
        return false;
    };
    if index >= flow.actions.len() {
        return false;
    }
    flow.actions.remove(index);
    prune_if_inactive(state, pair_id);
    true
}

pub fn delete(state: &mut CatalogState, pair_id: &str) -> bool {
    remove_where(&mut state.integration_pairs, |p| p.id == pair_id)
}

fn prune_if_inactive(state: &mut CatalogState, pair_id: &str) {
    remove_where(&mut state.integration_pairs, |p| {
        p.id == pair_id && !p.is_active()
    });
}
