use std::collections::VecDeque;

use bevy::log::debug;

use crate::core::{
    errors::{MotionGraphError, MotionGraphResult},
    id::StateId,
    motion_graph::{MotionState, derive_parents},
};

/// States with no outgoing transitions.
pub fn dead_ends(states: &[MotionState]) -> Vec<StateId> {
    states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_dead_end())
        .map(|(id, _)| id)
        .collect()
}

/// Removes dead ends until none are left, then compacts the state array. Removing a state can
/// turn its parents into dead ends, which are removed in turn. Returns the number of states
/// removed.
pub fn prune_dead_ends(states: &mut Vec<MotionState>) -> MotionGraphResult<usize> {
    let parents = derive_parents(states)?;
    let len = states.len();

    let mut queued = vec![false; len];
    let mut worklist: VecDeque<StateId> = dead_ends(states).into();
    for &id in &worklist {
        queued[id] = true;
    }

    while let Some(dead) = worklist.pop_front() {
        for &parent in &parents[dead] {
            let children = &mut states[parent].children;
            children.shift_remove(&dead);
            if children.is_empty() && !queued[parent] {
                queued[parent] = true;
                worklist.push_back(parent);
            }
        }
    }

    let mut remap: Vec<Option<StateId>> = vec![None; len];
    let mut next = 0;
    for (id, removed) in queued.iter().enumerate() {
        if !removed {
            remap[id] = Some(next);
            next += 1;
        }
    }
    let removed = len - next;
    debug!("Pruning {removed} dead-end states out of {len}");

    let old_states = std::mem::take(states);
    for (id, mut state) in old_states.into_iter().enumerate() {
        if queued[id] {
            continue;
        }
        state.children = state
            .children
            .iter()
            .map(|&child| {
                remap[child].ok_or(MotionGraphError::StructuralInconsistency {
                    state: id,
                    child,
                    len,
                })
            })
            .collect::<MotionGraphResult<_>>()?;
        states.push(state);
    }

    Ok(removed)
}
