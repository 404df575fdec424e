use std::collections::VecDeque;

use bevy::{
    math::Vec3,
    tasks::{ComputeTaskPool, TaskPool},
};
use serde::{Deserialize, Serialize};

use crate::core::{
    id::StateId,
    motion_graph::{MotionGraph, MotionState, TransitionInfo},
};

const BRANCHES_PER_TASK: usize = 8;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PrecomputeSettings {
    pub enabled: bool,
    /// Maximum number of hops cached from a branch state. Unbounded when unset.
    pub max_depth: Option<usize>,
}

impl Default for PrecomputeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: None,
        }
    }
}

/// Breadth-first traversal from `root`, returning the first walk found to every reachable state
/// together with its cumulative displacement. Paths are fewest-hop walks, which need not be the
/// walks with the least displacement error.
///
/// The root itself is not marked as visited, so a cycle back to it yields a `(root, root)` entry.
pub fn traverse_from(
    states: &[MotionState],
    root: StateId,
    max_depth: Option<usize>,
) -> Vec<(StateId, TransitionInfo)> {
    let mut visited = vec![false; states.len()];
    let mut found: Vec<(StateId, TransitionInfo)> = vec![];
    // (state, hops from root, index of its entry in `found`)
    let mut queue: VecDeque<(StateId, usize, Option<usize>)> = VecDeque::new();
    queue.push_back((root, 0, None));

    while let Some((id, depth, entry)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        let Some(state) = states.get(id) else {
            continue;
        };

        for &child in &state.children {
            let Some(child_state) = states.get(child) else {
                continue;
            };
            if visited[child] {
                continue;
            }
            visited[child] = true;

            let (mut path, position, yaw) = match entry {
                Some(idx) => {
                    let base = &found[idx].1;
                    (base.path.clone(), base.delta_position, base.delta_yaw)
                }
                None => (vec![], Vec3::ZERO, 0.),
            };
            path.push(child);
            let (delta_position, delta_yaw) = child_state.advance(position, yaw);

            found.push((
                child,
                TransitionInfo {
                    path,
                    delta_position,
                    delta_yaw,
                },
            ));
            if child != root {
                queue.push_back((child, depth + 1, Some(found.len() - 1)));
            }
        }
    }

    found
}

/// Fills the transition cache of `graph` from every branch state. Returns the number of entries.
pub fn precompute_transitions(graph: &mut MotionGraph, settings: &PrecomputeSettings) -> usize {
    let branches: Vec<StateId> = graph.branch_states().collect();
    let states = &graph.states;
    let max_depth = settings.max_depth;

    let pool = ComputeTaskPool::get_or_init(TaskPool::default);
    let mut traversals: Vec<(StateId, Vec<(StateId, TransitionInfo)>)> = pool
        .scope(|s| {
            for chunk in branches.chunks(BRANCHES_PER_TASK) {
                s.spawn(async move {
                    chunk
                        .iter()
                        .map(|&root| (root, traverse_from(states, root, max_depth)))
                        .collect::<Vec<_>>()
                });
            }
        })
        .into_iter()
        .flatten()
        .collect();
    traversals.sort_by_key(|(root, _)| *root);

    graph.transition_cache.clear();
    for (root, entries) in traversals {
        for (target, info) in entries {
            graph.transition_cache.insert((root, target), info);
        }
    }

    graph.transition_cache.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        utils::fixtures::{chain_states, relink},
        utils::math::yaw_rotation,
    };

    /// Nine states: the cycle 0 -> 1 -> 2 -> 3 -> 4 -> 0 plus a second loop 0 -> 5 -> .. -> 8 -> 0.
    fn two_loops() -> Vec<MotionState> {
        let mut states = chain_states(&[9]);
        relink(
            &mut states,
            &[
                (0, 1),
                (1, 2),
                (2, 3),
                (3, 4),
                (4, 0),
                (0, 5),
                (5, 6),
                (6, 7),
                (7, 8),
                (8, 0),
            ],
        );
        for state in states.iter_mut() {
            state.root_local_velocity = Vec3::new(0., 0., 1.);
            state.yaw_angular_velocity = 0.1;
        }
        states
    }

    #[test]
    fn displacement_accumulates_with_yaw() {
        let mut graph = MotionGraph::new(two_loops(), 1., 0.1);
        precompute_transitions(&mut graph, &PrecomputeSettings::default());

        let info = graph.transition(0, 4).unwrap();
        assert_eq!(info.path, vec![1, 2, 3, 4]);
        let expected: Vec3 = (0..4)
            .map(|k| yaw_rotation(0.1 * k as f32) * Vec3::Z)
            .sum();
        assert!((info.delta_position - expected).length() < 1e-5);
        assert!((info.delta_yaw - 0.4).abs() < 1e-5);

        // The cycle back to the branch itself is recorded
        let back = graph.transition(0, 0).unwrap();
        assert_eq!(back.path, vec![1, 2, 3, 4, 0]);
        // Every state is reachable from 0, and 0 is the only branch
        assert_eq!(graph.transition_cache.len(), 9);
    }

    #[test]
    fn straight_cycle_without_turning_sums_velocities() {
        let mut states = two_loops();
        for state in states.iter_mut() {
            state.yaw_angular_velocity = 0.;
        }
        let entries = traverse_from(&states, 0, None);
        let (_, info) = entries.iter().find(|(target, _)| *target == 4).unwrap();
        assert!((info.delta_position - Vec3::new(0., 0., 4.)).length() < 1e-5);
        assert_eq!(info.delta_yaw, 0.);
    }

    #[test]
    fn cached_sums_match_their_paths() {
        let mut graph = MotionGraph::new(two_loops(), 1., 0.1);
        graph.states[6].root_local_velocity = Vec3::new(0.3, 0., 0.2);
        graph.states[2].yaw_angular_velocity = -0.4;
        precompute_transitions(&mut graph, &PrecomputeSettings::default());

        for (&(from, to), info) in &graph.transition_cache {
            assert_eq!(info.path.last(), Some(&to));
            let (position, yaw) = info
                .path
                .iter()
                .fold((Vec3::ZERO, 0.), |(p, y), &s| graph.states[s].advance(p, y));
            assert!((position - info.delta_position).length() < 1e-5, "{from} -> {to}");
            assert!((yaw - info.delta_yaw).abs() < 1e-5);
        }
    }

    #[test]
    fn depth_limit_bounds_paths() {
        let entries = traverse_from(&two_loops(), 0, Some(2));
        let mut targets: Vec<_> = entries.iter().map(|(t, _)| *t).collect();
        targets.sort();
        assert_eq!(targets, vec![1, 2, 5, 6]);
        assert!(entries.iter().all(|(_, info)| info.path.len() <= 2));
    }

    #[test]
    fn non_branch_graph_has_empty_cache() {
        let mut states = chain_states(&[3]);
        states[2].children.insert(0);
        let mut graph = MotionGraph::new(states, 1., 0.1);
        assert_eq!(
            precompute_transitions(&mut graph, &PrecomputeSettings::default()),
            0
        );
    }
}
