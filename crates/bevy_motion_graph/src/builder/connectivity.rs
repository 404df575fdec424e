use bevy::{
    log::debug,
    tasks::{ComputeTaskPool, TaskPool},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::assembler::StateFeatures;
use crate::core::{id::StateId, motion_graph::MotionState, skeleton::Skeleton};

/// Transition points handed to each compute task.
const TRANSITION_POINTS_PER_TASK: usize = 16;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ConnectivitySettings {
    /// Splices inside one clip must land more than this many frames away from the source frame
    /// and from the previous splice target in that clip.
    pub min_gap: usize,
    /// Maximum weighted pose distance for a splice.
    pub distance_threshold: f32,
    /// Per-bone weights, by bone name.
    pub bone_weights: IndexMap<String, f32>,
    /// Weight of bones not listed in `bone_weights`.
    pub default_bone_weight: f32,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            min_gap: 120,
            distance_threshold: 0.6,
            bone_weights: IndexMap::new(),
            default_bone_weight: 1.,
        }
    }
}

impl ConnectivitySettings {
    /// Weight of every skeleton bone, indexed by bone id.
    pub fn resolve_bone_weights(&self, skeleton: &Skeleton) -> Vec<f32> {
        skeleton
            .bones()
            .iter()
            .map(|bone| {
                self.bone_weights
                    .get(&bone.name)
                    .copied()
                    .unwrap_or(self.default_bone_weight)
            })
            .collect()
    }
}

/// `Σ weight · (0.5·|Δposition| + 0.5·|Δvelocity|)` over all bones.
pub fn state_distance(a: &StateFeatures, b: &StateFeatures, weights: &[f32]) -> f32 {
    a.positions
        .iter()
        .zip(&b.positions)
        .zip(a.velocities.iter().zip(&b.velocities))
        .enumerate()
        .map(|(bone, ((pa, pb), (va, vb)))| {
            let weight = weights.get(bone).copied().unwrap_or(1.);
            weight * (0.5 * pa.distance(*pb) + 0.5 * va.distance(*vb))
        })
        .sum()
}

fn same_clip(states: &[MotionState], a: StateId, b: StateId) -> bool {
    states[a].sequence == states[b].sequence
}

/// States whose successor in the same clip carries a different contact label.
fn transition_points(states: &[MotionState]) -> Vec<StateId> {
    (0..states.len().saturating_sub(1))
        .filter(|&i| same_clip(states, i, i + 1) && states[i].contact != states[i + 1].contact)
        .collect()
}

/// Candidate splice targets of transition point `i` that pass the contact-pattern, clip-boundary
/// and distance tests, in ascending order.
fn matching_targets(
    states: &[MotionState],
    features: &[StateFeatures],
    weights: &[f32],
    threshold: f32,
    i: StateId,
) -> Vec<StateId> {
    (1..states.len())
        .filter(|&j| j != i)
        .filter(|&j| same_clip(states, j - 1, j))
        .filter(|&j| {
            states[i + 1].contact == states[j].contact
                && states[i].contact == states[j - 1].contact
        })
        .filter(|&j| state_distance(&features[i + 1], &features[j], weights) <= threshold)
        .collect()
}

/// Adds splice edges between closely matching states. For an accepted pair the edge `i → j` and
/// the mirrored edge `j-1 → i+1` are both inserted. Returns the number of edges added.
pub fn discover_connections(
    states: &mut [MotionState],
    features: &[StateFeatures],
    weights: &[f32],
    settings: &ConnectivitySettings,
) -> usize {
    let points = transition_points(states);
    debug!("{} transition points", points.len());

    let mut candidates: Vec<(StateId, Vec<StateId>)> = {
        let states = &*states;
        let threshold = settings.distance_threshold;
        let pool = ComputeTaskPool::get_or_init(TaskPool::default);
        pool.scope(|s| {
            for chunk in points.chunks(TRANSITION_POINTS_PER_TASK) {
                s.spawn(async move {
                    chunk
                        .iter()
                        .map(|&i| (i, matching_targets(states, features, weights, threshold, i)))
                        .collect::<Vec<_>>()
                });
            }
        })
        .into_iter()
        .flatten()
        .collect()
    };
    candidates.sort_by_key(|(i, _)| *i);

    let gap = settings.min_gap;
    let mut edges_added = 0;
    for (i, targets) in candidates {
        let mut last_same_clip_target: Option<StateId> = None;
        for j in targets {
            if states[i].children.contains(&j) {
                continue;
            }
            let intra_clip = same_clip(states, i, j);
            if intra_clip
                && (i.abs_diff(j) <= gap
                    || last_same_clip_target.is_some_and(|last| last.abs_diff(j) <= gap))
            {
                continue;
            }

            if states[i].children.insert(j) {
                edges_added += 1;
            }
            if states[j - 1].children.insert(i + 1) {
                edges_added += 1;
            }
            if intra_clip {
                last_same_clip_target = Some(j);
            }
        }
    }

    edges_added
}
