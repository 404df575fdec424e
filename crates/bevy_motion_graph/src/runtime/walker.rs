use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, VecDeque},
};

use bevy::{log::debug, math::Vec3};
use serde::{Deserialize, Serialize};

use super::{MotionWalker, PlacedState, path::TargetPath};
use crate::{
    core::{
        errors::{MotionGraphError, MotionGraphResult},
        id::StateId,
        motion_graph::MotionGraph,
    },
    utils::math::{horizontal, yaw_rotation},
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WalkerSettings {
    /// States that must be played along the current clip after a splice before another one can
    /// be taken.
    pub min_dwell: usize,
    /// Length, in states, of the walks compared by the search.
    pub lookahead: usize,
    /// Node expansions allowed per search.
    pub max_expansions: usize,
    /// A complete walk at or below this cost is taken immediately.
    pub acceptance_cost: f32,
    /// Cost added for every splice in a walk.
    pub splice_penalty: f32,
    /// Resolution used when measuring the target path.
    pub path_samples: usize,
}

impl Default for WalkerSettings {
    fn default() -> Self {
        Self {
            min_dwell: 10,
            lookahead: 30,
            max_expansions: 2048,
            acceptance_cost: 0.25,
            splice_penalty: 0.05,
            path_samples: 64,
        }
    }
}

/// A partial walk explored during one search.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// States walked from the committed state, which is not included.
    pub state_path: Vec<StateId>,
    pub accumulated_position: Vec3,
    pub accumulated_yaw: f32,
    pub cost: f32,
    pub travelled: f32,
    pub dwell: usize,
    error_sum: f32,
    splices: usize,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    /// Greater means explored first: lower cost wins, then the longer walk.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| self.state_path.len().cmp(&other.state_path.len()))
    }
}

/// Walks a motion graph so that the character's root follows a [`TargetPath`].
///
/// Single-child states are committed directly. At branch states a best-first search compares
/// walks of `lookahead` states by their mean horizontal distance to the path (plus a penalty per
/// splice) and the chosen walk is played out before searching again.
pub struct PathWalker<'g, P> {
    graph: &'g MotionGraph,
    path: P,
    settings: WalkerSettings,
    path_length: f32,
    current: StateId,
    position: Vec3,
    yaw: f32,
    travelled: f32,
    dwell: usize,
    plan: VecDeque<StateId>,
    /// Cached transition targets of every branch state.
    routes: HashMap<StateId, Vec<StateId>>,
}

impl<'g, P: TargetPath> PathWalker<'g, P> {
    /// Places the character at the start of `path`, facing along it (+Z is forward).
    pub fn new(
        graph: &'g MotionGraph,
        path: P,
        start: StateId,
        settings: WalkerSettings,
    ) -> MotionGraphResult<Self> {
        if graph.is_empty() {
            return Err(MotionGraphError::EmptyGraph);
        }
        if start >= graph.len() {
            return Err(MotionGraphError::UnknownState(start));
        }

        let path_length = path.length(settings.path_samples);
        let origin = path.position(0.);
        let ahead = path.position(1. / settings.path_samples.max(1) as f32);
        let heading = horizontal(ahead - origin);
        let yaw = if heading.length_squared() > 0. {
            heading.x.atan2(heading.z)
        } else {
            0.
        };

        let mut routes: HashMap<StateId, Vec<StateId>> = HashMap::new();
        for &(from, to) in graph.transition_cache.keys() {
            routes.entry(from).or_default().push(to);
        }

        Ok(Self {
            graph,
            path,
            dwell: settings.min_dwell,
            settings,
            path_length,
            current: start,
            position: horizontal(origin),
            yaw,
            travelled: 0.,
            plan: VecDeque::new(),
            routes,
        })
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn dwell(&self) -> usize {
        self.dwell
    }

    pub fn travelled(&self) -> f32 {
        self.travelled
    }

    pub fn path_length(&self) -> f32 {
        self.path_length
    }

    pub fn settings(&self) -> &WalkerSettings {
        &self.settings
    }

    /// States already chosen for the upcoming ticks.
    pub fn planned(&self) -> impl Iterator<Item = StateId> + '_ {
        self.plan.iter().copied()
    }

    /// Whether the travelled distance has reached the end of the path.
    pub fn is_finished(&self) -> bool {
        self.travelled >= self.path_length
    }

    fn path_parameter(&self, travelled: f32) -> f32 {
        if self.path_length <= 0. {
            1.
        } else {
            (travelled / self.path_length).min(1.)
        }
    }

    fn allowed_children(&self, from: StateId, dwell: usize) -> Vec<StateId> {
        if dwell < self.settings.min_dwell {
            self.graph.default_continuation(from).into_iter().collect()
        } else {
            self.graph
                .state(from)
                .map(|s| s.children.iter().copied().collect())
                .unwrap_or_default()
        }
    }

    fn root_node(&self) -> SearchNode {
        SearchNode {
            state_path: vec![],
            accumulated_position: self.position,
            accumulated_yaw: self.yaw,
            cost: 0.,
            travelled: self.travelled,
            dwell: self.dwell,
            error_sum: 0.,
            splices: 0,
        }
    }

    fn expand(&self, node: &SearchNode, child: StateId) -> SearchNode {
        let last = node.state_path.last().copied().unwrap_or(self.current);
        let state = &self.graph.states[child];

        let step = horizontal(yaw_rotation(node.accumulated_yaw) * state.root_local_velocity);
        let accumulated_position = node.accumulated_position + step;
        let travelled = node.travelled + step.length();
        let target = horizontal(self.path.position(self.path_parameter(travelled)));
        let error_sum = node.error_sum + accumulated_position.distance(target);

        let splice = !self.graph.is_default_continuation(last, child);
        let splices = node.splices + usize::from(splice);

        let mut state_path = node.state_path.clone();
        state_path.push(child);
        let cost =
            error_sum / state_path.len() as f32 + splices as f32 * self.settings.splice_penalty;

        SearchNode {
            state_path,
            accumulated_position,
            accumulated_yaw: node.accumulated_yaw + state.yaw_angular_velocity,
            cost,
            travelled,
            dwell: if splice { 0 } else { node.dwell + 1 },
            error_sum,
            splices,
        }
    }

    fn is_complete(&self, node: &SearchNode) -> bool {
        !node.state_path.is_empty()
            && (node.state_path.len() >= self.settings.lookahead
                || node.travelled >= self.path_length)
    }

    /// Best-first search for a walk from the committed state. Returns the first complete walk
    /// within the acceptance cost, or the cheapest complete walk seen once the budget is spent.
    pub fn search(&self) -> Option<Vec<StateId>> {
        let mut open = BinaryHeap::new();
        open.push(self.root_node());
        let mut best_complete: Option<SearchNode> = None;
        let mut expansions = 0;

        while let Some(node) = open.pop() {
            if self.is_complete(&node) {
                if node.cost <= self.settings.acceptance_cost {
                    return Some(node.state_path);
                }
                if best_complete.as_ref().is_none_or(|best| node.cost < best.cost) {
                    best_complete = Some(node);
                }
                continue;
            }

            if expansions >= self.settings.max_expansions {
                break;
            }
            expansions += 1;

            let from = node.state_path.last().copied().unwrap_or(self.current);
            for child in self.allowed_children(from, node.dwell) {
                open.push(self.expand(&node, child));
            }
        }

        debug!(
            "Search from state {} found no walk within cost {} after {} expansions",
            self.current, self.settings.acceptance_cost, expansions
        );
        best_complete.map(|node| node.state_path)
    }

    /// Cached route from the committed state whose endpoint lands closest to the path point at
    /// the same arc length. Routes shorter than the lookahead are only considered when no other
    /// route exists.
    pub fn nearest_route(&self) -> Option<Vec<StateId>> {
        let candidates: Vec<_> = self
            .routes
            .get(&self.current)?
            .iter()
            .filter_map(|&to| self.graph.transition(self.current, to))
            .filter(|info| {
                info.path.first().is_some_and(|&first| {
                    self.dwell >= self.settings.min_dwell
                        || self.graph.is_default_continuation(self.current, first)
                })
            })
            .collect();
        let long_enough = candidates
            .iter()
            .any(|info| info.path.len() >= self.settings.lookahead);

        candidates
            .into_iter()
            .filter(|info| !long_enough || info.path.len() >= self.settings.lookahead)
            .map(|info| {
                let endpoint =
                    self.position + horizontal(yaw_rotation(self.yaw) * info.delta_position);
                let travelled = self.travelled
                    + info
                        .path
                        .iter()
                        .map(|&s| horizontal(self.graph.states[s].root_local_velocity).length())
                        .sum::<f32>();
                let target = horizontal(self.path.position(self.path_parameter(travelled)));
                (endpoint.distance(target), info)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, info)| info.path.clone())
    }

    fn default_next(&self) -> StateId {
        self.graph
            .default_continuation(self.current)
            .unwrap_or(self.current)
    }

    fn next_state(&mut self) -> StateId {
        if let Some(next) = self.plan.pop_front() {
            if self.graph.states[self.current].children.contains(&next) {
                return next;
            }
            self.plan.clear();
        }

        if self.graph.states[self.current].children.len() == 1 || self.is_finished() {
            return self.default_next();
        }

        let walk = self.search().or_else(|| {
            debug!("Falling back to cached routes from state {}", self.current);
            self.nearest_route()
        });
        if let Some(walk) = walk {
            self.plan = walk.into();
            if let Some(next) = self.plan.pop_front() {
                return next;
            }
        }

        self.default_next()
    }

    fn commit(&mut self, next: StateId) {
        let last = self.current;
        let state = &self.graph.states[next];

        let step = horizontal(yaw_rotation(self.yaw) * state.root_local_velocity);
        self.position += step;
        self.travelled += step.length();
        self.yaw += state.yaw_angular_velocity;

        if self.graph.is_default_continuation(last, next) {
            self.dwell += 1;
        } else {
            debug!("Splice {last} -> {next}");
            self.dwell = 0;
        }
        self.current = next;
    }
}

impl<P: TargetPath> MotionWalker for PathWalker<'_, P> {
    fn graph(&self) -> &MotionGraph {
        self.graph
    }

    fn placement(&self) -> PlacedState {
        PlacedState {
            state: self.current,
            position: self.position,
            yaw: self.yaw,
        }
    }

    fn tick(&mut self) -> PlacedState {
        let next = self.next_state();
        self.commit(next);
        self.placement()
    }
}
