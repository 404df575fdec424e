//! Offline construction of a [`MotionGraph`] from a skeleton and a list of clips.
//!
//! The build runs in stages: per-clip feature extraction, assembly of the clips into chains of
//! states, discovery of splice edges between similar states, removal of dead ends and finally
//! precomputation of the transition cache.

pub mod assembler;
pub mod connectivity;
pub mod features;
pub mod manifest;
pub mod precompute;
pub mod pruning;

use bevy::log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::{
    animation_clip::MotionClip, errors::MotionGraphResult, motion_graph::MotionGraph,
    skeleton::Skeleton,
};
use assembler::GraphAssembler;
use connectivity::{ConnectivitySettings, discover_connections};
use features::{ContactSettings, FeatureExtractor};
use precompute::{PrecomputeSettings, precompute_transitions};
use pruning::{dead_ends, prune_dead_ends};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct BuildSettings {
    pub contact: ContactSettings,
    pub connectivity: ConnectivitySettings,
    pub precompute: PrecomputeSettings,
}

/// Summary of a build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub clips_used: usize,
    pub clips_skipped: usize,
    pub states_loaded: usize,
    pub edges_added: usize,
    /// Dead ends present before pruning started.
    pub dead_ends_found: usize,
    pub states_pruned: usize,
    pub cache_entries: usize,
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} clips ({} skipped), {} states loaded, {} edges added, {} states pruned ({} dead ends), {} cache entries",
            self.clips_used,
            self.clips_skipped,
            self.states_loaded,
            self.edges_added,
            self.states_pruned,
            self.dead_ends_found,
            self.cache_entries
        )
    }
}

pub struct MotionGraphBuilder<'a> {
    skeleton: &'a Skeleton,
    settings: BuildSettings,
}

impl<'a> MotionGraphBuilder<'a> {
    pub fn new(skeleton: &'a Skeleton, settings: BuildSettings) -> Self {
        Self { skeleton, settings }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Builds a graph from `clips`. The index of a clip in `clips` becomes the `sequence` of its
    /// states. Clips with fewer than two frames are skipped.
    ///
    /// The graph header (speed and per-state duration) comes from the first clip used. An empty
    /// clip list builds an empty graph.
    pub fn build(&self, clips: &[MotionClip]) -> MotionGraphResult<(MotionGraph, BuildReport)> {
        let mut report = BuildReport::default();
        let extractor = FeatureExtractor::new(self.skeleton, &self.settings.contact);
        let mut assembler = GraphAssembler::new();
        let mut header: Option<(f32, f32)> = None;

        for (sequence, clip) in clips.iter().enumerate() {
            let Some(features) = extractor.extract(clip) else {
                warn!(
                    "Skipping clip {:?}: {} frames, at least 2 are needed",
                    clip.name,
                    clip.frame_count()
                );
                report.clips_skipped += 1;
                continue;
            };
            header.get_or_insert((clip.speed, clip.frame_duration()));
            assembler.add_clip(sequence, features);
            report.clips_used += 1;
        }

        let (mut states, features) = assembler.finish();
        report.states_loaded = states.len();
        info!("{} states loaded", report.states_loaded);

        let weights = self
            .settings
            .connectivity
            .resolve_bone_weights(self.skeleton);
        report.edges_added = discover_connections(
            &mut states,
            &features,
            &weights,
            &self.settings.connectivity,
        );
        info!("{} edges added", report.edges_added);
        drop(features);

        report.dead_ends_found = dead_ends(&states).len();
        report.states_pruned = prune_dead_ends(&mut states)?;
        info!("{} states pruned", report.states_pruned);

        let (speed, frame_duration) = header.unwrap_or((1., 0.));
        let mut graph = MotionGraph::new(states, speed, frame_duration);
        graph.validate()?;

        if self.settings.precompute.enabled {
            report.cache_entries = precompute_transitions(&mut graph, &self.settings.precompute);
            info!("{} transition cache entries", report.cache_entries);
        }

        Ok((graph, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::motion_graph::ContactLabel,
        utils::fixtures::{SyntheticFrame, biped, clip_from_frames, idle_clip, walk_clip},
    };

    fn small_gap() -> BuildSettings {
        BuildSettings {
            connectivity: ConnectivitySettings {
                min_gap: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn constant_contact_clips_only_lose_their_chains() {
        let skeleton = biped();
        let clips = [idle_clip("a", 5), idle_clip("b", 5)];
        let (graph, report) = MotionGraphBuilder::new(&skeleton, small_gap())
            .build(&clips)
            .unwrap();

        assert_eq!(report.states_loaded, 10);
        assert_eq!(report.edges_added, 0);
        // Only the two clip-terminal states start out as dead ends
        assert_eq!(report.dead_ends_found, 2);
        // Without splices every chain drains away from its tail
        assert_eq!(report.states_pruned, 10);
        assert!(graph.is_empty());
    }

    #[test]
    fn three_frame_clip_finds_no_splice_target() {
        let skeleton = biped();
        let frames = [
            SyntheticFrame::default(),
            SyntheticFrame {
                right_lift: 0.2,
                ..Default::default()
            },
            SyntheticFrame {
                right_lift: 0.2,
                ..Default::default()
            },
        ];
        let clip = clip_from_frames("step", &frames);
        // Judge contact by height only, so the lift registers on frame 1
        let mut settings = small_gap();
        settings.contact.velocity_threshold = 1.;

        let labels = FeatureExtractor::new(&skeleton, &settings.contact)
            .extract(&clip)
            .unwrap()
            .contact;
        assert_eq!(
            labels,
            vec![ContactLabel::Both, ContactLabel::LeftOnly, ContactLabel::LeftOnly]
        );

        let (graph, report) = MotionGraphBuilder::new(&skeleton, settings)
            .build(&[clip])
            .unwrap();

        assert_eq!(report.edges_added, 0);
        assert_eq!(report.dead_ends_found, 1);
        assert!(graph.is_empty());
    }

    #[test]
    fn empty_clip_list_builds_empty_graph() {
        let skeleton = biped();
        let (graph, report) = MotionGraphBuilder::new(&skeleton, BuildSettings::default())
            .build(&[])
            .unwrap();
        assert!(graph.is_empty());
        assert!(graph.transition_cache.is_empty());
        assert_eq!(graph.speed, 1.);
        assert_eq!(graph.frame_duration, 0.);
        assert_eq!(report, BuildReport::default());
    }

    #[test]
    fn short_clips_are_skipped_without_reusing_their_index() {
        let skeleton = biped();
        let clips = [
            idle_clip("single", 1),
            walk_clip("a", 12, 0.01, 3),
            walk_clip("b", 12, 0.01, 3),
        ];
        let (graph, report) = MotionGraphBuilder::new(&skeleton, BuildSettings::default())
            .build(&clips)
            .unwrap();
        assert_eq!(report.clips_skipped, 1);
        assert_eq!(report.clips_used, 2);
        assert!(graph.states.iter().all(|s| s.sequence == 1 || s.sequence == 2));
        assert!((graph.frame_duration - clips[1].frame_duration()).abs() < 1e-6);
    }

    #[test]
    fn walking_clips_splice_into_a_closed_graph() {
        let skeleton = biped();
        let clips = [walk_clip("a", 12, 0.01, 3), walk_clip("b", 12, 0.01, 3)];
        let (graph, report) = MotionGraphBuilder::new(&skeleton, BuildSettings::default())
            .build(&clips)
            .unwrap();

        assert!(report.edges_added > 0);
        assert!(!graph.is_empty());
        assert_eq!(report.states_loaded - report.states_pruned, graph.len());
        assert!(graph.validate().is_ok());
        assert!(
            graph
                .states
                .iter()
                .all(|s| !s.children.is_empty() && s.children.iter().all(|&c| c < graph.len()))
        );
        assert!(graph.states.iter().all(|s| s.contact != ContactLabel::Airborne));
        assert!(report.cache_entries > 0);
        assert_eq!(report.cache_entries, graph.transition_cache.len());

        // Every branch has an entry for each state it reaches
        for branch in graph.branch_states() {
            for &child in &graph.states[branch].children {
                assert!(graph.transition(branch, child).is_some());
            }
        }

        let decoded = MotionGraph::from_bytes(&graph.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn builds_are_deterministic() {
        let skeleton = biped();
        let clips = [walk_clip("a", 12, 0.01, 3), walk_clip("b", 12, 0.01, 3)];
        let builder = MotionGraphBuilder::new(&skeleton, BuildSettings::default());
        let (first, _) = builder.build(&clips).unwrap();
        let (second, _) = builder.build(&clips).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.transition_cache.keys().collect::<Vec<_>>(),
            second.transition_cache.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn disabled_precompute_leaves_cache_empty() {
        let skeleton = biped();
        let clips = [walk_clip("a", 12, 0.01, 3), walk_clip("b", 12, 0.01, 3)];
        let settings = BuildSettings {
            precompute: PrecomputeSettings {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let (graph, report) = MotionGraphBuilder::new(&skeleton, settings)
            .build(&clips)
            .unwrap();
        assert!(graph.transition_cache.is_empty());
        assert_eq!(report.cache_entries, 0);
    }
}
