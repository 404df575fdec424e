use super::{MotionWalker, PlacedState};
use crate::{
    core::pose::Pose,
    interpolation::linear::InterpolateLinear,
    utils::math::{strip_yaw, yaw_rotation},
};

/// Moves a stored pose to where the walker placed it. The root keeps its height and pitch/roll
/// from the pose while its horizontal position and yaw come from the placement.
pub fn place_pose(pose: &Pose, placed: &PlacedState) -> Pose {
    let mut pose = pose.clone();
    if let Some(root) = pose.root_mut() {
        root.translation.x = placed.position.x;
        root.translation.z = placed.position.z;
        root.rotation = yaw_rotation(placed.yaw) * strip_yaw(root.rotation);
    }
    pose
}

/// Plays a [`MotionWalker`] back in time, blending between consecutive states.
pub struct GraphPlayback<W> {
    walker: W,
    elapsed: f32,
    last: PlacedState,
    next: PlacedState,
}

impl<W: MotionWalker> GraphPlayback<W> {
    pub fn new(mut walker: W) -> Self {
        let last = walker.placement();
        let next = walker.tick();
        Self {
            walker,
            elapsed: 0.,
            last,
            next,
        }
    }

    pub fn walker(&self) -> &W {
        &self.walker
    }

    pub fn walker_mut(&mut self) -> &mut W {
        &mut self.walker
    }

    pub fn into_walker(self) -> W {
        self.walker
    }

    /// State blended from.
    pub fn last(&self) -> PlacedState {
        self.last
    }

    /// State blended towards.
    pub fn next(&self) -> PlacedState {
        self.next
    }

    /// Progress between [`Self::last`] and [`Self::next`], in `[0, 1)`.
    pub fn blend_factor(&self) -> f32 {
        let frame_duration = self.walker.graph().frame_duration;
        if frame_duration > 0. {
            self.elapsed / frame_duration
        } else {
            0.
        }
    }

    fn step(&mut self) {
        self.last = self.next;
        self.next = self.walker.tick();
    }

    /// Advances playback by `dt` seconds, scaled by the graph speed, and returns the blended
    /// world-space pose. A graph without a frame duration moves one state per call.
    pub fn advance(&mut self, dt: f32) -> Pose {
        let graph = self.walker.graph();
        let frame_duration = graph.frame_duration;
        let speed = graph.speed;

        if frame_duration <= 0. {
            self.step();
            self.elapsed = 0.;
        } else {
            self.elapsed += dt.max(0.) * speed;
            while self.elapsed >= frame_duration {
                self.elapsed -= frame_duration;
                self.step();
            }
        }

        self.pose()
    }

    /// Blended pose at the current time, without advancing.
    pub fn pose(&self) -> Pose {
        let graph = self.walker.graph();
        let from = place_pose(&graph.states[self.last.state].pose, &self.last);
        let to = place_pose(&graph.states[self.next.state].pose, &self.next);
        from.interpolate_linear(&to, self.blend_factor())
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::{Quat, Vec3};

    use super::*;
    use crate::{
        core::{motion_graph::MotionGraph, pose::BoneTransform},
        runtime::{RandomWalkSettings, RandomWalker},
        utils::fixtures::{FRAME_TIME, chain_states, quat_approx_eq},
    };

    /// A single looping clip of four states stepping 0.1 along +Z.
    fn loop_graph() -> MotionGraph {
        let mut states = chain_states(&[4]);
        states[3].children.insert(0);
        for state in &mut states {
            state.pose = Pose::new(vec![
                BoneTransform::from_translation(Vec3::new(0., 1., 0.)),
                BoneTransform::from_translation(Vec3::new(0., 0.2, 0.)),
            ]);
            state.root_local_velocity = Vec3::new(0., 0., 0.1);
        }
        MotionGraph::new(states, 1., FRAME_TIME)
    }

    fn root(pose: &Pose) -> Vec3 {
        pose.root().map(|r| r.translation).unwrap_or_default()
    }

    #[test]
    fn place_pose_replaces_horizontal_root_and_yaw() {
        let pose = Pose::new(vec![
            BoneTransform::from_translation(Vec3::new(5., 1., 7.))
                .with_rotation(yaw_rotation(0.3) * Quat::from_rotation_x(0.2)),
            BoneTransform::from_translation(Vec3::new(0., 0.2, 0.)),
        ]);
        let placed = PlacedState {
            state: 0,
            position: Vec3::new(1., 0., 2.),
            yaw: 1.,
        };

        let placed_pose = place_pose(&pose, &placed);
        let root = placed_pose.transforms[0];
        assert!((root.translation - Vec3::new(1., 1., 2.)).length() < 1e-5);
        assert!(quat_approx_eq(
            root.rotation,
            yaw_rotation(1.) * Quat::from_rotation_x(0.2)
        ));
        assert_eq!(placed_pose.transforms[1], pose.transforms[1]);
    }

    #[test]
    fn advance_blends_between_states() {
        let graph = loop_graph();
        let walker = RandomWalker::new(&graph, RandomWalkSettings::default()).unwrap();
        let mut playback = GraphPlayback::new(walker);
        assert_eq!(playback.last().state, 0);
        assert_eq!(playback.next().state, 1);

        let pose = playback.advance(0.);
        assert!((root(&pose) - Vec3::new(0., 1., 0.)).length() < 1e-5);

        let pose = playback.advance(FRAME_TIME / 2.);
        assert!((root(&pose) - Vec3::new(0., 1., 0.05)).length() < 1e-5);

        let pose = playback.advance(FRAME_TIME / 2.);
        assert_eq!(playback.last().state, 1);
        assert_eq!(playback.next().state, 2);
        assert!((root(&pose) - Vec3::new(0., 1., 0.1)).length() < 1e-5);
    }

    #[test]
    fn graph_speed_scales_time() {
        let mut graph = loop_graph();
        graph.speed = 2.;
        let walker = RandomWalker::new(&graph, RandomWalkSettings::default()).unwrap();
        let mut playback = GraphPlayback::new(walker);

        let pose = playback.advance(FRAME_TIME / 4.);
        assert!((playback.blend_factor() - 0.5).abs() < 1e-5);
        assert!((root(&pose) - Vec3::new(0., 1., 0.05)).length() < 1e-5);
    }

    #[test]
    fn missing_frame_duration_steps_once_per_call() {
        let mut graph = loop_graph();
        graph.frame_duration = 0.;
        let walker = RandomWalker::new(&graph, RandomWalkSettings::default()).unwrap();
        let mut playback = GraphPlayback::new(walker);

        for expected in [1, 2, 3, 0, 1] {
            playback.advance(10.);
            assert_eq!(playback.last().state, expected);
        }
    }
}
