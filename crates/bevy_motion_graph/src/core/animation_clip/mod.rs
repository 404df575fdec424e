pub mod loader;

use bevy::{asset::Asset, reflect::TypePath};
use serde::{Deserialize, Serialize};

use super::pose::BoneTransform;
use crate::sampling::linear::SampleLinearAt;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub transform: BoneTransform,
}

/// Keyframed local transforms of one bone, in ascending time order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub bone: String,
    pub keyframes: Vec<Keyframe>,
}

fn default_speed() -> f32 {
    1.
}

/// A source locomotion clip: named bone channels plus its duration and authored speed.
#[derive(Asset, TypePath, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionClip {
    #[serde(default)]
    pub name: String,
    pub duration: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    pub channels: Vec<Channel>,
}

impl MotionClip {
    fn longest_channel(&self) -> Option<&Channel> {
        // First channel wins on ties
        self.channels
            .iter()
            .rev()
            .max_by_key(|c| c.keyframes.len())
    }

    /// Number of frames the clip contributes to a motion graph: the keyframe count of its densest
    /// channel.
    pub fn frame_count(&self) -> usize {
        self.longest_channel().map_or(0, |c| c.keyframes.len())
    }

    /// Sample times of every frame.
    pub fn frame_times(&self) -> Vec<f32> {
        self.longest_channel()
            .map(|c| c.keyframes.iter().map(|k| k.time).collect())
            .unwrap_or_default()
    }

    pub fn frame_duration(&self) -> f32 {
        match self.frame_count() {
            0 => 0.,
            n => self.duration / n as f32,
        }
    }

    pub fn channel(&self, bone: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.bone == bone)
    }

    /// Local transform of `bone` at `time`, or `None` if the clip does not animate it.
    pub fn sample(&self, bone: &str, time: f32) -> Option<BoneTransform> {
        self.channel(bone)?.sample_linear_at(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    fn channel(bone: &str, times: &[f32]) -> Channel {
        Channel {
            bone: bone.into(),
            keyframes: times
                .iter()
                .map(|&time| Keyframe {
                    time,
                    transform: BoneTransform::from_translation(Vec3::X * time),
                })
                .collect(),
        }
    }

    #[test]
    fn frames_follow_the_densest_channel() {
        let clip = MotionClip {
            name: "walk".into(),
            duration: 1.,
            speed: 1.,
            channels: vec![channel("hips", &[0., 1.]), channel("spine", &[0., 0.25, 0.5, 0.75])],
        };
        assert_eq!(clip.frame_count(), 4);
        assert_eq!(clip.frame_times(), vec![0., 0.25, 0.5, 0.75]);
        assert_eq!(clip.frame_duration(), 0.25);
        assert_eq!(clip.sample("hips", 0.5).unwrap().translation, Vec3::X * 0.5);
        assert!(clip.sample("head", 0.5).is_none());
    }

    #[test]
    fn empty_clip_has_no_frames() {
        let clip = MotionClip {
            name: String::new(),
            duration: 0.,
            speed: 1.,
            channels: vec![],
        };
        assert_eq!(clip.frame_count(), 0);
        assert_eq!(clip.frame_duration(), 0.);
        assert!(clip.frame_times().is_empty());
    }
}
