use crate::{
    core::{animation_clip::Channel, pose::BoneTransform},
    interpolation::linear::InterpolateLinear,
};

pub trait SampleLinearAt {
    type Output;
    fn sample_linear_at(&self, time: f32) -> Self::Output;
}

impl SampleLinearAt for Channel {
    type Output = Option<BoneTransform>;

    /// Samples the channel at `time`, clamped to its first and last keyframes. Keyframes are
    /// expected in ascending time order.
    fn sample_linear_at(&self, time: f32) -> Self::Output {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;

        if time <= first.time {
            return Some(first.transform);
        }
        if time >= last.time {
            return Some(last.transform);
        }

        let next_idx = self.keyframes.partition_point(|k| k.time <= time);
        let prev = &self.keyframes[next_idx - 1];
        let next = &self.keyframes[next_idx];

        let f = if prev.time == next.time {
            0.
        } else {
            (time - prev.time) / (next.time - prev.time)
        };

        Some(prev.transform.interpolate_linear(&next.transform, f))
    }
}
