use bevy::math::Vec3;

use crate::utils::math::horizontal;

/// A target trajectory, parameterized by normalized arc length.
pub trait TargetPath {
    /// Point on the path at `t ∈ [0, 1]`.
    fn position(&self, t: f32) -> Vec3;

    /// Horizontal length of the path, approximated with `samples` segments.
    fn length(&self, samples: usize) -> f32 {
        let samples = samples.max(1);
        (0..samples)
            .map(|i| {
                let a = self.position(i as f32 / samples as f32);
                let b = self.position((i + 1) as f32 / samples as f32);
                horizontal(b - a).length()
            })
            .sum()
    }
}

impl<F: Fn(f32) -> Vec3> TargetPath for F {
    fn position(&self, t: f32) -> Vec3 {
        self(t.clamp(0., 1.))
    }
}

/// Piecewise linear path through a list of points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolylinePath {
    points: Vec<Vec3>,
    /// Horizontal arc length at every point.
    cumulative: Vec<f32>,
}

impl PolylinePath {
    pub fn new(points: Vec<Vec3>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += horizontal(*point - points[i - 1]).length();
            }
            cumulative.push(total);
        }
        Self { points, cumulative }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn total_length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.)
    }
}

impl TargetPath for PolylinePath {
    fn position(&self, t: f32) -> Vec3 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return Vec3::ZERO;
        };
        let total = self.total_length();
        if total <= 0. {
            return *first;
        }

        let target = t.clamp(0., 1.) * total;
        let next = self.cumulative.partition_point(|&d| d < target);
        if next == 0 {
            return *first;
        }
        if next >= self.points.len() {
            return *last;
        }

        let (d0, d1) = (self.cumulative[next - 1], self.cumulative[next]);
        let f = if d1 > d0 { (target - d0) / (d1 - d0) } else { 0. };
        self.points[next - 1].lerp(self.points[next], f)
    }

    fn length(&self, _samples: usize) -> f32 {
        self.total_length()
    }
}

/// Catmull-Rom spline through a list of key points. The curve is sampled densely once and then
/// traversed by arc length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatmullRomPath {
    key_points: Vec<Vec3>,
    samples: PolylinePath,
}

impl CatmullRomPath {
    pub fn new(key_points: Vec<Vec3>, samples_per_segment: usize) -> Self {
        let samples_per_segment = samples_per_segment.max(1);
        let mut samples = vec![];
        if let Some(first) = key_points.first() {
            samples.push(*first);
        }
        for segment in 0..key_points.len().saturating_sub(1) {
            for step in 1..=samples_per_segment {
                let u = step as f32 / samples_per_segment as f32;
                samples.push(Self::segment_point(&key_points, segment, u));
            }
        }

        Self {
            key_points,
            samples: PolylinePath::new(samples),
        }
    }

    pub fn key_points(&self) -> &[Vec3] {
        &self.key_points
    }

    /// Point at `u ∈ [0, 1]` between key points `segment` and `segment + 1`. End segments reuse
    /// their outer key point as the missing control point.
    fn segment_point(points: &[Vec3], segment: usize, u: f32) -> Vec3 {
        let last = points.len() - 1;
        let p0 = points[segment.saturating_sub(1)];
        let p1 = points[segment];
        let p2 = points[(segment + 1).min(last)];
        let p3 = points[(segment + 2).min(last)];

        let u2 = u * u;
        let u3 = u2 * u;
        0.5 * ((2. * p1)
            + (p2 - p0) * u
            + (2. * p0 - 5. * p1 + 4. * p2 - p3) * u2
            + (3. * p1 - p0 - 3. * p2 + p3) * u3)
    }
}

impl TargetPath for CatmullRomPath {
    fn position(&self, t: f32) -> Vec3 {
        self.samples.position(t)
    }

    fn length(&self, _samples: usize) -> f32 {
        self.samples.total_length()
    }
}
