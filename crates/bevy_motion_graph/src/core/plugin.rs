use bevy::{
    app::{App, Plugin},
    asset::AssetApp,
};

use super::{
    animation_clip::{MotionClip, loader::MotionClipLoader},
    motion_graph::{MotionGraph, loader::MotionGraphLoader},
    skeleton::{Skeleton, loader::SkeletonLoader},
};

/// Registers motion graphs, skeletons and clips as assets, together with their loaders
pub struct MotionGraphPlugin;

impl Plugin for MotionGraphPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<MotionGraph>()
            .init_asset_loader::<MotionGraphLoader>()
            .init_asset::<Skeleton>()
            .init_asset_loader::<SkeletonLoader>()
            .init_asset::<MotionClip>()
            .init_asset_loader::<MotionClipLoader>();
    }
}
