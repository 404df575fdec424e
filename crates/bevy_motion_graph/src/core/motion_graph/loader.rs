use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    reflect::TypePath,
};

use super::MotionGraph;
use crate::core::errors::AssetLoaderError;

#[derive(Default, TypePath)]
pub struct MotionGraphLoader;

impl AssetLoader for MotionGraphLoader {
    type Asset = MotionGraph;
    type Settings = ();
    type Error = AssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        MotionGraph::from_bytes(&bytes)
    }

    fn extensions(&self) -> &[&str] {
        &["mog"]
    }
}
