use std::path::Path;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    reflect::TypePath,
};

use super::{Skeleton, serial::SkeletonSerial};
use crate::core::errors::AssetLoaderError;

impl Skeleton {
    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, AssetLoaderError> {
        let serial: SkeletonSerial = ron::de::from_bytes(bytes)?;
        Ok(serial.to_skeleton()?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AssetLoaderError> {
        let bytes = std::fs::read(path)?;
        Self::from_ron_bytes(&bytes)
    }
}

#[derive(Default, TypePath)]
pub struct SkeletonLoader;

impl AssetLoader for SkeletonLoader {
    type Asset = Skeleton;
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
        Skeleton::from_ron_bytes(&bytes)
    }

    fn extensions(&self) -> &[&str] {
        &["skn.ron"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SkeletonValidationError;

    #[test]
    fn parses_named_parents() {
        let source = r#"(
            name: "biped",
            bones: [
                (name: "left_foot", parent: Some("hips"), bind_pose: (translation: (0.1, -0.9, 0.0))),
                (name: "hips", bind_pose: (translation: (0.0, 1.0, 0.0))),
            ],
        )"#;
        let skeleton = Skeleton::from_ron_bytes(source.as_bytes()).unwrap();
        assert_eq!(skeleton.bone_count(), 2);
        assert_eq!(skeleton.bone_id("hips"), Some(0));
        assert_eq!(skeleton.parent(1), Some(0));
        assert_eq!(skeleton.bones()[1].bind_pose.scale, bevy::math::Vec3::ONE);
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let source = r#"(bones: [(name: "hips", parent: Some("pelvis"))])"#;
        let err = Skeleton::from_ron_bytes(source.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            AssetLoaderError::InvalidSkeleton(SkeletonValidationError::UnknownParent { .. })
        ));
    }
}
