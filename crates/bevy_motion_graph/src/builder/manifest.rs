use std::path::{Path, PathBuf};

use bevy::log::info;
use serde::{Deserialize, Serialize};

use super::BuildSettings;
use crate::core::{animation_clip::MotionClip, errors::AssetLoaderError, skeleton::Skeleton};

/// Contents of a `*.mgb.ron` build manifest. Relative paths are resolved against the directory
/// holding the manifest.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BuildManifest {
    pub skeleton: PathBuf,
    #[serde(default)]
    pub clip_directory: PathBuf,
    pub clips: Vec<String>,
    #[serde(default)]
    pub settings: BuildSettings,
}

/// Skeleton and clips referenced by a manifest, in manifest order.
pub struct Dataset {
    pub skeleton: Skeleton,
    pub clips: Vec<MotionClip>,
}

impl BuildManifest {
    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, AssetLoaderError> {
        Ok(ron::de::from_bytes(bytes)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetLoaderError> {
        let path = path.as_ref();
        std::fs::read(path)
            .map_err(AssetLoaderError::from)
            .and_then(|bytes| Self::from_ron_bytes(&bytes))
            .map_err(|e| e.in_file(path))
    }

    pub fn skeleton_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.skeleton)
    }

    pub fn clip_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        let clip_dir = base_dir.join(&self.clip_directory);
        self.clips.iter().map(|clip| clip_dir.join(clip)).collect()
    }

    pub fn load_dataset(&self, base_dir: &Path) -> Result<Dataset, AssetLoaderError> {
        let skeleton_path = self.skeleton_path(base_dir);
        let skeleton =
            Skeleton::load_from_file(&skeleton_path).map_err(|e| e.in_file(&skeleton_path))?;
        info!(
            "Loaded skeleton {:?} with {} bones",
            skeleton.name(),
            skeleton.bone_count()
        );

        let clips = self
            .clip_paths(base_dir)
            .into_iter()
            .map(|path| MotionClip::load_from_file(&path).map_err(|e| e.in_file(&path)))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Loaded {} clips", clips.len());

        Ok(Dataset { skeleton, clips })
    }
}
