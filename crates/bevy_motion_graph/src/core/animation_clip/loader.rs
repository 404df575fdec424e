use std::path::Path;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    reflect::TypePath,
};

use super::MotionClip;
use crate::core::errors::AssetLoaderError;

impl MotionClip {
    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, AssetLoaderError> {
        Ok(ron::de::from_bytes(bytes)?)
    }

    /// Reads a `*.anim.ron` clip. Clips without a name take the file stem.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AssetLoaderError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut clip = Self::from_ron_bytes(&bytes)?;
        if clip.name.is_empty() {
            clip.name = clip_name_from_path(path);
        }
        Ok(clip)
    }
}

fn clip_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .strip_suffix(".anim.ron")
        .map(str::to_string)
        .unwrap_or(file_name)
}

#[derive(Default, TypePath)]
pub struct MotionClipLoader;

impl AssetLoader for MotionClipLoader {
    type Asset = MotionClip;
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
        MotionClip::from_ron_bytes(&bytes)
    }

    fn extensions(&self) -> &[&str] {
        &["anim.ron"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clip_with_default_speed() {
        let source = r#"(
            duration: 0.5,
            channels: [
                (bone: "hips", keyframes: [
                    (time: 0.0, transform: (translation: (0.0, 1.0, 0.0))),
                    (time: 0.25, transform: (translation: (0.0, 1.0, 0.1))),
                ]),
            ],
        )"#;
        let clip = MotionClip::from_ron_bytes(source.as_bytes()).unwrap();
        assert_eq!(clip.speed, 1.);
        assert_eq!(clip.frame_count(), 2);
        assert_eq!(clip_name_from_path(Path::new("clips/walk.anim.ron")), "walk");
    }
}
