//! Runtime settings.
//!
//! Everything has a code default. Native builds additionally read
//! `TYRE_STUDIO_EXPORT_DIR` to redirect exported images. Nothing is persisted.

use std::path::PathBuf;

use crate::render::RendererSettings;

pub const EXPORT_DIR_VAR: &str = "TYRE_STUDIO_EXPORT_DIR";

#[derive(Clone, Debug, PartialEq)]
pub struct StudioConfig {
    pub window_title: String,
    /// Name of the downloaded or written PNG.
    pub export_file_name: String,
    /// Directory exported images are written to on native builds.
    pub export_dir: PathBuf,
    pub stabilization_frames: u32,
    pub renderer: RendererSettings,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            window_title: "Engineered Elegance".to_string(),
            export_file_name: "engineered-elegance.png".to_string(),
            export_dir: PathBuf::from("."),
            stabilization_frames: 4,
            renderer: RendererSettings::default(),
        }
    }
}

impl StudioConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(EXPORT_DIR_VAR).filter(|dir| !dir.trim().is_empty()) {
            log::debug!("exporting to {dir}");
            self.export_dir = PathBuf::from(dir);
        }
        self
    }

    /// Full path of the native export.
    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(&self.export_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_dir_override() {
        let config = StudioConfig::default().with_overrides(|key| {
            (key == EXPORT_DIR_VAR).then(|| "/tmp/renders".to_string())
        });
        assert_eq!(
            config.export_path(),
            PathBuf::from("/tmp/renders/engineered-elegance.png")
        );
    }

    #[test]
    fn blank_override_keeps_default() {
        let config = StudioConfig::default().with_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.export_dir, PathBuf::from("."));
    }
}
