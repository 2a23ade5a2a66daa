use std::path::PathBuf;

use anyhow::{anyhow, Context};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::context::InstallContext;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployManifest {
    pub app_id: String,
    pub display_name: String,
    pub version: Version,
    pub publisher: String,
    pub help_url: String,
    pub executable_name: String,
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    #[serde(default = "default_bundled_binary")]
    pub bundled_binary: bool,
}

fn default_bundled_binary() -> bool {
    true
}

impl DeployManifest {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let manifest: Self =
            toml::from_str(input).context("failed to parse deployment manifest")?;
        if manifest.app_id.trim().is_empty() {
            return Err(anyhow!("manifest app_id must not be empty"));
        }
        if manifest
            .app_id
            .chars()
            .any(|ch| ch.is_whitespace() || ch == '\\' || ch == '/')
        {
            return Err(anyhow!(
                "manifest app_id must not contain whitespace or path separators: {}",
                manifest.app_id
            ));
        }
        if manifest.display_name.trim().is_empty() {
            return Err(anyhow!("manifest display_name must not be empty"));
        }
        if manifest.publisher.trim().is_empty() {
            return Err(anyhow!("manifest publisher must not be empty"));
        }
        if manifest.executable_name.trim().is_empty() {
            return Err(anyhow!("manifest executable_name must not be empty"));
        }
        if !manifest
            .executable_name
            .to_ascii_lowercase()
            .ends_with(".exe")
        {
            return Err(anyhow!(
                "manifest executable_name must name a .exe artifact: {}",
                manifest.executable_name
            ));
        }
        Ok(manifest)
    }

    pub fn into_context(
        self,
        install_dir_override: Option<PathBuf>,
        bundled_binary_override: Option<bool>,
    ) -> anyhow::Result<InstallContext> {
        let install_dir = install_dir_override
            .or(self.install_dir)
            .ok_or_else(|| anyhow!("install directory missing: set it in the manifest or pass --install-dir"))?;

        Ok(InstallContext {
            install_dir,
            app_id: self.app_id,
            display_name: self.display_name,
            version: self.version,
            publisher: self.publisher,
            help_url: self.help_url,
            executable_name: self.executable_name,
            bundled_binary_present: bundled_binary_override.unwrap_or(self.bundled_binary),
        })
    }
}
