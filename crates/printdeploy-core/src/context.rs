use std::path::{Path, PathBuf};

use semver::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallContext {
    pub install_dir: PathBuf,
    pub app_id: String,
    pub display_name: String,
    pub version: Version,
    pub publisher: String,
    pub help_url: String,
    pub executable_name: String,
    pub bundled_binary_present: bool,
}

impl InstallContext {
    pub fn executable_path(&self) -> PathBuf {
        self.install_dir.join(&self.executable_name)
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }
}
