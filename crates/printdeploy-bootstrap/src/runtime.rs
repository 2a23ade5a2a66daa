use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use printdeploy_core::{runtime_registry_keys, RUNTIME_SILENT_ARGS};
use semver::Version;
use sha2::{Digest, Sha256};

use crate::DownloadProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeLauncher {
    Python,
    PyLauncher,
}

impl RuntimeLauncher {
    pub fn command(&self) -> Command {
        match self {
            Self::Python => Command::new("python"),
            Self::PyLauncher => {
                let mut command = Command::new("py");
                command.arg("-3");
                command
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::PyLauncher => "py -3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeSource {
    DirectInvocation,
    Registry(String),
    FreshInstall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeProbe {
    pub launcher: RuntimeLauncher,
    pub version: Option<Version>,
    pub source: ProbeSource,
}

impl RuntimeProbe {
    pub fn describe(&self) -> String {
        let version = self
            .version
            .as_ref()
            .map(|version| version.to_string())
            .unwrap_or_else(|| "unknown version".to_string());
        match &self.source {
            ProbeSource::DirectInvocation => {
                format!("{} ({version})", self.launcher.describe())
            }
            ProbeSource::Registry(key) => format!("registry install at {key}"),
            ProbeSource::FreshInstall => "freshly installed runtime".to_string(),
        }
    }
}

pub(crate) fn detect_runtime_with_executor<Capture>(capture: &mut Capture) -> Option<RuntimeProbe>
where
    Capture: FnMut(&mut Command, &str) -> Result<String>,
{
    for launcher in [RuntimeLauncher::Python, RuntimeLauncher::PyLauncher] {
        let mut command = launcher.command();
        command.arg("--version");
        if let Ok(output) = capture(&mut command, "failed to invoke the runtime") {
            return Some(RuntimeProbe {
                launcher,
                version: parse_runtime_version(&output),
                source: ProbeSource::DirectInvocation,
            });
        }
    }

    for key in runtime_registry_keys() {
        let mut command = Command::new("reg");
        command.arg("query").arg(&key).arg("/ve");
        if capture(&mut command, "failed to query the runtime registry key").is_ok() {
            return Some(RuntimeProbe {
                launcher: RuntimeLauncher::Python,
                version: None,
                source: ProbeSource::Registry(key),
            });
        }
    }

    None
}

pub(crate) fn parse_runtime_version(output: &str) -> Option<Version> {
    let token = output.trim().split_whitespace().nth(1)?;
    Version::parse(token).ok()
}

pub(crate) fn install_runtime_with_executor<Run>(installer: &Path, run: &mut Run) -> Result<()>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut command = Command::new(installer);
    command.args(RUNTIME_SILENT_ARGS);
    run(&mut command, "runtime installer exited with an error")
}

pub fn download_runtime_installer(
    url: &str,
    dest_dir: &Path,
    expected_sha256: Option<&str>,
    progress: &mut dyn DownloadProgress,
) -> Result<PathBuf> {
    let file_name = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("runtime-installer.exe");
    let target = dest_dir.join(file_name);
    let part = dest_dir.join(format!("{file_name}.part"));

    let mut response = reqwest::blocking::get(url)
        .with_context(|| format!("failed to request runtime installer: {url}"))?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "runtime installer request returned HTTP {}: {url}",
            response.status()
        ));
    }

    let total = response.content_length();
    let mut file = fs::File::create(&part)
        .with_context(|| format!("failed to create download file: {}", part.display()))?;
    let mut hasher = Sha256::new();
    let mut received = 0_u64;
    let mut buffer = [0_u8; 64 * 1024];

    loop {
        let read = match response.read(&mut buffer) {
            Ok(read) => read,
            Err(err) => {
                let _ = fs::remove_file(&part);
                return Err(err)
                    .with_context(|| format!("runtime installer download interrupted: {url}"));
            }
        };
        if read == 0 {
            break;
        }
        if let Err(err) = file.write_all(&buffer[..read]) {
            let _ = fs::remove_file(&part);
            return Err(err)
                .with_context(|| format!("failed writing download file: {}", part.display()));
        }
        hasher.update(&buffer[..read]);
        received += read as u64;
        progress.on_progress(received, total);
    }
    file.flush()
        .with_context(|| format!("failed flushing download file: {}", part.display()))?;
    drop(file);

    if let Some(expected) = expected_sha256 {
        let digest = hex::encode(hasher.finalize());
        if !digest.eq_ignore_ascii_case(expected) {
            let _ = fs::remove_file(&part);
            return Err(anyhow!(
                "runtime installer digest mismatch: expected {expected}, got {digest}"
            ));
        }
    }

    if target.exists() {
        fs::remove_file(&target)
            .with_context(|| format!("failed to replace download file: {}", target.display()))?;
    }
    fs::rename(&part, &target).with_context(|| {
        format!(
            "failed to move downloaded installer into place: {}",
            target.display()
        )
    })?;
    Ok(target)
}
