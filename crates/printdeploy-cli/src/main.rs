mod completion;
mod pipeline;
mod render;

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use printdeploy_core::{DeployManifest, InstallContext, RunOutcome};

use crate::pipeline::{run_install_pipeline, run_uninstall_pipeline, HostOrchestrator};
use crate::render::{print_status, print_step_record, OutputStyle};

#[derive(Parser, Debug)]
#[command(name = "printdeploy")]
#[command(about = "Prepares a machine to run the print management application", long_about = None)]
struct Cli {
    #[arg(long, default_value = "deploy.toml")]
    manifest: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Install {
        #[arg(long)]
        install_dir: Option<PathBuf>,
        #[arg(long)]
        no_bundled_binary: bool,
        #[arg(long)]
        assume_yes: bool,
        #[arg(long)]
        runtime_sha256: Option<String>,
    },
    Uninstall,
    Doctor,
    Version,
    Completions {
        #[arg(long)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let style = OutputStyle::detect();

    match cli.command {
        Commands::Install {
            install_dir,
            no_bundled_binary,
            assume_yes,
            runtime_sha256,
        } => {
            let context = load_context(
                &cli.manifest,
                install_dir,
                no_bundled_binary.then_some(false),
            )?;
            let mut ops = HostOrchestrator::new(assume_yes, runtime_sha256);
            let run = run_install_pipeline(&context, &mut ops);

            for record in run.log.records() {
                print_step_record(style, record);
            }
            match run.outcome {
                RunOutcome::Aborted => {
                    return Err(anyhow!(
                        "installation aborted: the mandatory executable artifact is missing from {}",
                        context.install_dir().display()
                    ));
                }
                outcome => print_status(style, outcome.as_str(), &context.display_name),
            }
        }
        Commands::Uninstall => {
            let manifest = load_manifest(&cli.manifest)?;
            let mut ops = HostOrchestrator::new(false, None);
            let run = run_uninstall_pipeline(&manifest.executable_name, &mut ops);

            for record in run.log.records() {
                print_step_record(style, record);
            }
            print_status(style, run.outcome.as_str(), &manifest.display_name);
        }
        Commands::Doctor => {
            let manifest = load_manifest(&cli.manifest)?;
            run_doctor(style, &manifest)?;
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Completions { shell } => {
            let mut stdout = std::io::stdout();
            completion::write_completions_script(shell, &mut stdout)?;
        }
    }

    Ok(())
}

fn load_manifest(path: &PathBuf) -> Result<DeployManifest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read deployment manifest: {}", path.display()))?;
    DeployManifest::from_toml_str(&raw)
        .with_context(|| format!("invalid deployment manifest: {}", path.display()))
}

fn load_context(
    path: &PathBuf,
    install_dir: Option<PathBuf>,
    bundled_binary_override: Option<bool>,
) -> Result<InstallContext> {
    load_manifest(path)?.into_context(install_dir, bundled_binary_override)
}

fn run_doctor(style: OutputStyle, manifest: &DeployManifest) -> Result<()> {
    match printdeploy_system::is_running(&manifest.executable_name) {
        Ok(true) => print_status(style, "process", &format!("{} is running", manifest.executable_name)),
        Ok(false) => print_status(
            style,
            "process",
            &format!("{} is not running", manifest.executable_name),
        ),
        Err(err) => print_status(style, "process", &format!("query failed: {err}")),
    }

    match printdeploy_system::find_reserved_printers() {
        Ok(printers) if printers.is_empty() => {
            print_status(style, "printers", "no reserved printers present")
        }
        Ok(printers) => print_status(style, "printers", &printers.join(", ")),
        Err(err) => print_status(style, "printers", &format!("enumeration failed: {err}")),
    }

    match printdeploy_system::find_reserved_ports() {
        Ok(ports) if ports.is_empty() => {
            print_status(style, "ports", "no reserved printer ports present")
        }
        Ok(ports) => print_status(style, "ports", &ports.join(", ")),
        Err(err) => print_status(style, "ports", &format!("enumeration failed: {err}")),
    }

    match printdeploy_bootstrap::detect_runtime() {
        Some(probe) => print_status(style, "runtime", &probe.describe()),
        None => print_status(style, "runtime", "no Python runtime detected"),
    }

    Ok(())
}
