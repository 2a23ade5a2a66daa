use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

pub(crate) fn write_completions_script<W: Write>(shell: Shell, writer: &mut W) -> Result<()> {
    let mut command = crate::Cli::command();
    let mut generated = Vec::new();
    clap_complete::generate(shell, &mut command, "printdeploy", &mut generated);

    writer
        .write_all(&generated)
        .context("failed writing generated completion script")?;
    Ok(())
}
