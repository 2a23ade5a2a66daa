use std::path::Path;
use std::process::Command;

use anyhow::Result;
use printdeploy_core::PlatformCapabilities;

use crate::exec::run_command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalOutcome {
    pub principal: String,
    pub succeeded: bool,
    pub detail: String,
}

pub fn grant_full_access(path: &Path, caps: &PlatformCapabilities) -> Vec<PrincipalOutcome> {
    grant_full_access_with_executor(path, &caps.everyone_principals, run_command)
}

pub(crate) fn grant_full_access_with_executor<Run>(
    path: &Path,
    principals: &[&str],
    mut run: Run,
) -> Vec<PrincipalOutcome>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut outcomes = Vec::with_capacity(principals.len());
    for principal in principals {
        let mut command = Command::new("icacls");
        command
            .arg(path)
            .arg("/grant")
            .arg(format!("{principal}:(OI)(CI)F"))
            .arg("/T");
        let outcome = match run(&mut command, "failed to grant directory access") {
            Ok(()) => PrincipalOutcome {
                principal: principal.to_string(),
                succeeded: true,
                detail: "full control granted".to_string(),
            },
            Err(err) => PrincipalOutcome {
                principal: principal.to_string(),
                succeeded: false,
                detail: err.to_string(),
            },
        };
        outcomes.push(outcome);
    }
    outcomes
}

pub fn join_print_operators_group(caps: &PlatformCapabilities) -> Vec<PrincipalOutcome> {
    join_print_operators_group_with_executor(
        &caps.print_operator_groups,
        &caps.everyone_principals,
        run_command,
    )
}

pub(crate) fn join_print_operators_group_with_executor<Run>(
    groups: &[&str],
    principals: &[&str],
    mut run: Run,
) -> Vec<PrincipalOutcome>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut outcomes = Vec::with_capacity(principals.len());
    for principal in principals {
        let mut last_error = None;
        let mut succeeded = false;
        let mut detail = String::new();

        for group in groups {
            let mut command = Command::new("net");
            command
                .arg("localgroup")
                .arg(group)
                .arg(principal)
                .arg("/add");
            match run(&mut command, "failed to join the print operators group") {
                Ok(()) => {
                    succeeded = true;
                    detail = format!("added to '{group}'");
                    break;
                }
                // System error 1378: the account is already a member.
                Err(err) if err.to_string().contains("1378") => {
                    succeeded = true;
                    detail = format!("already a member of '{group}'");
                    break;
                }
                Err(err) => last_error = Some(err),
            }
        }

        if !succeeded {
            detail = last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "no print operators group variant found".to_string());
        }
        outcomes.push(PrincipalOutcome {
            principal: principal.to_string(),
            succeeded,
            detail,
        });
    }
    outcomes
}
