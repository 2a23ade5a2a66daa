use std::process::Command;

use anyhow::anyhow;
use printdeploy_core::InstallContext;
use semver::Version;

use crate::acl::{grant_full_access_with_executor, join_print_operators_group_with_executor};
use crate::policy::{
    point_and_print_values, set_point_and_print_policy_with_executor, uninstall_metadata_key,
    uninstall_metadata_values, write_uninstall_metadata_with_executor, RegistryValue,
};
use crate::printers::{
    parse_name_lines, parse_port_rows, port_is_reserved, reclaim_print_resources_with_executors,
    PRINTER_SETTLE,
};
use crate::process::{
    is_running_with_executor, process_list_contains, stop_process_with_executor, KILL_SETTLE,
};
use crate::service::{restart_spooler_with_executor, SERVICE_SETTLE};

fn render_invocation(command: &Command) -> String {
    let mut invocation = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        invocation.push(' ');
        invocation.push_str(arg.to_string_lossy().as_ref());
    }
    invocation
}

fn test_context() -> InstallContext {
    InstallContext {
        install_dir: std::path::PathBuf::from(r"C:\Program Files\PrintManagementSystem"),
        app_id: "PrintManagementSystem".to_string(),
        display_name: "Print Management System".to_string(),
        version: Version::parse("1.0.0").expect("test version must parse"),
        publisher: "LoQQuei".to_string(),
        help_url: "https://loqquei.com.br".to_string(),
        executable_name: "PrintManagementSystem.exe".to_string(),
        bundled_binary_present: true,
    }
}

#[test]
fn process_list_match_is_case_insensitive_and_exact() {
    let listing = "printmanagementsystem.exe    4321 Console    1    58,000 K\n";
    assert!(process_list_contains(listing, "PrintManagementSystem.exe"));
    assert!(!process_list_contains(listing, "PrintManagement.exe"));
    assert!(!process_list_contains("INFO: No tasks are running.\n", "PrintManagementSystem.exe"));
}

#[test]
fn is_running_queries_by_image_name() {
    let mut invocations = Vec::new();
    let running = is_running_with_executor("PrintManagementSystem.exe", |command, _| {
        invocations.push(render_invocation(command));
        Ok("PrintManagementSystem.exe 4321 Console 1 58,000 K\n".to_string())
    })
    .expect("query must succeed");

    assert!(running);
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0],
        "tasklist /FI IMAGENAME eq PrintManagementSystem.exe /NH"
    );
}

#[test]
fn stop_process_forces_tree_kill_then_settles() {
    let mut invocations = Vec::new();
    let mut sleeps = Vec::new();
    stop_process_with_executor(
        "PrintManagementSystem.exe",
        KILL_SETTLE,
        |command, _| {
            invocations.push(render_invocation(command));
            Ok(())
        },
        |duration| sleeps.push(duration),
    )
    .expect("stop must succeed");

    assert_eq!(
        invocations,
        vec!["taskkill /F /T /IM PrintManagementSystem.exe".to_string()]
    );
    assert_eq!(sleeps, vec![KILL_SETTLE]);
}

#[test]
fn reclaim_removes_every_stale_printer_before_settling() {
    let invocations = std::cell::RefCell::new(Vec::new());
    let mut sleeps = Vec::new();
    let report = reclaim_print_resources_with_executors(
        |command, _| {
            invocations.borrow_mut().push(render_invocation(command));
            Ok(())
        },
        |command, _| {
            let invocation = render_invocation(command);
            invocations.borrow_mut().push(invocation.clone());
            if invocation.contains("Get-Printer") {
                Ok("LoQQuei PDF Printer\nImpressora LoQQuei\n".to_string())
            } else {
                Ok(String::new())
            }
        },
        |duration| sleeps.push(duration),
    );

    let invocations = invocations.into_inner();
    assert_eq!(
        report.removed_printers,
        vec!["LoQQuei PDF Printer", "Impressora LoQQuei"]
    );
    assert!(report.warnings.is_empty());
    assert!(invocations
        .iter()
        .any(|line| line.contains("Remove-Printer -Name 'LoQQuei PDF Printer'")));
    assert!(invocations
        .iter()
        .any(|line| line.contains("Remove-Printer -Name 'Impressora LoQQuei'")));
    assert_eq!(sleeps, vec![PRINTER_SETTLE]);
}

#[test]
fn reclaim_is_a_clean_noop_when_nothing_matches() {
    let mut sleeps = Vec::new();
    let report = reclaim_print_resources_with_executors(
        |_, _| Ok(()),
        |_, _| Ok(String::new()),
        |duration| sleeps.push(duration),
    );

    assert!(report.removed_printers.is_empty());
    assert!(report.removed_ports.is_empty());
    assert!(report.warnings.is_empty());
    assert!(sleeps.is_empty());
}

#[test]
fn reclaim_enumeration_failure_still_tries_the_second_mechanism() {
    let mut invocations = Vec::new();
    let report = reclaim_print_resources_with_executors(
        |command, _| {
            invocations.push(render_invocation(command));
            Ok(())
        },
        |command, context| {
            let invocation = render_invocation(command);
            if invocation.contains("Get-Printer") {
                Err(anyhow!("{context}: spooler unavailable"))
            } else {
                Ok(String::new())
            }
        },
        |_| {},
    );

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("printer enumeration failed"));
    assert!(invocations
        .iter()
        .any(|line| line.starts_with("rundll32 printui.dll,PrintUIEntry /dl /n LoQQuei PDF Printer")));
    assert!(invocations
        .iter()
        .any(|line| line.starts_with("rundll32 printui.dll,PrintUIEntry /dl /n Impressora LoQQuei")));
}

#[test]
fn reclaim_removes_loopback_ports_with_prnport_fallback() {
    let mut invocations = Vec::new();
    let report = reclaim_print_resources_with_executors(
        |command, context| {
            let invocation = render_invocation(command);
            invocations.push(invocation.clone());
            if invocation.contains("Remove-PrinterPort") {
                Err(anyhow!("{context}: access denied"))
            } else {
                Ok(())
            }
        },
        |command, _| {
            let invocation = render_invocation(command);
            if invocation.contains("Get-PrinterPort") {
                Ok("LoQQuei_Port\t127.0.0.1\nHP_LaserJet\t10.0.0.9\nRawLoop\t127.0.0.1\n"
                    .to_string())
            } else {
                Ok(String::new())
            }
        },
        |_| {},
    );

    assert_eq!(report.removed_ports, vec!["LoQQuei_Port", "RawLoop"]);
    assert!(report.warnings.is_empty());
    let prnport_calls = invocations
        .iter()
        .filter(|line| line.contains("prnport.vbs -d -r"))
        .count();
    assert_eq!(prnport_calls, 2);
}

#[test]
fn port_row_parsing_and_matching() {
    let rows = parse_port_rows("LoQQuei_Port\t127.0.0.1\nHP_LaserJet\t10.0.0.9\nBare\n");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], ("LoQQuei_Port".to_string(), "127.0.0.1".to_string()));
    assert_eq!(rows[2], ("Bare".to_string(), String::new()));

    assert!(port_is_reserved("LoQQuei_Port", "10.0.0.9"));
    assert!(port_is_reserved("Anything", "127.0.0.1"));
    assert!(!port_is_reserved("HP_LaserJet", "10.0.0.9"));

    assert_eq!(
        parse_name_lines("  LoQQuei PDF Printer  \n\n"),
        vec!["LoQQuei PDF Printer"]
    );
}

#[test]
fn one_failed_grant_does_not_stop_the_remaining_principals() {
    let principals = ["Everyone", "Todos", "Authenticated Users", "Usuários Autenticados"];
    let mut invocations = Vec::new();
    let outcomes = grant_full_access_with_executor(
        std::path::Path::new(r"C:\Program Files\PrintManagementSystem"),
        &principals,
        |command, context| {
            let invocation = render_invocation(command);
            invocations.push(invocation.clone());
            if invocation.contains("Todos:") {
                Err(anyhow!("{context}: no mapping for account name"))
            } else {
                Ok(())
            }
        },
    );

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].succeeded);
    assert!(!outcomes[1].succeeded);
    assert!(outcomes[2].succeeded);
    assert!(outcomes[3].succeeded);
    assert_eq!(invocations.len(), 4);
    assert!(invocations[0]
        .starts_with(r"icacls C:\Program Files\PrintManagementSystem /grant Everyone:(OI)(CI)F /T"));
}

#[test]
fn group_join_treats_existing_membership_as_success() {
    let groups = ["Print Operators"];
    let principals = ["Everyone", "Authenticated Users"];
    let outcomes = join_print_operators_group_with_executor(&groups, &principals, |command, _| {
        let invocation = render_invocation(command);
        if invocation.contains("Everyone") {
            Err(anyhow!("status=2 stderr='System error 1378 has occurred.'"))
        } else {
            Ok(())
        }
    });

    assert!(outcomes[0].succeeded);
    assert!(outcomes[0].detail.contains("already a member"));
    assert!(outcomes[1].succeeded);
    assert!(outcomes[1].detail.contains("added to 'Print Operators'"));
}

#[test]
fn group_join_falls_back_to_localized_group_name() {
    let groups = ["Print Operators", "Opers. de impressão"];
    let principals = ["Everyone"];
    let mut invocations = Vec::new();
    let outcomes = join_print_operators_group_with_executor(&groups, &principals, |command, _| {
        let invocation = render_invocation(command);
        invocations.push(invocation.clone());
        if invocation.contains("Print Operators") {
            Err(anyhow!("the specified local group does not exist"))
        } else {
            Ok(())
        }
    });

    assert!(outcomes[0].succeeded);
    assert!(outcomes[0].detail.contains("Opers. de impressão"));
    assert_eq!(invocations.len(), 2);
    assert_eq!(
        invocations[1],
        "net localgroup Opers. de impressão Everyone /add"
    );
}

#[test]
fn point_and_print_policy_writes_every_value_despite_failures() {
    let mut invocations = Vec::new();
    let warnings = set_point_and_print_policy_with_executor(|command, context| {
        let invocation = render_invocation(command);
        invocations.push(invocation.clone());
        if invocation.contains("/v TrustedServers") {
            Err(anyhow!("{context}: access denied"))
        } else {
            Ok(())
        }
    });

    assert_eq!(invocations.len(), point_and_print_values().len());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("TrustedServers"));
    assert!(invocations[0].starts_with(
        r"reg add HKLM\SOFTWARE\Policies\Microsoft\Windows NT\Printers\PointAndPrint /v Restricted /t REG_DWORD /d 0 /f"
    ));
    assert!(invocations
        .iter()
        .any(|line| line.contains("/v ServerList /t REG_SZ /d 127.0.0.1 /f")));
}

#[test]
fn point_and_print_values_disable_elevation_and_trust_loopback() {
    let values = point_and_print_values();
    assert_eq!(values.len(), 6);
    assert!(values.contains(&("Restricted", RegistryValue::Dword(0))));
    assert!(values.contains(&(
        "RestrictDriverInstallationToAdministrators",
        RegistryValue::Dword(0)
    )));
    assert!(values.contains(&("NoWarningNoElevationOnInstall", RegistryValue::Dword(1))));
    assert!(values.contains(&("UpdatePromptSettings", RegistryValue::Dword(2))));
    assert!(values.contains(&("ServerList", RegistryValue::Sz("127.0.0.1".to_string()))));
}

#[test]
fn uninstall_metadata_targets_the_app_key_with_expected_values() {
    let context = test_context();
    assert_eq!(
        uninstall_metadata_key(&context.app_id),
        r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\PrintManagementSystem"
    );

    let values = uninstall_metadata_values(&context);
    assert!(values.contains(&("DisplayVersion", RegistryValue::Sz("1.0.0".to_string()))));
    assert!(values.contains(&("Publisher", RegistryValue::Sz("LoQQuei".to_string()))));
    assert!(values.contains(&(
        "HelpLink",
        RegistryValue::Sz("https://loqquei.com.br".to_string())
    )));
    assert!(values.contains(&("NoModify", RegistryValue::Dword(1))));
    assert!(values.contains(&("MultiUserInstall", RegistryValue::Dword(1))));

    let mut invocations = Vec::new();
    let warnings = write_uninstall_metadata_with_executor(&context, |command, _| {
        invocations.push(render_invocation(command));
        Ok(())
    });
    assert!(warnings.is_empty());
    assert_eq!(invocations.len(), values.len());
    assert!(invocations.iter().all(|line| line.ends_with("/f")));
}

#[test]
fn spooler_restart_still_starts_after_a_failed_stop() {
    let mut invocations = Vec::new();
    let mut sleeps = Vec::new();
    let report = restart_spooler_with_executor(
        |command, context| {
            let invocation = render_invocation(command);
            invocations.push(invocation.clone());
            if invocation == "net stop spooler" {
                Err(anyhow!("{context}: the service is not started"))
            } else {
                Ok(())
            }
        },
        |duration| sleeps.push(duration),
    );

    assert!(!report.stopped);
    assert!(report.started);
    assert!(report.succeeded());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(invocations, vec!["net stop spooler", "net start spooler"]);
    assert_eq!(sleeps, vec![SERVICE_SETTLE, SERVICE_SETTLE]);
}
